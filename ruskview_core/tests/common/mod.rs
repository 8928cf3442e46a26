#![allow(dead_code)]

pub mod fake_transport;
pub mod memory_vault;
pub mod recording_notifier;

use ruskview_core::{AuthConfig, ConnectionProfile};

/// Route test logs through env_logger; visible with `-- --nocapture`.
pub fn init_test_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub fn basic_profile() -> ConnectionProfile {
    ConnectionProfile::new(
        "Local Cluster",
        "http://localhost:9200",
        AuthConfig::basic("admin", "admin"),
    )
}

pub fn iam_profile() -> ConnectionProfile {
    ConnectionProfile::new(
        "AWS Domain",
        "https://search-logs.eu-west-1.es.amazonaws.com",
        AuthConfig::iam("eu-west-1", "AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG"),
    )
}
