pub mod application;
pub mod notifications;
pub mod operations;
pub mod proxy;
pub mod session;
pub mod session_manager;
