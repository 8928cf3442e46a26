use std::sync::Arc;

use ruskview_core::{
    Application, ClusterOp, IndexOp, NoticeKind, Params, ProfileStore, RequestBody, Settings,
};
use serde_json::json;

mod common;
use common::fake_transport::FakeTransport;
use common::recording_notifier::RecordingNotifier;
use common::{basic_profile, init_test_logging};

struct Fixture {
    _dir: tempfile::TempDir,
    app: Application,
    transport: Arc<FakeTransport>,
    notifier: Arc<RecordingNotifier>,
}

fn fixture() -> anyhow::Result<Fixture> {
    init_test_logging();
    let dir = tempfile::tempdir()?;
    let store = ProfileStore::at(dir.path())?;
    let transport = FakeTransport::new();
    let notifier = Arc::new(RecordingNotifier::default());
    let app = Application::with_parts(
        store,
        transport.clone(),
        notifier.clone(),
        &Settings::default(),
    );
    Ok(Fixture {
        _dir: dir,
        app,
        transport,
        notifier,
    })
}

#[tokio::test]
async fn connect_flow_reports_each_outcome() -> anyhow::Result<()> {
    let f = fixture()?;
    let profile = f.app.save_profile(&basic_profile())?;
    let saved = f.notifier.taken();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].kind, NoticeKind::Success);

    f.app.test_connection(&profile).await?;
    let tested = f.notifier.taken();
    assert_eq!(tested[0].title, "Connection Successful");
    assert_eq!(
        tested[0].message.as_deref(),
        Some("Successfully connected to http://localhost:9200")
    );
    assert!(!f.app.current().is_connected());

    f.app.connect(profile.clone()).await?;
    assert_eq!(f.notifier.taken()[0].title, "Connected");
    assert_eq!(f.app.current().profile, Some(profile));

    f.app.disconnect();
    f.app.disconnect();
    let notices = f.notifier.taken();
    assert_eq!(notices.len(), 1, "only a real disconnect is announced");
    assert_eq!(notices[0].kind, NoticeKind::Info);
    Ok(())
}

#[tokio::test]
async fn failed_connect_is_an_error_notice() -> anyhow::Result<()> {
    let f = fixture()?;
    f.transport.respond(401, "unauthorized");

    let result = f.app.connect(basic_profile()).await;
    assert!(result.is_err());
    let notices = f.notifier.taken();
    assert_eq!(notices[0].kind, NoticeKind::Error);
    assert_eq!(notices[0].title, "Connection Failed");
    assert_eq!(notices[0].duration, std::time::Duration::from_secs(5));
    Ok(())
}

#[tokio::test]
async fn invalid_profile_is_not_saved() -> anyhow::Result<()> {
    let f = fixture()?;
    let mut profile = basic_profile();
    profile.url = "not a url".into();

    assert!(f.app.save_profile(&profile).is_err());
    assert_eq!(f.notifier.taken()[0].kind, NoticeKind::Error);
    assert!(f.app.list_profiles()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn generic_proxy_accepts_method_names_from_text() -> anyhow::Result<()> {
    let f = fixture()?;
    f.app.connect(basic_profile()).await?;
    f.transport.push_response(200, r#"{"acknowledged":true}"#);

    let value = f
        .app
        .proxy(
            "put",
            "/logs",
            Some(RequestBody::Raw(r#"{"settings":{"number_of_shards":1}}"#.into())),
        )
        .await?;
    assert_eq!(value, json!({ "acknowledged": true }));
    assert_eq!(f.transport.last_call().method, "PUT");

    assert!(f.app.proxy("no such", "/", None).await.is_err());
    Ok(())
}

#[tokio::test]
async fn typed_operations_hit_the_expected_endpoints() -> anyhow::Result<()> {
    let f = fixture()?;
    f.app.connect(basic_profile()).await?;

    let mut params = Params::new();
    params.insert("level".into(), "indices".into());
    f.app.cluster_op(ClusterOp::Health, &params).await?;
    assert_eq!(
        f.transport.last_call().uri,
        "http://localhost:9200/_cluster/health?level=indices"
    );

    f.app
        .index_op(
            IndexOp::Search,
            "logs-2024",
            &Params::new(),
            Some(json!({ "query": { "match_all": {} } })),
        )
        .await?;
    let call = f.transport.last_call();
    assert_eq!(call.method, "POST");
    assert_eq!(call.uri, "http://localhost:9200/logs-2024/_search");
    assert!(!call.body.is_empty());

    f.app
        .index_op(IndexOp::Delete, "logs-2024", &Params::new(), None)
        .await?;
    assert_eq!(f.transport.last_call().method, "DELETE");
    Ok(())
}

#[tokio::test]
async fn delete_of_an_unknown_profile_warns() -> anyhow::Result<()> {
    let f = fixture()?;
    let profile = f.app.save_profile(&basic_profile())?;
    f.notifier.taken();

    assert!(f.app.delete_profile(&profile.id)?);
    assert!(!f.app.delete_profile(&profile.id)?);
    let kinds: Vec<NoticeKind> = f.notifier.taken().into_iter().map(|n| n.kind).collect();
    assert_eq!(kinds, [NoticeKind::Info, NoticeKind::Warning]);
    Ok(())
}
