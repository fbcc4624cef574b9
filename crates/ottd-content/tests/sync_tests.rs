//! Synchronisation tests against a simulated BaNaNaS CDN.
//!
//! The CDN is a wiremock server serving gzip-compressed tar archives at
//! `/newgrf/{id}/{hash}/{name}.tar.gz`.

use ottd_config::ServerConfig;
use ottd_content::{
    ContentSource, ContentSynchronizer, Error, ItemStatus, RequiredContentItem,
};
use ottd_test_utils::TestServer;
use ottd_test_utils::archive::{gzip, newgrf_archive};
use pretty_assertions::assert_eq;
use std::fs;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn synchronizer_for(server: &TestServer, cdn: &MockServer) -> ContentSynchronizer {
    let source = ContentSource::new(&cdn.uri(), "BaNaNaSync/1.0").unwrap();
    ContentSynchronizer::for_cache_root(server.cache_root(), source).unwrap()
}

async fn request_count(cdn: &MockServer) -> usize {
    cdn.received_requests().await.map(|r| r.len()).unwrap_or_default()
}

#[tokio::test]
async fn missing_item_is_downloaded_then_never_again() {
    let cdn = MockServer::start().await;
    let (body, tar) = newgrf_archive("examplegrf");

    Mock::given(method("GET"))
        .and(path("/newgrf/123/abcdef/examplegrf.tar.gz"))
        .and(header("User-Agent", "BaNaNaSync/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(1)
        .mount(&cdn)
        .await;

    let server = TestServer::new().with_newgrfs(&["123|ABCDEF|examplegrf/1.0"]);
    let config = ServerConfig::load(&server.config_path()).unwrap();
    let sync = synchronizer_for(&server, &cdn).await;

    let first = sync.synchronize(&config).await.unwrap();
    assert_eq!(first.downloaded(), 1);
    assert_eq!(
        fs::read(server.cache_root().join("examplegrf.tar")).unwrap(),
        tar
    );

    let second = sync.synchronize(&config).await.unwrap();
    assert_eq!(second.cached(), 1);
    assert_eq!(second.downloaded(), 0);
    assert_eq!(request_count(&cdn).await, 1, "second run must not fetch");
}

#[tokio::test]
async fn one_missing_archive_does_not_stop_the_others() {
    let cdn = MockServer::start().await;
    for name in ["alpha", "gamma"] {
        let (body, _) = newgrf_archive(name);
        Mock::given(method("GET"))
            .and(path(format!("/newgrf/1/aa/{name}.tar.gz")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .expect(1)
            .mount(&cdn)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/newgrf/1/aa/beta.tar.gz"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&cdn)
        .await;

    let server = TestServer::new().with_newgrfs(&["1|AA|alpha", "1|AA|beta/3", "1|AA|gamma"]);
    let config = ServerConfig::load(&server.config_path()).unwrap();
    let sync = synchronizer_for(&server, &cdn).await;

    let report = sync.synchronize(&config).await.unwrap();

    assert_eq!(report.downloaded(), 2);
    assert_eq!(report.failed(), 1);
    match &report.get("beta").unwrap().status {
        ItemStatus::Failed { reason } => assert!(reason.contains("404"), "{reason}"),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(sync.store().contains("alpha"));
    assert!(sync.store().contains("gamma"));
    assert!(!sync.store().contains("beta"));
}

#[tokio::test]
async fn corrupt_archive_leaves_no_cache_entry() {
    let cdn = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/newgrf/1/aa/broken.tar.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"definitely not gzip".to_vec()))
        .mount(&cdn)
        .await;

    let server = TestServer::new().with_newgrfs(&["1|AA|broken"]);
    let config = ServerConfig::load(&server.config_path()).unwrap();
    let sync = synchronizer_for(&server, &cdn).await;

    let report = sync.synchronize(&config).await.unwrap();
    assert_eq!(report.failed(), 1);
    assert!(!sync.store().contains("broken"));

    let leftovers: Vec<_> = fs::read_dir(server.cache_root()).unwrap().collect();
    assert!(leftovers.is_empty(), "partial download left behind: {leftovers:?}");
}

#[tokio::test]
async fn malformed_entry_fails_alone() {
    let cdn = MockServer::start().await;
    let (body, _) = newgrf_archive("good");
    Mock::given(method("GET"))
        .and(path("/newgrf/2/bb/good.tar.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(1)
        .mount(&cdn)
        .await;

    let server = TestServer::new().with_newgrfs(&["not-a-grf-entry", "2|BB|good"]);
    let config = ServerConfig::load(&server.config_path()).unwrap();
    let sync = synchronizer_for(&server, &cdn).await;

    let report = sync.synchronize(&config).await.unwrap();
    assert_eq!(report.failed(), 1);
    assert_eq!(report.downloaded(), 1);
    assert_eq!(report.outcomes[0].entry, "not-a-grf-entry");
    assert_eq!(report.outcomes[0].cache_key, None);
}

#[tokio::test]
async fn empty_section_is_a_no_op() {
    let cdn = MockServer::start().await;
    let server = TestServer::new();
    let config = ServerConfig::load(&server.config_path()).unwrap();
    let sync = synchronizer_for(&server, &cdn).await;

    let report = sync.synchronize(&config).await.unwrap();
    assert!(report.outcomes.is_empty());
    assert_eq!(request_count(&cdn).await, 0);
}

#[tokio::test]
async fn missing_cache_root_is_an_error() {
    let cdn = MockServer::start().await;
    let server = TestServer::new().with_newgrfs(&["1|AA|alpha"]);
    let config = ServerConfig::load(&server.config_path()).unwrap();
    let source = ContentSource::new(&cdn.uri(), "BaNaNaSync/1.0").unwrap();
    let sync = ContentSynchronizer::for_cache_root(server.root().join("nowhere"), source).unwrap();

    let result = sync.synchronize(&config).await;
    assert!(matches!(result, Err(Error::CacheRootMissing { .. })));
}

#[tokio::test]
async fn pre_seeded_cache_entry_is_trusted() {
    let cdn = MockServer::start().await;
    let server = TestServer::new().with_newgrfs(&["7|CC|seeded/1"]);
    fs::write(server.cache_root().join("seeded.tar"), b"").unwrap();

    let config = ServerConfig::load(&server.config_path()).unwrap();
    let sync = synchronizer_for(&server, &cdn).await;

    let report = sync.synchronize(&config).await.unwrap();
    assert_eq!(report.cached(), 1);
    assert_eq!(request_count(&cdn).await, 0);
}

#[tokio::test]
async fn duplicate_cache_keys_download_once() {
    let cdn = MockServer::start().await;
    let (body, _) = newgrf_archive("twice");
    Mock::given(method("GET"))
        .and(path("/newgrf/1/aa/twice.tar.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(1)
        .mount(&cdn)
        .await;

    let server = TestServer::new().with_newgrfs(&["1|AA|twice/1", "1|AA|twice/2"]);
    let config = ServerConfig::load(&server.config_path()).unwrap();
    let sync = synchronizer_for(&server, &cdn).await;

    let report = sync.synchronize(&config).await.unwrap();
    assert_eq!(report.downloaded(), 1);
}

#[tokio::test]
async fn fetcher_reports_status_text() {
    let cdn = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_bytes(gzip(b"ignored")))
        .mount(&cdn)
        .await;

    let server = TestServer::new();
    let sync = synchronizer_for(&server, &cdn).await;
    let item: RequiredContentItem = "1|AA|down".parse().unwrap();

    let fetcher = ottd_content::Fetcher::new(
        ContentSource::new(&cdn.uri(), "BaNaNaSync/1.0").unwrap(),
    )
    .unwrap();
    let err = fetcher.fetch(&item, sync.store()).await.unwrap_err();

    assert!(matches!(err, Error::Status { .. }));
    assert!(err.to_string().contains("503 Service Unavailable"), "{err}");
    assert!(!sync.store().contains("down"));
}
