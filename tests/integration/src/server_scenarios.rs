//! Scenario tests spanning content sync, ban merging and the sidecar
//!
//! Each test plays the part of one or more game servers sharing a ban file
//! and a mocked content CDN.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use ottd_bans::{BanListMerger, Sidecar};
use ottd_config::{BANS_SECTION, SectionStore, ServerConfig};
use ottd_content::{ContentSource, ContentSynchronizer, ItemStatus};
use ottd_fs::{FileLock, LockOptions};
use ottd_test_utils::TestServer;
use ottd_test_utils::archive::newgrf_archive;
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_lock() -> LockOptions {
    LockOptions::default().with_poll_interval(Duration::from_millis(10))
}

fn sorted_bans(config: &ServerConfig) -> Vec<String> {
    let mut keys = config.section_keys(BANS_SECTION);
    keys.sort();
    keys
}

/// The start-up sequence of a server container: merge shared bans, cache
/// NewGRFs, write the writable config.
#[tokio::test(flavor = "multi_thread")]
async fn server_start_merges_bans_and_caches_content() {
    let cdn = MockServer::start().await;
    let (body, tar) = newgrf_archive("examplegrf");
    Mock::given(method("GET"))
        .and(path("/newgrf/123/abcdef/examplegrf.tar.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(1)
        .mount(&cdn)
        .await;
    Mock::given(method("GET"))
        .and(path("/newgrf/456/beef/missinggrf.tar.gz"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&cdn)
        .await;

    let origin = TestServer::new()
        .with_newgrfs(&["123|ABCDEF|examplegrf/1.0", "456|BEEF|missinggrf/2"])
        .with_bans(&["1.2.3.4", "5.6.7.8"]);
    origin.write_ban_file("5.6.7.8\n9.9.9.9\n");
    let destination = TestServer::new();

    let mut config = ServerConfig::load(&origin.config_path()).unwrap();
    BanListMerger::new(origin.ban_file())
        .with_lock_options(fast_lock())
        .merge_into_config(&mut config)
        .unwrap();

    let synchronizer = ContentSynchronizer::for_cache_root(
        destination.cache_root(),
        ContentSource::new(&cdn.uri(), "BaNaNaSync/1.0").unwrap(),
    )
    .unwrap();
    let report = synchronizer.synchronize(&config).await.unwrap();
    config.save_to(&destination.config_path()).unwrap();

    assert_eq!(report.downloaded(), 1);
    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.get("missinggrf").unwrap().status,
        ItemStatus::Failed { .. }
    ));
    assert_eq!(
        std::fs::read(destination.cache_root().join("examplegrf.tar")).unwrap(),
        tar
    );
    assert!(!destination.cache_root().join("missinggrf.tar").exists());

    let written = ServerConfig::load(&destination.config_path()).unwrap();
    assert_eq!(sorted_bans(&written), vec!["1.2.3.4", "5.6.7.8", "9.9.9.9"]);
    assert_eq!(written.server_name().as_deref(), Some("Test Server"));
}

/// A ban issued on one server reaches another through the shared file.
#[test]
fn bans_propagate_between_servers() {
    let alpha = TestServer::new()
        .with_server_name("Alpha")
        .with_bans(&["griefer"]);
    let bravo = TestServer::new()
        .with_server_name("Bravo")
        .with_bans(&["10.0.0.1"]);
    let shared = alpha.ban_file();

    Sidecar::new(alpha.config_path(), &shared, Duration::from_secs(60))
        .with_lock_options(fast_lock())
        .run_once()
        .unwrap();

    let mut bravo_config = ServerConfig::load(&bravo.config_path()).unwrap();
    BanListMerger::new(&shared)
        .with_lock_options(fast_lock())
        .merge_into_config(&mut bravo_config)
        .unwrap();
    bravo_config.save_to(&bravo.config_path()).unwrap();

    Sidecar::new(bravo.config_path(), &shared, Duration::from_secs(60))
        .with_lock_options(fast_lock())
        .run_once()
        .unwrap();

    assert_eq!(sorted_bans(&bravo_config), vec!["10.0.0.1", "griefer"]);
    assert_eq!(alpha.ban_file_entries(), vec!["10.0.0.1", "griefer"]);
}

/// Start-up merges and sidecar rounds from many servers never lose a ban.
#[test]
fn concurrent_servers_keep_every_ban() {
    const SERVERS: usize = 6;
    let shared_dir = TestServer::new();
    let shared = shared_dir.ban_file();
    shared_dir.write_ban_file("seed\n");

    let servers: Vec<TestServer> = (0..SERVERS)
        .map(|i| TestServer::new().with_bans(&[format!("10.0.{i}.1").as_str()]))
        .collect();
    let barrier = Arc::new(Barrier::new(SERVERS));

    let handles: Vec<_> = servers
        .iter()
        .enumerate()
        .map(|(i, server)| {
            let config_path = server.config_path();
            let shared = shared.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                if i % 2 == 0 {
                    Sidecar::new(config_path, shared, Duration::from_secs(60))
                        .with_lock_options(fast_lock())
                        .run_once()
                        .unwrap();
                } else {
                    let mut config = ServerConfig::load(&config_path).unwrap();
                    BanListMerger::new(shared)
                        .with_lock_options(fast_lock())
                        .reconcile(&mut config)
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut expected: Vec<String> = (0..SERVERS).map(|i| format!("10.0.{i}.1")).collect();
    expected.push("seed".to_string());
    expected.sort();
    assert_eq!(shared_dir.ban_file_entries(), expected);
    assert!(!FileLock::is_locked(&shared));
}

/// A running sidecar keeps exporting while the server config changes.
#[tokio::test(flavor = "multi_thread")]
async fn sidecar_follows_config_changes() {
    let server = TestServer::new().with_bans(&["1.2.3.4"]);
    let sidecar = Sidecar::new(server.config_path(), server.ban_file(), Duration::from_millis(25))
        .with_lock_options(fast_lock());

    let config_path = server.config_path();
    let edit = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(80)).await;
        std::fs::write(config_path, "[bans]\n1.2.3.4 =\nlate_griefer =\n").unwrap();
    });

    sidecar.run(tokio::time::sleep(Duration::from_millis(400))).await;
    edit.await.unwrap();

    assert_eq!(server.ban_file_entries(), vec!["1.2.3.4", "late_griefer"]);
}
