//! Golden-file tests using test-fixtures/
//!
//! A realistic dedicated-server config and shared ban file are merged and
//! compared against the expected ban list in `test-fixtures/expected/`.

use std::fs;
use std::path::{Path, PathBuf};

use ottd_bans::{BanListMerger, BanSet};
use ottd_config::{BANS_SECTION, NEWGRF_SECTION, SectionStore, ServerConfig};
use ottd_content::RequiredContentItem;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Path to the test-fixtures directory (relative to the workspace root).
fn fixtures_dir() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    // tests/integration -> ../../test-fixtures
    manifest_dir.join("../../test-fixtures")
}

/// Copy the dedicated-server fixture into a scratch directory.
fn scratch_server() -> TempDir {
    let temp = TempDir::new().unwrap();
    let source = fixtures_dir().join("servers/dedicated");
    for name in ["openttd.cfg", "bans.txt"] {
        fs::copy(source.join(name), temp.path().join(name)).unwrap();
    }
    temp
}

fn expected_bans() -> Vec<String> {
    let path = fixtures_dir().join("expected/merged-bans.txt");
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read expected output at {}: {}", path.display(), e));
    content.replace("\r\n", "\n").lines().map(str::to_string).collect()
}

fn load(dir: &Path) -> ServerConfig {
    ServerConfig::load(&dir.join("openttd.cfg")).unwrap()
}

#[test]
fn fixture_config_is_readable() {
    let config = ServerConfig::load(&fixtures_dir().join("servers/dedicated/openttd.cfg")).unwrap();

    assert_eq!(config.server_name().as_deref(), Some("Reddit OpenTTD Fixture"));
    assert_eq!(config.section_keys(BANS_SECTION).len(), 3);

    let mut cache_keys: Vec<String> = config
        .section_keys(NEWGRF_SECTION)
        .iter()
        .map(|entry| entry.parse::<RequiredContentItem>().unwrap().cache_key().to_string())
        .collect();
    cache_keys.sort();
    assert_eq!(cache_keys, vec!["iron-horse", "opengfx-plus-trains", "ukrs2"]);
}

#[test]
fn ban_file_merged_into_config_matches_golden() {
    let server = scratch_server();
    let mut config = load(server.path());

    BanListMerger::new(server.path().join("bans.txt"))
        .merge_into_config(&mut config)
        .unwrap();
    config.save_to(&server.path().join("openttd.cfg")).unwrap();

    let mut bans = load(server.path()).section_keys(BANS_SECTION);
    bans.sort();
    assert_eq!(bans, expected_bans());
}

#[test]
fn config_merged_into_ban_file_matches_golden() {
    let server = scratch_server();
    let ban_file = server.path().join("bans.txt");

    BanListMerger::new(&ban_file)
        .merge_into_file(&load(server.path()))
        .unwrap();

    let written = fs::read_to_string(&ban_file).unwrap();
    assert_eq!(written.lines().collect::<Vec<_>>(), expected_bans());
    assert!(written.ends_with('\n'));
}

#[test]
fn merge_leaves_other_sections_intact() {
    let server = scratch_server();
    let mut config = load(server.path());
    let newgrfs_before = config.section_keys(NEWGRF_SECTION);

    BanListMerger::new(server.path().join("bans.txt"))
        .merge_into_config(&mut config)
        .unwrap();

    assert_eq!(config.section_keys(NEWGRF_SECTION), newgrfs_before);
    assert_eq!(
        config.value("network", "server_port").as_deref(),
        Some("3979")
    );
}

#[test]
fn golden_list_is_already_a_fixed_point() {
    let expected: BanSet = expected_bans().into_iter().collect();
    let fixture = BanSet::from_lines(
        &fs::read_to_string(fixtures_dir().join("servers/dedicated/bans.txt")).unwrap(),
    );

    assert_eq!(expected.union(&fixture), expected);
}
