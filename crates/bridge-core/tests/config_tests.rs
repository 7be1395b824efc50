use std::fs;

use bridge_core::config::{resolve_with_base, Config, Settings};
use bridge_core::Error;
use tempfile::TempDir;

#[test]
fn defaults_apply_without_files() {
    let tmp = TempDir::new().unwrap();
    let config = Config::load_from(tmp.path(), "dev").expect("load");
    let settings = config.settings().unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.search.max_results, 50);
    assert_eq!(settings.discovery.depth_budget, 2);
    assert!(!settings.lazy_ingest.enabled);
    assert_eq!(config.index_dir().unwrap(), tmp.path().join("dev_data/indexes").join("wikipedia"));
}

#[test]
fn env_file_overrides_base_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[search]\nmax_results = 20\ncandidate_limit = 5\n").unwrap();
    fs::write(tmp.path().join("config.prod.toml"), "[search]\nmax_results = 40\n\n[discovery]\ndepth_budget = 3\n")
        .unwrap();

    let config = Config::load_from(tmp.path(), "prod").expect("load");
    let settings = config.settings().unwrap();
    assert_eq!(settings.search.max_results, 40);
    assert_eq!(settings.search.candidate_limit, 5);
    assert_eq!(settings.discovery.depth_budget, 3);
    assert_eq!(config.get::<u8>("search.fuzziness").unwrap(), 1);
}

#[test]
fn invalid_values_fail_loading() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[search]\nfuzziness = 4\n").unwrap();
    assert!(Config::load_from(tmp.path(), "test").is_err());
}

#[test]
fn validate_rejects_zero_limits() {
    let mut settings = Settings::default();
    settings.search.max_results = 0;
    assert!(matches!(settings.validate(), Err(Error::InvalidConfig(_))));

    let mut settings = Settings::default();
    settings.search.timeout_secs = 0;
    assert!(matches!(settings.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn absolute_paths_are_not_rebased() {
    let tmp = TempDir::new().unwrap();
    let abs = tmp.path().join("idx");
    assert_eq!(resolve_with_base(std::path::Path::new("/elsewhere"), abs.to_string_lossy()), abs);
    assert_eq!(resolve_with_base(tmp.path(), "rel"), tmp.path().join("rel"));
}
