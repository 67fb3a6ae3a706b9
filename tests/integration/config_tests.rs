use clap::Parser;
use dupfinder::cli::Cli;
use dupfinder::config::{Config, ENV_PREFIX};
use dupfinder::error::ExitCode;
use dupfinder::scanner::HashAlgorithm;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_from_env() {
    std::env::set_var("DUPFINDER_TEST_IO_THREADS", "16");
    std::env::set_var("DUPFINDER_TEST_ALGORITHM", "md5");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("DUPFINDER_TEST_"))
        .extract()
        .unwrap();

    assert_eq!(config.io_threads, 16);
    assert_eq!(config.algorithm, HashAlgorithm::Md5);

    std::env::remove_var("DUPFINDER_TEST_IO_THREADS");
    std::env::remove_var("DUPFINDER_TEST_ALGORITHM");
}

#[test]
fn test_env_overrides_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "io_threads = 8\nskip_hidden = true\n").unwrap();
    std::env::set_var("DUPFINDER_LAYER_IO_THREADS", "2");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("DUPFINDER_LAYER_"))
        .extract()
        .unwrap();

    assert_eq!(config.io_threads, 2);
    assert!(config.skip_hidden);

    std::env::remove_var("DUPFINDER_LAYER_IO_THREADS");
}

#[test]
fn test_config_invalid_toml_is_rejected_by_figment() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "io_threads = [not toml").unwrap();

    let result: Result<Config, _> = Config::figment(Some(&path)).extract();
    assert!(result.is_err());

    // load() falls back to defaults instead
    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.io_threads, Config::default().io_threads);
}

#[test]
fn test_env_prefix() {
    assert_eq!(ENV_PREFIX, "DUPFINDER_");
}

#[test]
fn test_run_app_uses_config_file() {
    let dir = tempdir().unwrap();
    let tree = dir.path().join("tree");
    fs::create_dir_all(tree.join("sub")).unwrap();
    fs::create_dir_all(tree.join("skip")).unwrap();
    fs::write(tree.join("a.txt"), b"x").unwrap();
    fs::write(tree.join("skip/a.txt"), b"x").unwrap();

    let config_path = dir.path().join("dupfinder.toml");
    fs::write(&config_path, "ignore_patterns = [\"skip/\"]\n").unwrap();

    let cli = Cli::try_parse_from([
        "dupfinder",
        "-q",
        "--config",
        config_path.to_str().unwrap(),
        "scan",
        tree.to_str().unwrap(),
        "--output",
        "json",
    ])
    .unwrap();

    assert_eq!(dupfinder::run_app(cli).unwrap(), ExitCode::NoDuplicates);
}

#[test]
fn test_run_app_missing_config_file_fails() {
    let dir = tempdir().unwrap();
    let cli = Cli::try_parse_from([
        "dupfinder",
        "-q",
        "--config",
        dir.path().join("absent.toml").to_str().unwrap(),
        "scan",
        dir.path().to_str().unwrap(),
    ])
    .unwrap();

    assert!(dupfinder::run_app(cli).is_err());
}
