#![allow(clippy::unwrap_used)]
// Loading and saving TOML profiles on disk.

use std::collections::HashMap;

use pretty_assertions::assert_eq;

use clustermgr_config::{
    Config, Defaults, Profile, load_config_from, profile_to_connection_config, save_config_to,
};

const SAMPLE: &str = r#"
default_profile = "lab"

[defaults]
output = "json"
timeout = 45

[profiles.lab]
host = "cm.lab.internal"
username = "ops"
password = "plain"
version = 12

[profiles.prod]
host = "cm.prod.internal"
use_tls = true
port = 9443
ca_cert = "/etc/ssl/cm-ca.pem"
"#;

#[test]
fn test_load_profiles_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, SAMPLE).unwrap();

    let cfg = load_config_from(&path).unwrap();
    assert_eq!(cfg.default_profile.as_deref(), Some("lab"));
    assert_eq!(cfg.defaults.output, "json");
    assert_eq!(cfg.defaults.timeout, 45);

    let (name, lab) = cfg.profile(None).unwrap();
    assert_eq!(name, "lab");
    assert_eq!(lab.host, "cm.lab.internal");
    assert_eq!(lab.version, Some(12));
    assert!(!lab.use_tls);

    let (_, prod) = cfg.profile(Some("prod")).unwrap();
    assert_eq!(prod.port, Some(9443));
    assert!(prod.use_tls);
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.default_profile.as_deref(), Some("default"));
    assert_eq!(cfg.defaults.timeout, 30);
    assert!(cfg.profiles.is_empty());
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let profile = Profile {
        host: "cm1".into(),
        port: Some(7180),
        username: Some("admin".into()),
        password_env: Some("CM1_PASSWORD".into()),
        version: Some(19),
        ..Profile::default()
    };
    let cfg = Config {
        default_profile: Some("cm1".into()),
        defaults: Defaults::default(),
        profiles: HashMap::from([("cm1".to_owned(), profile.clone())]),
    };
    save_config_to(&cfg, &path).unwrap();

    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded.profiles.get("cm1"), Some(&profile));
}

#[test]
fn test_profile_builds_connection_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, SAMPLE).unwrap();
    let cfg = load_config_from(&path).unwrap();

    let (name, lab) = cfg.profile(Some("lab")).unwrap();
    let conn = profile_to_connection_config(lab, name, &cfg.defaults).unwrap();
    assert_eq!(conn.version, 12);
    assert_eq!(conn.effective_port(), 7180);
    assert_eq!(conn.transport.timeout.as_secs(), 45);
    assert_eq!(
        conn.base_url().unwrap().as_str(),
        "http://cm.lab.internal:7180/api/v12/"
    );
}
