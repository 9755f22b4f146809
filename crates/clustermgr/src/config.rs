//! Connection setup for the CLI.
//!
//! Loads the TOML profile (if any) through `clustermgr_config` and layers
//! the command-line overrides on top.

use std::time::Duration;

use clustermgr_config::{Config, ConfigError, Profile};
use clustermgr_core::ConnectionConfig;
use tracing::debug;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the connection for this invocation.
///
/// With `--host` and no matching profile the connection is built from
/// flags alone; the password then comes from `CMCTL_PASSWORD` or falls
/// back to the server's factory account.
pub fn resolve_connection(cfg: &Config, global: &GlobalOpts) -> Result<ConnectionConfig, CliError> {
    let (name, profile) = match cfg.profile(global.profile.as_deref()) {
        Ok((name, profile)) => (name.to_owned(), profile.clone()),
        Err(ConfigError::UnknownProfile(_)) if global.host.is_some() && global.profile.is_none() => {
            debug!("no profile configured, connecting from flags");
            ("cli".to_owned(), Profile::default())
        }
        Err(e) => return Err(e.into()),
    };

    let profile = apply_overrides(profile, global);
    let mut config = clustermgr_config::profile_to_connection_config(&profile, &name, &cfg.defaults)?;
    if let Some(secs) = global.timeout {
        config = config.timeout(Duration::from_secs(secs));
    }
    debug!(
        profile = %name,
        host = %config.host,
        port = config.effective_port(),
        version = config.version,
        "resolved connection"
    );
    Ok(config)
}

fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(port) = global.port {
        profile.port = Some(port);
    }
    if let Some(ref user) = global.user {
        profile.username = Some(user.clone());
    }
    if global.tls {
        profile.use_tls = true;
    }
    if let Some(version) = global.api_version {
        profile.version = Some(version);
    }
    profile
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use std::collections::HashMap;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["cmctl"];
        argv.extend_from_slice(args);
        argv.push("version");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn lab_config() -> Config {
        let profile = Profile {
            host: "cm.lab".into(),
            username: Some("ops".into()),
            password: Some("pw".into()),
            version: Some(12),
            ..Profile::default()
        };
        Config {
            default_profile: Some("lab".into()),
            profiles: HashMap::from([("lab".to_owned(), profile)]),
            ..Config::default()
        }
    }

    #[test]
    fn flags_override_profile() {
        let g = global(&["--tls", "--api-version", "19", "--port", "9443"]);
        let conn = resolve_connection(&lab_config(), &g).unwrap();
        assert_eq!(conn.host, "cm.lab");
        assert_eq!(conn.scheme(), "https");
        assert_eq!(conn.effective_port(), 9443);
        assert_eq!(conn.version, 19);
        assert_eq!(conn.credentials.username, "ops");
    }

    #[test]
    fn host_flag_works_without_profile() {
        let g = global(&["-H", "cm.adhoc"]);
        let conn = resolve_connection(&Config::default(), &g).unwrap();
        assert_eq!(conn.host, "cm.adhoc");
        assert_eq!(conn.effective_port(), 7180);
    }

    #[test]
    fn named_missing_profile_is_an_error() {
        let g = global(&["-p", "prod", "-H", "cm.adhoc"]);
        let err = resolve_connection(&lab_config(), &g).unwrap_err();
        assert!(matches!(err, CliError::ProfileNotFound { ref name, .. } if name == "prod"));
    }

    #[test]
    fn timeout_flag_applies() {
        let g = global(&["--timeout", "5"]);
        let conn = resolve_connection(&lab_config(), &g).unwrap();
        assert_eq!(conn.transport.timeout, Duration::from_secs(5));
    }
}
