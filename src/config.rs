//! Portal configuration
//!
//! Configuration resolves once at startup, from defaults or from
//! `DEPT_PORTAL_*` environment variables. Nothing re-reads the environment
//! after that.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::infrastructure::{CollectionPath, NatsConfig};

/// Configuration for a portal process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Application id segment of the collection path
    pub app_id: String,

    /// NATS endpoint; `None` runs fully offline
    pub nats: Option<NatsConfig>,

    /// Directory for drafts, the offline list, and exports
    pub storage_dir: PathBuf,

    /// Hex SHA-256 digest of the dashboard password; `None` keeps the
    /// dashboard locked for everyone
    pub admin_password_sha256: Option<String>,

    /// Credential forwarded to the identity provider at sign-in
    pub auth_token: Option<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            app_id: "default-app-id".to_string(),
            nats: None,
            storage_dir: PathBuf::from(".dept-report"),
            admin_password_sha256: None,
            auth_token: None,
        }
    }
}

impl PortalConfig {
    /// Read configuration from `DEPT_PORTAL_*` environment variables
    ///
    /// Unset or empty variables keep their defaults. The NATS endpoint is
    /// configured only when `DEPT_PORTAL_NATS_URL` is present.
    pub fn from_env() -> Self {
        let mut config = PortalConfig::default();

        if let Some(app_id) = non_empty_var("DEPT_PORTAL_APP_ID") {
            config.app_id = app_id;
        }

        if let Some(url) = non_empty_var("DEPT_PORTAL_NATS_URL") {
            let mut nats = NatsConfig::with_url(url);
            nats.user = non_empty_var("DEPT_PORTAL_NATS_USER");
            nats.password = non_empty_var("DEPT_PORTAL_NATS_PASSWORD");
            config.nats = Some(nats);
        }

        if let Some(dir) = non_empty_var("DEPT_PORTAL_STORAGE_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }

        config.admin_password_sha256 = non_empty_var("DEPT_PORTAL_ADMIN_SHA256");
        config.auth_token = non_empty_var("DEPT_PORTAL_AUTH_TOKEN");

        config
    }

    /// The collection path this configuration addresses
    pub fn collection_path(&self) -> CollectionPath {
        CollectionPath::new(&self.app_id)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration() {
        let config = PortalConfig::default();

        assert_eq!(config.app_id, "default-app-id");
        assert!(config.nats.is_none());
        assert_eq!(config.storage_dir, PathBuf::from(".dept-report"));
        assert!(config.admin_password_sha256.is_none());
        assert!(config.auth_token.is_none());

        assert_eq!(
            config.collection_path().to_string(),
            "artifacts/default-app-id/public/data/dept_reports_2025"
        );
    }

    // All DEPT_PORTAL_* variables are touched only by this test, so it can
    // mutate the process environment without racing other tests.
    #[test]
    fn test_from_env_overrides_defaults() {
        env::set_var("DEPT_PORTAL_APP_ID", "campus-pilot");
        env::set_var("DEPT_PORTAL_NATS_URL", "nats://reports.campus:4222");
        env::set_var("DEPT_PORTAL_NATS_USER", "portal");
        env::set_var("DEPT_PORTAL_NATS_PASSWORD", "s3cret");
        env::set_var("DEPT_PORTAL_STORAGE_DIR", "/var/lib/dept-report");
        env::set_var("DEPT_PORTAL_ADMIN_SHA256", "ab".repeat(32));
        env::set_var("DEPT_PORTAL_AUTH_TOKEN", "");

        let config = PortalConfig::from_env();

        assert_eq!(config.app_id, "campus-pilot");
        let nats = config.nats.as_ref().unwrap();
        assert_eq!(nats.url, "nats://reports.campus:4222");
        assert_eq!(nats.user.as_deref(), Some("portal"));
        assert_eq!(nats.password.as_deref(), Some("s3cret"));
        assert_eq!(config.storage_dir, PathBuf::from("/var/lib/dept-report"));
        assert!(config.admin_password_sha256.is_some());
        assert!(config.auth_token.is_none(), "empty variable stays unset");
        assert_eq!(
            config.collection_path().to_string(),
            "artifacts/campus-pilot/public/data/dept_reports_2025"
        );

        for name in [
            "DEPT_PORTAL_APP_ID",
            "DEPT_PORTAL_NATS_URL",
            "DEPT_PORTAL_NATS_USER",
            "DEPT_PORTAL_NATS_PASSWORD",
            "DEPT_PORTAL_STORAGE_DIR",
            "DEPT_PORTAL_ADMIN_SHA256",
            "DEPT_PORTAL_AUTH_TOKEN",
        ] {
            env::remove_var(name);
        }
    }
}
