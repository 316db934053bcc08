//! Configuration for the causas service module

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Causas service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding uploaded attachments
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,

    /// Largest accepted upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Where unauthenticated requests are redirected
    #[serde(default = "default_login_url")]
    pub login_url: String,

    /// HS256 key used to sign and verify session tokens
    #[serde(default)]
    pub jwt_secret: String,

    /// Per-request timeout
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media_root: default_media_root(),
            max_upload_bytes: default_max_upload_bytes(),
            login_url: default_login_url(),
            jwt_secret: String::new(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_media_root() -> PathBuf {
    PathBuf::from("media")
}

fn default_max_upload_bytes() -> usize {
    crate::domain::service::DEFAULT_MAX_UPLOAD_BYTES
}

fn default_login_url() -> String {
    "/cuentas/login/".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}
