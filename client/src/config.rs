//! Client configuration loaded via OrthoConfig.
//!
//! Values come from `REPORTIT_*` environment variables and the optional
//! configuration file; command-line flags are layered on top by the CLI.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:8080/";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const CREDENTIALS_DIR: &str = ".reportit";
const CREDENTIALS_FILE: &str = "credentials.json";

fn default_credentials_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(CREDENTIALS_DIR)
        .join(CREDENTIALS_FILE)
}

/// Settings shared by every CLI command.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REPORTIT")]
pub struct ClientSettings {
    /// Backend base URL.
    pub base_url: Option<String>,
    /// Location of the credential file.
    pub credentials_path: Option<PathBuf>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Emit logs as JSON lines.
    #[ortho_config(default = false)]
    pub log_json: bool,
}

impl ClientSettings {
    /// Configured base URL, falling back to a local backend.
    ///
    /// A trailing slash is appended when missing so relative joins keep the
    /// configured path prefix.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        let raw = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL).trim();
        if raw.ends_with('/') {
            Url::parse(raw)
        } else {
            Url::parse(&format!("{raw}/"))
        }
    }

    /// Configured credential file, falling back to `~/.reportit/credentials.json`.
    pub fn credentials_path(&self) -> PathBuf {
        self.credentials_path
            .clone()
            .unwrap_or_else(default_credentials_path)
    }

    /// Configured request timeout. Zero falls back to the default.
    pub fn request_timeout(&self) -> Duration {
        let secs = self
            .request_timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }
}
