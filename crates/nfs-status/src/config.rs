//! Monitor configuration.
//!
//! Every tunable is fixed for the lifetime of one invocation. Defaults match
//! the deployment the monitor was written for; a TOML file may override any
//! subset of them.
//!
//! ```toml
//! [nfs]
//! host = "172.16.1.1"
//! share = "logs"
//! mount_point = "/mnt/logs"
//!
//! [fallback]
//! device = "/dev/sda1"
//!
//! [alert]
//! smtp_host = "smtp.example.org"
//! to = "oncall@example.org"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::MonitorError;

/// Environment variable holding the SMTP username.
pub const ENV_SMTP_USERNAME: &str = "NFS_STATUS_SMTP_USERNAME";

/// Environment variable holding the SMTP password.
pub const ENV_SMTP_PASSWORD: &str = "NFS_STATUS_SMTP_PASSWORD";

/// Default NFS server address.
pub const DEFAULT_HOST: &str = "172.16.1.1";

/// Default exported share name.
pub const DEFAULT_SHARE: &str = "logs";

/// Default local mount point for the share.
pub const DEFAULT_MOUNT_POINT: &str = "/mnt/logs";

/// Probe file name inside the mount point.
pub const PROBE_FILE_NAME: &str = "status.test";

/// Default fallback block device.
pub const DEFAULT_FALLBACK_DEVICE: &str = "/dev/sda1";

/// Default event log location.
pub const DEFAULT_LOG_PATH: &str = "/var/log/nfs_status/nfs_status.log";

/// Default SMTP submission port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Full monitor configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    pub nfs: NfsConfig,
    pub fallback: FallbackConfig,
    pub log: LogConfig,
    pub probe: ProbeConfig,
    pub alert: AlertConfig,
}

/// The remote share being monitored.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NfsConfig {
    /// IP or DNS name of the NFS server
    pub host: String,
    /// Share name, without the leading slash
    pub share: String,
    /// Local mount point for the share
    pub mount_point: PathBuf,
    /// File read and rewritten by the access probes.
    /// Defaults to `<mount_point>/status.test`.
    pub probe_file: Option<PathBuf>,
}

impl Default for NfsConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            share: DEFAULT_SHARE.to_string(),
            mount_point: PathBuf::from(DEFAULT_MOUNT_POINT),
            probe_file: None,
        }
    }
}

impl NfsConfig {
    /// Resolved probe file path.
    pub fn probe_file(&self) -> PathBuf {
        self.probe_file
            .clone()
            .unwrap_or_else(|| self.mount_point.join(PROBE_FILE_NAME))
    }

    /// Export path as listed by `showmount`, e.g. `/logs`.
    pub fn export_path(&self) -> String {
        format!("/{}", self.share.trim_start_matches('/'))
    }

    /// Mount source as listed by `df`, e.g. `172.16.1.1:/logs`.
    pub fn mount_source(&self) -> String {
        format!("{}:{}", self.host, self.export_path())
    }
}

/// Local device mounted in place of the share when it fails.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FallbackConfig {
    pub device: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_FALLBACK_DEVICE.to_string(),
        }
    }
}

/// Event log settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub path: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LOG_PATH),
        }
    }
}

/// Probe timing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Hard timeout for `rpcinfo`, `showmount` and `df`
    pub command_timeout_secs: u64,
    /// Deadline passed to `ping -w`
    pub ping_deadline_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: 5,
            ping_deadline_secs: 2,
        }
    }
}

impl ProbeConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

/// Alert mail settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlertConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Optional SMTP credentials. Both must be set to authenticate.
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from: String,
    pub to: String,
    pub subject: String,
    /// Machine named in the alert body
    pub origin: String,
    /// Who the recipient should contact
    pub contacts: String,
    /// Closing line of the alert body
    pub signature: String,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.somewhere.gltd".to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_username: None,
            smtp_password: None,
            from: "root@host.local".to_string(),
            to: "something@somewhere.gtld".to_string(),
            subject: "[URGENT] NFS Error".to_string(),
            origin: "bro-master".to_string(),
            contacts: "Zach or Zander".to_string(),
            signature: "root@bro-master".to_string(),
        }
    }
}

impl AlertConfig {
    /// Username/password pair, if both are configured.
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.smtp_username, &self.smtp_password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, MonitorError> {
        let raw = std::fs::read_to_string(path).map_err(|source| MonitorError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| MonitorError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Load from an optional file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, MonitorError> {
        let mut config = match path {
            Some(path) => {
                debug!(path = %path.display(), "Loading config file");
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply SMTP credential overrides. Environment wins over the file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(user) = lookup(ENV_SMTP_USERNAME) {
            self.alert.smtp_username = Some(user);
        }
        if let Some(pass) = lookup(ENV_SMTP_PASSWORD) {
            self.alert.smtp_password = Some(pass);
        }
    }
}
