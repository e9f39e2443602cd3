//! The NFS monitor: pre-flight guard plus the six-check sequence.

use std::process::ExitCode;

use tracing::{debug, info};

use crate::action::Action;
use crate::alert::{AlertSender, SmtpAlertSender};
use crate::check::{Check, Probe};
use crate::command::{args, CommandRunner, SystemRunner};
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::event_log::EventLog;
use crate::probe;
use crate::runner::{RunContext, RunOutcome, TestRunner};

pub const CHECK_PING: &str = "Ping";
pub const CHECK_SERVER_AVAILABLE: &str = "Server available";
pub const CHECK_SHARE_AVAILABLE: &str = "Share available";
pub const CHECK_SHARE_MOUNTED: &str = "Share mounted";
pub const CHECK_SHARE_READABLE: &str = "Share readable";
pub const CHECK_SHARE_WRITEABLE: &str = "Share writeable";

/// How a monitor invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorStatus {
    /// All checks passed
    Healthy,
    /// A check failed and its remediation ran
    CheckFailed { check: String },
    /// The fallback device was already mounted; no checks ran
    FallbackAlreadyMounted,
}

impl MonitorStatus {
    /// Process exit code: 0 when healthy, 1 otherwise.
    pub fn code(&self) -> u8 {
        match self {
            Self::Healthy => 0,
            Self::CheckFailed { .. } | Self::FallbackAlreadyMounted => 1,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }
}

/// Build the standard sequence: reachability, NFS service, export, mount
/// table, read access, write access. Every check remounts the fallback
/// device and alerts on failure.
pub fn default_sequence(config: &MonitorConfig) -> TestRunner {
    let nfs = &config.nfs;
    let timeout = config.probe.command_timeout();
    let probe_file = nfs.probe_file();
    let remount = Action::remount(config.fallback.device.clone(), nfs.mount_point.clone());

    [
        (
            CHECK_PING,
            Probe::Ping {
                host: nfs.host.clone(),
                deadline_secs: config.probe.ping_deadline_secs,
            },
        ),
        (
            CHECK_SERVER_AVAILABLE,
            Probe::NfsService {
                host: nfs.host.clone(),
                timeout,
            },
        ),
        (
            CHECK_SHARE_AVAILABLE,
            Probe::ShareExported {
                host: nfs.host.clone(),
                export_path: nfs.export_path(),
                timeout,
            },
        ),
        (
            CHECK_SHARE_MOUNTED,
            Probe::ShareMounted {
                mount_source: nfs.mount_source(),
                mount_point: nfs.mount_point.clone(),
                timeout,
            },
        ),
        (
            CHECK_SHARE_READABLE,
            Probe::ShareReadable {
                path: probe_file.clone(),
            },
        ),
        (
            CHECK_SHARE_WRITEABLE,
            Probe::ShareWriteable { path: probe_file },
        ),
    ]
    .into_iter()
    .map(|(name, probe)| Check::new(name, probe).on_fail(remount.clone()))
    .collect()
}

/// One monitor invocation.
pub struct Monitor {
    config: MonitorConfig,
    log: EventLog,
    runner: Box<dyn CommandRunner>,
    alerts: Box<dyn AlertSender>,
}

impl Monitor {
    pub fn new(
        config: MonitorConfig,
        log: EventLog,
        runner: Box<dyn CommandRunner>,
        alerts: Box<dyn AlertSender>,
    ) -> Self {
        Self {
            config,
            log,
            runner,
            alerts,
        }
    }

    /// Monitor that runs host commands and mails alerts over SMTP.
    pub fn with_system_defaults(config: MonitorConfig, log: EventLog) -> Result<Self, MonitorError> {
        let alerts = SmtpAlertSender::new(&config.alert)?;
        Ok(Self::new(config, log, Box::new(SystemRunner), Box::new(alerts)))
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Whether the fallback device already sits on the mount point.
    pub async fn fallback_mounted(&self) -> bool {
        let output = self
            .runner
            .run("df", &args(["-h"]), Some(self.config.probe.command_timeout()))
            .await;
        probe::fallback_mounted(
            &output.stdout,
            &self.config.fallback.device,
            &self.config.nfs.mount_point.to_string_lossy(),
        )
    }

    /// Run the pre-flight guard and, if it passes, the check sequence.
    pub async fn run(&self) -> MonitorStatus {
        self.log.info("starting");

        if self.fallback_mounted().await {
            self.log.error("backup already mounted, exiting");
            return MonitorStatus::FallbackAlreadyMounted;
        }

        let sequence = default_sequence(&self.config);
        debug!(checks = sequence.checks().len(), "Running check sequence");

        let ctx = RunContext {
            runner: self.runner.as_ref(),
            alerts: self.alerts.as_ref(),
            alert: &self.config.alert,
            log: &self.log,
        };

        match sequence.run(&ctx).await {
            RunOutcome::AllPassed => {
                self.log.info("finished, all tests passed");
                MonitorStatus::Healthy
            }
            RunOutcome::Failed { check } => {
                info!(check = %check, "Check failed, fallback remediation executed");
                MonitorStatus::CheckFailed { check }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_default_sequence_order() {
        let sequence = default_sequence(&MonitorConfig::default());
        let names: Vec<&str> = sequence.checks().iter().map(Check::name).collect();
        assert_eq!(
            names,
            vec![
                "Ping",
                "Server available",
                "Share available",
                "Share mounted",
                "Share readable",
                "Share writeable",
            ]
        );
    }

    #[test]
    fn test_default_sequence_bindings() {
        let sequence = default_sequence(&MonitorConfig::default());
        let checks = sequence.checks();
        let timeout = Duration::from_secs(5);

        assert_eq!(
            checks[0].probe(),
            &Probe::Ping {
                host: "172.16.1.1".to_string(),
                deadline_secs: 2
            }
        );
        assert_eq!(
            checks[2].probe(),
            &Probe::ShareExported {
                host: "172.16.1.1".to_string(),
                export_path: "/logs".to_string(),
                timeout
            }
        );
        assert_eq!(
            checks[3].probe(),
            &Probe::ShareMounted {
                mount_source: "172.16.1.1:/logs".to_string(),
                mount_point: PathBuf::from("/mnt/logs"),
                timeout
            }
        );
        assert_eq!(
            checks[5].probe(),
            &Probe::ShareWriteable {
                path: PathBuf::from("/mnt/logs/status.test")
            }
        );
    }

    #[test]
    fn test_every_check_remounts_and_alerts() {
        let sequence = default_sequence(&MonitorConfig::default());
        for check in sequence.checks() {
            assert!(check.alerts(), "{} should alert", check.name());
            assert_eq!(
                check.fail_actions(),
                &[Action::remount("/dev/sda1", "/mnt/logs")]
            );
            assert!(check.success_actions().is_empty());
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(MonitorStatus::Healthy.code(), 0);
        assert_eq!(
            MonitorStatus::CheckFailed {
                check: "Ping".to_string()
            }
            .code(),
            1
        );
        assert_eq!(MonitorStatus::FallbackAlreadyMounted.code(), 1);
    }
}
