//! Remediation actions attached to checks.

use std::fmt;
use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::alert::AlertMessage;
use crate::command::args;
use crate::runner::RunContext;

/// A side effect run after a check, with its arguments bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Mount the local fallback device over the share's mount point,
    /// lazily force-unmounting whatever is there first when `unmount` is set.
    Remount {
        device: String,
        mount_point: PathBuf,
        unmount: bool,
    },
    /// Mail an alert naming the failure.
    SendAlert { failure: String },
}

impl Action {
    /// Fallback remount that unmounts the share first.
    pub fn remount(device: impl Into<String>, mount_point: impl Into<PathBuf>) -> Self {
        Self::Remount {
            device: device.into(),
            mount_point: mount_point.into(),
            unmount: true,
        }
    }

    /// Run the action. Best-effort: command exit statuses are logged, never
    /// retried, and alert delivery failures are recorded without aborting.
    pub async fn execute(&self, ctx: &RunContext<'_>) {
        match self {
            Self::Remount {
                device,
                mount_point,
                unmount,
            } => {
                let mount_point = mount_point.to_string_lossy().into_owned();

                if *unmount {
                    let output = ctx
                        .runner
                        .run("umount", &args(["-f", "-l", mount_point.as_str()]), None)
                        .await;
                    if !output.success {
                        warn!(mount_point = %mount_point, "umount did not succeed");
                    }
                }

                let output = ctx
                    .runner
                    .run("mount", &args([device.as_str(), mount_point.as_str()]), None)
                    .await;
                if output.success {
                    info!(device = %device, mount_point = %mount_point, "Fallback device mounted");
                } else {
                    warn!(device = %device, mount_point = %mount_point, "mount did not succeed");
                }
            }
            Self::SendAlert { failure } => {
                let message = AlertMessage::compose(failure, ctx.alert);
                if let Err(e) = ctx.alerts.send(&message).await {
                    error!(error = %e, failure = %failure, "Alert delivery failed");
                    ctx.log.error(format!("alert delivery failed: {e}"));
                }
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remount {
                device,
                mount_point,
                unmount,
            } => write!(
                f,
                "remount({}, {}, unmount={})",
                device,
                mount_point.display(),
                unmount
            ),
            Self::SendAlert { failure } => write!(f, "send_alert({failure})"),
        }
    }
}
