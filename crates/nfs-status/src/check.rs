//! Checks: a named probe plus the actions to run on its outcome.

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::action::Action;
use crate::command::args;
use crate::event_log::timestamp;
use crate::probe;
use crate::runner::RunContext;

/// A health predicate with its arguments bound at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// One ICMP echo; `deadline_secs` is passed to `ping -w`
    Ping { host: String, deadline_secs: u64 },
    /// `rpcinfo -t <host> nfs 4` reports the service ready
    NfsService { host: String, timeout: Duration },
    /// `showmount -e <host>` lists the export
    ShareExported {
        host: String,
        export_path: String,
        timeout: Duration,
    },
    /// `df -h` shows the share mounted at the mount point
    ShareMounted {
        mount_source: String,
        mount_point: PathBuf,
        timeout: Duration,
    },
    /// The probe file opens for reading
    ShareReadable { path: PathBuf },
    /// A timestamp line can be written to the probe file
    ShareWriteable { path: PathBuf },
}

impl Probe {
    /// Evaluate the predicate. `true` means healthy.
    pub async fn evaluate(&self, ctx: &RunContext<'_>) -> bool {
        match self {
            Self::Ping {
                host,
                deadline_secs,
            } => {
                let deadline = deadline_secs.to_string();
                let argv = args(["-c", "1", "-w", deadline.as_str(), host.as_str()]);
                ctx.runner.run("ping", &argv, None).await.success
            }
            Self::NfsService { host, timeout } => {
                let output = ctx
                    .runner
                    .run("rpcinfo", &args(["-t", host.as_str(), "nfs", "4"]), Some(*timeout))
                    .await;
                probe::nfs4_ready(&output.stdout)
            }
            Self::ShareExported {
                host,
                export_path,
                timeout,
            } => {
                let output = ctx
                    .runner
                    .run("showmount", &args(["-e", host.as_str()]), Some(*timeout))
                    .await;
                probe::share_exported(&output.stdout, export_path)
            }
            Self::ShareMounted {
                mount_source,
                mount_point,
                timeout,
            } => {
                let output = ctx.runner.run("df", &args(["-h"]), Some(*timeout)).await;
                probe::share_mounted(
                    &output.stdout,
                    mount_source,
                    &mount_point.to_string_lossy(),
                )
            }
            Self::ShareReadable { path } => {
                let opened = match tokio::fs::File::open(path).await {
                    Ok(file) => file.metadata().await,
                    Err(e) => Err(e),
                };
                match opened {
                    Ok(meta) if meta.is_file() => true,
                    Ok(_) => {
                        debug!(path = %path.display(), "Probe path is not a regular file");
                        false
                    }
                    Err(e) => {
                        debug!(path = %path.display(), error = %e, "Probe file not readable");
                        false
                    }
                }
            }
            Self::ShareWriteable { path } => {
                match tokio::fs::write(path, format!("{}\n", timestamp())).await {
                    Ok(()) => true,
                    Err(e) => {
                        debug!(path = %path.display(), error = %e, "Probe file not writeable");
                        false
                    }
                }
            }
        }
    }
}

/// A named probe with its fail and success actions.
#[derive(Debug, Clone)]
pub struct Check {
    name: String,
    probe: Probe,
    alert: bool,
    fail_actions: Vec<Action>,
    success_actions: Vec<Action>,
}

impl Check {
    /// New check; alerts on failure unless [`Check::without_alert`] is used.
    pub fn new(name: impl Into<String>, probe: Probe) -> Self {
        Self {
            name: name.into(),
            probe,
            alert: true,
            fail_actions: Vec::new(),
            success_actions: Vec::new(),
        }
    }

    /// Register an action to run when the probe fails.
    #[must_use]
    pub fn on_fail(mut self, action: Action) -> Self {
        self.fail_actions.push(action);
        self
    }

    /// Register an action to run when the probe passes.
    #[must_use]
    pub fn on_success(mut self, action: Action) -> Self {
        self.success_actions.push(action);
        self
    }

    /// Do not send an alert when this check fails.
    #[must_use]
    pub fn without_alert(mut self) -> Self {
        self.alert = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn probe(&self) -> &Probe {
        &self.probe
    }

    pub fn alerts(&self) -> bool {
        self.alert
    }

    pub fn fail_actions(&self) -> &[Action] {
        &self.fail_actions
    }

    pub fn success_actions(&self) -> &[Action] {
        &self.success_actions
    }

    /// Actions to execute for an outcome, in registration order.
    ///
    /// On failure an alert-eligible check gets a trailing
    /// [`Action::SendAlert`] naming it. The check itself is not modified.
    pub fn actions_for(&self, passed: bool) -> Vec<Action> {
        if passed {
            return self.success_actions.clone();
        }

        let mut actions = self.fail_actions.clone();
        if self.alert {
            actions.push(Action::SendAlert {
                failure: format!("{} test failed", self.name),
            });
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remount() -> Action {
        Action::remount("/dev/sda1", "/mnt/logs")
    }

    #[test]
    fn test_alert_appended_on_failure() {
        let check = Check::new("Ping", Probe::ShareReadable { path: "/x".into() }).on_fail(remount());

        let actions = check.actions_for(false);
        assert_eq!(
            actions,
            vec![
                remount(),
                Action::SendAlert {
                    failure: "Ping test failed".to_string()
                }
            ]
        );
        // Effective actions are computed per outcome; registration is untouched.
        assert_eq!(check.fail_actions(), &[remount()]);
    }

    #[test]
    fn test_no_alert_when_not_eligible() {
        let check = Check::new("Ping", Probe::ShareReadable { path: "/x".into() })
            .on_fail(remount())
            .without_alert();

        assert!(!check.alerts());
        assert_eq!(check.actions_for(false), vec![remount()]);
    }

    #[test]
    fn test_no_alert_on_success() {
        let marker = Action::remount("/dev/sdb1", "/mnt/spare");
        let check = Check::new("Ping", Probe::ShareReadable { path: "/x".into() })
            .on_fail(remount())
            .on_success(marker.clone());

        assert_eq!(check.actions_for(true), vec![marker]);
    }

    #[test]
    fn test_empty_action_lists() {
        let check = Check::new("Share readable", Probe::ShareReadable { path: "/x".into() })
            .without_alert();
        assert!(check.actions_for(true).is_empty());
        assert!(check.actions_for(false).is_empty());
    }

    #[test]
    fn test_registration_order_kept() {
        let first = Action::remount("/dev/sda1", "/mnt/logs");
        let second = Action::remount("/dev/sdb1", "/mnt/logs");
        let check = Check::new("Share mounted", Probe::ShareReadable { path: "/x".into() })
            .on_fail(first.clone())
            .on_fail(second.clone());

        let actions = check.actions_for(false);
        assert_eq!(actions[0], first);
        assert_eq!(actions[1], second);
        assert!(matches!(actions[2], Action::SendAlert { .. }));
    }
}
