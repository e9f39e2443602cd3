//! NFS share health monitor.
//!
//! Runs a fixed, ordered sequence of checks against an NFS-backed mount:
//! reachability, NFS service, export list, mount table, read access and
//! write access. The first failing check triggers its remediation actions
//! (remount a local fallback device over the mount point, send an alert
//! email) and stops the run.
//!
//! # Usage
//!
//! ```no_run
//! use nfs_status::{EventLog, Monitor, MonitorConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = MonitorConfig::default();
//! let log = EventLog::new(Some(config.log.path.clone()), false);
//! let monitor = Monitor::with_system_defaults(config, log)?;
//!
//! let status = monitor.run().await;
//! std::process::exit(i32::from(status.code()));
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`CommandRunner`] is the seam to the operating system (`ping`,
//!   `rpcinfo`, `showmount`, `df`, `mount`, `umount`)
//! - [`probe`] holds the string-matching rules applied to command output
//! - [`Check`] binds a [`Probe`] to its fail/success [`Action`]s
//! - [`TestRunner`] executes checks in order and stops at the first failure
//! - [`AlertSender`] delivers alert mail

pub mod action;
pub mod alert;
pub mod check;
pub mod command;
pub mod config;
pub mod error;
pub mod event_log;
pub mod monitor;
pub mod probe;
pub mod runner;

pub use action::Action;
pub use alert::{AlertMessage, AlertSender, SmtpAlertSender};
pub use check::{Check, Probe};
pub use command::{CommandOutput, CommandRunner, SystemRunner};
pub use config::MonitorConfig;
pub use error::MonitorError;
pub use event_log::{EventLog, Severity};
pub use monitor::{Monitor, MonitorStatus};
pub use runner::{RunContext, RunOutcome, TestRunner};
