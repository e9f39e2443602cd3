//! Scripted command runner and recording alert sender for driving the
//! monitor without touching the host.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use nfs_status::{
    AlertMessage, AlertSender, CommandOutput, CommandRunner, EventLog, Monitor, MonitorConfig,
    MonitorError,
};
use tempfile::TempDir;

pub const HOST: &str = "172.16.1.1";
pub const DEVICE: &str = "/dev/sda1";

pub const RPCINFO_READY: &str = "program 100003 version 4 ready and waiting\n";
pub const SHOWMOUNT_LOGS: &str = "Export list for 172.16.1.1:\n/logs 172.16.0.0/16\n";

/// Returns canned output per program and records every invocation.
#[derive(Clone, Default)]
pub struct ScriptedRunner {
    responses: Arc<Mutex<HashMap<String, CommandOutput>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedRunner {
    pub fn respond(&self, program: &str, output: CommandOutput) {
        self.responses
            .lock()
            .unwrap()
            .insert(program.to_string(), output);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| c.split(' ').next().unwrap_or_default().to_string())
            .collect()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[String], _limit: Option<Duration>) -> CommandOutput {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", program, args.join(" ")));

        // Unscripted commands (mount, umount) succeed silently.
        self.responses
            .lock()
            .unwrap()
            .get(program)
            .cloned()
            .unwrap_or_else(|| CommandOutput::ok(""))
    }
}

/// Records alerts instead of mailing them.
#[derive(Clone, Default)]
pub struct RecordingAlerts {
    sent: Arc<Mutex<Vec<AlertMessage>>>,
}

impl RecordingAlerts {
    pub fn sent(&self) -> Vec<AlertMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertSender for RecordingAlerts {
    async fn send(&self, message: &AlertMessage) -> Result<(), MonitorError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// A monitor wired to fakes, with the mount point and log in a temp dir.
pub struct Harness {
    pub dir: TempDir,
    pub runner: ScriptedRunner,
    pub alerts: RecordingAlerts,
    pub config: MonitorConfig,
}

impl Harness {
    /// Every probe scripted to pass; probe file present.
    pub fn healthy() -> Self {
        let dir = TempDir::new().unwrap();
        let mount_point = dir.path().join("mnt/logs");
        std::fs::create_dir_all(&mount_point).unwrap();
        std::fs::write(mount_point.join("status.test"), "2024-01-01 00:00:00\n").unwrap();

        let mut config = MonitorConfig::default();
        config.nfs.mount_point = mount_point;
        config.log.path = dir.path().join("nfs_status.log");

        let harness = Self {
            dir,
            runner: ScriptedRunner::default(),
            alerts: RecordingAlerts::default(),
            config,
        };

        harness.runner.respond("ping", CommandOutput::ok(""));
        harness.runner.respond("rpcinfo", CommandOutput::ok(RPCINFO_READY));
        harness.runner.respond("showmount", CommandOutput::ok(SHOWMOUNT_LOGS));
        harness
            .runner
            .respond("df", CommandOutput::ok(harness.df_with(&format!("{HOST}:/logs"))));
        harness
    }

    pub fn mount_point(&self) -> &Path {
        &self.config.nfs.mount_point
    }

    pub fn probe_file(&self) -> PathBuf {
        self.config.nfs.probe_file()
    }

    /// `df -h` output with `source` mounted on the mount point.
    pub fn df_with(&self, source: &str) -> String {
        format!(
            "Filesystem      Size  Used Avail Use% Mounted on\n\
             /dev/nvme0n1p2  234G   80G  143G  36% /\n\
             {source}  1.8T  1.1T  700G  62% {}\n",
            self.mount_point().display()
        )
    }

    pub fn monitor(&self) -> Monitor {
        let log = EventLog::new(Some(self.config.log.path.clone()), false);
        Monitor::new(
            self.config.clone(),
            log,
            Box::new(self.runner.clone()),
            Box::new(self.alerts.clone()),
        )
    }

    pub fn log_lines(&self) -> Vec<String> {
        std::fs::read_to_string(&self.config.log.path)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn umount_call(&self) -> String {
        format!("umount -f -l {}", self.mount_point().display())
    }

    pub fn mount_call(&self) -> String {
        format!("mount {DEVICE} {}", self.mount_point().display())
    }
}
