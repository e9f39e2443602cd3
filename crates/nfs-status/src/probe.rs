//! Pass/fail rules over raw command output.
//!
//! These are the actual contract with `rpcinfo`, `showmount` and `df`: plain
//! substring matches on whatever the tool printed. An empty string (the
//! result of a timed-out command) fails every rule.

/// Phrase `rpcinfo -t <host> nfs 4` prints when the NFSv4 service answers.
pub const NFS4_READY: &str = "version 4 ready and waiting";

/// `rpcinfo` reports NFS version 4 as ready.
pub fn nfs4_ready(rpcinfo_output: &str) -> bool {
    rpcinfo_output.contains(NFS4_READY)
}

/// `showmount -e` lists the export path (e.g. `/logs`).
pub fn share_exported(showmount_output: &str, export_path: &str) -> bool {
    !export_path.is_empty() && showmount_output.contains(export_path)
}

/// `df` shows the share source (`<host>:/<share>`) and the mount point.
pub fn share_mounted(df_output: &str, mount_source: &str, mount_point: &str) -> bool {
    df_output.contains(mount_source) && df_output.contains(mount_point)
}

/// `df` shows the fallback device and the mount point.
pub fn fallback_mounted(df_output: &str, device: &str, mount_point: &str) -> bool {
    df_output.contains(device) && df_output.contains(mount_point)
}
