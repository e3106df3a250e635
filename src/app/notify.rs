use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command as ProcessCommand, Stdio};

/// Best effort: true if some notification command ran and exited zero.
/// A missing command, spawn failure or non-zero exit all just mean "not sent".
pub(crate) fn send_notification(title: &str, content: &str) -> bool {
    if let Some(custom) = resolve_notify_bin_from_env(env::var_os("CLASSWATCH_NOTIFY_BIN")) {
        return run_notify(
            ProcessCommand::new(custom).args(["--title", title, "--content", content]),
        );
    }

    run_notify(
        ProcessCommand::new("termux-notification").args(["--title", title, "--content", content]),
    ) || run_notify(ProcessCommand::new("notify-send").arg(title).arg(content))
}

pub(crate) fn resolve_notify_bin_from_env(env_value: Option<OsString>) -> Option<PathBuf> {
    match env_value {
        Some(value) if !value.is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}

fn run_notify(cmd: &mut ProcessCommand) -> bool {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}
