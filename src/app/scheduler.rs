use std::env;
use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::Command as ProcessCommand;

use anyhow::{Result, anyhow, bail};

const SCHEDULER_BIN: &str = "termux-job-scheduler";

pub(crate) fn period_ms_for_minutes(minutes: u64) -> u64 {
    minutes.saturating_mul(60_000)
}

pub(crate) fn show_jobs() -> Result<()> {
    warn_if_not_termux();
    let output = run_scheduler(&[OsStr::new("--show")])?;
    let trimmed = output.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("no scheduled jobs") {
        println!("No scheduled jobs.");
        println!("Register the periodic check with: classwatch schedule register <script>");
        return Ok(());
    }
    println!("{trimmed}");
    Ok(())
}

pub(crate) fn register_job(script: &Path, period_mins: u64) -> Result<()> {
    warn_if_not_termux();
    if !script.exists() {
        bail!("script {} does not exist", script.display());
    }

    let period_ms = period_ms_for_minutes(period_mins).to_string();
    let output = run_scheduler(&[
        OsStr::new("--script"),
        script.as_os_str(),
        OsStr::new("--period-ms"),
        OsStr::new(&period_ms),
    ])?;
    if !output.trim().is_empty() {
        println!("{}", output.trim());
    }
    println!(
        "Registered {} to run every {period_mins} minute(s).",
        script.display()
    );
    Ok(())
}

pub(crate) fn unregister_jobs() -> Result<()> {
    warn_if_not_termux();
    let before = run_scheduler(&[OsStr::new("--show")])?;
    let before = before.trim();
    if !before.is_empty() && !before.eq_ignore_ascii_case("no scheduled jobs") {
        println!("Cancelling:");
        println!("{before}");
    }

    let output = run_scheduler(&[OsStr::new("--cancel-all")])?;
    if !output.trim().is_empty() {
        println!("{}", output.trim());
    }
    println!("All scheduled jobs cancelled.");
    Ok(())
}

fn warn_if_not_termux() {
    if env::var_os("TERMUX_VERSION").is_none() {
        eprintln!(
            "Warning: TERMUX_VERSION is not set; {SCHEDULER_BIN} is normally only available inside Termux."
        );
    }
}

fn run_scheduler(args: &[&OsStr]) -> Result<String> {
    let output = ProcessCommand::new(SCHEDULER_BIN)
        .args(args)
        .output()
        .map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                anyhow!(
                    "{SCHEDULER_BIN} not found; install the Termux:API app and run `pkg install termux-api`"
                )
            } else {
                anyhow!("failed to run {SCHEDULER_BIN}: {err}")
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            bail!("{SCHEDULER_BIN} exited with status {}", output.status);
        }
        bail!(
            "{SCHEDULER_BIN} exited with status {}: {stderr}",
            output.status
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
