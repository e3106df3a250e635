use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_VENUE: &str = "hough-end-leisure-centre";
pub const DEFAULT_CATEGORY: &str = "fitness-classes";

#[derive(Debug, Parser)]
#[command(
    name = "classwatch",
    version,
    about = "Watch the Better bookings feed and notify when new fitness-class dates appear"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the date feed, compare against the stored date, notify on change
    Check(CheckArgs),
    /// Try several header configurations against the site to diagnose blocking
    Probe(ProbeArgs),
    /// Serve a local page that records the headers a real browser sends
    Capture(CaptureArgs),
    /// Manage the periodic check registered with termux-job-scheduler
    Schedule(ScheduleArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Venue slug as it appears in the bookings site URL
    #[arg(long, default_value = DEFAULT_VENUE)]
    pub venue: String,

    /// Activity-category slug
    #[arg(long, default_value = DEFAULT_CATEGORY)]
    pub category: String,

    /// File holding the last observed date (defaults to ./last_class_date.txt)
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Print every bookable date in the feed, not just the latest
    #[arg(long)]
    pub list: bool,
}

impl Default for CheckArgs {
    fn default() -> Self {
        Self {
            venue: DEFAULT_VENUE.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            state_file: None,
            list: false,
        }
    }
}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Venue slug as it appears in the bookings site URL
    #[arg(long, default_value = DEFAULT_VENUE)]
    pub venue: String,

    /// Activity-category slug
    #[arg(long, default_value = DEFAULT_CATEGORY)]
    pub category: String,
}

#[derive(Debug, Args)]
pub struct CaptureArgs {
    /// Port to listen on (loopback only)
    #[arg(long, default_value_t = 8000)]
    pub port: u16,
}

#[derive(Debug, Args)]
pub struct ScheduleArgs {
    #[command(subcommand)]
    pub action: ScheduleAction,
}

#[derive(Debug, Subcommand)]
pub enum ScheduleAction {
    /// List jobs currently registered with termux-job-scheduler
    Show,
    /// Register a script to run periodically
    Register {
        /// Script to execute on each period
        script: PathBuf,

        /// Interval between runs, in minutes
        #[arg(long, default_value_t = 30)]
        period_mins: u64,
    },
    /// Cancel every registered job
    Unregister,
}
