mod capture;
mod dates;
mod notify;
mod probe;
mod scheduler;


use anyhow::{Result, anyhow};
use chrono::Local;

use crate::cli::{CheckArgs, Cli, Command, ScheduleAction};
use crate::http;
use crate::paths::default_state_file_path;
use crate::state::StateFile;

use self::dates::{compare_with_previous, format_feed_line, ordering_warning, parse_dates_payload};

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Command::Check(args)) => run_check(&args),
        Some(Command::Probe(args)) => probe::run_probe(&args.venue, &args.category),
        Some(Command::Capture(args)) => capture::run_capture_server(args.port),
        Some(Command::Schedule(args)) => match args.action {
            ScheduleAction::Show => scheduler::show_jobs(),
            ScheduleAction::Register {
                script,
                period_mins,
            } => scheduler::register_job(&script, period_mins),
            ScheduleAction::Unregister => scheduler::unregister_jobs(),
        },
        None => run_check(&CheckArgs::default()),
    }
}

fn run_check(args: &CheckArgs) -> Result<()> {
    let url = http::dates_url(&args.venue, &args.category);
    let referer = http::booking_page_url(&args.venue, &args.category);

    println!(
        "[{}] checking {} / {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        args.venue,
        args.category
    );

    let body = http::get_text(&url, &http::browser_headers(&referer))
        .map_err(|err| anyhow!("fetching {url}: {err}"))?;
    let feed = parse_dates_payload(&body)?;

    let Some(newest) = feed.last() else {
        println!("No dates found.");
        return Ok(());
    };

    if let Some(warning) = ordering_warning(&feed) {
        eprintln!("Warning: {warning}");
    }
    println!("Feed returned {} bookable day(s).", feed.len());
    if args.list {
        for date in &feed {
            println!("  {}", format_feed_line(date));
        }
    }
    println!("Latest bookable date: {}", format_feed_line(newest));

    let state = StateFile::new(
        args.state_file
            .clone()
            .unwrap_or_else(default_state_file_path),
    );
    let stored = state.load();
    for warning in &stored.warnings {
        eprintln!("Warning: {warning}");
    }
    if let Err(err) = state.record(&newest.raw) {
        eprintln!("Warning: {err:#}");
    }

    let outcome = compare_with_previous(stored.value, &newest.raw);
    match (&outcome.previous, outcome.changed) {
        (Some(previous), true) => {
            println!("Date changed: {previous} -> {}", outcome.latest);
            let content = format!(
                "Latest bookable date is now {} (was {previous})",
                outcome.latest
            );
            if notify::send_notification("New fitness class dates", &content) {
                println!("Notification sent.");
            } else {
                println!("Notification not sent (no notification command available).");
            }
        }
        (Some(_), false) => println!("No change since the last check."),
        (None, _) => println!(
            "First recorded check; stored {} in {}.",
            outcome.latest,
            state.path().display()
        ),
    }
    Ok(())
}
