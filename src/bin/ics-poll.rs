//! Periodically downloads every calendar listed in a settings file, and reports what is cached.
//!
//! Usage: `ics-poll <settings.json> [tick in seconds]`

use std::path::Path;
use std::time::Duration;

use ics_fetcher::config::Settings;
use ics_fetcher::traits::CalendarSource;
use ics_fetcher::{CalendarData, FetchOutcome};

const DEFAULT_TICK_SECS: u64 = 60;

#[tokio::main]
async fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let settings_path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("Usage: ics-poll <settings.json> [tick in seconds]");
            std::process::exit(2);
        },
    };
    let tick = parse_tick(args.next());

    let settings = match Settings::from_file(Path::new(&settings_path)) {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Invalid settings file: {}", err);
            std::process::exit(1);
        },
    };
    if settings.calendars.is_empty() {
        log::warn!("No calendar in {}, nothing to do", settings_path);
        return;
    }

    let client = reqwest::Client::new();
    let mut handles = Vec::new();
    for entry in settings.calendars {
        let mut calendar = CalendarData::new(client.clone(), entry.source_config());
        calendar.configure(&entry.connection_options());
        log::info!("Polling {} from {} (at most every {:?})", calendar.name(), calendar.url(), calendar.min_update_time());
        handles.push(tokio::spawn(poll(calendar, tick)));
    }

    for handle in handles {
        if let Err(err) = handle.await {
            log::error!("A polling task ended unexpectedly: {}", err);
        }
    }
}

/// A missing, unparsable or zero tick falls back to the default one
fn parse_tick(arg: Option<String>) -> Duration {
    let secs = arg
        .and_then(|secs| secs.parse::<u64>().ok())
        .filter(|&secs| secs > 0)
        .unwrap_or(DEFAULT_TICK_SECS);
    Duration::from_secs(secs)
}

async fn poll<S: CalendarSource>(mut source: S, tick: Duration) {
    let mut interval = tokio::time::interval(tick);
    loop {
        interval.tick().await;
        match source.download_calendar().await {
            FetchOutcome::Fetched => log::info!("{}: downloaded", source.name()),
            FetchOutcome::Skipped => log::debug!("{}: still fresh", source.name()),
            FetchOutcome::Failed(_) => log::info!("{}: no data until the next download", source.name()),
        }
        match source.get() {
            Some(text) => println!("{}\t{} bytes", source.name(), text.len()),
            None => println!("{}\t(no data)", source.name()),
        }
    }
}
