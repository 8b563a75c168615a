//! tock-notify - emails new events from a Tock reservation page.
//!
//! Single run, meant for cron. Scrapes the page in headless Firefox, skips
//! events it already reported, and mails the rest.

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

mod cli;
mod config;
mod diff;
mod error;
mod logging;
mod notify;
mod scrape;
mod store;

use config::Settings;
use notify::SmtpNotifier;
use scrape::BrowserSource;
use store::EventStore;

/// Exit codes.
pub mod exit_code {
    /// Bad or missing settings, same as clap's usage errors.
    pub const CONFIG: i32 = 2;
}

#[derive(Parser, Debug)]
#[command(name = "tock-notify")]
#[command(about = "A simple notification bot for Slightly Toasted events")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long)]
    verbose: bool,

    /// Log to a file instead of the console (for cron)
    #[arg(long)]
    unattended: bool,

    /// Log file used with --unattended [default: st-event-notifications.log]
    #[arg(long = "log_file", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Flat file data store of reported events [default: previous-events.txt]
    #[arg(long = "data_store", value_name = "PATH")]
    data_store: Option<PathBuf>,

    /// TOML file supplying any option not given on the command line
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Path to geckodriver [default: /snap/bin/geckodriver]
    #[arg(long = "firefox_driver", value_name = "PATH", help_heading = "Selenium Settings")]
    firefox_driver: Option<PathBuf>,

    /// Page listing the events
    #[arg(long = "target_url", value_name = "URL", help_heading = "Selenium Settings")]
    target_url: Option<String>,

    /// Seconds to wait for the events panel to render [default: 10]
    #[arg(long = "page_timeout", value_name = "SECS", help_heading = "Selenium Settings")]
    page_timeout: Option<u64>,

    /// SMTP username (required)
    #[arg(short = 'u', value_name = "USERNAME", help_heading = "SMTP Settings")]
    username: Option<String>,

    /// SMTP password (required)
    #[arg(short = 'p', value_name = "PASSWORD", help_heading = "SMTP Settings")]
    password: Option<String>,

    /// Sender address (required)
    #[arg(short = 's', value_name = "SENDER", help_heading = "SMTP Settings")]
    sender: Option<String>,

    /// Recipient address (required)
    #[arg(short = 'r', value_name = "RECIPIENT", help_heading = "SMTP Settings")]
    recipient: Option<String>,

    /// SMTP host [default: email-smtp.us-east-2.amazonaws.com]
    #[arg(long = "smtp_endpoint", value_name = "HOST", help_heading = "SMTP Settings")]
    smtp_endpoint: Option<String>,

    /// SMTP port [default: 587]
    #[arg(long = "smtp_port", value_name = "PORT", help_heading = "SMTP Settings")]
    smtp_port: Option<u16>,
}

fn main() {
    let cli = Cli::parse();

    let settings = match Settings::resolve(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(exit_code::CONFIG);
        }
    };

    if let Err(e) = logging::init(&settings) {
        eprintln!("Error: {}", e);
        std::process::exit(exit_code::CONFIG);
    }

    let mut store = match EventStore::open(&settings.data_store) {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "Cannot open data store");
            eprintln!("Error: {}", e);
            std::process::exit(exit_code::CONFIG);
        }
    };

    let run_started = chrono::Local::now()
        .format(store::TIMESTAMP_FORMAT)
        .to_string();

    let mut source = BrowserSource::new(
        settings.firefox_driver.clone(),
        settings.target_url.clone(),
        settings.page_timeout,
    );
    let notifier = SmtpNotifier::new(settings.smtp.clone());

    // Scrape and delivery failures are logged, never turned into a failing exit.
    let outcome = cli::check::run(&mut store, &mut source, &notifier, &run_started);
    info!(reported = outcome.reported, delivered = outcome.delivered, "Event check finished");
}
