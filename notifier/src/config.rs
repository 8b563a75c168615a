//! Run settings, resolved from command-line flags and an optional TOML file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::Error;
use crate::Cli;

pub const DEFAULT_DATA_STORE: &str = "previous-events.txt";
pub const DEFAULT_FIREFOX_DRIVER: &str = "/snap/bin/geckodriver";
pub const DEFAULT_LOG_FILE: &str = "st-event-notifications.log";
pub const DEFAULT_TARGET_URL: &str = "https://www.exploretock.com/slightlytoasted";
pub const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SMTP_ENDPOINT: &str = "email-smtp.us-east-2.amazonaws.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub verbose: bool,
    pub unattended: bool,
    pub log_file: PathBuf,
    pub data_store: PathBuf,
    pub firefox_driver: PathBuf,
    pub target_url: String,
    pub page_timeout: Duration,
    pub smtp: SmtpSettings,
}

/// SMTP endpoint and credentials.
#[derive(Clone)]
pub struct SmtpSettings {
    pub username: String,
    pub password: String,
    pub sender: String,
    pub recipient: String,
    pub endpoint: String,
    pub port: u16,
}

// Keep the password out of debug logs.
impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sender", &self.sender)
            .field("recipient", &self.recipient)
            .field("endpoint", &self.endpoint)
            .field("port", &self.port)
            .finish()
    }
}

/// On-disk config file layout. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    log_file: Option<PathBuf>,
    data_store: Option<PathBuf>,
    firefox_driver: Option<PathBuf>,
    target_url: Option<String>,
    page_timeout: Option<u64>,
    smtp: FileSmtp,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSmtp {
    username: Option<String>,
    password: Option<String>,
    sender: Option<String>,
    recipient: Option<String>,
    endpoint: Option<String>,
    port: Option<u16>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }
}

impl Settings {
    /// Merge command-line flags over the config file (if any) over defaults.
    ///
    /// Fails when a required SMTP credential is given nowhere.
    pub fn resolve(cli: &Cli) -> Result<Self, Error> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let smtp = SmtpSettings {
            username: required(cli.username.clone(), file.smtp.username, "-u (SMTP username)")?,
            password: required(cli.password.clone(), file.smtp.password, "-p (SMTP password)")?,
            sender: required(cli.sender.clone(), file.smtp.sender, "-s (sender address)")?,
            recipient: required(
                cli.recipient.clone(),
                file.smtp.recipient,
                "-r (recipient address)",
            )?,
            endpoint: cli
                .smtp_endpoint
                .clone()
                .or(file.smtp.endpoint)
                .unwrap_or_else(|| DEFAULT_SMTP_ENDPOINT.to_string()),
            port: cli.smtp_port.or(file.smtp.port).unwrap_or(DEFAULT_SMTP_PORT),
        };

        Ok(Self {
            verbose: cli.verbose,
            unattended: cli.unattended,
            log_file: cli
                .log_file
                .clone()
                .or(file.log_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            data_store: cli
                .data_store
                .clone()
                .or(file.data_store)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_STORE)),
            firefox_driver: cli
                .firefox_driver
                .clone()
                .or(file.firefox_driver)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FIREFOX_DRIVER)),
            target_url: cli
                .target_url
                .clone()
                .or(file.target_url)
                .unwrap_or_else(|| DEFAULT_TARGET_URL.to_string()),
            page_timeout: Duration::from_secs(
                cli.page_timeout
                    .or(file.page_timeout)
                    .unwrap_or(DEFAULT_PAGE_TIMEOUT_SECS),
            ),
            smtp,
        })
    }
}

fn required(
    flag: Option<String>,
    file: Option<String>,
    name: &'static str,
) -> Result<String, Error> {
    flag.or(file)
        .filter(|v| !v.is_empty())
        .ok_or(Error::MissingSetting(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tock-notify").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_with_required_flags() {
        let cli = parse(&["-u", "user", "-p", "secret", "-s", "a@b.c", "-r", "d@e.f"]);
        let settings = Settings::resolve(&cli).unwrap();

        assert!(!settings.verbose);
        assert!(!settings.unattended);
        assert_eq!(settings.data_store, PathBuf::from("previous-events.txt"));
        assert_eq!(settings.firefox_driver, PathBuf::from("/snap/bin/geckodriver"));
        assert_eq!(settings.target_url, DEFAULT_TARGET_URL);
        assert_eq!(settings.page_timeout, Duration::from_secs(10));
        assert_eq!(settings.smtp.endpoint, "email-smtp.us-east-2.amazonaws.com");
        assert_eq!(settings.smtp.port, 587);
        assert_eq!(settings.smtp.username, "user");
        assert_eq!(settings.smtp.recipient, "d@e.f");
    }

    #[test]
    fn test_underscore_flags() {
        let cli = parse(&[
            "-u",
            "user",
            "-p",
            "secret",
            "-s",
            "a@b.c",
            "-r",
            "d@e.f",
            "--verbose",
            "--unattended",
            "--data_store",
            "events.txt",
            "--firefox_driver",
            "/usr/bin/geckodriver",
            "--smtp_endpoint",
            "smtp.example.com",
            "--smtp_port",
            "2587",
        ]);
        let settings = Settings::resolve(&cli).unwrap();

        assert!(settings.verbose);
        assert!(settings.unattended);
        assert_eq!(settings.data_store, PathBuf::from("events.txt"));
        assert_eq!(settings.firefox_driver, PathBuf::from("/usr/bin/geckodriver"));
        assert_eq!(settings.smtp.endpoint, "smtp.example.com");
        assert_eq!(settings.smtp.port, 2587);
    }

    #[test]
    fn test_missing_credential_is_error() {
        let cli = parse(&["-u", "user", "-p", "secret", "-s", "a@b.c"]);
        let err = Settings::resolve(&cli).unwrap_err();
        assert!(matches!(err, Error::MissingSetting(name) if name.starts_with("-r")));
    }

    #[test]
    fn test_config_file_fills_gaps_and_cli_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
data_store = "from-file.txt"
page_timeout = 30

[smtp]
username = "file-user"
password = "file-secret"
sender = "bot@example.com"
recipient = "me@example.com"
port = 465
"#
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = parse(&["--config", path.as_str(), "-u", "cli-user", "--smtp_port", "25"]);
        let settings = Settings::resolve(&cli).unwrap();

        assert_eq!(settings.smtp.username, "cli-user");
        assert_eq!(settings.smtp.password, "file-secret");
        assert_eq!(settings.smtp.sender, "bot@example.com");
        assert_eq!(settings.smtp.port, 25);
        assert_eq!(settings.data_store, PathBuf::from("from-file.txt"));
        assert_eq!(settings.page_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_unknown_config_key_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "smtp_host = \"nope\"").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = parse(&["--config", path.as_str()]);
        assert!(matches!(
            Settings::resolve(&cli),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn test_password_redacted_in_debug() {
        let cli = parse(&["-u", "user", "-p", "hunter2", "-s", "a@b.c", "-r", "d@e.f"]);
        let settings = Settings::resolve(&cli).unwrap();
        let shown = format!("{:?}", settings);
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("<redacted>"));
    }
}
