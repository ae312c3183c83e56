//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use linkbatch_engine::{ClientSettings, ServiceContract};
use log::LevelFilter;
use url::Url;

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogDestination {
    /// Write to the log file only.
    File,
    /// Write to the terminal (stderr).
    Terminal,
    /// Write to both file and terminal.
    Both,
    /// Disable logging.
    Off,
}

#[derive(Debug, Parser)]
#[command(
    name = "linkbatch",
    version,
    about = "Submit a batch of download links and follow each link's outcome"
)]
pub struct Args {
    /// Base URL of the download service
    #[arg(long, env = "LINKBATCH_BASE_URL", default_value = "http://127.0.0.1:3000")]
    pub base_url: Url,
    /// Password sent as the Authorization header of the submit request
    #[arg(long, env = "PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// File with one link per line; stdin when omitted or "-"
    #[arg(long, short)]
    pub input: Option<PathBuf>,
    /// Talk to a service that answers the submit with all results at once
    #[arg(long, default_value_t = false)]
    pub legacy: bool,
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    pub log: LogDestination,
    #[arg(long, default_value = "linkbatch.log")]
    pub log_file: PathBuf,
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: LevelFilter,
    #[arg(long, default_value_t = 10)]
    pub connect_timeout_secs: u64,
    /// Optional cap on the submit request; unset waits for the service
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,
    /// Omit the time prefix on result lines
    #[arg(long, default_value_t = false)]
    pub no_timestamps: bool,
}

impl Args {
    pub fn client_settings(&self) -> ClientSettings {
        let mut settings = ClientSettings::new(self.base_url.clone());
        settings.contract = if self.legacy {
            ServiceContract::SingleShot
        } else {
            ServiceContract::Streaming
        };
        settings.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        settings.request_timeout = self.request_timeout_secs.map(Duration::from_secs);
        settings
    }

    /// `None` means stdin.
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input
            .as_ref()
            .filter(|path| path.as_os_str() != "-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_local_streaming_service() {
        let args = Args::try_parse_from(["linkbatch"]).unwrap();
        let settings = args.client_settings();
        assert_eq!(settings.base_url.as_str(), "http://127.0.0.1:3000/");
        assert_eq!(settings.contract, ServiceContract::Streaming);
        assert_eq!(settings.request_timeout, None);
        assert_eq!(args.log, LogDestination::Terminal);
        assert_eq!(args.log_level, LevelFilter::Warn);
    }

    #[test]
    fn legacy_flag_and_stdin_dash() {
        let args = Args::try_parse_from([
            "linkbatch",
            "--legacy",
            "--input",
            "-",
            "--request-timeout-secs",
            "30",
            "--log",
            "off",
        ])
        .unwrap();
        assert_eq!(args.client_settings().contract, ServiceContract::SingleShot);
        assert_eq!(
            args.client_settings().request_timeout,
            Some(Duration::from_secs(30))
        );
        assert!(args.input_path().is_none());
        assert_eq!(args.log, LogDestination::Off);
    }

    #[test]
    fn rejects_malformed_base_url() {
        assert!(Args::try_parse_from(["linkbatch", "--base-url", "not a url"]).is_err());
    }
}
