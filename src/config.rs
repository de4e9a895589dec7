// 🔧 Configuration - command line flags with environment fallbacks

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Flags shared by the terminal app and the API server
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// JSON fixture file replacing the built-in demo data
    #[arg(long, env = "ZENSPEND_DATA")]
    pub data: Option<PathBuf>,

    /// Delay before the coach answers, in milliseconds
    #[arg(long, env = "ZENSPEND_COACH_DELAY_MS", default_value_t = 1500)]
    pub coach_delay_ms: u64,

    /// Log filter, e.g. "info" or "zenspend=debug"
    #[arg(long = "log", env = "ZENSPEND_LOG")]
    pub log: Option<String>,
}

impl CommonArgs {
    pub fn coach_delay(&self) -> Duration {
        Duration::from_millis(self.coach_delay_ms)
    }

    /// Explicit filter if given, otherwise `default`
    pub fn log_filter<'a>(&'a self, default: &'a str) -> &'a str {
        self.log.as_deref().unwrap_or(default)
    }
}

#[derive(Debug, Parser)]
#[command(name = "zenspend", version, about = "Personal finance dashboard")]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Open the terminal dashboard (default)
    Ui,
    /// Print the dashboard overview
    Summary,
    /// Ask the financial coach one question
    Ask {
        question: String,
    },
    /// Import transactions from a CSV file and report what would be added
    Import {
        csv: PathBuf,
    },
}

#[derive(Debug, Parser)]
#[command(name = "zenspend-server", version, about = "ZenSpend JSON API")]
pub struct ServerCli {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Address to listen on
    #[arg(long, env = "ZENSPEND_BIND", default_value = "0.0.0.0:3000")]
    pub bind: String,
}

/// Install the global tracing subscriber; logs go to stderr.
/// Calling it twice is harmless (the second call is ignored).
pub fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
        ServerCli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["zenspend"]).unwrap();

        assert!(cli.command.is_none());
        assert_eq!(cli.common.coach_delay(), Duration::from_millis(1500));
        assert_eq!(cli.common.log_filter("warn"), "warn");
    }

    #[test]
    fn test_subcommands() {
        let cli = Cli::try_parse_from(["zenspend", "ask", "Where can I cut expenses?"]).unwrap();
        match cli.command {
            Some(Command::Ask { question }) => assert_eq!(question, "Where can I cut expenses?"),
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["zenspend", "--coach-delay-ms", "0", "import", "tx.csv"]).unwrap();
        assert_eq!(cli.common.coach_delay(), Duration::ZERO);
        assert!(matches!(cli.command, Some(Command::Import { .. })));
    }

    #[test]
    fn test_server_flags() {
        let cli = ServerCli::try_parse_from(["zenspend-server", "--bind", "127.0.0.1:8080", "--log", "debug"]).unwrap();

        assert_eq!(cli.bind, "127.0.0.1:8080");
        assert_eq!(cli.common.log_filter("info"), "debug");
    }
}
