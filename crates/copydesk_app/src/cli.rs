use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use copydesk_logging::LogDestination;

#[derive(Parser, Debug)]
#[command(name = "copydesk", author, version, about = "Batch SEO article generation and publishing")]
pub struct Cli {
    /// RON configuration file
    #[arg(long, env = "COPYDESK_CONFIG", default_value = "copydesk.ron", global = true)]
    pub config: PathBuf,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogTarget::Terminal, global = true)]
    pub log: LogTarget,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Generate one article per line (`keyword` or `keyword | custom title`)
    Generate {
        /// Batch file; reads stdin when omitted
        #[arg(long, short)]
        file: Option<PathBuf>,
        /// Client id or name from the config file
        #[arg(long)]
        client: Option<String>,
        #[arg(long, default_value = "th")]
        language: String,
        #[arg(long, default_value = "Professional")]
        tone: String,
    },
    /// Suggest ten titles for a keyword
    Brainstorm {
        keyword: String,
        #[arg(long, default_value = "th")]
        language: String,
        #[arg(long, default_value = "Professional")]
        tone: String,
    },
    /// List stored articles, newest first
    List,
    /// Repair articles whose body is a raw JSON blob
    FixFormat {
        #[arg(required_unless_present = "all")]
        ids: Vec<String>,
        /// Check every stored article
        #[arg(long, conflicts_with = "ids")]
        all: bool,
    },
    /// Delete stored articles
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Publish articles to their client's WordPress site
    Publish {
        #[arg(required = true)]
        ids: Vec<String>,
        /// Create the post as a draft
        #[arg(long)]
        draft: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, LogTarget};
    use clap::Parser;

    #[test]
    fn generate_defaults() {
        let cli = Cli::try_parse_from(["copydesk", "generate"]).unwrap();
        assert_eq!(cli.log, LogTarget::Terminal);
        assert_eq!(
            cli.command,
            Command::Generate {
                file: None,
                client: None,
                language: "th".to_string(),
                tone: "Professional".to_string(),
            }
        );
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli =
            Cli::try_parse_from(["copydesk", "publish", "abc", "--draft", "--log", "both", "-v"])
                .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.log, LogTarget::Both);
        assert_eq!(
            cli.command,
            Command::Publish {
                ids: vec!["abc".to_string()],
                draft: true,
            }
        );
    }

    #[test]
    fn fix_format_needs_ids_or_all() {
        assert!(Cli::try_parse_from(["copydesk", "fix-format"]).is_err());
        assert!(Cli::try_parse_from(["copydesk", "fix-format", "a", "--all"]).is_err());
        let cli = Cli::try_parse_from(["copydesk", "fix-format", "--all"]).unwrap();
        assert_eq!(
            cli.command,
            Command::FixFormat {
                ids: Vec::new(),
                all: true,
            }
        );
    }
}
