mod commands;
mod http;
mod storage;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use echo_realm_game::{
    DirectOptions, HistoryFilter, StrategyController, Store, SystemClock,
    constants::{DEFAULT_CHAT_ENDPOINT, DEFAULT_CHAT_MODEL, DEFAULT_PROXY_URL},
};
use std::path::PathBuf;

use http::{ConfigFetcher, ConfigLocation, ReqwestTransport};
use storage::FileStorage;

/// Environment variable holding the key for direct mode
const API_KEY_ENV: &str = "GROQ_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AiMode {
    /// Deterministic summaries, no network
    Local,
    /// Trusted local proxy that holds the API key
    Proxy,
    /// Chat endpoint called directly with a key from the environment
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterArg {
    All,
    Entry,
    Quest,
    LevelUp,
}

impl From<FilterArg> for HistoryFilter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::All => Self::All,
            FilterArg::Entry => Self::Entry,
            FilterArg::Quest => Self::Quest,
            FilterArg::LevelUp => Self::LevelUp,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "echo-realm", version)]
#[command(about = "Echo Realm - turn your diary into character progression")]
struct Args {
    /// Directory holding state.json and config.json
    #[arg(long, default_value = ".echo-realm")]
    data_dir: PathBuf,

    /// Summary strategy
    #[arg(long, value_enum, default_value_t = AiMode::Local)]
    ai: AiMode,

    /// Base URL of the summary proxy
    #[arg(long, default_value = DEFAULT_PROXY_URL)]
    proxy_url: String,

    /// Chat model for direct mode
    #[arg(long, default_value = DEFAULT_CHAT_MODEL)]
    model: String,

    /// Chat completions endpoint for direct mode
    #[arg(long, default_value = DEFAULT_CHAT_ENDPOINT)]
    endpoint: String,

    /// Keyword config file or URL (defaults to the bundled config)
    #[arg(long)]
    config_source: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write (or rewrite) a diary entry
    Entry {
        /// Entry text
        text: String,
        /// Day of the entry, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
        /// Mood 1-5
        #[arg(long)]
        mood: Option<i64>,
        /// Energy 1-5
        #[arg(long)]
        energy: Option<i64>,
    },
    /// Manage quests
    #[command(subcommand)]
    Quest(QuestCommand),
    /// Revert the last entry write
    Undo,
    /// Show level, attributes and base
    Status,
    /// Show recent activity
    History {
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Export state and config as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace state with an exported file
    Import { path: PathBuf },
    /// Delete all progress
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Change the player name
    Rename { name: String },
}

#[derive(Debug, Subcommand)]
pub enum QuestCommand {
    /// List quests
    List {
        /// Include finished quests
        #[arg(long)]
        all: bool,
    },
    /// Add a quest for the weakest attribute
    New,
    /// Ask the AI strategy for quest ideas and add them
    Suggest,
    /// Complete an open quest
    Done { id: String },
    /// Skip an open quest
    Skip { id: String },
    /// Replace an open quest (2 per day)
    Reroll { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let storage = FileStorage::open(&args.data_dir)
        .with_context(|| format!("cannot use data dir {}", args.data_dir.display()))?;
    let mut store = Store::load(storage, SystemClock);
    if args.verbose && !store.load_report().is_empty() {
        eprintln!(
            "⚠️  Replaced invalid fields with defaults: {}",
            store.load_report().join(", ").yellow()
        );
    }

    let transport = ReqwestTransport::new();
    if !store.has_config() || args.config_source.is_some() {
        let fetcher = ConfigFetcher {
            location: ConfigLocation::parse(args.config_source.as_deref()),
            transport: &transport,
        };
        store.refresh_config(&fetcher).await;
    }

    let mut controller = StrategyController::new(
        transport,
        DirectOptions {
            endpoint: args.endpoint.clone(),
            model: args.model.clone(),
        },
    );
    activate_strategy(&args, &mut controller).await;

    commands::run(args.command, &mut store, &mut controller).await
}

async fn activate_strategy(args: &Args, controller: &mut StrategyController<ReqwestTransport>) {
    match args.ai {
        AiMode::Local => {}
        AiMode::Direct => match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => {
                controller.activate_direct(key.trim(), chrono::Utc::now());
            }
            _ => eprintln!(
                "⚠️  {} not set, using local summaries",
                API_KEY_ENV.yellow()
            ),
        },
        AiMode::Proxy => {
            if let Err(err) = controller.activate_proxied(Some(&args.proxy_url)).await {
                eprintln!(
                    "⚠️  Proxy {} unavailable ({err}), using local summaries",
                    args.proxy_url.yellow()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entry_with_flags() {
        let args = Args::try_parse_from([
            "echo-realm",
            "--ai",
            "proxy",
            "entry",
            "Heute Sport gemacht",
            "--date",
            "2024-05-01",
            "--mood",
            "4",
        ])
        .unwrap();
        assert_eq!(args.ai, AiMode::Proxy);
        assert_eq!(args.proxy_url, DEFAULT_PROXY_URL);
        match args.command {
            Command::Entry {
                text, date, mood, energy,
            } => {
                assert_eq!(text, "Heute Sport gemacht");
                assert_eq!(date, chrono::NaiveDate::from_ymd_opt(2024, 5, 1));
                assert_eq!(mood, Some(4));
                assert_eq!(energy, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_quest_and_history_subcommands() {
        let args = Args::try_parse_from(["echo-realm", "quest", "reroll", "q-1"]).unwrap();
        assert!(matches!(args.command, Command::Quest(QuestCommand::Reroll { ref id }) if id == "q-1"));

        let args =
            Args::try_parse_from(["echo-realm", "history", "--filter", "level-up"]).unwrap();
        match args.command {
            Command::History { filter, limit } => {
                assert_eq!(HistoryFilter::from(filter), HistoryFilter::LevelUp);
                assert_eq!(limit, 20);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_ai_mode() {
        assert!(Args::try_parse_from(["echo-realm", "--ai", "cloud", "status"]).is_err());
    }
}
