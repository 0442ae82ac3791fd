//! 🚀 esf-cli — the front door for poking a search cluster through the facade.
//!
//! 🎬 *[narrator voice]* "It all started with a simple main() function..."
//! 📦 This binary loads config, sets up logging, runs ONE facade operation, prints
//! whatever came back, and leaves. Like a very efficient houseguest. 🦆

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL};
use esf::{BulkRequest, Page, QueryStrategy, SearchFacade, Service};
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// 🔍 esf — talk to a search cluster through the search facade
#[derive(Parser, Debug)]
#[command(name = "esf", version, about)]
struct Cli {
    /// TOML config file. Missing file → env vars (ESF_*) and defaults only.
    #[arg(short, long, env = "ESF_CONFIG", default_value = "esf.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether a document exists
    Exists { index: String, id: String },

    /// Create a document, or merge fields into it if it already exists
    Index {
        index: String,
        id: String,
        /// The document (or the fields to merge), as JSON
        document: String,
    },

    /// Run a search and print the raw response
    Search(SearchArgs),

    /// Run a search and print only the matching ids
    Ids(SearchArgs),

    /// Send a batch of operations from a JSON file
    Bulk {
        /// JSON file: {"index": "...", "operations": [{"action": "index", ...}, ...]}
        file: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct SearchArgs {
    index: String,
    term: String,
    /// Field to search; repeat for more fields
    #[arg(short, long = "field")]
    fields: Vec<String>,
    #[arg(long, default_value_t = 0)]
    from: u32,
    #[arg(long, default_value_t = 25)]
    size: u32,
    /// exact_match | wildcard_dis_max | multi_match | relevance (default: from config)
    #[arg(long)]
    strategy: Option<QueryStrategy>,
}

/// 🚀 main() — init tracing, load config, run the command, explain failures kindly.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        error!("💀 error: {}", err);
        // 🧅 peel the onion of sadness, one layer at a time
        let mut the_vibes_are_giving_connection_issues = looks_like_connection_trouble(&err.to_string());
        for cause in err.chain().skip(1) {
            error!("⚠️  cause: {}", cause);
            the_vibes_are_giving_connection_issues |= looks_like_connection_trouble(&cause.to_string());
        }

        if the_vibes_are_giving_connection_issues {
            error!(
                "🔧 hint: looks like the search cluster isn't reachable. \
                Double-check host, port and scheme in your config, and that the cluster \
                is actually running. If you're using Docker, `docker ps` knows the truth. ☕"
            );
        }

        std::process::exit(1);
    }

    Ok(())
}

fn looks_like_connection_trouble(message: &str) -> bool {
    message.contains("error sending request")
        || message.contains("never got an answer")
        || message.contains("onnection refused")
        || message.contains("tcp connect error")
        || message.contains("dns error")
}

async fn run(cli: Cli) -> Result<()> {
    // 🔒 a missing config file is fine; env vars and defaults carry the day
    let config_file = cli
        .config
        .try_exists()
        .with_context(|| {
            format!(
                "💀 Couldn't even check whether the config file exists. Was checking here: '{}'",
                cli.config.display()
            )
        })?
        .then_some(cli.config.as_path());

    let app_config = esf::load_config(config_file)
        .context("💀 Couldn't load the config. Check the TOML and any ESF_* env vars.")?;

    let mut facade = SearchFacade::from_app_config(&app_config);
    facade.initialise()?;
    info!("🔌 Using cluster at {}:{}", app_config.connection.host, app_config.connection.port);

    let outcome = execute(&mut facade, cli.command).await;
    facade.destroy();
    outcome
}

async fn execute(facade: &mut SearchFacade, command: Command) -> Result<()> {
    match command {
        Command::Exists { index, id } => {
            let found = facade.exists(&index, id).await?;
            println!("{found}");
        }
        Command::Index {
            index,
            id,
            document,
        } => {
            let document: Value = serde_json::from_str(&document)
                .context("💀 The document argument isn't valid JSON.")?;
            let response = facade.index(&index, id, document).await?;
            print_json(&response)?;
        }
        Command::Search(args) => {
            let strategy = args.strategy.unwrap_or(facade.query_strategy());
            let response = facade
                .search_with(
                    strategy,
                    &args.index,
                    args.fields.as_slice(),
                    &args.term,
                    Page::new(args.from, args.size),
                )
                .await?;
            print_json(&response)?;
        }
        Command::Ids(args) => {
            let strategy = args.strategy.unwrap_or(facade.query_strategy());
            let ids = facade
                .simple_search_with(
                    strategy,
                    &args.index,
                    args.fields.as_slice(),
                    &args.term,
                    Page::new(args.from, args.size),
                )
                .await?;
            print_ids(&ids);
        }
        Command::Bulk { file } => {
            let request = read_bulk_file(&file).await?;
            let response = facade.bulk(request).await?;
            print_json(&response)?;
        }
    }
    Ok(())
}

// 🚚 strict on purpose: a malformed batch file stops here, loudly, before any I/O
async fn read_bulk_file(file: &Path) -> Result<BulkRequest> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("💀 Couldn't read the bulk file '{}'.", file.display()))?;
    serde_json::from_str(&raw).with_context(|| {
        format!(
            "💀 The bulk file '{}' isn't a valid batch. Every operation needs an 'action' \
             (index, create, update, delete) and the fields that go with it.",
            file.display()
        )
    })
}

fn print_json(value: &Value) -> Result<()> {
    let rendered =
        serde_json::to_string_pretty(value).context("💀 Couldn't pretty-print the response.")?;
    println!("{rendered}");
    Ok(())
}

fn print_ids(ids: &[String]) {
    // 🍽️ rank + id, nothing fancy
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "_id"]);
    for (rank, id) in ids.iter().enumerate() {
        table.add_row(vec![Cell::new(rank + 1), Cell::new(id)]);
    }
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn the_one_where_repeated_fields_and_a_strategy_parse() {
        let cli = Cli::try_parse_from([
            "esf", "ids", "articles", "cat", "-f", "title", "-f", "body", "--size", "5",
            "--strategy", "wildcard_dis_max",
        ])
        .expect("💀 a well-formed ids command should parse");

        match cli.command {
            Command::Ids(args) => {
                assert_eq!(args.fields, vec!["title", "body"]);
                assert_eq!(args.from, 0);
                assert_eq!(args.size, 5);
                assert_eq!(args.strategy, Some(QueryStrategy::WildcardDisMax));
            }
            other => panic!("💀 expected the ids command, got {other:?}"),
        }
    }

    #[test]
    fn the_one_where_an_unknown_strategy_is_turned_away_at_the_door() {
        let outcome = Cli::try_parse_from(["esf", "search", "articles", "cat", "--strategy", "vibes"]);
        assert!(outcome.is_err());
    }

    #[test]
    fn the_one_where_refused_connections_get_the_docker_hint() {
        assert!(looks_like_connection_trouble(
            "💀 HEAD http://localhost:9200/a/_doc/1 never got an answer."
        ));
        assert!(looks_like_connection_trouble("tcp connect error: Connection refused"));
        assert!(!looks_like_connection_trouble("came back '400 Bad Request'"));
    }

    #[tokio::test]
    async fn the_one_where_a_bulk_file_with_a_typo_stops_before_any_io() {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .expect("💀 temp bulk file should be creatable");
        file.write_all(br#"{"operations": [{"action": "yeet", "id": 1}]}"#)
            .expect("💀 temp bulk file should be writable");

        let outcome = read_bulk_file(file.path()).await;
        assert!(outcome.is_err(), "an unknown action must fail loudly");
    }

    #[tokio::test]
    async fn the_one_where_a_well_formed_bulk_file_comes_back_typed() {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .expect("💀 temp bulk file should be creatable");
        file.write_all(
            br#"{"index": "articles", "operations": [{"action": "delete", "id": "1"}]}"#,
        )
        .expect("💀 temp bulk file should be writable");

        let request = read_bulk_file(file.path())
            .await
            .expect("💀 a valid batch should parse");
        assert_eq!(request.index.as_deref(), Some("articles"));
        assert_eq!(request.operations.len(), 1);
    }
}
