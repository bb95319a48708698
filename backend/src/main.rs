//! Command-line entry point for inspecting and running refined searches.

use std::path::{Path, PathBuf};

use anyhow::Context;
use backend::api::search::SearchService;
use backend::search_driver::HttpSearchDriver;
use clap::{Parser, Subcommand};
use common::filter_expression::merge;
use common::search_query::{SearchParameters, SearchQuery};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "search-refine", about = "Build, inspect and run refined multi-search requests")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the multi-search batch a query would send, after facet deny-listing.
    Plan {
        #[arg(long)]
        config: PathBuf,
        /// JSON file holding a serialized search query; defaults to an empty query.
        #[arg(long)]
        query: Option<PathBuf>,
    },
    /// Scope the conditions on one repeated field of a filter expression.
    Merge {
        nested_field: String,
        expression: String,
    },
    /// Run the query against the backend at SEARCH_URL and print the shaped results.
    Search {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        query: Option<PathBuf>,
        #[arg(long, env = "SEARCH_URL", default_value = "http://127.0.0.1:8108")]
        url: String,
        #[arg(long, env = "SEARCH_API_KEY")]
        api_key: Option<String>,
    },
}

fn read_query(path: Option<&Path>) -> anyhow::Result<SearchQuery> {
    let Some(path) = path else { return Ok(SearchQuery::default()) };
    let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read query at {path:?}"))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse query at {path:?}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Plan { config, query } => {
            let config = common::config::load(&config)?;
            let query = read_query(query.as_deref())?;
            let service = SearchService::new(config, HttpSearchDriver::from_env());
            let request = service.build_search_requests(&query, &SearchParameters::default());
            let request = service.adapter().adapt(request);
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Command::Merge { nested_field, expression } => {
            println!("{}", merge(&nested_field, &expression));
        }
        Command::Search { config, query, url, api_key } => {
            let config = common::config::load(&config)?;
            let query = read_query(query.as_deref())?;
            let service = SearchService::new(config, HttpSearchDriver::new(url, api_key));
            let results = service.search(&query, &SearchParameters::default()).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }
    Ok(())
}
