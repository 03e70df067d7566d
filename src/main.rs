//! Serpline main entry point
//!
//! One-shot command-line search: fetches one page of results and prints it.

use anyhow::Context;
use clap::Parser;
use serpline::config::{apply_environment, load_config, parse_proxy, validate};
use serpline::{Config, QueryOptions, RetrievalSession};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Serpline: search results from the command line
///
/// Fetches a page of web or news search results and prints titles, URLs
/// and summaries, or a JSON array of them.
#[derive(Parser, Debug)]
#[command(name = "serpline")]
#[command(version)]
#[command(about = "Search results from the command line", long_about = None)]
struct Cli {
    /// Search keywords
    #[arg(value_name = "KEYWORD")]
    keywords: Vec<String>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Start at the Nth result
    #[arg(short, long, value_name = "N")]
    start: Option<u32>,

    /// Show N results per page
    #[arg(short = 'n', long = "count", value_name = "N")]
    num: Option<u32>,

    /// Show results from the news section
    #[arg(short = 'N', long)]
    news: bool,

    /// Country-specific search with top-level domain, e.g. `in` for India
    #[arg(short = 'c', long, value_name = "TLD")]
    tld: Option<String>,

    /// Display in language LANG
    #[arg(short, long)]
    lang: Option<String>,

    /// Disable automatic spelling correction
    #[arg(short = 'x', long)]
    exact: bool,

    /// Time limit search [h5 (5 hrs), d5 (5 days), w5 (5 weeks), m5 (5 months), y5 (5 years)]
    #[arg(short, long, value_name = "dN")]
    time: Option<String>,

    /// Search a site
    #[arg(short = 'w', long, value_name = "SITE")]
    site: Option<String>,

    /// Tunnel traffic through an HTTPS proxy (HOST:PORT)
    #[arg(short, long)]
    proxy: Option<String>,

    /// Disable the browser user agent
    #[arg(long)]
    noua: bool,

    /// Output in JSON format; implies --exact
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Query options given on the command line; unset flags leave the
    /// configuration untouched
    fn query_options(&self) -> QueryOptions {
        QueryOptions {
            duration: self.time.clone(),
            exact: (self.exact || self.json).then_some(true),
            keywords: (!self.keywords.is_empty()).then(|| self.keywords.clone()),
            lang: self.lang.clone(),
            news: self.news.then_some(true),
            num: self.num,
            site: self.site.clone(),
            start: self.start,
            tld: self.tld.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let json = cli.json;

    let mut session = RetrievalSession::connect(&config)
        .await
        .context("Failed to open search session")?;
    tracing::debug!("Search URL: {}", session.full_url());

    let outcome = session.fetch().await;
    session.close();
    outcome?;

    if json {
        println!("{}", session.results_json()?);
        return Ok(());
    }

    if let Some(spelling) = session.suggested_spelling() {
        println!("Showing results for {}; use --exact to search instead.\n", spelling);
    }
    if session.results().is_empty() {
        eprintln!("No results.");
    }
    for result in session.results() {
        println!("{}", result);
    }
    if session.filtered() {
        println!("Some similar results were omitted.");
    }

    Ok(())
}

/// Layers the config file, environment and command line, then validates
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(proxy) = &cli.proxy {
        config.connection.proxy = Some(proxy.clone());
    }
    if cli.noua {
        config.connection.user_agent = false;
    }
    let mut config = apply_environment(config);
    if let Some(proxy) = config.connection.proxy.take() {
        config.connection.proxy = Some(parse_proxy(&proxy).unwrap_or(proxy));
    }

    config.query.overlay(cli.query_options());

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("serpline=warn"),
            1 => EnvFilter::new("serpline=info,warn"),
            2 => EnvFilter::new("serpline=debug,info"),
            _ => EnvFilter::new("serpline=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}
