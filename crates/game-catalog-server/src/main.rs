//! Game catalog server — entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use game_catalog_server::config::{Overrides, Settings};
use game_catalog_server::transport::{HttpTransport, ServerState};
use game_catalog_server::{build_ingestor, populate};

#[derive(Parser)]
#[command(
    name = "game-catalog",
    about = "Populate the game catalog CMS from the storefront",
    version
)]
struct Cli {
    /// CMS base URL (default http://localhost:1337).
    #[arg(long, global = true)]
    cms_url: Option<String>,

    /// Bearer token for the CMS API.
    /// Also reads from GAME_CATALOG_CMS_TOKEN env var.
    #[arg(long, global = true)]
    cms_token: Option<String>,

    /// Storefront base URL.
    #[arg(long, global = true)]
    storefront_url: Option<String>,

    /// Pause after each gallery upload, in milliseconds.
    #[arg(long, global = true)]
    upload_delay_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the populate endpoint over HTTP (default).
    Serve {
        /// Listen address (host:port).
        #[arg(long)]
        addr: Option<String>,

        /// Bearer token required on /games/populate.
        /// Also reads from GAME_CATALOG_TOKEN env var.
        #[arg(long)]
        token: Option<String>,

        /// Keep all CMS writes in memory.
        #[arg(long)]
        dry_run: bool,
    },

    /// Run a single populate pass and print the report as JSON.
    Populate {
        /// Listing page to ingest.
        #[arg(long)]
        page: Option<u32>,

        /// Listing sort order (e.g. popularity, date, title).
        #[arg(long)]
        sort: Option<String>,

        /// Extra listing query pair, forwarded verbatim. Can be repeated.
        #[arg(long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,

        /// Keep all CMS writes in memory.
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("expected key=value, got {raw:?}")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut overrides = Overrides {
        cms_url: cli.cms_url,
        cms_token: cli.cms_token,
        storefront_url: cli.storefront_url,
        upload_delay_ms: cli.upload_delay_ms,
        ..Default::default()
    };

    match cli.command.unwrap_or(Commands::Serve {
        addr: None,
        token: None,
        dry_run: false,
    }) {
        Commands::Serve {
            addr,
            token,
            dry_run,
        } => {
            overrides.addr = addr;
            overrides.token = token;
            let settings = Settings::resolve(overrides);
            let ingestor = build_ingestor(&settings, dry_run)?;

            tracing::info!("game-catalog v{}", env!("CARGO_PKG_VERSION"));
            tracing::info!("CMS: {}", settings.cms_url);
            if dry_run {
                tracing::info!("Dry run: CMS writes stay in memory");
            }
            if settings.token.is_some() {
                tracing::info!("Auth: bearer token required");
            }

            let transport = HttpTransport::new(ServerState::new(ingestor, settings.token.clone()));
            transport.run(&settings.addr).await?;
        }

        Commands::Populate {
            page,
            sort,
            query,
            dry_run,
        } => {
            let settings = Settings::resolve(overrides);
            let ingestor = build_ingestor(&settings, dry_run)?;

            let mut pairs = Vec::new();
            if let Some(page) = page {
                pairs.push(("page".to_string(), page.to_string()));
            }
            if let Some(sort) = sort {
                pairs.push(("sort".to_string(), sort));
            }
            pairs.extend(query);

            let query = populate::listing_query(pairs);
            let report = populate::run(&ingestor, &query).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "game-catalog", &mut std::io::stdout());
        }
    }

    Ok(())
}
