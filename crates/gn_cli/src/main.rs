use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand};
use gn_core::config::DEFAULT_STORE_URL;
use gn_core::{HarvestConfig, HumanDuration, Result};
use gn_harvest::{init_logging, HarvestDriver};
use gn_web::AppState;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(author, version, about = "Harvest located articles and serve them as JSON", long_about = None)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: Level,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch, geocode and store articles until the search API runs dry
    Harvest(HarvestArgs),
    /// Serve the stored articles at GET /api/articles
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
        /// Store to read from, e.g. sqlite://articles.db
        #[arg(long, env = "GN_STORE_URL", default_value = DEFAULT_STORE_URL)]
        store_url: String,
    },
}

/// Harvest settings. Each flag falls back to its environment variable, then to the built-in default.
#[derive(Args, Debug, Default)]
struct HarvestArgs {
    /// Page to start from
    #[arg(long, env = "GN_START_PAGE")]
    start_page: Option<u32>,
    /// Pages fetched before each processing step
    #[arg(long, env = "GN_PAGES_PER_BATCH")]
    pages_per_batch: Option<u32>,
    /// Pause between batches (e.g. 60s, 2m, 1m30s)
    #[arg(long, env = "GN_INTER_BATCH_DELAY")]
    delay: Option<HumanDuration>,
    /// Article search API key
    #[arg(long, env = "NYT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Store to write to: sqlite://<path> or memory://
    #[arg(long, env = "GN_STORE_URL")]
    store_url: Option<String>,
    /// Search filter sent as `fq`
    #[arg(long, env = "GN_QUERY")]
    query: Option<String>,
    #[arg(long, env = "GN_SEARCH_URL")]
    search_url: Option<String>,
    #[arg(long, env = "GN_GEOCODE_URL")]
    geocode_url: Option<String>,
    /// User-Agent sent to the geocoder
    #[arg(long, env = "GN_USER_AGENT")]
    user_agent: Option<String>,
    /// Look each distinct location up only once per run
    #[arg(long, env = "GN_GEOCODE_CACHE")]
    geocode_cache: bool,
}

impl HarvestArgs {
    fn into_config(self) -> HarvestConfig {
        let defaults = HarvestConfig::default();
        HarvestConfig {
            start_page: self.start_page.unwrap_or(defaults.start_page),
            pages_per_batch: self.pages_per_batch.unwrap_or(defaults.pages_per_batch),
            inter_batch_delay: self.delay.map_or(defaults.inter_batch_delay, |d| d.0),
            api_key: self.api_key.unwrap_or(defaults.api_key),
            store_url: self.store_url.unwrap_or(defaults.store_url),
            query: self.query.unwrap_or(defaults.query),
            search_url: self.search_url.unwrap_or(defaults.search_url),
            geocode_url: self.geocode_url.unwrap_or(defaults.geocode_url),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            geocode_cache: self.geocode_cache,
        }
    }
}

async fn harvest(args: HarvestArgs) -> Result<()> {
    let config = args.into_config();
    info!("⚙️ Harvest configuration: {:?}", config);

    let mut driver = HarvestDriver::from_config(config).await?;
    let summary = driver.run().await;
    info!("✅ Script finished, next run would start at page {}", summary.next_page);
    Ok(())
}

async fn serve(bind: SocketAddr, store_url: String) -> Result<()> {
    let storage = gn_storage::create_storage(&store_url).await?;
    let state = AppState::connect(storage.as_ref()).await?;
    gn_web::serve(bind, state).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Commands::Harvest(args) => harvest(args).await,
        Commands::Serve { bind, store_url } => serve(bind, store_url).await,
    }
}
