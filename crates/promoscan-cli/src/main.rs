mod discover;
mod logging;
mod progress;
mod run;
mod sinks;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "promoscan")]
#[command(about = "Collects bonus and promotion offers from merchant sites")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape every site in the URL list
    Run {
        /// Site list to read instead of `PROMOSCAN_URL_LIST_PATH`
        #[arg(long)]
        urls: Option<PathBuf>,
        /// Write bonuses to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Skip the database sink even when `DATABASE_URL` is set
        #[arg(long)]
        no_db: bool,
        /// Number of sites processed in parallel
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Run only the merchant discovery step against one site
    Discover {
        /// Site URL (scheme optional)
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = promoscan_core::load_app_config()?;
    logging::init(&config)?;

    match cli.command {
        Commands::Run {
            urls,
            csv,
            no_db,
            concurrency,
        } => {
            let overrides = run::RunOverrides {
                url_list_path: urls,
                csv_output_path: csv,
                no_db,
                max_concurrent_sites: concurrency,
            };
            run::run_scrape(overrides.apply(config)).await
        }
        Commands::Discover { url } => discover::run_discover(&config, &url).await,
    }
}
