mod commands;
mod credentials;
mod discovery;
mod rollover;
mod venues;

use algo_trade_core::quote::{Side, Venue};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "algo-trade")]
#[command(about = "Cross-venue box-arbitrage engine for 15-minute BTC-direction markets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the live loop against real venue credentials
    Run,
    /// Run the live loop with no real order placement
    DryRun,
    /// Resolve and print the current interval's market mapping once
    Discover,
    /// Continuously resolve upcoming intervals' market mappings
    DiscoverWatch {
        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 30_000)]
        poll_ms: u64,
    },
    /// Compare locally tracked positions against each venue's reported state
    CheckPositions,
    /// Market-sell every open position on both venues
    SellAllPositions,
    /// Market-sell one venue/side position
    SellPosition {
        #[arg(long, value_enum)]
        venue: VenueArg,
        #[arg(long, value_enum)]
        side: SideArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum VenueArg {
    Kalshi,
    Polymarket,
}

impl From<VenueArg> for Venue {
    fn from(value: VenueArg) -> Self {
        match value {
            VenueArg::Kalshi => Venue::Kalshi,
            VenueArg::Polymarket => Venue::Polymarket,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Yes,
    No,
}

impl From<SideArg> for Side {
    fn from(value: SideArg) -> Self {
        match value {
            SideArg::Yes => Side::Yes,
            SideArg::No => Side::No,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = algo_trade_core::ConfigLoader::load()?;

    match cli.command {
        Commands::Run => commands::run::run(config, false).await?,
        Commands::DryRun => commands::run::run(config, true).await?,
        Commands::Discover => commands::discover::discover(config).await?,
        Commands::DiscoverWatch { poll_ms } => commands::discover::watch(config, poll_ms).await?,
        Commands::CheckPositions => commands::positions::check(config).await?,
        Commands::SellAllPositions => commands::positions::sell_all(config).await?,
        Commands::SellPosition { venue, side } => {
            commands::positions::sell_one_position(config, venue.into(), side.into()).await?;
        }
    }

    Ok(())
}
