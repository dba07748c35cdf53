use anyhow::{Context, Result};
use clap::Parser;
use imugi::{
    compute_sentiment, sort_trades, BinanceClient, Interval, MarketBot, Settings,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "imugi")]
#[command(about = "Technical analysis signals for Binance spot pairs", long_about = None)]
struct Cli {
    /// Kline interval (1s, 1m, 3m, 5m, 15m, 30m, 1h, 2h, 4h, 6h, 8h, 12h, 1d, 3d, 1w)
    #[arg(short, long)]
    interval: Option<Interval>,

    /// Comma separated symbols (e.g., BTCUSDT,ETHUSDT)
    #[arg(short, long, value_delimiter = ',')]
    symbols: Option<Vec<String>>,

    /// Print ranked trade records as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();

    let mut settings = Settings::load().context("Failed to load settings")?;
    if let Some(interval) = cli.interval {
        settings.interval = interval;
    }
    if let Some(symbols) = cli.symbols {
        settings.symbols = symbols;
    }
    settings.validate().context("Invalid settings")?;

    tracing::info!(
        "🚀 Analyzing {} symbols on {} candles",
        settings.symbols.len(),
        settings.interval
    );

    let client = BinanceClient::new(&settings.binance).context("Failed to build Binance client")?;
    let bot = MarketBot::new(Arc::new(client), settings.analysis.clone())
        .context("Invalid analysis config")?;

    let mut trades = bot.analyze_symbols(&settings.symbols, settings.interval).await;
    sort_trades(&mut trades);

    tracing::info!(
        "📊 Market sentiment: {} ({}/{} symbols analyzed)",
        compute_sentiment(&trades),
        trades.len(),
        settings.symbols.len()
    );
    for trade in &trades {
        tracing::info!(
            "  {:<10} {:<12} price {:>14.6}  tp {:>14.6}  sl {:>14.6}  score {:>6.2}",
            trade.symbol,
            trade.signal.to_string(),
            trade.last_price,
            trade.take_profit,
            trade.stop_loss,
            trade.score
        );
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&trades)?);
    }

    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("imugi=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
