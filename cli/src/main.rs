use tickertrend::{
    api::{AnalysisBuilder, StockAnalyzer},
    models::{parse_ticker_list, Bar, DateRange, TimeRange},
    services::CsvSeriesStore,
    utils::{format_date, init_logger, today_utc},
};

use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::{path::PathBuf, time::Duration};

#[derive(Parser)]
#[command(name = "tickertrend")]
#[command(about = "A CLI for daily stock comparison and trend forecasting from local CSV data")]
pub struct Cli {
    /// Directory holding <TICKER>.csv files and an optional ticker_info.json
    #[arg(long, global = true, default_value = "./data")]
    pub data_dir: PathBuf,

    /// Bound on each file read, in seconds
    #[arg(long, global = true, default_value_t = 10)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct RangeArgs {
    /// Start date (YYYY-MM-DD), requires --end
    #[arg(long, requires = "end", conflicts_with = "range")]
    pub start: Option<String>,
    /// End date (YYYY-MM-DD), requires --start
    #[arg(long, requires = "start", conflicts_with = "range")]
    pub end: Option<String>,
    /// Trailing window ending today (1W, 2W, 1M, 3M, 6M, 1Y, 2Y)
    #[arg(long)]
    pub range: Option<String>,
}

impl RangeArgs {
    fn resolve(&self, default_days: i64) -> anyhow::Result<DateRange> {
        let today = today_utc();
        if let Some(preset) = &self.range {
            let preset: TimeRange = preset.parse()?;
            return Ok(preset.ending_on(today));
        }
        Ok(DateRange::from_query(
            self.start.as_deref(),
            self.end.as_deref(),
            today,
            default_days,
        )?)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print daily bars for a ticker
    History {
        /// Ticker symbol
        ticker: String,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Align tickers by date with relative performance
    Compare {
        /// Ticker symbols (comma-separated)
        #[arg(default_value = "AAPL,GOOGL,MSFT")]
        tickers: String,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Fit trend models and forecast a ticker
    Predict {
        /// Ticker symbol
        ticker: String,
        #[command(flatten)]
        range: RangeArgs,
        /// Calendar days to forecast
        #[arg(long, default_value_t = 7)]
        horizon: usize,
    },
    /// List tickers with a CSV file in the data directory
    Tickers,
}

fn analyzer(cli: &Cli, horizon: usize) -> anyhow::Result<StockAnalyzer> {
    Ok(AnalysisBuilder::new()
        .with_csv_dir(&cli.data_dir)
        .with_forecast_horizon(horizon)
        .with_fetch_timeout(Duration::from_secs(cli.timeout_secs))
        .build()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logger()?;

    let cli = Cli::parse();

    let output = match &cli.command {
        Commands::History { ticker, range } => {
            let range = range.resolve(30)?;
            let series = analyzer(&cli, 7)?.history(ticker, &range).await?;
            let bars: Vec<Bar> = series.bars().iter().map(Bar::rounded).collect();
            json!({
                "ticker": series.ticker(),
                "data": bars,
                "start_date": format_date(range.start()),
                "end_date": format_date(range.end()),
            })
        }
        Commands::Compare { tickers, range } => {
            let range = range.resolve(30)?;
            let tickers = parse_ticker_list(tickers, &[]);
            let result = analyzer(&cli, 7)?.compare(&tickers, &range).await?;
            let mut value = serde_json::to_value(&result)?;
            value["start_date"] = json!(format_date(range.start()));
            value["end_date"] = json!(format_date(range.end()));
            value
        }
        Commands::Predict {
            ticker,
            range,
            horizon,
        } => {
            let range = range.resolve(90)?;
            let result = analyzer(&cli, *horizon)?.predict(ticker, &range).await?;
            serde_json::to_value(&result)?
        }
        Commands::Tickers => {
            let store = CsvSeriesStore::new(&cli.data_dir);
            json!({
                "data_dir": store.data_dir().display().to_string(),
                "tickers": store.available_tickers()?,
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
