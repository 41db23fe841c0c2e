use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use sentiment_trader::{
    constants::{self, files},
    data::{
        align, fetch_price_series, fetch_sentiment_series, get_market_rows,
        historical::write_market_rows_cache, ArticleSource, JsonDirSource, Lexicon,
        SentimentSource,
    },
    env::Env,
    features::{FeatureProcessor, TechnicalIndicators},
    history::MetaHistory,
    model_file::find_latest_model,
    strategies::{predict_latest, predict_with_votes, run_baselines, RandomPolicy},
    EnvConfig, FeaturedTable, FetchConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sentiment_trader")]
#[command(about = "Stock and news-sentiment trading environment", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align the raw price and sentiment series for a symbol and cache the result
    Align {
        #[arg(short, long, default_value = files::DATA_PATH)]
        data_dir: PathBuf,

        #[arg(short, long)]
        symbol: String,

        #[arg(short, long, default_value_t = constants::data::ENTRIES_TAKING_AVG)]
        average: usize,
    },
    /// Fetch both series for a date range through the retrying sources, then align them
    Fetch {
        #[arg(short, long, default_value = files::DATA_PATH)]
        data_dir: PathBuf,

        #[arg(short, long)]
        symbol: String,

        #[arg(short, long)]
        company: String,

        #[arg(long)]
        start: NaiveDate,

        #[arg(long)]
        end: NaiveDate,

        #[arg(short, long)]
        retries: Option<usize>,

        /// Score saved news articles with this word lexicon instead of reading saved
        /// daily sentiment
        #[arg(long)]
        lexicon: Option<PathBuf>,
    },
    /// Score the baseline policies over a serial episode
    Baselines {
        #[arg(short, long, default_value = files::DATA_PATH)]
        data_dir: PathBuf,

        #[arg(short, long)]
        symbol: String,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(short, long)]
        lookback: Option<usize>,

        #[arg(short, long)]
        init_buyable: Option<f64>,

        #[arg(short, long, default_value_t = constants::data::ENTRIES_TAKING_AVG)]
        average: usize,
    },
    /// Run random-policy episodes on random windows
    Random {
        #[arg(short, long, default_value = files::DATA_PATH)]
        data_dir: PathBuf,

        #[arg(short, long)]
        symbol: String,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(short, long, default_value_t = 10)]
        episodes: usize,

        /// Predictions per step, the most common one is taken
        #[arg(short, long, default_value_t = 1)]
        votes: usize,

        #[arg(long)]
        seed: Option<u64>,
    },
    /// Vote on today's action from the newest rows, using the latest model's lookback window
    Predict {
        #[arg(short, long, default_value = files::DATA_PATH)]
        data_dir: PathBuf,

        #[arg(short, long, default_value = files::MODELS_PATH)]
        model_dir: PathBuf,

        #[arg(short, long)]
        symbol: String,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Shares held on each of the last lookback days, oldest first
        #[arg(long, value_delimiter = ',')]
        shares: Option<Vec<u64>>,

        #[arg(short, long, default_value_t = 1)]
        votes: usize,

        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show the latest model artifact and the lookback window it was trained with
    ModelInfo {
        #[arg(short, long, default_value = files::MODELS_PATH)]
        model_dir: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> Result<EnvConfig> {
    match path {
        Some(path) => EnvConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(EnvConfig::default()),
    }
}

fn load_table(
    data_dir: &Path,
    symbol: &str,
    average: usize,
) -> Result<Arc<FeaturedTable>> {
    let rows = get_market_rows(data_dir, symbol, average).with_context(|| {
        format!(
            "failed to load market data for {symbol} from {}",
            data_dir.display()
        )
    })?;
    let table = TechnicalIndicators
        .process(&rows)
        .with_context(|| format!("failed to compute features for {symbol}"))?;

    info!(symbol, rows = table.len(), features = table.feature_count(), "loaded table");
    Ok(Arc::new(table))
}

fn align_command(data_dir: &Path, symbol: &str, average: usize) -> Result<()> {
    let rows = get_market_rows(data_dir, symbol, average)
        .with_context(|| format!("failed to align data for {symbol}"))?;

    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        println!("{} no rows left for {symbol} after smoothing", "Warning".yellow());
        return Ok(());
    };

    println!(
        "{} {} rows from {} to {}",
        symbol.bright_blue().bold(),
        rows.len(),
        first.date,
        last.date
    );
    Ok(())
}

async fn fetch_command(
    data_dir: &Path,
    symbol: &str,
    company: &str,
    start: NaiveDate,
    end: NaiveDate,
    retries: Option<usize>,
    lexicon: Option<&Path>,
) -> Result<()> {
    let source = JsonDirSource::new(data_dir);
    let articles = match lexicon {
        Some(path) => {
            let lexicon = Lexicon::from_json_file(path)
                .with_context(|| format!("failed to load lexicon from {}", path.display()))?;
            info!(words = lexicon.len(), "scoring articles");
            Some(ArticleSource::new(data_dir, lexicon))
        }
        None => None,
    };
    let sentiment_source: &dyn SentimentSource = match &articles {
        Some(articles) => articles,
        None => &source,
    };
    let mut config = FetchConfig::default();
    if let Some(retries) = retries {
        config.retry_count = retries;
    }

    let prices = fetch_price_series(&source, symbol, start, end, &config)
        .await
        .with_context(|| format!("failed to fetch prices for {symbol} between {start} and {end}"))?;
    let sentiments = fetch_sentiment_series(sentiment_source, symbol, company, start, end, &config)
        .await
        .with_context(|| {
            format!("failed to fetch sentiment for {company} ({symbol}) between {start} and {end}")
        })?;

    let rows = align(&prices, &sentiments)
        .with_context(|| format!("failed to align {symbol} between {start} and {end}"))?;
    write_market_rows_cache(data_dir, symbol, &rows)?;

    println!(
        "{} {} price bars and {} sentiment days aligned into {} rows",
        symbol.bright_blue().bold(),
        prices.len(),
        sentiments.len(),
        rows.len()
    );
    Ok(())
}

fn random_command(
    table: Arc<FeaturedTable>,
    config: EnvConfig,
    episodes: usize,
    votes: usize,
    seed: Option<u64>,
) -> Result<()> {
    let config = EnvConfig {
        is_serial: false,
        seed: seed.or(config.seed),
        ..config
    };
    let mut policy = RandomPolicy::new(config.action_granularity, seed);
    let mut env = Env::new(table, config)?;
    let mut meta = MetaHistory::default();

    for _ in 0..episodes {
        let mut observation = env.reset()?;

        loop {
            let action = predict_with_votes(&mut policy, &observation, votes.max(1))
                .context("no prediction was made")?;
            let step = env.step(action)?;
            if step.done {
                break;
            }
            observation = step.observation;
        }

        meta.record(&env.episode_history, env.initial_cash());
    }

    if let (Some(avg), Some(best), Some(worst)) = (
        meta.avg_percent_return(),
        meta.best_percent_return(),
        meta.worst_percent_return(),
    ) {
        println!(
            "{} episodes - avg {:.2}% best {:.2}% worst {:.2}%",
            meta.episodes().to_string().bright_blue().bold(),
            avg,
            best,
            worst
        );
    }
    Ok(())
}

fn predict_command(
    table: &FeaturedTable,
    model_dir: &Path,
    config: EnvConfig,
    shares: Option<&[u64]>,
    votes: usize,
    seed: Option<u64>,
) -> Result<()> {
    let (path, model) = find_latest_model(model_dir)?;
    info!(model = %path.display(), lookback_window = model.lookback_window, "using latest model");

    // Learned policies plug in through `Policy`; the random policy stands in for them here
    let mut policy = RandomPolicy::new(config.action_granularity, seed.or(config.seed));
    let action = predict_latest(
        &mut policy,
        table,
        model.lookback_window,
        shares,
        votes,
        config.action_granularity,
    )
    .context("failed to build the latest observation")?;

    let newest = table
        .dates()
        .last()
        .map(|date| date.to_string())
        .unwrap_or_default();
    println!(
        "{} {} {:?} {:.0}% of the tradable amount (lookback {})",
        newest.bright_blue(),
        "action".bright_white(),
        action.action_type,
        action.fraction(config.action_granularity) * 100.,
        model.lookback_window
    );
    Ok(())
}

fn model_info_command(model_dir: &Path) -> Result<()> {
    let (path, name) = find_latest_model(model_dir)?;

    println!(
        "{} {} (lookback window {}, {} iterations)",
        "Latest model".bright_blue(),
        path.display().to_string().bright_white().bold(),
        name.lookback_window,
        name.iterations
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Align {
            data_dir,
            symbol,
            average,
        } => align_command(data_dir, symbol, *average)?,
        Commands::Fetch {
            data_dir,
            symbol,
            company,
            start,
            end,
            retries,
            lexicon,
        } => {
            fetch_command(
                data_dir,
                symbol,
                company,
                *start,
                *end,
                *retries,
                lexicon.as_deref(),
            )
            .await?
        }
        Commands::Baselines {
            data_dir,
            symbol,
            config,
            lookback,
            init_buyable,
            average,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(lookback) = lookback {
                config.lookback_window = *lookback;
            }
            if let Some(init_buyable) = init_buyable {
                config.initial_buyable_stocks = *init_buyable;
            }

            let table = load_table(data_dir, symbol, *average)?;
            run_baselines(table, &config)
                .with_context(|| format!("failed to run baselines for {symbol}"))?
                .print();
        }
        Commands::Random {
            data_dir,
            symbol,
            config,
            episodes,
            votes,
            seed,
        } => {
            let config = load_config(config.as_deref())?;
            let table = load_table(data_dir, symbol, constants::data::ENTRIES_TAKING_AVG)?;
            random_command(table, config, *episodes, *votes, *seed)?;
        }
        Commands::Predict {
            data_dir,
            model_dir,
            symbol,
            config,
            shares,
            votes,
            seed,
        } => {
            let config = load_config(config.as_deref())?;
            let table = load_table(data_dir, symbol, constants::data::ENTRIES_TAKING_AVG)?;
            predict_command(&table, model_dir, config, shares.as_deref(), *votes, *seed)?;
        }
        Commands::ModelInfo { model_dir } => model_info_command(model_dir)?,
    }

    Ok(())
}
