use std::sync::Arc;

use chrono::{Days, NaiveDate};
use sentiment_trader::{
    data::{
        align, fetch_price_series, fetch_sentiment_series, get_market_rows,
        historical::{save_price_series, save_sentiment_series},
        JsonDirSource,
    },
    features::{FeatureProcessor, TechnicalIndicators, BASE_COLUMNS, FEATURE_COLUMNS},
    env::latest_observation,
    model_file::{find_latest_model, ModelFileName},
    strategies::{predict_latest, run_baselines, run_episode, Baseline, RandomPolicy},
    DataError, Env, EnvConfig, FetchConfig, PriceBar, SentimentPoint,
};
use tempfile::tempdir;

fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 3, 1).unwrap() + Days::new(offset)
}

/// Trading days only (weekends skipped), with sentiment reported every third day
fn raw_series(days: u64) -> (Vec<PriceBar>, Vec<SentimentPoint>) {
    let prices = (0..days)
        .filter(|offset| offset % 7 < 5)
        .map(|offset| {
            let close = 100. + 15. * (offset as f64 / 9.).sin() + offset as f64 * 0.2;
            PriceBar {
                date: day(offset),
                open: close - 0.5,
                high: close + 1.,
                low: close - 1.,
                close,
                volume: 10_000 + offset * 13,
            }
        })
        .collect();
    let sentiments = (0..days)
        .filter(|offset| offset % 3 == 0)
        .map(|offset| SentimentPoint {
            date: day(offset),
            sentiment: (offset as f64 / 5.).cos() * 0.6,
        })
        .collect();

    (prices, sentiments)
}

#[test]
fn test_alignment_is_gap_free_and_idempotent() {
    let (prices, sentiments) = raw_series(90);

    let rows = align(&prices, &sentiments).unwrap();

    assert!(rows
        .windows(2)
        .all(|pair| (pair[1].date - pair[0].date).num_days() == 1));
    let prices: Vec<PriceBar> = rows.iter().map(|row| row.price_bar()).collect();
    let sentiments: Vec<SentimentPoint> = rows.iter().map(|row| row.sentiment_point()).collect();
    assert_eq!(align(&prices, &sentiments).unwrap(), rows);
}

#[test]
fn test_disjoint_series_name_their_ranges() {
    let (prices, _) = raw_series(10);
    let sentiments = [SentimentPoint {
        date: day(400),
        sentiment: 0.,
    }];

    let message = align(&prices, &sentiments).unwrap_err().to_string();

    assert!(message.contains(&day(0).to_string()));
    assert!(message.contains(&day(400).to_string()));
}

#[test]
fn test_files_to_baselines() {
    let dir = tempdir().unwrap();
    let (prices, sentiments) = raw_series(200);
    save_price_series(dir.path(), "ACME", &prices).unwrap();
    save_sentiment_series(dir.path(), "ACME", &sentiments).unwrap();

    let rows = get_market_rows(dir.path(), "ACME", 10).unwrap();
    let table = Arc::new(TechnicalIndicators.process(&rows).unwrap());
    assert_eq!(
        table.feature_count(),
        BASE_COLUMNS.len() + FEATURE_COLUMNS.len()
    );

    // The model name carries the lookback window the env has to use
    let model: ModelFileName = "LATEST=acme_ppo_LBW-10_NOI-5000.zip".parse().unwrap();
    let config = EnvConfig {
        lookback_window: model.lookback_window,
        ..EnvConfig::serial()
    };

    let report = run_baselines(table.clone(), &config).unwrap();
    for baseline in Baseline::ALL {
        assert!(report.scores[baseline].is_finite());
    }

    let features = table.feature_count();
    let mut env = Env::new(table, config).unwrap();
    assert_eq!(env.observation_shape(), (features, 10));
    let mut policy = RandomPolicy::new(env.config().action_granularity, Some(3));
    let final_value = run_episode(&mut env, &mut policy).unwrap();
    assert_eq!(final_value, env.get_value());
    assert_eq!(env.episode_history.steps(), env.window().len());
}

#[test]
fn test_latest_model_drives_inference_window() {
    let data_dir = tempdir().unwrap();
    let model_dir = tempdir().unwrap();
    let (prices, sentiments) = raw_series(120);
    save_price_series(data_dir.path(), "ACME", &prices).unwrap();
    save_sentiment_series(data_dir.path(), "ACME", &sentiments).unwrap();
    for name in [
        "acme_ppo_LBW-5_NOI-100.zip",
        "LATEST=acme_ppo_LBW-8_NOI-2000.zip",
    ] {
        std::fs::write(model_dir.path().join(name), b"").unwrap();
    }

    let (_, model) = find_latest_model(model_dir.path()).unwrap();
    assert_eq!(model.lookback_window, 8);

    let rows = get_market_rows(data_dir.path(), "ACME", 10).unwrap();
    let table = TechnicalIndicators.process(&rows).unwrap();

    let observation = latest_observation(&table, model.lookback_window, None).unwrap();
    assert_eq!(observation.dim(), (table.feature_count(), 8));
    let newest = table.scaled().column(table.len() - 1).to_vec();
    assert_eq!(observation.column(7).to_vec(), newest);

    let mut policy = RandomPolicy::new(10, Some(11));
    let action = predict_latest(&mut policy, &table, model.lookback_window, None, 25, 10).unwrap();
    assert!(action.amount < 10);
}

#[tokio::test]
async fn test_fetch_then_align() {
    let dir = tempdir().unwrap();
    let (prices, sentiments) = raw_series(60);
    save_price_series(dir.path(), "ACME", &prices).unwrap();
    save_sentiment_series(dir.path(), "ACME", &sentiments).unwrap();

    let source = JsonDirSource::new(dir.path());
    let config = FetchConfig::default();

    let prices = fetch_price_series(&source, "ACME", day(10), day(40), &config)
        .await
        .unwrap();
    let sentiments = fetch_sentiment_series(&source, "ACME", "Acme", day(10), day(40), &config)
        .await
        .unwrap();
    let rows = align(&prices, &sentiments).unwrap();

    assert!(rows.first().unwrap().date >= day(10));
    assert!(rows.last().unwrap().date <= day(40));
}

#[test]
fn test_missing_symbol_is_an_error() {
    let dir = tempdir().unwrap();

    assert!(matches!(
        get_market_rows(dir.path(), "NOPE", 10),
        Err(DataError::Io(_))
    ));
}
