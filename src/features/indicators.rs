//! Whole-series technical indicators.
//!
//! Every function returns one value per input value. Leading entries that the indicator
//! cannot compute yet are `NaN`, and are filled by [`super::fill_missing`] once the table
//! is assembled.

use crate::{
    constants::indicators,
    error::DataResult,
    features::{fill_missing, FeatureProcessor, FeaturedTable, BASE_COLUMNS},
    types::{Data, MarketRow},
};

/// Indicator columns appended after [`BASE_COLUMNS`], in order
pub const FEATURE_COLUMNS: [&str; 13] = [
    "rsi",
    "macd",
    "macd_hist",
    "sma",
    "ema",
    "bb_upper",
    "bb_lower",
    "obv",
    "daily_return",
    "daily_log_return",
    "aroon_up",
    "aroon_down",
    "sentiment_sma",
];

pub fn sma(data: &[f64], period: usize) -> Data {
    let mut out = vec![f64::NAN; data.len()];
    if period == 0 || data.len() < period {
        return out;
    }

    let mut sum: f64 = data[..period].iter().sum();
    out[period - 1] = sum / period as f64;

    for index in period..data.len() {
        sum += data[index] - data[index - period];
        out[index] = sum / period as f64;
    }

    out
}

/// Seeded with the SMA of the first `period` finite values
pub fn ema(data: &[f64], period: usize) -> Data {
    let mut out = vec![f64::NAN; data.len()];
    if period == 0 {
        return out;
    }

    let Some(first) = data.iter().position(|value| value.is_finite()) else {
        return out;
    };
    if data.len() - first < period {
        return out;
    }

    let multiplier = 2. / (period as f64 + 1.);
    let seed_end = first + period - 1;
    let mut prev = data[first..=seed_end].iter().sum::<f64>() / period as f64;
    out[seed_end] = prev;

    for index in seed_end + 1..data.len() {
        prev = (data[index] - prev) * multiplier + prev;
        out[index] = prev;
    }

    out
}

/// Relative strength index with Wilder's smoothing, in [0, 100]
pub fn rsi(closes: &[f64], period: usize) -> Data {
    let mut out = vec![f64::NAN; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    let split = |change: f64| {
        if change > 0. {
            (change, 0.)
        } else {
            (0., -change)
        }
    };
    let value = |gain: f64, loss: f64| {
        if loss == 0. {
            100.
        } else {
            100. - 100. / (1. + gain / loss)
        }
    };

    let (mut avg_gain, mut avg_loss) = (1..=period).fold((0., 0.), |(g, l), index| {
        let (gain, loss) = split(closes[index] - closes[index - 1]);
        (g + gain, l + loss)
    });
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out[period] = value(avg_gain, avg_loss);

    for index in period + 1..closes.len() {
        let (gain, loss) = split(closes[index] - closes[index - 1]);
        avg_gain = (avg_gain * (period as f64 - 1.) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.) + loss) / period as f64;
        out[index] = value(avg_gain, avg_loss);
    }

    out
}

/// Fast EMA minus slow EMA
pub fn macd(closes: &[f64], fast: usize, slow: usize) -> Data {
    let fast = ema(closes, fast);
    let slow = ema(closes, slow);

    fast.iter().zip(&slow).map(|(f, s)| f - s).collect()
}

/// MACD line minus its signal EMA
pub fn macd_hist(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Data {
    let line = macd(closes, fast, slow);
    let signal = ema(&line, signal);

    line.iter().zip(&signal).map(|(l, s)| l - s).collect()
}

/// Upper and lower bands `std_devs` population deviations around the SMA
pub fn bollinger(closes: &[f64], period: usize, std_devs: f64) -> (Data, Data) {
    let mean = sma(closes, period);
    let mut upper = vec![f64::NAN; closes.len()];
    let mut lower = vec![f64::NAN; closes.len()];

    for index in 0..closes.len() {
        if !mean[index].is_finite() {
            continue;
        }

        let window = &closes[index + 1 - period..=index];
        let variance =
            window.iter().map(|c| (c - mean[index]).powi(2)).sum::<f64>() / period as f64;
        let band = variance.sqrt() * std_devs;

        upper[index] = mean[index] + band;
        lower[index] = mean[index] - band;
    }

    (upper, lower)
}

/// On-balance volume, starting from 0
pub fn obv(closes: &[f64], volumes: &[f64]) -> Data {
    let mut out = Vec::with_capacity(closes.len());
    let mut total = 0.;

    for (index, volume) in volumes.iter().enumerate().take(closes.len()) {
        if index > 0 {
            if closes[index] > closes[index - 1] {
                total += volume;
            } else if closes[index] < closes[index - 1] {
                total -= volume;
            }
        }
        out.push(total);
    }

    out
}

/// Percent change from the previous close
pub fn daily_return(closes: &[f64]) -> Data {
    let mut out = vec![f64::NAN; closes.len()];
    for index in 1..closes.len() {
        out[index] = (closes[index] / closes[index - 1] - 1.) * 100.;
    }
    out
}

/// Log change from the previous close, in percent
pub fn daily_log_return(closes: &[f64]) -> Data {
    let mut out = vec![f64::NAN; closes.len()];
    for index in 1..closes.len() {
        out[index] = (closes[index] / closes[index - 1]).ln() * 100.;
    }
    out
}

/// Aroon up and down, in [0, 100]. Ties pick the most recent extreme.
pub fn aroon(highs: &[f64], lows: &[f64], period: usize) -> (Data, Data) {
    let len = highs.len().min(lows.len());
    let mut up = vec![f64::NAN; len];
    let mut down = vec![f64::NAN; len];
    if period == 0 {
        return (up, down);
    }

    for index in period..len {
        let start = index - period;

        let mut high_at = start;
        let mut low_at = start;
        for candidate in start..=index {
            if highs[candidate] >= highs[high_at] {
                high_at = candidate;
            }
            if lows[candidate] <= lows[low_at] {
                low_at = candidate;
            }
        }

        up[index] = (period - (index - high_at)) as f64 / period as f64 * 100.;
        down[index] = (period - (index - low_at)) as f64 / period as f64 * 100.;
    }

    (up, down)
}

/// The base columns plus momentum, trend, volatility and volume indicators.
/// The indicator columns are [`FEATURE_COLUMNS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TechnicalIndicators;

impl TechnicalIndicators {
    pub fn indicator_columns(rows: &[MarketRow]) -> Vec<(String, Data)> {
        let closes: Data = rows.iter().map(|row| row.close).collect();
        let highs: Data = rows.iter().map(|row| row.high).collect();
        let lows: Data = rows.iter().map(|row| row.low).collect();
        let volumes: Data = rows.iter().map(|row| row.volume as f64).collect();
        let sentiments: Data = rows.iter().map(|row| row.sentiment).collect();

        let (bb_upper, bb_lower) = bollinger(
            &closes,
            indicators::MOVING_AVG_PERIOD,
            indicators::BOLLINGER_STD_DEVS,
        );
        let (aroon_up, aroon_down) = aroon(&highs, &lows, indicators::AROON_PERIOD);

        let values = [
            rsi(&closes, indicators::RSI_PERIOD),
            macd(&closes, indicators::MACD_FAST, indicators::MACD_SLOW),
            macd_hist(
                &closes,
                indicators::MACD_FAST,
                indicators::MACD_SLOW,
                indicators::MACD_SIGNAL,
            ),
            sma(&closes, indicators::MOVING_AVG_PERIOD),
            ema(&closes, indicators::MOVING_AVG_PERIOD),
            bb_upper,
            bb_lower,
            obv(&closes, &volumes),
            daily_return(&closes),
            daily_log_return(&closes),
            aroon_up,
            aroon_down,
            sma(&sentiments, indicators::MOVING_AVG_PERIOD),
        ];

        FEATURE_COLUMNS
            .iter()
            .zip(values)
            .map(|(name, mut column)| {
                fill_missing(&mut column);
                (name.to_string(), column)
            })
            .collect()
    }
}

impl FeatureProcessor for TechnicalIndicators {
    fn column_names(&self) -> Vec<String> {
        BASE_COLUMNS
            .iter()
            .chain(FEATURE_COLUMNS.iter())
            .map(|name| name.to_string())
            .collect()
    }

    fn process(&self, rows: &[MarketRow]) -> DataResult<FeaturedTable> {
        let mut columns = FeaturedTable::base_columns(rows);
        columns.extend(Self::indicator_columns(rows));

        FeaturedTable::from_columns(rows.iter().map(|row| row.date).collect(), columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_sma_leading_values_are_nan() {
        let out = sma(&[1., 2., 3., 4.], 3);

        assert!(out[0].is_nan() && out[1].is_nan());
        assert_close(out[2], 2.);
        assert_close(out[3], 3.);
    }

    #[test]
    fn test_ema_seeds_with_sma() {
        let out = ema(&[2., 4., 6., 8.], 3);

        assert!(out[1].is_nan());
        assert_close(out[2], 4.);
        // (8 - 4) * 0.5 + 4
        assert_close(out[3], 6.);
    }

    #[test]
    fn test_rsi_extremes() {
        let rising: Data = (0..20).map(|i| i as f64).collect();
        let falling: Data = rising.iter().rev().copied().collect();

        assert!(rsi(&rising, 14)[13].is_nan());
        assert_close(rsi(&rising, 14)[19], 100.);
        assert_close(rsi(&falling, 14)[19], 0.);
    }

    #[test]
    fn test_rsi_balanced_moves() {
        let closes = [1., 2., 1., 2., 1.];

        assert_close(rsi(&closes, 4)[4], 50.);
    }

    #[test]
    fn test_macd_of_constant_series_is_zero() {
        let closes = vec![7.; 40];

        let line = macd(&closes, 12, 26);
        let hist = macd_hist(&closes, 12, 26, 9);

        assert!(line[24].is_nan());
        assert_close(line[25], 0.);
        assert!(hist[32].is_nan());
        assert_close(hist[33], 0.);
    }

    #[test]
    fn test_bollinger_bands_surround_mean() {
        let closes = [1., 3., 1., 3.];

        let (upper, lower) = bollinger(&closes, 2, 2.);

        assert!(upper[0].is_nan());
        assert_close(upper[1], 4.);
        assert_close(lower[1], 0.);
    }

    #[test]
    fn test_obv_follows_direction() {
        let out = obv(&[1., 2., 2., 1.], &[10., 20., 30., 40.]);

        assert_eq!(out, vec![0., 20., 20., -20.]);
    }

    #[test]
    fn test_returns() {
        let closes = [10., 11., 9.9];

        assert_close(daily_return(&closes)[1], 10.);
        assert_close(daily_return(&closes)[2], -10.);
        assert_close(daily_log_return(&closes)[1], (1.1f64).ln() * 100.);
    }

    #[test]
    fn test_aroon_tracks_extremes() {
        let highs = [1., 5., 2., 3.];
        let lows = [0., 4., 1., 2.];

        let (up, down) = aroon(&highs, &lows, 2);

        assert!(up[1].is_nan());
        assert_close(up[2], 50.);
        assert_close(down[2], 0.);
        // The high at index 1 is now the oldest bar in the window
        assert_close(up[3], 0.);
        assert_close(down[3], 50.);
    }

    #[test]
    fn test_processor_columns_are_filled_and_ordered() {
        let rows: Vec<MarketRow> = (0..60)
            .map(|i| MarketRow {
                date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i),
                open: 10. + i as f64,
                high: 11. + i as f64,
                low: 9. + i as f64,
                close: 10.5 + (i as f64).sin(),
                volume: 100 + i,
                sentiment: 0.1,
            })
            .collect();

        let table = TechnicalIndicators.process(&rows).unwrap();

        assert_eq!(table.columns(), TechnicalIndicators.column_names().as_slice());
        assert_eq!(table.feature_count(), BASE_COLUMNS.len() + FEATURE_COLUMNS.len());
        assert!(table.values().iter().all(|value| value.is_finite()));
    }

    #[test]
    fn test_undefined_sentiment_never_reaches_observations() {
        let mut rows: Vec<MarketRow> = (0..40)
            .map(|i| MarketRow {
                date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i),
                open: 20. + i as f64,
                high: 21. + i as f64,
                low: 19. + i as f64,
                close: 20.5 + i as f64,
                volume: 1_000,
                sentiment: (i as f64 * 0.3).cos(),
            })
            .collect();
        rows[3].sentiment = f64::NAN;

        let table = TechnicalIndicators.process(&rows).unwrap();
        assert!(table.values().iter().all(|value| value.is_finite()));

        let mut env = crate::Env::new(
            std::sync::Arc::new(table),
            crate::EnvConfig::serial(),
        )
        .unwrap();
        let observation = env.reset().unwrap();

        assert!(observation
            .iter()
            .all(|value| value.is_finite() && (0. ..=1.).contains(value)));
    }
}
