use crate::{
    error::{DataError, DataResult},
    types::MarketRow,
    utils::moving_average,
};

/// Replaces every numeric column with the trailing mean of the previous `entries` rows.
///
/// Row `i` of the output carries the date of input row `i + entries` and the averages of
/// input rows `i..i + entries`, so the first `entries` rows are consumed as warmup.
pub fn smooth(rows: &[MarketRow], entries: usize) -> DataResult<Vec<MarketRow>> {
    if entries == 0 {
        return Ok(rows.to_vec());
    }

    if rows.len() <= entries {
        return Err(DataError::TooShort {
            rows: rows.len(),
            required: entries + 1,
        });
    }

    let column = |value: fn(&MarketRow) -> f64| rows.iter().map(value).collect::<Vec<f64>>();

    let opens = column(|row: &MarketRow| row.open);
    let highs = column(|row: &MarketRow| row.high);
    let lows = column(|row: &MarketRow| row.low);
    let closes = column(|row: &MarketRow| row.close);
    let volumes = column(|row: &MarketRow| row.volume as f64);
    let sentiments = column(|row: &MarketRow| row.sentiment);

    let smoothed = (entries..rows.len())
        .map(|index| MarketRow {
            date: rows[index].date,
            open: moving_average(&opens, index, entries),
            high: moving_average(&highs, index, entries),
            low: moving_average(&lows, index, entries),
            close: moving_average(&closes, index, entries),
            volume: moving_average(&volumes, index, entries) as u64,
            sentiment: moving_average(&sentiments, index, entries),
        })
        .collect();

    Ok(smoothed)
}
