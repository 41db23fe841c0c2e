use std::cmp::{max, min};

use chrono::NaiveDate;

use crate::{
    error::{DataError, DataResult},
    types::{MarketRow, PriceBar, SentimentPoint},
};

/// A dated sample that can be linearly interpolated towards a later sample
trait DailyPoint: Copy {
    fn date(&self) -> NaiveDate;

    /// The synthetic sample `day` days after `self`, on the way to `next` which is `days` away
    fn interpolate(&self, next: &Self, date: NaiveDate, day: i64, days: i64) -> Self;
}

impl DailyPoint for SentimentPoint {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn interpolate(&self, next: &Self, date: NaiveDate, day: i64, days: i64) -> Self {
        let per_day = (next.sentiment - self.sentiment) / days as f64;
        SentimentPoint {
            date,
            sentiment: self.sentiment + day as f64 * per_day,
        }
    }
}

impl DailyPoint for PriceBar {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn interpolate(&self, next: &Self, date: NaiveDate, day: i64, days: i64) -> Self {
        let lerp = |from: f64, to: f64| from + day as f64 * (to - from) / days as f64;

        PriceBar {
            date,
            open: lerp(self.open, next.open),
            high: lerp(self.high, next.high),
            low: lerp(self.low, next.low),
            close: lerp(self.close, next.close),
            // Shares are whole, truncate like the rest of the pipeline does
            volume: lerp(self.volume as f64, next.volume as f64) as u64,
        }
    }
}

/// Fills every missing calendar day in one forward pass, so the output has exactly one
/// sample per day from the first date to the last.
fn fill_gaps<T: DailyPoint>(series: &[T], name: &'static str) -> DataResult<Vec<T>> {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Err(DataError::EmptySeries { series: name });
    };

    let span = (last.date() - first.date()).num_days().max(0) as usize + 1;
    let mut filled = Vec::with_capacity(span);

    for pair in series.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        let days = (next.date() - current.date()).num_days();

        if days <= 0 {
            return Err(DataError::Alignment {
                series: name,
                reason: format!(
                    "dates must be strictly ascending, {} follows {}",
                    next.date(),
                    current.date()
                ),
            });
        }

        filled.push(*current);

        let mut date = current.date();
        for day in 1..days {
            date = date.succ_opt().ok_or_else(|| DataError::Alignment {
                series: name,
                reason: format!("date overflow after {date}"),
            })?;
            filled.push(current.interpolate(next, date, day, days));
        }
    }

    filled.push(*last);
    Ok(filled)
}

/// Merges a price series and a sentiment series into one gap-free table covering the
/// days both series have in common.
///
/// Both inputs must be in ascending date order. Interior gaps in either series are filled
/// by linear interpolation between the surrounding known values, then both series are
/// trimmed to their shared date range and zipped together.
///
/// Fails if either series is empty, out of order, or the two ranges do not overlap.
pub fn align(prices: &[PriceBar], sentiments: &[SentimentPoint]) -> DataResult<Vec<MarketRow>> {
    let sentiments = fill_gaps(sentiments, "sentiment")?;
    let prices = fill_gaps(prices, "price")?;

    let (price_start, price_end) = (prices[0].date, prices[prices.len() - 1].date);
    let (sentiment_start, sentiment_end) =
        (sentiments[0].date, sentiments[sentiments.len() - 1].date);

    // Both series are now contiguous, so the shared range is the later start to the earlier end
    let start = max(price_start, sentiment_start);
    let end = min(price_end, sentiment_end);

    if start > end {
        return Err(DataError::NoOverlap {
            price_start,
            price_end,
            sentiment_start,
            sentiment_end,
        });
    }

    let len = (end - start).num_days() as usize + 1;
    let price_offset = (start - price_start).num_days() as usize;
    let sentiment_offset = (start - sentiment_start).num_days() as usize;

    let rows = prices[price_offset..price_offset + len]
        .iter()
        .zip(&sentiments[sentiment_offset..sentiment_offset + len])
        .map(|(bar, sentiment)| MarketRow::from_parts(bar, sentiment))
        .collect();

    Ok(rows)
}
