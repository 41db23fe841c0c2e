pub mod indicators;

use chrono::NaiveDate;
use ndarray::{Array2, ArrayView1, Axis};

use crate::{
    error::{DataError, DataResult},
    types::{Data, MarketRow},
    utils::{min_max, normalise},
};

pub use indicators::{TechnicalIndicators, FEATURE_COLUMNS};

/// Columns every featured table starts with, in order
pub const BASE_COLUMNS: [&str; 6] = ["open", "high", "low", "close", "volume", "sentiment"];

/// Turns aligned rows into the immutable table the environment reads from.
///
/// Implementations must be deterministic and always produce the columns named by
/// `column_names`, in that order.
pub trait FeatureProcessor {
    fn column_names(&self) -> Vec<String>;

    fn process(&self, rows: &[MarketRow]) -> DataResult<FeaturedTable>;
}

/// Only the base columns, unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseColumns;

impl FeatureProcessor for BaseColumns {
    fn column_names(&self) -> Vec<String> {
        BASE_COLUMNS.iter().map(|name| name.to_string()).collect()
    }

    fn process(&self, rows: &[MarketRow]) -> DataResult<FeaturedTable> {
        FeaturedTable::from_rows(rows)
    }
}

/// Backfills undefined values from the next defined one, then zero fills what is left
pub fn fill_missing(column: &mut [f64]) {
    let mut next = None;

    for value in column.iter_mut().rev() {
        if value.is_finite() {
            next = Some(*value);
        } else {
            *value = next.unwrap_or(0.);
        }
    }
}

/// An aligned table with its engineered feature columns.
///
/// Built once and never mutated, so it can be shared between environments behind an
/// `Arc`. The min-max scaled copy the observations are sliced from is computed here,
/// over the whole table.
#[derive(Debug, Clone)]
pub struct FeaturedTable {
    dates: Vec<NaiveDate>,
    columns: Vec<String>,
    /// rows x columns
    values: Array2<f64>,
    /// columns x rows, each column scaled to [0, 1]
    scaled: Array2<f32>,
    open_index: usize,
    close_index: usize,
}

impl FeaturedTable {
    /// The base columns of `rows`, with undefined values filled like the indicator columns
    pub fn base_columns(rows: &[MarketRow]) -> Vec<(String, Data)> {
        let extract: [fn(&MarketRow) -> f64; 6] = [
            |row: &MarketRow| row.open,
            |row: &MarketRow| row.high,
            |row: &MarketRow| row.low,
            |row: &MarketRow| row.close,
            |row: &MarketRow| row.volume as f64,
            |row: &MarketRow| row.sentiment,
        ];

        BASE_COLUMNS
            .iter()
            .zip(extract)
            .map(|(name, value)| {
                let mut column: Data = rows.iter().map(value).collect();
                fill_missing(&mut column);
                (name.to_string(), column)
            })
            .collect()
    }

    pub fn from_rows(rows: &[MarketRow]) -> DataResult<Self> {
        Self::from_columns(
            rows.iter().map(|row| row.date).collect(),
            Self::base_columns(rows),
        )
    }

    /// Requires an `open` and a `close` column, and every column to have one value per date
    pub fn from_columns(dates: Vec<NaiveDate>, columns: Vec<(String, Data)>) -> DataResult<Self> {
        let rows = dates.len();

        for (name, values) in &columns {
            if values.len() != rows {
                return Err(DataError::ColumnLength {
                    column: name.clone(),
                    len: values.len(),
                    rows,
                });
            }
        }

        let position = |wanted: &'static str| {
            columns
                .iter()
                .position(|(name, _)| name == wanted)
                .ok_or(DataError::MissingColumn(wanted))
        };
        let open_index = position("open")?;
        let close_index = position("close")?;

        let mut values = Array2::zeros((rows, columns.len()));
        let mut scaled = Array2::zeros((columns.len(), rows));

        for (col, (_, column)) in columns.iter().enumerate() {
            let (min, max) = min_max(column.iter().copied()).unwrap_or((0., 0.));

            for (row, &value) in column.iter().enumerate() {
                values[[row, col]] = value;
                scaled[[col, row]] = if value.is_finite() {
                    normalise(value, min, max) as f32
                } else {
                    0.
                };
            }
        }

        Ok(Self {
            dates,
            columns: columns.into_iter().map(|(name, _)| name).collect(),
            values,
            scaled,
            open_index,
            close_index,
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Features along the first axis, time along the second
    pub fn scaled(&self) -> &Array2<f32> {
        &self.scaled
    }

    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        let index = self.columns.iter().position(|column| column == name)?;
        Some(self.values.index_axis(Axis(1), index))
    }

    pub fn open(&self, index: usize) -> f64 {
        self.values[[index, self.open_index]]
    }

    pub fn close(&self, index: usize) -> f64 {
        self.values[[index, self.close_index]]
    }

    pub fn closes(&self) -> Data {
        self.values.column(self.close_index).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Days;

    use super::*;

    fn dates(len: u64) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..len).map(|day| start + Days::new(day)).collect()
    }

    #[test]
    fn test_fill_missing_backfills_then_zero_fills() {
        let mut column = vec![f64::NAN, f64::NAN, 3., f64::NAN, 5., f64::INFINITY];

        fill_missing(&mut column);

        assert_eq!(column, vec![3., 3., 3., 5., 5., 0.]);
    }

    #[test]
    fn test_scaling_uses_whole_table() {
        let table = FeaturedTable::from_columns(
            dates(3),
            vec![
                ("open".to_string(), vec![1., 2., 3.]),
                ("close".to_string(), vec![10., 20., 30.]),
                ("flat".to_string(), vec![4., 4., 4.]),
            ],
        )
        .unwrap();

        let scaled = table.scaled();
        assert_eq!(scaled.dim(), (3, 3));
        assert_eq!(scaled.row(1).to_vec(), vec![0., 0.5, 1.]);
        // Constant columns carry no information
        assert_eq!(scaled.row(2).to_vec(), vec![0., 0., 0.]);
        assert_eq!(table.close(2), 30.);
        assert_eq!(table.open(0), 1.);
    }

    #[test]
    fn test_rejects_ragged_columns() {
        let err = FeaturedTable::from_columns(
            dates(3),
            vec![
                ("open".to_string(), vec![1., 2., 3.]),
                ("close".to_string(), vec![1., 2.]),
            ],
        )
        .unwrap_err();

        assert!(matches!(err, DataError::ColumnLength { len: 2, rows: 3, .. }));
    }

    #[test]
    fn test_requires_price_columns() {
        let err = FeaturedTable::from_columns(dates(1), vec![("open".to_string(), vec![1.])])
            .unwrap_err();

        assert!(matches!(err, DataError::MissingColumn("close")));
    }

    #[test]
    fn test_base_columns_keep_row_values() {
        let rows: Vec<MarketRow> = dates(2)
            .into_iter()
            .enumerate()
            .map(|(i, date)| MarketRow {
                date,
                open: 1. + i as f64,
                high: 2.,
                low: 0.5,
                close: 1.5 + i as f64,
                volume: 10,
                sentiment: -0.2,
            })
            .collect();

        let table = BaseColumns.process(&rows).unwrap();

        assert_eq!(table.columns(), BaseColumns.column_names().as_slice());
        assert_eq!(table.closes(), vec![1.5, 2.5]);
        assert_eq!(table.column("sentiment").unwrap().to_vec(), vec![-0.2, -0.2]);
        assert!(table.column("rsi").is_none());
    }

    #[test]
    fn test_base_columns_fill_undefined_values() {
        let rows: Vec<MarketRow> = dates(3)
            .into_iter()
            .enumerate()
            .map(|(i, date)| MarketRow {
                date,
                open: 1.,
                high: 1.,
                low: 1.,
                close: 1.,
                volume: 1,
                sentiment: if i == 0 { f64::NAN } else { 0.5 },
            })
            .collect();

        let table = BaseColumns.process(&rows).unwrap();

        assert_eq!(table.column("sentiment").unwrap().to_vec(), vec![0.5, 0.5, 0.5]);
        assert!(table.scaled().iter().all(|value| value.is_finite()));
    }
}
