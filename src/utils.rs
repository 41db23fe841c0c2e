use std::{cmp::Ordering, fs, path::Path};

use crate::types::Data;

pub fn create_folder_if_not_exists(dir: impl AsRef<Path>) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

/// The change from each value to the next. The first difference is 0.
pub fn get_differences(data: &[f64]) -> Data {
    let mut diffs = Vec::with_capacity(data.len());

    for (index, value) in data.iter().enumerate() {
        match index.checked_sub(1) {
            Some(previous_index) => diffs.push(value - data[previous_index]),
            None => diffs.push(0.),
        }
    }

    diffs
}

/// Gain of `value` over `initial` in percent
pub fn percent_return(value: f64, initial: f64) -> f64 {
    value / initial * 100. - 100.
}

/// Mean of `data[end - entries..end]`
pub fn moving_average(data: &[f64], end: usize, entries: usize) -> f64 {
    data[end - entries..end].iter().sum::<f64>() / entries as f64
}

/// Min-max scales `value` into [0, 1]. A degenerate range maps to 0.
pub fn normalise(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range == 0. || !range.is_finite() {
        return 0.;
    }

    (value - min) / range
}

/// The smallest and largest finite values, if any
pub fn min_max(data: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    data.into_iter()
        .filter(|value| value.is_finite())
        .fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
}

/// Sorts strings so that embedded numbers compare numerically: `a2` before `a10`
pub fn natural_sort(names: &mut [String]) {
    names.sort_by(|a, b| natural_cmp(a, b));
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a_chunks = split_digit_chunks(a);
    let b_chunks = split_digit_chunks(b);

    for (a_chunk, b_chunk) in a_chunks.iter().zip(b_chunks.iter()) {
        let ordering = match (a_chunk.parse::<u128>(), b_chunk.parse::<u128>()) {
            (Ok(a_num), Ok(b_num)) => a_num.cmp(&b_num),
            _ => a_chunk.to_lowercase().cmp(&b_chunk.to_lowercase()),
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    a_chunks.len().cmp(&b_chunks.len())
}

fn split_digit_chunks(text: &str) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut last_was_digit = None;

    for c in text.chars() {
        let is_digit = c.is_ascii_digit();
        match chunks.last_mut() {
            Some(chunk) if last_was_digit == Some(is_digit) => chunk.push(c),
            _ => chunks.push(c.to_string()),
        }
        last_was_digit = Some(is_digit);
    }

    chunks
}
