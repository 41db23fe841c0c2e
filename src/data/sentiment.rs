use std::{collections::BTreeMap, path::{Path, PathBuf}};

use async_trait::async_trait;
use chrono::NaiveDate;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{
    data::{
        fetch::SentimentSource,
        historical::{load_articles, read_json},
    },
    error::{DataResult, FetchError, FetchResult},
    types::SentimentPoint,
};

/// A news article as returned by the search provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub published: NaiveDate,
    pub title: String,
    pub description: String,
}

impl Article {
    /// Only articles naming the company in both the title and the description are counted
    pub fn mentions(&self, company_name: &str) -> bool {
        let company_name = company_name.to_lowercase();

        self.title.to_lowercase().contains(&company_name)
            && self.description.to_lowercase().contains(&company_name)
    }
}

fn round_6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// Averages article scores per publication day.
///
/// Each relevant article scores the mean of `score(title)` and `score(description)`. The
/// result covers `[start, end]`, only has entries for days with at least one relevant
/// article, and is ordered newest first as the scraper stores it.
pub fn daily_sentiment(
    articles: &[Article],
    company_name: &str,
    start: NaiveDate,
    end: NaiveDate,
    score: impl Fn(&str) -> f64,
) -> Vec<SentimentPoint> {
    let mut days: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();

    for article in articles {
        if !(start..=end).contains(&article.published) || !article.mentions(company_name) {
            continue;
        }

        let article_score = (score(&article.title) + score(&article.description)) / 2.;

        let (sum, count) = days.entry(article.published).or_insert((0., 0));
        *sum += article_score;
        *count += 1;
    }

    days.into_iter()
        .rev()
        .map(|(date, (sum, count))| SentimentPoint {
            date,
            sentiment: round_6(sum / count as f64),
        })
        .collect()
}

/// Word polarities in [-1, 1]. A text scores the mean polarity of the words it contains
/// that the lexicon knows, or 0 when it contains none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lexicon {
    words: HashMap<String, f64>,
}

impl Lexicon {
    pub fn new(words: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            words: words
                .into_iter()
                .map(|(word, polarity)| (word.to_lowercase(), polarity.clamp(-1., 1.)))
                .collect(),
        }
    }

    /// A JSON object of `"word": polarity` pairs
    pub fn from_json_file(path: &Path) -> DataResult<Self> {
        let words: HashMap<String, f64> = read_json(path)?;
        Ok(Self::new(words))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn score(&self, text: &str) -> f64 {
        let (sum, count) = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .filter_map(|word| self.words.get(&word.to_lowercase()))
            .fold((0., 0usize), |(sum, count), polarity| (sum + polarity, count + 1));

        if count == 0 {
            return 0.;
        }
        sum / count as f64
    }
}

/// Scores the articles saved under `{data_dir}/{symbol}/` with a lexicon
#[derive(Debug, Clone)]
pub struct ArticleSource {
    pub data_dir: PathBuf,
    pub lexicon: Lexicon,
}

impl ArticleSource {
    pub fn new(data_dir: impl Into<PathBuf>, lexicon: Lexicon) -> Self {
        Self {
            data_dir: data_dir.into(),
            lexicon,
        }
    }
}

#[async_trait]
impl SentimentSource for ArticleSource {
    fn name(&self) -> &str {
        "articles"
    }

    async fn sentiment_series(
        &self,
        symbol: &str,
        company_name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> FetchResult<Vec<SentimentPoint>> {
        let articles = load_articles(&self.data_dir, symbol)?;
        let mut points = daily_sentiment(&articles, company_name, start, end, |text| {
            self.lexicon.score(text)
        });

        if points.is_empty() {
            return Err(FetchError::NoData {
                source_name: self.name().to_string(),
                symbol: symbol.to_string(),
                start,
                end,
            });
        }

        points.reverse();
        Ok(points)
    }
}
