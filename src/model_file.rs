use std::{
    fmt,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{constants::files::LATEST_PREFIX, error::ModelFileError, utils::natural_sort};

/// `[LATEST=]{prefix}_LBW-{lookback_window}_NOI-{iterations}.{extension}`
///
/// The lookback window is stored in the name so inference can rebuild observations with
/// the same shape the model was trained on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFileName {
    pub latest: bool,
    pub prefix: String,
    pub lookback_window: usize,
    pub iterations: u64,
    pub extension: String,
}

impl ModelFileName {
    pub fn new(
        prefix: impl Into<String>,
        lookback_window: usize,
        iterations: u64,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            latest: false,
            prefix: prefix.into(),
            lookback_window,
            iterations,
            extension: extension.into(),
        }
    }

    pub fn latest(self) -> Self {
        Self {
            latest: true,
            ..self
        }
    }
}

impl fmt::Display for ModelFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.latest {
            write!(f, "{LATEST_PREFIX}")?;
        }
        write!(
            f,
            "{}_LBW-{}_NOI-{}.{}",
            self.prefix, self.lookback_window, self.iterations, self.extension
        )
    }
}

impl FromStr for ModelFileName {
    type Err = ModelFileError;

    /// Parses from the end, so prefixes may themselves contain `_`
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| ModelFileError::MalformedName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let (latest, rest) = match name.strip_prefix(LATEST_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, name),
        };
        let (stem, extension) = rest
            .rsplit_once('.')
            .ok_or_else(|| malformed("missing extension"))?;
        let (head, iterations) = stem
            .rsplit_once("_NOI-")
            .ok_or_else(|| malformed("missing _NOI- section"))?;
        let (prefix, lookback_window) = head
            .rsplit_once("_LBW-")
            .ok_or_else(|| malformed("missing _LBW- section"))?;

        Ok(Self {
            latest,
            prefix: prefix.to_string(),
            lookback_window: lookback_window
                .parse()
                .map_err(|_| malformed("lookback window is not a number"))?,
            iterations: iterations
                .parse()
                .map_err(|_| malformed("iteration count is not a number"))?,
            extension: extension.to_string(),
        })
    }
}

/// The first `LATEST=` model in `dir`, in natural order
pub fn find_latest_model(dir: impl AsRef<Path>) -> Result<(PathBuf, ModelFileName), ModelFileError> {
    let dir = dir.as_ref();

    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|kind| kind.is_file()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    natural_sort(&mut names);

    let name = names
        .into_iter()
        .find(|name| name.starts_with(LATEST_PREFIX))
        .ok_or_else(|| ModelFileError::NotFound {
            dir: dir.display().to_string(),
        })?;

    let parsed = name.parse()?;
    Ok((dir.join(name), parsed))
}
