use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EnvError, EnvResult};

/// The rows an episode trades over. The episode starts on `start` and takes
/// `end - start` steps, the last of which lands on `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeWindow {
    pub start: usize,
    pub end: usize,
}

impl EpisodeWindow {
    /// Number of steps in the episode
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Picks the window for the next episode.
///
/// Serial windows cover the whole table after the first `lookback_window` rows. Random
/// windows have a uniformly drawn length and position, always leave a full lookback
/// before `start`, and never reach past the last row.
pub fn select_window<R: Rng + ?Sized>(
    table_len: usize,
    lookback_window: usize,
    is_serial: bool,
    max_session_length: usize,
    rng: &mut R,
) -> EnvResult<EpisodeWindow> {
    let insufficient = || EnvError::InsufficientData {
        rows: table_len,
        lookback_window,
    };

    // At least one step has to fit after the lookback
    if table_len < lookback_window + 2 {
        return Err(insufficient());
    }

    if is_serial {
        return Ok(EpisodeWindow {
            start: lookback_window,
            end: table_len - 1,
        });
    }

    let local_max = max_session_length.min(table_len);
    if local_max <= lookback_window + 1 {
        return Err(insufficient());
    }

    let len = rng.gen_range(lookback_window + 1..local_max) - lookback_window;
    let start = rng.gen_range(lookback_window..table_len - len);
    let window = EpisodeWindow {
        start,
        end: start + len,
    };

    debug!(start = window.start, end = window.end, "selected random window");
    Ok(window)
}
