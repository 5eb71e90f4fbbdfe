use serde::{Deserialize, Serialize};

use crate::error::{FrameError, Result};

const HEAD_LENGTH_VAR: &str = "RUSTY_FRAMES_HEAD_LENGTH";
const TAIL_LENGTH_VAR: &str = "RUSTY_FRAMES_TAIL_LENGTH";

// ---------------------------------------------------------------------------
// Conf – scalar settings read by the slicing operators
// ---------------------------------------------------------------------------

/// Settings consumed at call time by [`head`](crate::transform::slice::head)
/// and [`tail`](crate::transform::slice::tail).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conf {
    /// Number of rows returned by `head`.
    pub head_length: usize,
    /// Number of rows returned by `tail`.
    pub tail_length: usize,
}

impl Default for Conf {
    fn default() -> Self {
        Self {
            head_length: 10,
            tail_length: 10,
        }
    }
}

impl Conf {
    /// Parse a JSON document such as `{"head_length": 5}`.
    ///
    /// Absent keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let conf: Conf = serde_json::from_str(text)?;
        conf.validate()?;
        Ok(conf)
    }

    /// Defaults, overridden by `RUSTY_FRAMES_HEAD_LENGTH` / `RUSTY_FRAMES_TAIL_LENGTH`.
    pub fn from_env() -> Self {
        let mut conf = Conf::default();
        if let Some(n) = read_length_var(HEAD_LENGTH_VAR) {
            conf.head_length = n;
        }
        if let Some(n) = read_length_var(TAIL_LENGTH_VAR) {
            conf.tail_length = n;
        }
        conf
    }

    /// Both lengths must be positive.
    pub fn validate(&self) -> Result<()> {
        if self.head_length == 0 || self.tail_length == 0 {
            return Err(FrameError::Argument(format!(
                "head/tail lengths must be positive, got head={} tail={}",
                self.head_length, self.tail_length
            )));
        }
        Ok(())
    }
}

fn read_length_var(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            log::warn!("ignoring {name}={raw:?}: expected a positive integer");
            None
        }
    }
}
