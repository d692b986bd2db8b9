//! Confidence flag attached to frames and measurements.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How much a result can be trusted.
///
/// Ordered from best to worst, so `max` of two qualities is the worse one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Quality {
    /// Every step succeeded with the preferred inputs.
    #[default]
    Ok,
    /// A result exists but at least one step used a fallback.
    Fallback,
    /// No usable result.
    Missing,
}

impl Quality {
    /// Lower `Ok` to `Fallback`. `Fallback` and `Missing` are unchanged.
    #[must_use]
    pub const fn downgrade(self) -> Self {
        match self {
            Self::Ok => Self::Fallback,
            other => other,
        }
    }

    /// The worse of two qualities.
    #[must_use]
    pub fn worst(self, other: Self) -> Self {
        self.max(other)
    }

    /// Whether a result is present at all.
    #[must_use]
    pub const fn is_usable(self) -> bool {
        !matches!(self, Self::Missing)
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Fallback => "fallback",
            Self::Missing => "missing",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
