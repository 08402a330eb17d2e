//! Translation direction and the radio-style group that holds it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Requested conversion mode, sent as the `direction` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TranslationDirection {
    /// English → Khmer (`en-km`). (default)
    #[default]
    #[serde(rename = "en-km")]
    EnKm,
    /// Khmer → English (`km-en`).
    #[serde(rename = "km-en")]
    KmEn,
}

impl TranslationDirection {
    /// Every option, in display order.
    pub const ALL: [TranslationDirection; 2] = [TranslationDirection::EnKm, TranslationDirection::KmEn];

    /// The value the translation service expects on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationDirection::EnKm => "en-km",
            TranslationDirection::KmEn => "km-en",
        }
    }

    /// Human-readable label, e.g. for a radio button.
    pub fn label(&self) -> &'static str {
        match self {
            TranslationDirection::EnKm => "English → Khmer",
            TranslationDirection::KmEn => "Khmer → English",
        }
    }
}

impl fmt::Display for TranslationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslationDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en-km" => Ok(TranslationDirection::EnKm),
            "km-en" => Ok(TranslationDirection::KmEn),
            other => Err(format!(
                "unknown translation direction '{other}' (expected en-km or km-en)"
            )),
        }
    }
}

/// Mutually exclusive group of direction options.
///
/// At most one option is active. Activating one deactivates the others;
/// [`DirectionSelector::clear`] leaves none active, which fails the submit
/// precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionSelector {
    active: Option<TranslationDirection>,
}

impl Default for DirectionSelector {
    fn default() -> Self {
        Self {
            active: Some(TranslationDirection::default()),
        }
    }
}

impl DirectionSelector {
    pub fn new(active: Option<TranslationDirection>) -> Self {
        Self { active }
    }

    pub fn select(&mut self, direction: TranslationDirection) {
        self.active = Some(direction);
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<TranslationDirection> {
        self.active
    }

    pub fn is_active(&self, direction: TranslationDirection) -> bool {
        self.active == Some(direction)
    }
}
