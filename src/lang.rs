//! Language detection heuristic
//!
//! Binary classifier over the two supported chat languages. Vietnamese text
//! is recognized by the presence of any Vietnamese diacritic; everything
//! else (plain ASCII, numerals) falls through to English. This is a script
//! heuristic, not a general-purpose language identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Characters that occur in Vietnamese orthography but not in English.
const VIETNAMESE_MARKS: &str =
    "àáạảãâầấậẩẫăằắặẳẵèéẹẻẽêềếệểễìíịỉĩòóọỏõôồốộổỗơờớợởỡùúụủũưừứựửữỳýỵỷỹđ";

/// One of the two supported chat languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    /// The default classification
    #[serde(rename = "en")]
    English,
    #[serde(rename = "vi")]
    Vietnamese,
}

impl Language {
    /// The translation target for text in this language.
    ///
    /// Only two languages are supported, so the direction is always
    /// unambiguous.
    #[must_use]
    pub const fn complement(self) -> Self {
        match self {
            Self::English => Self::Vietnamese,
            Self::Vietnamese => Self::English,
        }
    }

    /// Wire code used in protocol events.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Vietnamese => "vi",
        }
    }

    /// Human-readable name used in gateway prompts.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Vietnamese => "Vietnamese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Classify a text span.
///
/// Deterministic, case-insensitive, O(length of text). Text with no
/// distinguishing characters is always English.
#[must_use]
pub fn detect(text: &str) -> Language {
    let vietnamese = text
        .chars()
        .flat_map(char::to_lowercase)
        .any(|c| VIETNAMESE_MARKS.contains(c));

    if vietnamese {
        Language::Vietnamese
    } else {
        Language::English
    }
}
