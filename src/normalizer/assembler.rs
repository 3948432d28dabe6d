use std::fmt;

use serde::{Deserialize, Serialize};

use crate::app::{PostwatchError, Result};

/// One text-bearing node under a post's time link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFragment {
    pub text: String,
    /// Raw `style` attribute, if any
    pub style: Option<String>,
}

impl TimeFragment {
    pub fn new(text: impl Into<String>, style: Option<&str>) -> Self {
        Self {
            text: text.into(),
            style: style.map(String::from),
        }
    }
}

/// Relative time text reassembled from marker-tagged fragments.
///
/// Not yet checked against the time grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeTimeString(String);

impl RelativeTimeString {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelativeTimeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rebuilds the time string the site scatters among decoy characters.
///
/// Genuine characters carry a `style` attribute exactly equal to the marker;
/// decoys are positioned some other way.
#[derive(Debug, Clone)]
pub struct TimeStringAssembler {
    marker: String,
}

impl TimeStringAssembler {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Concatenate, in document order, the text of every fragment bearing the marker
    pub fn assemble(&self, fragments: &[TimeFragment]) -> Result<RelativeTimeString> {
        let assembled: String = fragments
            .iter()
            .filter(|f| f.style.as_deref() == Some(self.marker.as_str()))
            .map(|f| f.text.as_str())
            .collect();

        if assembled.is_empty() {
            return Err(PostwatchError::EmptyTimeString);
        }

        Ok(RelativeTimeString(assembled))
    }
}
