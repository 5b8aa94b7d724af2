/// Core domain types for revlink revisions, role occurrences, and reference nodes.
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::Error;

/// Parsed from `:role:`text`` syntax by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupOccurrence {
    /// One-based line number of the occurrence in the source file.
    pub line: u32,
    /// Full source text of the occurrence, role marker included.
    pub rawtext: String,
    /// Role name between the leading colons.
    pub role: String,
    /// Document containing this occurrence.
    pub source: PathBuf,
    /// Text between the backticks.
    pub text: String,
}

/// A hyperlink produced by a role renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceNode {
    /// Extra node attributes copied from the role options.
    pub attributes: BTreeMap<String, String>,
    /// Source text the node was generated from.
    pub rawtext: String,
    /// Resolved link target.
    pub refuri: String,
    /// Visible label.
    pub text: String,
}

/// A short revision identifier: commit hash or exact tag. Never empty.
/// Newtype prevents mixing with arbitrary strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision(String);

impl Revision {
    /// Wrap a trimmed revision string.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyRevision` if the string is empty after trimming.
    pub fn new(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyRevision);
        }
        return Ok(Self(trimmed.to_string()));
    }

    /// The revision text.
    pub fn as_str(&self) -> &str {
        return &self.0;
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(self.as_str());
    }
}

/// An error-level diagnostic emitted while rendering a role occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemMessage {
    /// One-based line the message refers to.
    pub line: u32,
    /// Human-readable description.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_is_trimmed() {
        let rev = Revision::new("  abc1234\n").unwrap();
        assert_eq!(rev.as_str(), "abc1234");
        assert_eq!(rev.to_string(), "abc1234");
    }

    #[test]
    fn empty_revision_is_rejected() {
        assert!(matches!(Revision::new(" \n"), Err(Error::EmptyRevision)));
    }
}
