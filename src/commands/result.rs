//! Result values produced by command handlers.
//!
//! A handler returns either a flat list of lines or a list of groups. Lines
//! that must survive every filter (ids, headers) carry the literal
//! [`IGNORE_MARKER`] prefix, which is only removed at render time.

use super::format::strip_ansi;
use std::fmt;

/// Prefix marking a line as exempt from filter exclusion.
pub const IGNORE_MARKER: &str = "{grepignore}";

/// One display line, possibly colored, possibly marked as passthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLine(String);

impl ResultLine {
    /// Creates an ordinary line that filters may drop.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Creates a line that always passes filters.
    pub fn passthrough(text: impl AsRef<str>) -> Self {
        Self(format!("{IGNORE_MARKER}{}", text.as_ref()))
    }

    /// Returns true if the line starts with the ignore marker.
    pub fn is_passthrough(&self) -> bool {
        self.0.starts_with(IGNORE_MARKER)
    }

    /// The raw text, marker included.
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// The text as rendered: marker removed, colors kept.
    pub fn display(&self) -> &str {
        self.0.strip_prefix(IGNORE_MARKER).unwrap_or(&self.0)
    }

    /// The text filters look at: marker and colors removed.
    pub fn plain(&self) -> String {
        strip_ansi(self.display())
    }
}

impl From<String> for ResultLine {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for ResultLine {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl fmt::Display for ResultLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

/// The output of one command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultValue {
    /// An ordered sequence of lines.
    Flat(Vec<ResultLine>),
    /// An ordered sequence of line groups; filters keep or drop whole groups.
    Grouped(Vec<Vec<ResultLine>>),
}

impl ResultValue {
    /// An empty flat result.
    pub fn empty() -> Self {
        Self::Flat(Vec::new())
    }

    /// A flat result from anything that converts into lines.
    pub fn flat<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<ResultLine>,
    {
        Self::Flat(lines.into_iter().map(Into::into).collect())
    }

    /// A single-line flat result, the usual reply of mutating commands.
    pub fn message(text: impl Into<String>) -> Self {
        Self::Flat(vec![ResultLine::new(text)])
    }

    /// Returns true if there is nothing to render.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Flat(lines) => lines.is_empty(),
            Self::Grouped(groups) => groups.iter().all(Vec::is_empty),
        }
    }

    /// Every line in output order, groups concatenated.
    pub fn lines(&self) -> Box<dyn Iterator<Item = &ResultLine> + '_> {
        match self {
            Self::Flat(lines) => Box::new(lines.iter()),
            Self::Grouped(groups) => Box::new(groups.iter().flatten()),
        }
    }
}
