//! Source location tracking for error reporting
//!
//! This module provides types for tracking locations in `.xfile` sources,
//! which is essential for good error messages and batch diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A location in a source file (line and column are 1-based)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub filename: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    /// Create a location with filename
    pub fn new(filename: &str, line: u32, column: u32) -> Self {
        Self {
            filename: filename.to_string(),
            line,
            column,
        }
    }

    /// Create a location without a filename (common pattern in tests)
    pub fn new_simple(line: u32, column: u32) -> Self {
        Self {
            filename: "<input>".to_string(),
            line,
            column,
        }
    }

    /// Create a dummy location for testing
    pub fn dummy() -> Self {
        Self::new("<unknown>", 0, 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

/// A span in a source file (from start to end location)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }

    /// Create a span from a single location
    pub fn from_location(location: SourceLocation) -> Self {
        Self {
            end: location.clone(),
            start: location,
        }
    }

    /// Create a dummy span for testing
    pub fn dummy() -> Self {
        Self::from_location(SourceLocation::dummy())
    }

    /// Check if this span is in the same file as another
    pub fn same_file(&self, other: &SourceSpan) -> bool {
        self.start.filename == other.start.filename
    }

    /// Extend this span to include another span
    pub fn extend(&self, other: &SourceSpan) -> SourceSpan {
        if !self.same_file(other) {
            return self.clone();
        }

        let start = if self.start.line < other.start.line
            || (self.start.line == other.start.line && self.start.column <= other.start.column)
        {
            self.start.clone()
        } else {
            other.start.clone()
        };

        let end = if self.end.line > other.end.line
            || (self.end.line == other.end.line && self.end.column >= other.end.column)
        {
            self.end.clone()
        } else {
            other.end.clone()
        };

        SourceSpan::new(start, end)
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.filename != self.end.filename {
            write!(f, "{} to {}", self.start, self.end)
        } else if self.start.line == self.end.line {
            if self.start.column == self.end.column {
                write!(f, "{}:{}", self.start.filename, self.start.line)
            } else {
                write!(
                    f,
                    "{}:{}:{}-{}",
                    self.start.filename, self.start.line, self.start.column, self.end.column
                )
            }
        } else {
            write!(
                f,
                "{}:{}:{}-{}:{}",
                self.start.filename, self.start.line, self.start.column, self.end.line, self.end.column
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location() {
        let loc = SourceLocation::new("head.xfile", 42, 10);
        assert_eq!(loc.filename, "head.xfile");
        assert_eq!(loc.line, 42);
        assert_eq!(loc.column, 10);
        assert_eq!(format!("{}", loc), "head.xfile:42:10");
    }

    #[test]
    fn test_source_span_same_line() {
        let start = SourceLocation::new("head.xfile", 1, 5);
        let end = SourceLocation::new("head.xfile", 1, 10);
        let span = SourceSpan::new(start, end);

        assert_eq!(format!("{}", span), "head.xfile:1:5-10");
    }

    #[test]
    fn test_source_span_different_lines() {
        let start = SourceLocation::new("head.xfile", 1, 5);
        let end = SourceLocation::new("head.xfile", 3, 10);
        let span = SourceSpan::new(start, end);

        assert_eq!(format!("{}", span), "head.xfile:1:5-3:10");
    }

    #[test]
    fn test_source_span_extend() {
        let span1 = SourceSpan::new(
            SourceLocation::new("head.xfile", 1, 5),
            SourceLocation::new("head.xfile", 1, 10),
        );
        let span2 = SourceSpan::new(
            SourceLocation::new("head.xfile", 1, 8),
            SourceLocation::new("head.xfile", 2, 5),
        );

        let extended = span1.extend(&span2);
        assert_eq!(extended.start.line, 1);
        assert_eq!(extended.start.column, 5);
        assert_eq!(extended.end.line, 2);
        assert_eq!(extended.end.column, 5);
    }
}
