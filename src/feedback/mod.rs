//! Structured diagnostics
//!
//! Turns front-end errors into reports that can be printed for people or
//! serialized as JSON for editors and build tooling.

use serde::{Deserialize, Serialize};

use crate::utils::{Error, ErrorCategory, SourceReference};

// ==================== Error Report ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Stable code per error category, e.g. "P0200"
    pub code: String,
    pub severity: Severity,
    pub category: String,
    pub message: String,
    pub location: Option<Location>,
    pub related: Vec<RelatedInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub end_line: Option<u32>,
    pub end_column: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedInfo {
    pub message: String,
    pub location: Option<Location>,
}

fn code(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::Parse => "P0001",
        ErrorCategory::Syntax => "P0100",
        ErrorCategory::DefinitionCollision => "P0200",
        ErrorCategory::UnresolvedIdentifier => "P0201",
        ErrorCategory::GlobalNameCollision => "P0202",
        ErrorCategory::Contract => "P0900",
        ErrorCategory::Io => "P1000",
    }
}

/// Where `reference` starts and ends within `file_name`
fn locate(reference: &SourceReference, file_name: &str) -> Location {
    let text = reference.text();
    let (end_line, end_column) = match text.rfind('\n') {
        Some(last) => (
            reference.line() + text.matches('\n').count() as u32,
            text[last + 1..].chars().count() as u32,
        ),
        None => (reference.line(), reference.column() + text.chars().count().saturating_sub(1) as u32),
    };
    Location {
        file: file_name.to_string(),
        line: reference.line(),
        column: reference.column(),
        end_line: Some(end_line),
        end_column: Some(end_column),
    }
}

impl ErrorReport {
    pub fn from_error(error: &Error, file_name: &str) -> Self {
        let location = match error.reference() {
            Some(reference) => Some(locate(reference, file_name)),
            None => error.location().map(|(line, column)| Location {
                file: file_name.to_string(),
                line,
                column,
                end_line: None,
                end_column: None,
            }),
        };

        let related = error
            .original()
            .map(|original| RelatedInfo {
                message: "first defined here".to_string(),
                location: Some(locate(original, file_name)),
            })
            .into_iter()
            .collect();

        let category = error.category();
        Self {
            code: code(category).to_string(),
            severity: Severity::Error,
            category: format!("{:?}", category),
            message: error.to_string(),
            location,
            related,
        }
    }

    /// One line per report plus one per related location
    pub fn render(&self) -> String {
        let mut out = match &self.location {
            Some(loc) => format!(
                "{}:{}:{}: error[{}]: {}",
                loc.file, loc.line, loc.column, self.code, self.message
            ),
            None => format!("error[{}]: {}", self.code, self.message),
        };
        for related in &self.related {
            if let Some(loc) = &related.location {
                out.push_str(&format!("\n  {}:{}:{}: note: {}", loc.file, loc.line, loc.column, related.message));
            }
        }
        out
    }
}

// ==================== Check Report ====================

/// Outcome of checking a set of scripts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckReport {
    pub success: bool,
    pub diagnostics: Vec<ErrorReport>,
    pub stats: CheckStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckStats {
    pub files: usize,
    /// Scripts that parsed and were indexed
    pub indexed: usize,
    pub global_symbols: usize,
    /// Imported scripts that could not be found or indexed
    pub unindexed_imports: usize,
    pub total_time_ms: u64,
}

impl CheckReport {
    pub fn new(diagnostics: Vec<ErrorReport>, stats: CheckStats) -> Self {
        Self {
            success: diagnostics.is_empty(),
            diagnostics,
            stats,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn to_json_compact(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
