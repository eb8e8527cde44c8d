use std::fmt;

use msibind_ir::{Field, SourceLineNumber, SymbolId};
use smol_str::SmolStr;
use thiserror::Error;

use crate::extension::ExtensionError;

/// Identifies one textual column of one symbol in the representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldLocation {
    /// Index of the owning section in `Intermediate::sections`.
    pub section_index: usize,
    pub section: SmolStr,
    pub symbol: SymbolId,
    pub field: Field,
}

impl fmt::Display for FieldLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}.{}.{}", self.section, self.symbol, self.field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    PreResolve,
    PostResolve,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreResolve => write!(f, "pre-resolve"),
            Self::PostResolve => write!(f, "post-resolve"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unresolved variable `{variable}` in {location}")]
    UnresolvedVariable {
        variable: SmolStr,
        location: FieldLocation,
    },

    #[error("`{variable}` in {location} can only be resolved at bind time")]
    DelayedResolutionUnsupported {
        variable: SmolStr,
        location: FieldLocation,
    },

    #[error("{location} refers to unknown bind path `{name}`")]
    UnknownBindPath { name: SmolStr, location: FieldLocation },

    #[error("localization `{culture}` defines `{id}` more than once{}", at_line(.line))]
    DuplicateLocalization {
        culture: SmolStr,
        id: SmolStr,
        line: Option<SourceLineNumber>,
    },

    #[error("extension `{extension}` failed in {hook}: {source}")]
    Extension {
        extension: SmolStr,
        hook: Hook,
        source: ExtensionError,
    },

    /// Post-resolve hooks failed after an earlier failure. `cause` is the
    /// failure of resolution itself, or of the first failing hook.
    #[error("{cause}; post-resolve hooks also failed: {}", joined(.hook_errors))]
    PostResolveFailed {
        #[source]
        cause: Box<ResolveError>,
        hook_errors: Vec<ResolveError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("file `{file}` in section `{section}` is on disk {disk_id}, but no media declares that disk")]
    MissingMedia {
        section: SmolStr,
        file: SmolStr,
        disk_id: i32,
    },

    #[error("section `{section}` declares media for disk {disk_id} more than once")]
    DuplicateMedia { section: SmolStr, disk_id: i32 },

    #[error("{symbol} in section `{section}` is not a file")]
    NotAFile { section: SmolStr, symbol: SymbolId },

    #[error("sequence numbers on disk {disk_id} in section `{section}` exceed {}", i32::MAX)]
    SequenceOverflow { section: SmolStr, disk_id: i32 },
}

fn at_line(line: &Option<SourceLineNumber>) -> String {
    match line {
        Some(line) => format!(" at {line}"),
        None => String::new(),
    }
}

fn joined(errors: &[ResolveError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
