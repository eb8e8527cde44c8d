use std::fmt;

use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::{localization::Localization, section::Section, SectionKind};

/// Milestones a representation passes through on its way to a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntermediateLevel {
    Compiled,
    Linked,
    Resolved,
}

impl fmt::Display for IntermediateLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Compiled => write!(f, "compiled"),
            Self::Linked => write!(f, "linked"),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}

/// The whole build's in-memory representation.
///
/// Passes mutate it in place and must not run concurrently on the same
/// instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intermediate {
    pub id: SmolStr,
    pub sections: Vec<Section>,

    /// Localization bundles embedded by the linker.
    pub localizations: Vec<Localization>,

    levels: SmallVec<[IntermediateLevel; 3]>,
}

impl Intermediate {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self {
            id: id.into(),
            sections: Vec::new(),
            localizations: Vec::new(),
            levels: SmallVec::new(),
        }
    }

    /// Records that the representation reached `level`. Idempotent.
    pub fn update_level(&mut self, level: IntermediateLevel) {
        if !self.has_level(level) {
            self.levels.push(level);
        }
    }

    pub fn has_level(&self, level: IntermediateLevel) -> bool {
        self.levels.contains(&level)
    }

    pub fn levels(&self) -> &[IntermediateLevel] {
        &self.levels
    }

    pub fn has_section_kind(&self, kind: SectionKind) -> bool {
        self.sections.iter().any(|section| section.kind == kind)
    }
}
