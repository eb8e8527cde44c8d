//! Culture-specific override bundles.
use std::fmt;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::symbol::{integer_or_unset, SourceLineNumber};

/// A named value registered into the variable resolution context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindVariable {
    pub id: SmolStr,
    pub value: String,

    /// An overridable variable is a default: any later definition replaces it.
    pub overridable: bool,
    pub source: Option<SourceLineNumber>,
}

impl BindVariable {
    pub fn new(id: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            overridable: false,
            source: None,
        }
    }

    pub fn overridable(mut self) -> Self {
        self.overridable = true;
        self
    }

    pub fn at(mut self, source: SourceLineNumber) -> Self {
        self.source = Some(source);
        self
    }
}

/// Identifies the dialog, or a control on a dialog, a localized override
/// applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalizedControlKey {
    pub dialog: SmolStr,
    pub control: Option<SmolStr>,
}

impl LocalizedControlKey {
    pub fn dialog(dialog: impl Into<SmolStr>) -> Self {
        Self {
            dialog: dialog.into(),
            control: None,
        }
    }

    pub fn control(dialog: impl Into<SmolStr>, control: impl Into<SmolStr>) -> Self {
        Self {
            dialog: dialog.into(),
            control: Some(control.into()),
        }
    }
}

impl fmt::Display for LocalizedControlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.control {
            Some(control) => write!(f, "{}/{}", self.dialog, control),
            None => write!(f, "{}", self.dialog),
        }
    }
}

/// Geometry and text overrides for a dialog or control.
///
/// Geometry left as `None` keeps the authored value; flags can only be added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedControl {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub right_aligned: bool,
    pub right_to_left: bool,
    pub left_scroll: bool,
    pub text: String,
}

impl LocalizedControl {
    /// Builds an override from raw columns that use
    /// [`INTEGER_NOT_SET`](crate::INTEGER_NOT_SET) for unauthored geometry.
    pub fn from_raw_geometry(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x: integer_or_unset(x),
            y: integer_or_unset(y),
            width: integer_or_unset(width),
            height: integer_or_unset(height),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// One culture's override set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Localization {
    /// Culture tag such as `en-US`. Empty means language neutral.
    pub culture: SmolStr,
    pub codepage: Option<i32>,
    pub variables: Vec<BindVariable>,
    pub localized_controls: IndexMap<LocalizedControlKey, LocalizedControl>,
}

impl Localization {
    pub fn new(culture: impl Into<SmolStr>) -> Self {
        Self {
            culture: culture.into(),
            ..Self::default()
        }
    }

    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn with_codepage(mut self, codepage: i32) -> Self {
        self.codepage = Some(codepage);
        self
    }

    pub fn with_variable(mut self, variable: BindVariable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn with_control(mut self, key: LocalizedControlKey, control: LocalizedControl) -> Self {
        self.localized_controls.insert(key, control);
        self
    }

    pub fn is_neutral(&self) -> bool {
        self.culture.is_empty()
    }

    /// Returns the second definition of the first variable id declared more
    /// than once in this bundle.
    pub fn first_duplicate_variable(&self) -> Option<&BindVariable> {
        let mut seen = FxHashSet::default();
        self.variables
            .iter()
            .find(|variable| !seen.insert(variable.id.as_str()))
    }
}
