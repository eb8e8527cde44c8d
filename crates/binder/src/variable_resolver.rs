//! The variable/localization resolution context.
//!
//! References use the `!(namespace.Id)` syntax:
//!
//! - `!(loc.Id)` resolves against registered localization variables.
//! - `!(wix.Id)` resolves against registered wix variables.
//! - `!(loc.Id=Default)` and `!(wix.Id=Default)` fall back to `Default`.
//! - `!(bind.…)` can only be resolved at bind time and is reported as delayed.
//! - `!!(` is an escaped, literal `!(`.
//!
//! Any other namespace is left untouched for later passes.
use std::collections::hash_map::Entry;

use msibind_ir::{
    BindVariable, Localization, LocalizedControl, LocalizedControlKey, SourceLineNumber,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::error::ResolveError;

pub trait VariableResolver {
    /// Registers the variables and localized controls of a bundle. Later
    /// registrations win over earlier ones.
    fn add_localization(&mut self, localization: &Localization) -> Result<(), ResolveError>;

    fn add_variable(
        &mut self,
        source: Option<&SourceLineNumber>,
        id: &str,
        value: &str,
        overridable: bool,
    );

    fn try_get_localized_control(
        &self,
        dialog: &str,
        control: Option<&str>,
    ) -> Option<&LocalizedControl>;

    fn resolve_variables(&self, value: &str) -> VariableResolution;
}

/// Outcome of substituting the references in one value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableResolution {
    pub value: String,

    /// `value` differs from the input.
    pub updated: bool,

    /// `bind.*` references left in place for a later phase.
    pub delayed: SmallVec<[SmolStr; 1]>,

    /// `loc.*`/`wix.*` references that have no definition and no default.
    pub unresolved: SmallVec<[SmolStr; 1]>,
}

#[derive(Debug, Default)]
pub struct WixVariableResolver {
    loc_variables: FxHashMap<SmolStr, BindVariable>,
    wix_variables: FxHashMap<SmolStr, BindVariable>,
    localized_controls: FxHashMap<LocalizedControlKey, LocalizedControl>,
}

enum Lookup<'a> {
    Value(&'a str),
    Delayed,
    Unresolved,
    Foreign,
}

impl WixVariableResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loc_variable(&self, id: &str) -> Option<&BindVariable> {
        self.loc_variables.get(id)
    }

    pub fn wix_variable(&self, id: &str) -> Option<&BindVariable> {
        self.wix_variables.get(id)
    }

    pub fn variable_count(&self) -> usize {
        self.loc_variables.len() + self.wix_variables.len()
    }

    fn lookup<'a>(&'a self, reference: &'a str) -> Lookup<'a> {
        let Some((namespace, name)) = reference.split_once('.') else {
            return Lookup::Foreign;
        };
        let (name, default) = match name.split_once('=') {
            Some((name, default)) => (name, Some(default)),
            None => (name, None),
        };

        let variables = match namespace {
            "loc" => &self.loc_variables,
            "wix" => &self.wix_variables,
            "bind" => return Lookup::Delayed,
            _ => return Lookup::Foreign,
        };

        match (variables.get(name), default) {
            (Some(variable), _) => Lookup::Value(&variable.value),
            (None, Some(default)) => Lookup::Value(default),
            (None, None) => Lookup::Unresolved,
        }
    }
}

impl VariableResolver for WixVariableResolver {
    fn add_localization(&mut self, localization: &Localization) -> Result<(), ResolveError> {
        if let Some(duplicate) = localization.first_duplicate_variable() {
            return Err(ResolveError::DuplicateLocalization {
                culture: localization.culture.clone(),
                id: duplicate.id.clone(),
                line: duplicate.source.clone(),
            });
        }

        for variable in &localization.variables {
            register(&mut self.loc_variables, variable.clone());
        }

        for (key, control) in &localization.localized_controls {
            self.localized_controls.insert(key.clone(), control.clone());
        }

        Ok(())
    }

    fn add_variable(
        &mut self,
        source: Option<&SourceLineNumber>,
        id: &str,
        value: &str,
        overridable: bool,
    ) {
        let variable = BindVariable {
            id: id.into(),
            value: value.to_string(),
            overridable,
            source: source.cloned(),
        };
        register(&mut self.wix_variables, variable);
    }

    fn try_get_localized_control(
        &self,
        dialog: &str,
        control: Option<&str>,
    ) -> Option<&LocalizedControl> {
        let key = LocalizedControlKey {
            dialog: dialog.into(),
            control: control.map(SmolStr::from),
        };
        self.localized_controls.get(&key)
    }

    fn resolve_variables(&self, value: &str) -> VariableResolution {
        let mut resolution = VariableResolution::default();
        let mut resolved = String::with_capacity(value.len());
        let mut rest = value;

        while let Some(start) = rest.find("!(") {
            if start > 0 && rest.as_bytes()[start - 1] == b'!' {
                resolved.push_str(&rest[..start - 1]);
                resolved.push_str("!(");
                rest = &rest[start + 2..];
                resolution.updated = true;
                continue;
            }

            resolved.push_str(&rest[..start]);
            let body = &rest[start + 2..];
            let Some(end) = body.find(')') else {
                // Unterminated reference, keep it verbatim.
                resolved.push_str(&rest[start..]);
                rest = "";
                break;
            };

            let reference = &body[..end];
            let literal = &rest[start..start + end + 3];
            match self.lookup(reference) {
                Lookup::Value(substitute) => {
                    resolved.push_str(substitute);
                    resolution.updated = true;
                }
                Lookup::Delayed => {
                    resolved.push_str(literal);
                    resolution.delayed.push(reference.into());
                }
                Lookup::Unresolved => {
                    resolved.push_str(literal);
                    resolution.unresolved.push(reference.into());
                }
                Lookup::Foreign => resolved.push_str(literal),
            }
            rest = &body[end + 1..];
        }

        resolved.push_str(rest);
        resolution.value = resolved;
        resolution
    }
}

fn register(variables: &mut FxHashMap<SmolStr, BindVariable>, variable: BindVariable) {
    match variables.entry(variable.id.clone()) {
        Entry::Vacant(entry) => {
            entry.insert(variable);
        }
        Entry::Occupied(mut entry) => {
            let existing = entry.get();
            if existing.overridable {
                entry.insert(variable);
            } else if variable.overridable {
                tracing::trace!(id = %variable.id, "overridable default ignored, variable already defined");
            } else {
                tracing::warn!(
                    id = %variable.id,
                    previous = ?existing.source,
                    redefined = ?variable.source,
                    "variable defined more than once, last definition wins"
                );
                entry.insert(variable);
            }
        }
    }
}
