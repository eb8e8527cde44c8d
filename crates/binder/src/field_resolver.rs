//! Field-level variable substitution over a whole representation.
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use msibind_ir::{prelude::*, Field, Intermediate, SymbolId};
use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::{error::FieldLocation, variable_resolver::VariableResolver, ResolveError};

const BIND_PATH_PREFIX: &str = "!(bindpath.";

/// A directory searched for file payloads. Named bind paths are only used
/// through an explicit `!(bindpath.Name)` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindPath {
    pub name: Option<SmolStr>,
    pub path: PathBuf,
}

impl BindPath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            name: None,
            path: path.into(),
        }
    }

    pub fn named(name: impl Into<SmolStr>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: Some(name.into()),
            path: path.into(),
        }
    }
}

/// Everything one field-resolution run needs. Self-contained so the same
/// variable resolver can be applied to further representations.
pub struct ResolveFieldsRequest<'a> {
    pub intermediate: &'a mut Intermediate,
    pub variable_resolver: &'a dyn VariableResolver,
    pub bind_paths: &'a [BindPath],
    pub intermediate_folder: &'a Path,
    pub building_patch: bool,
    pub support_delayed_resolution: bool,
    pub allow_unresolved_variables: bool,
}

/// A field whose value still holds `!(bind.…)` references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayedField {
    pub location: FieldLocation,
    pub variables: SmallVec<[SmolStr; 1]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedEmbeddedFile {
    pub container: SmolStr,
    pub index: u32,
    pub extract_path: PathBuf,
}

/// Payloads to extract from containers (e.g. libraries) before binding,
/// keyed by container and then by the payload's index in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilesWithEmbeddedFiles {
    containers: IndexMap<SmolStr, IndexMap<u32, PathBuf>>,
}

impl FilesWithEmbeddedFiles {
    /// Records payload `index` of `container` and returns the path it will be
    /// extracted to. Requesting the same payload twice yields the same path.
    pub fn add_embedded_file_to_extract(
        &mut self,
        container: &str,
        index: u32,
        intermediate_folder: &Path,
    ) -> PathBuf {
        let entry = self.containers.entry(container.into());
        let container_folder = entry.index().to_string();
        entry
            .or_default()
            .entry(index)
            .or_insert_with(|| {
                intermediate_folder
                    .join("embedded")
                    .join(container_folder)
                    .join(index.to_string())
            })
            .clone()
    }

    pub fn expected_embedded_files(&self) -> Vec<ExpectedEmbeddedFile> {
        self.containers
            .iter()
            .flat_map(|(container, payloads)| {
                payloads
                    .iter()
                    .map(move |(&index, extract_path)| ExpectedEmbeddedFile {
                        container: container.clone(),
                        index,
                        extract_path: extract_path.clone(),
                    })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFields {
    pub delayed_fields: Vec<DelayedField>,
    pub files_with_embedded_files: FilesWithEmbeddedFiles,
}

pub trait FieldResolver {
    fn resolve_fields(
        &mut self,
        request: ResolveFieldsRequest<'_>,
    ) -> Result<ResolvedFields, ResolveError>;
}

/// Substitutes variables in every text field and resolves file sources
/// against bind paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct VariableFieldResolver;

impl FieldResolver for VariableFieldResolver {
    fn resolve_fields(
        &mut self,
        request: ResolveFieldsRequest<'_>,
    ) -> Result<ResolvedFields, ResolveError> {
        let ResolveFieldsRequest {
            intermediate,
            variable_resolver,
            bind_paths,
            intermediate_folder,
            building_patch,
            support_delayed_resolution,
            allow_unresolved_variables,
        } = request;

        let mut visitor = FieldVisitor {
            variables: variable_resolver,
            bind_paths,
            intermediate_folder,
            building_patch,
            support_delayed_resolution,
            allow_unresolved_variables,
            section_index: 0,
            section: SmolStr::default(),
            symbol: SymbolId::from_u32(0),
            resolved: ResolvedFields::default(),
            error: None,
        };

        for (section_index, section) in intermediate.sections.iter_mut().enumerate() {
            visitor.section_index = section_index;
            visitor.section = section.id.clone();
            for (symbol_id, symbol) in section.symbols.iter_mut() {
                visitor.symbol = symbol_id;
                symbol.accept_mut(&mut visitor);
                if let Some(err) = visitor.error.take() {
                    return Err(err);
                }
            }
        }

        tracing::debug!(
            delayed = visitor.resolved.delayed_fields.len(),
            embedded = visitor.resolved.files_with_embedded_files.containers.len(),
            "resolved fields"
        );
        Ok(visitor.resolved)
    }
}

struct FieldVisitor<'a> {
    variables: &'a dyn VariableResolver,
    bind_paths: &'a [BindPath],
    intermediate_folder: &'a Path,
    building_patch: bool,
    support_delayed_resolution: bool,
    allow_unresolved_variables: bool,

    section_index: usize,
    section: SmolStr,
    symbol: SymbolId,

    resolved: ResolvedFields,

    /// First failure; the walk stops at the end of the current symbol.
    error: Option<ResolveError>,
}

impl FieldVisitorMut for FieldVisitor<'_> {
    fn visit_field(&mut self, field: Field, value: &mut String) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.resolve_field(field, value) {
            self.error = Some(err);
        }
    }
}

impl FieldVisitor<'_> {
    fn location(&self, field: Field) -> FieldLocation {
        FieldLocation {
            section_index: self.section_index,
            section: self.section.clone(),
            symbol: self.symbol,
            field,
        }
    }

    fn resolve_field(&mut self, field: Field, value: &mut String) -> Result<(), ResolveError> {
        let resolution = self.variables.resolve_variables(value);

        if let Some(variable) = resolution.unresolved.first() {
            let location = self.location(field);
            if !self.allow_unresolved_variables {
                return Err(ResolveError::UnresolvedVariable {
                    variable: variable.clone(),
                    location,
                });
            }
            tracing::warn!(%location, %variable, "unresolved variable left in place");
        }

        if let Some(variable) = resolution.delayed.first() {
            let location = self.location(field);
            if !self.support_delayed_resolution {
                return Err(ResolveError::DelayedResolutionUnsupported {
                    variable: variable.clone(),
                    location,
                });
            }
            self.resolved.delayed_fields.push(DelayedField {
                location,
                variables: resolution.delayed.clone(),
            });
        }

        if resolution.updated {
            *value = resolution.value;
        }

        if field == Field::FileSource {
            self.resolve_file_source(field, value)?;
        }
        Ok(())
    }

    fn resolve_file_source(&mut self, field: Field, source: &mut String) -> Result<(), ResolveError> {
        if let Some((container, index)) = parse_embedded_source(source) {
            let extract_path = self.resolved.files_with_embedded_files.add_embedded_file_to_extract(
                container,
                index,
                self.intermediate_folder,
            );
            *source = extract_path.to_string_lossy().into_owned();
            return Ok(());
        }

        if let Some(rest) = source.strip_prefix(BIND_PATH_PREFIX) {
            let Some((name, relative)) = rest.split_once(')') else {
                return Ok(());
            };
            let Some(bind_path) = self
                .bind_paths
                .iter()
                .find(|bind_path| bind_path.name.as_deref() == Some(name))
            else {
                return Err(ResolveError::UnknownBindPath {
                    name: name.into(),
                    location: self.location(field),
                });
            };
            let relative = relative.trim_start_matches(['/', '\\']);
            *source = bind_path.path.join(relative).to_string_lossy().into_owned();
            return Ok(());
        }

        // Patch payloads are located against the target and updated images
        // when the patch is bound.
        if self.building_patch || source.is_empty() || Path::new(source.as_str()).is_absolute() {
            return Ok(());
        }

        let found = self
            .bind_paths
            .iter()
            .filter(|bind_path| bind_path.name.is_none())
            .map(|bind_path| bind_path.path.join(source.as_str()))
            .find(|candidate| candidate.exists());
        if let Some(found) = found {
            tracing::trace!(source = %source, found = %found.display(), "found file in bind path");
            *source = found.to_string_lossy().into_owned();
        }
        Ok(())
    }
}

/// Splits `<container>#<index>`.
fn parse_embedded_source(source: &str) -> Option<(&str, u32)> {
    let (container, index) = source.rsplit_once('#')?;
    if container.is_empty() {
        return None;
    }
    Some((container, index.parse().ok()?))
}
