//! Contracts for extensions participating in resolution.
use msibind_ir::Localization;
use smol_str::SmolStr;

use crate::resolver::{ResolveContext, ResolveResult};

pub type ExtensionError = Box<dyn std::error::Error + Send + Sync>;

/// Callbacks an extension receives around the resolution pass.
///
/// Hooks run synchronously in registration order.
pub trait ResolverExtension {
    fn name(&self) -> &str;

    /// Sees the context before resolution starts. The registered extensions
    /// are held by the resolver while hooks run, so `context.extensions` is
    /// always empty here.
    fn pre_resolve(&mut self, _context: &ResolveContext) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// Runs on every exit path of resolution. `result` is `None` when
    /// resolution failed before producing one.
    fn post_resolve(&mut self, _result: Option<&ResolveResult>) -> Result<(), ExtensionError> {
        Ok(())
    }
}

/// A library of symbols and localizations shipped by an extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    pub id: SmolStr,
    pub localizations: Vec<Localization>,
}

/// Data an extension contributes to the build.
pub trait ExtensionData {
    /// Culture used for this extension's localizations when the build does
    /// not request any culture.
    fn default_culture(&self) -> Option<&str> {
        None
    }

    fn library(&self) -> Option<&Library>;
}

/// [`ExtensionData`] backed by an already loaded library.
#[derive(Debug, Clone, Default)]
pub struct LibraryData {
    pub default_culture: Option<SmolStr>,
    pub library: Option<Library>,
}

impl LibraryData {
    pub fn new(library: Library) -> Self {
        Self {
            default_culture: None,
            library: Some(library),
        }
    }

    pub fn with_default_culture(mut self, culture: impl Into<SmolStr>) -> Self {
        self.default_culture = Some(culture.into());
        self
    }
}

impl ExtensionData for LibraryData {
    fn default_culture(&self) -> Option<&str> {
        self.default_culture.as_deref()
    }

    fn library(&self) -> Option<&Library> {
        self.library.as_ref()
    }
}
