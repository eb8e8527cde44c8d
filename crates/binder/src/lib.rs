pub mod config;
pub mod error;
pub mod extension;
pub mod facade;
pub mod field_resolver;
pub mod localization_filter;
pub mod localize_ui;
pub mod media_sequence;
pub mod resolver;
pub mod variable_resolver;

pub use config::ResolveConfig;
pub use error::{FieldLocation, Hook, ResolveError, SequenceError};
pub use extension::{ExtensionData, ExtensionError, Library, LibraryData, ResolverExtension};
pub use facade::FileFacade;
pub use field_resolver::{
    BindPath, DelayedField, ExpectedEmbeddedFile, FieldResolver, FilesWithEmbeddedFiles,
    ResolveFieldsRequest, ResolvedFields, VariableFieldResolver,
};
pub use localization_filter::LocalizationFilter;
pub use localize_ui::localize_ui;
pub use media_sequence::assign_sequences;
pub use resolver::{ResolveContext, ResolveResult, Resolver, CODEPAGE_UNSET};
pub use variable_resolver::{VariableResolution, VariableResolver, WixVariableResolver};
