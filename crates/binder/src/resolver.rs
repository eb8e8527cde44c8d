//! The resolution pass: fills the variable resolver from the selected
//! localizations and the representation, localizes the UI, resolves fields and
//! marks the representation `Resolved`.
use std::{mem, path::PathBuf};

use msibind_ir::{Intermediate, IntermediateLevel, Localization, SectionKind};
use smol_str::SmolStr;

use crate::{
    config::ResolveConfig,
    error::{Hook, ResolveError},
    extension::{ExtensionData, ResolverExtension},
    field_resolver::{
        BindPath, DelayedField, ExpectedEmbeddedFile, FieldResolver, ResolveFieldsRequest,
        VariableFieldResolver,
    },
    localization_filter::LocalizationFilter,
    localize_ui::localize_ui,
    variable_resolver::{VariableResolver, WixVariableResolver},
};

/// Code page reported when no selected localization declares one.
pub const CODEPAGE_UNSET: i32 = -1;

/// Inputs of one resolution run.
pub struct ResolveContext {
    pub bind_paths: Vec<BindPath>,
    pub intermediate_folder: PathBuf,
    pub intermediate: Intermediate,

    /// Localizations passed directly to the build.
    pub localizations: Vec<Localization>,
    pub filter_cultures: Vec<SmolStr>,

    /// Hooks run in this order.
    pub extensions: Vec<Box<dyn ResolverExtension>>,
    pub extension_data: Vec<Box<dyn ExtensionData>>,
    pub config: ResolveConfig,
}

impl ResolveContext {
    pub fn new(intermediate: Intermediate) -> Self {
        Self {
            bind_paths: Vec::new(),
            intermediate_folder: PathBuf::new(),
            intermediate,
            localizations: Vec::new(),
            filter_cultures: Vec::new(),
            extensions: Vec::new(),
            extension_data: Vec::new(),
            config: ResolveConfig::default(),
        }
    }

    pub fn with_bind_path(mut self, bind_path: BindPath) -> Self {
        self.bind_paths.push(bind_path);
        self
    }

    pub fn with_intermediate_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.intermediate_folder = folder.into();
        self
    }

    pub fn with_localization(mut self, localization: Localization) -> Self {
        self.localizations.push(localization);
        self
    }

    pub fn with_filter_culture(mut self, culture: impl Into<SmolStr>) -> Self {
        self.filter_cultures.push(culture.into());
        self
    }

    pub fn with_extension(mut self, extension: impl ResolverExtension + 'static) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    pub fn with_extension_data(mut self, data: impl ExtensionData + 'static) -> Self {
        self.extension_data.push(Box::new(data));
        self
    }

    pub fn with_config(mut self, config: ResolveConfig) -> Self {
        self.config = config;
        self
    }
}

#[derive(Debug)]
pub struct ResolveResult {
    /// Code page of the first selected localization, or [`CODEPAGE_UNSET`].
    pub codepage: i32,
    pub expected_embedded_files: Vec<ExpectedEmbeddedFile>,
    pub delayed_fields: Vec<DelayedField>,
    pub intermediate: Intermediate,
}

/// Runs the resolution pass for one build.
///
/// Variables registered by a run stay in the variable resolver, so a resolver
/// must not be reused across builds.
#[derive(Debug, Default)]
pub struct Resolver<V = WixVariableResolver, F = VariableFieldResolver> {
    variable_resolver: V,
    field_resolver: F,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<V, F> Resolver<V, F>
where
    V: VariableResolver,
    F: FieldResolver,
{
    pub fn with_collaborators(variable_resolver: V, field_resolver: F) -> Self {
        Self {
            variable_resolver,
            field_resolver,
        }
    }

    pub fn variable_resolver(&self) -> &V {
        &self.variable_resolver
    }

    /// Resolves `context.intermediate`.
    ///
    /// Every extension's `post_resolve` runs once the pre-resolve hooks have
    /// started, whatever the outcome. The first failure, of resolution or of a
    /// hook, is reported; later post-resolve failures are attached to it as
    /// [`ResolveError::PostResolveFailed`].
    #[tracing::instrument(level = "debug", skip_all, fields(intermediate = %context.intermediate.id))]
    pub fn resolve(&mut self, mut context: ResolveContext) -> Result<ResolveResult, ResolveError> {
        let mut extensions = mem::take(&mut context.extensions);

        let result =
            pre_resolve(&mut extensions, &context).and_then(|()| self.do_resolve(context));
        let mut hook_errors = post_resolve(&mut extensions, result.as_ref().ok());

        let cause = match result {
            Ok(result) if hook_errors.is_empty() => return Ok(result),
            Ok(_) => hook_errors.remove(0),
            Err(err) => err,
        };
        if hook_errors.is_empty() {
            Err(cause)
        } else {
            tracing::debug!(failed_hooks = hook_errors.len(), "post-resolve hooks failed");
            Err(ResolveError::PostResolveFailed {
                cause: Box::new(cause),
                hook_errors,
            })
        }
    }

    fn do_resolve(&mut self, context: ResolveContext) -> Result<ResolveResult, ResolveError> {
        let ResolveContext {
            bind_paths,
            intermediate_folder,
            mut intermediate,
            localizations,
            filter_cultures,
            extension_data,
            config,
            ..
        } = context;

        let filter = LocalizationFilter {
            filter_cultures: &filter_cultures,
            localizations: &localizations,
            embedded: &intermediate.localizations,
            extension_data: &extension_data,
        };
        let codepage = self.populate_variable_resolver(&filter, &intermediate)?;

        let localized = localize_ui(&mut intermediate, &self.variable_resolver);
        tracing::debug!(localized, "localized UI");

        let building_patch = intermediate.has_section_kind(SectionKind::Patch);
        tracing::debug!(building_patch, "resolving fields");

        let resolved = self.field_resolver.resolve_fields(ResolveFieldsRequest {
            intermediate: &mut intermediate,
            variable_resolver: &self.variable_resolver,
            bind_paths: &bind_paths,
            intermediate_folder: &intermediate_folder,
            building_patch,
            support_delayed_resolution: config.support_delayed_resolution,
            allow_unresolved_variables: config.allow_unresolved_variables,
        })?;

        intermediate.update_level(IntermediateLevel::Resolved);

        Ok(ResolveResult {
            codepage,
            expected_embedded_files: resolved.files_with_embedded_files.expected_embedded_files(),
            delayed_fields: resolved.delayed_fields,
            intermediate,
        })
    }

    /// Registers the selected localizations, then every wix variable of the
    /// representation, and returns the resolved code page.
    fn populate_variable_resolver(
        &mut self,
        filter: &LocalizationFilter<'_>,
        intermediate: &Intermediate,
    ) -> Result<i32, ResolveError> {
        let localizations = filter.apply();
        let codepage = localizations
            .first()
            .and_then(|localization| localization.codepage)
            .unwrap_or(CODEPAGE_UNSET);

        for localization in &localizations {
            self.variable_resolver.add_localization(localization)?;
        }

        let mut variables = 0;
        for variable in intermediate
            .sections
            .iter()
            .flat_map(|section| section.wix_variables())
        {
            self.variable_resolver.add_variable(
                variable.source.as_ref(),
                &variable.id,
                &variable.value,
                variable.overridable,
            );
            variables += 1;
        }

        tracing::debug!(
            localizations = localizations.len(),
            variables,
            codepage,
            "populated variable resolver"
        );
        Ok(codepage)
    }
}

fn pre_resolve(
    extensions: &mut [Box<dyn ResolverExtension>],
    context: &ResolveContext,
) -> Result<(), ResolveError> {
    for extension in extensions {
        extension
            .pre_resolve(context)
            .map_err(|source| ResolveError::Extension {
                extension: extension.name().into(),
                hook: Hook::PreResolve,
                source,
            })?;
    }
    Ok(())
}

/// Runs every post-resolve hook and collects their failures in hook order.
fn post_resolve(
    extensions: &mut [Box<dyn ResolverExtension>],
    result: Option<&ResolveResult>,
) -> Vec<ResolveError> {
    extensions
        .iter_mut()
        .filter_map(|extension| {
            let source = extension.post_resolve(result).err()?;
            Some(ResolveError::Extension {
                extension: extension.name().into(),
                hook: Hook::PostResolve,
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use msibind_ir::{
        builder::test_util::*, BindVariable, PropertySymbol, WixVariableSymbol,
    };

    use super::*;
    use crate::extension::ExtensionError;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
        fail_pre: bool,
        fail_post: bool,
    }

    impl Recorder {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: log.clone(),
                fail_pre: false,
                fail_post: false,
            }
        }
    }

    impl ResolverExtension for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn pre_resolve(&mut self, _context: &ResolveContext) -> Result<(), ExtensionError> {
            self.log.borrow_mut().push(format!("pre {}", self.name));
            if self.fail_pre {
                return Err("pre failed".into());
            }
            Ok(())
        }

        fn post_resolve(&mut self, result: Option<&ResolveResult>) -> Result<(), ExtensionError> {
            let outcome = if result.is_some() { "ok" } else { "none" };
            self.log
                .borrow_mut()
                .push(format!("post {} {outcome}", self.name));
            if self.fail_post {
                return Err("post failed".into());
            }
            Ok(())
        }
    }

    fn product_with_property(value: &str) -> Intermediate {
        let mut section = test_section(SectionKind::Product);
        section.symbol(PropertySymbol::new("P", value));
        test_intermediate(vec![section.build()])
    }

    #[test]
    fn hooks_run_in_registration_order() {
        let log = Log::default();
        let context = ResolveContext::new(product_with_property("plain"))
            .with_extension(Recorder::new("a", &log))
            .with_extension(Recorder::new("b", &log));

        let result = Resolver::new().resolve(context).unwrap();

        assert!(result.intermediate.has_level(IntermediateLevel::Resolved));
        assert_eq!(
            *log.borrow(),
            ["pre a", "pre b", "post a ok", "post b ok"]
        );
    }

    #[test]
    fn post_hooks_run_when_resolution_fails() {
        let log = Log::default();
        let context = ResolveContext::new(product_with_property("!(loc.Missing)"))
            .with_extension(Recorder::new("a", &log))
            .with_extension(Recorder {
                fail_post: true,
                ..Recorder::new("b", &log)
            });

        let err = Resolver::new().resolve(context).unwrap_err();

        assert_eq!(*log.borrow(), ["pre a", "pre b", "post a none", "post b none"]);
        let ResolveError::PostResolveFailed { cause, hook_errors } = &err else {
            panic!("unexpected error: {err}");
        };
        assert!(matches!(**cause, ResolveError::UnresolvedVariable { .. }));
        assert_eq!(hook_errors.len(), 1);
        assert!(matches!(
            hook_errors[0],
            ResolveError::Extension { ref extension, hook: Hook::PostResolve, .. } if extension == "b"
        ));
        assert_eq!(
            err.to_string(),
            "unresolved variable `loc.Missing` in @Product.sym0.Value; \
             post-resolve hooks also failed: extension `b` failed in post-resolve: post failed"
        );
    }

    #[test]
    fn failed_pre_hook_stops_resolution_but_not_post_hooks() {
        let log = Log::default();
        let context = ResolveContext::new(product_with_property("plain"))
            .with_extension(Recorder {
                fail_pre: true,
                ..Recorder::new("a", &log)
            })
            .with_extension(Recorder::new("b", &log));

        let err = Resolver::new().resolve(context).unwrap_err();

        assert_eq!(err.to_string(), "extension `a` failed in pre-resolve: pre failed");
        assert_eq!(*log.borrow(), ["pre a", "post a none", "post b none"]);
    }

    #[test]
    fn every_post_hook_failure_is_reported() {
        let log = Log::default();
        let context = ResolveContext::new(product_with_property("plain"))
            .with_extension(Recorder {
                fail_post: true,
                ..Recorder::new("a", &log)
            })
            .with_extension(Recorder {
                fail_post: true,
                ..Recorder::new("b", &log)
            });

        let err = Resolver::new().resolve(context).unwrap_err();

        assert_eq!(*log.borrow(), ["pre a", "pre b", "post a ok", "post b ok"]);
        let ResolveError::PostResolveFailed { cause, hook_errors } = &err else {
            panic!("unexpected error: {err}");
        };
        assert!(matches!(
            **cause,
            ResolveError::Extension { ref extension, hook: Hook::PostResolve, .. } if extension == "a"
        ));
        assert!(matches!(
            hook_errors.as_slice(),
            [ResolveError::Extension { extension, .. }] if extension == "b"
        ));
    }

    #[test]
    fn pre_hooks_see_the_rest_of_the_context() {
        struct Inspector(Log);

        impl ResolverExtension for Inspector {
            fn name(&self) -> &str {
                "inspector"
            }

            fn pre_resolve(&mut self, context: &ResolveContext) -> Result<(), ExtensionError> {
                self.0.borrow_mut().push(format!(
                    "extensions={} localizations={} cultures={:?}",
                    context.extensions.len(),
                    context.localizations.len(),
                    context.filter_cultures,
                ));
                Ok(())
            }
        }

        let log = Log::default();
        let context = ResolveContext::new(product_with_property("plain"))
            .with_localization(Localization::new("en-US"))
            .with_filter_culture("en-US")
            .with_extension(Inspector(log.clone()));

        Resolver::new().resolve(context).unwrap();
        assert_eq!(
            *log.borrow(),
            [r#"extensions=0 localizations=1 cultures=["en-US"]"#]
        );
    }

    #[test]
    fn codepage_comes_from_first_selected_localization() {
        let context = ResolveContext::new(product_with_property("plain"))
            .with_localization(Localization::new("en-US"))
            .with_localization(Localization::new("de-DE").with_codepage(1252))
            .with_filter_culture("de-DE");
        let result = Resolver::new().resolve(context).unwrap();
        assert_eq!(result.codepage, 1252);

        let context = ResolveContext::new(product_with_property("plain"))
            .with_localization(Localization::new("en-US"))
            .with_localization(Localization::new("de-DE").with_codepage(1252));
        let result = Resolver::new().resolve(context).unwrap();
        assert_eq!(result.codepage, CODEPAGE_UNSET);
    }

    #[test]
    fn wix_variables_register_after_localizations() {
        let mut section = test_section(SectionKind::Product);
        section.symbol(WixVariableSymbol::new("Brand", "Fabrikam"));
        section.symbol(WixVariableSymbol::new("Banner", "default.bmp").overridable());
        let property = section.symbol(PropertySymbol::new("P", "!(wix.Brand) !(loc.Greeting)"));
        let ir = test_intermediate(vec![section.build()]);

        let context = ResolveContext::new(ir).with_localization(
            Localization::new("en-US").with_variable(BindVariable::new("Greeting", "Hello")),
        );
        let mut resolver = Resolver::new();
        let result = resolver.resolve(context).unwrap();

        let value = &result.intermediate.sections[0].symbols[property]
            .as_property()
            .unwrap()
            .value;
        assert_eq!(value, "Fabrikam Hello");
        assert!(resolver.variable_resolver().wix_variable("Banner").unwrap().overridable);
    }

    #[test]
    fn patch_sections_are_resolved() {
        let mut section = test_section(SectionKind::Patch);
        section.symbol(PropertySymbol::new("P", "!(bind.Property.Version)"));
        let context = ResolveContext::new(test_intermediate(vec![section.build()]));

        let result = Resolver::new().resolve(context).unwrap();
        assert_eq!(result.delayed_fields.len(), 1);
        assert!(result.expected_embedded_files.is_empty());
    }
}
