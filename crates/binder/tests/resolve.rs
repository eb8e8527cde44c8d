mod common;

use std::fs;

use common::*;
use msibind_binder::{
    assign_sequences, BindPath, ExtensionData, FileFacade, Hook, Library, LibraryData,
    ResolveConfig, ResolveContext, ResolveError, Resolver, CODEPAGE_UNSET,
};
use msibind_ir::{
    builder::test_util::*, ir_writer::IntermediateWriter, BindVariable, ControlSymbol,
    DialogSymbol, Field, FileSymbol, Localization, LocalizedControl, LocalizedControlKey,
    MediaSymbol, PropertySymbol, SectionKind, SourceLineNumber, WixVariableSymbol,
    INTEGER_NOT_SET,
};

fn french() -> Localization {
    Localization::new("fr-FR")
        .with_codepage(1252)
        .with_variable(BindVariable::new("WelcomeTitle", "Bienvenue"))
        .with_variable(BindVariable::new("Next", "&Suivant"))
        .with_control(
            LocalizedControlKey::dialog("Welcome"),
            LocalizedControl::from_raw_geometry(INTEGER_NOT_SET, INTEGER_NOT_SET, 400, INTEGER_NOT_SET),
        )
        .with_control(
            LocalizedControlKey::control("Welcome", "Next"),
            LocalizedControl {
                right_aligned: true,
                ..LocalizedControl::default()
            },
        )
}

fn english() -> Localization {
    Localization::new("en-US")
        .with_codepage(1200)
        .with_variable(BindVariable::new("WelcomeTitle", "Welcome"))
        .with_variable(BindVariable::new("Next", "&Next"))
}

#[test]
fn resolve_then_sequence_product() {
    init_tracing();

    let mut builder = test_section(SectionKind::Product);
    builder.symbol(MediaSymbol::new(1).with_cabinet("!(wix.CabName)"));
    builder.media(2);
    builder.symbol(FileSymbol::new("App", 1).with_source("bin/app.exe"));
    builder.symbol(FileSymbol::new("Help", 2).with_source("help.wixlib#1"));
    builder.patch_file("Patch", 1, 1);
    builder.symbol(DialogSymbol::new("Welcome", 370, 270).with_title("!(loc.WelcomeTitle)"));
    builder.symbol(
        ControlSymbol::new("Welcome", "Next", "PushButton")
            .with_geometry(236, 243, 56, 17)
            .with_text("!(loc.Next)"),
    );
    builder.symbol(WixVariableSymbol::new("CabName", "product.cab"));
    let version =
        builder.symbol(PropertySymbol::new("ProductVersion", "!(bind.FileVersion.App)"));
    let ir = test_intermediate(vec![builder.build()]);

    let context = ResolveContext::new(ir)
        .with_intermediate_folder("obj")
        .with_localization(english())
        .with_localization(french())
        .with_filter_culture("fr-FR");
    let mut result = Resolver::new().resolve(context).unwrap();

    assert_eq!(result.codepage, 1252);
    assert_eq!(result.delayed_fields.len(), 1);
    assert_eq!(result.delayed_fields[0].location.symbol, version);
    assert_eq!(result.delayed_fields[0].location.field, Field::PropertyValue);
    assert_eq!(result.expected_embedded_files.len(), 1);
    assert_eq!(result.expected_embedded_files[0].container, "help.wixlib");
    assert_eq!(result.expected_embedded_files[0].index, 1);

    let section = &mut result.intermediate.sections[0];
    let files = FileFacade::collect(section);
    assign_sequences(section, &files).unwrap();

    insta::assert_snapshot!(IntermediateWriter::new(&result.intermediate).dump_string(), @r###"
    intermediate @test levels=[linked, resolved]
    section @Product product
        sym0 = media 1 last_sequence=3 cabinet="product.cab"
        sym1 = media 2 last_sequence=2
        sym2 = file App disk=1 sequence=1 source="bin/app.exe"
        sym3 = file Help disk=2 sequence=2 source="obj/embedded/0/1"
        sym4 = file Patch disk=1 sequence=3 patch_group=1
        sym5 = dialog Welcome 50,50 400x270 title="Bienvenue"
        sym6 = control Welcome/Next 236,243 56x17 right_aligned text="&Suivant"
        sym7 = wix_variable CabName = "product.cab"
        sym8 = property ProductVersion = "!(bind.FileVersion.App)"
    "###);
}

#[test]
fn neutral_localization_wins_without_filter() {
    init_tracing();

    let mut builder = test_section(SectionKind::Product);
    let title = builder.symbol(PropertySymbol::new("Title", "!(loc.Title)"));
    let ir = test_intermediate_with_localizations(
        vec![builder.build()],
        vec![Localization::new("de-DE").with_variable(BindVariable::new("Title", "Titel"))],
    );

    let context = ResolveContext::new(ir)
        .with_localization(Localization::new("en-US").with_variable(BindVariable::new("Title", "Title")))
        .with_localization(Localization::neutral().with_variable(BindVariable::new("Title", "Neutral")));
    let result = Resolver::new().resolve(context).unwrap();

    let value = &result.intermediate.sections[0].symbols[title]
        .as_property()
        .unwrap()
        .value;
    assert_eq!(value, "Neutral");
    assert_eq!(result.codepage, CODEPAGE_UNSET);
}

#[test]
fn extension_library_default_culture() {
    init_tracing();

    let mut builder = test_section(SectionKind::Product);
    let text = builder.symbol(PropertySymbol::new("Text", "!(loc.ExtText)"));
    let ir = test_intermediate(vec![builder.build()]);

    let library = Library {
        id: "ui".into(),
        localizations: vec![
            Localization::new("en-US").with_variable(BindVariable::new("ExtText", "Hello")),
            Localization::new("ja-JP").with_variable(BindVariable::new("ExtText", "Konnichiwa")),
        ],
    };
    let data = LibraryData::new(library).with_default_culture("en-US");
    assert_eq!(data.default_culture(), Some("en-US"));

    let result = Resolver::new()
        .resolve(ResolveContext::new(ir).with_extension_data(data))
        .unwrap();

    let value = &result.intermediate.sections[0].symbols[text]
        .as_property()
        .unwrap()
        .value;
    assert_eq!(value, "Hello");
}

#[test]
fn permissive_config_keeps_unresolved_references() {
    init_tracing();

    let mut builder = test_section(SectionKind::Product);
    let missing = builder.symbol(PropertySymbol::new("P", "!(loc.Missing)"));
    let ir = test_intermediate(vec![builder.build()]);

    let err = Resolver::new()
        .resolve(ResolveContext::new(ir.clone()))
        .unwrap_err();
    assert!(matches!(err, ResolveError::UnresolvedVariable { ref variable, .. } if variable == "loc.Missing"));

    let result = Resolver::new()
        .resolve(ResolveContext::new(ir).with_config(ResolveConfig::permissive()))
        .unwrap();
    let value = &result.intermediate.sections[0].symbols[missing]
        .as_property()
        .unwrap()
        .value;
    assert_eq!(value, "!(loc.Missing)");
}

#[test]
fn duplicate_localization_variable_is_reported() {
    init_tracing();

    let ir = test_intermediate(vec![test_section(SectionKind::Product).build()]);
    let localization = Localization::new("en-US")
        .with_variable(BindVariable::new("Title", "One"))
        .with_variable(BindVariable::new("Title", "Two").at(SourceLineNumber::new("en-us.wxl", 7)));

    let err = Resolver::new()
        .resolve(ResolveContext::new(ir).with_localization(localization))
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "localization `en-US` defines `Title` more than once at en-us.wxl(7)"
    );
}

#[test]
fn relative_sources_use_bind_paths() {
    init_tracing();

    let payloads = tempfile::tempdir().unwrap();
    fs::write(payloads.path().join("app.exe"), b"MZ").unwrap();

    let mut builder = test_section(SectionKind::Product);
    builder.media(1);
    let app = builder.symbol(FileSymbol::new("App", 1).with_source("app.exe"));
    let ir = test_intermediate(vec![builder.build()]);

    let result = Resolver::new()
        .resolve(ResolveContext::new(ir).with_bind_path(BindPath::new(payloads.path())))
        .unwrap();

    let source = &result.intermediate.sections[0].file(app).unwrap().source;
    assert_eq!(
        source.as_str(),
        payloads.path().join("app.exe").to_string_lossy()
    );
}

#[test]
fn patch_sources_skip_bind_paths() {
    init_tracing();

    let payloads = tempfile::tempdir().unwrap();
    fs::write(payloads.path().join("app.exe"), b"MZ").unwrap();

    let mut builder = test_section(SectionKind::Patch);
    builder.media(1);
    let app = builder.symbol(FileSymbol::new("App", 1).with_source("app.exe"));
    let ir = test_intermediate(vec![builder.build()]);

    let result = Resolver::new()
        .resolve(ResolveContext::new(ir).with_bind_path(BindPath::new(payloads.path())))
        .unwrap();

    let source = &result.intermediate.sections[0].file(app).unwrap().source;
    assert_eq!(source, "app.exe");
}

#[test]
fn extension_errors_name_the_hook() {
    use msibind_binder::{ExtensionError, ResolveResult, ResolverExtension};

    struct Failing;

    impl ResolverExtension for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn post_resolve(&mut self, _result: Option<&ResolveResult>) -> Result<(), ExtensionError> {
            Err("cannot publish".into())
        }
    }

    init_tracing();
    let ir = test_intermediate(vec![test_section(SectionKind::Product).build()]);

    let err = Resolver::new()
        .resolve(ResolveContext::new(ir).with_extension(Failing))
        .unwrap_err();

    assert!(matches!(err, ResolveError::Extension { hook: Hook::PostResolve, .. }));
    assert_eq!(
        err.to_string(),
        "extension `failing` failed in post-resolve: cannot publish"
    );
}

#[test]
fn post_hook_failure_survives_failed_resolution() {
    use msibind_binder::{ExtensionError, ResolveResult, ResolverExtension};

    struct Publisher;

    impl ResolverExtension for Publisher {
        fn name(&self) -> &str {
            "publisher"
        }

        fn post_resolve(&mut self, result: Option<&ResolveResult>) -> Result<(), ExtensionError> {
            assert!(result.is_none());
            Err("cannot publish".into())
        }
    }

    init_tracing();
    let mut builder = test_section(SectionKind::Product);
    builder.symbol(PropertySymbol::new("P", "!(loc.Missing)"));
    let ir = test_intermediate(vec![builder.build()]);

    let err = Resolver::new()
        .resolve(ResolveContext::new(ir).with_extension(Publisher))
        .unwrap_err();

    assert!(matches!(err, ResolveError::PostResolveFailed { .. }));
    assert_eq!(
        err.to_string(),
        "unresolved variable `loc.Missing` in @Product.sym0.Value; \
         post-resolve hooks also failed: extension `publisher` failed in post-resolve: cannot publish"
    );
    let cause = std::error::Error::source(&err).unwrap();
    assert_eq!(
        cause.to_string(),
        "unresolved variable `loc.Missing` in @Product.sym0.Value"
    );
}
