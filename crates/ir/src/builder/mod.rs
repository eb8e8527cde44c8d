mod intermediate_builder;
mod section_builder;

pub use intermediate_builder::IntermediateBuilder;
pub use section_builder::SectionBuilder;

pub mod test_util {
    use super::*;

    use crate::{
        ir_writer::SectionWriter, localization::Localization, Intermediate, IntermediateLevel,
        Section, SectionKind,
    };

    pub fn test_section(kind: SectionKind) -> SectionBuilder {
        let id = match kind {
            SectionKind::Module => "Module",
            SectionKind::Product => "Product",
            SectionKind::Patch => "Patch",
        };
        SectionBuilder::new(id, kind)
    }

    /// A linked representation holding `sections`, ready to be resolved.
    pub fn test_intermediate(sections: Vec<Section>) -> Intermediate {
        let mut builder = IntermediateBuilder::new("test").level(IntermediateLevel::Linked);
        for section in sections {
            builder = builder.section(section);
        }
        builder.build()
    }

    pub fn test_intermediate_with_localizations(
        sections: Vec<Section>,
        localizations: Vec<Localization>,
    ) -> Intermediate {
        let mut ir = test_intermediate(sections);
        ir.localizations = localizations;
        ir
    }

    pub fn dump_section(section: &Section) -> String {
        SectionWriter::new(section).dump_string()
    }
}
