use smol_str::SmolStr;

use crate::{localization::Localization, Intermediate, IntermediateLevel, Section};

#[derive(Debug)]
pub struct IntermediateBuilder {
    intermediate: Intermediate,
}

impl IntermediateBuilder {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self {
            intermediate: Intermediate::new(id),
        }
    }

    pub fn section(mut self, section: Section) -> Self {
        self.intermediate.sections.push(section);
        self
    }

    pub fn localization(mut self, localization: Localization) -> Self {
        self.intermediate.localizations.push(localization);
        self
    }

    pub fn level(mut self, level: IntermediateLevel) -> Self {
        self.intermediate.update_level(level);
        self
    }

    pub fn build(self) -> Intermediate {
        self.intermediate
    }
}
