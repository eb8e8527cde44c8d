use smol_str::SmolStr;

use crate::{
    symbol::{FileSymbol, MediaSymbol},
    Section, SectionKind, Symbol, SymbolId,
};

/// Incrementally builds a [`Section`], handing out the [`SymbolId`] of every
/// symbol it declares.
#[derive(Debug)]
pub struct SectionBuilder {
    section: Section,
}

impl SectionBuilder {
    pub fn new(id: impl Into<SmolStr>, kind: SectionKind) -> Self {
        Self {
            section: Section::new(id, kind),
        }
    }

    pub fn symbol(&mut self, symbol: impl Into<Symbol>) -> SymbolId {
        self.section.push(symbol)
    }

    pub fn media(&mut self, disk_id: i32) -> SymbolId {
        self.symbol(MediaSymbol::new(disk_id))
    }

    pub fn file(&mut self, id: &str, disk_id: i32) -> SymbolId {
        self.symbol(FileSymbol::new(id, disk_id))
    }

    pub fn patch_file(&mut self, id: &str, disk_id: i32, patch_group: i32) -> SymbolId {
        self.symbol(FileSymbol::new(id, disk_id).with_patch_group(patch_group))
    }

    pub fn module_file(&mut self, id: &str, disk_id: i32) -> SymbolId {
        self.symbol(FileSymbol::new(id, disk_id).from_module())
    }

    pub fn build(self) -> Section {
        self.section
    }
}
