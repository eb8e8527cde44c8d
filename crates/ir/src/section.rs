use std::{fmt, str::FromStr};

use cranelift_entity::PrimaryMap;
use smol_str::SmolStr;

use crate::symbol::{
    ControlSymbol, DialogSymbol, FileSymbol, MediaSymbol, Symbol, SymbolId, WixVariableSymbol,
};

/// The kind of package a section compiles into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// A merge module. Single media by construction.
    Module,

    /// A complete product package.
    Product,

    /// A patch applied on top of an existing product.
    Patch,
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Module => write!(f, "module"),
            Self::Product => write!(f, "product"),
            Self::Patch => write!(f, "patch"),
        }
    }
}

impl FromStr for SectionKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "module" => Ok(Self::Module),
            "product" => Ok(Self::Product),
            "patch" => Ok(Self::Patch),
            _ => Err(()),
        }
    }
}

/// One compiled unit, owning its symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: SmolStr,
    pub kind: SectionKind,

    /// Holds all symbols in declaration order. A [`SymbolId`] stays valid for
    /// the lifetime of the section.
    pub symbols: PrimaryMap<SymbolId, Symbol>,
}

impl Section {
    pub fn new(id: impl Into<SmolStr>, kind: SectionKind) -> Self {
        Self {
            id: id.into(),
            kind,
            symbols: PrimaryMap::new(),
        }
    }

    pub fn push(&mut self, symbol: impl Into<Symbol>) -> SymbolId {
        self.symbols.push(symbol.into())
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    pub fn file(&self, id: SymbolId) -> Option<&FileSymbol> {
        self.symbols.get(id).and_then(Symbol::as_file)
    }

    pub fn file_mut(&mut self, id: SymbolId) -> Option<&mut FileSymbol> {
        self.symbols.get_mut(id).and_then(Symbol::as_file_mut)
    }

    pub fn media_mut(&mut self, id: SymbolId) -> Option<&mut MediaSymbol> {
        self.symbols.get_mut(id).and_then(Symbol::as_media_mut)
    }

    pub fn media(&self) -> impl Iterator<Item = (SymbolId, &MediaSymbol)> {
        self.symbols
            .iter()
            .filter_map(|(id, symbol)| symbol.as_media().map(|media| (id, media)))
    }

    pub fn files(&self) -> impl Iterator<Item = (SymbolId, &FileSymbol)> {
        self.symbols
            .iter()
            .filter_map(|(id, symbol)| symbol.as_file().map(|file| (id, file)))
    }

    pub fn wix_variables(&self) -> impl Iterator<Item = &WixVariableSymbol> {
        self.symbols.values().filter_map(Symbol::as_wix_variable)
    }

    pub fn dialogs_mut(&mut self) -> impl Iterator<Item = &mut DialogSymbol> {
        self.symbols.values_mut().filter_map(Symbol::as_dialog_mut)
    }

    pub fn controls_mut(&mut self) -> impl Iterator<Item = &mut ControlSymbol> {
        self.symbols.values_mut().filter_map(Symbol::as_control_mut)
    }

    /// Returns the media declared for `disk_id`, if any.
    pub fn media_for_disk(&self, disk_id: i32) -> Option<(SymbolId, &MediaSymbol)> {
        self.media().find(|(_, media)| media.disk_id == disk_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::PropertySymbol;

    #[test]
    fn typed_iteration_keeps_declaration_order() {
        let mut section = Section::new("Product", SectionKind::Product);
        let media = section.push(MediaSymbol::new(1));
        let f1 = section.push(FileSymbol::new("F1", 1));
        section.push(PropertySymbol::new("ProductName", "Sample"));
        let f2 = section.push(FileSymbol::new("F2", 1));

        let files: Vec<_> = section.files().map(|(id, _)| id).collect();
        assert_eq!(files, vec![f1, f2]);
        assert_eq!(section.media_for_disk(1).map(|(id, _)| id), Some(media));
        assert!(section.media_for_disk(2).is_none());
        assert!(section.file(media).is_none());
    }

    #[test]
    fn section_kind_round_trips_through_text() {
        for kind in [SectionKind::Module, SectionKind::Product, SectionKind::Patch] {
            assert_eq!(kind.to_string().parse::<SectionKind>(), Ok(kind));
        }
        assert!("bundle".parse::<SectionKind>().is_err());
    }
}
