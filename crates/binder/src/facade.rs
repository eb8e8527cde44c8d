use msibind_ir::{FileSymbol, Section, Symbol, SymbolId};

use crate::error::SequenceError;

/// A handle to one file symbol of a section, as laid out on media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileFacade {
    pub symbol: SymbolId,
}

impl FileFacade {
    pub fn new(symbol: SymbolId) -> Self {
        Self { symbol }
    }

    /// All files of `section` in declaration order.
    pub fn collect(section: &Section) -> Vec<Self> {
        section.files().map(|(id, _)| Self::new(id)).collect()
    }

    pub fn file<'s>(&self, section: &'s Section) -> Result<&'s FileSymbol, SequenceError> {
        section.file(self.symbol).ok_or_else(|| SequenceError::NotAFile {
            section: section.id.clone(),
            symbol: self.symbol,
        })
    }

    pub fn file_mut<'s>(
        &self,
        section: &'s mut Section,
    ) -> Result<&'s mut FileSymbol, SequenceError> {
        section
            .symbols
            .get_mut(self.symbol)
            .and_then(Symbol::as_file_mut)
            .ok_or_else(|| SequenceError::NotAFile {
                section: section.id.clone(),
                symbol: self.symbol,
            })
    }

    pub fn disk_id(&self, section: &Section) -> Option<i32> {
        section.file(self.symbol).map(|file| file.disk_id)
    }

    pub fn sequence(&self, section: &Section) -> Option<i32> {
        section.file(self.symbol).and_then(|file| file.sequence)
    }
}

#[cfg(test)]
mod tests {
    use msibind_ir::{builder::test_util::*, SectionKind};

    use super::*;

    #[test]
    fn collect_skips_non_file_symbols() {
        let mut section = test_section(SectionKind::Product);
        let media = section.media(1);
        let f1 = section.file("F1", 1);
        let f2 = section.file("F2", 2);
        let mut section = section.build();

        let facades = FileFacade::collect(&section);
        assert_eq!(facades, vec![FileFacade::new(f1), FileFacade::new(f2)]);
        assert_eq!(facades[1].disk_id(&section), Some(2));

        facades[0].file_mut(&mut section).unwrap().sequence = Some(4);
        assert_eq!(facades[0].sequence(&section), Some(4));

        let err = FileFacade::new(media).file(&section).unwrap_err();
        assert_eq!(
            err,
            SequenceError::NotAFile {
                section: "Product".into(),
                symbol: media,
            }
        );
    }
}
