//! Typed symbols owned by a [`Section`](crate::Section).
//!
//! Every record the upstream compiler produces is one variant of the closed
//! [`Symbol`] enum. Passes select the variants they care about with the
//! `as_*`/`as_*_mut` accessors instead of filtering on a runtime type.
use std::fmt;

use cranelift_entity::entity_impl;
use smol_str::SmolStr;

/// Value the upstream compiler writes into integer columns that were never
/// authored. Distinguishes "unset" from a legitimate zero.
pub const INTEGER_NOT_SET: i32 = i32::MIN;

/// Converts a raw integer column into `None` when it holds [`INTEGER_NOT_SET`].
pub fn integer_or_unset(value: i32) -> Option<i32> {
    (value != INTEGER_NOT_SET).then_some(value)
}

/// An opaque reference to a [`Symbol`] in its owning section.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(u32);
entity_impl!(SymbolId, "sym");

/// Where a symbol was authored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLineNumber {
    pub file: SmolStr,
    pub line: u32,
}

impl SourceLineNumber {
    pub fn new(file: impl Into<SmolStr>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLineNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.file, self.line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Media(MediaSymbol),
    File(FileSymbol),
    Dialog(DialogSymbol),
    Control(ControlSymbol),
    WixVariable(WixVariableSymbol),
    Property(PropertySymbol),
}

macro_rules! symbol_accessors {
    ($($variant:ident => $ty:ident, $as_ref:ident, $as_mut:ident;)*) => {
        impl Symbol {
            $(
                pub fn $as_ref(&self) -> Option<&$ty> {
                    match self {
                        Self::$variant(symbol) => Some(symbol),
                        _ => None,
                    }
                }

                pub fn $as_mut(&mut self) -> Option<&mut $ty> {
                    match self {
                        Self::$variant(symbol) => Some(symbol),
                        _ => None,
                    }
                }
            )*
        }

        $(
            impl From<$ty> for Symbol {
                fn from(symbol: $ty) -> Self {
                    Self::$variant(symbol)
                }
            }
        )*
    };
}

symbol_accessors! {
    Media => MediaSymbol, as_media, as_media_mut;
    File => FileSymbol, as_file, as_file_mut;
    Dialog => DialogSymbol, as_dialog, as_dialog_mut;
    Control => ControlSymbol, as_control, as_control_mut;
    WixVariable => WixVariableSymbol, as_wix_variable, as_wix_variable_mut;
    Property => PropertySymbol, as_property, as_property_mut;
}

impl Symbol {
    /// Table-like name of the variant, used in diagnostics and the IR writer.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Media(_) => "media",
            Self::File(_) => "file",
            Self::Dialog(_) => "dialog",
            Self::Control(_) => "control",
            Self::WixVariable(_) => "wix_variable",
            Self::Property(_) => "property",
        }
    }
}

/// One physical disk of the installation media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSymbol {
    pub disk_id: i32,

    /// Highest file sequence number laid out on this disk. `None` until the
    /// media sequencer (or a baseline, for patches) has computed it.
    pub last_sequence: Option<i32>,

    pub cabinet: Option<String>,
    pub disk_prompt: Option<String>,
}

impl MediaSymbol {
    pub fn new(disk_id: i32) -> Self {
        Self {
            disk_id,
            last_sequence: None,
            cabinet: None,
            disk_prompt: None,
        }
    }

    pub fn with_last_sequence(mut self, last_sequence: i32) -> Self {
        self.last_sequence = Some(last_sequence);
        self
    }

    pub fn with_cabinet(mut self, cabinet: impl Into<String>) -> Self {
        self.cabinet = Some(cabinet.into());
        self
    }

    pub fn with_disk_prompt(mut self, disk_prompt: impl Into<String>) -> Self {
        self.disk_prompt = Some(disk_prompt.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSymbol {
    pub id: SmolStr,
    pub name: String,

    /// Path of the payload on the build machine.
    pub source: String,

    /// Disk the file was assigned to at compile time.
    pub disk_id: i32,

    /// Install order on its media. Unset until sequenced.
    pub sequence: Option<i32>,

    /// Files sharing a patch group were added by a patch and are sequenced
    /// after every baseline file.
    pub patch_group: Option<i32>,

    /// The file was merged in from a merge module and keeps the module's
    /// sequencing.
    pub from_module: bool,
}

impl FileSymbol {
    pub fn new(id: impl Into<SmolStr>, disk_id: i32) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            source: String::new(),
            disk_id,
            sequence: None,
            patch_group: None,
            from_module: false,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_patch_group(mut self, patch_group: i32) -> Self {
        self.patch_group = Some(patch_group);
        self
    }

    pub fn from_module(mut self) -> Self {
        self.from_module = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogSymbol {
    pub id: SmolStr,
    pub h_centering: i32,
    pub v_centering: i32,
    pub width: i32,
    pub height: i32,
    pub right_aligned: bool,
    pub right_to_left: bool,
    pub left_scroll: bool,
    pub title: String,
}

impl DialogSymbol {
    pub fn new(id: impl Into<SmolStr>, width: i32, height: i32) -> Self {
        Self {
            id: id.into(),
            h_centering: 50,
            v_centering: 50,
            width,
            height,
            right_aligned: false,
            right_to_left: false,
            left_scroll: false,
            title: String::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSymbol {
    pub dialog_ref: SmolStr,
    pub control: SmolStr,
    pub kind: SmolStr,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub right_aligned: bool,
    pub right_to_left: bool,
    pub left_scroll: bool,
    pub text: String,
}

impl ControlSymbol {
    pub fn new(
        dialog_ref: impl Into<SmolStr>,
        control: impl Into<SmolStr>,
        kind: impl Into<SmolStr>,
    ) -> Self {
        Self {
            dialog_ref: dialog_ref.into(),
            control: control.into(),
            kind: kind.into(),
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            right_aligned: false,
            right_to_left: false,
            left_scroll: false,
            text: String::new(),
        }
    }

    pub fn with_geometry(mut self, x: i32, y: i32, width: i32, height: i32) -> Self {
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// A `!(wix.Id)` variable defined in the source, usually by an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WixVariableSymbol {
    pub id: SmolStr,
    pub value: String,
    pub overridable: bool,
    pub source: Option<SourceLineNumber>,
}

impl WixVariableSymbol {
    pub fn new(id: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            overridable: false,
            source: None,
        }
    }

    pub fn overridable(mut self) -> Self {
        self.overridable = true;
        self
    }

    pub fn at(mut self, source: SourceLineNumber) -> Self {
        self.source = Some(source);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySymbol {
    pub id: SmolStr,
    pub value: String,
}

impl PropertySymbol {
    pub fn new(id: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_sentinel_is_distinct_from_zero() {
        assert_eq!(integer_or_unset(INTEGER_NOT_SET), None);
        assert_eq!(integer_or_unset(0), Some(0));
        assert_eq!(integer_or_unset(-4), Some(-4));
    }

    #[test]
    fn accessors_dispatch_on_variant() {
        let mut symbol = Symbol::from(FileSymbol::new("F1", 1));
        assert_eq!(symbol.kind_name(), "file");
        assert!(symbol.as_media().is_none());

        symbol.as_file_mut().unwrap().sequence = Some(7);
        assert_eq!(symbol.as_file().unwrap().sequence, Some(7));
    }

    #[test]
    fn symbol_ids_format_with_prefix() {
        let id = SymbolId::from_u32(3);
        assert_eq!(id.to_string(), "sym3");
        assert_eq!(format!("{id:?}"), "sym3");
    }

    #[test]
    fn display_source_line() {
        let line = SourceLineNumber::new("Product.wxs", 12);
        assert_eq!(line.to_string(), "Product.wxs(12)");
    }
}
