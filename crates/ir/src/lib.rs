pub mod builder;
pub mod intermediate;
pub mod ir_writer;
pub mod localization;
pub mod section;
pub mod symbol;
pub mod visitor;

pub use builder::{IntermediateBuilder, SectionBuilder};
pub use intermediate::{Intermediate, IntermediateLevel};
pub use localization::{BindVariable, Localization, LocalizedControl, LocalizedControlKey};
pub use section::{Section, SectionKind};
pub use symbol::{
    integer_or_unset, ControlSymbol, DialogSymbol, FileSymbol, MediaSymbol, PropertySymbol,
    SourceLineNumber, Symbol, SymbolId, WixVariableSymbol, INTEGER_NOT_SET,
};
pub use visitor::{Field, FieldVisitorMut, VisitableMut};

pub mod prelude {
    pub use crate::visitor::{FieldVisitorMut, VisitableMut};
}
