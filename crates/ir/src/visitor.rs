//! This module contains the [`FieldVisitorMut`]/[`VisitableMut`] traits used by
//! passes that rewrite the textual columns of symbols, e.g. variable
//! substitution.
use std::fmt;

use crate::symbol::Symbol;

/// A textual column of a symbol that may carry variable references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    MediaCabinet,
    MediaDiskPrompt,
    FileName,
    FileSource,
    DialogTitle,
    ControlText,
    WixVariableValue,
    PropertyValue,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MediaCabinet => "Cabinet",
            Self::MediaDiskPrompt => "DiskPrompt",
            Self::FileName => "FileName",
            Self::FileSource => "Source",
            Self::DialogTitle => "Title",
            Self::ControlText => "Text",
            Self::WixVariableValue => "Value",
            Self::PropertyValue => "Value",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

pub trait FieldVisitorMut {
    fn visit_field(&mut self, field: Field, value: &mut String);
}

pub trait VisitableMut {
    fn accept_mut(&mut self, visitor: &mut dyn FieldVisitorMut);
}

impl VisitableMut for Symbol {
    fn accept_mut(&mut self, visitor: &mut dyn FieldVisitorMut) {
        match self {
            Self::Media(media) => {
                if let Some(cabinet) = &mut media.cabinet {
                    visitor.visit_field(Field::MediaCabinet, cabinet);
                }
                if let Some(prompt) = &mut media.disk_prompt {
                    visitor.visit_field(Field::MediaDiskPrompt, prompt);
                }
            }
            Self::File(file) => {
                visitor.visit_field(Field::FileName, &mut file.name);
                visitor.visit_field(Field::FileSource, &mut file.source);
            }
            Self::Dialog(dialog) => visitor.visit_field(Field::DialogTitle, &mut dialog.title),
            Self::Control(control) => visitor.visit_field(Field::ControlText, &mut control.text),
            Self::WixVariable(variable) => {
                visitor.visit_field(Field::WixVariableValue, &mut variable.value)
            }
            Self::Property(property) => {
                visitor.visit_field(Field::PropertyValue, &mut property.value)
            }
        }
    }
}
