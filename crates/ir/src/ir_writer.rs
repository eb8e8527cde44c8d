//! Textual dump of the representation, used for debugging and snapshot tests.
use std::fmt::{self, Write};

use crate::{
    symbol::{ControlSymbol, DialogSymbol, FileSymbol, MediaSymbol},
    Intermediate, Section, Symbol, SymbolId,
};

pub struct IntermediateWriter<'a> {
    intermediate: &'a Intermediate,
}

impl<'a> IntermediateWriter<'a> {
    pub fn new(intermediate: &'a Intermediate) -> Self {
        Self { intermediate }
    }

    pub fn write(&self, w: &mut impl Write) -> fmt::Result {
        write!(w, "intermediate @{} levels=[", self.intermediate.id)?;
        write_iter_with_delim(w, self.intermediate.levels(), ", ")?;
        writeln!(w, "]")?;

        for localization in &self.intermediate.localizations {
            let culture = if localization.is_neutral() {
                "neutral"
            } else {
                localization.culture.as_str()
            };
            write!(w, "localization {culture}")?;
            if let Some(codepage) = localization.codepage {
                write!(w, " codepage={codepage}")?;
            }
            writeln!(
                w,
                " variables={} controls={}",
                localization.variables.len(),
                localization.localized_controls.len()
            )?;
        }

        for section in &self.intermediate.sections {
            SectionWriter::new(section).write(w)?;
        }

        Ok(())
    }

    pub fn dump_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for IntermediateWriter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f)
    }
}

pub struct SectionWriter<'a> {
    section: &'a Section,
}

impl<'a> SectionWriter<'a> {
    pub fn new(section: &'a Section) -> Self {
        Self { section }
    }

    pub fn write(&self, w: &mut impl Write) -> fmt::Result {
        writeln!(w, "section @{} {}", self.section.id, self.section.kind)?;
        for (id, symbol) in self.section.symbols.iter() {
            write_symbol(w, id, symbol)?;
            writeln!(w)?;
        }
        Ok(())
    }

    pub fn dump_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SectionWriter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f)
    }
}

fn write_symbol(w: &mut impl Write, id: SymbolId, symbol: &Symbol) -> fmt::Result {
    write!(w, "    {id} = {} ", symbol.kind_name())?;
    match symbol {
        Symbol::Media(media) => write_media(w, media),
        Symbol::File(file) => write_file(w, file),
        Symbol::Dialog(dialog) => write_dialog(w, dialog),
        Symbol::Control(control) => write_control(w, control),
        Symbol::WixVariable(variable) => {
            write!(w, "{} = \"{}\"", variable.id, variable.value)?;
            if variable.overridable {
                write!(w, " overridable")?;
            }
            Ok(())
        }
        Symbol::Property(property) => write!(w, "{} = \"{}\"", property.id, property.value),
    }
}

fn write_media(w: &mut impl Write, media: &MediaSymbol) -> fmt::Result {
    write!(w, "{}", media.disk_id)?;
    if let Some(last_sequence) = media.last_sequence {
        write!(w, " last_sequence={last_sequence}")?;
    }
    if let Some(cabinet) = &media.cabinet {
        write!(w, " cabinet=\"{cabinet}\"")?;
    }
    if let Some(prompt) = &media.disk_prompt {
        write!(w, " disk_prompt=\"{prompt}\"")?;
    }
    Ok(())
}

fn write_file(w: &mut impl Write, file: &FileSymbol) -> fmt::Result {
    write!(w, "{} disk={}", file.id, file.disk_id)?;
    if let Some(sequence) = file.sequence {
        write!(w, " sequence={sequence}")?;
    }
    if let Some(group) = file.patch_group {
        write!(w, " patch_group={group}")?;
    }
    if file.from_module {
        write!(w, " from_module")?;
    }
    if !file.source.is_empty() {
        write!(w, " source=\"{}\"", file.source)?;
    }
    Ok(())
}

fn write_dialog(w: &mut impl Write, dialog: &DialogSymbol) -> fmt::Result {
    write!(
        w,
        "{} {},{} {}x{}",
        dialog.id, dialog.h_centering, dialog.v_centering, dialog.width, dialog.height
    )?;
    write_alignment(
        w,
        dialog.right_aligned,
        dialog.right_to_left,
        dialog.left_scroll,
    )?;
    if !dialog.title.is_empty() {
        write!(w, " title=\"{}\"", dialog.title)?;
    }
    Ok(())
}

fn write_control(w: &mut impl Write, control: &ControlSymbol) -> fmt::Result {
    write!(
        w,
        "{}/{} {},{} {}x{}",
        control.dialog_ref, control.control, control.x, control.y, control.width, control.height
    )?;
    write_alignment(
        w,
        control.right_aligned,
        control.right_to_left,
        control.left_scroll,
    )?;
    if !control.text.is_empty() {
        write!(w, " text=\"{}\"", control.text)?;
    }
    Ok(())
}

fn write_alignment(
    w: &mut impl Write,
    right_aligned: bool,
    right_to_left: bool,
    left_scroll: bool,
) -> fmt::Result {
    for (set, name) in [
        (right_aligned, "right_aligned"),
        (right_to_left, "right_to_left"),
        (left_scroll, "left_scroll"),
    ] {
        if set {
            write!(w, " {name}")?;
        }
    }
    Ok(())
}

fn write_iter_with_delim<T: fmt::Display>(
    w: &mut impl Write,
    items: &[T],
    delim: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(w, "{delim}")?;
        }
        write!(w, "{item}")?;
    }
    Ok(())
}
