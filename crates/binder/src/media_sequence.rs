//! File sequencing across installation media.
//!
//! A module is a single media by construction, so its files are numbered
//! `1..=n` without looking at disks. Products and patches share one running
//! counter across every disk: each disk's `last_sequence` is the counter value
//! when the sequencer leaves it. Files added by a patch group are held back
//! and numbered after every other file, group by group in the order the
//! groups were first seen.
use indexmap::IndexMap;
use msibind_ir::{Section, SectionKind, SymbolId};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::{error::SequenceError, facade::FileFacade};

/// Assigns `sequence` to every file in `files` (in the given order) and
/// `last_sequence` to every media they land on.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(section = %section.id, kind = %section.kind, files = files.len())
)]
pub fn assign_sequences(section: &mut Section, files: &[FileFacade]) -> Result<(), SequenceError> {
    let media = media_by_disk(section)?;

    if section.kind == SectionKind::Module {
        let mut last_sequence = 0;
        for facade in files {
            last_sequence += 1;
            facade.file_mut(section)?.sequence = Some(last_sequence);
        }
        tracing::debug!(last_sequence, "sequenced module");
        return Ok(());
    }

    let mut sequencer = MediaSequencer {
        media: &media,
        current: None,
        last_sequence: 0,
        patch: section.kind == SectionKind::Patch,
    };
    let mut patch_groups: IndexMap<i32, Vec<FileFacade>> = IndexMap::new();

    for facade in files {
        let file = facade.file(section)?;
        let (disk_id, patch_group, from_module) = (file.disk_id, file.patch_group, file.from_module);

        sequencer.enter_media(section, *facade, disk_id, true)?;
        if let Some(group) = patch_group {
            patch_groups.entry(group).or_default().push(*facade);
        } else if !from_module {
            sequencer.assign(section, *facade)?;
        }
    }
    sequencer.leave_media(section);

    for facade in patch_groups.values().flatten() {
        let disk_id = facade.file(section)?.disk_id;
        sequencer.enter_media(section, *facade, disk_id, false)?;
        sequencer.assign(section, *facade)?;
    }
    sequencer.leave_media(section);

    tracing::debug!(
        last_sequence = sequencer.last_sequence,
        patch_groups = patch_groups.len(),
        "sequenced media"
    );
    Ok(())
}

/// Indexes the section's media by disk id.
fn media_by_disk(section: &Section) -> Result<FxHashMap<i32, SymbolId>, SequenceError> {
    let mut media = FxHashMap::default();
    for (id, symbol) in section.media() {
        if media.insert(symbol.disk_id, id).is_some() {
            return Err(SequenceError::DuplicateMedia {
                section: section.id.clone(),
                disk_id: symbol.disk_id,
            });
        }
    }
    Ok(media)
}

struct MediaSequencer<'a> {
    media: &'a FxHashMap<i32, SymbolId>,

    /// Disk id and symbol of the media currently being filled.
    current: Option<(i32, SymbolId)>,
    last_sequence: i32,
    patch: bool,
}

impl MediaSequencer<'_> {
    /// Makes the media of `disk_id` current, closing the previous one when the
    /// disk changes.
    fn enter_media(
        &mut self,
        section: &mut Section,
        facade: FileFacade,
        disk_id: i32,
        first_pass: bool,
    ) -> Result<(), SequenceError> {
        let opening_first = match self.current {
            Some((current, _)) if current == disk_id => return Ok(()),
            Some(_) => {
                self.leave_media(section);
                false
            }
            None => true,
        };

        let Some(&media) = self.media.get(&disk_id) else {
            return Err(SequenceError::MissingMedia {
                section: section.id.clone(),
                file: file_id(section, facade),
                disk_id,
            });
        };

        // Patch media never start at zero.
        if opening_first && first_pass && self.patch {
            self.last_sequence = section
                .symbol(media)
                .and_then(|symbol| symbol.as_media())
                .and_then(|media| media.last_sequence)
                .unwrap_or(1);
        }

        self.current = Some((disk_id, media));
        Ok(())
    }

    fn leave_media(&mut self, section: &mut Section) {
        if let Some((disk_id, media)) = self.current.take() {
            if let Some(media) = section.media_mut(media) {
                media.last_sequence = Some(self.last_sequence);
            }
            tracing::trace!(disk_id, last_sequence = self.last_sequence, "closed media");
        }
    }

    fn assign(&mut self, section: &mut Section, facade: FileFacade) -> Result<(), SequenceError> {
        self.last_sequence = self.last_sequence.checked_add(1).ok_or_else(|| {
            SequenceError::SequenceOverflow {
                section: section.id.clone(),
                disk_id: self.current.map_or(0, |(disk_id, _)| disk_id),
            }
        })?;
        let file = facade.file_mut(section)?;
        file.sequence = Some(self.last_sequence);
        tracing::trace!(file = %file.id, sequence = self.last_sequence, "sequenced file");
        Ok(())
    }
}

fn file_id(section: &Section, facade: FileFacade) -> SmolStr {
    section
        .file(facade.symbol)
        .map(|file| file.id.clone())
        .unwrap_or_else(|| facade.symbol.to_string().into())
}
