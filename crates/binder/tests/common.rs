#![allow(dead_code)]

use msibind_binder::{assign_sequences, FileFacade, SequenceError};
use msibind_ir::{builder::test_util::*, Section, SectionKind, SymbolId};
use tracing_subscriber::EnvFilter;

/// Installs a subscriber honoring `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One file of a generated layout: disk, optional patch group, merged from a
/// module.
#[derive(Debug, Clone, Copy)]
pub struct FileLayout {
    pub disk_id: i32,
    pub patch_group: Option<i32>,
    pub from_module: bool,
}

/// Builds a section with one media per disk in `disks` followed by `files`.
pub fn layout_section(
    kind: SectionKind,
    disks: &[i32],
    files: &[FileLayout],
) -> (Section, Vec<SymbolId>) {
    let mut builder = test_section(kind);
    for &disk_id in disks {
        builder.media(disk_id);
    }

    let ids = files
        .iter()
        .enumerate()
        .map(|(i, layout)| {
            let id = format!("F{i}");
            match (layout.patch_group, layout.from_module) {
                (Some(group), _) => builder.patch_file(&id, layout.disk_id, group),
                (None, true) => builder.module_file(&id, layout.disk_id),
                (None, false) => builder.file(&id, layout.disk_id),
            }
        })
        .collect();

    (builder.build(), ids)
}

pub fn sequence(section: &mut Section) -> Result<(), SequenceError> {
    let files = FileFacade::collect(section);
    assign_sequences(section, &files)
}

pub fn file_sequence(section: &Section, id: SymbolId) -> Option<i32> {
    section.file(id).and_then(|file| file.sequence)
}

pub fn last_sequence(section: &Section, disk_id: i32) -> Option<i32> {
    section
        .media_for_disk(disk_id)
        .and_then(|(_, media)| media.last_sequence)
}
