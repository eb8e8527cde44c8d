//! Selects the localization bundles that apply to a build, in registration
//! order. Later bundles win when registered, so the order is significant.
use msibind_ir::Localization;
use smallvec::{smallvec, SmallVec};
use smol_str::SmolStr;

use crate::extension::ExtensionData;

pub type CultureFilter = SmallVec<[SmolStr; 2]>;

#[derive(Clone, Copy)]
pub struct LocalizationFilter<'a> {
    /// Cultures requested for the build. Empty means "no preference".
    pub filter_cultures: &'a [SmolStr],

    /// Bundles passed directly to the build.
    pub localizations: &'a [Localization],

    /// Bundles embedded in the representation by the linker.
    pub embedded: &'a [Localization],

    pub extension_data: &'a [Box<dyn ExtensionData>],
}

impl<'a> LocalizationFilter<'a> {
    /// The effective culture filter. Without an explicit filter, a neutral
    /// bundle passed directly to the build narrows selection to neutral
    /// bundles.
    pub fn culture_filter(&self) -> CultureFilter {
        if self.filter_cultures.is_empty()
            && self.localizations.iter().any(Localization::is_neutral)
        {
            smallvec![SmolStr::default()]
        } else {
            self.filter_cultures.iter().cloned().collect()
        }
    }

    pub fn apply(&self) -> Vec<&'a Localization> {
        let filter = self.culture_filter();
        let candidates: Vec<&'a Localization> =
            self.localizations.iter().chain(self.embedded).collect();

        let mut selected = Vec::new();
        select(&filter, &candidates, &mut selected);

        for data in self.extension_data {
            let Some(library) = data.library() else {
                continue;
            };
            if library.localizations.is_empty() {
                continue;
            }

            let extension_filter = match data.default_culture() {
                Some(culture) if filter.is_empty() => smallvec![SmolStr::from(culture)],
                _ => filter.clone(),
            };
            let candidates: Vec<&Localization> = library.localizations.iter().collect();
            select(&extension_filter, &candidates, &mut selected);
        }

        tracing::debug!(
            filter = ?filter,
            selected = selected.len(),
            "filtered localizations"
        );
        selected
    }
}

/// Appends, for each culture in filter order, every candidate of that culture
/// or neutral. Candidates matching several cultures are appended repeatedly.
fn select<'l>(
    filter: &[SmolStr],
    candidates: &[&'l Localization],
    selected: &mut Vec<&'l Localization>,
) {
    if filter.is_empty() {
        selected.extend_from_slice(candidates);
        return;
    }

    for culture in filter {
        selected.extend(candidates.iter().copied().filter(|localization| {
            localization.is_neutral() || localization.culture.eq_ignore_ascii_case(culture)
        }));
    }
}
