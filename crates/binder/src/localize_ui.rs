//! Overlays localized geometry, flags and text onto dialogs and controls.
use msibind_ir::{ControlSymbol, DialogSymbol, Intermediate, LocalizedControl};

use crate::variable_resolver::VariableResolver;

/// Applies every registered localized control to the matching dialog or
/// control symbol. Returns the number of symbols that were overridden.
pub fn localize_ui(intermediate: &mut Intermediate, variables: &dyn VariableResolver) -> usize {
    let mut localized = 0;

    for section in &mut intermediate.sections {
        for dialog in section.dialogs_mut() {
            if let Some(overlay) = variables.try_get_localized_control(&dialog.id, None) {
                tracing::trace!(dialog = %dialog.id, "localizing dialog");
                localize_dialog(dialog, overlay);
                localized += 1;
            }
        }

        for control in section.controls_mut() {
            let overlay = variables
                .try_get_localized_control(&control.dialog_ref, Some(control.control.as_str()));
            if let Some(overlay) = overlay {
                tracing::trace!(
                    dialog = %control.dialog_ref,
                    control = %control.control,
                    "localizing control"
                );
                localize_control(control, overlay);
                localized += 1;
            }
        }
    }

    localized
}

fn localize_dialog(dialog: &mut DialogSymbol, overlay: &LocalizedControl) {
    override_if_set(&mut dialog.h_centering, overlay.x);
    override_if_set(&mut dialog.v_centering, overlay.y);
    override_if_set(&mut dialog.width, overlay.width);
    override_if_set(&mut dialog.height, overlay.height);

    dialog.right_aligned |= overlay.right_aligned;
    dialog.right_to_left |= overlay.right_to_left;
    dialog.left_scroll |= overlay.left_scroll;

    if !overlay.text.is_empty() {
        dialog.title.clone_from(&overlay.text);
    }
}

fn localize_control(control: &mut ControlSymbol, overlay: &LocalizedControl) {
    override_if_set(&mut control.x, overlay.x);
    override_if_set(&mut control.y, overlay.y);
    override_if_set(&mut control.width, overlay.width);
    override_if_set(&mut control.height, overlay.height);

    control.right_aligned |= overlay.right_aligned;
    control.right_to_left |= overlay.right_to_left;
    control.left_scroll |= overlay.left_scroll;

    if !overlay.text.is_empty() {
        control.text.clone_from(&overlay.text);
    }
}

fn override_if_set(target: &mut i32, value: Option<i32>) {
    if let Some(value) = value {
        *target = value;
    }
}
