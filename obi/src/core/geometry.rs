use obi_ipc::Side;

use crate::core::{Config, Rect};
use crate::platform::{ShowState, WindowHandle, WindowManipulator, WindowSystem};

/// Intercepts a native maximize and substitutes a rectangle that leaves the
/// taskbar strip uncovered, evaluated once per refresh tick.
///
/// The native maximize always covers the full screen, taskbar strip
/// included; since the strip is not an OS-reserved appbar, every maximize on
/// the primary screen is un-done and replaced with the usable-area rect.
/// `saved_rect` remembers the true pre-maximize geometry: present, it means
/// the window is cycling back from a previous pseudo-maximization and gets a
/// one-shot restore instead.
///
/// Every OS call here can fail when the handle dies mid-sequence; failure
/// aborts the remaining steps for this tick and the next tick self-corrects.
pub fn enforce_pseudo_maximize<W: WindowSystem, M: WindowManipulator>(
    ws: &W,
    wm: &M,
    root: WindowHandle,
    saved_rect: &mut Option<Rect>,
    config: &Config,
) {
    if !ws.is_maximized(root) {
        return;
    }

    let Some(attrs) = ws.window_attributes(root) else {
        return;
    };
    let screens = ws.all_screens();
    let Some(primary) = screens.iter().find(|s| s.is_primary) else {
        return;
    };

    // Maximized far away from the primary origin: the window went
    // full-screen on another monitor, where the strip reserves nothing.
    // The OS maximize stands as-is there.
    if (attrs.rect.x - primary.bounds.x).abs() > config.offscreen_tolerance
        || (attrs.rect.y - primary.bounds.y).abs() > config.offscreen_tolerance
    {
        *saved_rect = None;
        return;
    }

    wm.set_show_state(root, ShowState::Restore);

    match saved_rect.take() {
        Some(restore) => {
            tracing::debug!("Un-maximizing [{}] back to {:?}", root, restore);
            wm.set_frame(root, restore);
        }
        None => {
            // The rect right after the restore step is the window's true
            // normal geometry; that is what the next un-maximize returns to.
            let Some(restored) = ws.window_attributes(root) else {
                return;
            };
            *saved_rect = Some(restored.rect);

            let target = pseudo_maximized_rect(&primary.bounds, config);
            tracing::debug!("Pseudo-maximizing [{}] to {:?}", root, target);
            wm.set_frame(root, target);
        }
    }
}

/// The primary screen's bounds minus the taskbar strip on the configured
/// side, with the strip-facing edge pulled in by `border_inset` so the
/// window frame does not butt against the taskbar border.
pub fn pseudo_maximized_rect(primary: &Rect, config: &Config) -> Rect {
    let width = primary
        .width
        .saturating_sub(config.taskbar_width + config.border_inset);
    match config.side {
        Side::Left => Rect {
            x: primary.x + (config.taskbar_width + config.border_inset) as i32,
            y: primary.y,
            width,
            height: primary.height,
        },
        Side::Right => Rect {
            x: primary.x,
            y: primary.y,
            width,
            height: primary.height,
        },
    }
}
