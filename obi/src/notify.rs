use crate::core::TrackedWindow;
use crate::platform::WindowHandle;

/// Presentation boundary, invoked synchronously during reconciliation.
///
/// The engine only ever asks for appends and removals; a matched entity is
/// never re-announced, so element identity on the presentation side is
/// stable. Reordering (user drag) happens entirely in the presentation
/// layer, keyed by root handle, and never touches the engine's storage.
pub trait Notifier {
    fn entity_added(&mut self, window: &TrackedWindow);
    fn entity_removed(&mut self, window: &TrackedWindow);
    fn title_changed(&mut self, root: WindowHandle, old: &str, new: &str);
    fn active_changed(&mut self, root: WindowHandle, old: bool, new: bool);
}

/// Logs every transition; the daemon's sink while no presentation layer is
/// attached.
#[derive(Debug, Default)]
pub struct TraceNotifier;

impl Notifier for TraceNotifier {
    fn entity_added(&mut self, window: &TrackedWindow) {
        tracing::info!("Window added: [{}] {}", window.root, window.title);
    }

    fn entity_removed(&mut self, window: &TrackedWindow) {
        tracing::info!("Window removed: [{}] {}", window.root, window.title);
    }

    fn title_changed(&mut self, root: WindowHandle, old: &str, new: &str) {
        tracing::debug!("Title changed: [{}] '{}' -> '{}'", root, old, new);
    }

    fn active_changed(&mut self, root: WindowHandle, old: bool, new: bool) {
        tracing::debug!("Active changed: [{}] {} -> {}", root, old, new);
    }
}
