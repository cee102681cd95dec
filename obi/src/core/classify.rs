use crate::core::{ExStyleFlags, StyleFlags};
use crate::platform::{WindowHandle, WindowSystem};

/// Upper bound on the owner-chain walk. The OS is assumed never to create
/// an ownership cycle; the cap keeps a broken chain from hanging a tick.
const MAX_OWNER_DEPTH: usize = 64;

/// Follows the owner relation until no further owner exists and returns the
/// terminal handle. A window with no owner is its own root.
pub fn root_of<W: WindowSystem>(ws: &W, handle: WindowHandle) -> WindowHandle {
    let mut current = handle;
    for _ in 0..MAX_OWNER_DEPTH {
        match ws.owner(current) {
            Some(owner) => current = owner,
            None => return current,
        }
    }
    tracing::warn!(
        "Owner chain for [{}] exceeded {} links, treating [{}] as root",
        handle,
        MAX_OWNER_DEPTH,
        current
    );
    current
}

/// Whether a root handle is surfaced as an application entry.
///
/// Mirrors the OS taskbar's own heuristic: visible, neither popup nor child,
/// and either explicitly marked as an app window or carrying none of the
/// tool-window/no-activate suppression bits. The explicit app-window mark is
/// an override, not one more condition.
pub fn is_eligible_root<W: WindowSystem>(
    ws: &W,
    handle: WindowHandle,
    shell: Option<WindowHandle>,
) -> bool {
    // The desktop shell's background window is never an application.
    if shell == Some(handle) {
        return false;
    }

    let Some(attrs) = ws.window_attributes(handle) else {
        return false;
    };

    if !attrs.style.contains(StyleFlags::VISIBLE) {
        return false;
    }
    if attrs.style.intersects(StyleFlags::POPUP | StyleFlags::CHILD) {
        return false;
    }

    // Untitled roots would become ghost buttons for helper windows.
    if attrs.title.is_empty() {
        return false;
    }

    attrs.ex_style.contains(ExStyleFlags::APP_WINDOW)
        || !attrs
            .ex_style
            .intersects(ExStyleFlags::TOOL_WINDOW | ExStyleFlags::NO_ACTIVATE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{create_test_window, MockPlatform};

    #[test]
    fn test_root_of_window_without_owner_is_itself() {
        let platform =
            MockPlatform::new().with_windows(vec![create_test_window(100, 1000, "Editor")]);
        assert_eq!(root_of(&platform, 100), 100);
    }

    #[test]
    fn test_root_of_follows_owner_chain() {
        let platform = MockPlatform::new().with_windows(vec![
            create_test_window(100, 1000, "Editor"),
            create_test_window(101, 1000, "Find").owned_by(100),
            create_test_window(102, 1000, "Replace").owned_by(101),
        ]);
        assert_eq!(root_of(&platform, 102), 100);
        assert_eq!(root_of(&platform, 101), 100);
    }

    #[test]
    fn test_root_of_terminates_on_cyclic_chain() {
        let platform = MockPlatform::new().with_windows(vec![
            create_test_window(100, 1000, "A").owned_by(101),
            create_test_window(101, 1000, "B").owned_by(100),
        ]);
        // Must not hang; either handle is an acceptable answer.
        let root = root_of(&platform, 100);
        assert!(root == 100 || root == 101);
    }

    #[test]
    fn test_plain_visible_window_is_eligible() {
        let platform =
            MockPlatform::new().with_windows(vec![create_test_window(100, 1000, "Editor")]);
        assert!(is_eligible_root(&platform, 100, None));
    }

    #[test]
    fn test_invisible_window_is_not_eligible() {
        let platform = MockPlatform::new().with_windows(vec![
            create_test_window(100, 1000, "Editor").with_style(StyleFlags::empty())
        ]);
        assert!(!is_eligible_root(&platform, 100, None));
    }

    #[test]
    fn test_popup_and_child_windows_are_not_eligible() {
        let platform = MockPlatform::new().with_windows(vec![
            create_test_window(100, 1000, "Popup")
                .with_style(StyleFlags::VISIBLE | StyleFlags::POPUP),
            create_test_window(101, 1000, "Child")
                .with_style(StyleFlags::VISIBLE | StyleFlags::CHILD),
        ]);
        assert!(!is_eligible_root(&platform, 100, None));
        assert!(!is_eligible_root(&platform, 101, None));
    }

    #[test]
    fn test_tool_window_is_suppressed() {
        let platform = MockPlatform::new().with_windows(vec![
            create_test_window(100, 1000, "Palette").with_ex_style(ExStyleFlags::TOOL_WINDOW)
        ]);
        assert!(!is_eligible_root(&platform, 100, None));
    }

    #[test]
    fn test_no_activate_window_is_suppressed() {
        let platform = MockPlatform::new().with_windows(vec![
            create_test_window(100, 1000, "Overlay").with_ex_style(ExStyleFlags::NO_ACTIVATE)
        ]);
        assert!(!is_eligible_root(&platform, 100, None));
    }

    #[test]
    fn test_app_window_flag_overrides_suppression() {
        let platform =
            MockPlatform::new().with_windows(vec![create_test_window(100, 1000, "Pinned Tool")
                .with_ex_style(
                    ExStyleFlags::TOOL_WINDOW
                        | ExStyleFlags::NO_ACTIVATE
                        | ExStyleFlags::APP_WINDOW,
                )]);
        assert!(is_eligible_root(&platform, 100, None));
    }

    #[test]
    fn test_untitled_window_is_not_eligible() {
        let platform = MockPlatform::new().with_windows(vec![create_test_window(100, 1000, "")]);
        assert!(!is_eligible_root(&platform, 100, None));
    }

    #[test]
    fn test_shell_window_is_never_eligible() {
        let platform =
            MockPlatform::new().with_windows(vec![create_test_window(7, 500, "Program Manager")]);
        assert!(is_eligible_root(&platform, 7, None));
        assert!(!is_eligible_root(&platform, 7, Some(7)));
    }

    #[test]
    fn test_destroyed_window_is_not_eligible() {
        let platform = MockPlatform::new();
        assert!(!is_eligible_root(&platform, 100, None));
    }
}
