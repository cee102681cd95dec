use std::path::{Path, PathBuf};

use crate::core::{geometry, Config};
use crate::notify::Notifier;
use crate::platform::{QueryError, WindowHandle, WindowManipulator, WindowSystem};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }
}

/// Result of the one-shot icon capture performed at entity creation.
/// `Denied` (elevated process, access refused) is distinguished from
/// `NotAttempted` (lookup failed for another reason); neither is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconState {
    NotAttempted,
    Captured(PathBuf),
    Denied,
}

impl IconState {
    pub fn path(&self) -> Option<&Path> {
        match self {
            IconState::Captured(path) => Some(path),
            _ => None,
        }
    }
}

/// One tracked application, keyed by its root window handle. Created and
/// destroyed only by the reconciliation engine; refreshed in place every
/// tick while the root survives.
#[derive(Debug, Clone)]
pub struct TrackedWindow {
    pub root: WindowHandle,
    pub pid: u32,
    pub title: String,
    pub icon: IconState,
    pub active: bool,
    /// Every live handle whose owner chain ends at `root`, including the
    /// root itself. Replaced wholesale each tick.
    pub children: Vec<WindowHandle>,
    /// Pre-pseudo-maximize rectangle, consumed by the next un-maximize.
    pub saved_rect: Option<Rect>,
}

impl TrackedWindow {
    /// Returns `None` when the root vanished between enumeration and
    /// construction; the entry is simply omitted this tick.
    pub fn new<W: WindowSystem>(
        ws: &W,
        root: WindowHandle,
        children: Vec<WindowHandle>,
        foreground: Option<WindowHandle>,
        taskbar_focused: bool,
    ) -> Option<Self> {
        let attrs = ws.window_attributes(root)?;

        let icon = match ws.process_image_path(attrs.pid) {
            Ok(path) => IconState::Captured(path),
            Err(QueryError::AccessDenied) => {
                tracing::debug!(
                    "Icon capture denied for pid {} ({}), likely elevated",
                    attrs.pid,
                    attrs.title
                );
                IconState::Denied
            }
            Err(err) => {
                tracing::debug!("Icon capture failed for pid {}: {}", attrs.pid, err);
                IconState::NotAttempted
            }
        };

        let active = compute_active(foreground, &children, taskbar_focused);

        Some(Self {
            root,
            pid: attrs.pid,
            title: attrs.title,
            icon,
            active,
            children,
            saved_rect: None,
        })
    }

    /// Per-tick update: title, active flag, child set, then the
    /// pseudo-maximize hook. Field transitions are reported through the
    /// notifier with old and new values.
    #[allow(clippy::too_many_arguments)]
    pub fn refresh<W: WindowSystem, M: WindowManipulator, N: Notifier>(
        &mut self,
        ws: &W,
        wm: &M,
        notifier: &mut N,
        foreground: Option<WindowHandle>,
        children: Vec<WindowHandle>,
        taskbar_focused: bool,
        config: &Config,
    ) {
        // An unreadable title is indistinguishable from an empty one.
        let new_title = ws
            .window_attributes(self.root)
            .map(|a| a.title)
            .unwrap_or_default();
        if new_title != self.title {
            notifier.title_changed(self.root, &self.title, &new_title);
            self.title = new_title;
        }

        let new_active = compute_active(foreground, &children, taskbar_focused);
        if new_active != self.active {
            notifier.active_changed(self.root, self.active, new_active);
            self.active = new_active;
        }

        self.children = children;

        geometry::enforce_pseudo_maximize(ws, wm, self.root, &mut self.saved_rect, config);
    }

    pub fn activate<M: WindowManipulator>(&self, wm: &M) {
        tracing::debug!("Activating window [{}] {}", self.root, self.title);
        wm.activate(self.root);
    }

    /// Posts an asynchronous close request; does not confirm the window
    /// actually closed.
    pub fn close<M: WindowManipulator>(&self, wm: &M) {
        tracing::info!("Requesting close for [{}] {}", self.root, self.title);
        wm.request_close(self.root);
    }
}

/// Active while the foreground window belongs to this application's group,
/// unless the taskbar itself holds focus (which would make every button
/// flicker off during taskbar interaction).
fn compute_active(
    foreground: Option<WindowHandle>,
    children: &[WindowHandle],
    taskbar_focused: bool,
) -> bool {
    !taskbar_focused && foreground.is_some_and(|f| children.contains(&f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::mock::{Notification, RecordingNotifier};
    use crate::platform::mock::{create_test_window, MockPlatform};

    #[test]
    fn test_new_captures_icon_once() {
        let platform = MockPlatform::new()
            .with_windows(vec![create_test_window(100, 1000, "Editor")])
            .with_exe_path(1000, "C:\\tools\\editor.exe");

        let window = TrackedWindow::new(&platform, 100, vec![100], None, false).unwrap();
        assert_eq!(
            window.icon,
            IconState::Captured(PathBuf::from("C:\\tools\\editor.exe"))
        );
    }

    #[test]
    fn test_new_denied_icon_is_not_fatal() {
        let platform = MockPlatform::new()
            .with_windows(vec![create_test_window(100, 1000, "Elevated Tool")])
            .with_denied_pid(1000);

        let window = TrackedWindow::new(&platform, 100, vec![100], None, false).unwrap();
        assert_eq!(window.icon, IconState::Denied);
        assert!(window.icon.path().is_none());
    }

    #[test]
    fn test_new_missing_exe_leaves_icon_unattempted() {
        let platform =
            MockPlatform::new().with_windows(vec![create_test_window(100, 1000, "Editor")]);

        let window = TrackedWindow::new(&platform, 100, vec![100], None, false).unwrap();
        assert_eq!(window.icon, IconState::NotAttempted);
    }

    #[test]
    fn test_new_returns_none_for_vanished_root() {
        let platform = MockPlatform::new();
        assert!(TrackedWindow::new(&platform, 100, vec![100], None, false).is_none());
    }

    #[test]
    fn test_refresh_updates_title_and_reports_transition() {
        let platform =
            MockPlatform::new().with_windows(vec![create_test_window(100, 1000, "Before")]);
        let config = Config::default();
        let mut notifier = RecordingNotifier::new();

        let mut window = TrackedWindow::new(&platform, 100, vec![100], None, false).unwrap();
        platform.set_title(100, "After");
        window.refresh(
            &platform,
            &platform,
            &mut notifier,
            None,
            vec![100],
            false,
            &config,
        );

        assert_eq!(window.title, "After");
        assert_eq!(
            notifier.events,
            vec![Notification::TitleChanged(
                100,
                "Before".to_string(),
                "After".to_string()
            )]
        );
    }

    #[test]
    fn test_refresh_title_of_vanished_root_becomes_empty() {
        let platform =
            MockPlatform::new().with_windows(vec![create_test_window(100, 1000, "Editor")]);
        let config = Config::default();
        let mut notifier = RecordingNotifier::new();

        let mut window = TrackedWindow::new(&platform, 100, vec![100], None, false).unwrap();
        platform.remove_window(100);
        window.refresh(
            &platform,
            &platform,
            &mut notifier,
            None,
            vec![100],
            false,
            &config,
        );

        assert_eq!(window.title, "");
    }

    #[test]
    fn test_active_follows_foreground_child() {
        let platform = MockPlatform::new().with_windows(vec![
            create_test_window(100, 1000, "Editor"),
            create_test_window(101, 1000, "Find Dialog").owned_by(100),
        ]);
        let config = Config::default();
        let mut notifier = RecordingNotifier::new();

        let mut window = TrackedWindow::new(&platform, 100, vec![100, 101], None, false).unwrap();
        assert!(!window.active);

        // Focus lands on an owned dialog: the application counts as active.
        window.refresh(
            &platform,
            &platform,
            &mut notifier,
            Some(101),
            vec![100, 101],
            false,
            &config,
        );
        assert!(window.active);
        assert_eq!(
            notifier.events,
            vec![Notification::ActiveChanged(100, false, true)]
        );
    }

    #[test]
    fn test_active_suppressed_while_taskbar_focused() {
        let platform =
            MockPlatform::new().with_windows(vec![create_test_window(100, 1000, "Editor")]);
        let config = Config::default();
        let mut notifier = RecordingNotifier::new();

        let mut window = TrackedWindow::new(&platform, 100, vec![100], None, false).unwrap();
        window.refresh(
            &platform,
            &platform,
            &mut notifier,
            Some(100),
            vec![100],
            true,
            &config,
        );

        assert!(!window.active);
        assert!(notifier.events.is_empty());
    }

    #[test]
    fn test_refresh_replaces_child_set() {
        let platform =
            MockPlatform::new().with_windows(vec![create_test_window(100, 1000, "Editor")]);
        let config = Config::default();
        let mut notifier = RecordingNotifier::new();

        let mut window = TrackedWindow::new(&platform, 100, vec![100, 101], None, false).unwrap();
        window.refresh(
            &platform,
            &platform,
            &mut notifier,
            None,
            vec![100],
            false,
            &config,
        );

        assert_eq!(window.children, vec![100]);
    }
}
