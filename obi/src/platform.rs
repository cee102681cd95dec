use std::path::PathBuf;

use crate::core::{ExStyleFlags, Rect, StyleFlags};

/// Opaque OS window identifier. Stable for the window's lifetime; may be
/// reused for an unrelated window after destruction, so it is re-validated
/// on every polling tick.
pub type WindowHandle = u64;

/// Read-only per-window snapshot fetched from the OS.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowAttributes {
    pub title: String,
    pub style: StyleFlags,
    pub ex_style: ExStyleFlags,
    pub rect: Rect,
    pub pid: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowState {
    Normal,
    Minimized,
    Maximized,
    Restore,
}

/// One attached screen. `index` is the enumeration position; exactly one
/// screen is primary.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenInfo {
    pub index: usize,
    pub bounds: Rect,
    pub is_primary: bool,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum QueryError {
    #[error("window or process no longer exists")]
    Gone,
    #[error("access denied")]
    AccessDenied,
}

/// Trait for querying windows and screens from the system.
/// This abstraction allows mocking in tests.
///
/// All queries are best-effort: a handle can be destroyed between any two
/// calls, in which case the query reports absence instead of failing.
pub trait WindowSystem {
    /// All top-level windows, in OS enumeration order. The order must be
    /// passed through unsorted; it seeds the insertion order of new entries.
    fn enumerate_windows(&self) -> Vec<WindowHandle>;
    /// `None` once the handle has been destroyed.
    fn window_attributes(&self, handle: WindowHandle) -> Option<WindowAttributes>;
    fn owner(&self, handle: WindowHandle) -> Option<WindowHandle>;
    fn foreground_window(&self) -> Option<WindowHandle>;
    /// The desktop shell's own background window, if the OS exposes one.
    fn shell_window(&self) -> Option<WindowHandle>;
    fn is_maximized(&self, handle: WindowHandle) -> bool;
    /// Executable path of the process owning `pid`. Fails with
    /// `AccessDenied` for elevated processes when we are not elevated.
    fn process_image_path(&self, pid: u32) -> Result<PathBuf, QueryError>;
    fn all_screens(&self) -> Vec<ScreenInfo>;
}

/// Trait for manipulating windows (side effects).
/// This abstraction allows mocking in tests.
///
/// Every operation is fire-and-forget from the caller's point of view: the
/// OS may refuse (focus stealing prevention, destroyed handle) and the
/// engine self-corrects on the next tick.
pub trait WindowManipulator {
    /// Bring to front and focus, best effort.
    fn activate(&self, handle: WindowHandle);
    fn set_frame(&self, handle: WindowHandle, rect: Rect);
    fn set_show_state(&self, handle: WindowHandle, state: ShowState);
    /// Posts an asynchronous close request; does not wait for the window
    /// to actually close.
    fn request_close(&self, handle: WindowHandle);
    /// Forcefully terminates a process. Blocking; callers must run this off
    /// the polling context.
    fn terminate_process(&self, pid: u32) -> Result<(), QueryError>;
}
