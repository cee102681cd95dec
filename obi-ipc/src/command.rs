use serde::{Deserialize, Serialize};

/// Screen edge the taskbar strip occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    #[default]
    Right,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    // Taskbar control
    SetSide { side: Side },

    // Window operations (keyed by root handle)
    Activate { handle: u64 },
    CloseWindow { handle: u64 },
    KillWindow { handle: u64 },
    LaunchNew { handle: u64 },

    // Queries
    ListWindows,
    GetState,

    // Control
    Quit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Ok,
    Error { message: String },
    Windows { windows: Vec<WindowInfo> },
    State { state: StateInfo },
}

/// One tracked application, as reported to clients. The `handle` is the
/// root window handle and is the stable key presentation layers use to
/// request reordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowInfo {
    pub handle: u64,
    pub title: String,
    pub active: bool,
    pub child_count: usize,
    pub exe_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateInfo {
    pub side: Side,
    pub taskbar_width: u32,
    pub window_count: usize,
    pub foreground: Option<u64>,
}
