//! Win32 implementations of the platform traits. Thin boundary code: every
//! call is best-effort and failures degrade to "window omitted this tick".

use std::path::PathBuf;

use windows::core::PWSTR;
use windows::Win32::Foundation::{
    CloseHandle, BOOL, E_ACCESSDENIED, HWND, LPARAM, RECT, TRUE, WPARAM,
};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO, MONITORINFOF_PRIMARY,
};
use windows::Win32::System::Threading::{
    OpenProcess, QueryFullProcessImageNameW, TerminateProcess, PROCESS_NAME_WIN32,
    PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_TERMINATE,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetForegroundWindow, GetShellWindow, GetWindow, GetWindowInfo, GetWindowTextW,
    GetWindowThreadProcessId, IsIconic, IsWindow, IsZoomed, PostMessageW, SetForegroundWindow,
    SetWindowPos, ShowWindow, SwitchToThisWindow, GW_OWNER, SWP_NOACTIVATE, SWP_NOZORDER,
    SW_RESTORE, SW_SHOWMAXIMIZED, SW_SHOWMINIMIZED, SW_SHOWNORMAL, WINDOWINFO, WINDOW_EX_STYLE,
    WINDOW_STYLE, WM_CLOSE, WS_CHILD, WS_EX_APPWINDOW, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW,
    WS_POPUP, WS_VISIBLE,
};

use crate::core::{ExStyleFlags, Rect, StyleFlags};
use crate::platform::{
    QueryError, ScreenInfo, ShowState, WindowAttributes, WindowHandle, WindowManipulator,
    WindowSystem,
};

fn to_hwnd(handle: WindowHandle) -> HWND {
    HWND(handle as usize as *mut core::ffi::c_void)
}

fn to_handle(hwnd: HWND) -> WindowHandle {
    hwnd.0 as usize as u64
}

fn rect_from(r: RECT) -> Rect {
    Rect {
        x: r.left,
        y: r.top,
        width: (r.right - r.left).max(0) as u32,
        height: (r.bottom - r.top).max(0) as u32,
    }
}

fn map_style(style: WINDOW_STYLE) -> StyleFlags {
    let mut flags = StyleFlags::empty();
    if style.contains(WS_VISIBLE) {
        flags |= StyleFlags::VISIBLE;
    }
    if style.contains(WS_POPUP) {
        flags |= StyleFlags::POPUP;
    }
    if style.contains(WS_CHILD) {
        flags |= StyleFlags::CHILD;
    }
    flags
}

fn map_ex_style(ex_style: WINDOW_EX_STYLE) -> ExStyleFlags {
    let mut flags = ExStyleFlags::empty();
    if ex_style.contains(WS_EX_APPWINDOW) {
        flags |= ExStyleFlags::APP_WINDOW;
    }
    if ex_style.contains(WS_EX_TOOLWINDOW) {
        flags |= ExStyleFlags::TOOL_WINDOW;
    }
    if ex_style.contains(WS_EX_NOACTIVATE) {
        flags |= ExStyleFlags::NO_ACTIVATE;
    }
    flags
}

fn map_os_error(err: windows::core::Error) -> QueryError {
    if err.code() == E_ACCESSDENIED {
        QueryError::AccessDenied
    } else {
        QueryError::Gone
    }
}

/// Win32 implementation of WindowSystem
#[derive(Clone, Copy, Default)]
pub struct Win32WindowSystem;

impl WindowSystem for Win32WindowSystem {
    fn enumerate_windows(&self) -> Vec<WindowHandle> {
        unsafe extern "system" fn enum_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
            let handles = &mut *(lparam.0 as *mut Vec<WindowHandle>);
            handles.push(to_handle(hwnd));
            TRUE
        }

        let mut handles: Vec<WindowHandle> = Vec::new();
        unsafe {
            if let Err(e) = EnumWindows(
                Some(enum_proc),
                LPARAM(&mut handles as *mut _ as isize),
            ) {
                tracing::warn!("EnumWindows failed: {}", e);
            }
        }
        handles
    }

    fn window_attributes(&self, handle: WindowHandle) -> Option<WindowAttributes> {
        let hwnd = to_hwnd(handle);
        unsafe {
            if !IsWindow(Some(hwnd)).as_bool() {
                return None;
            }

            let mut wi = WINDOWINFO {
                cbSize: std::mem::size_of::<WINDOWINFO>() as u32,
                ..Default::default()
            };
            GetWindowInfo(hwnd, &mut wi).ok()?;

            let mut pid = 0u32;
            GetWindowThreadProcessId(hwnd, Some(&mut pid));

            let mut buf = [0u16; 512];
            let len = GetWindowTextW(hwnd, &mut buf);
            let title = if len > 0 {
                String::from_utf16_lossy(&buf[..len as usize])
            } else {
                String::new()
            };

            Some(WindowAttributes {
                title,
                style: map_style(wi.dwStyle),
                ex_style: map_ex_style(wi.dwExStyle),
                rect: rect_from(wi.rcWindow),
                pid,
            })
        }
    }

    fn owner(&self, handle: WindowHandle) -> Option<WindowHandle> {
        unsafe {
            GetWindow(to_hwnd(handle), GW_OWNER)
                .ok()
                .filter(|h| !h.is_invalid())
                .map(to_handle)
        }
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        let hwnd = unsafe { GetForegroundWindow() };
        (!hwnd.is_invalid()).then(|| to_handle(hwnd))
    }

    fn shell_window(&self) -> Option<WindowHandle> {
        let hwnd = unsafe { GetShellWindow() };
        (!hwnd.is_invalid()).then(|| to_handle(hwnd))
    }

    fn is_maximized(&self, handle: WindowHandle) -> bool {
        unsafe { IsZoomed(to_hwnd(handle)).as_bool() }
    }

    fn process_image_path(&self, pid: u32) -> Result<PathBuf, QueryError> {
        unsafe {
            let process = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid)
                .map_err(map_os_error)?;

            let mut buf = [0u16; 1024];
            let mut len = buf.len() as u32;
            let result = QueryFullProcessImageNameW(
                process,
                PROCESS_NAME_WIN32,
                PWSTR(buf.as_mut_ptr()),
                &mut len,
            );
            let _ = CloseHandle(process);

            result.map_err(map_os_error)?;
            Ok(PathBuf::from(String::from_utf16_lossy(
                &buf[..len as usize],
            )))
        }
    }

    fn all_screens(&self) -> Vec<ScreenInfo> {
        unsafe extern "system" fn monitor_proc(
            hmonitor: HMONITOR,
            _hdc: HDC,
            _rect: *mut RECT,
            lparam: LPARAM,
        ) -> BOOL {
            let screens = &mut *(lparam.0 as *mut Vec<ScreenInfo>);
            let mut info = MONITORINFO {
                cbSize: std::mem::size_of::<MONITORINFO>() as u32,
                ..Default::default()
            };
            if GetMonitorInfoW(hmonitor, &mut info).as_bool() {
                screens.push(ScreenInfo {
                    index: screens.len(),
                    bounds: rect_from(info.rcMonitor),
                    is_primary: (info.dwFlags & MONITORINFOF_PRIMARY) != 0,
                });
            }
            TRUE
        }

        let mut screens: Vec<ScreenInfo> = Vec::new();
        unsafe {
            let _ = EnumDisplayMonitors(
                None,
                None,
                Some(monitor_proc),
                LPARAM(&mut screens as *mut _ as isize),
            );
        }
        screens
    }
}

/// Win32 implementation of WindowManipulator
#[derive(Clone, Copy, Default)]
pub struct Win32WindowManipulator;

impl WindowManipulator for Win32WindowManipulator {
    fn activate(&self, handle: WindowHandle) {
        let hwnd = to_hwnd(handle);
        unsafe {
            // A minimized window needs a restore first or it stays iconic
            // behind the focus change.
            if IsIconic(hwnd).as_bool() {
                let _ = ShowWindow(hwnd, SW_RESTORE);
            }
            SwitchToThisWindow(hwnd, true);
            if !SetForegroundWindow(hwnd).as_bool() {
                tracing::debug!("OS refused foreground change for [{}]", handle);
            }
        }
    }

    fn set_frame(&self, handle: WindowHandle, rect: Rect) {
        unsafe {
            if let Err(e) = SetWindowPos(
                to_hwnd(handle),
                None,
                rect.x,
                rect.y,
                rect.width as i32,
                rect.height as i32,
                SWP_NOZORDER | SWP_NOACTIVATE,
            ) {
                tracing::warn!("SetWindowPos failed for [{}]: {}", handle, e);
            }
        }
    }

    fn set_show_state(&self, handle: WindowHandle, state: ShowState) {
        let cmd = match state {
            ShowState::Normal => SW_SHOWNORMAL,
            ShowState::Minimized => SW_SHOWMINIMIZED,
            ShowState::Maximized => SW_SHOWMAXIMIZED,
            ShowState::Restore => SW_RESTORE,
        };
        unsafe {
            let _ = ShowWindow(to_hwnd(handle), cmd);
        }
    }

    fn request_close(&self, handle: WindowHandle) {
        unsafe {
            if let Err(e) = PostMessageW(Some(to_hwnd(handle)), WM_CLOSE, WPARAM(0), LPARAM(0)) {
                tracing::warn!("Failed to post close request to [{}]: {}", handle, e);
            }
        }
    }

    fn terminate_process(&self, pid: u32) -> Result<(), QueryError> {
        unsafe {
            let process = OpenProcess(PROCESS_TERMINATE, false, pid).map_err(map_os_error)?;
            let result = TerminateProcess(process, 1);
            let _ = CloseHandle(process);
            result.map_err(map_os_error)
        }
    }
}
