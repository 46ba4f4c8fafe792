//! Win32 window enumeration, geometry and activation.

use super::WindowInfo;
use autocast_core::{Rect, WindowHandle};
use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;
use std::ptr;
use tracing::{debug, warn};
use windows_sys::Win32::Foundation::{CloseHandle, BOOL, HWND, LPARAM, RECT, TRUE};
use windows_sys::Win32::System::ProcessStatus::GetModuleBaseNameW;
use windows_sys::Win32::System::Threading::{
    OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ,
};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetForegroundWindow, GetWindowRect as WinGetWindowRect, GetWindowTextLengthW,
    GetWindowTextW, GetWindowThreadProcessId, IsIconic, IsWindow, IsWindowVisible,
    SetForegroundWindow, ShowWindow, SW_RESTORE,
};

pub fn get_foreground_window() -> Option<WindowInfo> {
    let hwnd = unsafe { GetForegroundWindow() };
    if hwnd.is_null() {
        return None;
    }
    get_window_info(hwnd as usize)
}

pub fn list_windows() -> Vec<WindowInfo> {
    let mut windows: Vec<WindowInfo> = Vec::new();

    unsafe {
        EnumWindows(
            Some(enum_window_callback),
            &mut windows as *mut Vec<WindowInfo> as LPARAM,
        );
    }

    windows
}

unsafe extern "system" fn enum_window_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let windows = &mut *(lparam as *mut Vec<WindowInfo>);

    if IsWindowVisible(hwnd) == 0 || GetWindowTextLengthW(hwnd) == 0 {
        return TRUE;
    }

    if let Some(info) = get_window_info(hwnd as usize) {
        windows.push(info);
    }

    TRUE
}

fn get_window_info(handle: usize) -> Option<WindowInfo> {
    let hwnd = handle as HWND;
    let title = window_title(hwnd)?;

    let mut pid: u32 = 0;
    unsafe { GetWindowThreadProcessId(hwnd, &mut pid) };

    Some(WindowInfo {
        handle: WindowHandle(handle),
        title,
        process_name: get_process_name(pid).unwrap_or_default(),
        pid,
        rect: get_window_rect(handle).unwrap_or_default(),
        visible: unsafe { IsWindowVisible(hwnd) } != 0,
    })
}

fn window_title(hwnd: HWND) -> Option<String> {
    unsafe {
        let title_len = GetWindowTextLengthW(hwnd);
        if title_len == 0 {
            return None;
        }

        let mut buf: Vec<u16> = vec![0; (title_len + 1) as usize];
        let copied = GetWindowTextW(hwnd, buf.as_mut_ptr(), buf.len() as i32);
        if copied == 0 {
            return None;
        }
        buf.truncate(copied as usize);
        Some(OsString::from_wide(&buf).to_string_lossy().into_owned())
    }
}

fn get_process_name(pid: u32) -> Option<String> {
    unsafe {
        let handle = OpenProcess(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, 0, pid);
        if handle.is_null() {
            return None;
        }

        let mut name_buf: Vec<u16> = vec![0; 260];
        let len = GetModuleBaseNameW(
            handle,
            ptr::null_mut(),
            name_buf.as_mut_ptr(),
            name_buf.len() as u32,
        );
        CloseHandle(handle);

        if len == 0 {
            return None;
        }

        name_buf.truncate(len as usize);
        Some(OsString::from_wide(&name_buf).to_string_lossy().into_owned())
    }
}

pub fn get_window_rect(handle: usize) -> Option<Rect> {
    let hwnd = handle as HWND;
    let mut rect: RECT = unsafe { std::mem::zeroed() };

    if unsafe { WinGetWindowRect(hwnd, &mut rect) } == 0 {
        return None;
    }

    Some(Rect::new(
        rect.left,
        rect.top,
        rect.right - rect.left,
        rect.bottom - rect.top,
    ))
}

/// The handle still names a window and that window is visible.
pub fn is_window_valid(handle: usize) -> bool {
    let hwnd = handle as HWND;
    unsafe { IsWindow(hwnd) != 0 && IsWindowVisible(hwnd) != 0 }
}

pub fn activate_window(handle: usize) {
    let hwnd = handle as HWND;
    unsafe {
        if GetForegroundWindow() == hwnd {
            return;
        }
        if IsIconic(hwnd) != 0 {
            ShowWindow(hwnd, SW_RESTORE);
        }
        if SetForegroundWindow(hwnd) == 0 {
            warn!(handle = %WindowHandle(handle), "SetForegroundWindow refused");
        } else {
            debug!(handle = %WindowHandle(handle), "activated window");
        }
    }
}
