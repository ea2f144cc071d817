//! Native window to internal window association.

use indexmap::IndexMap;
use tracing::debug;

use crate::event::{Hwnd, NativeWindow};
use crate::geometry::Geometry;

/// What the core caches about one internal window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRecord {
    pub hwnd: Hwnd,
    pub native: NativeWindow,
    /// Outer rectangle in desktop coordinates.
    pub window_rect: Geometry,
    /// Client rectangle in desktop coordinates.
    pub client_rect: Geometry,
    /// Positioned by an external window manager.
    pub managed: bool,
}

impl WindowRecord {
    pub fn new(hwnd: Hwnd, native: NativeWindow, rect: Geometry) -> Self {
        Self {
            hwnd,
            native,
            window_rect: rect,
            client_rect: rect,
            managed: false,
        }
    }

    pub fn with_client_rect(mut self, client_rect: Geometry) -> Self {
        self.client_rect = client_rect;
        self
    }

    pub fn managed(mut self, managed: bool) -> Self {
        self.managed = managed;
        self
    }

    /// Offset from the window origin to the client origin.
    pub fn client_offset(&self) -> (i32, i32) {
        (
            self.client_rect.x - self.window_rect.x,
            self.client_rect.y - self.window_rect.y,
        )
    }
}

/// Map from native handle to window record.
///
/// The backing table is created on the first registration.
#[derive(Debug, Default)]
pub struct Registry {
    windows: Option<IndexMap<NativeWindow, WindowRecord>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for `record.native`.
    pub fn register(&mut self, record: WindowRecord) -> Option<WindowRecord> {
        debug!("register {} -> {}", record.native, record.hwnd);
        self.windows
            .get_or_insert_with(IndexMap::new)
            .insert(record.native, record)
    }

    pub fn lookup(&self, native: NativeWindow) -> Option<&WindowRecord> {
        self.windows.as_ref()?.get(&native)
    }

    pub fn lookup_mut(&mut self, native: NativeWindow) -> Option<&mut WindowRecord> {
        self.windows.as_mut()?.get_mut(&native)
    }

    pub fn deregister(&mut self, native: NativeWindow) -> Option<WindowRecord> {
        let removed = self.windows.as_mut()?.shift_remove(&native);
        if let Some(record) = &removed {
            debug!("deregister {} ({})", native, record.hwnd);
        }
        removed
    }

    /// Native handle currently associated with `hwnd`.
    pub fn native_of(&self, hwnd: Hwnd) -> Option<NativeWindow> {
        self.records().find(|r| r.hwnd == hwnd).map(|r| r.native)
    }

    pub fn contains_hwnd(&self, hwnd: Hwnd) -> bool {
        self.native_of(hwnd).is_some()
    }

    pub fn records(&self) -> impl Iterator<Item = &WindowRecord> {
        self.windows.iter().flat_map(|w| w.values())
    }

    pub fn len(&self) -> usize {
        self.windows.as_ref().map_or(0, IndexMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
