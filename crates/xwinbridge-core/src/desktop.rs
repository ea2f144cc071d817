//! Desktop background painting.
//!
//! The desktop keeps a pattern brush and an optional wallpaper. On an erase
//! request it fills the pattern wherever the wallpaper leaves a gap, then
//! tiles or centres the wallpaper. Pixels are produced by a
//! [`PaintSurface`]; this module only decides what goes where.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::bitmap::{load_wallpaper, Brush, Wallpaper};
use crate::config::{Profile, NO_VALUE};
use crate::geometry::Geometry;

const SECTION: &str = "desktop";

/// Drawing target for the desktop.
pub trait PaintSurface {
    fn fill_rect(&mut self, rect: Geometry, brush: &Brush);

    /// Copy the whole wallpaper with its top-left corner at `(x, y)`.
    fn blit(&mut self, wallpaper: &Wallpaper, x: i32, y: i32);
}

/// Where a new wallpaper comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WallpaperSource {
    /// The `WallPaper` profile key.
    Configured,
    File(PathBuf),
}

/// Where a new pattern comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSource {
    /// The `Pattern` profile key.
    Configured,
    Pattern(String),
}

#[derive(Debug, Default)]
pub struct Desktop {
    pattern: Brush,
    wallpaper: Option<Wallpaper>,
    tile: bool,
    windows_dir: Option<PathBuf>,
}

impl Desktop {
    /// Desktop with pattern and wallpaper read from `profile`.
    pub fn new(profile: &dyn Profile, windows_dir: Option<PathBuf>) -> Self {
        let mut desktop = Self {
            windows_dir,
            ..Self::default()
        };
        desktop.set_pattern(PatternSource::Configured, profile);
        desktop.set_wallpaper(WallpaperSource::Configured, profile);
        desktop
    }

    pub fn set_pattern(&mut self, source: PatternSource, profile: &dyn Profile) {
        let pattern = match source {
            PatternSource::Configured => profile.profile_string(SECTION, "Pattern", NO_VALUE),
            PatternSource::Pattern(pattern) => pattern,
        };
        self.pattern = Brush::from_pattern(&pattern);
        debug!("Desktop pattern {:?}", self.pattern);
    }

    /// Replace the wallpaper. The old one is dropped even when the new file
    /// fails to load.
    pub fn set_wallpaper(&mut self, source: WallpaperSource, profile: &dyn Profile) {
        let path = match source {
            WallpaperSource::Configured => {
                PathBuf::from(profile.profile_string(SECTION, "WallPaper", NO_VALUE))
            },
            WallpaperSource::File(path) => path,
        };

        self.wallpaper = None;
        self.wallpaper = load_wallpaper(&path, self.windows_dir.as_deref());
        self.tile = profile.profile_int(SECTION, "TileWallPaper", 0) != 0;

        match &self.wallpaper {
            Some(w) => info!(
                "Wallpaper {:?} {}x{} ({})",
                path,
                w.width,
                w.height,
                if self.tile { "tiled" } else { "centered" }
            ),
            None => debug!("No wallpaper"),
        }
    }

    pub fn wallpaper(&self) -> Option<&Wallpaper> {
        self.wallpaper.as_ref()
    }

    pub fn pattern(&self) -> &Brush {
        &self.pattern
    }

    pub fn is_tiled(&self) -> bool {
        self.tile
    }

    pub fn windows_dir(&self) -> Option<&Path> {
        self.windows_dir.as_deref()
    }

    /// Handle an erase request for the desktop client area.
    ///
    /// When the desktop is the real root window the server paints it and
    /// nothing is drawn. Always reports the background as erased.
    pub fn erase_background(
        &self,
        on_root: bool,
        client: Geometry,
        surface: &mut dyn PaintSurface,
    ) -> bool {
        if on_root {
            return true;
        }
        self.paint(client, surface)
    }

    /// Paint the background regardless of where the desktop lives.
    pub fn paint(&self, client: Geometry, surface: &mut dyn PaintSurface) -> bool {
        let covered = self.wallpaper.as_ref().is_some_and(|w| {
            self.tile
                || (i64::from(w.width) >= i64::from(client.right())
                    && i64::from(w.height) >= i64::from(client.bottom()))
        });
        if !covered {
            surface.fill_rect(client, &self.pattern);
        }

        let Some(wallpaper) = &self.wallpaper else {
            return true;
        };
        let (bw, bh) = (wallpaper.width as i32, wallpaper.height as i32);

        if self.tile {
            let mut y = 0;
            while y < client.bottom() {
                let mut x = 0;
                while x < client.right() {
                    surface.blit(wallpaper, x, y);
                    x += bw;
                }
                y += bh;
            }
        } else {
            let x = ((client.x + client.right() - bw) / 2).max(0);
            let y = ((client.y + client.bottom() - bh) / 2).max(0);
            surface.blit(wallpaper, x, y);
        }
        true
    }
}
