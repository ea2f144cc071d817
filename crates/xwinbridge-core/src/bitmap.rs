//! Wallpaper bitmaps and pattern brushes.

use std::fs;
use std::path::Path;

use image::{ImageFormat, RgbaImage};
use tracing::{debug, warn};

/// A decoded wallpaper bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct Wallpaper {
    pub image: RgbaImage,
    /// Logical size, never zero.
    pub width: u32,
    pub height: u32,
}

impl Wallpaper {
    pub fn new(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            image,
            width: width.max(1),
            height: height.max(1),
        }
    }
}

/// System colours a solid brush can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemColor {
    Background,
}

/// How the desktop background is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Brush {
    Solid(SystemColor),
    /// 8x8 monochrome pattern, one row per entry.
    Pattern([u16; 8]),
}

impl Default for Brush {
    fn default() -> Self {
        Self::Solid(SystemColor::Background)
    }
}

impl Brush {
    /// Parse up to eight leading integers from a profile string.
    ///
    /// Rows that are not given are zero. A string without a single leading
    /// integer selects the solid background colour.
    pub fn from_pattern(pattern: &str) -> Self {
        let mut rows = [0u16; 8];
        let mut rest = pattern;
        let mut parsed = 0;

        while parsed < rows.len() {
            match scan_int(rest) {
                Some((value, tail)) => {
                    rows[parsed] = value as u16;
                    rest = tail;
                    parsed += 1;
                },
                None => break,
            }
        }

        // an empty string counts as unset, not as an all-zero pattern
        if parsed == 0 {
            Self::Solid(SystemColor::Background)
        } else {
            Self::Pattern(rows)
        }
    }
}

/// Read one optionally signed decimal integer after leading whitespace.
fn scan_int(input: &str) -> Option<(i64, &str)> {
    let trimmed = input.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    if end == digits_start {
        return None;
    }

    let (number, tail) = trimmed.split_at(end);
    let negative = number.starts_with('-');
    let magnitude = number[digits_start..]
        .bytes()
        .fold(0i64, |acc, d| acc.wrapping_mul(10).wrapping_add(i64::from(d - b'0')));
    Some((if negative { -magnitude } else { magnitude }, tail))
}

const BMP_MAGIC: &[u8; 2] = b"BM";

/// Load a wallpaper file.
///
/// A name that cannot be read is retried relative to `windows_dir`. Any
/// failure yields `None`.
pub fn load_wallpaper(name: &Path, windows_dir: Option<&Path>) -> Option<Wallpaper> {
    let data = match fs::read(name) {
        Ok(data) => data,
        Err(_) => {
            let fallback = windows_dir?.join(name);
            match fs::read(&fallback) {
                Ok(data) => data,
                Err(e) => {
                    debug!("No wallpaper at {:?}: {}", name, e);
                    return None;
                },
            }
        },
    };

    if data.len() < 6 || &data[..2] != BMP_MAGIC {
        warn!("Wallpaper {:?} is not a bitmap file", name);
        return None;
    }
    let declared = u32::from_le_bytes([data[2], data[3], data[4], data[5]]);
    if (data.len() as u64) < u64::from(declared) {
        warn!(
            "Wallpaper {:?} is truncated ({} of {} bytes)",
            name,
            data.len(),
            declared
        );
        return None;
    }

    match image::load_from_memory_with_format(&data, ImageFormat::Bmp) {
        Ok(decoded) => Some(Wallpaper::new(decoded.to_rgba8())),
        Err(e) => {
            warn!("Failed to decode wallpaper {:?}: {}", name, e);
            None
        },
    }
}
