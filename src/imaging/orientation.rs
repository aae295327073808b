//! EXIF orientation.
//!
//! Cameras store pixels in sensor order and record how to display them in
//! tag 0x0112. Every EXIF value is reachable as "turn clockwise by N quarter
//! turns, then optionally mirror left-right":
//!
//! ```text
//! tag  turns  mirror   EXIF name
//!  1     0     no      top-left (upright)
//!  2     0     yes     top-right
//!  3     2     no      bottom-right
//!  4     2     yes     bottom-left      (180° + mirror = vertical flip)
//!  5     1     yes     left-top         (90° + mirror = transpose)
//!  6     1     no      right-top
//!  7     3     yes     right-bottom     (270° + mirror = transverse)
//!  8     3     no      left-bottom
//! ```
//!
//! Orientation is resolved once at decode, so resize math always sees the
//! upright dimensions.

use image::DynamicImage;

/// Display fix-up for one orientation tag value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation {
    quarter_turns: u8,
    mirror: bool,
}

impl Orientation {
    pub const UPRIGHT: Self = Self {
        quarter_turns: 0,
        mirror: false,
    };

    /// Map a raw tag value; anything outside 1-8 is `None`.
    pub fn from_tag(value: u32) -> Option<Self> {
        let (quarter_turns, mirror) = match value {
            1 => (0, false),
            2 => (0, true),
            3 => (2, false),
            4 => (2, true),
            5 => (1, true),
            6 => (1, false),
            7 => (3, true),
            8 => (3, false),
            _ => return None,
        };
        Some(Self {
            quarter_turns,
            mirror,
        })
    }

    /// Odd quarter turns exchange width and height.
    pub fn swaps_dimensions(self) -> bool {
        self.quarter_turns % 2 == 1
    }
}

/// Orientation recorded in an encoded image's EXIF block.
///
/// `None` for containers without EXIF (most PNG, GIF, BMP), a missing tag, or
/// an out-of-range value.
pub fn read_orientation(data: &[u8]) -> Option<Orientation> {
    let exif = exif::Reader::new()
        .read_from_container(&mut std::io::Cursor::new(data))
        .ok()?;
    let tag = exif
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)?
        .value
        .get_uint(0)?;
    Orientation::from_tag(tag)
}

pub fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    let turned = match orientation.quarter_turns {
        1 => img.rotate90(),
        2 => img.rotate180(),
        3 => img.rotate270(),
        _ => img,
    };
    if orientation.mirror {
        turned.fliph()
    } else {
        turned
    }
}
