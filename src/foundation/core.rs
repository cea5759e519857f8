use std::fmt;

use crate::foundation::error::{BannerError, BannerResult};

/// Output canvas size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Canvas dimensions as the `u16` pair the rasterizer expects.
    pub fn to_u16(self) -> BannerResult<(u16, u16)> {
        let w = self
            .width
            .try_into()
            .map_err(|_| BannerError::validation("canvas width exceeds u16"))?;
        let h = self
            .height
            .try_into()
            .map_err(|_| BannerError::validation("canvas height exceeds u16"))?;
        Ok((w, h))
    }
}

/// One of the two output shapes rendered per record.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Square post image.
    Feed,
    /// Tall story image.
    Story,
}

impl Variant {
    /// Both variants in render order.
    pub const ALL: [Variant; 2] = [Variant::Feed, Variant::Story];

    /// Lowercase token used in file names and template locators.
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Feed => "feed",
            Variant::Story => "story",
        }
    }

    /// Subdirectory name inside a grouped namespace.
    pub fn dir_name(self) -> &'static str {
        match self {
            Variant::Feed => "Feed",
            Variant::Story => "Story",
        }
    }

    /// Fixed canvas for the variant.
    pub fn canvas(self) -> Canvas {
        match self {
            Variant::Feed => Canvas {
                width: 1080,
                height: 1080,
            },
            Variant::Story => Canvas {
                width: 1080,
                height: 1920,
            },
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Rgba8 = Rgba8::opaque(0, 0, 0);
    pub const WHITE: Rgba8 = Rgba8::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Horizontal alignment of a text field relative to its anchor x.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// Left edge of a run of `width` pixels anchored at `x`.
    pub fn left_edge(self, x: f64, width: f64) -> f64 {
        match self {
            TextAlign::Left => x,
            TextAlign::Center => x - width / 2.0,
            TextAlign::Right => x - width,
        }
    }
}

/// Convert premultiplied RGBA8 pixels back to straight alpha in place.
pub fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

/// Replace every run of whitespace in `s` with `join`.
pub fn collapse_whitespace(s: &str, join: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(join)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
