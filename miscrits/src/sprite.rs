//! CDN addressing, cache filenames and the canvas/resize rules the game's
//! image cache expects.

use image::imageops::{self, FilterType};
use image::{GenericImageView, RgbaImage};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::{AVATAR_SIZE, CANVAS_SIZE, CDN_BASE_URL, ICON_BASE_URL};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SpriteError {
    #[error("could not decode image: {0}")]
    Decode(String),
    #[error("could not write image: {0}")]
    Write(String),
}

fn slug(name: &str) -> String {
    name.replace(' ', "_").to_lowercase()
}

pub fn sprite_cdn_url(name: &str) -> String {
    format!("{CDN_BASE_URL}/miscrits/{}_back.png", slug(name))
}

pub fn avatar_cdn_url(name: &str) -> String {
    format!("{CDN_BASE_URL}/avatars/{}_avatar.png", slug(name))
}

pub fn element_icon_url(element: &str) -> String {
    let slug = element.trim().to_lowercase().replace(' ', "");
    if slug.is_empty() {
        return String::new();
    }
    format!("{ICON_BASE_URL}/{slug}.png")
}

/// The game caches each CDN file under the SHA-256 of its URL.
pub fn cache_filename(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

/// What the catalog shows about a CDN sprite.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteInfo {
    pub url: String,
    pub cache_name: String,
    pub size: Option<(u32, u32)>,
}

impl SpriteInfo {
    pub fn new(url: String, size: Option<(u32, u32)>) -> Self {
        let cache_name = cache_filename(&url);
        Self {
            url,
            cache_name,
            size,
        }
    }

    pub fn size_label(&self) -> String {
        match self.size {
            Some((w, h)) => format!("{w}x{h}"),
            None => "unavailable".to_string(),
        }
    }
}

pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

pub fn place_on_canvas(img: &RgbaImage, canvas: (u32, u32)) -> RgbaImage {
    let mut out = RgbaImage::new(canvas.0, canvas.1);
    let x = (i64::from(canvas.0) - i64::from(img.width())) / 2;
    let y = (i64::from(canvas.1) - i64::from(img.height())) / 2;
    imageops::overlay(&mut out, img, x, y);
    out
}

/// Shrinks to fit (never enlarges) and centers. Undecodable input gives an
/// empty canvas.
pub fn fit_on_canvas(bytes: &[u8], canvas: (u32, u32)) -> RgbaImage {
    let Ok(img) = image::load_from_memory(bytes) else {
        return RgbaImage::new(canvas.0, canvas.1);
    };
    let img = if img.width() > canvas.0 || img.height() > canvas.1 {
        img.resize(canvas.0, canvas.1, FilterType::Lanczos3)
    } else {
        img
    };
    place_on_canvas(&img.to_rgba8(), canvas)
}

pub fn image_size(bytes: &[u8]) -> Result<(u32, u32), SpriteError> {
    image::load_from_memory(bytes)
        .map(|img| img.dimensions())
        .map_err(|err| SpriteError::Decode(err.to_string()))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditMode {
    #[default]
    Sprite,
    Avatar,
}

impl EditMode {
    pub fn toggle(self) -> Self {
        match self {
            EditMode::Sprite => EditMode::Avatar,
            EditMode::Avatar => EditMode::Sprite,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EditMode::Sprite => "Sprite",
            EditMode::Avatar => "Avatar",
        }
    }

    pub fn file_part(self) -> &'static str {
        match self {
            EditMode::Sprite => "sprite",
            EditMode::Avatar => "avatar",
        }
    }

    pub fn cdn_url(self, name: &str) -> String {
        match self {
            EditMode::Sprite => sprite_cdn_url(name),
            EditMode::Avatar => avatar_cdn_url(name),
        }
    }
}

const MIN_SCALE_TENTHS: u8 = 5;
const MAX_SCALE_TENTHS: u8 = 20;

/// Sprite resize settings. Scale is kept in tenths so it steps exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResizePlan {
    pub scale_tenths: u8,
    pub keep_aspect: bool,
}

impl Default for ResizePlan {
    fn default() -> Self {
        Self {
            scale_tenths: 10,
            keep_aspect: true,
        }
    }
}

impl ResizePlan {
    pub fn scale(&self) -> f64 {
        f64::from(self.scale_tenths) / 10.0
    }

    pub fn step(&mut self, delta: i8) {
        let next = i16::from(self.scale_tenths) + i16::from(delta);
        self.scale_tenths =
            next.clamp(i16::from(MIN_SCALE_TENTHS), i16::from(MAX_SCALE_TENTHS)) as u8;
    }

    pub fn reset(&mut self) {
        self.scale_tenths = 10;
    }

    /// Target size for an upload of `upload` size replacing an original of
    /// `original` size.
    pub fn target_size(&self, original: (u32, u32), upload: (u32, u32)) -> (u32, u32) {
        let scale = self.scale();
        let (w, h) = if self.keep_aspect && upload.1 > 0 {
            let aspect = f64::from(upload.0) / f64::from(upload.1);
            let h = (f64::from(original.1) * scale) as u32;
            (((f64::from(h)) * aspect) as u32, h)
        } else {
            (
                (f64::from(original.0) * scale) as u32,
                (f64::from(original.1) * scale) as u32,
            )
        };
        (w.max(1), h.max(1))
    }
}

/// Decodes an upload and sizes it for `mode`.
pub fn resize_upload(
    bytes: &[u8],
    mode: EditMode,
    plan: ResizePlan,
    original: (u32, u32),
) -> Result<RgbaImage, SpriteError> {
    let img = image::load_from_memory(bytes).map_err(|err| SpriteError::Decode(err.to_string()))?;
    let (w, h) = match mode {
        EditMode::Avatar => AVATAR_SIZE,
        EditMode::Sprite => plan.target_size(original, img.dimensions()),
    };
    Ok(imageops::resize(&img.to_rgba8(), w, h, FilterType::Lanczos3))
}

pub fn preview_canvas(mode: EditMode) -> (u32, u32) {
    match mode {
        EditMode::Sprite => CANVAS_SIZE,
        EditMode::Avatar => (128, 128),
    }
}
