// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: page images, decoded textures and sheet surfaces

use crate::error::{FlipbookError, Result};
use crate::geometry::Face;
use crate::types::Color;
use base64::Engine;
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Handle to one rasterized page, as a URL or `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageImage {
    /// Location of the bitmap
    pub source: String,
}

impl PageImage {
    /// Wrap a source string.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// `true` when the source embeds its payload.
    pub fn is_data_url(&self) -> bool {
        self.source.starts_with("data:")
    }
}

/// Decoded RGBA bitmap shared between sheets.
#[derive(Debug, Clone)]
pub struct PageTexture {
    /// Pixel data
    pub image: Arc<RgbaImage>,
}

impl PageTexture {
    /// Wrap an owned bitmap.
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    /// Nearest-neighbour sample at normalized `(u, v)`, `v = 1` at the top.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 {
            return Color::WHITE;
        }
        let x = ((u.clamp(0.0, 1.0) * w as f32) as u32).min(w - 1);
        let y = (((1.0 - v.clamp(0.0, 1.0)) * h as f32) as u32).min(h - 1);
        let Rgba([r, g, b, a]) = *self.image.get_pixel(x, y);
        Color { r, g, b, a }
    }
}

/// Deterministic stand-in for absent or undecodable pages: 1x1 white.
pub fn placeholder_texture() -> PageTexture {
    PageTexture::from_image(RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255])))
}

/// Decode a base64 `data:` URL into a texture.
pub fn decode_data_url(url: &str) -> Result<PageTexture> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| FlipbookError::DataUrl("missing data: prefix".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| FlipbookError::DataUrl("missing payload separator".into()))?;
    if !meta.ends_with(";base64") {
        return Err(FlipbookError::DataUrl(format!("unsupported encoding `{meta}`")));
    }
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
    decode_bytes(&bytes)
}

/// Decode an encoded bitmap (PNG, JPEG, ...) into a texture.
pub fn decode_bytes(bytes: &[u8]) -> Result<PageTexture> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    Ok(PageTexture::from_image(image))
}

/// Turns page sources into textures. Implemented by hosts that fetch URLs.
pub trait TextureLoader {
    /// Resolve one page image.
    fn load(&self, image: &PageImage) -> Result<PageTexture>;
}

/// Loader that only understands embedded `data:` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlLoader;

impl TextureLoader for DataUrlLoader {
    fn load(&self, image: &PageImage) -> Result<PageTexture> {
        if image.is_data_url() {
            decode_data_url(&image.source)
        } else {
            Err(FlipbookError::Unsupported("fetching remote page images"))
        }
    }
}

/// Textures for one document, decoded once before sheets are built.
#[derive(Debug, Clone)]
pub struct TextureCache {
    textures: HashMap<PageImage, PageTexture>,
    placeholder: PageTexture,
}

impl Default for TextureCache {
    fn default() -> Self {
        Self {
            textures: HashMap::new(),
            placeholder: placeholder_texture(),
        }
    }
}

impl TextureCache {
    /// Decode every distinct image. Failures fall back to the placeholder.
    pub fn decode_all(images: &[PageImage], loader: &dyn TextureLoader) -> Self {
        let mut cache = Self::default();
        for image in images {
            if cache.textures.contains_key(image) {
                continue;
            }
            match loader.load(image) {
                Ok(texture) => {
                    cache.textures.insert(image.clone(), texture);
                }
                Err(err) => {
                    log::warn!("page image decode failed, using placeholder: {err}");
                }
            }
        }
        cache
    }

    /// Texture for an image, or the placeholder when absent.
    pub fn get(&self, image: Option<&PageImage>) -> &PageTexture {
        image
            .and_then(|img| self.textures.get(img))
            .unwrap_or(&self.placeholder)
    }

    /// Number of decoded textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// `true` when nothing decoded.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// What a face of a sheet shows.
#[derive(Debug, Clone)]
pub enum Surface {
    /// Flat color
    Solid(Color),
    /// Image mapped with the face's uvs
    Texture(PageTexture),
}

impl Surface {
    /// Color at a uv coordinate.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        match self {
            Surface::Solid(c) => *c,
            Surface::Texture(t) => t.sample(u, v),
        }
    }
}

/// Surfaces of the six faces of a sheet, in [`Face::ALL`] order.
#[derive(Debug, Clone)]
pub struct SheetSurfaces {
    /// One surface per face
    pub faces: [Surface; 6],
}

impl SheetSurfaces {
    /// White paper edges, a dark spine edge, and the two page images.
    pub fn new(front: PageTexture, back: PageTexture) -> Self {
        Self {
            faces: [
                Surface::Solid(Color::WHITE),
                Surface::Solid(Color::EDGE),
                Surface::Solid(Color::WHITE),
                Surface::Solid(Color::WHITE),
                Surface::Texture(front),
                Surface::Texture(back),
            ],
        }
    }

    /// Surface for a face.
    pub fn face(&self, face: Face) -> &Surface {
        let idx = Face::ALL.iter().position(|f| *f == face).unwrap_or(0);
        &self.faces[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_png_url() -> String {
        let img = image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255])));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(bytes.into_inner())
        )
    }

    #[test]
    fn decodes_png_data_url() {
        let tex = decode_data_url(&red_png_url()).unwrap();
        assert_eq!(tex.image.dimensions(), (2, 2));
        let c = tex.sample(0.5, 0.5);
        assert_eq!(c.r, 255);
        assert_eq!(c.b, 0);
    }

    #[test]
    fn rejects_non_base64_data_url() {
        assert!(matches!(
            decode_data_url("data:text/plain,hello"),
            Err(FlipbookError::DataUrl(_))
        ));
        assert!(decode_data_url("https://example.com/p.png").is_err());
    }

    #[test]
    fn cache_falls_back_to_placeholder() {
        let images = vec![
            PageImage::new(red_png_url()),
            PageImage::new("https://example.com/remote.png"),
        ];
        let cache = TextureCache::decode_all(&images, &DataUrlLoader);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(Some(&images[1])).sample(0.0, 0.0), Color::WHITE);
        assert_eq!(cache.get(None).sample(0.3, 0.7), Color::WHITE);
        assert_eq!(cache.get(Some(&images[0])).sample(0.0, 0.0).r, 255);
    }

    #[test]
    fn sheet_surfaces_layout() {
        let s = SheetSurfaces::new(placeholder_texture(), placeholder_texture());
        assert!(matches!(s.face(Face::EdgeLeft), Surface::Solid(c) if *c == Color::EDGE));
        assert!(matches!(s.face(Face::Back), Surface::Texture(_)));
    }
}
