//! Decoded texture payloads.
//!
//! [`TextureData`] is what the resource loader hands to the texture table:
//! dimensions, a [`TextureFormat`] and optionally the texel bytes. Textures
//! without bytes are render attachments that the GPU fills itself.

use std::borrow::Cow;

use anyhow::*;
use image::{GenericImageView, ImageFormat, load_from_memory_with_format};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Red,
    Rgb,
    Rgba,
    Rgba16F,
    Rgba32F,
    Depth,
}

impl TextureFormat {
    pub fn to_wgpu(self) -> wgpu::TextureFormat {
        match self {
            TextureFormat::Red => wgpu::TextureFormat::R8Unorm,
            // There is no three channel format on the device side, rgb data is
            // widened on upload.
            TextureFormat::Rgb | TextureFormat::Rgba => wgpu::TextureFormat::Rgba8Unorm,
            TextureFormat::Rgba16F => wgpu::TextureFormat::Rgba16Float,
            TextureFormat::Rgba32F => wgpu::TextureFormat::Rgba32Float,
            TextureFormat::Depth => wgpu::TextureFormat::Depth32Float,
        }
    }

    /// Bytes per texel in the CPU-side payload.
    pub fn bytes_per_texel(self) -> u32 {
        match self {
            TextureFormat::Red => 1,
            TextureFormat::Rgb => 3,
            TextureFormat::Rgba => 4,
            TextureFormat::Rgba16F => 8,
            TextureFormat::Rgba32F => 16,
            TextureFormat::Depth => 4,
        }
    }

    /// Whether shaders can read the texture through the bindless array.
    pub fn is_sampleable(self) -> bool {
        !matches!(self, TextureFormat::Depth)
    }

    pub fn is_depth(self) -> bool {
        matches!(self, TextureFormat::Depth)
    }

    /// Stable integer id used in the shader-visible texture records.
    pub fn id(self) -> u32 {
        match self {
            TextureFormat::Red => 0,
            TextureFormat::Rgb => 1,
            TextureFormat::Rgba => 2,
            TextureFormat::Rgba16F => 3,
            TextureFormat::Rgba32F => 4,
            TextureFormat::Depth => 5,
        }
    }
}

impl std::fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TextureFormat::Red => "RED",
            TextureFormat::Rgb => "RGB",
            TextureFormat::Rgba => "RGBA",
            TextureFormat::Rgba16F => "RGBA16F",
            TextureFormat::Rgba32F => "RGBA32F",
            TextureFormat::Depth => "DEPTH",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub data: Option<Vec<u8>>,
}

impl TextureData {
    /// An attachment-style texture without initial contents.
    pub fn empty(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            width,
            height,
            format,
            data: None,
        }
    }

    /// A single-texel texture, handy as a neutral default for materials.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            format: TextureFormat::Rgba,
            data: Some(rgba.to_vec()),
        }
    }

    /// Decode raw image file contents (PNG, JPEG, ...).
    ///
    /// `format` is an optional extension hint (e.g. "png"); without it the
    /// format is guessed from the bytes.
    pub fn from_bytes(bytes: &[u8], format: Option<&str>) -> Result<Self> {
        let img = match format {
            None => image::load_from_memory(bytes)?,
            Some(fmt) => {
                let fmt = ImageFormat::from_extension(fmt)
                    .with_context(|| format!("unknown image format {fmt}"))?;
                load_from_memory_with_format(bytes, fmt)?
            }
        };
        Ok(Self::from_image(&img))
    }

    pub fn from_image(img: &image::DynamicImage) -> Self {
        let (width, height) = img.dimensions();
        let (format, data) = match img.color().channel_count() {
            1 => (TextureFormat::Red, img.to_luma8().into_raw()),
            3 => (TextureFormat::Rgb, img.to_rgb8().into_raw()),
            _ => (TextureFormat::Rgba, img.to_rgba8().into_raw()),
        };
        Self {
            width,
            height,
            format,
            data: Some(data),
        }
    }

    /// Texel bytes in the layout the device expects.
    ///
    /// Rgb payloads are widened to rgba with an opaque alpha channel.
    pub fn upload_bytes(&self) -> Option<Cow<'_, [u8]>> {
        let data = self.data.as_deref()?;
        let expected = self.width as usize * self.height as usize * self.format.bytes_per_texel() as usize;
        crate::require!(
            data.len() == expected,
            "texture payload is {} bytes, {}x{} {} needs {}",
            data.len(),
            self.width,
            self.height,
            self.format,
            expected
        );
        match self.format {
            TextureFormat::Rgb => Some(Cow::Owned(
                data.chunks_exact(3)
                    .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
                    .collect(),
            )),
            _ => Some(Cow::Borrowed(data)),
        }
    }

    /// Bytes per row of [`Self::upload_bytes`].
    pub fn upload_row_bytes(&self) -> u32 {
        let per_texel = match self.format {
            TextureFormat::Rgb => 4,
            format => format.bytes_per_texel(),
        };
        per_texel * self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_payload_is_widened_to_rgba() {
        let data = TextureData {
            width: 2,
            height: 1,
            format: TextureFormat::Rgb,
            data: Some(vec![1, 2, 3, 4, 5, 6]),
        };
        let bytes = data.upload_bytes().expect("payload");
        assert_eq!(&*bytes, &[1, 2, 3, 255, 4, 5, 6, 255]);
        assert_eq!(data.upload_row_bytes(), 8);
    }

    #[test]
    fn attachments_have_no_payload() {
        let data = TextureData::empty(4, 4, TextureFormat::Depth);
        assert!(data.upload_bytes().is_none());
        assert!(!data.format.is_sampleable());
    }

    #[test]
    #[should_panic(expected = "texture payload")]
    fn short_payload_is_fatal() {
        let data = TextureData {
            width: 2,
            height: 2,
            format: TextureFormat::Rgba,
            data: Some(vec![0; 4]),
        };
        let _ = data.upload_bytes();
    }
}
