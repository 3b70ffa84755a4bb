//! PNG export of cached texture content, used by the debug dump paths.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("png encoding failed: {0}")]
    Png(#[from] png::EncodingError),

    #[error("texture has no decoded content")]
    Empty,
}

/// An inclusive texel region of a texture, in texture coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Region {
    pub u_min: u32,
    pub u_max: u32,
    pub v_min: u32,
    pub v_max: u32,
}

impl Region {
    pub fn new(u_min: u32, u_max: u32, v_min: u32, v_max: u32) -> Self {
        Self { u_min, u_max, v_min, v_max }
    }

    pub fn width(self) -> u32 {
        self.u_max - self.u_min + 1
    }

    pub fn height(self) -> u32 {
        self.v_max - self.v_min + 1
    }
}

/// Where texture dumps go and how hard the encoder should try to shrink them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DumpConfig {
    pub directory: PathBuf,
    /// 0 is fastest, 9 the smallest output.
    pub compression: u32,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("texdumps"),
            compression: 1,
        }
    }
}

fn compression_level(level: u32) -> png::Compression {
    match level {
        0 => png::Compression::Fastest,
        1..=3 => png::Compression::Fast,
        4..=6 => png::Compression::Balanced,
        _ => png::Compression::High,
    }
}

/// Write an RGBA image. `pitch` is the source row stride in bytes, which may
/// exceed `width * 4`.
pub fn save_png(
    path: &Path,
    pixels: &[u8],
    width: u32,
    height: u32,
    pitch: usize,
    compression: u32,
) -> Result<(), DumpError> {
    let file = BufWriter::new(File::create(path)?);

    let mut encoder = png::Encoder::new(file, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(compression_level(compression));

    let mut writer = encoder.write_header()?;

    let row = width as usize * 4;
    if pitch == row {
        writer.write_image_data(&pixels[..row * height as usize])?;
    } else {
        let mut packed = Vec::with_capacity(row * height as usize);
        for y in 0..height as usize {
            packed.extend_from_slice(&pixels[y * pitch..y * pitch + row]);
        }
        writer.write_image_data(&packed)?;
    }

    writer.finish()?;
    Ok(())
}

/// Rescale the alpha channel of an RGBA buffer to the full 0-255 range.
///
/// The GS modulate formula is `2 * vertexAlpha * textureAlpha`, and lots of
/// games bake a factor of 0.5 into their textures, leaving everything half
/// transparent when viewed directly. Returns the original maximum alpha so the
/// caller can record the range the image was expanded from: 255 means the
/// buffer was left untouched, 0 means the channel looked unused and was forced
/// opaque.
pub fn expand_alpha_channel(pixels: &mut [u8]) -> u8 {
    let max_alpha = pixels
        .iter()
        .skip(3)
        .step_by(4)
        .fold(0, |max, &a| u8::max(max, a));

    if max_alpha == 255 {
        return 255;
    }

    if max_alpha == 0 {
        for alpha in pixels.iter_mut().skip(3).step_by(4) {
            *alpha = 255;
        }
        return 0;
    }

    // Fixed point for a = round(a * 255 / max_alpha).
    let f = (256 * 255) / max_alpha as u32;
    for alpha in pixels.iter_mut().skip(3).step_by(4) {
        *alpha = ((f * *alpha as u32 + 128) >> 8) as u8;
    }

    max_alpha
}
