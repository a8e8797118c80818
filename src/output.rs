//! Output file naming and encoding selection.
//!
//! The format argument is used verbatim in the file name
//! (`screenshot.<pid>.<format>`), while the encoding is picked from it
//! case-insensitively. The browser captures PNG, JPEG and WebP natively and
//! prints PDF; the remaining bitmap formats are captured as PNG and
//! transcoded with the `image` crate.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::pnm::{PnmSubtype, SampleEncoding};
use image::{ImageFormat, ImageOutputFormat};

use crate::Result;

/// How a render is encoded before it is written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Webp,
    Pdf,
    /// Captured as PNG, then re-encoded locally.
    Transcoded(Transcode),
    /// Unrecognized extension; PNG bytes are written under the requested name.
    Unknown,
}

impl OutputFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim().to_ascii_lowercase().as_str() {
            "png" => OutputFormat::Png,
            "jpg" | "jpeg" => OutputFormat::Jpeg,
            "webp" => OutputFormat::Webp,
            "pdf" => OutputFormat::Pdf,
            "gif" => OutputFormat::Transcoded(Transcode::Gif),
            "bmp" => OutputFormat::Transcoded(Transcode::Bmp),
            "ppm" => OutputFormat::Transcoded(Transcode::Ppm),
            "tif" | "tiff" => OutputFormat::Transcoded(Transcode::Tiff),
            _ => OutputFormat::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, OutputFormat::Unknown)
    }

    /// Re-encodes a PNG capture when the target format needs it.
    pub fn encode_capture(&self, png: Vec<u8>) -> Result<Vec<u8>> {
        let OutputFormat::Transcoded(target) = self else {
            return Ok(png);
        };
        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png)?;
        // Screenshots are opaque; drop alpha so every writer accepts the buffer.
        let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());
        let mut out = Cursor::new(Vec::new());
        rgb.write_to(&mut out, target.output_format())?;
        Ok(out.into_inner())
    }
}

/// Bitmap formats the browser cannot produce directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transcode {
    Gif,
    Bmp,
    Ppm,
    Tiff,
}

impl Transcode {
    fn output_format(self) -> ImageOutputFormat {
        match self {
            Transcode::Gif => ImageOutputFormat::Gif,
            Transcode::Bmp => ImageOutputFormat::Bmp,
            Transcode::Ppm => {
                ImageOutputFormat::Pnm(PnmSubtype::Pixmap(SampleEncoding::Binary))
            }
            Transcode::Tiff => ImageOutputFormat::Tiff,
        }
    }
}

/// Where and how each render is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTarget {
    pub path: PathBuf,
    pub format: OutputFormat,
}

impl RenderTarget {
    pub fn new(dir: &Path, parent_id: &str, format: &str) -> Self {
        Self {
            path: dir.join(output_file_name(parent_id, format)),
            format: OutputFormat::from_extension(format),
        }
    }

    /// Writes a finished render, replacing whatever the previous render left.
    ///
    /// The bytes go to a hidden sibling file that is then renamed over the
    /// target, so readers see either the old render or the new one.
    pub async fn write(&self, bytes: &[u8]) -> Result<()> {
        let staging = self.staging_path();
        if let Err(err) = tokio::fs::write(&staging, bytes).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(err.into());
        }
        if let Err(err) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(err.into());
        }
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path.with_file_name(format!(".{name}.partial"))
    }
}

pub fn output_file_name(parent_id: &str, format: &str) -> String {
    format!("screenshot.{parent_id}.{format}")
}
