use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use image::imageops::FilterType;

use crate::color::FALLBACK_GRAY;
use crate::config::SamplerSettings;
use crate::error::ExtractError;

/// One decoded pixel of the sampled raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSample {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl PixelSample {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Where image bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// `http://` or `https://` URL, fetched by the sampler.
    Url(String),
    /// Local file.
    Path(PathBuf),
    /// Bytes the caller already fetched.
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Interpret a user-supplied location as a URL or a local path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            ImageSource::Url(location.to_string())
        } else {
            ImageSource::Path(PathBuf::from(location))
        }
    }

    fn describe(&self) -> String {
        match self {
            ImageSource::Url(url) => url.clone(),
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}

/// Flat pixel buffer of the stretched raster.
#[derive(Debug, Clone)]
pub struct SampledImage {
    pub pixels: Vec<PixelSample>,
    /// Set when the image could not be loaded and `pixels` is the gray stand-in.
    pub is_fallback: bool,
}

impl SampledImage {
    /// A raster filled with the opaque fallback gray.
    pub fn fallback(size: u32) -> Self {
        let gray = PixelSample::opaque(FALLBACK_GRAY.r, FALLBACK_GRAY.g, FALLBACK_GRAY.b);
        Self {
            pixels: vec![gray; (size as usize) * (size as usize)],
            is_fallback: true,
        }
    }
}

/// Fetches, decodes and downsamples images under a bounded wait.
#[derive(Debug, Clone)]
pub struct ImageSampler {
    client: reqwest::Client,
    raster_size: u32,
    timeout: Duration,
}

impl ImageSampler {
    pub fn new(settings: &SamplerSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout())
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self {
            client,
            raster_size: settings.raster_size.max(1),
            timeout: settings.timeout(),
        })
    }

    pub fn raster_size(&self) -> u32 {
        self.raster_size
    }

    /// Sample an image, never failing.
    ///
    /// Timeouts, transport errors and undecodable data are logged and yield
    /// a raster of the fallback gray.
    pub async fn sample(&self, source: &ImageSource) -> SampledImage {
        match self.try_sample(source).await {
            Ok(pixels) => SampledImage {
                pixels,
                is_fallback: false,
            },
            Err(e) => {
                log::warn!(
                    "using fallback color for {}: {e}",
                    source.describe()
                );
                SampledImage::fallback(self.raster_size)
            }
        }
    }

    /// Fetch and decode within the configured timeout.
    pub async fn try_sample(&self, source: &ImageSource) -> Result<Vec<PixelSample>, ExtractError> {
        tokio::time::timeout(self.timeout, self.load(source))
            .await
            .map_err(|_| ExtractError::Timeout(self.timeout))?
    }

    async fn load(&self, source: &ImageSource) -> Result<Vec<PixelSample>, ExtractError> {
        let bytes = match source {
            ImageSource::Url(url) => self.fetch(url).await?,
            ImageSource::Path(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| ExtractError::Io {
                        path: path.clone(),
                        source,
                    })?
            }
            ImageSource::Bytes(bytes) => bytes.clone(),
        };

        // Decoding is CPU-bound; keep it off the async worker.
        let size = self.raster_size;
        let pixels = tokio::task::spawn_blocking(move || decode_and_resize(&bytes, size)).await??;
        log::debug!(
            "sampled {} pixels from {}",
            pixels.len(),
            source.describe()
        );
        Ok(pixels)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ExtractError> {
        let network = |source| ExtractError::Network {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url).send().await.map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }
        let bytes = response.bytes().await.map_err(network)?;
        Ok(bytes.to_vec())
    }
}

/// Decode any supported raster format and stretch it to `size`x`size`,
/// ignoring aspect ratio.
pub fn decode_and_resize(bytes: &[u8], size: u32) -> Result<Vec<PixelSample>, ExtractError> {
    let img = image::load_from_memory(bytes)?;
    let img = img.resize_exact(size, size, FilterType::Triangle);
    let rgba = img.to_rgba8();

    Ok(rgba
        .pixels()
        .map(|p| PixelSample {
            r: p[0],
            g: p[1],
            b: p[2],
            a: p[3],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(img: image::RgbaImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn test_sampler(timeout_secs: u64) -> ImageSampler {
        ImageSampler::new(&SamplerSettings {
            raster_size: 16,
            timeout_secs,
            ..SamplerSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn decode_stretches_to_square_raster() {
        let img = image::RgbaImage::from_fn(64, 8, |_, _| image::Rgba([10, 20, 30, 255]));
        let pixels = decode_and_resize(&png_bytes(img), 16).unwrap();
        assert_eq!(pixels.len(), 256);
        assert!(pixels.iter().all(|p| *p == PixelSample::opaque(10, 20, 30)));
    }

    #[test]
    fn decode_keeps_alpha() {
        let img = image::RgbaImage::from_fn(4, 4, |_, _| image::Rgba([200, 0, 0, 0]));
        let pixels = decode_and_resize(&png_bytes(img), 4).unwrap();
        assert!(pixels.iter().all(|p| p.a == 0));
    }

    #[test]
    fn decode_rejects_garbage() {
        let result = decode_and_resize(b"this is not an image", 16);
        assert!(matches!(result, Err(ExtractError::Decode(_))));
    }

    #[test]
    fn parse_distinguishes_urls_from_paths() {
        assert_eq!(
            ImageSource::parse("https://example.com/x.jpg"),
            ImageSource::Url("https://example.com/x.jpg".to_string())
        );
        assert_eq!(
            ImageSource::parse("covers/x.jpg"),
            ImageSource::Path(PathBuf::from("covers/x.jpg"))
        );
    }

    #[tokio::test]
    async fn corrupt_bytes_fall_back_to_gray() {
        let sampler = test_sampler(5);
        let sampled = sampler
            .sample(&ImageSource::Bytes(b"garbage".to_vec()))
            .await;
        assert!(sampled.is_fallback);
        assert_eq!(sampled.pixels.len(), 256);
        assert!(sampled
            .pixels
            .iter()
            .all(|p| *p == PixelSample::opaque(128, 128, 128)));
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_gray() {
        let sampler = test_sampler(5);
        let sampled = sampler
            .sample(&ImageSource::Path(PathBuf::from("/nonexistent/cover.png")))
            .await;
        assert!(sampled.is_fallback);
    }

    #[tokio::test]
    async fn caller_supplied_bytes_are_sampled() {
        let img = image::RgbaImage::from_fn(32, 32, |_, _| image::Rgba([0, 168, 243, 255]));
        let sampler = test_sampler(5);
        let sampled = sampler.sample(&ImageSource::Bytes(png_bytes(img))).await;
        assert!(!sampled.is_fallback);
        assert_eq!(sampled.pixels[0], PixelSample::opaque(0, 168, 243));
    }
}
