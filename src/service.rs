//! URL-keyed extraction with caching, request de-duplication and cancellation.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use anyhow::Result;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::cli::Precision;
use crate::color::Color;
use crate::config::SamplerSettings;
use crate::error::ExtractError;
use crate::pipeline::{self, ImageSampler, ImageSource};

/// Result of running the pipeline on one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extraction {
    pub color: Color,
    /// The image could not be loaded and `color` is the fallback gray.
    pub is_fallback: bool,
}

/// Storage for extracted colors keyed by image URL.
pub trait ColorCache: Send + Sync {
    fn get(&self, url: &str) -> Option<Color>;

    fn set(&self, url: &str, color: Color);
}

/// Process-wide cache with no eviction. A URL is never recomputed once stored.
///
/// Entries are plain values, so a lock poisoned by a panicking writer is
/// recovered and keeps serving.
#[derive(Debug, Default)]
pub struct UnboundedColorCache {
    entries: RwLock<HashMap<String, Color>>,
}

impl UnboundedColorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ColorCache for UnboundedColorCache {
    fn get(&self, url: &str) -> Option<Color> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .copied()
    }

    fn set(&self, url: &str, color: Color) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), color);
    }
}

/// Cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopColorCache;

impl ColorCache for NoopColorCache {
    fn get(&self, _url: &str) -> Option<Color> {
        None
    }

    fn set(&self, _url: &str, _color: Color) {}
}

type InFlight = Mutex<HashMap<String, watch::Receiver<Option<Extraction>>>>;

/// Removes a URL from the in-flight table when its leader finishes or is dropped.
struct InFlightGuard<'a> {
    table: &'a InFlight,
    url: &'a str,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut table) = self.table.lock() {
            table.remove(self.url);
        }
    }
}

enum Role {
    Leader(watch::Sender<Option<Extraction>>),
    Follower(watch::Receiver<Option<Extraction>>),
}

/// Extracts dominant colors at one precision, caching results by URL.
///
/// Concurrent requests for the same URL share a single extraction. If the
/// leading request is abandoned, the ones waiting on it run their own.
/// Fallback results are returned but never cached.
pub struct ColorService {
    sampler: ImageSampler,
    precision: Precision,
    cache: Arc<dyn ColorCache>,
    in_flight: InFlight,
}

impl fmt::Debug for ColorService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let in_flight = self.in_flight.lock().map(|t| t.len()).unwrap_or(0);
        f.debug_struct("ColorService")
            .field("sampler", &self.sampler)
            .field("precision", &self.precision)
            .field("in_flight_requests", &in_flight)
            .finish()
    }
}

impl ColorService {
    pub fn new(sampler: ImageSampler, precision: Precision, cache: Arc<dyn ColorCache>) -> Self {
        Self {
            sampler,
            precision,
            cache,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_settings(
        settings: &SamplerSettings,
        precision: Precision,
        cache: Arc<dyn ColorCache>,
    ) -> Result<Self> {
        Ok(Self::new(ImageSampler::new(settings)?, precision, cache))
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Dominant color for an image URL or local path.
    ///
    /// Returns `None` only when `cancel` fired; in that case nothing was cached.
    pub async fn resolve(&self, url: &str, cancel: &CancellationToken) -> Option<Extraction> {
        if cancel.is_cancelled() {
            return None;
        }
        if let Some(color) = self.cache.get(url) {
            log::debug!("cache hit for {url}");
            return Some(Extraction {
                color,
                is_fallback: false,
            });
        }

        let role = match self.in_flight.lock() {
            Ok(mut table) => match table.get(url) {
                Some(rx) => Some(Role::Follower(rx.clone())),
                None => {
                    let (tx, rx) = watch::channel(None);
                    table.insert(url.to_string(), rx);
                    Some(Role::Leader(tx))
                }
            },
            Err(_) => None,
        };
        // A poisoned table only loses de-duplication.
        let Some(role) = role else {
            return self.compute(url, cancel).await;
        };

        match role {
            Role::Leader(tx) => {
                let _guard = InFlightGuard {
                    table: &self.in_flight,
                    url,
                };
                let result = self.compute(url, cancel).await;
                if result.is_some() {
                    tx.send_replace(result);
                }
                result
            }
            Role::Follower(mut rx) => {
                let shared = tokio::select! {
                    _ = cancel.cancelled() => return None,
                    shared = rx.wait_for(Option::is_some) => shared.ok().and_then(|value| *value),
                };
                if shared.is_some() {
                    return shared;
                }
                log::debug!("in-flight extraction of {url} was abandoned; retrying");
                self.compute(url, cancel).await
            }
        }
    }

    /// Run the pipeline for `url`, writing the cache unless cancelled or fallen back.
    async fn compute(&self, url: &str, cancel: &CancellationToken) -> Option<Extraction> {
        let source = ImageSource::parse(url);
        let sampled = tokio::select! {
            _ = cancel.cancelled() => {
                log::debug!("{url}: {}", ExtractError::Cancelled);
                return None;
            }
            sampled = self.sampler.sample(&source) => sampled,
        };

        let color = pipeline::dominant_color(&sampled.pixels, self.precision);
        if cancel.is_cancelled() {
            log::debug!("{url}: {}", ExtractError::Cancelled);
            return None;
        }

        if !sampled.is_fallback {
            log::info!("extracted {color} from {url}");
            self.cache.set(url, color);
        }
        Some(Extraction {
            color,
            is_fallback: sampled.is_fallback,
        })
    }

    /// Extract from bytes the caller already holds. Not cached.
    pub async fn extract_bytes(&self, bytes: Vec<u8>) -> Extraction {
        let sampled = self.sampler.sample(&ImageSource::Bytes(bytes)).await;
        Extraction {
            color: pipeline::dominant_color(&sampled.pixels, self.precision),
            is_fallback: sampled.is_fallback,
        }
    }

    /// Color for a catalog record: the stored value when it parses,
    /// otherwise a fresh extraction from the record's image.
    pub async fn color_for_record(
        &self,
        stored: Option<&str>,
        image_url: &str,
        cancel: &CancellationToken,
    ) -> Option<Extraction> {
        if let Some(stored) = stored {
            match Color::from_hex(stored) {
                Some(color) => {
                    return Some(Extraction {
                        color,
                        is_fallback: false,
                    })
                }
                None => log::warn!(
                    "{}; re-extracting from {image_url}",
                    ExtractError::InvalidHex(stored.to_string())
                ),
            }
        }
        self.resolve(image_url, cancel).await
    }

    /// Hex string for persistence, or `None` when the image could not be loaded.
    pub async fn extract_color(&self, image_url: &str) -> Option<String> {
        let extraction = self.resolve(image_url, &CancellationToken::new()).await?;
        if extraction.is_fallback {
            None
        } else {
            Some(extraction.color.to_hex())
        }
    }
}

/// Authoritative dominant color of an image as `#RRGGBB`, or `None`.
///
/// Never panics or errors: any failure is logged and reported as `None`
/// within the default bounded wait.
///
/// Every call builds its own HTTP client and caches nothing. Batch callers
/// should hold one [`ColorService`] and use [`ColorService::extract_color`],
/// which reuses the client and de-duplicates repeated URLs.
pub async fn extract_color(image_url: &str) -> Option<String> {
    let service = match ColorService::from_settings(
        &SamplerSettings::default(),
        Precision::Thorough,
        Arc::new(NoopColorCache),
    ) {
        Ok(service) => service,
        Err(e) => {
            log::warn!("cannot extract {image_url}: {e:#}");
            return None;
        }
    };
    service.extract_color(image_url).await
}
