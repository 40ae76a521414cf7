//! Dominant-color extraction from cover art and adaptive light/dark theming.
//!
//! The pipeline is [`pipeline::ImageSampler`] → [`pipeline::ColorHistogram`]
//! → [`pipeline::select`] → [`theme::SemanticPalette`] →
//! [`applier::ThemeApplier`], with [`service::ColorService`] adding a URL
//! cache, request de-duplication and cancellation on top.

pub mod applier;
pub mod backends;
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod preferences;
pub mod service;
pub mod theme;
pub mod tui;

pub use service::extract_color;
