//! Applies dynamic palettes to a live style system and remembers which
//! light/dark branch dynamic mode should use.

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::backends::StyleTarget;
use crate::cli::Variant;
use crate::color::Color;
use crate::preferences::PreferenceStore;
use crate::service::Extraction;
use crate::theme::{SemanticPalette, SLOT_NAMES};

/// Preference key holding the variant dynamic mode renders with.
pub const VARIANT_KEY: &str = "dynamic-theme.variant";

/// The user's theme selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
    /// Follow the platform preference.
    System,
    /// Derive the palette from the current cover art.
    Dynamic,
}

pub struct ThemeApplier<P, T> {
    store: P,
    target: T,
    mode: ThemeMode,
    system: Variant,
    dominant: Option<Color>,
    palette: Option<SemanticPalette>,
}

impl<P: PreferenceStore, T: StyleTarget> ThemeApplier<P, T> {
    /// Start in `mode` without capturing anything.
    ///
    /// Use this to restore a mode saved from an earlier session: a restored
    /// dynamic mode reads the persisted variant like any later activation.
    pub fn new(store: P, target: T, system: Variant, mode: ThemeMode) -> Self {
        let mut applier = Self {
            store,
            target,
            mode,
            system,
            dominant: None,
            palette: None,
        };
        applier.refresh();
        applier
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn dominant_color(&self) -> Option<Color> {
        self.dominant
    }

    /// The palette currently written to the target, if dynamic mode is showing one.
    pub fn palette(&self) -> Option<&SemanticPalette> {
        self.palette.as_ref()
    }

    /// Switch modes.
    ///
    /// Entering dynamic mode from any other mode persists whichever variant
    /// was showing at that moment.
    pub fn set_mode(&mut self, mode: ThemeMode) -> Result<()> {
        if mode == ThemeMode::Dynamic && self.mode != ThemeMode::Dynamic {
            let captured = self.active_variant();
            self.store.set(VARIANT_KEY, captured.as_str())?;
            log::info!("dynamic theme will use the {captured} variant");
        }
        self.mode = mode;
        self.refresh();
        Ok(())
    }

    /// Update the platform preference, as when the OS switches appearance.
    pub fn set_system_variant(&mut self, variant: Variant) {
        self.system = variant;
        self.refresh();
    }

    pub fn set_dominant_color(&mut self, color: Option<Color>) {
        self.dominant = color;
        self.refresh();
    }

    /// Feed a finished extraction in, unless the caller abandoned it.
    ///
    /// Returns whether anything was applied.
    pub fn apply_extraction(
        &mut self,
        extraction: Option<Extraction>,
        cancel: &CancellationToken,
    ) -> bool {
        if cancel.is_cancelled() {
            log::debug!("extraction abandoned; palette left unchanged");
            return false;
        }
        match extraction {
            Some(extraction) => {
                self.set_dominant_color(Some(extraction.color));
                true
            }
            None => false,
        }
    }

    /// Variant dynamic mode renders with: the persisted choice, else the platform's.
    pub fn dynamic_variant(&self) -> Variant {
        self.store
            .get(VARIANT_KEY)
            .and_then(|value| Variant::parse(&value))
            .unwrap_or(self.system)
    }

    /// Light/dark resolution currently in effect.
    pub fn active_variant(&self) -> Variant {
        match self.mode {
            ThemeMode::Light => Variant::Light,
            ThemeMode::Dark => Variant::Dark,
            ThemeMode::System => self.system,
            ThemeMode::Dynamic => self.dynamic_variant(),
        }
    }

    fn refresh(&mut self) {
        let variant = self.active_variant();
        self.target.set_color_scheme(variant);

        match (self.mode, self.dominant) {
            (ThemeMode::Dynamic, Some(color)) => {
                let palette = SemanticPalette::synthesize(color, variant);
                for (name, value) in palette.entries() {
                    self.target.set_property(name, &value.to_string());
                }
                self.palette = Some(palette);
            }
            _ => {
                for name in SLOT_NAMES {
                    self.target.remove_property(name);
                }
                self.palette = None;
            }
        }
    }
}
