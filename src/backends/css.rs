use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::Variant;
use crate::config::config_home;
use crate::theme::{HslColor, SLOT_NAMES};

use super::StyleTarget;

/// Static light theme, in [`SLOT_NAMES`] order.
const LIGHT_THEME: [&str; 11] = [
    "0 0% 100%",
    "222 84% 5%",
    "0 0% 100%",
    "222 84% 5%",
    "222 47% 11%",
    "210 40% 98%",
    "210 40% 96%",
    "215 16% 47%",
    "210 40% 96%",
    "222 47% 11%",
    "214 32% 91%",
];

/// Static dark theme, in [`SLOT_NAMES`] order.
const DARK_THEME: [&str; 11] = [
    "222 84% 5%",
    "210 40% 98%",
    "222 84% 5%",
    "210 40% 98%",
    "210 40% 98%",
    "222 47% 11%",
    "217 33% 17%",
    "215 20% 65%",
    "217 33% 17%",
    "210 40% 98%",
    "217 33% 17%",
];

/// Theme variables as a CSS custom-property sheet: a static light or dark
/// base plus whatever overrides have been written on top.
#[derive(Debug, Clone)]
pub struct StyleSheet {
    scheme: Variant,
    overrides: HashMap<String, String>,
}

impl StyleSheet {
    pub fn new(scheme: Variant) -> Self {
        Self {
            scheme,
            overrides: HashMap::new(),
        }
    }

    pub fn scheme(&self) -> Variant {
        self.scheme
    }

    pub fn has_overrides(&self) -> bool {
        !self.overrides.is_empty()
    }

    pub fn override_value(&self, name: &str) -> Option<&str> {
        self.overrides.get(name).map(String::as_str)
    }

    /// Effective value of a variable: the override if set, else the static theme.
    pub fn value(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.override_value(name) {
            return Some(value);
        }
        let base = match self.scheme {
            Variant::Light => &LIGHT_THEME,
            Variant::Dark => &DARK_THEME,
        };
        SLOT_NAMES
            .iter()
            .position(|slot| *slot == name)
            .map(|i| base[i])
    }

    /// Effective value parsed back into a color.
    pub fn color(&self, name: &str) -> Option<HslColor> {
        self.value(name).and_then(HslColor::parse)
    }

    /// Render every variable as a `:root` block.
    pub fn serialize(&self, theme_name: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!("/* {} ({}) */\n", theme_name, self.scheme));
        out.push_str(":root {\n");
        for name in SLOT_NAMES {
            if let Some(value) = self.value(name) {
                out.push_str(&format!("  --{}: {};\n", name, value));
            }
        }
        out.push_str("}\n");
        out
    }

    /// Install the sheet to `$XDG_CONFIG_HOME/covertone/themes/<name>.css`.
    pub fn install(&self, theme_name: &str) -> Result<PathBuf> {
        let dir = config_home().join("themes");
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create themes directory: {}", dir.display()))?;

        let path = dir.join(format!("{}.css", theme_name));
        self.write_to(theme_name, &path)?;
        Ok(path)
    }

    pub fn write_to(&self, theme_name: &str, path: &Path) -> Result<()> {
        let content = self.serialize(theme_name);
        std::fs::write(path, content)
            .with_context(|| format!("failed to write theme to {}", path.display()))?;
        Ok(())
    }
}

impl StyleTarget for StyleSheet {
    fn set_color_scheme(&mut self, variant: Variant) {
        self.scheme = variant;
    }

    fn set_property(&mut self, name: &str, value: &str) {
        self.overrides.insert(name.to_string(), value.to_string());
    }

    fn remove_property(&mut self, name: &str) {
        self.overrides.remove(name);
    }
}
