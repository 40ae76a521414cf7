use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use serde::{Deserialize, Serialize};

/// Extract dominant colors from cover art and build light/dark themes from them.
#[derive(Parser, Debug)]
#[command(name = "covertone", version, about)]
pub struct Args {
    /// Configuration file (defaults to $XDG_CONFIG_HOME/covertone/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the dominant color of an image as #RRGGBB
    Extract {
        /// Image URL or local path
        source: String,

        #[arg(short, long, value_enum, default_value_t = Precision::Thorough)]
        precision: Precision,
    },

    /// Print the theme variables derived from an image
    Theme {
        /// Image URL or local path
        source: String,

        /// Palette variant (defaults to the configured system variant)
        #[arg(long, value_enum)]
        variant: Option<Variant>,

        #[arg(short, long, value_enum, default_value_t = Precision::Thorough)]
        precision: Precision,

        /// Write the stylesheet to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Install the stylesheet as a named theme under ~/.config/covertone/themes/
        #[arg(long, value_name = "NAME", conflicts_with = "output")]
        install: Option<String>,
    },

    /// Extract colors for a list of image URLs, one per line
    Backfill {
        /// File containing image URLs
        list: PathBuf,

        /// Number of extractions in flight at once
        #[arg(short, long)]
        concurrency: Option<usize>,
    },

    /// Interactive preview of the static and dynamic themes
    Preview {
        /// Image URL or local path
        source: String,

        #[arg(short, long, value_enum, default_value_t = Precision::Fast)]
        precision: Precision,
    },
}

/// How much work the dominant color selector spends on an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Precision {
    /// Coarse buckets, raw frequency. Used for live previews.
    Fast,
    /// Fine buckets with weighted scoring. The value that gets persisted.
    Thorough,
}

/// Light or dark branch of palette derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Dark,
    Light,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Dark => "dark",
            Variant::Light => "light",
        }
    }

    /// Parse the persisted form, `"dark"` or `"light"`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "dark" => Some(Variant::Dark),
            "light" => Some(Variant::Light),
            _ => None,
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_parse_accepts_persisted_values() {
        assert_eq!(Variant::parse("dark"), Some(Variant::Dark));
        assert_eq!(Variant::parse("light\n"), Some(Variant::Light));
        assert_eq!(Variant::parse("Dark"), None);
        assert_eq!(Variant::parse(""), None);
    }

    #[test]
    fn theme_subcommand_parses() {
        let args = Args::try_parse_from([
            "covertone",
            "theme",
            "https://example.com/a.jpg",
            "--variant",
            "light",
            "-p",
            "fast",
        ])
        .unwrap();
        match args.command {
            Command::Theme {
                variant, precision, ..
            } => {
                assert_eq!(variant, Some(Variant::Light));
                assert_eq!(precision, Precision::Fast);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn install_conflicts_with_output() {
        let result = Args::try_parse_from([
            "covertone",
            "theme",
            "cover.png",
            "--output",
            "out.css",
            "--install",
            "mine",
        ]);
        assert!(result.is_err());
    }
}
