mod logger;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use covertone::applier::{ThemeApplier, ThemeMode};
use covertone::backends::{StyleSheet, StyleTarget};
use covertone::cli::{Args, Command, Precision, Variant};
use covertone::config::Settings;
use covertone::preferences::FilePreferenceStore;
use covertone::service::{ColorService, NoopColorCache, UnboundedColorCache};
use covertone::theme::SemanticPalette;
use covertone::tui::{self, PreviewApp};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?;
    logger::setup_logger(&settings.logging, args.verbose)?;

    match args.command {
        Command::Extract { source, precision } => run_extract(&settings, &source, precision).await,
        Command::Theme {
            source,
            variant,
            precision,
            output,
            install,
        } => run_theme(&settings, &source, variant, precision, output, install).await,
        Command::Backfill { list, concurrency } => {
            run_backfill(&settings, &list, concurrency).await
        }
        Command::Preview { source, precision } => run_preview(&settings, source, precision).await,
    }
}

async fn run_extract(settings: &Settings, source: &str, precision: Precision) -> Result<()> {
    let service = ColorService::from_settings(&settings.sampler, precision, Arc::new(NoopColorCache))?;
    match service.extract_color(source).await {
        Some(hex) => {
            println!("{hex}");
            Ok(())
        }
        None => bail!("no color could be extracted from {source}"),
    }
}

async fn run_theme(
    settings: &Settings,
    source: &str,
    variant: Option<Variant>,
    precision: Precision,
    output: Option<PathBuf>,
    install: Option<String>,
) -> Result<()> {
    let variant = variant.unwrap_or(settings.appearance.system_variant);
    let service = ColorService::from_settings(&settings.sampler, precision, Arc::new(NoopColorCache))?;

    let Some(extraction) = service.resolve(source, &CancellationToken::new()).await else {
        bail!("extraction of {source} was cancelled");
    };
    if extraction.is_fallback {
        log::warn!("{source} could not be loaded; theming from the fallback gray");
    }

    let palette = SemanticPalette::synthesize(extraction.color, variant);
    let mut sheet = StyleSheet::new(variant);
    for (name, value) in palette.entries() {
        sheet.set_property(name, &value.to_string());
    }

    let name = install.clone().unwrap_or_else(|| theme_name(source));
    if install.is_some() {
        let path = sheet.install(&name)?;
        eprintln!("installed theme '{}' to {}", name, path.display());
    } else if let Some(path) = output {
        sheet.write_to(&name, &path)?;
        eprintln!("wrote theme to {}", path.display());
    } else {
        print!("{}", sheet.serialize(&name));
    }
    Ok(())
}

async fn run_backfill(settings: &Settings, list: &Path, concurrency: Option<usize>) -> Result<()> {
    let content = tokio::fs::read_to_string(list)
        .await
        .with_context(|| format!("failed to read {}", list.display()))?;
    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    let concurrency = concurrency.unwrap_or(settings.backfill.concurrency).max(1);
    log::info!("backfilling {} images, {} at a time", urls.len(), concurrency);

    // Repeated URLs in one list share the cache.
    let service = ColorService::from_settings(
        &settings.sampler,
        Precision::Thorough,
        Arc::new(UnboundedColorCache::new()),
    )?;
    let service = &service;

    let mut results = stream::iter(urls)
        .map(|url| async move {
            let hex = service.extract_color(&url).await;
            (url, hex)
        })
        .buffered(concurrency);

    let (mut extracted, mut skipped) = (0usize, 0usize);
    while let Some((url, hex)) = results.next().await {
        match hex {
            Some(hex) => {
                println!("{url}\t{hex}");
                extracted += 1;
            }
            None => {
                log::warn!("skipping {url}: no color extracted");
                skipped += 1;
            }
        }
    }

    log::info!("backfill finished: {extracted} extracted, {skipped} skipped");
    Ok(())
}

async fn run_preview(settings: &Settings, source: String, precision: Precision) -> Result<()> {
    let system = settings.appearance.system_variant;
    let service = ColorService::from_settings(
        &settings.sampler,
        precision,
        Arc::new(UnboundedColorCache::new()),
    )?;

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };
    let extraction = service.resolve(&source, &cancel).await;
    watcher.abort();

    let store = FilePreferenceStore::new(settings.preferences.resolved_path());
    let mut applier = ThemeApplier::new(store, StyleSheet::new(system), system, ThemeMode::System);
    if !applier.apply_extraction(extraction, &cancel) {
        eprintln!("extraction cancelled");
        return Ok(());
    }

    let app = PreviewApp::new(applier, source, system);
    tokio::task::spawn_blocking(move || tui::run(app))
        .await
        .context("preview task failed")?
}

/// Theme name from the last path segment of an image location, minus extension.
fn theme_name(source: &str) -> String {
    let last = source
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(source);
    let last = last.split(['?', '#']).next().unwrap_or(last);
    match Path::new(last).file_stem().and_then(|s| s.to_str()) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => "cover".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_name_from_url_and_path() {
        assert_eq!(theme_name("https://cdn.example/art/album.jpg?size=600"), "album");
        assert_eq!(theme_name("/home/me/covers/night-drive.png"), "night-drive");
        assert_eq!(theme_name(""), "cover");
    }
}
