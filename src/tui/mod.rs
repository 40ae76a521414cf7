pub mod widgets;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;

use crate::applier::{ThemeApplier, ThemeMode};
use crate::backends::StyleSheet;
use crate::cli::Variant;
use crate::preferences::PreferenceStore;

use widgets::PaletteWidget;

/// State for the interactive preview.
pub struct PreviewApp<P> {
    pub applier: ThemeApplier<P, StyleSheet>,
    pub source: String,
    pub status: Option<String>,
    system: Variant,
}

impl<P: PreferenceStore> PreviewApp<P> {
    pub fn new(applier: ThemeApplier<P, StyleSheet>, source: String, system: Variant) -> Self {
        Self {
            applier,
            source,
            status: None,
            system,
        }
    }

    fn title(&self) -> String {
        let color = self
            .applier
            .dominant_color()
            .map(|c| c.to_hex())
            .unwrap_or_else(|| "none".to_string());
        format!(
            " {} | {:?} ({}) | dominant {} ",
            self.source,
            self.applier.mode(),
            self.applier.active_variant(),
            color
        )
    }

    /// Apply one key press. Returns `false` when the preview should close.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mode = match code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Char('l') => ThemeMode::Light,
            KeyCode::Char('d') => ThemeMode::Dark,
            KeyCode::Char('s') => ThemeMode::System,
            KeyCode::Char('y') => ThemeMode::Dynamic,
            KeyCode::Char('t') => {
                self.system = match self.system {
                    Variant::Dark => Variant::Light,
                    Variant::Light => Variant::Dark,
                };
                self.applier.set_system_variant(self.system);
                self.status = Some(format!("system appearance is now {}", self.system));
                return true;
            }
            _ => return true,
        };

        self.status = match self.applier.set_mode(mode) {
            Ok(()) => None,
            Err(e) => {
                log::warn!("failed to switch theme mode: {e:#}");
                Some(format!("could not save preference: {e}"))
            }
        };
        true
    }
}

/// Launch the preview and block until the user quits.
pub fn run<P: PreferenceStore>(mut app: PreviewApp<P>) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut app);
    ratatui::restore();
    result
}

fn event_loop<P: PreferenceStore>(terminal: &mut DefaultTerminal, app: &mut PreviewApp<P>) -> Result<()> {
    loop {
        let title = app.title();
        terminal.draw(|frame| {
            let widget = PaletteWidget::new(app.applier.target(), title, app.status.as_deref());
            frame.render_widget(widget, frame.area());
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && !app.handle_key(key.code) {
                return Ok(());
            }
        }
    }
}
