use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::backends::StyleSheet;
use crate::color::Color as AppColor;
use crate::theme::{HslColor, SLOT_NAMES};

/// Surface each text slot is drawn on, for the contrast column.
const TEXT_ON: [(&str, &str); 5] = [
    ("foreground", "background"),
    ("card-foreground", "card"),
    ("primary-foreground", "primary"),
    ("muted-foreground", "muted"),
    ("accent-foreground", "accent"),
];

/// Renders every theme variable of a [`StyleSheet`] as a colored swatch with
/// its value, plus the contrast of each text slot against its surface.
pub struct PaletteWidget<'a> {
    sheet: &'a StyleSheet,
    title: String,
    status: Option<&'a str>,
}

impl<'a> PaletteWidget<'a> {
    pub fn new(sheet: &'a StyleSheet, title: String, status: Option<&'a str>) -> Self {
        Self {
            sheet,
            title,
            status,
        }
    }
}

fn to_color(c: AppColor) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

fn slot_rgb(sheet: &StyleSheet, name: &str) -> Option<AppColor> {
    sheet.color(name).map(HslColor::to_rgb)
}

/// Choose black or white foreground for readable text on the given background.
fn contrast_fg(c: AppColor) -> Color {
    if c.relative_luminance() > 0.4 {
        Color::Black
    } else {
        Color::White
    }
}

fn contrast_note(sheet: &StyleSheet, name: &str) -> Option<String> {
    let (_, surface) = TEXT_ON.iter().find(|(text, _)| *text == name)?;
    let text = slot_rgb(sheet, name)?;
    let surface_rgb = slot_rgb(sheet, surface)?;
    let ratio = AppColor::contrast_ratio(&text, &surface_rgb);
    Some(format!("{ratio:>5.1}:1 on {surface}"))
}

fn build_slot_row(sheet: &StyleSheet, name: &'static str) -> Line<'static> {
    let value = sheet.value(name).unwrap_or("?").to_string();
    let swatch = match slot_rgb(sheet, name) {
        Some(rgb) => Span::styled(
            format!("{:^8}", if sheet.override_value(name).is_some() { "dyn" } else { "" }),
            Style::default().bg(to_color(rgb)).fg(contrast_fg(rgb)),
        ),
        None => Span::raw(format!("{:^8}", "--")),
    };

    let mut spans = vec![
        Span::raw("  "),
        swatch,
        Span::raw(format!("  {:<20}{:<14}", name, value)),
    ];
    if let Some(note) = contrast_note(sheet, name) {
        spans.push(Span::styled(note, Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

impl Widget for PaletteWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut block = Block::bordered().title(self.title);
        if let (Some(bg), Some(fg)) = (
            slot_rgb(self.sheet, "background"),
            slot_rgb(self.sheet, "foreground"),
        ) {
            block = block.style(Style::default().bg(to_color(bg)).fg(to_color(fg)));
        }
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = SLOT_NAMES
            .iter()
            .map(|name| build_slot_row(self.sheet, name))
            .collect();

        lines.push(Line::from(""));
        lines.push(Line::from(
            "  [l] light  [d] dark  [s] system  [y] dynamic  [t] flip system  [q] quit",
        ));
        if let Some(status) = self.status {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(status.to_string(), Style::default().add_modifier(Modifier::BOLD)),
            ]));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::StyleTarget;
    use crate::cli::Variant;
    use crate::theme::SemanticPalette;

    #[test]
    fn renders_every_slot_name() {
        let mut sheet = StyleSheet::new(Variant::Dark);
        let palette = SemanticPalette::synthesize(AppColor::new(0, 168, 243), Variant::Dark);
        for (name, value) in palette.entries() {
            sheet.set_property(name, &value.to_string());
        }

        let area = Rect::new(0, 0, 90, 20);
        let mut buf = Buffer::empty(area);
        PaletteWidget::new(&sheet, "Preview".to_string(), Some("ready")).render(area, &mut buf);

        let text: String = buf.content().iter().map(|cell| cell.symbol()).collect();
        for name in SLOT_NAMES {
            assert!(text.contains(name), "missing slot {name}");
        }
        assert!(text.contains("ready"));
    }

    #[test]
    fn contrast_note_only_for_text_slots() {
        let sheet = StyleSheet::new(Variant::Light);
        assert!(contrast_note(&sheet, "foreground").is_some());
        assert!(contrast_note(&sheet, "border").is_none());
    }
}
