use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::Banner;
use crate::config::ThemeConfig;

/// Stats header: total unread, count of freshly merged messages and the
/// time of the last completed fetch.
pub fn render_stats(
    f: &mut Frame,
    area: Rect,
    total: usize,
    fresh: usize,
    last_update: Option<&str>,
    loading: bool,
    theme: &ThemeConfig,
) {
    let label_style = Style::default().fg(theme.fg_subtle());
    let value_style = Style::default()
        .fg(theme.primary())
        .add_modifier(Modifier::BOLD);
    // zero suppresses the new-message styling
    let fresh_style = if fresh > 0 {
        Style::default()
            .fg(theme.success())
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.fg_muted())
    };

    let mut spans = vec![
        Span::styled(" Unread ", label_style),
        Span::styled(total.to_string(), value_style),
        Span::styled("  New ", label_style),
        Span::styled(fresh.to_string(), fresh_style),
        Span::styled("  Updated ", label_style),
        Span::styled(
            last_update.unwrap_or("--:--:--").to_string(),
            Style::default().fg(theme.fg()),
        ),
    ];
    if loading {
        spans.push(Span::styled(
            "  fetching...",
            Style::default().fg(theme.warning()),
        ));
    }

    let paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.bg_panel()));
    f.render_widget(paragraph, area);
}

/// Inline error banner above the table.
pub fn render_banner(f: &mut Frame, area: Rect, banner: Banner, theme: &ThemeConfig) {
    let text = match banner {
        Banner::FetchFailed => " Failed to load messages (press r to retry)",
        Banner::StreamDead => " Critical polling failure: refresh stopped (press a or i to restart)",
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default()
            .fg(theme.error())
            .add_modifier(Modifier::BOLD),
    )));
    f.render_widget(paragraph, area);
}
