use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::View;
use crate::config::ThemeConfig;

pub fn render_help(
    f: &mut Frame,
    area: Rect,
    view: View,
    auto_refresh: bool,
    interval_secs: u64,
    theme: &ThemeConfig,
) {
    let key_style = Style::default().fg(theme.primary());
    let text_style = Style::default().fg(theme.fg_subtle());
    let on_style = Style::default().fg(theme.success());
    let off_style = Style::default().fg(theme.fg_muted());

    let help_text = match view {
        View::List => vec![
            Span::styled("j/k", key_style),
            Span::styled(" nav  ", text_style),
            Span::styled("Enter", key_style),
            Span::styled(" open  ", text_style),
            Span::styled("r", key_style),
            Span::styled(" refresh  ", text_style),
            Span::styled("a", key_style),
            Span::styled(" auto:", text_style),
            if auto_refresh {
                Span::styled("on", on_style)
            } else {
                Span::styled("off", off_style)
            },
            Span::styled("  ", text_style),
            Span::styled("i", key_style),
            Span::styled(format!(" every {}s  ", interval_secs), text_style),
            Span::styled("q", key_style),
            Span::styled(" quit", text_style),
        ],
        View::Reader => vec![
            Span::styled("Tab", key_style),
            Span::styled(" focus  ", text_style),
            Span::styled("Enter", key_style),
            Span::styled(" activate  ", text_style),
            Span::styled("j/k", key_style),
            Span::styled(" scroll  ", text_style),
            Span::styled("Esc", key_style),
            Span::styled(" close", text_style),
        ],
    };

    let paragraph =
        Paragraph::new(Line::from(help_text)).style(Style::default().bg(theme.bg_panel()));

    f.render_widget(paragraph, area);
}
