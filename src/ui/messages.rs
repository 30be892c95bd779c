use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::config::{LayoutConfig, ThemeConfig};
use crate::feed::Message;
use crate::format::{format_received, sender_name, truncate_subject};

pub fn render_messages(
    f: &mut Frame,
    area: Rect,
    messages: &[Message],
    state: &mut ListState,
    loading: bool,
    layout: &LayoutConfig,
    theme: &ThemeConfig,
) {
    // Available width: area minus borders (2) minus highlight symbol (2)
    let avail_width = area.width.saturating_sub(4) as usize;

    let date_width = layout.date_width;
    let from_width = layout
        .from_width
        .min(avail_width.saturating_sub(date_width + 4) / 2);
    let subject_width = avail_width.saturating_sub(date_width + from_width + 4);

    let items: Vec<ListItem> = if messages.is_empty() {
        vec![
            ListItem::new(Line::raw("  No messages"))
                .style(Style::default().fg(theme.fg_muted())),
        ]
    } else {
        messages
            .iter()
            .map(|m| {
                let flag = if m.is_new { "*" } else { " " };
                let from = sender_name(&m.from);
                let subject = truncate_subject(&m.subject, layout.subject_max);
                let date = format_received(m.received);
                let line = format!(
                    "{} {} {} {}",
                    flag,
                    fit(&from, from_width),
                    fit(&subject, subject_width),
                    fit(&date, date_width),
                );
                let style = if m.is_new {
                    Style::default()
                        .fg(theme.new_message())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.fg())
                };
                ListItem::new(Line::raw(line)).style(style)
            })
            .collect()
    };

    let title = if loading {
        " Unread (loading...) ".to_string()
    } else {
        format!(" Unread ({}) ", messages.len())
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border()))
                .title_style(Style::default().fg(theme.primary()))
                .title(title),
        )
        .highlight_style(
            Style::default()
                .bg(theme.selected_bg())
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, state);
}

/// Pad or clip a value to its column width.
fn fit(s: &str, max: usize) -> String {
    if max < 4 {
        return s.chars().take(max).collect();
    }
    let char_count = s.chars().count();
    if char_count <= max {
        format!("{:width$}", s, width = max)
    } else {
        let truncated: String = s.chars().take(max - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_pads_and_clips() {
        assert_eq!(fit("ab", 4), "ab  ");
        assert_eq!(fit("abcdefgh", 6), "abc...");
        assert_eq!(fit("abcdefgh", 3), "abc");
    }
}
