use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{ModalAreas, ModalControl};
use crate::config::ThemeConfig;
use crate::feed::Message;
use crate::format::{format_received, sender_name};

/// Render the message-detail dialog centered over `area`.
///
/// Returns the rectangles of the dialog and its two close controls so the
/// caller can route mouse clicks (a click outside the dialog dismisses it).
pub fn render_modal(
    f: &mut Frame,
    area: Rect,
    message: &Message,
    focus: ModalControl,
    scroll: u16,
    theme: &ThemeConfig,
) -> ModalAreas {
    let width = area.width.saturating_sub(8).min(72);
    let height = area.height.saturating_sub(4).min(20);
    let dialog = centered_rect(width, height, area);

    let subject = if message.subject.is_empty() {
        "(no subject)"
    } else {
        message.subject.as_str()
    };

    f.render_widget(Clear, dialog);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_active()))
        .title(format!(" {} ", subject))
        .title_alignment(Alignment::Center)
        .title_style(Style::default().fg(theme.primary()))
        .style(Style::default().bg(theme.bg_panel()));
    let inner = block.inner(dialog);
    f.render_widget(block, dialog);

    // Close icon on the border's top-right corner
    let close_icon = Rect::new(
        (dialog.x + dialog.width).saturating_sub(4),
        dialog.y,
        3,
        1,
    );
    let icon_style = if focus == ModalControl::CloseIcon {
        Style::default()
            .fg(theme.primary())
            .add_modifier(Modifier::REVERSED)
    } else {
        Style::default().fg(theme.fg_muted())
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled("[x]", icon_style))),
        close_icon,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // meta
            Constraint::Length(1), // spacing
            Constraint::Min(1),    // body
            Constraint::Length(1), // footer button
        ])
        .split(inner);

    let meta = vec![
        Line::from(vec![
            Span::styled("From: ", Style::default().fg(theme.fg_subtle())),
            Span::styled(
                sender_name(&message.from),
                Style::default().fg(theme.fg()).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" <{}>", message.from),
                Style::default().fg(theme.fg_muted()),
            ),
        ]),
        Line::from(vec![
            Span::styled("Date: ", Style::default().fg(theme.fg_subtle())),
            Span::styled(
                format_received(message.received),
                Style::default().fg(theme.fg()),
            ),
        ]),
    ];
    f.render_widget(Paragraph::new(meta), chunks[0]);

    let body = Paragraph::new(message.body.as_str())
        .style(Style::default().fg(theme.fg()))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(body, chunks[2]);

    // Footer close button, centered. The footer row can collapse to zero
    // height in a tiny terminal; skip the button then.
    let label = "[ Close ]";
    let button_width = label.len() as u16;
    let close_button = if chunks[3].height == 0 {
        Rect::default()
    } else {
        Rect::new(
            chunks[3].x + chunks[3].width.saturating_sub(button_width) / 2,
            chunks[3].y,
            button_width.min(chunks[3].width),
            1,
        )
    };
    let button_style = if focus == ModalControl::CloseButton {
        Style::default()
            .fg(theme.primary())
            .add_modifier(Modifier::REVERSED | Modifier::BOLD)
    } else {
        Style::default().fg(theme.fg_subtle())
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(label, button_style))),
        close_button,
    );

    ModalAreas {
        dialog,
        close_icon,
        close_button,
    }
}

/// Calculate centered rect for the dialog
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let modal_width = width.min(area.width.saturating_sub(4));
    let modal_height = height.min(area.height.saturating_sub(4));
    let x = (area.width.saturating_sub(modal_width)) / 2 + area.x;
    let y = (area.height.saturating_sub(modal_height)) / 2 + area.y;
    Rect::new(x, y, modal_width, modal_height)
}
