//! Shared presentational components.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::TextField;
use super::text::truncate_start_with_ellipsis;

pub const ACCENT: Color = Color::Cyan;
pub const ERROR: Color = Color::Red;
pub const MUTED: Color = Color::DarkGray;

/// Spinner frames for loading indicators.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

/// Helper struct for keyboard hints.
pub struct InputHint<'a> {
    pub key: &'a str,
    pub action: &'a str,
}

impl<'a> InputHint<'a> {
    pub fn new(key: &'a str, action: &'a str) -> Self {
        Self { key, action }
    }
}

/// Renders a line of keyboard hints.
pub fn render_hints(frame: &mut Frame, area: Rect, hints: &[InputHint]) {
    let mut spans = Vec::new();
    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", Style::default().fg(MUTED)));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(ACCENT)));
        spans.push(Span::styled(
            format!(" {}", hint.action),
            Style::default().fg(MUTED),
        ));
    }
    let para = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(para, area);
}

/// Neutral loading indicator, centered in `area`.
pub fn render_loading(frame: &mut Frame, area: Rect, label: &str, spinner_frame: usize) {
    let spinner = SPINNER_FRAMES[spinner_frame % SPINNER_FRAMES.len()];
    let y = area.y + area.height / 2;
    let line_area = Rect::new(area.x, y.min(area.bottom().saturating_sub(1)), area.width, 1);
    let para = Paragraph::new(Line::from(vec![
        Span::styled(spinner, Style::default().fg(ACCENT)),
        Span::raw(format!(" {label}")),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(para, line_area);
}

/// One-line error banner.
pub fn render_error_banner(frame: &mut Frame, area: Rect, message: &str) {
    let para = Paragraph::new(Line::from(vec![
        Span::styled(
            " ! ",
            Style::default()
                .fg(Color::White)
                .bg(ERROR)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {message}"), Style::default().fg(ERROR)),
    ]))
    .wrap(Wrap { trim: true });
    frame.render_widget(para, area);
}

/// Display options for a form field.
pub struct FieldView<'a> {
    pub label: &'a str,
    pub field: &'a TextField,
    pub focused: bool,
    pub error: Option<&'a str>,
    pub placeholder: Option<&'a str>,
    pub read_only: bool,
}

/// Height a field needs: bordered box plus one error line.
pub fn field_height(field: &TextField, content_rows: u16) -> u16 {
    let rows = if field.is_multiline() { content_rows } else { 1 };
    rows + 3
}

/// Renders a bordered input with its label in the title and the error below.
pub fn render_field(frame: &mut Frame, area: Rect, view: &FieldView<'_>) {
    let border = if view.error.is_some() {
        ERROR
    } else if view.focused {
        ACCENT
    } else {
        MUTED
    };
    let box_height = area.height.saturating_sub(1);
    let box_area = Rect::new(area.x, area.y, area.width, box_height);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(format!(" {} ", view.label));
    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);

    let mut text = view.field.display();
    let placeholder = text.is_empty() && !view.focused;
    if placeholder && let Some(hint) = view.placeholder {
        text = hint.to_string();
    }
    let style = if placeholder {
        Style::default().fg(MUTED)
    } else if view.read_only {
        Style::default().fg(MUTED).add_modifier(Modifier::ITALIC)
    } else {
        Style::default()
    };

    if view.field.is_multiline() {
        let mut content = text;
        if view.focused {
            content.push('█');
        }
        let lines = content.lines().count() as u16;
        let scroll = lines.saturating_sub(inner.height);
        frame.render_widget(
            Paragraph::new(content)
                .style(style)
                .wrap(Wrap { trim: false })
                .scroll((scroll, 0)),
            inner,
        );
    } else {
        let max = inner.width.saturating_sub(1) as usize;
        let mut spans = vec![Span::styled(truncate_start_with_ellipsis(&text, max), style)];
        if view.focused && !view.read_only {
            spans.push(Span::styled("█", Style::default().fg(ACCENT)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), inner);
    }

    if let Some(error) = view.error {
        let error_area = Rect::new(area.x + 1, area.y + box_height, area.width.saturating_sub(1), 1);
        frame.render_widget(
            Paragraph::new(Span::styled(error, Style::default().fg(ERROR))),
            error_area,
        );
    }
}

/// Renders a checkbox line with an optional error.
pub fn render_checkbox(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    checked: bool,
    focused: bool,
    error: Option<&str>,
) {
    let mark = if checked { "[x]" } else { "[ ]" };
    let style = if focused {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let mut lines = vec![Line::from(Span::styled(format!("{mark} {label}"), style))];
    if let Some(error) = error {
        lines.push(Line::from(Span::styled(error, Style::default().fg(ERROR))));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

/// Renders a submit button; dimmed while disabled.
pub fn render_button(frame: &mut Frame, area: Rect, label: &str, focused: bool, disabled: bool) {
    let style = if disabled {
        Style::default().fg(MUTED)
    } else if focused {
        Style::default()
            .fg(Color::Black)
            .bg(ACCENT)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(ACCENT)
    };
    frame.render_widget(
        Paragraph::new(Span::styled(format!("[ {label} ]"), style)).alignment(Alignment::Center),
        area,
    );
}

/// Returns a centered rectangle of the given width (columns) and percentage height.
pub fn centered_column(width: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    let width = width.min(r.width);
    let x = r.x + (r.width - width) / 2;
    Rect::new(x, vertical[1].y, width, vertical[1].height)
}
