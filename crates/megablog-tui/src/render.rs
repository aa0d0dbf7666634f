//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState`, draw to a ratatui Frame, and never
//! mutate state or return effects.

use megablog_core::session::SessionFlag;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Margin, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::common::text::truncate_with_ellipsis;
use crate::common::widgets::{
    ACCENT, InputHint, MUTED, render_error_banner, render_hints, render_loading,
};
use crate::navigation::{NavTarget, nav_items};
use crate::state::AppState;

const HEADER_HEIGHT: u16 = 2;
const FOOTER_HEIGHT: u16 = 1;
const APP_NAME: &str = "MegaBlog";

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let banner_height = u16::from(app.banner.is_some());
    let [header, body, banner, footer] = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Min(0),
        Constraint::Length(banner_height),
        Constraint::Length(FOOTER_HEIGHT),
    ])
    .areas(area);

    render_header(app, frame, header);

    let body = body.inner(Margin::new(1, 0));
    if app.screen_visible() {
        app.screen
            .render(frame, body, &app.session, app.spinner_frame);
    } else {
        render_loading(frame, body, "Checking session...", app.spinner_frame);
    }

    if let Some(message) = &app.banner {
        render_error_banner(frame, banner, message);
    }

    let mut hints: Vec<InputHint> = if app.screen_visible() {
        app.screen
            .hints(&app.session)
            .into_iter()
            .map(|(key, action)| InputHint::new(key, action))
            .collect()
    } else {
        vec![InputHint::new("Esc", "back")]
    };
    hints.push(InputHint::new("Ctrl+C", "quit"));
    render_hints(frame, footer, &hints);
}

fn render_header(app: &AppState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(MUTED));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut spans = vec![
        Span::styled(
            format!(" {APP_NAME} "),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];
    for (i, item) in nav_items(&app.session).iter().enumerate() {
        let current = matches!(&item.target, NavTarget::Go(route) if *route == app.route);
        let style = if current {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!("F{} ", i + 1), Style::default().fg(MUTED)));
        spans.push(Span::styled(item.label, style));
        spans.push(Span::raw("  "));
    }

    let who = match app.session.flag() {
        SessionFlag::Loading => "…".to_string(),
        SessionFlag::Authenticated => app
            .session
            .user()
            .map_or_else(String::new, |u| u.name.clone()),
        SessionFlag::Unauthenticated => "guest".to_string(),
    };
    let who = truncate_with_ellipsis(&who, 24);
    let [nav, user] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(who.chars().count() as u16 + 1),
    ])
    .areas(inner);

    frame.render_widget(Paragraph::new(Line::from(spans)), nav);
    frame.render_widget(
        Paragraph::new(Span::styled(who, Style::default().fg(MUTED))),
        user,
    );
}

#[cfg(test)]
mod tests {
    use megablog_core::config::EditorConfig;
    use megablog_core::routes::Route;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::screens::Screen;
    use crate::update;

    fn draw(app: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).expect("terminal");
        terminal.draw(|frame| render(app, frame)).expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_guest_home_shows_hero_and_nav() {
        let mut app = AppState::new(EditorConfig::default());
        update::startup(&mut app);
        app.session.resolve(None);
        if let Screen::Home(list) = &mut app.screen {
            list.on_loaded(Ok(vec![]));
        }

        let screen = draw(&app);
        assert!(screen.contains("MegaBlog"));
        assert!(screen.contains("Share Your Story"));
        assert!(screen.contains("Login"));
        assert!(screen.contains("Signup"));
    }

    #[test]
    fn test_guarded_screen_shows_loading_while_session_resolves() {
        let mut app = AppState::new(EditorConfig::default());
        update::navigate(&mut app, Route::AddPost, true);

        let screen = draw(&app);
        assert!(screen.contains("Checking session..."));
        assert!(!screen.contains("Featured image"));
    }
}
