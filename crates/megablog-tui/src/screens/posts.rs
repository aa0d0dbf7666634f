//! Post list screens (home and all posts).

use crossterm::event::{KeyCode, KeyEvent};
use megablog_core::content::html_to_text;
use megablog_core::models::{Post, PostStatus};
use megablog_core::posts::{Feed, LOAD_POSTS_FAILED};
use megablog_core::routes::Route;
use megablog_core::session::SessionStore;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::{ScreenCtx, ScreenUpdate};
use crate::common::widgets::{ACCENT, ERROR, MUTED, render_loading};
use crate::common::{TaskKind, text};
use crate::effects::UiEffect;

/// Rows taken by one post card.
const CARD_HEIGHT: u16 = 4;

#[derive(Debug)]
pub struct PostListState {
    feed: Feed,
    posts: Vec<Post>,
    selected: usize,
    loading: bool,
    error: Option<String>,
}

impl PostListState {
    pub fn new(feed: Feed) -> Self {
        Self {
            feed,
            posts: Vec::new(),
            selected: 0,
            loading: false,
            error: None,
        }
    }

    pub fn feed(&self) -> Feed {
        self.feed
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn selected(&self) -> Option<&Post> {
        self.posts.get(self.selected)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn start_loading(&mut self, ctx: &mut ScreenCtx<'_>) -> UiEffect {
        self.loading = true;
        self.error = None;
        UiEffect::LoadFeed {
            task: ctx.start_task(TaskKind::Feed),
            feed: self.feed,
        }
    }

    /// Applies a finished load. Failures keep the previous list.
    pub fn on_loaded(&mut self, result: Result<Vec<Post>, String>) {
        self.loading = false;
        match result {
            Ok(posts) => {
                self.posts = posts;
                self.selected = self.selected.min(self.posts.len().saturating_sub(1));
                self.error = None;
            }
            Err(_) => self.error = Some(LOAD_POSTS_FAILED.to_string()),
        }
    }

    pub fn handle_key(&mut self, ctx: &mut ScreenCtx<'_>, key: KeyEvent) -> ScreenUpdate {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                ScreenUpdate::none()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.posts.len() {
                    self.selected += 1;
                }
                ScreenUpdate::none()
            }
            KeyCode::Enter => match self.selected() {
                Some(post) => ScreenUpdate::navigate(Route::Post(post.id.clone())),
                None => ScreenUpdate::none(),
            },
            KeyCode::Char('r') if !self.loading => {
                ScreenUpdate::effects(vec![self.start_loading(ctx)])
            }
            KeyCode::Char('q') => ScreenUpdate::effects(vec![UiEffect::Quit]),
            KeyCode::Esc => ScreenUpdate::back(),
            _ => ScreenUpdate::none(),
        }
    }
}

pub fn hints() -> Vec<(&'static str, &'static str)> {
    vec![
        ("↑↓", "select"),
        ("Enter", "open"),
        ("r", "reload"),
        ("q", "quit"),
    ]
}

pub fn render_home(
    frame: &mut Frame,
    area: Rect,
    list: &PostListState,
    session: &SessionStore,
    spinner: usize,
) {
    if list.posts.is_empty() && !list.loading && list.error.is_none() {
        render_hero(frame, area, session.is_authenticated());
        return;
    }
    render_list(frame, area, list, "Latest posts", spinner);
}

pub fn render_all_posts(frame: &mut Frame, area: Rect, list: &PostListState, spinner: usize) {
    if list.posts.is_empty() && !list.loading && list.error.is_none() {
        let para = Paragraph::new("No posts yet. Press F3 to write one.")
            .style(Style::default().fg(MUTED))
            .alignment(Alignment::Center);
        frame.render_widget(para, area);
        return;
    }
    render_list(frame, area, list, "All posts", spinner);
}

fn render_hero(frame: &mut Frame, area: Rect, authenticated: bool) {
    let call_to_action = if authenticated {
        "Nothing published yet. Add the first post from the menu."
    } else {
        "Login or sign up to start writing."
    };
    let lines = vec![
        Line::from(Span::styled(
            "Share Your Story",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("A simple place to publish your thoughts."),
        Line::from(Span::styled(call_to_action, Style::default().fg(MUTED))),
    ];
    let y = area.y + area.height.saturating_sub(lines.len() as u16) / 2;
    let hero_area = Rect::new(area.x, y, area.width, (lines.len() as u16).min(area.height));
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        hero_area,
    );
}

fn render_list(frame: &mut Frame, area: Rect, list: &PostListState, title: &str, spinner: usize) {
    let [heading, body] =
        Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);

    let mut spans = vec![Span::styled(
        format!("{title} ({})", list.posts.len()),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(error) = &list.error {
        spans.push(Span::styled(format!("  {error}"), Style::default().fg(ERROR)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), heading);

    if list.loading && list.posts.is_empty() {
        render_loading(frame, body, "Loading posts...", spinner);
        return;
    }

    let per_page = (body.height / CARD_HEIGHT).max(1) as usize;
    let first = list.selected.saturating_sub(per_page - 1);
    for (row, (idx, post)) in list
        .posts
        .iter()
        .enumerate()
        .skip(first)
        .take(per_page)
        .enumerate()
    {
        let card = Rect::new(
            body.x,
            body.y + row as u16 * CARD_HEIGHT,
            body.width,
            CARD_HEIGHT.min(body.height),
        );
        render_card(frame, card, post, idx == list.selected);
    }
}

fn render_card(frame: &mut Frame, area: Rect, post: &Post, selected: bool) {
    let border = if selected { ACCENT } else { MUTED };
    let status = match post.status {
        PostStatus::Active => Span::styled(" active ", Style::default().fg(ACCENT)),
        PostStatus::Inactive => Span::styled(" inactive ", Style::default().fg(MUTED)),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {} ", post.title),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(status).right_aligned());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let body = html_to_text(&post.content).replace('\n', " ");
    let excerpt = text::excerpt(&body, inner.width as usize);
    frame.render_widget(
        Paragraph::new(excerpt)
            .style(Style::default().fg(MUTED))
            .wrap(Wrap { trim: true }),
        inner,
    );
}
