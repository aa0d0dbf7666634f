//! Post detail screen.

use chrono::{DateTime, Local, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use megablog_core::content::html_to_text;
use megablog_core::models::Post;
use megablog_core::routes::Route;
use megablog_core::session::SessionStore;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::{ScreenCtx, ScreenUpdate};
use crate::common::TaskKind;
use crate::common::widgets::{ACCENT, ERROR, MUTED, render_loading};
use crate::effects::UiEffect;

#[derive(Debug)]
pub struct PostViewState {
    id: String,
    post: Option<Post>,
    preview_url: Option<String>,
    loading: bool,
    confirm_delete: bool,
    deleting: bool,
    scroll: u16,
}

impl PostViewState {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            post: None,
            preview_url: None,
            loading: false,
            confirm_delete: false,
            deleting: false,
            scroll: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn post(&self) -> Option<&Post> {
        self.post.as_ref()
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.confirm_delete
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    pub fn start_loading(&mut self, ctx: &mut ScreenCtx<'_>) -> UiEffect {
        self.loading = true;
        UiEffect::LoadPost {
            task: ctx.start_task(TaskKind::PostLoad),
            id: self.id.clone(),
        }
    }

    pub fn on_loaded(&mut self, post: Post, preview_url: Option<String>) {
        self.loading = false;
        self.post = Some(post);
        self.preview_url = preview_url;
    }

    /// The backend refused the delete; the post stays on screen.
    pub fn on_delete_failed(&mut self) {
        self.deleting = false;
        self.confirm_delete = false;
    }

    pub fn handle_key(&mut self, ctx: &mut ScreenCtx<'_>, key: KeyEvent) -> ScreenUpdate {
        let Some(post) = &self.post else {
            return match key.code {
                KeyCode::Esc => ScreenUpdate::back(),
                _ => ScreenUpdate::none(),
            };
        };
        let is_author = post.is_authored_by(ctx.session.user());

        if self.confirm_delete {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') if !self.deleting => {
                    self.deleting = true;
                    ScreenUpdate::effects(vec![UiEffect::DeletePost {
                        task: ctx.start_task(TaskKind::Delete),
                        post: post.clone(),
                    }])
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc if !self.deleting => {
                    self.confirm_delete = false;
                    ScreenUpdate::none()
                }
                _ => ScreenUpdate::none(),
            };
        }

        match key.code {
            KeyCode::Char('e') if is_author => {
                ScreenUpdate::navigate(Route::EditPost(post.id.clone()))
            }
            KeyCode::Char('d') if is_author => {
                self.confirm_delete = true;
                ScreenUpdate::none()
            }
            KeyCode::Char('o') => match &self.preview_url {
                Some(url) => ScreenUpdate::effects(vec![UiEffect::OpenBrowser { url: url.clone() }]),
                None => ScreenUpdate::none(),
            },
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
                ScreenUpdate::none()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1);
                ScreenUpdate::none()
            }
            KeyCode::Esc => ScreenUpdate::back(),
            _ => ScreenUpdate::none(),
        }
    }
}

pub fn hints(view: &PostViewState, session: &SessionStore) -> Vec<(&'static str, &'static str)> {
    if view.confirm_delete {
        return vec![("y", "confirm delete"), ("n", "cancel")];
    }
    let mut hints = vec![("↑↓", "scroll")];
    if view.preview_url.is_some() {
        hints.push(("o", "open image"));
    }
    if view
        .post
        .as_ref()
        .is_some_and(|post| post.is_authored_by(session.user()))
    {
        hints.push(("e", "edit"));
        hints.push(("d", "delete"));
    }
    hints.push(("Esc", "back"));
    hints
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map_or_else(
        || "-".to_string(),
        |d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
    )
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    view: &PostViewState,
    session: &SessionStore,
    spinner: usize,
) {
    let Some(post) = &view.post else {
        render_loading(frame, area, "Loading post...", spinner);
        return;
    };

    let [meta, body, footer] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let mut lines = vec![
        Line::from(Span::styled(
            post.title.clone(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Status: ", Style::default().fg(MUTED)),
            Span::raw(post.status.as_str()),
            Span::styled("  Created: ", Style::default().fg(MUTED)),
            Span::raw(format_date(post.created_at)),
            Span::styled("  Updated: ", Style::default().fg(MUTED)),
            Span::raw(format_date(post.updated_at)),
        ]),
    ];
    if let Some(url) = &view.preview_url {
        lines.push(Line::from(vec![
            Span::styled("Image: ", Style::default().fg(MUTED)),
            Span::styled(url.clone(), Style::default().add_modifier(Modifier::UNDERLINED)),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), meta);

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(MUTED));
    frame.render_widget(
        Paragraph::new(html_to_text(&post.content))
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((view.scroll, 0)),
        body,
    );

    if view.confirm_delete {
        let prompt = if view.deleting {
            "Deleting..."
        } else {
            "Delete this post? (y/n)"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(
                prompt,
                Style::default().fg(ERROR).add_modifier(Modifier::BOLD),
            )),
            footer,
        );
    } else if post.is_authored_by(session.user()) {
        frame.render_widget(
            Paragraph::new(Span::styled("You wrote this post.", Style::default().fg(MUTED))),
            footer,
        );
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use megablog_core::config::EditorConfig;
    use megablog_core::models::{PostStatus, User};

    use super::*;
    use crate::common::{TaskSeq, Tasks};

    fn author() -> User {
        User {
            id: "u1".to_string(),
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
        }
    }

    fn loaded_view() -> PostViewState {
        let mut view = PostViewState::new("hello");
        view.on_loaded(
            Post {
                id: "hello".to_string(),
                title: "Hello".to_string(),
                content: "<p>Hi</p>".to_string(),
                featured_image: "file-1".to_string(),
                status: PostStatus::Active,
                user_id: "u1".to_string(),
                created_at: None,
                updated_at: None,
            },
            Some("http://img".to_string()),
        );
        view
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut session = SessionStore::new();
        session.login(author());
        let editor = EditorConfig::default();
        let mut seq = TaskSeq::default();
        let mut tasks = Tasks::default();
        let mut ctx = ScreenCtx {
            session: &session,
            editor: &editor,
            task_seq: &mut seq,
            tasks: &mut tasks,
        };
        let mut view = loaded_view();

        let update = view.handle_key(&mut ctx, key('d'));
        assert!(update.effects.is_empty());
        assert!(view.is_confirming_delete());

        let update = view.handle_key(&mut ctx, key('n'));
        assert!(update.effects.is_empty());
        assert!(!view.is_confirming_delete());

        view.handle_key(&mut ctx, key('d'));
        let update = view.handle_key(&mut ctx, key('y'));
        assert!(matches!(update.effects.as_slice(), [UiEffect::DeletePost { .. }]));
        assert!(view.is_deleting());
    }

    #[test]
    fn test_non_author_cannot_edit_or_delete() {
        let mut session = SessionStore::new();
        session.login(User {
            id: "other".to_string(),
            ..author()
        });
        let editor = EditorConfig::default();
        let mut seq = TaskSeq::default();
        let mut tasks = Tasks::default();
        let mut ctx = ScreenCtx {
            session: &session,
            editor: &editor,
            task_seq: &mut seq,
            tasks: &mut tasks,
        };
        let mut view = loaded_view();

        assert!(view.handle_key(&mut ctx, key('e')).navigation.is_none());
        view.handle_key(&mut ctx, key('d'));
        assert!(!view.is_confirming_delete());
        assert_eq!(hints(&view, &session).len(), 3);
    }

    #[test]
    fn test_author_edit_navigates() {
        let mut session = SessionStore::new();
        session.login(author());
        let editor = EditorConfig::default();
        let mut seq = TaskSeq::default();
        let mut tasks = Tasks::default();
        let mut ctx = ScreenCtx {
            session: &session,
            editor: &editor,
            task_seq: &mut seq,
            tasks: &mut tasks,
        };
        let mut view = loaded_view();

        let update = view.handle_key(&mut ctx, key('e'));
        assert_eq!(
            update.navigation,
            Some(super::super::Navigation::To(Route::EditPost("hello".to_string())))
        );
    }
}
