//! Post editor screen (add and edit).
//!
//! Create mode derives the slug from the title until the slug is typed
//! directly. Edit mode loads the record first and keeps the slug fixed,
//! since it is the document id.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use megablog_core::forms::{FieldErrors, field};
use megablog_core::models::{ImageFile, Post, PostStatus};
use megablog_core::slug::SlugField;
use megablog_core::submit::PostDraft;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Margin, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::{ScreenCtx, ScreenUpdate};
use crate::common::widgets::{
    ACCENT, ERROR, FieldView, MUTED, field_height, render_button, render_error_banner, render_field,
    render_loading,
};
use crate::common::{TaskKind, TextField};
use crate::effects::{SubmitTarget, UiEffect};

const NOT_SIGNED_IN: &str = "You must be logged in to create a post.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Title,
    Slug,
    Content,
    Status,
    Image,
    Submit,
}

const FOCUS_ORDER: [Focus; 6] = [
    Focus::Title,
    Focus::Slug,
    Focus::Content,
    Focus::Status,
    Focus::Image,
    Focus::Submit,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit { id: String, post: Option<Post> },
}

#[derive(Debug)]
pub struct EditorState {
    mode: EditorMode,
    loading: bool,
    title: TextField,
    slug: SlugField,
    slug_input: TextField,
    content: TextField,
    status: PostStatus,
    image: TextField,
    focus: usize,
    errors: FieldErrors,
    submit_error: Option<String>,
    submitting: bool,
}

impl EditorState {
    fn with_mode(mode: EditorMode, status: PostStatus) -> Self {
        Self {
            mode,
            loading: false,
            title: TextField::new(),
            slug: SlugField::default(),
            slug_input: TextField::new(),
            content: TextField::multiline(),
            status,
            image: TextField::new(),
            focus: 0,
            errors: FieldErrors::new(),
            submit_error: None,
            submitting: false,
        }
    }

    pub fn create(default_status: PostStatus) -> Self {
        Self::with_mode(EditorMode::Create, default_status)
    }

    pub fn edit(id: &str) -> Self {
        Self::with_mode(
            EditorMode::Edit {
                id: id.to_string(),
                post: None,
            },
            PostStatus::default(),
        )
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn is_creating(&self) -> bool {
        matches!(self.mode, EditorMode::Create)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn slug(&self) -> String {
        self.slug.value()
    }

    /// Field title; shows the effective slug when the typed text differs.
    fn slug_label(&self) -> String {
        if !self.is_creating() {
            return "Slug (fixed)".to_string();
        }
        let value = self.slug.value();
        if value.is_empty() || value == self.slug.raw() {
            "Slug".to_string()
        } else {
            format!("Slug (saved as {value})")
        }
    }

    /// Edit mode needs the stored post before anything can be shown.
    pub fn start_loading(&mut self, ctx: &mut ScreenCtx<'_>) -> Option<UiEffect> {
        let EditorMode::Edit { id, post: None } = &self.mode else {
            return None;
        };
        let id = id.clone();
        self.loading = true;
        Some(UiEffect::LoadPost {
            task: ctx.start_task(TaskKind::PostLoad),
            id,
        })
    }

    /// Pre-fills the form from the stored post.
    pub fn on_loaded(&mut self, post: Post) {
        let draft = PostDraft::from_post(&post);
        self.title.set_value(&draft.title);
        self.slug = SlugField::with_value(&draft.slug);
        self.slug_input.set_value(self.slug.raw());
        self.content.set_value(&draft.content);
        self.status = draft.status;
        self.loading = false;
        if let EditorMode::Edit { post: slot, .. } = &mut self.mode {
            *slot = Some(post);
        }
    }

    pub fn on_submit_failed(&mut self, message: String) {
        self.submitting = false;
        self.submit_error = Some(message);
    }

    fn focus(&self) -> Focus {
        FOCUS_ORDER[self.focus]
    }

    /// Snapshot of the form as a submission draft.
    pub fn draft(&self) -> PostDraft {
        let image_path = self.image.value().trim();
        PostDraft {
            title: self.title.value().trim().to_string(),
            slug: self.slug.value(),
            content: self.content.value().to_string(),
            status: self.status,
            image: (!image_path.is_empty()).then(|| ImageFile::new(image_path)),
        }
    }

    fn submit(&mut self, ctx: &mut ScreenCtx<'_>) -> ScreenUpdate {
        if self.submitting || self.loading {
            return ScreenUpdate::none();
        }
        let draft = self.draft();
        self.errors = draft.validate(self.is_creating(), ctx.editor.max_image_bytes);
        if !self.errors.is_empty() {
            return ScreenUpdate::none();
        }

        let target = match &self.mode {
            EditorMode::Create => match ctx.session.user() {
                Some(user) => SubmitTarget::Create {
                    author: user.clone(),
                },
                None => {
                    self.submit_error = Some(NOT_SIGNED_IN.to_string());
                    return ScreenUpdate::none();
                }
            },
            EditorMode::Edit { post: Some(post), .. } => SubmitTarget::Update {
                existing: post.clone(),
            },
            EditorMode::Edit { post: None, .. } => return ScreenUpdate::none(),
        };

        self.submit_error = None;
        self.submitting = true;
        ScreenUpdate::effects(vec![UiEffect::SubmitPost {
            task: ctx.start_task(TaskKind::Submit),
            draft,
            target,
        }])
    }

    fn edit_focused(&mut self, key: KeyEvent) {
        match self.focus() {
            Focus::Title => {
                if self.title.handle_key(key) && self.is_creating() {
                    self.slug.on_title_changed(self.title.value());
                    self.slug_input.set_value(self.slug.raw());
                }
            }
            Focus::Slug if self.is_creating() => {
                if self.slug_input.handle_key(key) {
                    self.slug.on_slug_input(self.slug_input.value());
                }
            }
            Focus::Content => {
                self.content.handle_key(key);
            }
            Focus::Status if key.code == KeyCode::Char(' ') => {
                self.status = self.status.toggled();
            }
            Focus::Image => {
                self.image.handle_key(key);
            }
            Focus::Slug | Focus::Status | Focus::Submit => {}
        }
    }

    pub fn handle_key(&mut self, ctx: &mut ScreenCtx<'_>, key: KeyEvent) -> ScreenUpdate {
        if self.loading {
            return match key.code {
                KeyCode::Esc => ScreenUpdate::back(),
                _ => ScreenUpdate::none(),
            };
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if ctrl => self.submit(ctx),
            KeyCode::Tab => {
                self.focus = (self.focus + 1) % FOCUS_ORDER.len();
                ScreenUpdate::none()
            }
            KeyCode::BackTab => {
                self.focus = (self.focus + FOCUS_ORDER.len() - 1) % FOCUS_ORDER.len();
                ScreenUpdate::none()
            }
            KeyCode::Enter if self.focus() == Focus::Submit => self.submit(ctx),
            KeyCode::Enter if self.focus() != Focus::Content => {
                self.focus = (self.focus + 1) % FOCUS_ORDER.len();
                ScreenUpdate::none()
            }
            KeyCode::Esc => ScreenUpdate::back(),
            KeyCode::F(_) => ScreenUpdate::none(),
            _ if self.submitting => ScreenUpdate::none(),
            _ => {
                self.edit_focused(key);
                ScreenUpdate::none()
            }
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        if self.submitting || self.loading {
            return;
        }
        match self.focus() {
            Focus::Title => {
                self.title.insert_str(text);
                if self.is_creating() {
                    self.slug.on_title_changed(self.title.value());
                    self.slug_input.set_value(self.slug.raw());
                }
            }
            Focus::Slug if self.is_creating() => {
                self.slug_input.insert_str(text);
                self.slug.on_slug_input(self.slug_input.value());
            }
            Focus::Content => self.content.insert_str(text),
            Focus::Image => self.image.insert_str(text),
            Focus::Slug | Focus::Status | Focus::Submit => {}
        }
    }
}

pub fn hints(editor: &EditorState) -> Vec<(&'static str, &'static str)> {
    let mut hints = vec![("Tab", "next field"), ("Ctrl+S", "save")];
    if editor.focus() == Focus::Status {
        hints.push(("Space", "toggle status"));
    }
    hints.push(("Esc", "back"));
    hints
}

pub fn render(frame: &mut Frame, area: Rect, editor: &EditorState, spinner: usize) {
    if editor.loading {
        render_loading(frame, area, "Loading post...", spinner);
        return;
    }

    let [main, side] =
        Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)]).areas(area);
    let [title, slug, content] = Layout::vertical([
        Constraint::Length(field_height(&editor.title, 1)),
        Constraint::Length(field_height(&editor.slug_input, 1)),
        Constraint::Min(field_height(&editor.content, 3)),
    ])
    .areas(main);
    let [status, image, preview, button, banner] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(field_height(&editor.image, 1)),
        Constraint::Length(2),
        Constraint::Length(2),
        Constraint::Min(0),
    ])
    .areas(side.inner(Margin::new(1, 0)));

    let focus = editor.focus();
    let error = |key: &str| editor.errors.get(key).map(String::as_str);
    let slug_label = editor.slug_label();

    render_field(
        frame,
        title,
        &FieldView {
            label: "Title",
            field: &editor.title,
            focused: focus == Focus::Title,
            error: error(field::TITLE),
            placeholder: Some("Post title"),
            read_only: false,
        },
    );
    render_field(
        frame,
        slug,
        &FieldView {
            label: &slug_label,
            field: &editor.slug_input,
            focused: focus == Focus::Slug,
            error: error(field::SLUG),
            placeholder: Some("derived-from-title"),
            read_only: !editor.is_creating(),
        },
    );
    render_field(
        frame,
        content,
        &FieldView {
            label: "Content",
            field: &editor.content,
            focused: focus == Focus::Content,
            error: error(field::CONTENT),
            placeholder: Some("Write your post. Blank lines separate paragraphs."),
            read_only: false,
        },
    );

    let status_style = if focus == Focus::Status {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let mut status_lines = vec![Line::from(vec![
        Span::styled("Status: ", Style::default().fg(MUTED)),
        Span::styled(format!("< {} >", editor.status), status_style),
    ])];
    if let Some(message) = error(field::STATUS) {
        status_lines.push(Line::from(Span::styled(
            message,
            Style::default().fg(ERROR),
        )));
    }
    frame.render_widget(Paragraph::new(status_lines), status);

    render_field(
        frame,
        image,
        &FieldView {
            label: "Featured image",
            field: &editor.image,
            focused: focus == Focus::Image,
            error: error(field::IMAGE),
            placeholder: Some("/path/to/image.png"),
            read_only: false,
        },
    );

    if let EditorMode::Edit {
        post: Some(post), ..
    } = &editor.mode
    {
        let note = if editor.image.value().trim().is_empty() {
            format!("Current image: {}", post.featured_image)
        } else {
            "Replaces the current image".to_string()
        };
        frame.render_widget(
            Paragraph::new(Span::styled(note, Style::default().fg(MUTED))),
            preview,
        );
    }

    let label = match (editor.submitting, editor.is_creating()) {
        (true, _) => "Saving...",
        (false, true) => "Submit",
        (false, false) => "Update",
    };
    render_button(frame, button, label, focus == Focus::Submit, editor.submitting);

    if let Some(message) = &editor.submit_error {
        render_error_banner(frame, banner, message);
    }
}
