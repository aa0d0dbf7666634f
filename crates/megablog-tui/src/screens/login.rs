//! Login screen.

use crossterm::event::{KeyCode, KeyEvent};
use megablog_core::forms::{self, FieldErrors, FormValues, field};
use megablog_core::models::Credentials;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::Paragraph;

use super::{ScreenCtx, ScreenUpdate};
use crate::common::widgets::{
    ACCENT, FieldView, MUTED, centered_column, field_height, render_button, render_error_banner,
    render_field,
};
use crate::common::{TaskKind, TextField};
use crate::effects::UiEffect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Email,
    Password,
    Submit,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Email => Focus::Password,
            Focus::Password => Focus::Submit,
            Focus::Submit => Focus::Email,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Email => Focus::Submit,
            Focus::Password => Focus::Email,
            Focus::Submit => Focus::Password,
        }
    }
}

#[derive(Debug)]
pub struct LoginState {
    email: TextField,
    password: TextField,
    focus: Focus,
    errors: FieldErrors,
    error: Option<String>,
    submitting: bool,
}

impl Default for LoginState {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginState {
    pub fn new() -> Self {
        Self {
            email: TextField::new(),
            password: TextField::masked(),
            focus: Focus::Email,
            errors: FieldErrors::new(),
            error: None,
            submitting: false,
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Shows the failure and re-enables the form.
    pub fn on_failed(&mut self, message: String) {
        self.submitting = false;
        self.error = Some(message);
    }

    fn values(&self) -> FormValues {
        FormValues::new()
            .with(field::EMAIL, self.email.value().trim())
            .with(field::PASSWORD, self.password.value())
    }

    fn focused_field(&mut self) -> Option<&mut TextField> {
        match self.focus {
            Focus::Email => Some(&mut self.email),
            Focus::Password => Some(&mut self.password),
            Focus::Submit => None,
        }
    }

    fn submit(&mut self, ctx: &mut ScreenCtx<'_>) -> ScreenUpdate {
        if self.submitting {
            return ScreenUpdate::none();
        }
        let values = self.values();
        self.errors = forms::validate(&forms::login_rules(), &values);
        if !self.errors.is_empty() {
            return ScreenUpdate::none();
        }
        self.error = None;
        self.submitting = true;
        ScreenUpdate::effects(vec![UiEffect::Login {
            task: ctx.start_task(TaskKind::Auth),
            credentials: Credentials::from_form(&values),
        }])
    }

    pub fn handle_key(&mut self, ctx: &mut ScreenCtx<'_>, key: KeyEvent) -> ScreenUpdate {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.next();
                ScreenUpdate::none()
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.prev();
                ScreenUpdate::none()
            }
            KeyCode::Enter => self.submit(ctx),
            KeyCode::Esc => ScreenUpdate::back(),
            KeyCode::F(_) => ScreenUpdate::none(),
            _ if self.submitting => ScreenUpdate::none(),
            _ => {
                if let Some(input) = self.focused_field() {
                    input.handle_key(key);
                }
                ScreenUpdate::none()
            }
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        if self.submitting {
            return;
        }
        if let Some(input) = self.focused_field() {
            input.insert_str(text);
        }
    }
}

pub fn render(frame: &mut Frame, area: Rect, login: &LoginState) {
    let column = centered_column(60, 90, area);
    let [title, banner, email, password, button, footer] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(2),
        Constraint::Length(field_height(&login.email, 1)),
        Constraint::Length(field_height(&login.password, 1)),
        Constraint::Length(2),
        Constraint::Length(1),
    ])
    .areas(column);

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Sign in to your account",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        title,
    );
    if let Some(error) = &login.error {
        render_error_banner(frame, banner, error);
    }

    render_field(
        frame,
        email,
        &FieldView {
            label: "Email",
            field: &login.email,
            focused: login.focus == Focus::Email,
            error: login.errors.get(field::EMAIL).map(String::as_str),
            placeholder: Some("you@example.com"),
            read_only: false,
        },
    );
    render_field(
        frame,
        password,
        &FieldView {
            label: "Password",
            field: &login.password,
            focused: login.focus == Focus::Password,
            error: login.errors.get(field::PASSWORD).map(String::as_str),
            placeholder: None,
            read_only: false,
        },
    );

    let label = if login.submitting {
        "Signing in..."
    } else {
        "Sign in"
    };
    render_button(
        frame,
        button,
        label,
        login.focus == Focus::Submit,
        login.submitting,
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            "No account yet? Press F3 to sign up.",
            Style::default().fg(MUTED),
        ))
        .alignment(Alignment::Center),
        footer,
    );
}
