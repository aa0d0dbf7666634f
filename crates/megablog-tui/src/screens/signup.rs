//! Signup screen with the live password checklist.

use crossterm::event::{KeyCode, KeyEvent};
use megablog_core::forms::{self, CHECKED, FieldErrors, FormValues, field, password_strength};
use megablog_core::models::NewAccount;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::{ScreenCtx, ScreenUpdate};
use crate::common::widgets::{
    ACCENT, FieldView, MUTED, centered_column, field_height, render_button, render_checkbox,
    render_error_banner, render_field,
};
use crate::common::{TaskKind, TextField};
use crate::effects::UiEffect;

const FOCUS_ORDER: [Focus; 6] = [
    Focus::Name,
    Focus::Email,
    Focus::Password,
    Focus::Confirm,
    Focus::Terms,
    Focus::Submit,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Name,
    Email,
    Password,
    Confirm,
    Terms,
    Submit,
}

#[derive(Debug)]
pub struct SignupState {
    name: TextField,
    email: TextField,
    password: TextField,
    confirm: TextField,
    accept_terms: bool,
    focus: usize,
    errors: FieldErrors,
    error: Option<String>,
    submitting: bool,
}

impl Default for SignupState {
    fn default() -> Self {
        Self::new()
    }
}

impl SignupState {
    pub fn new() -> Self {
        Self {
            name: TextField::new(),
            email: TextField::new(),
            password: TextField::masked(),
            confirm: TextField::masked(),
            accept_terms: false,
            focus: 0,
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

    pub fn on_failed(&mut self, message: String) {
        self.submitting = false;
        self.error = Some(message);
    }

    fn focus(&self) -> Focus {
        FOCUS_ORDER[self.focus]
    }

    fn values(&self) -> FormValues {
        let terms = if self.accept_terms { CHECKED } else { "" };
        FormValues::new()
            .with(field::NAME, self.name.value().trim())
            .with(field::EMAIL, self.email.value().trim())
            .with(field::PASSWORD, self.password.value())
            .with(field::CONFIRM_PASSWORD, self.confirm.value())
            .with(field::ACCEPT_TERMS, terms)
    }

    fn focused_field(&mut self) -> Option<&mut TextField> {
        match self.focus() {
            Focus::Name => Some(&mut self.name),
            Focus::Email => Some(&mut self.email),
            Focus::Password => Some(&mut self.password),
            Focus::Confirm => Some(&mut self.confirm),
            Focus::Terms | Focus::Submit => None,
        }
    }

    fn submit(&mut self, ctx: &mut ScreenCtx<'_>) -> ScreenUpdate {
        if self.submitting {
            return ScreenUpdate::none();
        }
        let values = self.values();
        self.errors = forms::validate(&forms::signup_rules(), &values);
        if !self.errors.is_empty() {
            return ScreenUpdate::none();
        }
        self.error = None;
        self.submitting = true;
        ScreenUpdate::effects(vec![UiEffect::Signup {
            task: ctx.start_task(TaskKind::Auth),
            account: NewAccount::from_form(&values),
        }])
    }

    pub fn handle_key(&mut self, ctx: &mut ScreenCtx<'_>, key: KeyEvent) -> ScreenUpdate {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % FOCUS_ORDER.len();
                ScreenUpdate::none()
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + FOCUS_ORDER.len() - 1) % FOCUS_ORDER.len();
                ScreenUpdate::none()
            }
            KeyCode::Enter => self.submit(ctx),
            KeyCode::Esc => ScreenUpdate::back(),
            KeyCode::F(_) => ScreenUpdate::none(),
            _ if self.submitting => ScreenUpdate::none(),
            KeyCode::Char(' ') if self.focus() == Focus::Terms => {
                self.accept_terms = !self.accept_terms;
                ScreenUpdate::none()
            }
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

pub fn render(frame: &mut Frame, area: Rect, signup: &SignupState) {
    let column = centered_column(64, 100, area);
    let [
        title,
        banner,
        name,
        email,
        password,
        checklist,
        confirm,
        terms,
        button,
    ] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(field_height(&signup.name, 1)),
        Constraint::Length(field_height(&signup.email, 1)),
        Constraint::Length(field_height(&signup.password, 1)),
        Constraint::Length(5),
        Constraint::Length(field_height(&signup.confirm, 1)),
        Constraint::Length(2),
        Constraint::Length(1),
    ])
    .areas(column);

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Create your account",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        title,
    );
    if let Some(error) = &signup.error {
        render_error_banner(frame, banner, error);
    }

    let focus = signup.focus();
    let fields = [
        (name, "Full name", &signup.name, Focus::Name, field::NAME),
        (email, "Email", &signup.email, Focus::Email, field::EMAIL),
        (password, "Password", &signup.password, Focus::Password, field::PASSWORD),
        (
            confirm,
            "Confirm password",
            &signup.confirm,
            Focus::Confirm,
            field::CONFIRM_PASSWORD,
        ),
    ];
    for (area, label, input, target, key) in fields {
        render_field(
            frame,
            area,
            &FieldView {
                label,
                field: input,
                focused: focus == target,
                error: signup.errors.get(key).map(String::as_str),
                placeholder: None,
                read_only: false,
            },
        );
    }

    let checks: Vec<Line> = password_strength(signup.password.value())
        .iter()
        .map(|check| {
            let (mark, color) = if check.met { ("✓", ACCENT) } else { ("·", MUTED) };
            Line::from(vec![
                Span::styled(format!("  {mark} "), Style::default().fg(color)),
                Span::styled(check.label, Style::default().fg(color)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(checks), checklist);

    render_checkbox(
        frame,
        terms,
        "I accept the terms and conditions",
        signup.accept_terms,
        focus == Focus::Terms,
        signup.errors.get(field::ACCEPT_TERMS).map(String::as_str),
    );

    let label = if signup.submitting {
        "Creating account..."
    } else {
        "Create account"
    };
    render_button(frame, button, label, focus == Focus::Submit, signup.submitting);
}
