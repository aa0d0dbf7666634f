//! Declarative form validation.
//!
//! Each form is a table of [`FieldRule`]s evaluated by [`validate`], which has
//! no knowledge of the UI. For every field the checks run in order (required,
//! min length, max length, patterns, cross-field) and the first failure wins.
//! An empty optional field skips every other check.

use std::collections::BTreeMap;
use std::fs;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::ImageFile;

/// Field names shared by the rule tables and the screens.
pub mod field {
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
    pub const CONFIRM_PASSWORD: &str = "confirm_password";
    pub const ACCEPT_TERMS: &str = "accept_terms";
    pub const TITLE: &str = "title";
    pub const SLUG: &str = "slug";
    pub const CONTENT: &str = "content";
    pub const STATUS: &str = "status";
    pub const IMAGE: &str = "image";
}

/// Value stored for a checked checkbox.
pub const CHECKED: &str = "true";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("valid email regex")
});
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s]+$").expect("valid name regex"));
static LOWER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new("[a-z]").expect("valid regex"));
static UPPER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new("[A-Z]").expect("valid regex"));
static DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").expect("valid regex"));
static SPECIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[@$!%*?&]").expect("valid regex"));
static IMAGE_EXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(png|jpe?g|gif)$").expect("valid image regex"));

const PASSWORD_STRENGTH_MSG: &str =
    "Password must include uppercase, lowercase, number, and special character";

/// Cross-field check: receives the field value and the whole form.
pub type CrossFieldCheck = fn(&str, &FormValues) -> Option<&'static str>;

/// Validation rule for one field.
#[derive(Clone)]
pub struct FieldRule {
    pub field: &'static str,
    /// Message shown when the field is empty. `None` makes the field optional.
    pub required: Option<&'static str>,
    pub min_length: Option<(usize, &'static str)>,
    pub max_length: Option<(usize, &'static str)>,
    /// Every pattern must match; the first mismatch reports its message.
    pub patterns: Vec<(&'static Regex, &'static str)>,
    pub cross_field: Option<CrossFieldCheck>,
}

impl FieldRule {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            required: None,
            min_length: None,
            max_length: None,
            patterns: Vec::new(),
            cross_field: None,
        }
    }

    #[must_use]
    pub fn required(mut self, message: &'static str) -> Self {
        self.required = Some(message);
        self
    }

    #[must_use]
    pub fn min_length(mut self, len: usize, message: &'static str) -> Self {
        self.min_length = Some((len, message));
        self
    }

    #[must_use]
    pub fn max_length(mut self, len: usize, message: &'static str) -> Self {
        self.max_length = Some((len, message));
        self
    }

    #[must_use]
    pub fn pattern(mut self, regex: &'static Regex, message: &'static str) -> Self {
        self.patterns.push((regex, message));
        self
    }

    #[must_use]
    pub fn cross_field(mut self, check: CrossFieldCheck) -> Self {
        self.cross_field = Some(check);
        self
    }

    /// Returns the first failing message for this field, if any.
    pub fn check(&self, values: &FormValues) -> Option<&'static str> {
        let value = values.get(self.field);

        if value.trim().is_empty() {
            return self.required;
        }

        let len = value.chars().count();
        if let Some((min, message)) = self.min_length
            && len < min
        {
            return Some(message);
        }
        if let Some((max, message)) = self.max_length
            && len > max
        {
            return Some(message);
        }
        if let Some((_, message)) = self.patterns.iter().find(|(re, _)| !re.is_match(value)) {
            return Some(message);
        }
        self.cross_field.and_then(|check| check(value, values))
    }
}

impl std::fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRule")
            .field("field", &self.field)
            .field("required", &self.required)
            .field("min_length", &self.min_length)
            .field("max_length", &self.max_length)
            .field("patterns", &self.patterns.len())
            .field("cross_field", &self.cross_field.is_some())
            .finish()
    }
}

/// Current values of a form, keyed by field name. Missing fields read as "".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: BTreeMap<&'static str, String>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map_or("", String::as_str)
    }

    pub fn set(&mut self, field: &'static str, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    #[must_use]
    pub fn with(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }
}

/// Per-field error messages. Empty means the form is valid.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Runs every rule and collects the first failure per field.
pub fn validate(rules: &[FieldRule], values: &FormValues) -> FieldErrors {
    rules
        .iter()
        .filter_map(|rule| {
            rule.check(values)
                .map(|message| (rule.field, message.to_string()))
        })
        .collect()
}

pub fn login_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new(field::EMAIL)
            .required("Email is required")
            .pattern(&EMAIL_RE, "Please enter a valid email address"),
        FieldRule::new(field::PASSWORD)
            .required("Password is required")
            .min_length(6, "Password must be at least 6 characters long"),
    ]
}

pub fn signup_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new(field::NAME)
            .required("Full name is required")
            .min_length(2, "Name must be at least 2 characters")
            .max_length(50, "Name must be less than 50 characters")
            .pattern(&NAME_RE, "Name can only contain letters and spaces"),
        FieldRule::new(field::EMAIL)
            .required("Email is required")
            .pattern(&EMAIL_RE, "Please enter a valid email address"),
        FieldRule::new(field::PASSWORD)
            .required("Password is required")
            .min_length(8, "Password must be at least 8 characters")
            .pattern(&LOWER_RE, PASSWORD_STRENGTH_MSG)
            .pattern(&UPPER_RE, PASSWORD_STRENGTH_MSG)
            .pattern(&DIGIT_RE, PASSWORD_STRENGTH_MSG)
            .pattern(&SPECIAL_RE, PASSWORD_STRENGTH_MSG),
        FieldRule::new(field::CONFIRM_PASSWORD)
            .required("Please confirm your password")
            .cross_field(passwords_match),
        FieldRule::new(field::ACCEPT_TERMS)
            .required("You must accept the terms and conditions")
            .cross_field(is_checked),
    ]
}

/// Rules for the post editor. The image is only required when creating.
pub fn post_rules(creating: bool) -> Vec<FieldRule> {
    let mut image = FieldRule::new(field::IMAGE).pattern(
        &IMAGE_EXT_RE,
        "Only PNG, JPG, JPEG and GIF images are supported",
    );
    if creating {
        image = image.required("Featured image is required");
    }

    vec![
        FieldRule::new(field::TITLE).required("Title is required"),
        FieldRule::new(field::SLUG).required("Slug is required"),
        FieldRule::new(field::STATUS)
            .required("Status is required")
            .cross_field(is_known_status),
        image,
    ]
}

/// Checks the selected image on disk. Returns an error message on failure.
pub fn check_image_file(image: &ImageFile, max_bytes: u64) -> Option<String> {
    match fs::metadata(&image.path) {
        Ok(meta) if !meta.is_file() => Some(format!("{} is not a file", image.path.display())),
        Ok(meta) if meta.len() > max_bytes => Some(format!(
            "Image must be {} or smaller",
            format_size(max_bytes)
        )),
        Ok(_) => None,
        Err(_) => Some(format!("Cannot read image {}", image.path.display())),
    }
}

fn format_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}

fn passwords_match(value: &str, values: &FormValues) -> Option<&'static str> {
    (value != values.get(field::PASSWORD)).then_some("Passwords do not match")
}

fn is_checked(value: &str, _values: &FormValues) -> Option<&'static str> {
    (value != CHECKED).then_some("You must accept the terms and conditions")
}

fn is_known_status(value: &str, _values: &FormValues) -> Option<&'static str> {
    value
        .parse::<crate::models::PostStatus>()
        .is_err()
        .then_some("Status is required")
}

/// One line of the signup screen's password checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrengthCheck {
    pub label: &'static str,
    pub met: bool,
}

/// Live password checklist shown under the signup password field.
pub fn password_strength(password: &str) -> [StrengthCheck; 5] {
    [
        StrengthCheck {
            label: "At least 8 characters",
            met: password.chars().count() >= 8,
        },
        StrengthCheck {
            label: "One uppercase letter",
            met: UPPER_RE.is_match(password),
        },
        StrengthCheck {
            label: "One lowercase letter",
            met: LOWER_RE.is_match(password),
        },
        StrengthCheck {
            label: "One number",
            met: DIGIT_RE.is_match(password),
        },
        StrengthCheck {
            label: "One special character (@$!%*?&)",
            met: SPECIAL_RE.is_match(password),
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn signup_values() -> FormValues {
        FormValues::new()
            .with(field::NAME, "Ann Smith")
            .with(field::EMAIL, "ann@example.com")
            .with(field::PASSWORD, "Secret1!x")
            .with(field::CONFIRM_PASSWORD, "Secret1!x")
            .with(field::ACCEPT_TERMS, CHECKED)
    }

    #[test]
    fn test_login_valid() {
        let values = FormValues::new()
            .with(field::EMAIL, "ann@example.com")
            .with(field::PASSWORD, "secret");
        assert!(validate(&login_rules(), &values).is_empty());
    }

    #[test]
    fn test_login_messages() {
        let errors = validate(&login_rules(), &FormValues::new());
        assert_eq!(errors[field::EMAIL], "Email is required");
        assert_eq!(errors[field::PASSWORD], "Password is required");

        let values = FormValues::new()
            .with(field::EMAIL, "not-an-email")
            .with(field::PASSWORD, "abc");
        let errors = validate(&login_rules(), &values);
        assert_eq!(errors[field::EMAIL], "Please enter a valid email address");
        assert_eq!(
            errors[field::PASSWORD],
            "Password must be at least 6 characters long"
        );
    }

    #[test]
    fn test_signup_valid() {
        assert!(validate(&signup_rules(), &signup_values()).is_empty());
    }

    #[test]
    fn test_signup_name_rules_in_order() {
        let rules = signup_rules();
        let cases = [
            ("", "Full name is required"),
            ("A", "Name must be at least 2 characters"),
            (
                "Abcdefghij Abcdefghij Abcdefghij Abcdefghij Abcdefghij",
                "Name must be less than 50 characters",
            ),
            ("Ann 2", "Name can only contain letters and spaces"),
        ];
        for (name, expected) in cases {
            let errors = validate(&rules, &signup_values().with(field::NAME, name));
            assert_eq!(errors[field::NAME], expected, "name {name:?}");
        }
    }

    #[test]
    fn test_signup_password_strength_and_confirm() {
        let rules = signup_rules();
        let weak = signup_values()
            .with(field::PASSWORD, "alllowercase1!")
            .with(field::CONFIRM_PASSWORD, "alllowercase1!");
        assert_eq!(validate(&rules, &weak)[field::PASSWORD], PASSWORD_STRENGTH_MSG);

        let short = signup_values().with(field::PASSWORD, "Ab1!");
        assert_eq!(
            validate(&rules, &short)[field::PASSWORD],
            "Password must be at least 8 characters"
        );

        let mismatch = signup_values().with(field::CONFIRM_PASSWORD, "Other1!xx");
        assert_eq!(
            validate(&rules, &mismatch)[field::CONFIRM_PASSWORD],
            "Passwords do not match"
        );

        let missing = signup_values().with(field::CONFIRM_PASSWORD, "");
        assert_eq!(
            validate(&rules, &missing)[field::CONFIRM_PASSWORD],
            "Please confirm your password"
        );
    }

    #[test]
    fn test_signup_terms_required() {
        let errors = validate(&signup_rules(), &signup_values().with(field::ACCEPT_TERMS, ""));
        assert_eq!(
            errors[field::ACCEPT_TERMS],
            "You must accept the terms and conditions"
        );
    }

    #[test]
    fn test_post_rules_image_required_only_on_create() {
        let values = FormValues::new()
            .with(field::TITLE, "Hello")
            .with(field::SLUG, "hello")
            .with(field::STATUS, "active");

        let create = validate(&post_rules(true), &values);
        assert_eq!(create[field::IMAGE], "Featured image is required");

        assert!(validate(&post_rules(false), &values).is_empty());

        let bad_ext = values.with(field::IMAGE, "/tmp/photo.bmp");
        assert_eq!(
            validate(&post_rules(false), &bad_ext)[field::IMAGE],
            "Only PNG, JPG, JPEG and GIF images are supported"
        );
    }

    #[test]
    fn test_post_rules_required_fields() {
        let errors = validate(&post_rules(false), &FormValues::new());
        assert_eq!(errors[field::TITLE], "Title is required");
        assert_eq!(errors[field::SLUG], "Slug is required");
        assert_eq!(errors[field::STATUS], "Status is required");
        assert!(!errors.contains_key(field::IMAGE));
    }

    #[test]
    fn test_check_image_file_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.png");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(&[0u8; 64]).unwrap();

        let image = ImageFile::new(&path);
        assert_eq!(check_image_file(&image, 1024), None);
        assert_eq!(
            check_image_file(&image, 32),
            Some("Image must be 32 bytes or smaller".to_string())
        );
        assert!(check_image_file(&ImageFile::new(dir.path().join("missing.png")), 1024).is_some());
    }

    #[test]
    fn test_password_strength_checklist() {
        let checks = password_strength("abc");
        assert!(!checks[0].met);
        assert!(!checks[1].met);
        assert!(checks[2].met);

        assert!(password_strength("Secret1!x").iter().all(|c| c.met));
    }
}
