//! Slug derivation for post ids.

/// Derives a URL-safe slug from free text.
///
/// Lowercases ASCII letters and digits; every run of other characters
/// (whitespace included) becomes a single hyphen. Leading and trailing
/// separators are dropped, so the output only contains `[a-z0-9-]`, never
/// `--`, and `slugify(slugify(x)) == slugify(x)`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for ch in input.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Slug field that follows the title until the user edits it directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlugField {
    /// Text as typed (or derived from the title).
    raw: String,
    /// True once the user typed into the slug field after the last title edit.
    manual: bool,
}

impl SlugField {
    /// Starts from an existing slug (e.g. when editing a stored post).
    pub fn with_value(value: &str) -> Self {
        Self {
            raw: value.to_string(),
            manual: false,
        }
    }

    /// The effective slug.
    pub fn value(&self) -> String {
        slugify(&self.raw)
    }

    /// The text shown in the input box.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_manual(&self) -> bool {
        self.manual
    }

    /// A title edit always wins over an earlier direct edit.
    pub fn on_title_changed(&mut self, title: &str) {
        self.raw = slugify(title);
        self.manual = false;
    }

    /// A direct edit wins until the title changes again.
    pub fn on_slug_input(&mut self, raw: &str) {
        self.raw = raw.to_string();
        self.manual = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(slug: &str) {
        assert!(
            slug.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
            "unexpected character in {slug:?}"
        );
        assert!(!slug.contains("--"), "double hyphen in {slug:?}");
        assert!(!slug.starts_with('-') && !slug.ends_with('-'), "edge hyphen in {slug:?}");
    }

    #[test]
    fn test_reference_title() {
        assert_eq!(slugify("Hello, World!  2024"), "hello-world-2024");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   \t\n"), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_mixed_separators_collapse() {
        assert_eq!(slugify("a - b"), "a-b");
        assert_eq!(slugify("  Rust & WebAssembly: a love story  "), "rust-webassembly-a-love-story");
        assert_eq!(slugify("--already-a-slug--"), "already-a-slug");
        assert_eq!(slugify("Café déjà vu"), "caf-d-j-vu");
    }

    #[test]
    fn test_idempotent_and_well_formed() {
        let samples = [
            "Hello, World!  2024",
            "  leading and trailing  ",
            "under_score and.dot",
            "ÜNÏCÖDÉ title",
            "tabs\tand\nnewlines",
            "x",
            "--",
            "a--b",
            "émoji 🎉 party",
        ];
        for sample in samples {
            let once = slugify(sample);
            assert_eq!(slugify(&once), once, "not idempotent for {sample:?}");
            assert_well_formed(&once);
        }
    }

    #[test]
    fn test_field_follows_title() {
        let mut field = SlugField::default();
        field.on_title_changed("My First Post");
        assert_eq!(field.value(), "my-first-post");
        assert!(!field.is_manual());
    }

    #[test]
    fn test_direct_edit_wins_until_title_changes() {
        let mut field = SlugField::default();
        field.on_title_changed("My First Post");
        field.on_slug_input("Custom Slug!");
        assert_eq!(field.value(), "custom-slug");
        assert!(field.is_manual());

        field.on_title_changed("Renamed Post");
        assert_eq!(field.value(), "renamed-post");
        assert!(!field.is_manual());
    }

    #[test]
    fn test_with_value_keeps_existing_slug() {
        let field = SlugField::with_value("stored-id");
        assert_eq!(field.value(), "stored-id");
        assert_eq!(field.raw(), "stored-id");
    }
}
