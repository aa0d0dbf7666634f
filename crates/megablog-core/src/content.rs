//! Conversion between the editor's plain text and stored post HTML.
//!
//! Only paragraphs are supported: blank-line separated blocks become `<p>`
//! elements, single newlines become `<br>`.

/// Converts editor text into stored HTML.
pub fn text_to_html(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| {
            let lines: Vec<String> = block.lines().map(|line| escape(line.trim_end())).collect();
            format!("<p>{}</p>", lines.join("<br>"))
        })
        .collect()
}

/// Converts stored HTML into readable plain text.
///
/// Tags are dropped; block-level closers start a new paragraph and `<br>`
/// starts a new line. Common entities are decoded.
pub fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('>') else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let tag = rest[start + 1..start + end].trim().to_ascii_lowercase();
        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or_default();
        match name {
            "br" => out.push('\n'),
            "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "blockquote"
                if tag.starts_with('/') =>
            {
                out.push_str("\n\n");
            }
            _ => {}
        }
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);

    let decoded = decode_entities(&out);
    collapse_blank_lines(&decoded)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn decode_entities(text: &str) -> String {
    const ENTITIES: [(&str, &str); 7] = [
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&#39;", "'"),
        ("&apos;", "'"),
        ("&nbsp;", " "),
        // Last, so "&amp;lt;" decodes to "&lt;" rather than "<".
        ("&amp;", "&"),
    ];
    ENTITIES
        .iter()
        .fold(text.to_string(), |acc, (entity, ch)| acc.replace(entity, ch))
}

fn collapse_blank_lines(text: &str) -> String {
    let mut paragraphs = Vec::new();
    for block in text.split("\n\n") {
        let block = block
            .lines()
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n");
        let block = block.trim();
        if !block.is_empty() {
            paragraphs.push(block.to_string());
        }
    }
    paragraphs.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_to_html_paragraphs() {
        assert_eq!(
            text_to_html("First line\nsecond line\n\n\nNext <para> & more"),
            "<p>First line<br>second line</p><p>Next &lt;para&gt; &amp; more</p>"
        );
        assert_eq!(text_to_html("   \n\n  "), "");
    }

    #[test]
    fn test_html_to_text_strips_tags() {
        let html = "<h2>Title</h2><p>Hello <strong>world</strong>&nbsp;!</p><p>a<br/>b</p>";
        assert_eq!(html_to_text(html), "Title\n\nHello world !\n\na\nb");
    }

    #[test]
    fn test_html_to_text_decodes_entities_once() {
        assert_eq!(html_to_text("<p>&amp;lt; &lt;b&gt;</p>"), "&lt; <b>");
    }

    #[test]
    fn test_editor_text_survives_storage() {
        let text = "Intro with <tags> & \"quotes\"\n\nSecond paragraph\nwith a break";
        assert_eq!(html_to_text(&text_to_html(text)), text);
    }

    #[test]
    fn test_unclosed_tag_is_kept_as_text() {
        assert_eq!(html_to_text("a < b"), "a < b");
    }
}
