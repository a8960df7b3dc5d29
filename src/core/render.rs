//! Turns caller text into the content string the mention injector edits.

use crate::api::ContentType;
use pulldown_cmark::{html, Options, Parser};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageFormat {
    Text,
    #[default]
    Markdown,
}

impl MessageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageFormat::Text => "text",
            MessageFormat::Markdown => "markdown",
        }
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(MessageFormat::Text),
            "markdown" | "md" => Ok(MessageFormat::Markdown),
            other => Err(format!(
                "Unknown message format '{other}' (expected 'text' or 'markdown')"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContent {
    pub content: String,
    pub content_type: ContentType,
}

pub trait ContentRenderer: Send + Sync {
    fn render(&self, text: &str) -> RenderedContent;
}

/// Markdown to HTML. Inline HTML such as `<at>` tags passes through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    fn options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_GFM);
        options
    }
}

impl ContentRenderer for MarkdownRenderer {
    fn render(&self, text: &str) -> RenderedContent {
        let parser = Parser::new_ext(text, Self::options());
        let mut content = String::with_capacity(text.len() + text.len() / 2);
        html::push_html(&mut content, parser);
        let trimmed = content.trim_end().len();
        content.truncate(trimmed);

        RenderedContent {
            content,
            content_type: ContentType::Html,
        }
    }
}

/// Plain text, optionally escaped into HTML so markup spans can be embedded.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextRenderer {
    pub markup: bool,
}

impl ContentRenderer for PlainTextRenderer {
    fn render(&self, text: &str) -> RenderedContent {
        if !self.markup {
            return RenderedContent {
                content: text.to_string(),
                content_type: ContentType::Text,
            };
        }

        RenderedContent {
            content: escape_text_as_html(text),
            content_type: ContentType::Html,
        }
    }
}

/// Escapes `&`, `<` and `>` and turns line breaks into `<br>`.
pub fn escape_text_as_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => out.push_str("<br>"),
            other => out.push(other),
        }
    }
    out
}

/// Picks the renderer for `format`. Plain text is upgraded to HTML when the
/// message carries mentions.
pub fn renderer_for(format: MessageFormat, needs_markup: bool) -> Box<dyn ContentRenderer> {
    match format {
        MessageFormat::Markdown => Box::new(MarkdownRenderer),
        MessageFormat::Text => Box::new(PlainTextRenderer {
            markup: needs_markup,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_renders_html_and_keeps_quotes() {
        let rendered = MarkdownRenderer.render(r#"Hi **team**, ping @"John Doe""#);

        assert_eq!(rendered.content_type, ContentType::Html);
        assert!(rendered.content.starts_with("<p>"));
        assert!(rendered.content.contains("<strong>team</strong>"));
        assert!(rendered.content.contains("John Doe"));
        assert!(!rendered.content.ends_with('\n'));
    }

    #[test]
    fn markdown_passes_inline_tags_through() {
        let rendered = MarkdownRenderer.render(r#"hello <at id="0">Ann</at>"#);
        assert!(rendered.content.contains(r#"<at id="0">Ann</at>"#));
    }

    #[test]
    fn plain_text_without_markup_is_untouched() {
        let rendered = PlainTextRenderer { markup: false }.render("a < b\nc");

        assert_eq!(rendered.content, "a < b\nc");
        assert_eq!(rendered.content_type, ContentType::Text);
    }

    #[test]
    fn plain_text_with_markup_is_escaped() {
        let rendered = PlainTextRenderer { markup: true }.render("a < b & c\r\nd\ne");

        assert_eq!(rendered.content, "a &lt; b &amp; c<br>d<br>e");
        assert_eq!(rendered.content_type, ContentType::Html);
    }

    #[test]
    fn format_parsing_accepts_aliases() {
        assert_eq!("Markdown".parse::<MessageFormat>(), Ok(MessageFormat::Markdown));
        assert_eq!("md".parse::<MessageFormat>(), Ok(MessageFormat::Markdown));
        assert_eq!("text".parse::<MessageFormat>(), Ok(MessageFormat::Text));
        assert!("rtf".parse::<MessageFormat>().is_err());
    }

    #[test]
    fn renderer_selection_upgrades_text_with_mentions() {
        let plain = renderer_for(MessageFormat::Text, false).render("x");
        let upgraded = renderer_for(MessageFormat::Text, true).render("x");

        assert_eq!(plain.content_type, ContentType::Text);
        assert_eq!(upgraded.content_type, ContentType::Html);
    }
}
