//! Render collaborator: markdown source to preview HTML and to the
//! highlighted markup shown behind the editor.

use std::sync::OnceLock;

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use regex::{Captures, Regex};

use crate::util::escape_html;

/// Text-to-HTML transformations the store's hosts call.
///
/// Both operations are total: a renderer that fails internally must still
/// return escaped text rather than an error.
pub trait Renderer: Send + Sync {
    /// Render `text` as HTML that is safe to inject into the preview pane
    fn render_to_safe_html(&self, text: &str) -> String;

    /// Wrap markdown syntax in `md-*` spans for the editor's highlight layer
    fn highlight_for_editing(&self, text: &str) -> String;
}

/// Markdown renderer backed by `pulldown-cmark`.
///
/// The preview follows GitHub-flavored markdown with single newlines kept
/// as line breaks. Raw HTML in the source is shown as text, and links or
/// images with script-capable URLs point nowhere. Editor highlighting
/// recognises headings, blockquotes, bold, italic and inline code.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    fn options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
        options
    }
}

impl Renderer for MarkdownRenderer {
    fn render_to_safe_html(&self, text: &str) -> String {
        let parser = Parser::new_ext(text, Self::options()).map(sanitize_event);
        let mut rendered = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut rendered, parser);
        rendered
    }

    fn highlight_for_editing(&self, text: &str) -> String {
        let escaped = escape_html(text);
        let Some(inline) = inline_pattern() else {
            return escaped;
        };

        let mut html = escaped
            .split('\n')
            .map(|line| highlight_line(line, inline))
            .collect::<Vec<_>>()
            .join("\n");

        // A trailing newline has no height in the overlay without this.
        if text.ends_with('\n') {
            html.push_str("<br>");
        }
        html
    }
}

fn sanitize_event(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::SoftBreak => Event::HardBreak,
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let scheme: String = url
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace() && !ch.is_ascii_control())
        .take(12)
        .collect::<String>()
        .to_ascii_lowercase();

    if ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|blocked| scheme.starts_with(blocked))
    {
        tracing::debug!("Replaced unsafe link target in preview");
        return CowStr::Borrowed("#");
    }
    url
}

fn inline_pattern() -> Option<&'static Regex> {
    static INLINE: OnceLock<Option<Regex>> = OnceLock::new();
    INLINE
        .get_or_init(|| {
            Regex::new(r"(`[^`]+`)|(\*\*[^*]+\*\*)|(\*[^*]+\*)")
                .map_err(|error| tracing::error!("Invalid inline highlight pattern: {}", error))
                .ok()
        })
        .as_ref()
}

fn highlight_line(line: &str, inline: &Regex) -> String {
    let body = inline.replace_all(line, |caps: &Captures<'_>| {
        let class = if caps.get(1).is_some() {
            "md-code"
        } else if caps.get(2).is_some() {
            "md-bold"
        } else {
            "md-italic"
        };
        format!(r#"<span class="{class}">{}</span>"#, &caps[0])
    });

    if let Some(level) = heading_level(line) {
        format!(r#"<span class="md-heading md-h{level}">{body}</span>"#)
    } else if line.starts_with("&gt;") {
        format!(r#"<span class="md-blockquote">{body}</span>"#)
    } else {
        body.into_owned()
    }
}

fn heading_level(line: &str) -> Option<usize> {
    let level = line.chars().take_while(|ch| *ch == '#').count();
    let rest = &line[level..];
    ((1..=6).contains(&level) && (rest.is_empty() || rest.starts_with(' '))).then_some(level)
}
