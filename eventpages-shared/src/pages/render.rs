/// Public page rendering
///
/// Page bodies are Markdown. Raw HTML in the source is emitted as escaped
/// text, and links or images with script URLs are neutralized.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use serde::{Deserialize, Serialize};

use crate::models::event::EventRef;
use crate::models::page::Page;

/// Render context of a public page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicPage {
    /// Localized title
    pub title: String,

    pub slug: String,

    /// Localized body as HTML
    pub content: String,
}

/// Link to a page for the event's footer or front page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub title: String,
    pub slug: String,
    pub url: String,
}

/// Public URL of a page
pub fn page_url(event: &EventRef, slug: &str) -> String {
    format!("/{}/{}/page/{}", event.organizer_slug, event.slug, slug)
}

fn is_script_url(url: &str) -> bool {
    let scheme = url.trim_start().split(':').next().unwrap_or("");
    url.contains(':')
        && ["javascript", "vbscript", "data"]
            .iter()
            .any(|s| scheme.eq_ignore_ascii_case(s))
}

/// Renders Markdown to HTML
pub fn render_markdown(source: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;

    let events = Parser::new_ext(source, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if is_script_url(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if is_script_url(&dest_url) => Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::Borrowed(""),
            title,
            id,
        }),
        other => other,
    });

    let mut output = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut output, events);
    output
}

impl PublicPage {
    /// Localizes and renders `page`
    pub fn render(page: &Page, lang: &str, fallback: &str) -> Self {
        Self {
            title: page.title.localize(lang, fallback).to_string(),
            slug: page.slug.clone(),
            content: render_markdown(page.text.localize(lang, fallback)),
        }
    }
}

impl PageLink {
    pub fn new(event: &EventRef, page: &Page, lang: &str, fallback: &str) -> Self {
        Self {
            title: page.title.localize(lang, fallback).to_string(),
            slug: page.slug.clone(),
            url: page_url(event, &page.slug),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_is_rendered() {
        let html = render_markdown("# Imprint\n\nAcme **Inc.**");
        assert!(html.contains("<h1>Imprint</h1>"));
        assert!(html.contains("<strong>Inc.</strong>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render_markdown("<script>alert(1)</script>\n\nHello <b>there</b>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_script_links_are_neutralized() {
        let html = render_markdown("[click](javascript:alert(1)) [ok](https://example.com)");
        assert!(!html.contains("javascript:"));
        assert!(html.contains(r#"href="https://example.com""#));
    }

    #[test]
    fn test_page_url() {
        let event = EventRef {
            id: uuid::Uuid::new_v4(),
            organizer_id: uuid::Uuid::new_v4(),
            organizer_slug: "acme".to_string(),
            slug: "conf".to_string(),
            name: "Conf".to_string(),
        };
        assert_eq!(page_url(&event, "imprint"), "/acme/conf/page/imprint");
    }
}
