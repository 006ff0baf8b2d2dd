//! Markdown to HTML conversion for `.md` index templates and the `markdown` helper.
//!
//! Raw HTML in the source is passed through untouched, so markdown indexes can
//! mix in hand-written markup and the output of `{{{...}}}` expressions.
//!
//! Bare URLs and email addresses in text become links. Text already inside a
//! link (markdown or raw `<a>`) or in code is left alone.

use linkify::{LinkFinder, LinkKind};
use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, html as md_html};

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options
}

pub fn render(source: &str) -> String {
    let parser = Parser::new_ext(source, options());
    let mut html = String::new();
    md_html::push_html(&mut html, autolink(parser).into_iter());
    html
}

/// Split text events around bare URLs and emails, wrapping each in a link.
fn autolink<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut finder = LinkFinder::new();
    finder.url_must_have_scheme(false);

    let mut out = Vec::new();
    let mut in_link = 0usize;
    let mut in_code = false;
    for event in events {
        match &event {
            Event::Start(Tag::Link { .. }) => in_link += 1,
            Event::End(TagEnd::Link) => in_link = in_link.saturating_sub(1),
            Event::Start(Tag::CodeBlock(_)) => in_code = true,
            Event::End(TagEnd::CodeBlock) => in_code = false,
            Event::InlineHtml(tag) | Event::Html(tag) => {
                let tag = tag.trim_start().to_ascii_lowercase();
                if tag.starts_with("<a ") || tag.starts_with("<a>") {
                    in_link += 1;
                } else if tag.starts_with("</a") {
                    in_link = in_link.saturating_sub(1);
                }
            }
            Event::Text(text) if in_link == 0 && !in_code => {
                split_links(&finder, text, &mut out);
                continue;
            }
            _ => {}
        }
        out.push(event);
    }
    out
}

fn split_links<'a>(finder: &LinkFinder, text: &str, out: &mut Vec<Event<'a>>) {
    for span in finder.spans(text) {
        let piece = span.as_str().to_string();
        let (link_type, dest) = match span.kind() {
            Some(LinkKind::Url) if piece.contains("://") => (LinkType::Autolink, piece.clone()),
            Some(LinkKind::Url) => (LinkType::Autolink, format!("http://{piece}")),
            Some(LinkKind::Email) => (LinkType::Email, format!("mailto:{piece}")),
            _ => {
                out.push(Event::Text(CowStr::from(piece)));
                continue;
            }
        };
        out.push(Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::from(dest),
            title: CowStr::from(""),
            id: CowStr::from(""),
        }));
        out.push(Event::Text(CowStr::from(piece)));
        out.push(Event::End(TagEnd::Link));
    }
}
