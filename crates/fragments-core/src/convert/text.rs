//! Converters for the markup types: Markdown, HTML, and pass-through text.

use std::sync::OnceLock;

use pulldown_cmark::{html, Event, Options, Parser, Tag};
use regex::Regex;

use super::as_utf8;

fn markdown_options() -> Options {
    Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES
}

/// Render Markdown as plain text.
///
/// Markup (headings, emphasis, code spans, quotes, list markers) is dropped,
/// links keep only their text, and blank-line runs collapse to one.
pub(super) fn markdown_to_plain(data: &[u8]) -> Result<Vec<u8>, String> {
    let text = as_utf8(data)?;
    let mut out = String::with_capacity(text.len());
    let mut list_depth = 0usize;

    for event in Parser::new_ext(text, markdown_options()) {
        match event {
            Event::Start(Tag::List(_)) => list_depth += 1,
            Event::End(Tag::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
                if list_depth == 0 {
                    out.push_str("\n\n");
                }
            }
            Event::Text(t) | Event::Code(t) => out.push_str(&t),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Start(Tag::Item) => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Event::End(Tag::Item) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Event::End(Tag::TableHead | Tag::TableRow) => out.push('\n'),
            Event::End(Tag::TableCell) => out.push('\t'),
            Event::End(
                Tag::Paragraph
                | Tag::Heading(..)
                | Tag::BlockQuote
                | Tag::CodeBlock(_)
                | Tag::Table(_),
            )
            | Event::Rule => out.push_str("\n\n"),
            _ => {}
        }
    }

    Ok(collapse_blank_lines(&out).into_bytes())
}

/// Render Markdown (CommonMark plus strikethrough and tables) as HTML.
pub(super) fn markdown_to_html(data: &[u8]) -> Result<Vec<u8>, String> {
    let text = as_utf8(data)?;
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(text, markdown_options()));
    Ok(out.into_bytes())
}

fn any_tag() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

/// Strip every tag, keeping the text between them.
///
/// Bytes that are not UTF-8 become U+FFFD.
pub(super) fn html_to_plain(data: &[u8]) -> Result<Vec<u8>, String> {
    let text = String::from_utf8_lossy(data);
    let stripped = any_tag().replace_all(&text, "");
    Ok(stripped.trim().as_bytes().to_vec())
}

pub(super) fn passthrough(data: &[u8]) -> Result<Vec<u8>, String> {
    Ok(data.to_vec())
}

/// Trim trailing whitespace per line and keep at most one blank line in a row.
fn collapse_blank_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim_end) {
        if line.is_empty() && lines.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
