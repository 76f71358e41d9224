//! Content validation: structural checks of raw bytes against a declared type.
//!
//! Only types with recognizable structure are checked. Plain text, Markdown
//! and images are accepted as-is; broken images surface later, when a
//! conversion tries to decode them.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ValidationError;
use crate::types::BareType;

/// A structural check over decoded text. `Err` carries the reason.
type TextCheck = fn(&str) -> Result<(), String>;

/// Separators accepted on the first line of a CSV document.
const CSV_SEPARATORS: [char; 4] = [',', ';', '\t', '|'];

/// Validate `data` against its declared type.
///
/// HTML and CSV are decoded lossily, so a document in another charset is
/// judged on its structure alone. JSON and YAML must be valid UTF-8.
pub fn validate_content(content_type: BareType, data: &[u8]) -> Result<(), ValidationError> {
    let Some(check) = check_for(content_type) else {
        return Ok(());
    };

    let text = if decodes_lossily(content_type) {
        String::from_utf8_lossy(data)
    } else {
        Cow::Borrowed(
            std::str::from_utf8(data).map_err(|_| ValidationError::NotUtf8 { content_type })?,
        )
    };
    check(&text).map_err(|reason| ValidationError::Malformed {
        content_type,
        reason,
    })
}

fn decodes_lossily(content_type: BareType) -> bool {
    matches!(content_type, BareType::TextHtml | BareType::TextCsv)
}

fn check_for(content_type: BareType) -> Option<TextCheck> {
    match content_type {
        BareType::TextHtml => Some(check_html),
        BareType::TextCsv => Some(check_csv),
        BareType::ApplicationJson => Some(check_json),
        BareType::ApplicationYaml | BareType::ApplicationXYaml => Some(check_yaml),
        BareType::TextPlain
        | BareType::TextMarkdown
        | BareType::ImagePng
        | BareType::ImageJpeg
        | BareType::ImageWebp
        | BareType::ImageAvif
        | BareType::ImageGif => None,
    }
}

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"</?[^>]+>").expect("tag pattern is valid"))
}

fn tag_name_pattern() -> &'static Regex {
    static NAME: OnceLock<Regex> = OnceLock::new();
    NAME.get_or_init(|| Regex::new(r"<([a-zA-Z0-9]+)").expect("tag name pattern is valid"))
}

/// Balanced-tag check over tag names.
///
/// Attributes and void elements are not inspected: `<br>` without a slash
/// counts as an unclosed tag. An opening token is named by its first
/// `<name`, so a stray `<` in text folds into the tag that follows it.
fn check_html(text: &str) -> Result<(), String> {
    let mut tags = tag_pattern().find_iter(text).map(|m| m.as_str()).peekable();
    if tags.peek().is_none() {
        return Err("missing HTML tags".into());
    }

    let mut open: Vec<String> = Vec::new();
    for tag in tags {
        // <!DOCTYPE>, <!-- comments -->, <?xml ...?>
        if tag.starts_with("<!") || tag.starts_with("<?") {
            continue;
        }
        if tag[..tag.len() - 1].trim_end().ends_with('/') {
            continue;
        }

        if let Some(rest) = tag.strip_prefix("</") {
            let name = rest[..rest.len() - 1].trim().to_ascii_lowercase();
            match open.pop() {
                Some(top) if top == name => {}
                Some(top) => return Err(format!("</{name}> closes <{top}>")),
                None => return Err(format!("</{name}> has no opening tag")),
            }
        } else {
            let name = tag_name_pattern()
                .captures(tag)
                .and_then(|caps| caps.get(1))
                .ok_or_else(|| format!("tag without a name: {tag}"))?;
            open.push(name.as_str().to_ascii_lowercase());
        }
    }

    match open.pop() {
        None => Ok(()),
        Some(unclosed) => Err(format!("<{unclosed}> is never closed")),
    }
}

/// Heuristic: the first line must contain a separator.
fn check_csv(text: &str) -> Result<(), String> {
    let first = text
        .trim()
        .lines()
        .next()
        .ok_or_else(|| String::from("no rows"))?;
    if first.contains(CSV_SEPARATORS) {
        Ok(())
    } else {
        Err("first line has no separator".into())
    }
}

fn check_json(text: &str) -> Result<(), String> {
    serde_json::from_str::<serde::de::IgnoredAny>(text)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// The document must be a mapping; top-level scalars and sequences are rejected.
fn check_yaml(text: &str) -> Result<(), String> {
    if !text.contains(':') {
        return Err("no mapping syntax".into());
    }
    match serde_yaml::from_str::<serde_yaml::Value>(text).map_err(|e| e.to_string())? {
        serde_yaml::Value::Mapping(_) => Ok(()),
        serde_yaml::Value::Null => Err("document is empty".into()),
        _ => Err("top-level value is not a mapping".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(s: &str) -> Result<(), ValidationError> {
        validate_content(BareType::TextHtml, s.as_bytes())
    }

    #[test]
    fn test_html_simple_paragraph() {
        assert!(html("<p>Hello World</p>").is_ok());
    }

    #[test]
    fn test_html_without_tags_is_invalid() {
        let err = html("Hello World").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Malformed {
                content_type: BareType::TextHtml,
                ..
            }
        ));
        assert!(err.to_string().contains("missing HTML tags"));
    }

    #[test]
    fn test_html_self_closing_tags_are_skipped() {
        assert!(html(r#"<div><img src="x"/><br/></div>"#).is_ok());
        assert!(html(r#"<div><img src="test.jpg" /><br /></div>"#).is_ok());
    }

    #[test]
    fn test_html_mismatched_tags() {
        assert!(html("<div>test</span>").is_err());
        assert!(html("</p>").is_err());
        assert!(html("<div><p>unclosed</div>").is_err());
    }

    #[test]
    fn test_html_unclosed_tag() {
        assert!(html("<div>").is_err());
        assert!(html("<br>").is_err());
    }

    #[test]
    fn test_html_case_insensitive_names() {
        assert!(html("<DIV><P>x</p></Div>").is_ok());
    }

    #[test]
    fn test_html_nested_document() {
        let doc = r#"<!DOCTYPE html>
<html lang="en">
  <!-- comment -->
  <head><title>t</title></head>
  <body><ul><li>a</li><li>b</li></ul></body>
</html>"#;
        assert!(html(doc).is_ok());
    }

    #[test]
    fn test_html_nameless_tag() {
        assert!(html("< p>x</p>").is_err());
    }

    #[test]
    fn test_html_stray_angle_bracket_in_text() {
        assert!(html("x < y <p>z</p>").is_ok());
    }

    #[test]
    fn test_html_and_csv_in_other_charsets() {
        assert!(validate_content(BareType::TextHtml, b"<p>caf\xe9</p>").is_ok());
        assert!(validate_content(BareType::TextCsv, b"nom,ville\nJos\xe9,Qu\xe9bec").is_ok());
        assert!(validate_content(BareType::TextHtml, b"caf\xe9").is_err());
    }

    #[test]
    fn test_json() {
        assert!(validate_content(BareType::ApplicationJson, br#"{"key": "value"}"#).is_ok());
        assert!(validate_content(BareType::ApplicationJson, b"[1, 2, 3]").is_ok());
        assert!(validate_content(BareType::ApplicationJson, b"invalid json").is_err());
        assert!(validate_content(BareType::ApplicationJson, br#"{"a": 1} {"b": 2}"#).is_err());
    }

    #[test]
    fn test_csv() {
        assert!(validate_content(BareType::TextCsv, b"header1,header2\nvalue1,value2").is_ok());
        assert!(validate_content(BareType::TextCsv, b"a;b\n1;2").is_ok());
        assert!(validate_content(BareType::TextCsv, b"a\tb").is_ok());
        assert!(validate_content(BareType::TextCsv, b"a|b").is_ok());
        assert!(validate_content(BareType::TextCsv, b"not a csv").is_err());
        assert!(validate_content(BareType::TextCsv, b"   \n  ").is_err());
    }

    #[test]
    fn test_yaml() {
        for t in [BareType::ApplicationYaml, BareType::ApplicationXYaml] {
            assert!(validate_content(t, b"name: test\nvalue: 123").is_ok());
            assert!(validate_content(t, b"just a scalar").is_err());
            assert!(validate_content(t, b"- a: 1\n- b: 2").is_err());
            assert!(validate_content(t, b"key: [unclosed").is_err());
        }
    }

    #[test]
    fn test_unchecked_types_accept_anything() {
        for t in [
            BareType::TextPlain,
            BareType::TextMarkdown,
            BareType::ImagePng,
            BareType::ImageGif,
        ] {
            assert!(validate_content(t, &[0xff, 0x00, 0x13]).is_ok());
        }
    }

    #[test]
    fn test_json_and_yaml_require_utf8() {
        let err = validate_content(BareType::ApplicationJson, b"\"caf\xe9\"").unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotUtf8 {
                content_type: BareType::ApplicationJson
            }
        );
        assert_eq!(err.content_type(), BareType::ApplicationJson);

        let err = validate_content(BareType::ApplicationYaml, b"name: caf\xe9").unwrap_err();
        assert!(matches!(err, ValidationError::NotUtf8 { .. }));
    }
}
