//! Front matter detection and parsing.
//!
//! A document carries front matter only when its very first line is the `---`
//! delimiter. Everything up to the next `---` line is parsed as a YAML mapping;
//! the remainder is the Markdown body.
//!
//! Values are read leniently: authors write `order: "3"`, `duration: 5` and
//! `tags: onboarding` as often as the canonical forms, so each field is
//! converted from whatever YAML scalar it holds instead of failing the parse.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

const DELIMITER: &str = "---";

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Front matter is not a key-value mapping")]
    NotAMapping,
}

/// Recognized front matter keys. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub order: Option<OrderValue>,
    pub date: Option<String>,
    pub tags: Vec<String>,
    pub duration: Option<DurationValue>,
    /// Explicit output slug; takes priority over every derived slug.
    pub slug: Option<String>,
}

/// The `order` key as written. `Null` and `Invalid` both resolve to the default order.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderValue {
    Number(i64),
    Null,
    Invalid(String),
}

/// The `duration` key as written, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum DurationValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Split raw document text into its front matter block and body.
///
/// Returns `(Some(yaml), body)` when the document opens with a delimiter line
/// and a closing delimiter line follows; otherwise `(None, text)`.
pub fn split(text: &str) -> (Option<&str>, &str) {
    let Some(first_end) = text.find('\n') else {
        return (None, text);
    };
    if text[..first_end].trim_end_matches('\r') != DELIMITER {
        return (None, text);
    }

    let yaml_start = first_end + 1;
    let mut line_start = yaml_start;
    while line_start <= text.len() {
        let line_end = text[line_start..]
            .find('\n')
            .map(|i| line_start + i)
            .unwrap_or(text.len());
        if text[line_start..line_end].trim_end_matches('\r') == DELIMITER {
            let body_start = (line_end + 1).min(text.len());
            return (Some(&text[yaml_start..line_start]), &text[body_start..]);
        }
        if line_end == text.len() {
            break;
        }
        line_start = line_end + 1;
    }
    (None, text)
}

/// Parse a front matter block into the recognized keys.
///
/// An empty block yields `FrontMatter::default()`.
pub fn parse(yaml: &str) -> Result<FrontMatter, FrontMatterError> {
    let value: Value = serde_yaml::from_str(yaml)?;
    let mapping = match value {
        Value::Mapping(m) => m,
        Value::Null => return Ok(FrontMatter::default()),
        _ => return Err(FrontMatterError::NotAMapping),
    };

    Ok(FrontMatter {
        title: get(&mapping, "title").and_then(scalar_string),
        category: get(&mapping, "category").and_then(scalar_string),
        subcategory: get(&mapping, "subcategory").and_then(scalar_string),
        order: get(&mapping, "order").map(order_value),
        date: get(&mapping, "date").and_then(scalar_string),
        tags: get(&mapping, "tags").map(tag_list).unwrap_or_default(),
        duration: get(&mapping, "duration").and_then(duration_value),
        slug: get(&mapping, "slug").and_then(scalar_string),
    })
}

fn get<'a>(mapping: &'a Mapping, key: &str) -> Option<&'a Value> {
    mapping.get(key)
}

/// Render a YAML scalar as text. Null, empty strings and collections give `None`.
fn scalar_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Tagged(tagged) => return scalar_string(&tagged.value),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

fn order_value(value: &Value) -> OrderValue {
    match value {
        Value::Null => OrderValue::Null,
        Value::Number(n) => match n.as_i64() {
            Some(i) => OrderValue::Number(i),
            None => match n.as_f64() {
                Some(f) if f.is_finite() => OrderValue::Number(f.trunc() as i64),
                _ => OrderValue::Invalid(n.to_string()),
            },
        },
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(i) => OrderValue::Number(i),
            Err(_) => OrderValue::Invalid(s.clone()),
        },
        other => OrderValue::Invalid(format!("{other:?}")),
    }
}

fn duration_value(value: &Value) -> Option<DurationValue> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(DurationValue::Integer(i)),
            None => n.as_f64().map(DurationValue::Float),
        },
        Value::String(s) => Some(DurationValue::Text(s.clone())),
        Value::Tagged(tagged) => duration_value(&tagged.value),
        _ => None,
    }
}

/// `tags: [a, b]` and `tags: a` are both accepted.
fn tag_list(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items.iter().filter_map(scalar_string).collect(),
        other => scalar_string(other).into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_recognizes_leading_block() {
        let text = "---\ntitle: Hello\n---\n# Body\n";
        let (yaml, body) = split(text);
        assert_eq!(yaml, Some("title: Hello\n"));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn split_requires_delimiter_on_first_line() {
        let text = "\n---\ntitle: Hello\n---\nBody";
        let (yaml, body) = split(text);
        assert_eq!(yaml, None);
        assert_eq!(body, text);
    }

    #[test]
    fn split_without_closing_delimiter_is_body() {
        let text = "---\ntitle: Hello\nno closing line";
        let (yaml, body) = split(text);
        assert_eq!(yaml, None);
        assert_eq!(body, text);
    }

    #[test]
    fn split_handles_crlf() {
        let text = "---\r\ntitle: Hello\r\n---\r\nBody";
        let (yaml, body) = split(text);
        assert_eq!(yaml, Some("title: Hello\r\n"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn split_closing_delimiter_at_end_of_file() {
        let (yaml, body) = split("---\ntitle: Only\n---");
        assert_eq!(yaml, Some("title: Only\n"));
        assert_eq!(body, "");
    }

    #[test]
    fn split_ignores_inline_dashes() {
        let text = "---\ntitle: a---b\n---\nBody";
        let (yaml, _) = split(text);
        assert_eq!(yaml, Some("title: a---b\n"));
    }

    #[test]
    fn parse_all_recognized_keys() {
        let yaml = r#"
title: ビジョン
category: 最初にみる動画
subcategory: 01_はじめに
order: 2
date: 2024-04-01
tags: [onboarding, video]
duration: 5
slug: our-vision
extra: ignored
"#;
        let fm = parse(yaml).unwrap();
        assert_eq!(fm.title.as_deref(), Some("ビジョン"));
        assert_eq!(fm.category.as_deref(), Some("最初にみる動画"));
        assert_eq!(fm.subcategory.as_deref(), Some("01_はじめに"));
        assert_eq!(fm.order, Some(OrderValue::Number(2)));
        assert_eq!(fm.date.as_deref(), Some("2024-04-01"));
        assert_eq!(fm.tags, vec!["onboarding", "video"]);
        assert_eq!(fm.duration, Some(DurationValue::Integer(5)));
        assert_eq!(fm.slug.as_deref(), Some("our-vision"));
    }

    #[test]
    fn parse_lenient_scalars() {
        let fm = parse("order: \"7\"\ntags: single\ntitle: 42\n").unwrap();
        assert_eq!(fm.order, Some(OrderValue::Number(7)));
        assert_eq!(fm.tags, vec!["single"]);
        assert_eq!(fm.title.as_deref(), Some("42"));
    }

    #[test]
    fn parse_null_and_invalid_order() {
        let fm = parse("order: null\n").unwrap();
        assert_eq!(fm.order, Some(OrderValue::Null));

        let fm = parse("order: first\n").unwrap();
        assert_eq!(fm.order, Some(OrderValue::Invalid("first".to_string())));
    }

    #[test]
    fn parse_duration_forms() {
        assert_eq!(
            parse("duration: \"10\"").unwrap().duration,
            Some(DurationValue::Text("10".to_string()))
        );
        assert_eq!(
            parse("duration: 2.5").unwrap().duration,
            Some(DurationValue::Float(2.5))
        );
        assert_eq!(parse("duration: ~").unwrap().duration, None);
    }

    #[test]
    fn parse_empty_block_is_default() {
        assert_eq!(parse("").unwrap(), FrontMatter::default());
    }

    #[test]
    fn parse_invalid_yaml_is_error() {
        assert!(matches!(
            parse("title: [unclosed\n"),
            Err(FrontMatterError::Yaml(_))
        ));
    }

    #[test]
    fn parse_non_mapping_is_error() {
        assert!(matches!(
            parse("- just\n- a list\n"),
            Err(FrontMatterError::NotAMapping)
        ));
    }
}
