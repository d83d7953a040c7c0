//! YAML frontmatter and tag extraction.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use cg_core::FieldValue;
use regex::Regex;
use serde_yaml::Value;

/// Inline `#tag`: must follow whitespace or line start and contain a non-digit.
static INLINE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)#([\w/-]*[A-Za-z_/-][\w/-]*)").unwrap()
});

/// Fields and tags declared in a note's frontmatter.
#[derive(Debug, Default)]
pub struct Frontmatter {
    pub fields: BTreeMap<String, FieldValue>,
    pub tags: Vec<String>,
}

/// Splits `content` into its frontmatter block (if any) and body.
pub fn split(content: &str) -> (Option<&str>, &str) {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return (None, content);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    // Unterminated fence: treat the whole file as body.
    (None, content)
}

/// Parses a frontmatter block.
pub fn parse(yaml: &str) -> Result<Frontmatter, serde_yaml::Error> {
    let value: Value = serde_yaml::from_str(yaml)?;
    let Value::Mapping(mapping) = value else {
        return Ok(Frontmatter::default());
    };

    let mut frontmatter = Frontmatter::default();
    for (key, value) in mapping {
        let Some(key) = key_string(&key) else {
            continue;
        };
        if key == "tags" || key == "tag" {
            collect_tags(&value, &mut frontmatter.tags);
        }
        frontmatter.fields.insert(key, to_field_value(value));
    }
    Ok(frontmatter)
}

/// Tags written inline in the note body, in order of appearance.
pub fn inline_tags(body: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for caps in INLINE_TAG_RE.captures_iter(body) {
        let tag = caps[1].trim_end_matches('/').to_string();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

fn key_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn collect_tags(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            for tag in s.split([',', ' ']).map(str::trim).filter(|t| !t.is_empty()) {
                out.push(tag.trim_start_matches('#').to_string());
            }
        }
        Value::Sequence(items) => items.iter().for_each(|item| collect_tags(item, out)),
        _ => {}
    }
}

fn to_field_value(value: Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Bool(b) => FieldValue::Bool(b),
        Value::Number(n) => n.as_f64().map_or(FieldValue::Null, FieldValue::Number),
        Value::String(s) => FieldValue::Text(s),
        Value::Sequence(items) => FieldValue::List(items.into_iter().map(to_field_value).collect()),
        Value::Mapping(mapping) => FieldValue::Object(
            mapping
                .into_iter()
                .filter_map(|(k, v)| Some((key_string(&k)?, to_field_value(v))))
                .collect(),
        ),
        Value::Tagged(tagged) => to_field_value(tagged.value),
    }
}
