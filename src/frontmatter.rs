//! Front-matter documents
//!
//! Registry pages are Markdown files whose header is a YAML block fenced by
//! `---` lines. This module splits a page into its header mapping and body,
//! and writes headers back while leaving the body untouched.

use serde::Serialize;
use serde_yaml_ng::{Mapping, Value};
use std::fs;
use std::path::Path;

use crate::error::RegistryError;

const FENCE: &str = "---";

/// A page split into its structured header and free-text body
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Parsed YAML header
    pub header: Mapping,
    /// Everything after the closing fence, byte-for-byte
    pub body: String,
}

/// Split page content into header and body
///
/// Blank lines before the opening fence are tolerated. Content without a
/// complete fenced block is a `MissingHeader` error; a header that is not a
/// YAML mapping is a `MalformedRecord` error.
pub fn parse_document(content: &str, path: &str) -> Result<Document, RegistryError> {
    let mut lines = content.split_inclusive('\n');
    let mut offset = 0;
    let mut opened = false;

    for line in lines.by_ref() {
        offset += line.len();
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        opened = trimmed == FENCE;
        break;
    }

    if !opened {
        return Err(missing_header(path));
    }

    let header_start = offset;
    for line in lines {
        if line.trim_end() == FENCE {
            let header = parse_header(&content[header_start..offset], path)?;
            let body = content[offset + line.len()..].to_string();
            return Ok(Document { header, body });
        }
        offset += line.len();
    }

    Err(missing_header(path))
}

fn missing_header(path: &str) -> RegistryError {
    RegistryError::MissingHeader {
        path: path.to_string(),
    }
}

fn parse_header(text: &str, path: &str) -> Result<Mapping, RegistryError> {
    let value: Value = serde_yaml_ng::from_str(text)
        .map_err(|e| RegistryError::malformed(path, e.to_string()))?;

    match value {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(RegistryError::malformed(path, "header is not a YAML mapping")),
    }
}

/// Read a page from disk
pub fn read_document(path: &Path) -> Result<Document, RegistryError> {
    let content = fs::read_to_string(path).map_err(|e| RegistryError::LoadError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    parse_document(&content, &path.display().to_string())
}

/// Render a header and body back into page content
pub fn render_document<T: Serialize + ?Sized>(
    header: &T,
    body: &str,
) -> Result<String, RegistryError> {
    let yaml = to_yaml_string(header)?;
    Ok(format!("{FENCE}\n{yaml}{FENCE}\n{body}"))
}

/// Serialize to YAML that YAML 1.1 readers load back unchanged
///
/// The emitter follows YAML 1.2 and leaves strings such as `yes`, `off` or
/// `2023-01-01` as plain scalars, which YAML 1.1 loaders read as booleans and
/// dates. Those scalars are single-quoted here.
pub fn to_yaml_string<T: Serialize + ?Sized>(value: &T) -> Result<String, RegistryError> {
    let yaml = serde_yaml_ng::to_string(value)?;
    Ok(quote_ambiguous_scalars(&yaml))
}

// `true` and `false` spellings are already quoted by the emitter
const YAML11_BOOLS: [&str; 16] = [
    "y", "Y", "yes", "Yes", "YES", "n", "N", "no", "No", "NO", "on", "On", "ON", "off", "Off",
    "OFF",
];

fn quote_ambiguous_scalars(yaml: &str) -> String {
    let mut out = String::with_capacity(yaml.len());
    // Indentation of the line that opened a literal or folded block
    let mut block_indent: Option<usize> = None;

    for line in yaml.split_inclusive('\n') {
        let content = line.trim_end_matches('\n');
        let indent = content.len() - content.trim_start_matches(' ').len();

        if let Some(parent) = block_indent {
            if content.trim().is_empty() || indent > parent {
                out.push_str(line);
                continue;
            }
            block_indent = None;
        }

        let (prefix, value) = split_plain_value(content);
        if value.starts_with(['|', '>']) {
            block_indent = Some(indent);
        }

        if YAML11_BOOLS.contains(&value) || looks_like_timestamp(value) {
            out.push_str(prefix);
            out.push('\'');
            out.push_str(&value.replace('\'', "''"));
            out.push('\'');
            if line.ends_with('\n') {
                out.push('\n');
            }
        } else {
            out.push_str(line);
        }
    }

    out
}

/// Split an emitted line into its `- ` / `key: ` prefix and scalar value
fn split_plain_value(line: &str) -> (&str, &str) {
    let mut start = line.len() - line.trim_start_matches(' ').len();
    while line[start..].starts_with("- ") {
        start += 2;
    }

    let rest = &line[start..];
    if !rest.starts_with(['\'', '"']) {
        if let Some(colon) = rest.find(": ") {
            start += colon + 2;
        }
    }
    line.split_at(start)
}

/// `YYYY-M-D`, optionally followed by a time, as YAML 1.1 resolves timestamps
fn looks_like_timestamp(value: &str) -> bool {
    let mut parts = value.splitn(3, '-');
    let (Some(year), Some(month), Some(rest)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    let day_len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (day, time) = rest.split_at(day_len);
    let digits = |s: &str, min: usize, max: usize| {
        (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };

    digits(year, 4, 4)
        && digits(month, 1, 2)
        && digits(day, 1, 2)
        && (time.is_empty() || time.starts_with(['T', 't', ' ', '\t']))
}

/// Write a page to disk, replacing any existing content
pub fn write_document<T: Serialize + ?Sized>(
    path: &Path,
    header: &T,
    body: &str,
) -> Result<(), RegistryError> {
    let content = render_document(header, body)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    Ok(())
}

/// Sort mapping keys recursively
///
/// Pages written by the registry go through this so the same logical record
/// always serializes to the same bytes.
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut entries: Vec<(Value, Value)> = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect();
            entries.sort_by(|(a, _), (b, _)| key_text(a).cmp(&key_text(b)));
            Value::Mapping(entries.into_iter().collect())
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(canonicalize).collect()),
        Value::Tagged(mut tagged) => {
            let inner = std::mem::replace(&mut tagged.value, Value::Null);
            tagged.value = canonicalize(inner);
            Value::Tagged(tagged)
        }
        other => other,
    }
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml_ng::to_string(other).unwrap_or_default(),
    }
}

/// Serialize a record into its canonical YAML value
pub fn to_canonical<T: Serialize + ?Sized>(record: &T) -> Result<Value, RegistryError> {
    Ok(canonicalize(serde_yaml_ng::to_value(record)?))
}

/// Rewrite a page's header in canonical form, keeping its body
///
/// Returns `true` if the file changed.
pub fn prettify_file(path: &Path) -> Result<bool, RegistryError> {
    let original = fs::read_to_string(path)?;
    let document = parse_document(&original, &path.display().to_string())?;
    let header = canonicalize(Value::Mapping(document.header));
    let rendered = render_document(&header, &document.body)?;

    if rendered == original {
        return Ok(false);
    }
    fs::write(path, rendered)?;
    Ok(true)
}
