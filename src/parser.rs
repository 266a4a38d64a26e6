use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use crate::error::Error;
use crate::model::{Entry, Inference};
use crate::value::{self, Value};

/// Parse dotenv entries from text, keeping every value as a string.
///
/// Parsing never fails: lines that are not records are skipped.
pub fn parse_str(input: &str) -> Vec<Entry> {
    parse_str_with_mode(input, Inference::Disabled)
}

/// Parse dotenv entries from text using a specific inference mode.
pub fn parse_str_with_mode(input: &str, inference: Inference) -> Vec<Entry> {
    parse_str_with_source(input, None, inference)
}

/// Parse dotenv entries from raw bytes. Invalid UTF-8 is decoded lossily.
pub fn parse_bytes(input: &[u8]) -> Vec<Entry> {
    parse_bytes_with_mode(input, Inference::Disabled)
}

/// Parse dotenv entries from raw bytes using a specific inference mode.
pub fn parse_bytes_with_mode(input: &[u8], inference: Inference) -> Vec<Entry> {
    parse_str_with_mode(&decode(input), inference)
}

/// Parse dotenv entries from a buffered reader.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<Vec<Entry>, Error> {
    parse_reader_with_mode(reader, Inference::Disabled)
}

/// Parse dotenv entries from a buffered reader using a specific inference mode.
pub fn parse_reader_with_mode<R: BufRead>(
    mut reader: R,
    inference: Inference,
) -> Result<Vec<Entry>, Error> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(parse_bytes_with_mode(&buf, inference))
}

/// Decode file bytes: strip a leading BOM, replace invalid UTF-8.
pub(crate) fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8_lossy(bytes)
}

pub(crate) fn parse_str_with_source(
    input: &str,
    source: Option<&Path>,
    inference: Inference,
) -> Vec<Entry> {
    let normalized = normalize_newlines(input);
    let input = normalized.as_ref();

    let mut entries = Vec::new();
    let mut by_key = HashMap::<String, usize>::new();

    let mut offset = 0usize;
    let mut line_num = 1u32;
    let bytes = input.as_bytes();

    while offset < bytes.len() {
        let (end, entry) = match scan_record(input, offset) {
            Some(record) => {
                let entry = Entry {
                    key: record.key.to_owned(),
                    value: resolve_value(record.raw_value, inference),
                    source: source.map(Path::to_path_buf),
                    line: line_num,
                };
                (record.end, Some(entry))
            }
            None => (line_end(bytes, offset), None),
        };

        line_num += bytes[offset..end].iter().filter(|byte| **byte == b'\n').count() as u32;
        offset = end;
        if offset < bytes.len() && bytes[offset] == b'\n' {
            offset += 1;
            line_num += 1;
        }

        let Some(entry) = entry else {
            continue;
        };

        if let Some(existing_idx) = by_key.get(&entry.key).copied() {
            entries[existing_idx] = entry;
        } else {
            by_key.insert(entry.key.clone(), entries.len());
            entries.push(entry);
        }
    }

    entries
}

fn normalize_newlines(input: &str) -> Cow<'_, str> {
    if !input.contains('\r') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            out.push('\n');
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            continue;
        }
        out.push(ch);
    }

    Cow::Owned(out)
}

struct RawRecord<'a> {
    key: &'a str,
    /// Text after `=`, including continuation lines and their separating newlines.
    raw_value: &'a str,
    /// Offset just past the last byte of the record (a `\n` or end of input).
    end: usize,
}

/// Match one record starting at `start`, which must be the beginning of a line.
fn scan_record(input: &str, start: usize) -> Option<RawRecord<'_>> {
    let bytes = input.as_bytes();
    let mut idx = start;

    while idx < bytes.len() && bytes[idx] == b' ' {
        idx += 1;
    }

    let key_start = idx;
    if !bytes.get(idx).copied().is_some_and(is_key_start) {
        return None;
    }
    idx += 1;
    while idx < bytes.len() && is_key_char(bytes[idx]) {
        idx += 1;
    }
    let key_end = idx;

    while idx < bytes.len() && is_inline_space(bytes[idx]) {
        idx += 1;
    }
    if bytes.get(idx) != Some(&b'=') {
        return None;
    }

    let value_start = idx + 1;
    let mut end = line_end(bytes, value_start);
    while end < bytes.len() {
        let next_start = end + 1;
        let next_end = line_end(bytes, next_start);
        if !is_continuation(&bytes[next_start..next_end]) {
            break;
        }
        end = next_end;
    }

    Some(RawRecord {
        key: &input[key_start..key_end],
        raw_value: &input[value_start..end],
        end,
    })
}

fn line_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|byte| *byte == b'\n')
        .map_or(bytes.len(), |pos| from + pos)
}

/// A continuation line is non-empty and has no `=` or `#` unless escaped with `\`.
fn is_continuation(line: &[u8]) -> bool {
    !line.is_empty()
        && line.iter().enumerate().all(|(idx, byte)| {
            !matches!(*byte, b'=' | b'#') || (idx > 0 && line[idx - 1] == b'\\')
        })
}

fn is_key_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

fn is_key_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

fn is_inline_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\x0b' | b'\x0c')
}

fn resolve_value(raw: &str, inference: Inference) -> Value {
    let candidate = unquote(raw).unwrap_or_else(|| raw.trim_matches(value::is_whitespace));
    value::resolve(unescape(candidate).into_owned(), inference)
}

/// Inner text of a value wrapped entirely in matching `"` or `'`, ignoring
/// surrounding spaces.
fn unquote(raw: &str) -> Option<&str> {
    let inner = raw.trim_matches(' ');
    let quote = inner.chars().next().filter(|ch| matches!(*ch, '"' | '\''))?;
    if inner.len() < 2 || !inner.ends_with(quote) {
        return None;
    }

    Some(&inner[1..inner.len() - 1])
}

fn unescape(value: &str) -> Cow<'_, str> {
    if !value.contains('\\') {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\'
            && let Some(next) = chars.next_if(|next| matches!(*next, '#' | '=' | '"' | '\''))
        {
            out.push(next);
            continue;
        }
        out.push(ch);
    }

    Cow::Owned(out)
}
