// description.rs -- description normalization and transport escaping

use crate::pkginfo::HeaderValue;

// Bytes that are not valid UTF-8 round-trip through the private use area,
// U+F700 + byte, so a header-safe transport encoding never corrupts them.
const ESCAPE_BASE: u32 = 0xF700;

/// Decode raw bytes as UTF-8, escaping each invalid byte reversibly.
pub fn decode_escaped(data: &[u8]) -> String {
    let mut out = String::new();
    let mut rest = data;
    loop {
        match std::str::from_utf8(rest) {
            Ok(text) => {
                out.push_str(text);
                break;
            }
            Err(err) => {
                let (valid, after) = rest.split_at(err.valid_up_to());
                out.push_str(std::str::from_utf8(valid).unwrap());
                out.push(char::from_u32(ESCAPE_BASE + after[0] as u32).unwrap());
                rest = &after[1..];
            }
        }
    }
    out
}

/// Exact inverse of `decode_escaped`: escape characters become their
/// original byte, everything else its UTF-8 encoding.
pub fn encode_escaped(text: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for ch in text.chars() {
        let cp = ch as u32;
        if (ESCAPE_BASE..ESCAPE_BASE + 0x100).contains(&cp) {
            out.push((cp - ESCAPE_BASE) as u8);
        } else {
            let mut buf = [0u8; 4];
            out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        }
    }
    out
}

// Channel form: ASCII stays itself, every other byte of the UTF-8 encoding
// becomes its escape character. Feeding the result to encode_escaped
// reproduces the original byte stream.
fn to_channel(text: &str) -> String {
    encode_escaped(text)
        .into_iter()
        .map(|b| {
            if b < 0x80 {
                b as char
            } else {
                char::from_u32(ESCAPE_BASE + b as u32).unwrap()
            }
        })
        .collect()
}

/// Dedent a description value.
///
/// The first line is stripped of leading whitespace, the remaining lines
/// lose their common indentation as a block, and a trailing blank line is
/// appended. A byte-sourced value is decoded first and re-expressed in
/// channel form afterwards, so it still matches its transport constraints.
pub fn dedent_description(source: &HeaderValue) -> String {
    match source {
        HeaderValue::Text(text) => dedent_text(text),
        HeaderValue::Bytes(raw) => to_channel(&dedent_text(&decode_escaped(raw))),
    }
}

fn dedent_text(description: &str) -> String {
    let lines: Vec<&str> = description.split('\n').collect();
    let first = lines.first().map(|line| line.trim_start()).unwrap_or("");
    let rest = if lines.len() > 1 {
        dedent(&lines[1..].join("\n"))
    } else {
        String::new()
    };
    format!("{}\n{}\n\n", first, rest)
}

// textwrap-style block dedent: whitespace-only lines are normalized to
// empty and do not count toward the margin.
fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();

    let mut margin: Option<&str> = None;
    for line in &lines {
        let stripped = line.trim_start_matches([' ', '\t']);
        if stripped.is_empty() {
            continue;
        }
        let indent = &line[..line.len() - stripped.len()];
        margin = Some(match margin {
            None => indent,
            Some(prefix) => common_prefix(prefix, indent),
        });
    }
    let margin = margin.unwrap_or("");

    lines
        .iter()
        .map(|line| {
            if line.trim_start_matches([' ', '\t']).is_empty() {
                ""
            } else {
                line.strip_prefix(margin).unwrap_or(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    &a[..len]
}
