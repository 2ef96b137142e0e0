// pkginfo.rs -- PKG-INFO header block reader/writer

use crate::description::{decode_escaped, encode_escaped};
use crate::exception::InvalidData;

/// One header value as read from the file. `Text` holds values whose raw
/// bytes were valid UTF-8; `Bytes` preserves anything else verbatim for
/// the reversible decode path.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Text(String),
    Bytes(Vec<u8>),
}

impl HeaderValue {
    pub fn to_text(&self) -> String {
        match self {
            HeaderValue::Text(text) => text.clone(),
            HeaderValue::Bytes(raw) => decode_escaped(raw),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            HeaderValue::Text(text) => text.is_empty(),
            HeaderValue::Bytes(raw) => raw.is_empty(),
        }
    }
}

/// An ordered header block with repeatable, case-insensitive keys and an
/// optional free-text payload after the first blank line.
#[derive(Debug, Clone, Default)]
pub struct PkgInfo {
    headers: Vec<(String, HeaderValue)>,
    payload: Option<String>,
}

impl PkgInfo {
    pub fn new() -> Self {
        PkgInfo::default()
    }

    pub fn parse(data: &[u8]) -> Result<Self, InvalidData> {
        let mut raw_headers: Vec<(String, Vec<u8>)> = Vec::new();
        let mut iter = data.split(|&b| b == b'\n');
        let mut found_blank = false;

        for line in iter.by_ref() {
            let line = strip_cr(line);
            if line.is_empty() {
                found_blank = true;
                break;
            }
            if line[0] == b' ' || line[0] == b'\t' {
                match raw_headers.last_mut() {
                    Some((_, value)) => {
                        value.push(b'\n');
                        value.extend_from_slice(line);
                    }
                    None => {
                        return Err(InvalidData::new(
                            "continuation line before any header",
                            None,
                        ));
                    }
                }
                continue;
            }
            let colon = line.iter().position(|&b| b == b':').ok_or_else(|| {
                InvalidData::new(
                    &format!(
                        "header line without a colon: {}",
                        String::from_utf8_lossy(line)
                    ),
                    None,
                )
            })?;
            let key = std::str::from_utf8(&line[..colon])
                .map_err(|_| InvalidData::new("non-UTF-8 header name", None))?
                .trim()
                .to_string();
            let mut value = &line[colon + 1..];
            if value.first() == Some(&b' ') {
                value = &value[1..];
            }
            raw_headers.push((key, value.to_vec()));
        }

        let payload = if found_blank {
            let mut body: Vec<u8> = Vec::new();
            for (i, line) in iter.enumerate() {
                if i > 0 {
                    body.push(b'\n');
                }
                body.extend_from_slice(strip_cr(line));
            }
            if body.is_empty() {
                None
            } else {
                Some(decode_escaped(&body))
            }
        } else {
            None
        };

        let headers = raw_headers
            .into_iter()
            .map(|(key, value)| {
                let value = match String::from_utf8(value) {
                    Ok(text) => HeaderValue::Text(text),
                    Err(err) => HeaderValue::Bytes(err.into_bytes()),
                };
                (key, value)
            })
            .collect();

        Ok(PkgInfo { headers, payload })
    }

    /// Last value for a key, case-insensitively, decoded.
    pub fn get(&self, key: &str) -> Option<String> {
        self.headers
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.to_text())
    }

    /// All values for a key in file order, decoded.
    pub fn get_all(&self, key: &str) -> Vec<String> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.to_text())
            .collect()
    }

    /// Last value for a key prior to any decoding.
    pub fn raw(&self, key: &str) -> Option<&HeaderValue> {
        self.headers
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    /// Every key in file order, repeats included, original casing.
    pub fn keys(&self) -> Vec<&str> {
        self.headers.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Append a header; repeated keys are allowed.
    pub fn add(&mut self, key: &str, value: &str) {
        self.headers
            .push((key.to_string(), HeaderValue::Text(value.to_string())));
    }

    /// Replace the first occurrence in place; append when the key is absent.
    pub fn replace_header(&mut self, key: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
        {
            Some((_, v)) => *v = HeaderValue::Text(value.to_string()),
            None => self.add(key, value),
        }
    }

    /// Remove every occurrence of a key.
    pub fn del(&mut self, key: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    pub fn set_payload(&mut self, payload: &str) {
        self.payload = Some(payload.to_string());
    }

    pub fn render(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (key, value) in &self.headers {
            out.extend_from_slice(key.as_bytes());
            out.extend_from_slice(b": ");
            match value {
                HeaderValue::Text(text) => {
                    for (i, line) in text.split('\n').enumerate() {
                        if i > 0 {
                            out.push(b'\n');
                            if !line.starts_with([' ', '\t']) {
                                out.extend_from_slice(b"        ");
                            }
                        }
                        out.extend_from_slice(line.as_bytes());
                    }
                }
                HeaderValue::Bytes(raw) => out.extend_from_slice(raw),
            }
            out.push(b'\n');
        }
        if let Some(payload) = &self.payload {
            out.push(b'\n');
            out.extend_from_slice(&encode_escaped(payload));
        }
        out
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}
