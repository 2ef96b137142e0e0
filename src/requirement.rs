// requirement.rs -- requirement line parsing and requires.txt sections

use lazy_static::lazy_static;
use regex::Regex;

use crate::exception::{InvalidData, InvalidRequirement};

lazy_static! {
    static ref REQ_RE: Regex = Regex::new(
        r"^(?P<name>[A-Za-z0-9._-]+)\s*(?:\[(?P<extras>[^\]]*)\])?\s*(?P<specs>.*)$"
    )
    .unwrap();
    static ref SPEC_RE: Regex =
        Regex::new(r"^(?P<op><=|>=|==|!=|~=|<|>)\s*(?P<ver>[^\s,]+)$").unwrap();
}

/// A tokenized requirement: project name, optional extras, and a sequence
/// of (operator, version) predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    pub project_name: String,
    pub extras: Vec<String>,
    pub specs: Vec<(String, String)>,
}

impl Requirement {
    pub fn parse(line: &str) -> Result<Self, InvalidRequirement> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(InvalidRequirement::new("empty requirement", None));
        }

        let caps = REQ_RE
            .captures(trimmed)
            .ok_or_else(|| InvalidRequirement::new(trimmed, None))?;

        let project_name = caps
            .name("name")
            .ok_or_else(|| InvalidRequirement::new(trimmed, None))?
            .as_str()
            .to_string();

        let extras: Vec<String> = caps
            .name("extras")
            .map(|m| {
                m.as_str()
                    .split(',')
                    .map(|extra| extra.trim().to_string())
                    .filter(|extra| !extra.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let mut specs = Vec::new();
        let spec_str = caps.name("specs").map(|m| m.as_str().trim()).unwrap_or("");
        if !spec_str.is_empty() {
            for part in spec_str.split(',') {
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }
                let spec = SPEC_RE
                    .captures(part)
                    .ok_or_else(|| InvalidRequirement::new(trimmed, None))?;
                specs.push((spec["op"].to_string(), spec["ver"].to_string()));
            }
        }

        Ok(Requirement {
            project_name,
            extras,
            specs,
        })
    }
}

/// Split a requirements listing into (section, lines) pairs. The leading
/// unnamed section holds unconditional requirements; named sections denote
/// extras. Blank lines and comments are skipped.
pub fn split_sections(text: &str) -> Result<Vec<(Option<String>, Vec<String>)>, InvalidData> {
    let mut sections = Vec::new();
    let mut section: Option<String> = None;
    let mut content: Vec<String> = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') {
            if !line.ends_with(']') {
                return Err(InvalidData::new(
                    &format!("invalid section heading: {}", line),
                    None,
                ));
            }
            if section.is_some() || !content.is_empty() {
                sections.push((section.take(), std::mem::take(&mut content)));
            }
            section = Some(line[1..line.len() - 1].trim().to_string());
        } else {
            content.push(line.to_string());
        }
    }
    sections.push((section, content));

    Ok(sections)
}
