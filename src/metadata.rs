// metadata.rs -- PKG-INFO (metadata 1.x) to Metadata 2.0 conversion

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::description::dedent_description;
use crate::document::{Document, DocumentBuilder, ExtraRequirement, MetadataValue};
use crate::exception::InvalidData;
use crate::pkginfo::PkgInfo;
use crate::requirement::{split_sections, Requirement};
use crate::util::unique;

pub const METADATA_VERSION: &str = "2.0";

/// Sentinel commonly emitted by naive metadata generators for unset fields.
pub const UNKNOWN_VALUE: &str = "UNKNOWN";

static PLURAL_FIELDS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "classifier" => "classifiers",
    "provides_dist" => "provides",
};

static SKIP_FIELDS: phf::Set<&'static str> = phf::phf_set! {};

// commonly filled out as "UNKNOWN" by distutils:
static UNKNOWN_FIELDS: phf::Set<&'static str> = phf::phf_set! {
    "author",
    "author_email",
    "platform",
    "home_page",
    "license",
};

// Only the extra-equality marker form is understood here. A requirement
// carrying any other marker expression lands in neither bucket.
lazy_static! {
    static ref EXTRA_RE: Regex = Regex::new(r"^extra == '(?P<extra>.+)'").unwrap();
}

/// Per-key handling, evaluated in fixed priority order. `Skip` and a
/// matching `SuppressIfPlaceholder` drop the key; every other rule is
/// terminal for its key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRule {
    Skip,
    SuppressIfPlaceholder,
    Pluralize(&'static str),
    Requirement,
    ProvidesExtra,
    HomePage,
    Default,
}

fn rules_for(low_key: &str) -> Vec<FieldRule> {
    let mut chain = Vec::new();
    if SKIP_FIELDS.contains(low_key) {
        chain.push(FieldRule::Skip);
    }
    if UNKNOWN_FIELDS.contains(low_key) {
        chain.push(FieldRule::SuppressIfPlaceholder);
    }
    chain.push(if let Some(plural) = PLURAL_FIELDS.get(low_key) {
        FieldRule::Pluralize(plural)
    } else if low_key == "requires_dist" {
        FieldRule::Requirement
    } else if low_key == "provides_extra" {
        FieldRule::ProvidesExtra
    } else if low_key == "home_page" {
        FieldRule::HomePage
    } else {
        FieldRule::Default
    });
    chain
}

/// Optional side information about the distribution under conversion.
/// Accessors default to absent; implementations expose what they know.
pub trait Distribution {
    fn tests_require(&self) -> Option<Vec<String>> {
        None
    }
}

/// Split repeated Requires-Dist values into unconditional requirements and
/// per-extra buckets. Markers other than `extra == '<name>'` drop their
/// requirement from both.
pub fn group_requirements(values: &[String]) -> (Vec<String>, BTreeMap<String, Vec<String>>) {
    let mut requirements = Vec::new();
    let mut extra_requirements: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for value in values {
        let (requirement, marker) = match value.find(';') {
            Some(pos) => (&value[..pos], value[pos + 1..].trim()),
            None => (value.as_str(), ""),
        };
        if marker.is_empty() {
            requirements.push(requirement.to_string());
        } else if let Some(caps) = EXTRA_RE.captures(marker) {
            extra_requirements
                .entry(caps["extra"].to_string())
                .or_default()
                .push(requirement.to_string());
        } else {
            log::debug!("ignoring requirement with unsupported marker: {}", value);
        }
    }

    (requirements, extra_requirements)
}

/// Convert a parsed header block to a prototype Metadata 2.0 document.
pub fn pkginfo_to_dict(pkg_info: &PkgInfo, distribution: Option<&dyn Distribution>) -> Document {
    let mut builder = DocumentBuilder::new();

    // The description comes from the dedicated header when present and
    // non-empty, from the free-text payload otherwise.
    let mut description_consumed = false;
    match pkg_info.raw("description").filter(|v| !v.is_empty()) {
        Some(source) => {
            builder.set_scalar("description", &dedent_description(source));
            description_consumed = true;
        }
        None => {
            if let Some(payload) = pkg_info.payload() {
                builder.set_scalar("description", payload);
            }
        }
    }

    for key in unique(pkg_info.keys().into_iter().map(|k| k.to_lowercase())) {
        let low_key = key.replace('-', "_");
        if description_consumed && low_key == "description" {
            continue;
        }
        for rule in rules_for(&low_key) {
            match rule {
                FieldRule::Skip => break,
                FieldRule::SuppressIfPlaceholder => {
                    if pkg_info.get(&key).as_deref() == Some(UNKNOWN_VALUE) {
                        break;
                    }
                }
                FieldRule::Pluralize(plural) => {
                    builder.set(plural, MetadataValue::List(pkg_info.get_all(&key)));
                    break;
                }
                FieldRule::Requirement => {
                    let (requirements, extra_requirements) =
                        group_requirements(&pkg_info.get_all(&key));
                    builder.set("requires", MetadataValue::List(requirements));
                    if !extra_requirements.is_empty() {
                        builder.extend_extras(extra_requirements.keys().cloned());
                        let may_require = extra_requirements
                            .into_iter()
                            .map(|(extra, dependencies)| ExtraRequirement {
                                extra,
                                dependencies,
                            })
                            .collect();
                        builder.set("may_require", MetadataValue::Requirements(may_require));
                    }
                    break;
                }
                FieldRule::ProvidesExtra => {
                    builder.extend_extras(pkg_info.get_all(&key));
                    break;
                }
                FieldRule::HomePage => {
                    if let Some(value) = pkg_info.get(&key) {
                        let mut urls = BTreeMap::new();
                        urls.insert("Home".to_string(), value);
                        builder.set("project_urls", MetadataValue::Urls(urls));
                    }
                    break;
                }
                FieldRule::Default => {
                    if let Some(value) = pkg_info.get(&key) {
                        builder.set_scalar(&low_key, &value);
                    }
                    break;
                }
            }
        }
    }

    builder.set_scalar("metadata_version", METADATA_VERSION);

    if let Some(distribution) = distribution {
        if let Some(requirements) = distribution.tests_require() {
            if !requirements.is_empty() {
                builder.set("test_requires", MetadataValue::List(requirements));
            }
        }
    }

    builder.finish()
}

/// Compose the parenthesized version-predicate segment, PEP 345 fashion.
pub fn requires_to_requires_dist(requirement: &Requirement) -> String {
    let specs: Vec<String> = requirement
        .specs
        .iter()
        .map(|(op, ver)| format!("{}{}", op, ver))
        .collect();
    if specs.is_empty() {
        return String::new();
    }
    format!(" ({})", specs.join(","))
}

/// Compose one Requires-Dist header value from a parsed requirement and an
/// optional extra condition. Empty segments are omitted entirely.
pub fn compose_requires_dist(requirement: &Requirement, extra: Option<&str>) -> String {
    let mut line = requirement.project_name.clone();
    if !requirement.extras.is_empty() {
        line.push_str(&format!("[{}]", requirement.extras.join(",")));
    }
    line.push_str(&requires_to_requires_dist(requirement));
    if let Some(extra) = extra {
        line.push_str(&format!("; extra == '{}'", extra));
    }
    line
}

/// Rewrite a legacy header block in place to the Metadata 2.0 draft form:
/// Metadata-Version is replaced, Provides-Extra and Requires-Dist headers
/// are synthesized from the requirements listing, and the description
/// header moves into the payload, normalized. Other headers are untouched.
pub fn pkginfo_to_metadata(
    pkg_info: &mut PkgInfo,
    requires: Option<&str>,
) -> Result<(), InvalidData> {
    pkg_info.replace_header("Metadata-Version", METADATA_VERSION);

    if let Some(requires) = requires {
        for (extra, reqs) in split_sections(requires)? {
            let condition = extra.as_deref();
            if let Some(extra) = condition {
                pkg_info.add("Provides-Extra", extra);
            }
            for req in reqs {
                let requirement = Requirement::parse(&req)
                    .map_err(|e| InvalidData::new(&e.to_string(), None))?;
                pkg_info.add(
                    "Requires-Dist",
                    &compose_requires_dist(&requirement, condition),
                );
            }
        }
    }

    let source = pkg_info.raw("description").filter(|v| !v.is_empty()).cloned();
    if let Some(source) = source {
        pkg_info.set_payload(&dedent_description(&source));
        pkg_info.del("Description");
    }

    Ok(())
}
