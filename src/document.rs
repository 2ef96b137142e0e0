// document.rs -- Metadata 2.0 document model

use std::collections::BTreeMap;

use serde::Serialize;

use crate::util::unique;

/// The structured document produced by the forward conversion.
pub type Document = BTreeMap<String, MetadataValue>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Scalar(String),
    List(Vec<String>),
    Requirements(Vec<ExtraRequirement>),
    Contacts(Vec<Contact>),
    Urls(BTreeMap<String, String>),
}

/// Requirements conditioned on one extra.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtraRequirement {
    pub extra: String,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: String,
}

const CONTACT_FIELDS: &[(&str, &str, &str)] = &[
    ("author", "author_email", "author"),
    ("maintainer", "maintainer_email", "maintainer"),
];

/// Staging structure for document construction. Fields accumulate here;
/// `finish` applies the extras invariant and contact consolidation and
/// produces the immutable document.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    fields: Document,
    extras: Vec<String>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        DocumentBuilder::default()
    }

    pub fn set(&mut self, key: &str, value: MetadataValue) {
        self.fields.insert(key.to_string(), value);
    }

    pub fn set_scalar(&mut self, key: &str, value: &str) {
        self.set(key, MetadataValue::Scalar(value.to_string()));
    }

    pub fn extend_extras<I>(&mut self, names: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.extras.extend(names);
    }

    pub fn finish(mut self) -> Document {
        // extras is only present when referenced, sorted, duplicates removed
        if !self.extras.is_empty() {
            let mut extras = unique(self.extras);
            extras.sort();
            self.fields
                .insert("extras".to_string(), MetadataValue::List(extras));
        }

        let mut contacts = Vec::new();
        for (name_field, email_field, role) in CONTACT_FIELDS {
            let name = take_scalar(&mut self.fields, name_field);
            let email = take_scalar(&mut self.fields, email_field);
            if name.is_some() || email.is_some() {
                contacts.push(Contact {
                    name,
                    email,
                    role: role.to_string(),
                });
            }
        }
        if !contacts.is_empty() {
            self.fields
                .insert("contacts".to_string(), MetadataValue::Contacts(contacts));
        }

        self.fields
    }
}

fn take_scalar(fields: &mut Document, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(MetadataValue::Scalar(value)) => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extras_sorted_and_deduplicated() {
        let mut builder = DocumentBuilder::new();
        builder.extend_extras(vec![
            "test".to_string(),
            "dev".to_string(),
            "test".to_string(),
        ]);
        let document = builder.finish();
        assert_eq!(
            document.get("extras"),
            Some(&MetadataValue::List(vec![
                "dev".to_string(),
                "test".to_string()
            ]))
        );
    }

    #[test]
    fn test_extras_absent_when_never_referenced() {
        let mut builder = DocumentBuilder::new();
        builder.set_scalar("name", "example");
        let document = builder.finish();
        assert!(!document.contains_key("extras"));
    }

    #[test]
    fn test_contact_consolidation() {
        let mut builder = DocumentBuilder::new();
        builder.set_scalar("author", "Jane Doe");
        builder.set_scalar("author_email", "jane@x.org");
        let document = builder.finish();

        assert!(!document.contains_key("author"));
        assert!(!document.contains_key("author_email"));
        assert_eq!(
            document.get("contacts"),
            Some(&MetadataValue::Contacts(vec![Contact {
                name: Some("Jane Doe".to_string()),
                email: Some("jane@x.org".to_string()),
                role: "author".to_string(),
            }]))
        );
    }

    #[test]
    fn test_contact_with_single_piece() {
        let mut builder = DocumentBuilder::new();
        builder.set_scalar("maintainer_email", "team@x.org");
        let document = builder.finish();
        assert_eq!(
            document.get("contacts"),
            Some(&MetadataValue::Contacts(vec![Contact {
                name: None,
                email: Some("team@x.org".to_string()),
                role: "maintainer".to_string(),
            }]))
        );
    }

    #[test]
    fn test_author_precedes_maintainer() {
        let mut builder = DocumentBuilder::new();
        builder.set_scalar("maintainer", "Team");
        builder.set_scalar("author", "Jane Doe");
        let document = builder.finish();
        match document.get("contacts") {
            Some(MetadataValue::Contacts(contacts)) => {
                assert_eq!(contacts[0].role, "author");
                assert_eq!(contacts[1].role, "maintainer");
            }
            other => panic!("expected contacts, got {:?}", other),
        }
    }

    #[test]
    fn test_no_contacts_without_pieces() {
        let mut builder = DocumentBuilder::new();
        builder.set_scalar("name", "example");
        let document = builder.finish();
        assert!(!document.contains_key("contacts"));
    }

    #[test]
    fn test_contact_serialization_omits_missing_pieces() {
        let contact = Contact {
            name: None,
            email: Some("team@x.org".to_string()),
            role: "maintainer".to_string(),
        };
        let json = serde_json::to_string(&contact).unwrap();
        assert_eq!(json, r#"{"email":"team@x.org","role":"maintainer"}"#);
    }
}
