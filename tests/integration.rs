use std::fs;

use tempfile::TempDir;

use pkgmeta_rs::document::MetadataValue;
use pkgmeta_rs::metadata::{pkginfo_to_dict, pkginfo_to_metadata};
use pkgmeta_rs::pkginfo::PkgInfo;

const PKG_INFO: &[u8] = b"Metadata-Version: 1.1\n\
Name: complex-dist\n\
Version: 0.1\n\
Author: Illustrious Author\n\
Author-email: illustrious@example.org\n\
License: UNKNOWN\n\
Home-page: http://example.org/complex-dist\n\
Classifier: Development Status :: 4 - Beta\n\
Classifier: Programming Language :: Python\n\
Requires-Dist: quux (>=1.0)\n\
Requires-Dist: splort (==4)\n\
Requires-Dist: simple; extra == 'simple'\n\
Provides-Extra: simple\n\
\n\
A long description of complex-dist.\n";

#[test]
fn test_forward_conversion_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("PKG-INFO");
    fs::write(&path, PKG_INFO).unwrap();

    let data = fs::read(&path).unwrap();
    let pkg_info = PkgInfo::parse(&data).unwrap();
    let document = pkginfo_to_dict(&pkg_info, None);

    assert_eq!(
        document.get("metadata_version"),
        Some(&MetadataValue::Scalar("2.0".to_string()))
    );
    assert_eq!(
        document.get("name"),
        Some(&MetadataValue::Scalar("complex-dist".to_string()))
    );
    assert_eq!(
        document.get("requires"),
        Some(&MetadataValue::List(vec![
            "quux (>=1.0)".to_string(),
            "splort (==4)".to_string(),
        ]))
    );
    assert_eq!(
        document.get("extras"),
        Some(&MetadataValue::List(vec!["simple".to_string()]))
    );
    assert_eq!(
        document.get("description"),
        Some(&MetadataValue::Scalar(
            "A long description of complex-dist.\n".to_string()
        ))
    );
    // the placeholder license never reaches the document
    assert!(!document.contains_key("license"));
    // home page lands under project_urls, not as a scalar
    assert!(!document.contains_key("home_page"));

    // the document serializes cleanly
    let json = serde_json::to_string_pretty(&document).unwrap();
    assert!(json.contains("\"complex-dist\""));
}

#[test]
fn test_forward_conversion_is_deterministic() {
    let pkg_info = PkgInfo::parse(PKG_INFO).unwrap();
    assert_eq!(
        pkginfo_to_dict(&pkg_info, None),
        pkginfo_to_dict(&pkg_info, None)
    );
}

#[test]
fn test_reverse_conversion_from_files() {
    let temp_dir = TempDir::new().unwrap();
    let pkginfo_path = temp_dir.path().join("PKG-INFO");
    let requires_path = temp_dir.path().join("requires.txt");
    fs::write(
        &pkginfo_path,
        b"Metadata-Version: 1.1\nName: complex-dist\nVersion: 0.1\n",
    )
    .unwrap();
    fs::write(&requires_path, "quux>=1.0\n\n[simple]\nsimple-req\n").unwrap();

    let data = fs::read(&pkginfo_path).unwrap();
    let mut pkg_info = PkgInfo::parse(&data).unwrap();
    let requires = fs::read_to_string(&requires_path).unwrap();
    pkginfo_to_metadata(&mut pkg_info, Some(&requires)).unwrap();

    assert_eq!(pkg_info.get("Metadata-Version"), Some("2.0".to_string()));
    assert_eq!(
        pkg_info.get_all("Provides-Extra"),
        vec!["simple".to_string()]
    );
    assert_eq!(
        pkg_info.get_all("Requires-Dist"),
        vec![
            "quux (>=1.0)".to_string(),
            "simple-req; extra == 'simple'".to_string(),
        ]
    );

    // the rewritten block parses back with the new headers in place
    let rendered = pkg_info.render();
    let reparsed = PkgInfo::parse(&rendered).unwrap();
    assert_eq!(reparsed.get("Metadata-Version"), Some("2.0".to_string()));
    assert_eq!(
        reparsed.get_all("Requires-Dist"),
        pkg_info.get_all("Requires-Dist")
    );
}

#[test]
fn test_reverse_conversion_moves_description_to_payload() {
    let mut pkg_info = PkgInfo::parse(
        b"Metadata-Version: 1.1\nName: complex-dist\nDescription: First line.\n    Indented line.\n",
    )
    .unwrap();
    pkginfo_to_metadata(&mut pkg_info, None).unwrap();

    assert_eq!(pkg_info.get("Description"), None);
    assert_eq!(pkg_info.payload(), Some("First line.\nIndented line.\n\n"));
}
