//! Inventory adapters: discover and parse artifact inventory documents.
//!
//! This crate is allowed to do filesystem IO. It only reads; analyzers that
//! produce the inventories run elsewhere.

#![forbid(unsafe_code)]

mod convert;
mod discover;
mod model;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use complyguard_domain_core::Artifact;
use rayon::prelude::*;
use tracing::{debug, info};

pub use convert::parse_inventory;
pub use discover::{DEFAULT_INCLUDE, discover_inventory_files};
pub use model::SCHEMA_INVENTORY_V1;

/// Artifacts read from one inventory path.
#[derive(Clone, Debug, Default)]
pub struct Inventory {
    pub artifacts: Vec<Artifact>,
    /// Documents read, in the order their artifacts appear.
    pub sources: Vec<Utf8PathBuf>,
}

/// Read an inventory file, or every inventory document below a directory.
pub fn read_inventory(path: &Utf8Path) -> anyhow::Result<Inventory> {
    let files = if path.is_dir() {
        discover_inventory_files(path, DEFAULT_INCLUDE)
            .with_context(|| format!("discover inventories in {path}"))?
    } else {
        vec![path.to_path_buf()]
    };
    debug!(files = files.len(), "inventory documents found");

    let parsed: Vec<Vec<Artifact>> = files
        .par_iter()
        .map(|file| {
            let text = std::fs::read_to_string(file).with_context(|| format!("read {file}"))?;
            parse_inventory(&text, file.as_str())
        })
        .collect::<anyhow::Result<_>>()?;

    let artifacts: Vec<Artifact> = parsed.into_iter().flatten().collect();
    info!(artifacts = artifacts.len(), documents = files.len(), "inventory read");
    Ok(Inventory {
        artifacts,
        sources: files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn utf8_root(tmp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path")
    }

    fn write_file(path: &Utf8Path, contents: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, contents).expect("write file");
    }

    #[test]
    fn directory_inventories_concatenate_in_path_order() {
        let tmp = TempDir::new().expect("temp dir");
        let root = utf8_root(&tmp);
        write_file(
            &root.join("z.json"),
            r#"[{"generic": {"name": "last", "version": "1"}}]"#,
        );
        write_file(
            &root.join("a/first.json"),
            r#"{"components": [{"generic": {"name": "first", "version": "1"}}, {"generic": {"name": "second", "version": "1"}}]}"#,
        );

        let inventory = read_inventory(&root).expect("read");
        let labels: Vec<String> = inventory.artifacts.iter().map(Artifact::label).collect();
        assert_eq!(
            labels,
            vec!["pkg:generic/first@1", "pkg:generic/second@1", "pkg:generic/last@1"]
        );
        assert_eq!(inventory.sources.len(), 2);
    }

    #[test]
    fn single_file_errors_carry_the_path() {
        let tmp = TempDir::new().expect("temp dir");
        let root = utf8_root(&tmp);
        let file = root.join("broken.json");
        write_file(&file, "{not json");

        let err = read_inventory(&file).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));

        let missing = read_inventory(&root.join("missing.json")).unwrap_err();
        assert!(format!("{missing:#}").contains("read"));
    }

    proptest! {
        #[test]
        fn parse_inventory_never_panics(input in ".*") {
            let _ = parse_inventory(&input, "fuzz.json");
        }
    }
}
