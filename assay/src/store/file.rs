//! JSON file store: one file per suite.

use super::{validate_suite_name, SuiteStore};
use crate::core::ExpectationSuite;
use crate::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

const EXTENSION: &str = "json";

/// Stores each suite as pretty-printed JSON in `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct FileSuiteStore {
    dir: PathBuf,
}

impl FileSuiteStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Opens a store rooted at an existing directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(AssayError::Configuration(format!(
                "Suite store directory '{}' does not exist",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    /// Returns the root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_suite_name(name)?;
        Ok(self.dir.join(format!("{name}.{EXTENSION}")))
    }
}

impl SuiteStore for FileSuiteStore {
    #[instrument(skip(self, suite), fields(suite.name = %suite.name()))]
    fn save(&self, suite: &ExpectationSuite) -> Result<()> {
        let path = self.path_for(suite.name())?;
        let json = serde_json::to_string_pretty(suite)?;
        fs::write(&path, json)?;
        debug!(path = %path.display(), "Saved expectation suite");
        Ok(())
    }

    #[instrument(skip(self))]
    fn load(&self, name: &str) -> Result<ExpectationSuite> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(AssayError::SuiteNotFound(name.to_string()));
        }
        let json = fs::read_to_string(&path)?;
        let suite: ExpectationSuite = serde_json::from_str(&json).map_err(|e| {
            AssayError::Serialization(format!("{}: {e}", path.display()))
        })?;
        if suite.name() != name {
            return Err(AssayError::Serialization(format!(
                "{} holds suite '{}', expected '{name}'",
                path.display(),
                suite.name()
            )));
        }
        Ok(suite)
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_suite_name(stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(AssayError::SuiteNotFound(name.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Expectation, SuiteRegistry};
    use tempfile::TempDir;

    fn suite() -> ExpectationSuite {
        ExpectationSuite::builder("yellowtaxi_suite")
            .expect(Expectation::not_null("passenger_count"))
            .try_expect(Expectation::in_range("passenger_count", Some(0.0), Some(6.0)))
            .unwrap()
            .build()
    }

    #[test]
    fn test_save_load_list_delete() {
        let dir = TempDir::new().unwrap();
        let store = FileSuiteStore::new(dir.path().join("suites")).unwrap();

        store.save(&suite()).unwrap();
        assert!(dir.path().join("suites/yellowtaxi_suite.json").is_file());
        assert_eq!(store.list().unwrap(), vec!["yellowtaxi_suite"]);
        assert_eq!(store.load("yellowtaxi_suite").unwrap(), suite());

        store.delete("yellowtaxi_suite").unwrap();
        assert!(store.list().unwrap().is_empty());
        assert!(matches!(
            store.load("yellowtaxi_suite"),
            Err(AssayError::SuiteNotFound(_))
        ));
    }

    #[test]
    fn test_rejects_path_like_names() {
        let dir = TempDir::new().unwrap();
        let store = FileSuiteStore::new(dir.path()).unwrap();
        assert!(matches!(
            store.load("../etc/passwd"),
            Err(AssayError::Configuration(_))
        ));
        assert!(store.save(&ExpectationSuite::new("a/b")).is_err());
    }

    #[test]
    fn test_invalid_stored_suite_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = FileSuiteStore::new(dir.path()).unwrap();
        fs::write(
            dir.path().join("broken.json"),
            r#"{"name":"broken","expectations":[{"kind":"in-range","column":"c","parameters":{"min":5,"max":1}}]}"#,
        )
        .unwrap();
        let err = store.load("broken").unwrap_err();
        assert!(err.to_string().contains("min (5) is greater than max (1)"));
    }

    #[test]
    fn test_registry_roundtrip_through_store() {
        let dir = TempDir::new().unwrap();
        let store = FileSuiteStore::new(dir.path()).unwrap();

        let registry = SuiteRegistry::new();
        registry.register(suite()).unwrap();
        registry.create("empty_suite").unwrap();
        assert_eq!(registry.persist_to(&store).unwrap(), 2);

        let reloaded = SuiteRegistry::new();
        assert_eq!(reloaded.load_from(&store).unwrap(), 2);
        assert_eq!(reloaded.get("yellowtaxi_suite").unwrap(), suite());

        // loading twice collides with the already registered names
        assert!(matches!(
            reloaded.load_from(&store),
            Err(AssayError::DuplicateSuiteName(_))
        ));
    }

    #[test]
    fn test_open_requires_existing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(FileSuiteStore::open(dir.path().join("missing")).is_err());
        assert!(FileSuiteStore::open(dir.path()).is_ok());
    }
}
