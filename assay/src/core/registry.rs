//! Caller-owned registry of expectation suites.

use super::{Expectation, ExpectationSuite};
use crate::prelude::*;
use crate::store::{validate_suite_name, SuiteStore};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, instrument};

/// A registry of expectation suites keyed by name.
///
/// The registry is an explicit object owned by the caller and passed to the
/// operations that need it. Cloning yields another handle to the same storage,
/// so it can be shared across threads. One lock guards the whole registry:
/// writes are serialized, reads run concurrently with each other.
///
/// `get` and `list_expectations` return snapshots; mutating a returned suite
/// does not affect the registry. Use [`SuiteRegistry::add_expectation`] and
/// [`SuiteRegistry::remove_expectation`] to edit a registered suite.
///
/// # Examples
///
/// ```rust
/// use assay::core::{Expectation, SuiteRegistry};
///
/// let registry = SuiteRegistry::new();
/// registry.create("yellowtaxi_suite").unwrap();
/// registry
///     .add_expectation("yellowtaxi_suite", Expectation::not_null("vendor_id"))
///     .unwrap();
///
/// assert!(registry.create("yellowtaxi_suite").is_err());
/// assert_eq!(registry.get("yellowtaxi_suite").unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SuiteRegistry {
    suites: Arc<RwLock<HashMap<String, ExpectationSuite>>>,
}

impl SuiteRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, ExpectationSuite>>> {
        self.suites
            .read()
            .map_err(|_| AssayError::Internal("Failed to acquire read lock on suite registry".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, ExpectationSuite>>> {
        self.suites
            .write()
            .map_err(|_| AssayError::Internal("Failed to acquire write lock on suite registry".to_string()))
    }

    /// Creates and registers an empty suite, returning a snapshot of it.
    ///
    /// Fails with [`AssayError::DuplicateSuiteName`] if the name is taken.
    #[instrument(skip(self))]
    pub fn create(&self, name: &str) -> Result<ExpectationSuite> {
        let suite = ExpectationSuite::new(name);
        self.register(suite.clone())?;
        Ok(suite)
    }

    /// Registers a fully built suite under its own name.
    ///
    /// Fails with [`AssayError::DuplicateSuiteName`] if the name is taken.
    #[instrument(skip(self, suite), fields(suite.name = %suite.name(), suite.expectations = suite.len()))]
    pub fn register(&self, suite: ExpectationSuite) -> Result<()> {
        let mut suites = self.write()?;
        if suites.contains_key(suite.name()) {
            return Err(AssayError::DuplicateSuiteName(suite.name().to_string()));
        }
        debug!(suite.name = %suite.name(), "Registering expectation suite");
        suites.insert(suite.name().to_string(), suite);
        Ok(())
    }

    /// Returns a snapshot of the named suite.
    pub fn get(&self, name: &str) -> Result<ExpectationSuite> {
        self.read()?
            .get(name)
            .cloned()
            .ok_or_else(|| AssayError::SuiteNotFound(name.to_string()))
    }

    /// Returns true if a suite is registered under `name`.
    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.read()?.contains_key(name))
    }

    /// Appends an expectation to a registered suite.
    pub fn add_expectation(&self, name: &str, expectation: Expectation) -> Result<()> {
        let mut suites = self.write()?;
        let suite = suites
            .get_mut(name)
            .ok_or_else(|| AssayError::SuiteNotFound(name.to_string()))?;
        debug!(suite.name = %name, expectation = %expectation, "Adding expectation");
        suite.add(expectation);
        Ok(())
    }

    /// Removes and returns the expectation at `index` of a registered suite.
    ///
    /// The suite is left unchanged when the index is out of range.
    pub fn remove_expectation(&self, name: &str, index: usize) -> Result<Expectation> {
        let mut suites = self.write()?;
        let suite = suites
            .get_mut(name)
            .ok_or_else(|| AssayError::SuiteNotFound(name.to_string()))?;
        suite.remove(index)
    }

    /// Returns a snapshot of a registered suite's expectations.
    pub fn list_expectations(&self, name: &str) -> Result<Vec<Expectation>> {
        self.read()?
            .get(name)
            .map(|suite| suite.list().to_vec())
            .ok_or_else(|| AssayError::SuiteNotFound(name.to_string()))
    }

    /// Returns the registered suite names, sorted.
    pub fn names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.read()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Returns the number of registered suites.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Returns true if no suites are registered.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Removes a suite from the registry and returns it.
    pub fn delete(&self, name: &str) -> Result<ExpectationSuite> {
        self.write()?
            .remove(name)
            .ok_or_else(|| AssayError::SuiteNotFound(name.to_string()))
    }

    /// Removes every suite. This is the registry's only teardown.
    pub fn clear(&self) -> Result<()> {
        self.write()?.clear();
        Ok(())
    }

    /// Saves every registered suite to a store, in name order.
    ///
    /// All names are checked before the first write, so a name the store
    /// cannot hold leaves the store untouched.
    #[instrument(skip(self, store))]
    pub fn persist_to(&self, store: &dyn SuiteStore) -> Result<usize> {
        let suites = self.read()?;
        let mut names: Vec<&String> = suites.keys().collect();
        names.sort();
        for name in &names {
            validate_suite_name(name)?;
        }
        for name in &names {
            store.save(&suites[*name])?;
        }
        info!(suites = names.len(), "Persisted expectation suites");
        Ok(names.len())
    }

    /// Registers every suite held by a store.
    ///
    /// Fails with [`AssayError::DuplicateSuiteName`] on the first stored suite
    /// whose name is already registered; suites loaded before it stay registered.
    #[instrument(skip(self, store))]
    pub fn load_from(&self, store: &dyn SuiteStore) -> Result<usize> {
        let names = store.list()?;
        for name in &names {
            let suite = store.load(name)?;
            self.register(suite)?;
        }
        info!(suites = names.len(), "Loaded expectation suites");
        Ok(names.len())
    }
}
