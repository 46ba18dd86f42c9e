//! In-memory variable store.
//!
//! Implements [`StoragePort`] over a plain map.  Used by the home-state
//! file adapter for its persisted variables and by tests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::app::ports::StoragePort;
use crate::error::{ReadError, WriteError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    vars: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl StoragePort for MemoryStore {
    fn read(&self, key: &str) -> Result<String, ReadError> {
        self.vars
            .get(key)
            .cloned()
            .ok_or(ReadError::Missing("variable"))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), WriteError> {
        if key.is_empty() {
            return Err(WriteError::Rejected("empty variable key"));
        }
        self.vars.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
