//! Variable binding
//!
//! The surrounding pipeline exposes a per-iteration variable store. The generator
//! only needs to put one named string into it.

use std::collections::HashMap;

/// Capability to bind a named value for later steps of an iteration
pub trait Variables {
    fn bind(&mut self, name: &str, value: String);
}

/// In-memory variable store
#[derive(Debug, Clone, Default)]
pub struct VariableMap {
    values: HashMap<String, String>,
}

impl VariableMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Variables for VariableMap {
    fn bind(&mut self, name: &str, value: String) {
        self.values.insert(name.to_string(), value);
    }
}
