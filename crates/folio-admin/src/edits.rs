//! Unsaved field edits layered over the persisted content

use std::collections::HashMap;

use folio_client::ContentMap;

/// Field values typed in the dashboard but not yet saved
#[derive(Clone, Debug, Default)]
pub struct LocalEdits {
    values: HashMap<String, String>,
}

impl LocalEdits {
    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The edited value, else the persisted one, else `""`
    pub fn resolve<'a>(&'a self, key: &str, persisted: &'a ContentMap) -> &'a str {
        self.get(key)
            .or_else(|| persisted.get(key).map(String::as_str))
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains_any(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.values.contains_key(*k))
    }

    /// Drop the edits for `keys`
    pub fn clear_keys<'k>(&mut self, keys: impl IntoIterator<Item = &'k str>) {
        for key in keys {
            self.values.remove(key);
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
