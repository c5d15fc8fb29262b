//! Interned item names.
//!
//! Items are symbolic names (`oak_log`, `iron_ingot`). Two items are equal
//! iff their names are equal; interning keeps clones cheap and comparisons
//! mostly pointer-sized.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

fn intern_table() -> &'static Mutex<HashSet<Arc<str>>> {
    static TABLE: OnceLock<Mutex<HashSet<Arc<str>>>> = OnceLock::new();
    TABLE.get_or_init(|| Mutex::new(HashSet::new()))
}

fn intern(name: &str) -> Arc<str> {
    let mut table = intern_table().lock().expect("item intern table poisoned");
    if let Some(existing) = table.get(name) {
        return Arc::clone(existing);
    }
    let entry: Arc<str> = Arc::from(name);
    table.insert(Arc::clone(&entry));
    entry
}

/// An interned item name.
#[derive(Debug, Clone)]
pub struct Item(Arc<str>);

impl Item {
    /// Intern `name` and return the shared handle for it.
    pub fn new(name: &str) -> Self {
        Self(intern(name))
    }

    /// The symbolic name of this item.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for Item {}

impl PartialOrd for Item {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Item {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.as_ref().cmp(other.0.as_ref())
    }
}

impl std::hash::Hash for Item {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.as_ref().hash(state);
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Item {
    fn from(name: &str) -> Self {
        Item::new(name)
    }
}

impl Serialize for Item {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Item::new(&name))
    }
}
