use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::form::field::FieldKey;
use crate::wizard::Step;

/// Active form errors, at most one message per field.
///
/// Serializes as a JSON object keyed by the field path
/// (`{"address.city": "City is required"}`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormErrors {
    entries: BTreeMap<FieldKey, String>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(key: FieldKey, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(key, message);
        errors
    }

    /// Sets `key`, replacing any earlier message.
    pub fn insert(&mut self, key: FieldKey, message: impl Into<String>) {
        self.entries.insert(key, message.into());
    }

    pub fn get(&self, key: &FieldKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &FieldKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &FieldKey) -> Option<String> {
        self.entries.remove(key)
    }

    /// Drops every key matching `predicate`; returns how many went away.
    pub fn clear_where(&mut self, mut predicate: impl FnMut(&FieldKey) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !predicate(key));
        before - self.entries.len()
    }

    /// Overlays `other` onto `self`; on a shared key `other` wins.
    pub fn merge(&mut self, other: FormErrors) {
        self.entries.extend(other.entries);
    }

    pub fn for_step(&self, step: Step) -> FormErrors {
        self.entries
            .iter()
            .filter(|(key, _)| key.step() == Some(step))
            .map(|(key, message)| (*key, message.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.entries.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, FieldKey, String> {
        self.entries.iter()
    }
}

impl FromIterator<(FieldKey, String)> for FormErrors {
    fn from_iter<I: IntoIterator<Item = (FieldKey, String)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl IntoIterator for FormErrors {
    type Item = (FieldKey, String);
    type IntoIter = btree_map::IntoIter<FieldKey, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a FormErrors {
    type Item = (&'a FieldKey, &'a String);
    type IntoIter = btree_map::Iter<'a, FieldKey, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, message) in &self.entries {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{key}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for FormErrors {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, message) in &self.entries {
            map.serialize_entry(&key.to_string(), message)?;
        }
        map.end()
    }
}
