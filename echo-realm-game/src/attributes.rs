//! Insertion-ordered attribute table.
//!
//! Attribute order is observable: quest generation picks the *first* weakest
//! attribute, so the map keeps the order in which names were first seen and
//! serializes as a plain JSON object in that order.
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeMap(Vec<(String, i64)>);

impl AttributeMap {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<i64> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| *v)
    }

    /// Add `delta` to `name`, creating the attribute at 0 if absent.
    /// Returns the new value.
    pub fn add(&mut self, name: &str, delta: i64) -> i64 {
        if let Some((_, value)) = self.0.iter_mut().find(|(k, _)| k == name) {
            *value = value.saturating_add(delta);
            *value
        } else {
            self.0.push((name.to_string(), delta));
            delta
        }
    }

    pub fn set(&mut self, name: &str, value: i64) {
        if let Some((_, slot)) = self.0.iter_mut().find(|(k, _)| k == name) {
            *slot = value;
        } else {
            self.0.push((name.to_string(), value));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First attribute holding the minimum value.
    #[must_use]
    pub fn weakest(&self) -> Option<(&str, i64)> {
        let mut best: Option<(&str, i64)> = None;
        for (name, value) in self.iter() {
            match best {
                Some((_, current)) if value >= current => {}
                _ => best = Some((name, value)),
            }
        }
        best
    }

    /// Merge every delta of `other` into `self`.
    pub fn merge(&mut self, other: &Self) {
        for (name, delta) in other.iter() {
            self.add(name, delta);
        }
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            let name: String = name.into();
            map.set(&name, value);
        }
        map
    }
}

impl Serialize for AttributeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct AttributeMapVisitor;

impl<'de> Visitor<'de> for AttributeMapVisitor {
    type Value = AttributeMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of attribute names to integers")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = AttributeMap::new();
        while let Some((name, value)) = access.next_entry::<String, i64>()? {
            map.set(&name, value);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for AttributeMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AttributeMapVisitor)
    }
}
