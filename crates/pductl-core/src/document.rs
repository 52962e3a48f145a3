// ── Configuration document ──
//
// Ordered sections of ordered key/value pairs. Order matters: the device
// file is re-emitted in the order it was read, plus whatever the caller
// appended.

use std::ops::Index;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key/value settings of one `[section]`, in file order.
pub type Section = IndexMap<String, String>;

/// A decoded configuration file.
///
/// Sections keep their first-seen position; keys keep insertion order
/// within their section. Equality is order-sensitive at both levels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigDocument {
    sections: IndexMap<String, Section>,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Mutable access to a section, appending an empty one if missing.
    pub fn section_mut(&mut self, name: &str) -> &mut Section {
        self.sections.entry(name.to_owned()).or_default()
    }

    /// Start a fresh, empty section. An existing section of the same name
    /// is replaced in place (it keeps its position, loses its keys).
    pub fn insert_section(&mut self, name: impl Into<String>) -> &mut Section {
        let name = name.into();
        self.sections.insert(name.clone(), Section::new());
        self.sections.entry(name).or_default()
    }

    pub fn remove_section(&mut self, name: &str) -> Option<Section> {
        self.sections.shift_remove(name)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .map(String::as_str)
    }

    /// Assign `section.key = value`, creating the section if needed.
    /// Returns the previous value, if any. An existing key keeps its position.
    pub fn set(
        &mut self,
        section: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.section_mut(section).insert(key.into(), value.into())
    }

    /// Sections in document order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(name, s)| (name.as_str(), s))
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl PartialEq for ConfigDocument {
    fn eq(&self, other: &Self) -> bool {
        self.sections.len() == other.sections.len()
            && self
                .sections
                .iter()
                .zip(&other.sections)
                .all(|((a_name, a), (b_name, b))| {
                    a_name == b_name && a.len() == b.len() && a.iter().eq(b.iter())
                })
    }
}

impl Eq for ConfigDocument {}

impl Index<&str> for ConfigDocument {
    type Output = Section;

    /// # Panics
    ///
    /// Panics if the section does not exist. Use [`ConfigDocument::section`]
    /// for a fallible lookup.
    fn index(&self, name: &str) -> &Section {
        self.sections
            .get(name)
            .unwrap_or_else(|| panic!("no section named {name:?}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> ConfigDocument {
        let mut doc = ConfigDocument::new();
        doc.set("SystemID", "Contact", "Alice");
        doc.set("SystemID", "Name", "unit1");
        doc.set("NetworkTCP/IP", "IPAddress", "192.168.1.1");
        doc
    }

    #[test]
    fn set_returns_previous_value_and_keeps_position() {
        let mut doc = sample();
        assert_eq!(doc.set("SystemID", "Contact", "Bob").as_deref(), Some("Alice"));

        let keys: Vec<&String> = doc["SystemID"].keys().collect();
        assert_eq!(keys, ["Contact", "Name"]);
        assert_eq!(doc["SystemID"]["Contact"], "Bob");
    }

    #[test]
    fn section_mut_appends_new_sections_last() {
        let mut doc = sample();
        doc.section_mut("Outlet").insert("Name".into(), "rack-fan".into());

        let names: Vec<&str> = doc.sections().map(|(name, _)| name).collect();
        assert_eq!(names, ["SystemID", "NetworkTCP/IP", "Outlet"]);
    }

    #[test]
    fn insert_section_replaces_in_place() {
        let mut doc = sample();
        doc.insert_section("SystemID").insert("Location".into(), "B2".into());

        let names: Vec<&str> = doc.sections().map(|(name, _)| name).collect();
        assert_eq!(names, ["SystemID", "NetworkTCP/IP"]);
        assert_eq!(doc.get("SystemID", "Contact"), None);
        assert_eq!(doc.get("SystemID", "Location"), Some("B2"));
    }

    #[test]
    fn equality_is_order_sensitive() {
        let mut a = ConfigDocument::new();
        a.set("S", "k1", "1");
        a.set("S", "k2", "2");

        let mut b = ConfigDocument::new();
        b.set("S", "k2", "2");
        b.set("S", "k1", "1");

        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn remove_section_preserves_remaining_order() {
        let mut doc = sample();
        doc.set("Outlet", "Name", "fan");
        assert!(doc.remove_section("NetworkTCP/IP").is_some());

        let names: Vec<&str> = doc.sections().map(|(name, _)| name).collect();
        assert_eq!(names, ["SystemID", "Outlet"]);
    }

    #[test]
    #[should_panic(expected = "no section named")]
    fn index_panics_on_missing_section() {
        let doc = sample();
        let _ = &doc["Missing"];
    }

    #[test]
    fn serializes_as_ordered_json_object() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"SystemID":{"Contact":"Alice","Name":"unit1"},"NetworkTCP/IP":{"IPAddress":"192.168.1.1"}}"#
        );
    }
}
