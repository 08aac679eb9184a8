//! Deduplicated field label table built during serialization

use std::collections::HashMap;

/// Interns label strings into a deduplicated, insertion-ordered table.
///
/// Every field anywhere in the tree that carries a byte-identical label
/// shares one entry. Lookup is hash-map backed; the on-disk result is
/// identical to a linear search over the table.
#[derive(Debug, Default)]
pub(crate) struct LabelTable {
    labels: Vec<String>,
    lookup: HashMap<String, u32>,
}

impl LabelTable {
    /// Index of `label`, appending it if unseen.
    pub(crate) fn intern(&mut self, label: &str) -> u32 {
        if let Some(&idx) = self.lookup.get(label) {
            return idx;
        }
        let idx = self.labels.len() as u32;
        self.labels.push(label.to_string());
        self.lookup.insert(label.to_string(), idx);
        idx
    }

    pub(crate) fn labels(&self) -> &[String] {
        &self.labels
    }

    pub(crate) fn len(&self) -> usize {
        self.labels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_deduplicates() {
        let mut table = LabelTable::default();
        assert_eq!(table.intern("Tag"), 0);
        assert_eq!(table.intern("LocName"), 1);
        assert_eq!(table.intern("Tag"), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.labels(), ["Tag", "LocName"]);
    }
}
