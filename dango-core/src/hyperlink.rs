//! Hyperlinks (OSC 8)
//!
//! Each screen buffer keeps a table of hyperlinks addressed by integer
//! handles. Cells store only the handle, so evicting scrollback lines can
//! never dangle; handles are not reused within a session and the table is
//! dropped only on a hard reset.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyperlink {
    /// The `id=` parameter from the sequence; links sharing a non-empty id
    /// are the same logical link across cells.
    pub id: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HyperlinkStore {
    entries: Vec<Hyperlink>,
}

impl HyperlinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a link and return its handle (1-based; 0 is "no link").
    /// A non-empty id is deduplicated by id, otherwise by uri.
    pub fn register(&mut self, id: &str, uri: &str) -> u32 {
        let existing = self.entries.iter().position(|link| {
            if id.is_empty() {
                link.id.is_empty() && link.uri == uri
            } else {
                link.id == id
            }
        });
        if let Some(index) = existing {
            return (index + 1) as u32;
        }
        self.entries.push(Hyperlink {
            id: id.to_string(),
            uri: uri.to_string(),
        });
        self.entries.len() as u32
    }

    pub fn get(&self, handle: u32) -> Option<&Hyperlink> {
        if handle == 0 {
            return None;
        }
        self.entries.get(handle as usize - 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_lookup() {
        let mut store = HyperlinkStore::new();
        let handle = store.register("", "https://example.com");
        assert_eq!(handle, 1);
        assert_eq!(store.get(handle).unwrap().uri, "https://example.com");
        assert!(store.get(0).is_none());
    }

    #[test]
    fn dedupe_by_uri_without_id() {
        let mut store = HyperlinkStore::new();
        let a = store.register("", "https://example.com");
        let b = store.register("", "https://example.com");
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn dedupe_by_id() {
        let mut store = HyperlinkStore::new();
        let a = store.register("chapter1", "https://example.com/a");
        let b = store.register("chapter1", "https://example.com/b");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_links_get_new_handles() {
        let mut store = HyperlinkStore::new();
        let a = store.register("", "https://a.example");
        let b = store.register("", "https://b.example");
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }
}
