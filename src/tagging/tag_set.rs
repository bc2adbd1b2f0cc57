use std::collections::BTreeSet;

/// Deduplicated tags resolved for one archive.
///
/// Backed by an ordered set so the tag string sent to the server is stable
/// between runs; callers should still treat it as unordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: BTreeSet<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a set from the server's comma-joined tag field.
    pub fn from_tag_string(tags: &str) -> Self {
        let mut set = Self::new();
        for tag in tags.split(',') {
            set.insert(tag);
        }
        set
    }

    /// Inserts a trimmed tag. Blank entries are ignored.
    pub fn insert(&mut self, tag: impl AsRef<str>) -> bool {
        let tag = tag.as_ref().trim();
        if tag.is_empty() {
            return false;
        }
        self.tags.insert(tag.to_string())
    }

    #[cfg(test)]
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Comma-joined form accepted by the metadata update endpoint.
    pub fn to_tag_string(&self) -> String {
        self.iter().collect::<Vec<_>>().join(",")
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_string_trims_and_skips_blanks() {
        let set = TagSet::from_tag_string(" date_added:500 ,, artist:x,");
        assert_eq!(set.len(), 2);
        assert!(set.contains("date_added:500"));
        assert!(set.contains("artist:x"));

        assert!(TagSet::from_tag_string("").is_empty());
    }

    #[test]
    fn test_duplicates_collapse() {
        let mut set = TagSet::new();
        assert!(set.insert("scenery"));
        assert!(!set.insert("scenery"));
        assert!(!set.insert(" scenery "));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_tag_string_contains_every_tag_once() {
        let set: TagSet = ["b", "a", "b", "c"].into_iter().collect();
        let joined = set.to_tag_string();
        let mut parts: Vec<&str> = joined.split(',').collect();
        parts.sort_unstable();
        assert_eq!(parts, vec!["a", "b", "c"]);
    }
}
