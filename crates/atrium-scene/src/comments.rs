use std::collections::BTreeMap;

/// In-memory comment storage, one ordered list per house name. Lists are
/// created when a house is registered and only ever appended to.
#[derive(Debug, Default)]
pub struct CommentLog {
    entries: BTreeMap<String, Vec<String>>,
}

impl CommentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str) {
        self.entries.entry(name.to_string()).or_default();
    }

    /// Appends a comment to a registered house. Unregistered names are a
    /// silent no-op.
    pub fn add(&mut self, name: &str, text: impl Into<String>) {
        if let Some(list) = self.entries.get_mut(name) {
            list.push(text.into());
        }
    }

    pub fn for_house(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn house_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_house_starts_with_empty_list() {
        let mut log = CommentLog::new();
        log.register("house1");
        assert_eq!(log.for_house("house1"), Some(&[][..]));
    }

    #[test]
    fn registering_twice_keeps_existing_comments() {
        let mut log = CommentLog::new();
        log.register("house1");
        log.add("house1", "leaky roof");
        log.register("house1");
        assert_eq!(log.for_house("house1").unwrap(), ["leaky roof"]);
    }

    #[test]
    fn comments_keep_insertion_order() {
        let mut log = CommentLog::new();
        log.register("house1");
        log.add("house1", "leaky roof");
        log.add("house1", "nice porch");
        log.add("house1", "cracked driveway");
        assert_eq!(
            log.for_house("house1").unwrap(),
            ["leaky roof", "nice porch", "cracked driveway"]
        );
    }

    #[test]
    fn unregistered_house_is_ignored() {
        let mut log = CommentLog::new();
        log.register("house1");
        log.add("house2", "should vanish");
        assert_eq!(log.for_house("house2"), None);
        assert_eq!(log.house_count(), 1);
    }
}
