//! Parse once, render many times.
//!
//! A [`ParsedMessage`] keeps the green tree, which is `Send + Sync`, so it
//! can be shared across threads and re-rendered with a different
//! [`crate::RenderContext`] without parsing again.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use jbm_syntax::{Flavor, GreenNode, SyntaxNode, parse_green};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    source: String,
    green: GreenNode,
}

impl ParsedMessage {
    pub fn parse(source: &str) -> Self {
        Self::parse_with(source, Flavor::default())
    }

    pub fn parse_with(source: &str, flavor: Flavor) -> Self {
        Self {
            source: source.to_string(),
            green: parse_green(source, flavor),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// A fresh cursor over the tree.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }
}

/// Bounded cache of parsed messages keyed by source text.
///
/// The least recently used entry is evicted once `capacity` is reached.
#[derive(Debug)]
pub struct MessageCache {
    entries: LruCache<String, Arc<ParsedMessage>>,
}

impl MessageCache {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    pub fn get_or_parse(&mut self, source: &str) -> Arc<ParsedMessage> {
        if let Some(parsed) = self.entries.get(source) {
            return Arc::clone(parsed);
        }

        log::trace!("parsing message of {} bytes", source.len());
        let parsed = Arc::new(ParsedMessage::parse(source));
        if let Some((evicted, _)) = self.entries.push(source.to_string(), Arc::clone(&parsed)) {
            log::trace!("evicted cached message of {} bytes", evicted.len());
        }
        parsed
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
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

impl Default for MessageCache {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_message_is_lossless() {
        let parsed = ParsedMessage::parse("**hi** there\n");
        assert_eq!(parsed.syntax().text().to_string(), parsed.source());
    }

    #[test]
    fn parsed_message_is_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ParsedMessage>();
    }

    #[test]
    fn cache_hit_returns_same_tree() {
        let mut cache = MessageCache::new(4);
        let a = cache.get_or_parse("hello");
        let b = cache.get_or_parse("hello");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_evicts_least_recently_used() {
        let mut cache = MessageCache::new(2);
        let first = cache.get_or_parse("one");
        cache.get_or_parse("two");
        cache.get_or_parse("one");
        cache.get_or_parse("three");

        assert_eq!(cache.len(), 2);
        assert!(Arc::ptr_eq(&first, &cache.get_or_parse("one")));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn cache_never_grows_past_capacity() {
        let mut cache = MessageCache::new(3);
        let sources: Vec<String> = (0..50).map(|i| format!("message {i}")).collect();
        for source in &sources {
            cache.get_or_parse(source);
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.len(), 3);

        let last = cache.get_or_parse(&sources[49]);
        assert_eq!(last.source(), "message 49");
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn zero_capacity_holds_one_message() {
        let mut cache = MessageCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.get_or_parse("a");
        cache.get_or_parse("b");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn default_capacity() {
        assert_eq!(MessageCache::default().capacity(), 256);
    }
}
