use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Page URIs already expanded during one crawl run.
///
/// Entries are only ever added. The check and the insert happen under a
/// single lock acquisition so concurrent callers cannot both win.
#[derive(Debug, Default)]
pub struct VisitedSet {
    uris: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time `uri` is seen, `false` afterwards.
    pub fn try_mark_visited(&self, uri: &str) -> bool {
        let mut uris = self.uris.lock().unwrap_or_else(PoisonError::into_inner);
        if uris.contains(uri) {
            return false;
        }
        uris.insert(uri.to_string())
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.uris
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(uri)
    }

    pub fn len(&self) -> usize {
        self.uris.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_first_visit_wins() {
        let visited = VisitedSet::new();
        assert!(visited.try_mark_visited("http://example.com/a"));
        assert!(!visited.try_mark_visited("http://example.com/a"));
        assert!(!visited.try_mark_visited("http://example.com/a"));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_identity_is_exact_string_match() {
        let visited = VisitedSet::new();
        assert!(visited.try_mark_visited("http://example.com/a"));
        assert!(visited.try_mark_visited("http://example.com/a/"));
        assert!(visited.try_mark_visited("HTTP://example.com/a"));
        assert_eq!(visited.len(), 3);
    }

    #[test]
    fn test_contains_has_no_side_effect() {
        let visited = VisitedSet::new();
        assert!(!visited.contains("file:///site/index.html"));
        assert!(visited.is_empty());
        assert!(visited.try_mark_visited("file:///site/index.html"));
        assert!(visited.contains("file:///site/index.html"));
    }

    #[test]
    fn test_concurrent_marking_has_single_winner() {
        let visited = Arc::new(VisitedSet::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let visited = visited.clone();
                thread::spawn(move || {
                    (0..100)
                        .filter(|i| visited.try_mark_visited(&format!("page{}", i)))
                        .count()
                })
            })
            .collect();

        let winners: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(winners, 100);
        assert_eq!(visited.len(), 100);
    }
}
