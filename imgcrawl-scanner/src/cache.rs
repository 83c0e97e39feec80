use crate::model::{CacheKey, Image, TransformKind};
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Reservations for (image, transform) work within one crawl run.
///
/// The caller that wins [`TransformCache::try_reserve`] owns that unit of
/// work. Reservations are never released, including after a failed
/// transform, so a pair is attempted at most once per run.
#[derive(Debug, Default)]
pub struct TransformCache {
    reserved: Mutex<HashSet<CacheKey>>,
}

impl TransformCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_reserve(&self, image: &Image, kind: TransformKind) -> bool {
        self.reserved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(CacheKey::new(image, kind))
    }

    pub fn is_reserved(&self, image: &Image, kind: TransformKind) -> bool {
        self.reserved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&CacheKey::new(image, kind))
    }

    pub fn len(&self) -> usize {
        self.reserved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
