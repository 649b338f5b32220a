use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::handle::Handle;

const LOG_PREFIX: &str = "[cache]";

/// Session-lifetime memo of handle to resolved avatar URL.
///
/// Constructed once per process or session and shared through an `Arc`.
/// Entries never expire and the last write for a handle wins; concurrent
/// writers for the same handle store interchangeable URLs.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: RwLock<HashMap<Handle, String>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: &Handle) -> Option<String> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let url = entries.get(handle).cloned();
        if url.is_some() {
            log::debug!("{} hit for {}", LOG_PREFIX, handle);
        }
        url
    }

    pub fn set(&self, handle: Handle, url: String) {
        log::debug!("{} {} -> {}", LOG_PREFIX, handle, url);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle, url);
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
