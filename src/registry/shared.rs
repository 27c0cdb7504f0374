//! Hot-swappable registry handle.
//!
//! Readers take an `Arc` snapshot and query it without holding any lock.
//! Reloads build a complete registry first and only then swap the pointer,
//! so a failed rebuild never disturbs the snapshot in service.

use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use super::Registry;
use crate::error::SourceError;
use crate::source::ContentSource;

/// Cloneable handle to the current registry
#[derive(Debug, Clone)]
pub struct SharedRegistry {
    current: Arc<RwLock<Arc<Registry>>>,
}

impl SharedRegistry {
    pub fn new(registry: Registry) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(registry))),
        }
    }

    /// The registry currently in service
    pub fn snapshot(&self) -> Arc<Registry> {
        // The lock only guards a pointer swap, so a poisoned guard still
        // holds a complete registry.
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Swap in a new registry, returning the one it replaced
    pub fn replace(&self, registry: Registry) -> Arc<Registry> {
        self.swap(Arc::new(registry))
    }

    fn swap(&self, next: Arc<Registry>) -> Arc<Registry> {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, next)
    }

    /// Rebuild from `source` and swap on success
    pub async fn reload(&self, source: &ContentSource) -> Result<Arc<Registry>, SourceError> {
        let registry = match source.load_registry().await {
            Ok(registry) => registry,
            Err(e) => {
                warn!("Reload failed, keeping current registry: {}", e);
                return Err(e);
            }
        };

        info!(
            records = registry.len(),
            sections = registry.list_sections().len(),
            "Registry reloaded"
        );
        // Hand back this build, not whatever is current by now
        let next = Arc::new(registry);
        self.swap(Arc::clone(&next));
        Ok(next)
    }
}

impl From<Registry> for SharedRegistry {
    fn from(registry: Registry) -> Self {
        Self::new(registry)
    }
}
