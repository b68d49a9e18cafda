//! Preview reference allocation

use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

use crate::domain::value_objects::{FileMeta, PreviewRef};
use crate::ports::outbound::PreviewUrlAllocator;

/// Hands out `blob:` style URLs and tracks which are still live
#[derive(Debug, Default)]
pub struct ObjectUrlRegistry {
    live: Mutex<HashSet<String>>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of references allocated and not yet released
    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }

    pub fn is_live(&self, preview: &PreviewRef) -> bool {
        self.live.lock().contains(preview.as_str())
    }
}

impl PreviewUrlAllocator for ObjectUrlRegistry {
    fn allocate(&self, file: &FileMeta) -> PreviewRef {
        let url = format!("blob:ticketform/{}", Uuid::new_v4());
        debug!(file = %file.name, url = %url, "Preview allocated");
        self.live.lock().insert(url.clone());
        PreviewRef::new(url)
    }

    fn release(&self, preview: &PreviewRef) {
        if self.live.lock().remove(preview.as_str()) {
            debug!(url = %preview, "Preview released");
        }
    }
}
