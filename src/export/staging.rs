//! Registry of fragments currently handed to the renderer.
//!
//! A fragment is mounted for exactly as long as its render call runs; the
//! returned guard unmounts it on drop, so failures and panics clean up too.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct StagingSurface {
    mounted: Mutex<BTreeMap<Uuid, String>>,
}

impl StagingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&self, label: impl Into<String>) -> StagedFragment<'_> {
        let id = Uuid::new_v4();
        self.mounted.lock().insert(id, label.into());
        StagedFragment { surface: self, id }
    }

    pub fn mounted_count(&self) -> usize {
        self.mounted.lock().len()
    }

    pub fn mounted_labels(&self) -> Vec<String> {
        self.mounted.lock().values().cloned().collect()
    }
}

#[derive(Debug)]
pub struct StagedFragment<'a> {
    surface: &'a StagingSurface,
    id: Uuid,
}

impl StagedFragment<'_> {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for StagedFragment<'_> {
    fn drop(&mut self) {
        self.surface.mounted.lock().remove(&self.id);
    }
}
