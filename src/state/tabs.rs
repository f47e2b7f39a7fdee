//! Open-tab store for the workspace shell.
//!
//! Tabs are deduplicated by path; closing the active tab activates the
//! same-index neighbor, falling back to the previous one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: String,
    pub title: String,
    pub path: String,
    pub route_name: String,
    pub closable: bool,
}

#[derive(Clone, Default)]
pub struct TabsStore {
    inner: Arc<Mutex<TabsInner>>,
}

#[derive(Default)]
struct TabsInner {
    tabs: Vec<Tab>,
    active_tab_id: Option<String>,
}

impl TabsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a tab, or activate the existing one with the same path.
    pub fn add(&self, tab: Tab) -> Tab {
        let mut inner = self.lock();
        if let Some(existing) = inner.tabs.iter().find(|t| t.path == tab.path).cloned() {
            inner.active_tab_id = Some(existing.id.clone());
            return existing;
        }
        inner.active_tab_id = Some(tab.id.clone());
        inner.tabs.push(tab.clone());
        tab
    }

    /// Close a tab. Unknown ids are a no-op.
    pub fn remove(&self, tab_id: &str) -> Option<Tab> {
        let mut inner = self.lock();
        let index = inner.tabs.iter().position(|t| t.id == tab_id)?;
        let removed = inner.tabs.remove(index);

        if inner.active_tab_id.as_deref() == Some(tab_id) {
            let neighbor_id = inner
                .tabs
                .get(index)
                .or_else(|| index.checked_sub(1).and_then(|i| inner.tabs.get(i)))
                .map(|t| t.id.clone());
            inner.active_tab_id = neighbor_id;
        }
        Some(removed)
    }

    /// Activate a tab; ignored when the id is unknown.
    pub fn set_active(&self, tab_id: &str) {
        let mut inner = self.lock();
        if inner.tabs.iter().any(|t| t.id == tab_id) {
            inner.active_tab_id = Some(tab_id.to_owned());
        }
    }

    #[must_use]
    pub fn find_by_path(&self, path: &str) -> Option<Tab> {
        self.lock().tabs.iter().find(|t| t.path == path).cloned()
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.tabs.clear();
        inner.active_tab_id = None;
    }

    #[must_use]
    pub fn tabs(&self) -> Vec<Tab> {
        self.lock().tabs.clone()
    }

    #[must_use]
    pub fn active_tab_id(&self) -> Option<String> {
        self.lock().active_tab_id.clone()
    }

    fn lock(&self) -> MutexGuard<'_, TabsInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tabs_test.rs"]
mod tests;
