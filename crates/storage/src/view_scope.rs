//! ViewScopes: in-memory declared view scopes

use std::collections::HashMap;

use parking_lot::RwLock;

use tabula_core::{Result, ViewId, ViewScope, ViewScopeStore};

/// In-memory view scope store
#[derive(Debug, Default)]
pub struct ViewScopes {
    scopes: RwLock<HashMap<ViewId, ViewScope>>,
}

impl ViewScopes {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) the declared scope of `view_id`
    pub fn set_scope(&self, view_id: ViewId, scope: ViewScope) {
        self.scopes.write().insert(view_id, scope);
    }

    /// Remove the declared scope of `view_id`
    pub fn remove_scope(&self, view_id: ViewId) -> Option<ViewScope> {
        self.scopes.write().remove(&view_id)
    }
}

impl ViewScopeStore for ViewScopes {
    fn scope(&self, view_id: ViewId) -> Result<Option<ViewScope>> {
        Ok(self.scopes.read().get(&view_id).cloned())
    }
}
