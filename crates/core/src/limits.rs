//! Bounds enforced by the engine
//!
//! Defaults match the platform's production settings. Custom limits are
//! taken from configuration at engine construction.

use crate::error::{Error, Result};

/// Default maximum number of containers in one view's scope closure
pub const DEFAULT_MAX_CONTAINERS_PER_VIEW: usize = 10_000;

/// Default number of change records fetched per page
pub const DEFAULT_CHANGE_PAGE_SIZE: usize = 100;

/// Engine limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of containers in one view's scope closure (default: 10,000)
    pub max_containers_per_view: usize,

    /// Page size used when iterating a whole change log (default: 100)
    pub change_page_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_containers_per_view: DEFAULT_MAX_CONTAINERS_PER_VIEW,
            change_page_size: DEFAULT_CHANGE_PAGE_SIZE,
        }
    }
}

impl Limits {
    /// Create limits with small values for testing
    pub fn with_small_limits() -> Self {
        Limits {
            max_containers_per_view: 10,
            change_page_size: 2,
        }
    }

    /// Check that every limit is usable
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if any limit is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_containers_per_view == 0 {
            return Err(Error::configuration("max_containers_per_view must be at least 1"));
        }
        if self.change_page_size == 0 {
            return Err(Error::configuration("change_page_size must be at least 1"));
        }
        Ok(())
    }

    /// Check a scope closure size against `max_containers_per_view`
    ///
    /// # Errors
    ///
    /// Returns `LimitExceeded` when `count` is over the limit.
    pub fn check_container_count(&self, count: usize) -> Result<()> {
        if count > self.max_containers_per_view {
            return Err(Error::LimitExceeded(format!(
                "scope contains more than {} containers",
                self.max_containers_per_view
            )));
        }
        Ok(())
    }
}
