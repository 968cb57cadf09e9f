//! Built-in maintenance strategies
//!
//! Both strategies replay one change record onto the index the router
//! picks for the table. A record the index has already applied (its
//! highest applied change number is at or past the record) is skipped, so
//! replaying a log is idempotent.

use std::sync::Arc;

use tabula_core::{Error, PayloadKind, Result, TableChange, TableId};
use tracing::debug;

use crate::change_log::ChangeRecord;
use crate::registry::{ApplyOutcome, MaintenanceStrategy};
use crate::router::IndexConnectionRouter;

fn replay(
    router: &IndexConnectionRouter,
    strategy: &'static str,
    table_id: &TableId,
    record: &ChangeRecord,
) -> Result<ApplyOutcome> {
    if record.table_id() != table_id {
        return Err(Error::invalid_argument(format!(
            "change {} belongs to table {}, not {}",
            record.change_number(),
            record.table_id(),
            table_id
        )));
    }

    let connection = router.connect(Some(table_id))?;
    let number = record.change_number();
    if connection.max_applied_change()?.map_or(false, |applied| applied >= number) {
        debug!(table_id = %table_id, change_number = number.as_u64(), strategy, "Change already applied");
        return Ok(ApplyOutcome::AlreadyApplied);
    }

    let data = record.load_payload::<TableChange>()?;
    connection.apply_change(number, &data.change)?;
    debug!(
        table_id = %table_id,
        change_number = number.as_u64(),
        payload_kind = %record.payload_kind(),
        endpoint = connection.endpoint_name(),
        strategy,
        "Applied change"
    );
    Ok(ApplyOutcome::Applied)
}

/// Maintenance of plain tables: every payload kind is applied
#[derive(Debug)]
pub struct TableEntityStrategy {
    router: Arc<IndexConnectionRouter>,
}

impl TableEntityStrategy {
    /// Create a strategy writing through `router`
    pub fn new(router: Arc<IndexConnectionRouter>) -> Self {
        Self { router }
    }
}

impl MaintenanceStrategy for TableEntityStrategy {
    fn name(&self) -> &'static str {
        "table-entity"
    }

    fn apply(&self, table_id: &TableId, record: &ChangeRecord) -> Result<ApplyOutcome> {
        replay(&self.router, self.name(), table_id, record)
    }
}

/// Maintenance of views
///
/// View rows are derived from the hierarchy, so row change sets are
/// rejected; schema and search changes are applied.
#[derive(Debug)]
pub struct ViewStrategy {
    router: Arc<IndexConnectionRouter>,
}

impl ViewStrategy {
    /// Create a strategy writing through `router`
    pub fn new(router: Arc<IndexConnectionRouter>) -> Self {
        Self { router }
    }
}

impl MaintenanceStrategy for ViewStrategy {
    fn name(&self) -> &'static str {
        "view"
    }

    fn apply(&self, table_id: &TableId, record: &ChangeRecord) -> Result<ApplyOutcome> {
        if record.payload_kind() == PayloadKind::Row {
            return Err(Error::invalid_argument(format!(
                "view {} does not accept row changes (change {})",
                table_id,
                record.change_number()
            )));
        }
        replay(&self.router, self.name(), table_id, record)
    }
}
