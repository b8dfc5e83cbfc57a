//! The contract every producer unit exposes to the director.

use async_trait::async_trait;

use crate::error::UnitError;
use crate::record::ResultRecord;

/// Outcome of a single task operation, captured as a value.
pub type TaskOutcome = std::result::Result<ResultRecord, UnitError>;

/// A producer the director can initialize and drive.
///
/// Units are external collaborators: the director only schedules them and
/// keeps score. A unit may keep private state behind its own
/// synchronization, but must not reach into director-owned state.
#[async_trait]
pub trait Unit: Send + Sync {
    /// Bring the unit up. Expected to be idempotent.
    async fn initialize(&self) -> Result<(), UnitError>;

    /// Run the named task operation.
    ///
    /// Unknown operation names should fail with
    /// [`UnitError::UnsupportedOperation`].
    async fn perform(&self, operation: &str) -> TaskOutcome;

    /// Name of the operation used when the unit is run on its own.
    fn primary_operation(&self) -> Option<&str> {
        None
    }

    /// Run the primary operation, bypassing the phase table.
    ///
    /// Without a primary operation this fails naming the implementing
    /// type; the director swaps in the registered name.
    async fn run_primary_task(&self) -> TaskOutcome {
        match self.primary_operation() {
            Some(op) => self.perform(op).await,
            None => Err(UnitError::UnsupportedOperation {
                unit: std::any::type_name::<Self>().to_string(),
                operation: "primary".to_string(),
            }),
        }
    }
}
