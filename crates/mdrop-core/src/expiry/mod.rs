//! Time-bounded retention: every stored file is deleted once its retention
//! window elapses, including across restarts.

mod reconcile;
mod record;
mod scheduler;

pub use reconcile::{reconcile, sweep, ReconcileReport};
pub use record::{is_record_path, record_path, ExpiryRecord, RECORD_SUFFIX};
pub use scheduler::DeletionScheduler;
