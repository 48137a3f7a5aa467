//! Worker tasks that back the runtime orchestration.
//!
//! Each dungeon instance runs in its own [`InstanceWorker`] task, so mutation
//! of one instance is serialized while different instances proceed in
//! parallel. The [`TickWorker`] drives the fixed-rate simulation step.

mod instance;
mod ticker;

pub use instance::{InstanceCommand, InstanceHandle, InstanceWorker, PendingReply};
pub use ticker::TickWorker;
