//! Per-domain reconcilers.
//!
//! Each submodule owns one materialized view and the operations that merge
//! events into it. None of them log or perform I/O; the reducer in
//! [`crate::state`] decides which reconciler an action reaches.

pub mod agents;
pub mod changes;
pub mod errors;
pub mod flow;
pub mod messages;
pub mod review;
pub mod toggles;

pub use agents::AgentRoster;
pub use changes::{ChangeSet, FileEdit};
pub use errors::{classify, ErrorSlot, ErrorSlots};
pub use flow::{ActiveFlow, UNKNOWN_AGENT_NAME};
pub use messages::{route, route_message, Bucket, MessageBuckets, UpsertOutcome, Upserted};
pub use review::{apply_snapshot, ReviewState};
pub use toggles::{Confirmation, SystemToggles, Toggle, ToggleSync};
