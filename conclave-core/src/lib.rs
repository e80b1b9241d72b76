//! Conclave Core - Entity Types
//!
//! Data structures for the panel's materialized views and the single place
//! where partially specified records are completed. No I/O, no logging.

mod agent;
mod change;
mod error;
mod identity;
mod loose;
mod message;
mod normalize;
mod project;
mod review;

pub use agent::{
    Agent, AgentRecord, AgentStatus, AutonomyLevel, AutonomyState, AutonomyStateRecord,
    DecisionCriteria, PerformanceMetrics, PerformanceMetricsRecord,
};
pub use change::{ChangeGroup, FileChange, FileKind, ProposedChanges};
pub use error::NormalizeError;
pub use identity::{
    deserialize_loose_timestamp, now, parse_timestamp, AgentId, AnnotationId, ChangeGroupId,
    CheckpointId, DecisionId, EntityIdType, ImplementationId, MessageId, TeamId, Timestamp,
};
pub use loose::{deserialize_each, deserialize_lenient, deserialize_loose_bool, deserialize_loose_f64};
pub use message::{Message, MessagePatch, MessageStatus, MessageType};
pub use normalize::{Normalizer, DEFAULT_HISTORY_LIMIT, USER_SENDER};
pub use project::{ProjectState, Team, TeamRecord};
pub use review::{
    AgentRef, AlternativeImplementation, Annotation, AnnotationReply, Checkpoint, Conflict,
    PendingInstruction, ReviewSnapshot,
};
