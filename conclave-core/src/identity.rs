//! Identity types for Conclave entities

use chrono::{DateTime, TimeZone, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Current wall-clock time.
pub fn now() -> Timestamp {
    Utc::now()
}

/// String-backed entity id.
///
/// The backend owns id assignment; ids arrive as opaque strings and are
/// compared by value only.
pub trait EntityIdType: Sized {
    fn new(value: impl Into<String>) -> Self;
    fn as_str(&self) -> &str;

    /// Time-derived id (UUIDv7) for locally originated entities.
    fn generate() -> Self {
        Self::new(Uuid::now_v7().to_string())
    }
}

/// Ids are strings on the wire, but numeric ids (time-derived ones in
/// particular) are accepted and kept in their decimal form.
struct LooseIdVisitor;

impl<'de> Visitor<'de> for LooseIdVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or numeric id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15 {
            Ok((v as i64).to_string())
        } else if v.is_finite() {
            Ok(v.to_string())
        } else {
            Err(E::invalid_value(de::Unexpected::Float(v), &self))
        }
    }
}

macro_rules! define_entity_id {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(
                Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
                serde::Serialize,
            )]
            #[serde(transparent)]
            pub struct $name(String);

            impl<'de> serde::Deserialize<'de> for $name {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: serde::Deserializer<'de>,
                {
                    deserializer.deserialize_any(LooseIdVisitor).map(Self)
                }
            }

            impl EntityIdType for $name {
                fn new(value: impl Into<String>) -> Self {
                    Self(value.into())
                }

                fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }

            impl From<String> for $name {
                fn from(value: String) -> Self {
                    Self(value)
                }
            }
        )+
    };
}

define_entity_id!(
    /// Agent identity, unique within the roster.
    AgentId,
    /// Message identity, unique within its bucket.
    MessageId,
    /// Team identity; keys the team message bucket.
    TeamId,
    /// Change group identity. Flow executions reuse their flow id here.
    ChangeGroupId,
    CheckpointId,
    AnnotationId,
    ImplementationId,
    DecisionId,
);

/// Parse a timestamp that may be an RFC 3339 string or epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<Timestamp> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<i64>().ok().and_then(from_millis)),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(from_millis),
        _ => None,
    }
}

fn from_millis(millis: i64) -> Option<Timestamp> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Serde adapter for loosely typed optional timestamps.
///
/// Unparseable values become `None` instead of failing the whole record.
pub fn deserialize_loose_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_timestamp))
}
