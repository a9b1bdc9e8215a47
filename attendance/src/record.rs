use std::fmt;

use chrono::NaiveDateTime;
use facelog_faceid::{Identity, Resolution, Role, KEY_SEPARATOR};

use crate::AttendanceError;

/// Wall-clock format of persisted timestamps.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One match result at one instant. Produced per detected face per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub resolution: Resolution,
    pub timestamp: NaiveDateTime,
}

/// A persisted attendance entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub identity: Identity,
    pub timestamp: NaiveDateTime,
}

impl LogRecord {
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }

    /// Encodes as `"{name}@{role}@{YYYY-MM-DD HH:MM:SS}"`.
    pub fn encode(&self) -> String {
        format!(
            "{}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{}",
            self.identity.name,
            self.identity.role,
            self.timestamp.format(TIME_FORMAT)
        )
    }

    /// Parses an encoded entry. Anything but exactly three `@`-separated
    /// parts with a known role and a valid timestamp is malformed.
    pub fn parse(entry: &str) -> Result<Self, AttendanceError> {
        let malformed = |why: String| AttendanceError::MalformedRecord(format!("{entry:?}: {why}"));

        let parts: Vec<&str> = entry.split(KEY_SEPARATOR).collect();
        let [name, role, ts] = parts.as_slice() else {
            return Err(malformed(format!("{} fields, want 3", parts.len())));
        };
        let role = Role::from_stored(role).ok_or_else(|| malformed(format!("unknown role {role:?}")))?;
        let identity = Identity::new(*name, role).map_err(|e| malformed(format!("{e}")))?;
        let timestamp =
            NaiveDateTime::parse_from_str(ts, TIME_FORMAT).map_err(|e| malformed(format!("timestamp: {e}")))?;
        Ok(Self {
            identity,
            timestamp,
        })
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
