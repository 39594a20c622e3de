//! Opaque worker identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a registered worker, issued by the registry.
///
/// Freshly issued identifiers are random UUID v4 strings and are never
/// reused. Identifiers can also be built from arbitrary caller strings, since
/// lineage links may point at workers this registry never issued.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(String);

impl WorkerId {
    /// Generates a new random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier, returning the underlying string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for WorkerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for WorkerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for WorkerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generated_ids_are_uuid_strings() {
        let id = WorkerId::generate();
        let parsed = Uuid::parse_str(id.as_str());
        assert!(parsed.is_ok());
        assert_eq!(parsed.unwrap().get_version_num(), 4);
    }

    #[test]
    fn generated_ids_do_not_repeat() {
        let ids: HashSet<WorkerId> = (0..1_000).map(|_| WorkerId::generate()).collect();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn caller_strings_are_kept_verbatim() {
        let id = WorkerId::from("X");
        assert_eq!(id.as_str(), "X");
        assert_eq!(id.to_string(), "X");
        assert_eq!(WorkerId::from("X".to_string()), id);
        assert_eq!(id.into_string(), "X");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = WorkerId::from("worker-7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"worker-7\"");
    }
}
