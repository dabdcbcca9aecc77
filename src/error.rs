//! Error types raised while building catalogs.
//!
//! Every variant carries the kind and entity name (and property, where one is
//! involved) so a failure can be traced back to the offending source record.
//! Nothing here is recoverable inside a run: catalogs are build artifacts and
//! a partial catalog is never emitted.

use crate::coerce::SchemaType;
use crate::kind::EntityKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{kind} '{name}' has no matching fragment in the DSL schema")]
    MissingFragment { kind: EntityKind, name: String },

    #[error("{kind} '{name}' is malformed: {detail}")]
    MalformedInput {
        kind: EntityKind,
        name: String,
        detail: String,
    },

    #[error(
        "{kind} '{name}' property '{property}': \
         cannot coerce default {value} to {expected}: {reason}"
    )]
    TypeCoercion {
        kind: EntityKind,
        name: String,
        property: String,
        expected: SchemaType,
        value: String,
        reason: String,
    },

    #[error("{kind} '{name}' is defined more than once")]
    DuplicateEntity { kind: EntityKind, name: String },

    #[error("failed to serialize catalog: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CatalogError {
    pub(crate) fn malformed(
        kind: EntityKind,
        name: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        CatalogError::MalformedInput {
            kind,
            name: name.into(),
            detail: detail.into(),
        }
    }

    /// Kind of the offending entity, when the error is tied to one.
    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            CatalogError::MissingFragment { kind, .. }
            | CatalogError::MalformedInput { kind, .. }
            | CatalogError::TypeCoercion { kind, .. }
            | CatalogError::DuplicateEntity { kind, .. } => Some(*kind),
            CatalogError::Serialization(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_record() {
        let err = CatalogError::TypeCoercion {
            kind: EntityKind::Component,
            name: "sql".into(),
            property: "bridgeErrorHandler".into(),
            expected: SchemaType::Boolean,
            value: "\"maybe\"".into(),
            reason: "not a boolean literal".into(),
        };
        let text = err.to_string();
        assert!(text.contains("component 'sql'"));
        assert!(text.contains("bridgeErrorHandler"));
        assert!(text.contains("boolean"));
        assert_eq!(err.kind(), Some(EntityKind::Component));
    }
}
