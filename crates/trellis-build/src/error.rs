//! Error types for tag construction.

use std::fmt;

use thiserror::Error;
use trellis_markup::ParseError;

/// Which half of the two-phase protocol was running when a handler failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Before the entity exists; handlers write into the builder.
    Building,
    /// After instantiation; handlers mutate the entity.
    Binding,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Phase::Building => "building",
            Phase::Binding  => "binding",
        })
    }
}

/// Main error type for building entities from tags.
///
/// Every variant aborts the tag being processed and the whole parse; only
/// [`BuildError::UnknownAttribute`] depends on the strict flag.
#[derive(Error, Debug)]
pub enum BuildError {
    /// No building or binding handler matched the attribute (strict mode only).
    #[error("unknown attribute \"{attribute}\" for entity type {entity_type}")]
    UnknownAttribute { attribute: String, entity_type: String },

    /// A handler, the instantiation, or the close hook returned an error.
    #[error("{phase} attribute \"{attribute}\" failed on {entity_type}: {source}")]
    HandlerFailure {
        attribute: String,
        entity_type: String,
        phase: Phase,
        #[source]
        source: anyhow::Error,
    },

    /// An entity reported component support but returned no components.
    #[error("{entity_type} declares components but returned none")]
    MissingComponents { entity_type: String },

    /// The parent refused a child entity or a line of plain text.
    #[error("{parent_type} refused {child}: {source}")]
    InvalidChildPlacement {
        parent_type: String,
        child: String,
        #[source]
        source: anyhow::Error,
    },

    /// No tag kind is registered under this name.
    #[error("unknown tag <{name}> at line {line}")]
    UnknownTag { name: String, line: usize },

    /// A lifecycle attribute referenced an action that was never registered.
    #[error("unknown action \"{name}\"")]
    UnknownAction { name: String },

    /// The syntax registry could not be finished (bad ancestry, cycles).
    #[error("invalid syntax: {0}")]
    InvalidSyntax(String),

    /// The markup itself did not parse.
    #[error(transparent)]
    Markup(#[from] ParseError),
}

/// Result type alias for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_attribute_names_attribute_and_type() {
        let e = BuildError::UnknownAttribute {
            attribute: "bogus".into(),
            entity_type: "Widget".into(),
        };
        assert_eq!(e.to_string(), "unknown attribute \"bogus\" for entity type Widget");
    }

    #[test]
    fn handler_failure_keeps_its_cause() {
        let e = BuildError::HandlerFailure {
            attribute: "count".into(),
            entity_type: "Widget".into(),
            phase: Phase::Binding,
            source: anyhow::anyhow!("not a number"),
        };
        assert!(e.to_string().starts_with("binding attribute \"count\" failed on Widget"));
        let cause = std::error::Error::source(&e).map(|s| s.to_string());
        assert_eq!(cause.as_deref(), Some("not a number"));
    }

    #[test]
    fn markup_errors_convert() {
        let parse = trellis_markup::parse_str("<a>").unwrap_err();
        let e: BuildError = parse.clone().into();
        assert_eq!(e.to_string(), parse.to_string());
    }
}
