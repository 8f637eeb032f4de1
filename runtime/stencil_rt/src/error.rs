//! Error types for the template runtime.
//!
//! Ordinary variable lookups never error - they degrade to the undefined
//! sentinel. Only contract violations surface as a [`RenderError`]: a filter
//! or test missing from the snapshot table, a template the loader cannot
//! resolve, a block name or level with no registered override, or a
//! malformed unpack shape. Rendering is a single synchronous pass; errors
//! are not retried.

use std::fmt;

/// Result of a render operation.
pub type RenderResult<T> = Result<T, RenderError>;

/// Typed error category for structured matching.
///
/// Factory functions (e.g. [`missing_template`]) populate both `kind` and
/// `message`; the `Display` impl of the kind produces the message string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderErrorKind {
    /// The configuration's loader cannot resolve a template name.
    MissingTemplate { name: String },
    /// Filter name absent from the hierarchy's filter snapshot.
    UnknownFilter { name: String },
    /// Test name absent from the hierarchy's test snapshot.
    UnknownTest { name: String },
    /// No override list registered under this block name.
    UnknownBlock { name: String },
    /// The override list exists but has no entry at the requested level.
    BlockLevelOutOfRange {
        name: String,
        level: usize,
        depth: usize,
    },
    /// Structural unpack target incompatible with the source element.
    ShapeMismatch { expected: usize, got: String },
    /// Loop source is neither a sequence nor an enumerable-keys value.
    NotIterable { type_name: String },
    /// Free-form error, e.g. raised by a host-supplied filter.
    Custom { message: String },
}

impl fmt::Display for RenderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderErrorKind::MissingTemplate { name } => {
                write!(f, "template not found: {name}")
            }
            RenderErrorKind::UnknownFilter { name } => {
                write!(f, "no filter named '{name}'")
            }
            RenderErrorKind::UnknownTest { name } => {
                write!(f, "no test named '{name}'")
            }
            RenderErrorKind::UnknownBlock { name } => {
                write!(f, "no block named '{name}'")
            }
            RenderErrorKind::BlockLevelOutOfRange { name, level, depth } => {
                write!(
                    f,
                    "block '{name}' has {depth} override(s), level {level} requested"
                )
            }
            RenderErrorKind::ShapeMismatch { expected, got } => {
                write!(f, "cannot unpack {got} into {expected} name(s)")
            }
            RenderErrorKind::NotIterable { type_name } => {
                write!(f, "value of type {type_name} is not iterable")
            }
            RenderErrorKind::Custom { message } => f.write_str(message),
        }
    }
}

/// An error raised while executing compiled render logic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderError {
    /// Structured error category.
    pub kind: RenderErrorKind,
    /// Human-readable error message, equal to `kind.to_string()` for
    /// factory-created errors.
    pub message: String,
}

impl RenderError {
    /// Create an error with just a message.
    ///
    /// Uses `Custom` kind. Prefer the specific factory functions when a
    /// structured kind is available.
    pub fn new(message: impl Into<String>) -> Self {
        let msg = message.into();
        Self {
            kind: RenderErrorKind::Custom {
                message: msg.clone(),
            },
            message: msg,
        }
    }

    fn from_kind(kind: RenderErrorKind) -> Self {
        let message = kind.to_string();
        Self { kind, message }
    }

    /// Returns `true` if this is a `MissingTemplate` error.
    ///
    /// Used by `include` with `ignore_missing` to swallow exactly this
    /// failure mode and nothing else.
    pub fn is_missing_template(&self) -> bool {
        matches!(self.kind, RenderErrorKind::MissingTemplate { .. })
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RenderError {}

// Factory functions

/// Template loader failed to resolve a name.
#[cold]
pub fn missing_template(name: &str) -> RenderError {
    RenderError::from_kind(RenderErrorKind::MissingTemplate {
        name: name.to_string(),
    })
}

/// Filter not present in the filter snapshot.
#[cold]
pub fn unknown_filter(name: &str) -> RenderError {
    RenderError::from_kind(RenderErrorKind::UnknownFilter {
        name: name.to_string(),
    })
}

/// Test not present in the test snapshot.
#[cold]
pub fn unknown_test(name: &str) -> RenderError {
    RenderError::from_kind(RenderErrorKind::UnknownTest {
        name: name.to_string(),
    })
}

/// Block evaluated without any registered override.
#[cold]
pub fn unknown_block(name: &str) -> RenderError {
    RenderError::from_kind(RenderErrorKind::UnknownBlock {
        name: name.to_string(),
    })
}

/// Block level selector past the end of the override list.
#[cold]
pub fn block_level_out_of_range(name: &str, level: usize, depth: usize) -> RenderError {
    RenderError::from_kind(RenderErrorKind::BlockLevelOutOfRange {
        name: name.to_string(),
        level,
        depth,
    })
}

/// Unpack target arity does not match the element.
#[cold]
pub fn shape_arity_mismatch(expected: usize, got: usize) -> RenderError {
    RenderError::from_kind(RenderErrorKind::ShapeMismatch {
        expected,
        got: format!("{got} element(s)"),
    })
}

/// Unpack target applied to a non-sequence element.
#[cold]
pub fn shape_not_unpackable(expected: usize, type_name: &str) -> RenderError {
    RenderError::from_kind(RenderErrorKind::ShapeMismatch {
        expected,
        got: format!("a value of type {type_name}"),
    })
}

/// Loop source cannot be normalized into a sequence.
#[cold]
pub fn not_iterable(type_name: &str) -> RenderError {
    RenderError::from_kind(RenderErrorKind::NotIterable {
        type_name: type_name.to_string(),
    })
}
