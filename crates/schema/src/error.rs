use std::fmt;

use crate::validator::SchemaError;

/// Why a call's arguments were rejected before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Too many arguments.")]
    TooManyArguments { given: usize, accepted: usize },

    #[error("{}", render_issues(.0))]
    Invalid(Vec<ArgumentIssue>),
}

impl ValidationError {
    /// Per-position issues; empty for [`ValidationError::TooManyArguments`].
    pub fn issues(&self) -> &[ArgumentIssue] {
        match self {
            Self::TooManyArguments { .. } => &[],
            Self::Invalid(issues) => issues,
        }
    }
}

/// A problem with one positional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentIssue {
    /// A required argument was absent or null.
    Missing { index: usize },
    /// A supplied argument failed its schema.
    Invalid {
        index: usize,
        errors: Vec<SchemaError>,
    },
}

impl ArgumentIssue {
    pub fn index(&self) -> usize {
        match self {
            Self::Missing { index } | Self::Invalid { index, .. } => *index,
        }
    }
}

impl fmt::Display for ArgumentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { index } => write!(f, "Parameter {index} is required."),
            Self::Invalid { index, errors } => {
                write!(f, "Invalid value for argument {index}. ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if !err.path.is_empty() {
                        write!(f, "Property '{}': ", err.path)?;
                    }
                    f.write_str(err.message.strip_suffix('.').unwrap_or(&err.message))?;
                }
                f.write_str(".")
            },
        }
    }
}

fn render_issues(issues: &[ArgumentIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
