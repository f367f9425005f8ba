use std::fmt;

use thiserror::Error;

/// A fatal problem found while compiling one rule segment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A segment has no `accessType:` prefix.
    #[error("condition: '{segment}' has no access type (expected 'type: expression')")]
    MissingColon {
        /// The offending segment, trimmed.
        segment: String,
    },

    /// A referenced predicate is not in the registry.
    #[error("condition: predicate function '{call}' is not available")]
    UnresolvedFunction {
        /// The full call text, e.g. `unknown_fn(1)`.
        call: String,
    },

    /// A call could not be split into a name and an argument list.
    #[error("condition: malformed function call '{call}': {reason}")]
    MalformedCall {
        /// The full call text.
        call: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A keyword argument value is not a plain literal.
    #[error("condition: invalid value for '{key}' in '{call}': {reason}")]
    InvalidLiteral {
        /// The full call text.
        call: String,
        /// The keyword whose value failed to parse.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The boolean skeleton of a segment is not a well-formed expression.
    #[error("condition: definition '{segment}' has syntax errors: {reason}")]
    SkeletonSyntax {
        /// The offending segment, trimmed.
        segment: String,
        /// The structural problem found.
        reason: String,
    },
}

/// A non-fatal observation made while compiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileWarning {
    /// A later segment redefined an access type.
    DuplicateAccessType {
        /// The access type that was redefined.
        access_type: String,
        /// Raw text of the replaced segment.
        from: String,
        /// Raw text of the segment that replaced it.
        to: String,
    },
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateAccessType {
                access_type,
                from,
                to,
            } => write!(
                f,
                "condition: access type '{access_type}' changed from '{from}' to '{to}'"
            ),
        }
    }
}

/// Every fatal error from one compile, raised together.
///
/// Displays as one sub-error per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCompilationError {
    errors: Vec<CompileError>,
}

impl RuleCompilationError {
    pub(crate) fn new(errors: Vec<CompileError>) -> Self {
        Self { errors }
    }

    /// The individual errors, in the order they were found.
    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }
}

impl fmt::Display for RuleCompilationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RuleCompilationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = CompileError::MissingColon {
            segment: "no_colon_here".into(),
        };
        assert_eq!(
            err.to_string(),
            "condition: 'no_colon_here' has no access type (expected 'type: expression')"
        );

        let err = CompileError::UnresolvedFunction {
            call: "unknown_fn(1)".into(),
        };
        assert_eq!(
            err.to_string(),
            "condition: predicate function 'unknown_fn(1)' is not available"
        );

        let err = CompileError::MalformedCall {
            call: "9lives()".into(),
            reason: "bad name".into(),
        };
        assert_eq!(
            err.to_string(),
            "condition: malformed function call '9lives()': bad name"
        );

        let err = CompileError::InvalidLiteral {
            call: "f(x=open())".into(),
            key: "x".into(),
            reason: "not a literal".into(),
        };
        assert_eq!(
            err.to_string(),
            "condition: invalid value for 'x' in 'f(x=open())': not a literal"
        );

        let err = CompileError::SkeletonSyntax {
            segment: "cast: f() and".into(),
            reason: "expected a predicate call".into(),
        };
        assert_eq!(
            err.to_string(),
            "condition: definition 'cast: f() and' has syntax errors: expected a predicate call"
        );
    }

    #[test]
    fn warning_display_message() {
        let warning = CompileWarning::DuplicateAccessType {
            access_type: "cast".into(),
            from: "cast: f(1)".into(),
            to: "cast: g(2)".into(),
        };
        assert_eq!(
            warning.to_string(),
            "condition: access type 'cast' changed from 'cast: f(1)' to 'cast: g(2)'"
        );
    }

    #[test]
    fn compilation_error_joins_one_per_line() {
        let err = RuleCompilationError::new(vec![
            CompileError::UnresolvedFunction { call: "a()".into() },
            CompileError::UnresolvedFunction { call: "b()".into() },
        ]);
        let text = err.to_string();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().next().unwrap().contains("'a()'"));
        assert!(text.lines().nth(1).unwrap().contains("'b()'"));
        assert_eq!(err.errors().len(), 2);
    }
}
