//! Failures raised by console commands and their classification.

use secfuzz_core::error::{ModuleExecutionError, ParameterValidationError, ResolveError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ParameterValidationError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("No module selected")]
    NoModuleSelected,

    #[error(transparent)]
    Execution(#[from] ModuleExecutionError),

    #[error("Execution interrupted by user")]
    Interrupted,

    #[error("Console output failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Recovery tier of a [`CommandError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input or an unmet precondition: unknown module, no selection,
    /// invalid or missing parameter.
    Validation,
    /// The module's own run logic failed.
    Execution,
    /// The user interrupted the running command.
    Interrupted,
    /// Anything else; points at a defect.
    Unclassified,
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Resolve(_) | Self::NoModuleSelected => ErrorKind::Validation,
            Self::Execution(_) => ErrorKind::Execution,
            Self::Interrupted => ErrorKind::Interrupted,
            Self::Io(_) | Self::Other(_) => ErrorKind::Unclassified,
        }
    }
}

/// How a failure of a given kind is logged. The loop continues in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// `info`, fixed message.
    Notice,
    /// `warn`, error message only.
    Warning,
    /// `error`, full cause chain.
    Error,
}

/// Kind → severity, checked in order.
pub const RECOVERY_POLICY: &[(ErrorKind, Severity)] = &[
    (ErrorKind::Validation, Severity::Warning),
    (ErrorKind::Execution, Severity::Warning),
    (ErrorKind::Interrupted, Severity::Notice),
    (ErrorKind::Unclassified, Severity::Error),
];

pub fn severity_of(kind: ErrorKind) -> Severity {
    RECOVERY_POLICY
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, s)| *s)
        .unwrap_or(Severity::Error)
}

/// Log a command failure according to [`RECOVERY_POLICY`].
pub fn report_failure(err: &CommandError) -> ErrorKind {
    let kind = err.kind();
    match severity_of(kind) {
        Severity::Notice => tracing::info!("{}", err),
        Severity::Warning => tracing::warn!("{}", err),
        Severity::Error => {
            tracing::error!("Error occurred during command execution: {}", error_detail(err))
        }
    }
    kind
}

fn error_detail(err: &CommandError) -> String {
    match err {
        CommandError::Other(e) => format!("{:?}", e),
        other => {
            let mut s = other.to_string();
            let mut source = std::error::Error::source(other);
            while let Some(cause) = source {
                s.push_str(&format!("\n  caused by: {}", cause));
                source = std::error::Error::source(cause);
            }
            s
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_disjoint() {
        assert_eq!(CommandError::NoModuleSelected.kind(), ErrorKind::Validation);
        assert_eq!(
            CommandError::from(ResolveError::NotFound("x".into())).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            CommandError::from(ParameterValidationError::MissingRequired("t".into())).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            CommandError::from(ModuleExecutionError::failed("m", "unreachable")).kind(),
            ErrorKind::Execution
        );
        assert_eq!(CommandError::Interrupted.kind(), ErrorKind::Interrupted);
        assert_eq!(
            CommandError::from(anyhow::anyhow!("bug")).kind(),
            ErrorKind::Unclassified
        );
    }

    #[test]
    fn test_policy_table_covers_every_kind() {
        assert_eq!(severity_of(ErrorKind::Validation), Severity::Warning);
        assert_eq!(severity_of(ErrorKind::Execution), Severity::Warning);
        assert_eq!(severity_of(ErrorKind::Interrupted), Severity::Notice);
        assert_eq!(severity_of(ErrorKind::Unclassified), Severity::Error);
    }

    #[test]
    fn test_unclassified_report_includes_context() {
        let err = CommandError::from(anyhow::anyhow!("root cause").context("outer"));
        let detail = error_detail(&err);
        assert!(detail.contains("outer"));
        assert!(detail.contains("root cause"));
    }
}
