use dlf_changelog::ChangeLogError;
use dlf_rules::FilterError;

/// Errors surfaced by the command layer.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Bad command line or command parameters.
    #[error("{0}")]
    Usage(String),

    #[error("profile \"{0}\" does not exist")]
    NoSuchProfile(String),

    /// A recorded change failed to apply to a fresh filter. The change log
    /// no longer fits the base filter, so this is never a caller error.
    #[error("replaying `{command}` from the change log")]
    Replay {
        command: String,
        #[source]
        source: Box<CliError>,
    },

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    ChangeLog(#[from] ChangeLogError),

    #[error(transparent)]
    Core(#[from] dlf_core::CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CALLER_ERROR: i32 = 2;

/// Exit code for a failed invocation: `2` when the caller's input was at
/// fault, `1` otherwise. The outermost classified error in the chain wins.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(cli) = cause.downcast_ref::<CliError>() {
            match cli {
                CliError::Usage(_) | CliError::NoSuchProfile(_) => return EXIT_CALLER_ERROR,
                CliError::Replay { .. } => return EXIT_FAILURE,
                CliError::Filter(e) if e.is_caller_error() => return EXIT_CALLER_ERROR,
                _ => {}
            }
        }
        if let Some(e) = cause.downcast_ref::<FilterError>() {
            if e.is_caller_error() {
                return EXIT_CALLER_ERROR;
            }
        }
    }
    EXIT_FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn caller_errors_exit_with_two() {
        let err = anyhow::Error::new(CliError::Usage("no command".into()));
        assert_eq!(exit_code_for(&err), EXIT_CALLER_ERROR);

        let err: anyhow::Error = CliError::from(FilterError::InvalidParameter("tier".into())).into();
        assert_eq!(exit_code_for(&err.context("running set_hide_maps_below_tier")), EXIT_CALLER_ERROR);
    }

    #[test]
    fn replay_failures_are_data_errors() {
        let inner = CliError::from(FilterError::InvalidParameter("tier".into()));
        let err = anyhow::Error::new(CliError::Replay {
            command: "set_gem_min_quality 99".into(),
            source: Box::new(inner),
        });
        assert_eq!(exit_code_for(&err), EXIT_FAILURE);
    }

    #[test]
    fn other_errors_exit_with_one() {
        let err = std::fs::read_to_string("/nonexistent/dlf/file")
            .context("reading filter")
            .unwrap_err();
        assert_eq!(exit_code_for(&err), EXIT_FAILURE);
    }
}
