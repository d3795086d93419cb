//! Classification of ECS errors by vendor error code.

use super::error::ClientError;
use crate::retry::Evaluation;

/// How a list of vendor error codes steers the retry loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorCodeFilter {
    /// Retry only the listed codes; any other code is fatal.
    RetryOn(&'static [&'static str]),
    /// Treat the listed codes as fatal; retry any other code.
    StopOn(&'static [&'static str]),
}

impl ErrorCodeFilter {
    /// Maps one attempt's outcome onto a retry verdict.
    ///
    /// Successful calls are accepted and encode errors are fatal. Other
    /// errors without a vendor code, such as transport failures, are always
    /// retried.
    #[must_use]
    pub fn evaluate<T>(self, outcome: Result<T, ClientError>) -> Evaluation<T, ClientError> {
        let err = match outcome {
            Ok(value) => return Evaluation::Accept(value),
            Err(err) => err,
        };
        if matches!(err, ClientError::Encode { .. }) {
            return Evaluation::Stop(err);
        }
        let Some(code) = err.code() else {
            return Evaluation::Retry(Some(err));
        };

        let fatal = match self {
            Self::RetryOn(codes) => !codes.contains(&code),
            Self::StopOn(codes) => codes.contains(&code),
        };
        if fatal {
            Evaluation::Stop(err)
        } else {
            Evaluation::Retry(Some(err))
        }
    }
}
