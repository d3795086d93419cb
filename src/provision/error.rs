//! Error types for the provisioning step.

use thiserror::Error;

use crate::ecs::ClientError;
use crate::retry::RetryError;
use crate::user_data::UserDataError;

/// Errors that halt the build while provisioning the instance.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum StepError {
    /// An earlier step did not publish a value this step needs.
    #[error("build state is missing {0}")]
    MissingState(&'static str),
    /// User data could not be resolved.
    #[error(transparent)]
    UserData(#[from] UserDataError),
    /// `CreateInstance` failed or kept failing with a retryable code.
    #[error("failed to create instance: {0}")]
    Create(#[source] RetryError<ClientError>),
    /// The instance never reached the stopped state after creation.
    #[error("failed waiting for instance {instance_id} to stop: {source}")]
    Wait {
        /// Instance being waited on.
        instance_id: String,
        /// Underlying polling failure.
        #[source]
        source: RetryError<ClientError>,
    },
    /// The created instance could not be described.
    #[error("failed to describe instance {instance_id}: {source}")]
    Describe {
        /// Instance being described.
        instance_id: String,
        /// Underlying API failure.
        #[source]
        source: ClientError,
    },
    /// The created instance was missing from the describe response.
    #[error("instance {instance_id} not found after creation")]
    NotFound {
        /// Instance that was expected.
        instance_id: String,
    },
}
