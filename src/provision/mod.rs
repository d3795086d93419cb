//! Pipeline step that provisions the build instance.
//!
//! The step creates an instance through an idempotent `CreateInstance` call,
//! waits for its first boot to finish (the instance settles in `Stopped`),
//! and publishes the descriptor for the steps that configure and image it.
//! Cleanup deletes the instance, whether the build succeeded or not.

mod error;
mod request;

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::BuildConfig;
use crate::ecs::{
    ClientError, DeleteInstanceRequest, DescribeInstancesRequest, EcsClient, ErrorCodeFilter,
    Instance, InstanceStatus, wait_for_instance_status,
};
use crate::retry::{RetryError, RetryPolicy, SHORT_RETRY_TIMES, wait_for_expected};
use crate::state::BuildState;
use crate::step::{Step, StepAction, StepFuture};

pub use error::StepError;
pub use request::{
    DEFAULT_INTERNET_CHARGE_TYPE, DEFAULT_INTERNET_MAX_BANDWIDTH_OUT,
    build_create_instance_request, client_token,
};

/// Error codes on which `CreateInstance` is safely re-sent.
pub const CREATE_INSTANCE_RETRY_ERRORS: &[&str] = &["IdempotentProcessing"];

/// Error codes on which `DeleteInstance` is re-sent.
pub const DELETE_INSTANCE_RETRY_ERRORS: &[&str] = &["IncorrectInstanceStatus.Initializing"];

/// Time allowed for a new instance to finish its first boot and stop.
pub const DEFAULT_INSTANCE_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Creates the build instance and deletes it on cleanup.
#[derive(Debug)]
pub struct CreateInstanceStep<C> {
    client: C,
    config: Arc<BuildConfig>,
    create_policy: RetryPolicy,
    wait_policy: RetryPolicy,
    delete_policy: RetryPolicy,
    instance_id: Option<String>,
    instance: Option<Instance>,
}

impl<C: EcsClient> CreateInstanceStep<C> {
    /// Creates a step using the default retry budgets: 12 attempts for
    /// `CreateInstance`, [`DEFAULT_INSTANCE_WAIT_TIMEOUT`] for the stopped-state
    /// wait and 3 attempts for `DeleteInstance`.
    #[must_use]
    pub fn new(client: C, config: Arc<BuildConfig>) -> Self {
        Self {
            client,
            config,
            create_policy: RetryPolicy::default(),
            wait_policy: RetryPolicy::timeout(DEFAULT_INSTANCE_WAIT_TIMEOUT),
            delete_policy: RetryPolicy::attempts(SHORT_RETRY_TIMES),
            instance_id: None,
            instance: None,
        }
    }

    /// Overrides the retry budget for `CreateInstance`.
    #[must_use]
    pub const fn with_create_policy(mut self, policy: RetryPolicy) -> Self {
        self.create_policy = policy;
        self
    }

    /// Overrides the polling budget while waiting for the instance to stop.
    ///
    /// The default is bounded by [`DEFAULT_INSTANCE_WAIT_TIMEOUT`] rather than
    /// an attempt count, as a first boot can take several minutes.
    #[must_use]
    pub const fn with_wait_policy(mut self, policy: RetryPolicy) -> Self {
        self.wait_policy = policy;
        self
    }

    /// Overrides the retry budget for `DeleteInstance` during cleanup.
    #[must_use]
    pub const fn with_delete_policy(mut self, policy: RetryPolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    /// Returns the instance published by a successful run.
    #[must_use]
    pub const fn instance(&self) -> Option<&Instance> {
        self.instance.as_ref()
    }

    async fn provision(&mut self, state: &mut BuildState) -> Result<(), StepError> {
        info!("Creating instance...");
        let request = build_create_instance_request(&self.config, state)?;

        let create_filter = ErrorCodeFilter::RetryOn(CREATE_INSTANCE_RETRY_ERRORS);
        let created = wait_for_expected(
            &self.create_policy,
            || self.client.create_instance(&request),
            |outcome| create_filter.evaluate(outcome),
        )
        .await
        .map_err(StepError::Create)?;
        let instance_id = created.instance_id;
        self.instance_id = Some(instance_id.clone());

        let scope = self.config.access.scope();
        wait_for_instance_status(
            &self.client,
            &scope,
            &instance_id,
            &InstanceStatus::Stopped,
            &self.wait_policy,
        )
        .await
        .map_err(|source| StepError::Wait {
            instance_id: instance_id.clone(),
            source,
        })?;

        let describe = DescribeInstancesRequest::for_instance(scope.for_describe(), &instance_id);
        let instance = self
            .client
            .describe_instances(&describe)
            .await
            .map_err(|source| StepError::Describe {
                instance_id: instance_id.clone(),
                source,
            })?
            .into_instances()
            .into_iter()
            .next()
            .ok_or_else(|| StepError::NotFound {
                instance_id: instance_id.clone(),
            })?;

        info!(instance_id = %instance_id, "Created instance: {instance_id}");
        self.instance = Some(instance.clone());
        state.instance = Some(instance);
        state.instance_id = Some(instance_id);
        Ok(())
    }

    async fn destroy(&self, instance_id: &str) -> Result<(), RetryError<ClientError>> {
        let request = DeleteInstanceRequest {
            scope: self.config.access.scope(),
            instance_id: instance_id.to_owned(),
            force: true,
        };
        let delete_filter = ErrorCodeFilter::RetryOn(DELETE_INSTANCE_RETRY_ERRORS);
        wait_for_expected(
            &self.delete_policy,
            || self.client.delete_instance(&request),
            |outcome| delete_filter.evaluate(outcome),
        )
        .await
    }
}

impl<C: EcsClient> Step for CreateInstanceStep<C> {
    fn run<'a>(&'a mut self, state: &'a mut BuildState) -> StepFuture<'a, StepAction> {
        Box::pin(async move {
            match self.provision(state).await {
                Ok(()) => StepAction::Continue,
                Err(err) => state.halt(err),
            }
        })
    }

    fn cleanup<'a>(&'a mut self, state: &'a BuildState) -> StepFuture<'a, ()> {
        Box::pin(async move {
            let Some(instance_id) = self.instance_id.take() else {
                return;
            };
            if state.is_interrupted() {
                warn!(instance_id = %instance_id, "Deleting instance because of cancellation or error...");
            } else {
                info!(instance_id = %instance_id, "Cleaning up instance...");
            }

            if let Err(err) = self.destroy(&instance_id).await {
                error!(
                    instance_id = %instance_id,
                    error = %err,
                    "Failed to clean up instance {instance_id}: {err}"
                );
            }
        })
    }
}
