//! Status polling for ECS instances.

use tracing::debug;

use super::client::EcsClient;
use super::error::ClientError;
use super::request::{DescribeInstancesRequest, RequestScope};
use super::types::{Instance, InstanceStatus};
use crate::retry::{Evaluation, RetryError, RetryPolicy, wait_for_expected};

/// Polls `DescribeInstances` until the instance reports `expected`.
///
/// Lookup errors are retried like an instance that has not yet reached the
/// status, so transient API failures do not abort the wait. A request that
/// cannot be encoded ends the wait at once.
///
/// # Errors
///
/// Returns [`RetryError::Stopped`] when the describe request cannot be
/// encoded, and [`RetryError::Exhausted`] or [`RetryError::TimedOut`] when
/// the instance does not reach `expected` within `policy`.
pub async fn wait_for_instance_status<C>(
    client: &C,
    scope: &RequestScope,
    instance_id: &str,
    expected: &InstanceStatus,
    policy: &RetryPolicy,
) -> Result<Instance, RetryError<ClientError>>
where
    C: EcsClient + ?Sized,
{
    let request = DescribeInstancesRequest::for_instance(scope.for_describe(), instance_id);
    wait_for_expected(
        policy,
        || client.describe_instances(&request),
        |outcome| match outcome {
            Ok(response) => response
                .take_in_status(expected)
                .map_or(Evaluation::Retry(None), Evaluation::Accept),
            Err(err @ ClientError::Encode { .. }) => Evaluation::Stop(err),
            Err(err) => {
                debug!(instance_id, error = %err, "instance lookup failed");
                Evaluation::Retry(Some(err))
            }
        },
    )
    .await
}
