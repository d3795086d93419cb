//! BDD step definitions for the provisioning step.

use ecsforge::{InstanceStatus, Step, StepAction};
use rstest_bdd_macros::{given, then, when};
use tokio::runtime::Runtime;

use super::test_helpers::{Placement, ProvisionContext, ProvisionOutcome};
use crate::test_constants::IDEMPOTENT_PROCESSING;

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a prepared VPC build")]
fn prepared_vpc_build(mut provision_context: ProvisionContext) -> ProvisionContext {
    provision_context.placement = Placement::Vpc;
    provision_context
}

#[given("a prepared classic build")]
fn prepared_classic_build(mut provision_context: ProvisionContext) -> ProvisionContext {
    provision_context.placement = Placement::Classic;
    provision_context
}

#[given("the API creates instance \"{instance_id}\" which stops after booting")]
fn api_creates_instance(provision_context: ProvisionContext, instance_id: String) -> ProvisionContext {
    let id = instance_id.trim();
    provision_context.client.push_created(id);
    provision_context
        .client
        .push_instance(id, InstanceStatus::Starting);
    provision_context
        .client
        .push_instance(id, InstanceStatus::Stopped);
    provision_context
        .client
        .push_instance(id, InstanceStatus::Stopped);
    provision_context
}

#[given("the API creates instance \"{instance_id}\" which never stops")]
fn api_creates_stuck_instance(
    provision_context: ProvisionContext,
    instance_id: String,
) -> ProvisionContext {
    let id = instance_id.trim();
    provision_context.client.push_created(id);
    for _ in 0..3 {
        provision_context
            .client
            .push_instance(id, InstanceStatus::Running);
    }
    provision_context
}

#[given("the API reports IdempotentProcessing \"{count}\" times")]
fn api_reports_idempotent_processing(
    provision_context: ProvisionContext,
    count: u32,
) -> ProvisionContext {
    for _ in 0..count {
        provision_context
            .client
            .push_create_error(IDEMPOTENT_PROCESSING);
    }
    provision_context
}

#[given("the API rejects creation with \"{code}\"")]
fn api_rejects_creation(provision_context: ProvisionContext, code: String) -> ProvisionContext {
    provision_context.client.push_create_error(code.trim());
    provision_context
}

#[when("the provisioning step runs and cleans up")]
fn run_and_clean_up(mut provision_context: ProvisionContext) -> Result<ProvisionContext, StepError> {
    let runtime = Runtime::new().map_err(|err| StepError::Assertion(err.to_string()))?;
    let mut step = provision_context.build_step();
    let mut state = provision_context.build_state();

    let action = runtime.block_on(async {
        let verdict = step.run(&mut state).await;
        step.cleanup(&state).await;
        verdict
    });

    provision_context.outcome = Some(ProvisionOutcome {
        action,
        instance_id: state.instance_id.clone(),
        error: state.error.as_ref().map(ToString::to_string),
    });
    Ok(provision_context)
}

fn outcome(provision_context: &ProvisionContext) -> Result<&ProvisionOutcome, StepError> {
    provision_context
        .outcome
        .as_ref()
        .ok_or_else(|| StepError::Assertion(String::from("missing outcome")))
}

#[then("the build continues with instance \"{instance_id}\"")]
fn build_continues(provision_context: &ProvisionContext, instance_id: String) -> Result<(), StepError> {
    let result = outcome(provision_context)?;
    if result.action == StepAction::Continue
        && result.instance_id.as_deref() == Some(instance_id.trim())
    {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected build to continue with {instance_id}, got {result:?}"
        )))
    }
}

#[then("the build halts with an error mentioning \"{text}\"")]
fn build_halts(provision_context: &ProvisionContext, text: String) -> Result<(), StepError> {
    let result = outcome(provision_context)?;
    let mentions = result
        .error
        .as_deref()
        .is_some_and(|message| message.contains(text.trim()));
    if result.action == StepAction::Halt && mentions {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected halt mentioning {text}, got {result:?}"
        )))
    }
}

#[then("the instance is force deleted \"{count}\" time")]
fn instance_force_deleted(provision_context: &ProvisionContext, count: usize) -> Result<(), StepError> {
    let deletes = provision_context.client.delete_requests();
    if deletes.len() == count && deletes.iter().all(|request| request.force) {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {count} forced deletes, got {deletes:?}"
        )))
    }
}

#[then("every create request reuses one client token")]
fn create_requests_share_token(provision_context: &ProvisionContext) -> Result<(), StepError> {
    let requests = provision_context.client.create_requests();
    let Some(first) = requests.first() else {
        return Err(StepError::Assertion(String::from("no create requests")));
    };
    if requests.len() > 1
        && requests
            .iter()
            .all(|request| request.client_token == first.client_token)
    {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected retries to reuse {}, got {requests:?}",
            first.client_token
        )))
    }
}
