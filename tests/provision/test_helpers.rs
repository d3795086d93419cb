//! Shared fixtures for provisioning BDD scenarios.

use std::sync::Arc;

use ecsforge::test_support::{ScriptedClient, build_config, classic_state, vpc_state};
use ecsforge::{BuildState, CreateInstanceStep, RetryPolicy, StepAction};
use rstest::fixture;

use crate::test_constants::FAST_INTERVAL;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Placement {
    Classic,
    Vpc,
}

#[derive(Clone, Debug)]
pub struct ProvisionOutcome {
    pub action: StepAction,
    pub instance_id: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ProvisionContext {
    pub client: ScriptedClient,
    pub placement: Placement,
    pub outcome: Option<ProvisionOutcome>,
}

#[fixture]
pub fn provision_context() -> ProvisionContext {
    ProvisionContext {
        client: ScriptedClient::new(),
        placement: Placement::Vpc,
        outcome: None,
    }
}

impl ProvisionContext {
    pub fn build_state(&self) -> BuildState {
        match self.placement {
            Placement::Classic => classic_state(),
            Placement::Vpc => vpc_state("vsw-bdd"),
        }
    }

    pub fn build_step(&self) -> CreateInstanceStep<ScriptedClient> {
        CreateInstanceStep::new(self.client.clone(), Arc::new(build_config()))
            .with_create_policy(RetryPolicy::attempts(5).with_interval(FAST_INTERVAL))
            .with_wait_policy(RetryPolicy::attempts(3).with_interval(FAST_INTERVAL))
            .with_delete_policy(RetryPolicy::attempts(3).with_interval(FAST_INTERVAL))
    }
}
