//! BDD scenarios for the provisioning step.

use rstest_bdd_macros::scenario;

use super::test_helpers::{ProvisionContext, provision_context};

#[scenario(
    path = "tests/features/provision.feature",
    name = "Provision an instance and delete it on cleanup"
)]
fn scenario_provision_and_cleanup(provision_context: ProvisionContext) {
    let _ = provision_context;
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Retry idempotent create failures"
)]
fn scenario_retry_idempotent_create(provision_context: ProvisionContext) {
    let _ = provision_context;
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Halt on a rejected create"
)]
fn scenario_halt_on_rejected_create(provision_context: ProvisionContext) {
    let _ = provision_context;
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Delete the instance when it never stops"
)]
fn scenario_delete_when_never_stopped(provision_context: ProvisionContext) {
    let _ = provision_context;
}
