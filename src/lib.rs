//! Instance provisioning step for ApsaraStack ECS machine-image builds.
//!
//! The crate exposes a client abstraction over the ECS instance API, a
//! generic retry loop, and the pipeline step that drives the build instance
//! lifecycle (create → wait for the stopped state → publish → delete on
//! cleanup).

pub mod config;
pub mod ecs;
pub mod provision;
pub mod retry;
pub mod state;
pub mod step;
pub mod test_support;
pub mod user_data;

pub use config::{
    AccessConfig, BuildConfig, CommunicatorConfig, ConfigError, DiskMapping, ImageConfig,
    InstanceConfig,
};
pub use ecs::{ClientError, EcsClient, Instance, InstanceStatus, RequestScope};
pub use provision::{CreateInstanceStep, StepError};
pub use retry::{Evaluation, RetryError, RetryPolicy, wait_for_expected};
pub use state::{BuildState, InstanceNetwork};
pub use step::{Step, StepAction};
pub use user_data::{UserDataError, resolve_user_data};
