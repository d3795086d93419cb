//! ECS request/response model and the client seam used by the provisioning
//! step.

mod client;
mod error;
mod eval;
mod query;
mod request;
mod types;
mod wait;

pub use client::{ClientFuture, EcsClient};
pub use error::ClientError;
pub use eval::ErrorCodeFilter;
pub use query::flatten_query;
pub use request::{
    CreateInstanceDataDisk, CreateInstanceRequest, DeleteInstanceRequest,
    DescribeInstancesRequest, ECS_PRODUCT, IoOptimized, RequestScope, SystemDisk,
};
pub use types::{
    CreateInstanceResponse, DescribeInstancesResponse, Image, Instance, InstanceSet,
    InstanceStatus,
};
pub use wait::wait_for_instance_status;
