//! Client abstraction over the ECS instance API.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::error::ClientError;
use super::request::{CreateInstanceRequest, DeleteInstanceRequest, DescribeInstancesRequest};
use super::types::{CreateInstanceResponse, DescribeInstancesResponse};

/// Future returned by client operations.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ClientError>> + Send + 'a>>;

/// Minimal set of ECS calls needed to provision and release an instance.
///
/// Implementations perform a single API call per invocation; retrying and
/// polling are layered on top by [`wait_for_expected`](crate::retry::wait_for_expected).
pub trait EcsClient: Send + Sync {
    /// Issues `CreateInstance`.
    fn create_instance<'a>(
        &'a self,
        request: &'a CreateInstanceRequest,
    ) -> ClientFuture<'a, CreateInstanceResponse>;

    /// Issues `DescribeInstances`.
    fn describe_instances<'a>(
        &'a self,
        request: &'a DescribeInstancesRequest,
    ) -> ClientFuture<'a, DescribeInstancesResponse>;

    /// Issues `DeleteInstance`.
    fn delete_instance<'a>(&'a self, request: &'a DeleteInstanceRequest) -> ClientFuture<'a, ()>;
}

impl<C: EcsClient + ?Sized> EcsClient for Arc<C> {
    fn create_instance<'a>(
        &'a self,
        request: &'a CreateInstanceRequest,
    ) -> ClientFuture<'a, CreateInstanceResponse> {
        (**self).create_instance(request)
    }

    fn describe_instances<'a>(
        &'a self,
        request: &'a DescribeInstancesRequest,
    ) -> ClientFuture<'a, DescribeInstancesResponse> {
        (**self).describe_instances(request)
    }

    fn delete_instance<'a>(&'a self, request: &'a DeleteInstanceRequest) -> ClientFuture<'a, ()> {
        (**self).delete_instance(request)
    }
}
