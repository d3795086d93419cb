//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeSet, VecDeque};
use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};

use crate::config::{
    AccessConfig, BuildConfig, CommunicatorConfig, ImageConfig, InstanceConfig,
};
use crate::ecs::{
    ClientError, ClientFuture, CreateInstanceRequest, CreateInstanceResponse,
    DeleteInstanceRequest, DescribeInstancesRequest, DescribeInstancesResponse, ECS_PRODUCT,
    EcsClient, Image, Instance, InstanceStatus,
};
use crate::state::{BuildState, InstanceNetwork};

/// Scripted ECS client that replays queued responses in FIFO order.
///
/// Every request is recorded. When a queue runs dry the client falls back to
/// a fixed answer: `CreateInstance` fails with a transport error,
/// `DescribeInstances` lists nothing and `DeleteInstance` succeeds.
#[derive(Clone, Debug, Default)]
pub struct ScriptedClient {
    state: Arc<Mutex<ScriptState>>,
}

#[derive(Debug, Default)]
struct ScriptState {
    creates: VecDeque<Result<CreateInstanceResponse, ClientError>>,
    describes: VecDeque<Result<DescribeInstancesResponse, ClientError>>,
    deletes: VecDeque<Result<(), ClientError>>,
    create_requests: Vec<CreateInstanceRequest>,
    describe_requests: Vec<DescribeInstancesRequest>,
    delete_requests: Vec<DeleteInstanceRequest>,
}

impl ScriptedClient {
    /// Creates a client with empty queues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues a `CreateInstance` outcome.
    pub fn push_create(&self, outcome: Result<CreateInstanceResponse, ClientError>) {
        self.lock().creates.push_back(outcome);
    }

    /// Queues a successful `CreateInstance` returning `instance_id`.
    pub fn push_created(&self, instance_id: &str) {
        self.push_create(Ok(CreateInstanceResponse {
            instance_id: instance_id.to_owned(),
            request_id: String::from("req-create"),
        }));
    }

    /// Queues a `CreateInstance` failure carrying the vendor `code`.
    pub fn push_create_error(&self, code: &str) {
        self.push_create(Err(ClientError::api(code, "scripted failure")));
    }

    /// Queues a `DescribeInstances` outcome.
    pub fn push_describe(&self, outcome: Result<DescribeInstancesResponse, ClientError>) {
        self.lock().describes.push_back(outcome);
    }

    /// Queues a `DescribeInstances` response listing one instance.
    pub fn push_instance(&self, instance_id: &str, status: InstanceStatus) {
        self.push_describe(Ok(DescribeInstancesResponse::from_instances(vec![
            instance(instance_id, status),
        ])));
    }

    /// Queues a `DeleteInstance` outcome.
    pub fn push_delete(&self, outcome: Result<(), ClientError>) {
        self.lock().deletes.push_back(outcome);
    }

    /// Returns every `CreateInstance` request received so far.
    #[must_use]
    pub fn create_requests(&self) -> Vec<CreateInstanceRequest> {
        self.lock().create_requests.clone()
    }

    /// Returns every `DescribeInstances` request received so far.
    #[must_use]
    pub fn describe_requests(&self) -> Vec<DescribeInstancesRequest> {
        self.lock().describe_requests.clone()
    }

    /// Returns every `DeleteInstance` request received so far.
    #[must_use]
    pub fn delete_requests(&self) -> Vec<DeleteInstanceRequest> {
        self.lock().delete_requests.clone()
    }
}

impl EcsClient for ScriptedClient {
    fn create_instance<'a>(
        &'a self,
        request: &'a CreateInstanceRequest,
    ) -> ClientFuture<'a, CreateInstanceResponse> {
        let outcome = {
            let mut state = self.lock();
            state.create_requests.push(request.clone());
            state.creates.pop_front().unwrap_or_else(|| {
                Err(ClientError::Transport {
                    message: String::from("no scripted CreateInstance response"),
                })
            })
        };
        Box::pin(async move { outcome })
    }

    fn describe_instances<'a>(
        &'a self,
        request: &'a DescribeInstancesRequest,
    ) -> ClientFuture<'a, DescribeInstancesResponse> {
        let outcome = {
            let mut state = self.lock();
            state.describe_requests.push(request.clone());
            state
                .describes
                .pop_front()
                .unwrap_or_else(|| Ok(DescribeInstancesResponse::default()))
        };
        Box::pin(async move { outcome })
    }

    fn delete_instance<'a>(&'a self, request: &'a DeleteInstanceRequest) -> ClientFuture<'a, ()> {
        let outcome = {
            let mut state = self.lock();
            state.delete_requests.push(request.clone());
            state.deletes.pop_front().unwrap_or(Ok(()))
        };
        Box::pin(async move { outcome })
    }
}

/// Builds an instance descriptor with the given identifier and status.
#[must_use]
pub fn instance(instance_id: &str, status: InstanceStatus) -> Instance {
    Instance {
        instance_id: instance_id.to_owned(),
        instance_name: String::from("ecsforge-build"),
        status,
        region_id: String::from("cn-qingdao-env17-d01"),
        zone_id: String::from("cn-qingdao-env17-amtest17001-a"),
        instance_type: String::from("ecs.n4.large"),
        image_id: String::from("centos_7_x64"),
        instance_network_type: String::from("vpc"),
        creation_time: String::from("2026-10-19T08:00Z"),
    }
}

/// Builds a source image descriptor.
#[must_use]
pub fn image(image_id: &str) -> Image {
    Image {
        image_id: image_id.to_owned(),
        image_name: String::from("centos 7"),
        os_type: String::from("linux"),
        architecture: String::from("x86_64"),
    }
}

/// Builds a minimal valid configuration for one build.
#[must_use]
pub fn build_config() -> BuildConfig {
    BuildConfig {
        access: AccessConfig {
            access_key: Some(String::from("key-id")),
            secret_key: String::from("key-secret"),
            region: String::from("cn-qingdao-env17-d01"),
            product: ECS_PRODUCT.to_owned(),
            department: Some(String::from("11")),
            resource_group: Some(String::from("27")),
        },
        instance: InstanceConfig {
            instance_type: String::from("ecs.n4.large"),
            instance_name: String::from("ecsforge-build"),
            ..InstanceConfig::default()
        },
        image: ImageConfig::default(),
        communicator: CommunicatorConfig::default(),
    }
}

/// Builds state as left by the image, security group and network steps.
#[must_use]
pub fn vpc_state(vswitch_id: &str) -> BuildState {
    BuildState::new()
        .with_source_image(image("centos_7_x64"))
        .with_security_group_id("sg-build")
        .with_network(InstanceNetwork::Vpc {
            vswitch_id: vswitch_id.to_owned(),
        })
}

/// Builds prepared state for a classic-network build.
#[must_use]
pub fn classic_state() -> BuildState {
    BuildState::new()
        .with_source_image(image("centos_7_x64"))
        .with_security_group_id("sg-build")
        .with_network(InstanceNetwork::Classic)
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: AsyncMutex<()> = AsyncMutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: AsyncMutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets multiple environment variables while holding a global mutex.
    pub async fn set_vars(pairs: &[(&str, &str)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`.
            unsafe { env::set_var(key, value) };
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }

    /// Also removes `keys` for the lifetime of the guard.
    #[must_use]
    pub fn without_vars(mut self, keys: &[&str]) -> Self {
        for key in keys {
            let old = env::var_os(key);
            // SAFETY: `self` still holds `ENV_LOCK`.
            unsafe { env::remove_var(key) };
            self.previous.push(((*key).to_owned(), old));
        }
        self
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in self.previous.iter().rev() {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
