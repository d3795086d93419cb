//! Descriptors returned by the ECS API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status reported for an ECS instance.
///
/// Statuses the provisioning flow does not reason about are preserved
/// verbatim in [`InstanceStatus::Other`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceStatus {
    /// The instance has been accepted but not yet scheduled.
    Pending,
    /// The instance is booting.
    Starting,
    /// The instance is running.
    Running,
    /// The instance is shutting down.
    Stopping,
    /// The instance is powered off. Freshly created instances settle here
    /// once their first boot completes.
    Stopped,
    /// Any status not listed above.
    Other(String),
}

impl InstanceStatus {
    /// Returns the status string used by the API.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Starting => "Starting",
            Self::Running => "Running",
            Self::Stopping => "Stopping",
            Self::Stopped => "Stopped",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl From<&str> for InstanceStatus {
    fn from(value: &str) -> Self {
        match value {
            "Pending" => Self::Pending,
            "Starting" => Self::Starting,
            "Running" => Self::Running,
            "Stopping" => Self::Stopping,
            "Stopped" => Self::Stopped,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for InstanceStatus {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<InstanceStatus> for String {
    fn from(value: InstanceStatus) -> Self {
        match value {
            InstanceStatus::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptor of an ECS instance as returned by `DescribeInstances`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
    /// Provider identifier of the instance.
    pub instance_id: String,
    /// Human readable instance name.
    #[serde(default)]
    pub instance_name: String,
    /// Current lifecycle status.
    pub status: InstanceStatus,
    /// Region hosting the instance.
    #[serde(default)]
    pub region_id: String,
    /// Availability zone hosting the instance.
    #[serde(default)]
    pub zone_id: String,
    /// Instance type (flavour).
    #[serde(default)]
    pub instance_type: String,
    /// Image the instance booted from.
    #[serde(default)]
    pub image_id: String,
    /// Network type, `classic` or `vpc`.
    #[serde(default)]
    pub instance_network_type: String,
    /// Creation timestamp as reported by the API.
    #[serde(default)]
    pub creation_time: String,
}

/// Source image selected by an earlier pipeline step.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Image {
    /// Provider identifier of the image.
    pub image_id: String,
    /// Image name.
    #[serde(default)]
    pub image_name: String,
    /// Operating system family, for example `linux`.
    #[serde(default)]
    pub os_type: String,
    /// CPU architecture, for example `x86_64`.
    #[serde(default)]
    pub architecture: String,
}

/// Response to a `CreateInstance` call.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateInstanceResponse {
    /// Identifier of the instance that was created.
    pub instance_id: String,
    /// Request identifier assigned by the API.
    #[serde(default)]
    pub request_id: String,
}

/// Response to a `DescribeInstances` call.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeInstancesResponse {
    /// Request identifier assigned by the API.
    #[serde(default)]
    pub request_id: String,
    /// Total number of instances matching the query.
    #[serde(default)]
    pub total_count: u32,
    /// Matching instances.
    #[serde(default)]
    pub instances: InstanceSet,
}

/// Wrapper mirroring the `Instances.Instance` nesting used by the API.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceSet {
    /// Matching instances.
    #[serde(default)]
    pub instance: Vec<Instance>,
}

impl DescribeInstancesResponse {
    /// Builds a response listing the given instances.
    #[must_use]
    pub fn from_instances(instances: Vec<Instance>) -> Self {
        Self {
            request_id: String::new(),
            total_count: u32::try_from(instances.len()).unwrap_or(u32::MAX),
            instances: InstanceSet {
                instance: instances,
            },
        }
    }

    /// Consumes the response and returns the listed instances.
    #[must_use]
    pub fn into_instances(self) -> Vec<Instance> {
        self.instances.instance
    }

    /// Removes and returns the first instance in the given status.
    #[must_use]
    pub fn take_in_status(self, status: &InstanceStatus) -> Option<Instance> {
        self.into_instances()
            .into_iter()
            .find(|instance| &instance.status == status)
    }
}
