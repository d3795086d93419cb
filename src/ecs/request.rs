//! Request types for the ECS instance lifecycle calls.

use std::collections::BTreeMap;

use serde::Serialize;

use super::error::ClientError;
use super::query::flatten_query;

/// Product code sent with every ECS call.
pub const ECS_PRODUCT: &str = "ecs";

/// Envelope values attached to every ApsaraStack call: the region header and
/// the tenant scoping query parameters.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RequestScope {
    /// Region routed to through the `RegionId` header.
    pub region_id: String,
    /// Access key secret forwarded as a query parameter.
    pub access_key_secret: String,
    /// Product code, normally [`ECS_PRODUCT`].
    pub product: String,
    /// Department owning the resources, when the tenant uses one.
    pub department: Option<String>,
    /// Resource group owning the resources, when the tenant uses one.
    pub resource_group: Option<String>,
}

impl RequestScope {
    /// Returns the HTTP headers carried by the call.
    #[must_use]
    pub fn headers(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(String::from("RegionId"), self.region_id.clone())])
    }

    /// Returns the envelope query parameters carried by the call.
    #[must_use]
    pub fn query_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::from([
            (
                String::from("AccessKeySecret"),
                self.access_key_secret.clone(),
            ),
            (String::from("Product"), self.product.clone()),
        ]);
        if let Some(department) = &self.department {
            params.insert(String::from("Department"), department.clone());
        }
        if let Some(group) = &self.resource_group {
            params.insert(String::from("ResourceGroup"), group.clone());
        }
        params
    }

    /// Returns the scope used for read-only lookups, which carry no
    /// department or resource group.
    #[must_use]
    pub fn for_describe(&self) -> Self {
        Self {
            department: None,
            resource_group: None,
            ..self.clone()
        }
    }
}

/// I/O optimisation mode requested for an instance.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IoOptimized {
    /// I/O optimised instance.
    Optimized,
    /// Legacy, non-optimised instance.
    None,
}

impl From<bool> for IoOptimized {
    fn from(value: bool) -> Self {
        if value { Self::Optimized } else { Self::None }
    }
}

/// System disk parameters of a `CreateInstance` call.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SystemDisk {
    /// Disk name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub disk_name: String,
    /// Disk category, for example `cloud_ssd`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category: String,
    /// Size in GiB; omitted to let the image decide.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Free-form description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// One data disk of a `CreateInstance` call.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateInstanceDataDisk {
    /// Disk name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub disk_name: String,
    /// Disk category, for example `cloud_efficiency`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category: String,
    /// Size in GiB; omitted when the disk is restored from a snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Snapshot to restore the disk from.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub snapshot_id: String,
    /// Free-form description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Whether the disk is released together with the instance.
    pub delete_with_instance: bool,
    /// Device name, for example `/dev/xvdb`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub device: String,
    /// Encryption flag; omitted when the template leaves it unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<bool>,
}

/// Parameters of a `CreateInstance` call.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateInstanceRequest {
    /// Envelope values; sent as headers and scope parameters, not as body.
    #[serde(skip)]
    pub scope: RequestScope,
    /// Idempotency token. Re-sending the same token never creates a second
    /// instance.
    pub client_token: String,
    /// Target region.
    pub region_id: String,
    /// Target availability zone.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub zone_id: String,
    /// Instance type (flavour).
    pub instance_type: String,
    /// Instance name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub instance_name: String,
    /// Image to boot from.
    pub image_id: String,
    /// Security group the instance joins.
    pub security_group_id: String,
    /// VSwitch for VPC placement; absent for classic networking.
    #[serde(rename = "VSwitchId", skip_serializing_if = "Option::is_none")]
    pub vswitch_id: Option<String>,
    /// Base64 encoded user data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    /// Internet charge type, for example `PayByTraffic`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub internet_charge_type: String,
    /// Outbound bandwidth cap in Mbps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internet_max_bandwidth_out: Option<u32>,
    /// I/O optimisation mode; omitted when the template leaves it unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub io_optimized: Option<IoOptimized>,
    /// Login password for SSH or WinRM.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    /// System disk parameters.
    pub system_disk: SystemDisk,
    /// Data disk parameters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data_disk: Vec<CreateInstanceDataDisk>,
}

impl CreateInstanceRequest {
    /// Returns the full set of query parameters for the call.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Encode`] when the body cannot be serialized.
    pub fn query_params(&self) -> Result<BTreeMap<String, String>, ClientError> {
        encode("CreateInstance", &self.scope, self)
    }
}

/// Parameters of a `DescribeInstances` call.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeInstancesRequest {
    /// Envelope values.
    #[serde(skip)]
    pub scope: RequestScope,
    /// Region to search.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub region_id: String,
    /// JSON encoded array of instance identifiers.
    pub instance_ids: String,
}

impl DescribeInstancesRequest {
    /// Builds a lookup for a single instance.
    #[must_use]
    pub fn for_instance(scope: RequestScope, instance_id: &str) -> Self {
        Self {
            region_id: scope.region_id.clone(),
            instance_ids: serde_json::Value::from(vec![instance_id]).to_string(),
            scope,
        }
    }

    /// Returns the full set of query parameters for the call.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Encode`] when the body cannot be serialized.
    pub fn query_params(&self) -> Result<BTreeMap<String, String>, ClientError> {
        encode("DescribeInstances", &self.scope, self)
    }
}

/// Parameters of a `DeleteInstance` call.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteInstanceRequest {
    /// Envelope values.
    #[serde(skip)]
    pub scope: RequestScope,
    /// Instance to delete.
    pub instance_id: String,
    /// Delete even when the instance is running or holds dependent
    /// resources.
    pub force: bool,
}

impl DeleteInstanceRequest {
    /// Returns the full set of query parameters for the call.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Encode`] when the body cannot be serialized.
    pub fn query_params(&self) -> Result<BTreeMap<String, String>, ClientError> {
        encode("DeleteInstance", &self.scope, self)
    }
}

fn encode<T: Serialize>(
    action: &str,
    scope: &RequestScope,
    body: &T,
) -> Result<BTreeMap<String, String>, ClientError> {
    let mut params = flatten_query(body).map_err(|err| ClientError::Encode {
        action: action.to_owned(),
        message: err.to_string(),
    })?;
    params.extend(scope.query_params());
    Ok(params)
}
