//! Assembly of the `CreateInstance` request from configuration and state.

use uuid::Uuid;

use crate::config::{BuildConfig, DiskMapping};
use crate::ecs::{CreateInstanceDataDisk, CreateInstanceRequest, IoOptimized, SystemDisk};
use crate::state::{BuildState, InstanceNetwork};
use crate::user_data::resolve_user_data;

use super::StepError;

/// Charge type applied on classic networks when none is configured.
pub const DEFAULT_INTERNET_CHARGE_TYPE: &str = "PayByTraffic";

/// Bandwidth cap in Mbps applied on classic networks when none is configured.
pub const DEFAULT_INTERNET_MAX_BANDWIDTH_OUT: u32 = 5;

/// Generates a time-ordered idempotency token for `CreateInstance`.
#[must_use]
pub fn client_token() -> String {
    Uuid::now_v7().to_string()
}

/// Builds the `CreateInstance` request for the build instance.
///
/// User data only applies to VPC placement; classic networking instead gets
/// a default charge type and bandwidth cap when the template sets none.
///
/// # Errors
///
/// Returns [`StepError::MissingState`] when an earlier step did not publish
/// the image, security group or network, and [`StepError::UserData`] when the
/// user data file cannot be read.
pub fn build_create_instance_request(
    config: &BuildConfig,
    state: &BuildState,
) -> Result<CreateInstanceRequest, StepError> {
    let instance = &config.instance;
    let source_image = state.source_image()?;
    let security_group_id = state.security_group_id()?;
    let configured_charge_type = instance.internet_charge_type.clone().unwrap_or_default();
    let configured_bandwidth = instance
        .internet_max_bandwidth_out
        .filter(|bandwidth| *bandwidth > 0);

    let (vswitch_id, user_data, internet_charge_type, internet_max_bandwidth_out) =
        match state.network()? {
            InstanceNetwork::Vpc { vswitch_id } => (
                Some(vswitch_id.clone()),
                resolve_user_data(
                    instance.user_data.as_deref(),
                    instance.user_data_file.as_deref(),
                )?,
                configured_charge_type,
                configured_bandwidth,
            ),
            InstanceNetwork::Classic => (
                None,
                None,
                if configured_charge_type.is_empty() {
                    DEFAULT_INTERNET_CHARGE_TYPE.to_owned()
                } else {
                    configured_charge_type
                },
                configured_bandwidth.or(Some(DEFAULT_INTERNET_MAX_BANDWIDTH_OUT)),
            ),
        };

    Ok(CreateInstanceRequest {
        scope: config.access.scope(),
        client_token: client_token(),
        region_id: config.access.region.clone(),
        zone_id: instance.zone_id.clone(),
        instance_type: instance.instance_type.clone(),
        instance_name: instance.instance_name.clone(),
        image_id: source_image.image_id.clone(),
        security_group_id: security_group_id.to_owned(),
        vswitch_id,
        user_data,
        internet_charge_type,
        internet_max_bandwidth_out,
        io_optimized: instance.io_optimized.map(IoOptimized::from),
        password: config.communicator.login_password().to_owned(),
        system_disk: system_disk(&config.image.system_disk),
        data_disk: config.image.data_disks.iter().map(data_disk).collect(),
    })
}

fn non_zero(size: u32) -> Option<u32> {
    (size > 0).then_some(size)
}

fn system_disk(mapping: &DiskMapping) -> SystemDisk {
    SystemDisk {
        disk_name: mapping.disk_name.clone(),
        category: mapping.disk_category.clone(),
        size: non_zero(mapping.disk_size),
        description: mapping.description.clone(),
    }
}

fn data_disk(mapping: &DiskMapping) -> CreateInstanceDataDisk {
    CreateInstanceDataDisk {
        disk_name: mapping.disk_name.clone(),
        category: mapping.disk_category.clone(),
        size: non_zero(mapping.disk_size),
        snapshot_id: mapping.snapshot_id.clone(),
        description: mapping.description.clone(),
        delete_with_instance: mapping.delete_with_instance,
        device: mapping.device.clone(),
        encrypted: mapping.encrypted,
    }
}
