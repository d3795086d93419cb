//! Configuration for the provisioning step.
//!
//! Credentials and tenant scoping load through `ortho-config`, merging
//! defaults, configuration files and `APSARASTACK_*` environment variables.
//! Instance, disk and communicator settings come from the build template and
//! are plain `serde` structures.

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::ecs::{ECS_PRODUCT, RequestScope};

/// Account, region and tenant settings used to scope every API call.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "APSARASTACK")]
pub struct AccessConfig {
    /// Access key identifier. Signing happens in the client, so the step
    /// only carries it through.
    pub access_key: Option<String>,
    /// Access key secret. This value is required.
    pub secret_key: String,
    /// Region hosting the build, for example `cn-qingdao-env17-d01`.
    pub region: String,
    /// Product code sent with every call. Defaults to `ecs`.
    #[ortho_config(default = ECS_PRODUCT.to_owned())]
    pub product: String,
    /// Department owning created resources.
    pub department: Option<String>,
    /// Resource group owning created resources.
    pub resource_group: Option<String>,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
    section: &'static str,
}

impl FieldMetadata {
    const fn new(
        description: &'static str,
        env_var: &'static str,
        toml_key: &'static str,
        section: &'static str,
    ) -> Self {
        Self {
            description,
            env_var,
            toml_key,
            section,
        }
    }
}

fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField(format!(
            "missing {}: set {} or add {} to [{}] in ecsforge.toml",
            metadata.description, metadata.env_var, metadata.toml_key, metadata.section
        )));
    }
    Ok(())
}

impl AccessConfig {
    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and `APSARASTACK_*` environment
    /// variables in that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("ecsforge")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_field(
            &self.secret_key,
            &FieldMetadata::new(
                "ApsaraStack access key secret",
                "APSARASTACK_SECRET_KEY",
                "secret_key",
                "apsarastack",
            ),
        )?;
        require_field(
            &self.region,
            &FieldMetadata::new(
                "ApsaraStack region",
                "APSARASTACK_REGION",
                "region",
                "apsarastack",
            ),
        )?;
        require_field(
            &self.product,
            &FieldMetadata::new(
                "product code",
                "APSARASTACK_PRODUCT",
                "product",
                "apsarastack",
            ),
        )?;
        Ok(())
    }

    /// Builds the request envelope shared by every call.
    #[must_use]
    pub fn scope(&self) -> RequestScope {
        RequestScope {
            region_id: self.region.clone(),
            access_key_secret: self.secret_key.clone(),
            product: self.product.clone(),
            department: self.department.clone(),
            resource_group: self.resource_group.clone(),
        }
    }
}

/// Settings of the instance launched for the build.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InstanceConfig {
    /// Instance type (flavour). Required.
    pub instance_type: String,
    /// Instance name; the API picks one when empty.
    pub instance_name: String,
    /// Availability zone; the API picks one when empty.
    pub zone_id: String,
    /// I/O optimisation. `None` leaves the choice to the API.
    pub io_optimized: Option<bool>,
    /// Internet charge type. Defaults to `PayByTraffic` on classic networks.
    pub internet_charge_type: Option<String>,
    /// Outbound bandwidth cap in Mbps. Defaults to 5 on classic networks.
    /// Zero counts as unset.
    pub internet_max_bandwidth_out: Option<u32>,
    /// Inline user data.
    pub user_data: Option<String>,
    /// File holding user data. Takes precedence over `user_data`.
    pub user_data_file: Option<Utf8PathBuf>,
}

impl InstanceConfig {
    /// Validates the instance settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when the instance type is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instance_type.trim().is_empty() {
            return Err(ConfigError::MissingField(String::from(
                "missing instance type: add instance_type to [instance] in the build template",
            )));
        }
        Ok(())
    }
}

/// Disk described by the build template.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DiskMapping {
    /// Disk name.
    pub disk_name: String,
    /// Disk category, for example `cloud_ssd`.
    pub disk_category: String,
    /// Size in GiB; zero lets the API decide.
    pub disk_size: u32,
    /// Snapshot to restore the disk from.
    pub snapshot_id: String,
    /// Free-form description.
    pub description: String,
    /// Whether the disk is released with the instance.
    pub delete_with_instance: bool,
    /// Device name, for example `/dev/xvdb`.
    pub device: String,
    /// Encryption. `None` leaves the choice to the API.
    pub encrypted: Option<bool>,
}

/// Disk layout of the build instance.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImageConfig {
    /// System disk.
    pub system_disk: DiskMapping,
    /// Additional data disks, in attachment order.
    pub data_disks: Vec<DiskMapping>,
}

/// Credentials the provisioners use to log in.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CommunicatorConfig {
    /// SSH password.
    pub ssh_password: String,
    /// WinRM password, used only when no SSH password is set.
    pub winrm_password: String,
}

impl CommunicatorConfig {
    /// Returns the password to set on the instance, preferring SSH.
    #[must_use]
    pub fn login_password(&self) -> &str {
        if self.ssh_password.is_empty() {
            &self.winrm_password
        } else {
            &self.ssh_password
        }
    }
}

/// Complete configuration consumed by the provisioning step.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct BuildConfig {
    /// Account and tenant scope.
    pub access: AccessConfig,
    /// Instance settings.
    #[serde(default)]
    pub instance: InstanceConfig,
    /// Disk layout.
    #[serde(default)]
    pub image: ImageConfig,
    /// Login credentials.
    #[serde(default)]
    pub communicator: CommunicatorConfig,
}

impl BuildConfig {
    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming the first missing value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.access.validate()?;
        self.instance.validate()
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}
