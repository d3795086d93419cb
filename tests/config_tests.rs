//! Unit tests for configuration validation and request scoping.

use ecsforge::config::ConfigError;
use ecsforge::test_support::{EnvGuard, build_config};
use ecsforge::{AccessConfig, BuildConfig, DiskMapping};
use rstest::*;

#[fixture]
fn valid_config() -> BuildConfig {
    build_config()
}

#[rstest]
fn config_validation_accepts_complete_config(valid_config: BuildConfig) {
    valid_config
        .validate()
        .unwrap_or_else(|err| panic!("valid config should pass: {err}"));
}

#[test]
fn config_validation_rejects_missing_secret_with_actionable_error() {
    let mut cfg = valid_config();
    cfg.access.secret_key.clear();

    let error = cfg.validate().expect_err("secret is required");
    let ConfigError::MissingField(ref message) = error else {
        panic!("expected MissingField error");
    };
    assert!(
        message.contains("APSARASTACK_SECRET_KEY"),
        "error should mention env var: {message}"
    );
    assert!(
        message.contains("ecsforge.toml"),
        "error should mention config file: {message}"
    );
    assert!(
        message.contains("secret_key"),
        "error should mention TOML key: {message}"
    );
}

#[rstest]
#[case::region("APSARASTACK_REGION", "region")]
#[case::product("APSARASTACK_PRODUCT", "product")]
fn config_validation_produces_actionable_errors(
    mut valid_config: BuildConfig,
    #[case] env_var: &str,
    #[case] toml_key: &str,
) {
    match toml_key {
        "region" => valid_config.access.region.clear(),
        _ => valid_config.access.product = String::from("  "),
    }

    let message = valid_config
        .validate()
        .expect_err("validation should fail")
        .to_string();
    assert!(
        message.contains(env_var),
        "error should mention env var {env_var}: {message}"
    );
    assert!(
        message.contains(toml_key),
        "error should mention TOML key {toml_key}: {message}"
    );
}

#[rstest]
fn config_validation_requires_instance_type(mut valid_config: BuildConfig) {
    valid_config.instance.instance_type.clear();

    let message = valid_config
        .validate()
        .expect_err("instance type is required")
        .to_string();
    assert!(
        message.contains("instance_type"),
        "unexpected error: {message}"
    );
}

#[rstest]
fn scope_carries_tenant_values(valid_config: BuildConfig) {
    let scope = valid_config.access.scope();

    assert_eq!(scope.region_id, "cn-qingdao-env17-d01");
    assert_eq!(scope.access_key_secret, "key-secret");
    assert_eq!(scope.product, "ecs");
    assert_eq!(scope.department.as_deref(), Some("11"));
    assert_eq!(scope.resource_group.as_deref(), Some("27"));

    let describe = scope.for_describe();
    assert_eq!(describe.department, None);
    assert_eq!(describe.resource_group, None);
    assert_eq!(describe.access_key_secret, "key-secret");
}

#[test]
fn build_template_deserialises_with_defaults() {
    let raw = serde_json::json!({
        "access": {
            "secret_key": "s3cret",
            "region": "cn-qingdao-env17-d01",
            "product": "ecs"
        },
        "instance": {
            "instance_type": "ecs.n4.large",
            "io_optimized": true,
            "user_data_file": "/srv/user-data.sh"
        },
        "image": {
            "system_disk": { "disk_category": "cloud_ssd", "disk_size": 40 },
            "data_disks": [{ "disk_name": "data", "disk_size": 100, "encrypted": true }]
        }
    });

    let cfg: BuildConfig =
        serde_json::from_value(raw).unwrap_or_else(|err| panic!("template parses: {err}"));

    assert_eq!(cfg.access.access_key, None);
    assert_eq!(cfg.instance.io_optimized, Some(true));
    assert_eq!(
        cfg.instance.user_data_file.as_ref().map(|path| path.as_str()),
        Some("/srv/user-data.sh")
    );
    assert_eq!(cfg.instance.internet_max_bandwidth_out, None);
    assert_eq!(cfg.image.system_disk.disk_size, 40);
    assert_eq!(
        cfg.image.data_disks,
        vec![DiskMapping {
            disk_name: String::from("data"),
            disk_size: 100,
            encrypted: Some(true),
            ..DiskMapping::default()
        }]
    );
    assert!(cfg.communicator.ssh_password.is_empty());
}

#[tokio::test]
async fn access_config_loads_from_environment_with_defaults() {
    let _guard = EnvGuard::set_vars(&[
        ("APSARASTACK_SECRET_KEY", "env-secret"),
        ("APSARASTACK_REGION", "cn-qingdao-env17-d01"),
    ])
    .await
    .without_vars(&[
        "APSARASTACK_ACCESS_KEY",
        "APSARASTACK_PRODUCT",
        "APSARASTACK_DEPARTMENT",
        "APSARASTACK_RESOURCE_GROUP",
    ]);

    let cfg = AccessConfig::load_without_cli_args()
        .unwrap_or_else(|err| panic!("access config should load from env: {err}"));

    assert_eq!(cfg.secret_key, "env-secret");
    assert_eq!(cfg.region, "cn-qingdao-env17-d01");
    assert_eq!(cfg.product, "ecs");
    assert_eq!(cfg.department, None);
    assert_eq!(cfg.resource_group, None);
    cfg.validate()
        .unwrap_or_else(|err| panic!("loaded config should validate: {err}"));
}

#[tokio::test]
async fn access_config_environment_overrides_tenant_scope() {
    let _guard = EnvGuard::set_vars(&[
        ("APSARASTACK_SECRET_KEY", "env-secret"),
        ("APSARASTACK_REGION", "cn-hangzhou-d01"),
        ("APSARASTACK_PRODUCT", "ecs-custom"),
        ("APSARASTACK_DEPARTMENT", "42"),
        ("APSARASTACK_RESOURCE_GROUP", "7"),
    ])
    .await;

    let scope = AccessConfig::load_without_cli_args()
        .unwrap_or_else(|err| panic!("access config should load from env: {err}"))
        .scope();

    assert_eq!(scope.product, "ecs-custom");
    assert_eq!(scope.department.as_deref(), Some("42"));
    assert_eq!(scope.resource_group.as_deref(), Some("7"));
    assert_eq!(scope.region_id, "cn-hangzhou-d01");
}
