//! Settings files, env files, and per-index resolution working together.

use std::fs;

use gpufleet::adapter::outbound::{EnvFileSource, LayeredSource};
use gpufleet::application::ConfigStore;
use gpufleet::domain::{DeviceIndex, Namespace};
use gpufleet::error::{ConfigError, Error};
use gpufleet::infrastructure::bootstrap;
use gpufleet::infrastructure::config::service::KeyScheme;
use gpufleet::infrastructure::config::settings::Settings;
use gpufleet::testkit::env::{TestEnv, ADDRESS};

fn index(raw: &str) -> DeviceIndex {
    DeviceIndex::new(raw).expect("index")
}

#[test]
fn env_file_resolves_complete_instances() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(".env");
    let env = TestEnv::new()
        .device("0")
        .device("1")
        .set("WORKFLOW_NAMES", "upscale, txt2img");
    fs::write(&path, env.to_dotenv()).expect("write env");

    let source = EnvFileSource::load(&path, true).expect("load");
    let store = ConfigStore::new(source, KeyScheme::default());

    let config = store.resolve(&index("1")).expect("resolve");
    assert_eq!(config.device_binding, "1");
    assert_eq!(config.service_port, 8189);
    assert_eq!(config.account_address, ADDRESS);
    assert_eq!(config.workload_names, ["upscale", "txt2img"]);
}

#[test]
fn quoted_env_values_keep_spaces_and_quotes() {
    use gpufleet::port::KeyValueSource;

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(".env");
    let env = TestEnv::new()
        .set("WORKFLOW_NAMES", "upscale, txt2img")
        .set("BANNER", "gpu \"farm\" one");
    fs::write(&path, env.to_dotenv()).expect("write env");

    let source = EnvFileSource::load(&path, true).expect("load");
    assert_eq!(source.get("WORKFLOW_NAMES").as_deref(), Some("upscale, txt2img"));
    assert_eq!(source.get("BANNER").as_deref(), Some("gpu \"farm\" one"));
}

#[test]
fn earlier_layer_overrides_env_file() {
    let file = EnvFileSource::from_pairs(TestEnv::new().device("0").build());
    let overrides = EnvFileSource::from_pairs([("COMFYUI_PORT_0", "9000")]);
    let source = LayeredSource::new().with_layer(overrides).with_layer(file);

    let store = ConfigStore::new(source, KeyScheme::default());
    assert_eq!(store.resolve(&index("0")).expect("resolve").service_port, 9000);
}

#[test]
fn first_missing_key_is_reported() {
    let source = TestEnv::new()
        .device("7")
        .remove("CUDA_DEVICE_7")
        .remove("ERC20_ADDRESS_7")
        .build();
    let store = ConfigStore::new(source, KeyScheme::default());

    assert_eq!(
        store.resolve(&index("7")),
        Err(ConfigError::MissingField {
            key: "CUDA_DEVICE_7".into()
        })
    );
}

#[test]
fn blank_values_count_as_missing() {
    let source = TestEnv::new().device("0").set("COMFYUI_PORT_0", "  ").build();
    let store = ConfigStore::new(source, KeyScheme::default());

    assert_eq!(
        store.resolve(&index("0")),
        Err(ConfigError::MissingField {
            key: "COMFYUI_PORT_0".into()
        })
    );
}

#[test]
fn malformed_address_is_invalid() {
    let source = TestEnv::new()
        .device("0")
        .set("ERC20_ADDRESS_0", "0x1234")
        .build();
    let store = ConfigStore::new(source, KeyScheme::default());

    assert!(matches!(
        store.resolve(&index("0")),
        Err(ConfigError::InvalidValue { key, .. }) if key == "ERC20_ADDRESS_0"
    ));
}

#[test]
fn custom_key_scheme_from_settings_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings_path = dir.path().join("gpufleet.toml");
    fs::write(
        &settings_path,
        r#"
project_prefix = "farm"
action_timeout_secs = 30

[keys]
device = "GPU"
port = "PORT"
address = "WALLET"

[logging]
level = "info"
format = "json"
"#,
    )
    .expect("write settings");
    let env_path = dir.path().join("fleet.env");
    fs::write(
        &env_path,
        format!("GPU_a=0\nPORT_a=7000\nWALLET_a={ADDRESS}\n"),
    )
    .expect("write env");

    let settings = Settings::load(&settings_path, true).expect("settings");
    assert_eq!(settings.logging.format, "json");
    let source = bootstrap::build_source(&env_path, true).expect("source");
    let dispatcher = bootstrap::build_dispatcher(&settings, source);

    let checked = dispatcher.check(&[index("a"), index("b")]);
    let (namespace, config) = checked[0].1.clone().expect("index a resolves");
    assert_eq!(namespace, Namespace::derive("farm", &index("a")));
    assert_eq!(config.service_port, 7000);
    assert_eq!(
        checked[1].1,
        Err(ConfigError::MissingField { key: "GPU_b".into() })
    );
}

#[test]
fn unknown_settings_type_is_a_parse_error() {
    let result = Settings::parse_toml("action_timeout_secs = \"soon\"");
    assert!(matches!(result, Err(Error::Config(ConfigError::Parse { .. }))));
}

#[test]
fn env_file_syntax_error_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(".env");
    fs::write(&path, "CUDA_DEVICE_0=0\nthis is not a pair\n").expect("write env");

    let result = EnvFileSource::load(&path, true);
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}
