//! 配置加载测试

use crate::models::AssetClass;
use crate::settings::AppSettings;
use infrastructure_common::InfrastructureError;
use std::io::Write;
use std::path::Path;

fn toml_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_defaults_without_sources() {
    let settings = AppSettings::load_with_prefix(None, "DELTA_TEST_DEFAULTS").unwrap();

    assert_eq!(settings.container.max_resolution_depth, 64);
    assert_eq!(settings.sync.interval_secs, 600);
    assert_eq!(settings.sync.asset_class, AssetClass::Spot);
    assert_eq!(settings.repository.connection, "http::addr=localhost:9000;");
    assert_eq!(settings.engine.exchanges.len(), 1);
    assert_eq!(settings.engine.exchanges[0].name, "bybit");
}

#[test]
fn test_file_overrides_defaults() {
    let file = toml_file(
        r#"
[container]
max_resolution_depth = 16

[logging]
level = "debug"
json_format = true

[sync]
interval_secs = 30
asset_class = "margin"

[[engine.exchanges]]
name = "kraken"

[engine.exchanges.balances]
USDC = 200.0
"#,
    );

    let settings = AppSettings::load_with_prefix(Some(file.path()), "DELTA_TEST_FILE").unwrap();

    assert_eq!(settings.container.max_resolution_depth, 16);
    assert_eq!(settings.logging.level, "debug");
    assert!(settings.logging.json_format);
    // 未出现在文件中的字段保持默认值
    assert!(settings.logging.show_target);
    assert_eq!(settings.sync.interval_secs, 30);
    assert_eq!(settings.sync.asset_class, AssetClass::Margin);
    assert_eq!(settings.sync.withdrawal_currency, "USDT");

    assert_eq!(settings.engine.exchanges.len(), 1);
    let kraken = &settings.engine.exchanges[0];
    assert_eq!(kraken.name, "kraken");
    assert_eq!(kraken.balances.len(), 1);
    assert!(kraken.withdrawals.is_empty());
}

#[test]
fn test_environment_overrides_file() {
    let file = toml_file("[sync]\ninterval_secs = 30\n");
    std::env::set_var("DELTA_TEST_ENV_SYNC__INTERVAL_SECS", "5");
    std::env::set_var("DELTA_TEST_ENV_REPOSITORY__CONNECTION", "tcp::addr=db:9009;");

    let settings = AppSettings::load_with_prefix(Some(file.path()), "DELTA_TEST_ENV").unwrap();

    assert_eq!(settings.sync.interval_secs, 5);
    assert_eq!(settings.repository.connection, "tcp::addr=db:9009;");
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let result = AppSettings::load_with_prefix(
        Some(Path::new("/definitely/not/here/delta.toml")),
        "DELTA_TEST_MISSING",
    );
    assert!(matches!(
        result,
        Err(InfrastructureError::ConfigurationFailed { .. })
    ));
}

#[test]
fn test_validation_rejects_zero_interval() {
    let file = toml_file("[sync]\ninterval_secs = 0\n");
    let result = AppSettings::load_with_prefix(Some(file.path()), "DELTA_TEST_INVALID");
    assert!(matches!(
        result,
        Err(InfrastructureError::ConfigurationFailed { .. })
    ));
}
