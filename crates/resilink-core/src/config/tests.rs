use std::time::Duration;

use super::*;

#[test]
fn default_config_values() {
    let cfg = ResilienceConfig::default();
    assert_eq!(cfg.retry.max_attempts, 3);
    assert_eq!(cfg.retry.initial_backoff_ms, 1000);
    assert_eq!(cfg.retry.backoff_multiplier, 2.0);
    assert_eq!(cfg.retry.max_backoff_ms, 10_000);
    assert_eq!(cfg.breaker.failure_threshold, 5);
    assert_eq!(cfg.breaker.open_duration_ms, 60_000);
    assert_eq!(cfg.breaker.half_open_max_probes, 2);
    assert_eq!(cfg.dlq.backend, DlqBackend::Sqlite);
    assert_eq!(cfg.dlq.capacity, 10_000);
    assert!(cfg.validate().is_ok());
}

#[test]
fn config_toml_roundtrip() {
    let cfg = ResilienceConfig::default();
    let toml = toml::to_string_pretty(&cfg).unwrap();
    let parsed: ResilienceConfig = toml::from_str(&toml).unwrap();
    assert_eq!(parsed, cfg);
}

#[test]
fn empty_file_uses_defaults() {
    let cfg: ResilienceConfig = toml::from_str("").unwrap();
    assert_eq!(cfg, ResilienceConfig::default());
}

#[test]
fn integration_overrides_merge_with_globals() {
    let toml = r#"
        [retry]
        initial_backoff_ms = 500

        [integrations.hubspot]
        retry = { max_attempts = 5 }
        breaker = { failure_threshold = 3 }
    "#;
    let cfg: ResilienceConfig = toml::from_str(toml).unwrap();

    let hubspot = cfg.client_config("hubspot").unwrap();
    assert_eq!(hubspot.integration_name, "hubspot");
    assert_eq!(hubspot.retry.max_attempts, 5);
    assert_eq!(hubspot.retry.initial_backoff, Duration::from_millis(500));
    assert_eq!(hubspot.breaker.failure_threshold, 3);
    assert_eq!(hubspot.breaker.open_duration, Duration::from_secs(60));

    let stripe = cfg.client_config("stripe").unwrap();
    assert_eq!(stripe.retry.max_attempts, 3);
    assert_eq!(stripe.breaker.failure_threshold, 5);
}

#[test]
fn zero_attempts_rejected() {
    let toml = r#"
        [retry]
        max_attempts = 0
    "#;
    let cfg: ResilienceConfig = toml::from_str(toml).unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(matches!(&err, ConfigError::Invalid { field, .. } if field == "retry.max_attempts"));
}

#[test]
fn multiplier_below_one_rejected() {
    let toml = r#"
        [retry]
        backoff_multiplier = 0.5
    "#;
    let cfg: ResilienceConfig = toml::from_str(toml).unwrap();
    assert!(cfg.validate().is_err());
}

#[test]
fn cap_below_initial_backoff_rejected() {
    let toml = r#"
        [retry]
        initial_backoff_ms = 5000
        max_backoff_ms = 1000
    "#;
    let cfg: ResilienceConfig = toml::from_str(toml).unwrap();
    assert!(cfg.validate().is_err());
}

#[test]
fn invalid_override_names_the_integration() {
    let toml = r#"
        [integrations.calendly]
        breaker = { half_open_max_probes = 0 }
    "#;
    let cfg: ResilienceConfig = toml::from_str(toml).unwrap();
    let err = cfg.validate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "integrations.calendly.breaker.half_open_max_probes must be >= 1 (got 0)"
    );
}

#[test]
fn unknown_override_field_is_a_parse_error() {
    let toml = r#"
        [integrations.hubspot]
        retry = { attempts = 5 }
    "#;
    assert!(toml::from_str::<ResilienceConfig>(toml).is_err());
}

#[test]
fn dlq_memory_backend_and_path() {
    let toml = r#"
        [dlq]
        backend = "memory"
        capacity = 0
        path = "/tmp/custom.db"
    "#;
    let cfg: ResilienceConfig = toml::from_str(toml).unwrap();
    assert_eq!(cfg.dlq.backend, DlqBackend::Memory);
    assert_eq!(cfg.dlq.capacity, 0);
    assert_eq!(cfg.dlq.path.as_deref(), Some(std::path::Path::new("/tmp/custom.db")));
}

#[test]
fn transport_timeouts() {
    let toml = r#"
        [transport]
        connect_timeout_secs = 2
    "#;
    let cfg: ResilienceConfig = toml::from_str(toml).unwrap();
    let opts = cfg.transport.to_options();
    assert_eq!(opts.connect_timeout, Duration::from_secs(2));
    assert_eq!(opts.request_timeout, Duration::from_secs(30));
}

#[test]
fn load_or_init_writes_defaults_then_reads_them() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resilink").join("config.toml");
    let first = load_or_init_at(&path).unwrap();
    assert!(path.exists());
    let second = load_or_init_at(&path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn load_rejects_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[breaker]\nopen_duration_ms = 0\n").unwrap();
    assert!(load_or_init_at(&path).is_err());
}
