use super::*;
use crate::combiner::CombineError;
use serial_test::serial;
use std::env;
use std::time::Duration;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, env-mutating tests are serialized with #[serial].
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, env-mutating tests are serialized with #[serial].
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_blend_env() {
    // SAFETY: Test code only, env-mutating tests are serialized with #[serial].
    unsafe {
        env::remove_var("BLEND_WEIGHT_MATRIX_FACTORIZATION");
        env::remove_var("BLEND_WEIGHT_CONTENT_BASED");
        env::remove_var("BLEND_WEIGHT_POPULARITY");
        env::remove_var("BLEND_WEIGHT_CONTEXTUAL");
        env::remove_var("BLEND_CACHE_TTL_SECS");
        env::remove_var("BLEND_TOP_K");
        env::remove_var("BLEND_CACHE_CAPACITY");
        env::remove_var("BLEND_CONTEXT_BOOST");
        env::remove_var("BLEND_REQUEST_TIMEOUT_MS");
        env::remove_var("BLEND_EXCLUDE_INTERACTED");
        env::remove_var("BLEND_REDIS_URL");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.weights, WeightConfig::new(0.25, 0.25, 0.25, 0.25));
    assert_eq!(config.cache_ttl, Duration::from_secs(300));
    assert_eq!(config.top_k, 10);
    assert_eq!(config.cache_capacity, 10_000);
    assert_eq!(config.request_timeout, Duration::from_millis(2_000));
    assert!(config.exclude_interacted);
    assert!(config.redis_url.is_none());
    assert!(!config.has_cache_store());
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_blend_env();

    let config = Config::from_env().expect("should parse with defaults");
    assert_eq!(config, Config::default());
}

#[test]
#[serial]
fn test_from_env_custom_weights() {
    clear_blend_env();

    with_env_vars(
        &[
            ("BLEND_WEIGHT_MATRIX_FACTORIZATION", "0.4"),
            ("BLEND_WEIGHT_CONTENT_BASED", "0.3"),
            ("BLEND_WEIGHT_POPULARITY", " 0.2 "),
            ("BLEND_WEIGHT_CONTEXTUAL", "0.1"),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.weights, WeightConfig::new(0.4, 0.3, 0.2, 0.1));
        },
    );
}

#[test]
#[serial]
fn test_from_env_cache_and_top_k() {
    clear_blend_env();

    with_env_vars(
        &[
            ("BLEND_CACHE_TTL_SECS", "60"),
            ("BLEND_TOP_K", "3"),
            ("BLEND_CACHE_CAPACITY", "128"),
            ("BLEND_REQUEST_TIMEOUT_MS", "250"),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.cache_ttl, Duration::from_secs(60));
            assert_eq!(config.top_k, 3);
            assert_eq!(config.cache_capacity, 128);
            assert_eq!(config.request_timeout, Duration::from_millis(250));
        },
    );
}

#[test]
#[serial]
fn test_from_env_invalid_number_is_error() {
    clear_blend_env();

    with_env_vars(&[("BLEND_TOP_K", "ten")], || {
        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidNumber { name, value } => {
                assert_eq!(name, "BLEND_TOP_K");
                assert_eq!(value, "ten");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    });
}

#[test]
#[serial]
fn test_from_env_negative_ttl_is_error() {
    clear_blend_env();

    with_env_vars(&[("BLEND_CACHE_TTL_SECS", "-5")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidNumber { .. })
        ));
    });
}

#[test]
#[serial]
fn test_from_env_bool_values() {
    clear_blend_env();

    with_env_vars(&[("BLEND_EXCLUDE_INTERACTED", "false")], || {
        assert!(!Config::from_env().unwrap().exclude_interacted);
    });
    with_env_vars(&[("BLEND_EXCLUDE_INTERACTED", "1")], || {
        assert!(Config::from_env().unwrap().exclude_interacted);
    });
    with_env_vars(&[("BLEND_EXCLUDE_INTERACTED", "maybe")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidBool { .. })
        ));
    });
}

#[test]
#[serial]
fn test_from_env_redis_url() {
    clear_blend_env();

    with_env_vars(&[("BLEND_REDIS_URL", "redis://localhost:6379/0")], || {
        let config = Config::from_env().unwrap();
        assert_eq!(config.redis_url.as_deref(), Some("redis://localhost:6379/0"));
        assert!(config.has_cache_store());
    });

    with_env_vars(&[("BLEND_REDIS_URL", "   ")], || {
        assert!(Config::from_env().unwrap().redis_url.is_none());
    });
}

#[test]
fn test_validate_all_zero_weights() {
    let config = Config {
        weights: WeightConfig::new(0.0, 0.0, 0.0, 0.0),
        ..Default::default()
    };

    match config.validate() {
        Err(ConfigError::InvalidWeights(CombineError::InvalidWeightConfig { .. })) => {}
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_validate_negative_weight() {
    let config = Config {
        weights: WeightConfig::new(0.5, 0.5, -0.5, 0.0),
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_zero_values() {
    let cases = [
        Config {
            cache_ttl: Duration::ZERO,
            ..Default::default()
        },
        Config {
            top_k: 0,
            ..Default::default()
        },
        Config {
            cache_capacity: 0,
            ..Default::default()
        },
        Config {
            request_timeout: Duration::ZERO,
            ..Default::default()
        },
    ];

    for config in cases {
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { .. })
        ));
    }
}

#[test]
fn test_validate_boost() {
    for value in [-0.1, f32::NAN, f32::INFINITY] {
        let config = Config {
            context_boost: value,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBoost { .. })
        ));
    }
}

#[test]
fn test_error_display() {
    let err = ConfigError::NotPositive {
        name: "BLEND_TOP_K",
    };
    assert!(err.to_string().contains("BLEND_TOP_K"));

    let err = ConfigError::InvalidWeights(CombineError::InvalidWeightConfig {
        reason: "all zero".to_string(),
    });
    assert!(err.to_string().contains("all zero"));
}
