//! Full configuration validation.
//!
//! Checks numeric ranges and collects every problem into a single
//! `ConfigError` so the operator sees them all at once.

mod helpers;


use crate::schema::MurmurConfig;
use murmur_common::ConfigError;

use helpers::validate_range;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &MurmurConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_server(&mut errors, config);
    validate_engine(&mut errors, config);
    validate_tiers(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_server(errors: &mut Vec<String>, config: &MurmurConfig) {
    validate_range(errors, "server.port", config.server.port, 1, 65535);
    validate_range(
        errors,
        "server.hello_timeout_secs",
        config.server.hello_timeout_secs,
        1,
        120,
    );
    if config.server.bind.trim().is_empty() {
        errors.push("server.bind must not be empty".into());
    }
}

fn validate_engine(errors: &mut Vec<String>, config: &MurmurConfig) {
    validate_range(
        errors,
        "engine.delivery_timeout_ms",
        config.engine.delivery_timeout_ms,
        100,
        60_000,
    );
    validate_range(
        errors,
        "engine.event_capacity",
        config.engine.event_capacity,
        16,
        65_536,
    );
    validate_range(
        errors,
        "engine.channel_capacity",
        config.engine.channel_capacity,
        16,
        65_536,
    );
}

fn validate_tiers(errors: &mut Vec<String>, config: &MurmurConfig) {
    if config
        .tiers
        .priority_users
        .iter()
        .any(|u| u.trim().is_empty())
    {
        errors.push("tiers.priority_users contains an empty id".into());
    }
}
