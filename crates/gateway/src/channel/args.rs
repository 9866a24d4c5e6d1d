//! Argument-bag extraction for method calls.
//!
//! A JSON `null` is treated the same as an absent argument.

use common::{ChannelError, ErrorCode};
use serde_json::{Map, Value};

use crate::gateway::{ConfigError, Configuration};

pub(crate) const ACCESS_KEY_ID: &str = "accessKeyId";
pub(crate) const SECRET_ACCESS_KEY: &str = "secretAccessKey";
pub(crate) const REGION: &str = "region";
pub(crate) const KEY_ID: &str = "keyId";
pub(crate) const PLAINTEXT: &str = "plaintext";
pub(crate) const ENCRYPTED_TEXT: &str = "encryptedText";

const CREDENTIAL_ARGS: [&str; 4] = [ACCESS_KEY_ID, SECRET_ACCESS_KEY, REGION, KEY_ID];

/// A string argument that may be absent.
pub(crate) fn optional<'a>(
    args: &'a Map<String, Value>,
    name: &str,
) -> Result<Option<&'a str>, ChannelError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ChannelError::invalid_arguments(format!(
            "argument {name} must be a string"
        ))),
    }
}

/// A string argument that must be present.
pub(crate) fn required<'a>(
    args: &'a Map<String, Value>,
    name: &str,
) -> Result<&'a str, ChannelError> {
    optional(args, name)?
        .ok_or_else(|| ChannelError::invalid_arguments(format!("missing argument {name}")))
}

/// Configuration supplied through the `configure` method.
///
/// Absent or mistyped fields are configuration errors here, not argument
/// errors: every failure of `configure` is reported as `CONFIGURATION_ERROR`.
pub(crate) fn configuration(args: &Map<String, Value>) -> Result<Configuration, ChannelError> {
    Configuration::new(
        config_field(args, ACCESS_KEY_ID)?,
        config_field(args, SECRET_ACCESS_KEY)?,
        config_field(args, REGION)?,
        config_field(args, KEY_ID)?,
    )
    .map_err(config_error)
}

fn config_field<'a>(args: &'a Map<String, Value>, name: &str) -> Result<&'a str, ChannelError> {
    optional(args, name)
        .map(Option::unwrap_or_default)
        .map_err(|e| ChannelError::new(ErrorCode::ConfigurationError, e.message))
}

/// Credentials passed inline with an encrypt/decrypt call.
///
/// Returns `Ok(None)` when none of the four arguments is present, so the
/// stored configuration applies. A partial set is an argument error.
pub(crate) fn inline_configuration(
    args: &Map<String, Value>,
) -> Result<Option<Configuration>, ChannelError> {
    let mut values = Vec::with_capacity(CREDENTIAL_ARGS.len());
    for name in CREDENTIAL_ARGS {
        values.push(optional(args, name)?);
    }

    match values.as_slice() {
        [None, None, None, None] => Ok(None),
        [Some(access_key_id), Some(secret), Some(region), Some(key_id)] => {
            Configuration::new(*access_key_id, *secret, *region, *key_id)
                .map(Some)
                .map_err(config_error)
        }
        _ => {
            let missing: Vec<&str> = CREDENTIAL_ARGS
                .iter()
                .zip(&values)
                .filter(|(_, v)| v.is_none())
                .map(|(name, _)| *name)
                .collect();
            Err(ChannelError::invalid_arguments(format!(
                "inline credentials are incomplete; missing {}",
                missing.join(", ")
            )))
        }
    }
}

fn config_error(e: ConfigError) -> ChannelError {
    ChannelError::new(ErrorCode::ConfigurationError, "Invalid configuration")
        .with_details(e.to_string())
}
