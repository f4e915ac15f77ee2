//! Value formatters applied to call arguments before dispatch and to results
//! after decoding.
use serde_json::Value;

use crate::error::{RequestError, Result};

/// Formats the argument at `index`.
pub type InputFormatter = fn(usize, Value) -> Result<Value>;

/// Formats a decoded result.
pub type OutputFormatter = fn(Value) -> Result<Value>;

/// Length of an account address in hex characters, without the `0x` prefix.
const ADDRESS_HEX_LEN: usize = 40;

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Normalises an account address to lowercase `0x`-prefixed hex.
pub fn input_address_formatter(index: usize, value: Value) -> Result<Value> {
    let raw = value
        .as_str()
        .ok_or_else(|| RequestError::invalid_param(index, "address must be a string"))?;
    let body = strip_hex_prefix(raw);

    if body.len() != ADDRESS_HEX_LEN || hex::decode(body).is_err() {
        return Err(RequestError::invalid_param(
            index,
            format!("'{raw}' is not a valid address"),
        ));
    }

    Ok(Value::String(format!("0x{}", body.to_lowercase())))
}

/// Converts a non-negative integer, or its decimal string, to a `0x` hex quantity.
/// Hex strings are passed through lowercased.
pub fn input_quantity_formatter(index: usize, value: Value) -> Result<Value> {
    let quantity = match &value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| RequestError::invalid_param(index, "quantity must be a non-negative integer"))?,
        Value::String(s) if s.starts_with("0x") || s.starts_with("0X") => {
            let body = strip_hex_prefix(s);
            if body.is_empty() || !body.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(RequestError::invalid_param(
                    index,
                    format!("'{s}' is not a hex quantity"),
                ));
            }
            return Ok(Value::String(format!("0x{}", body.to_lowercase())));
        }
        Value::String(s) => s
            .parse::<u64>()
            .map_err(|err| RequestError::invalid_param(index, format!("'{s}': {err}")))?,
        _ => {
            return Err(RequestError::invalid_param(
                index,
                "quantity must be a number or a string",
            ))
        }
    };

    Ok(Value::String(format!("{quantity:#x}")))
}

/// Converts a `0x` hex quantity into its decimal string. Numbers become decimal
/// strings, anything else is returned untouched.
pub fn output_quantity_formatter(value: Value) -> Result<Value> {
    match value {
        Value::String(s) if s.starts_with("0x") => {
            let quantity = u128::from_str_radix(&s[2..], 16).map_err(|err| {
                RequestError::InvalidResponse(format!("'{s}' is not a hex quantity: {err}"))
            })?;
            Ok(Value::String(quantity.to_string()))
        }
        Value::Number(n) => Ok(Value::String(n.to_string())),
        other => Ok(other),
    }
}
