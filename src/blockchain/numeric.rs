// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Conversion of chain integers into JSON-safe decimal strings.
//!
//! JSON numbers lose precision above 2^53 in most clients, so every integer
//! leaving the orchestrator is rendered as a base-10 string.

use alloy::{dyn_abi::DynSolValue, primitives::U256};
use serde_json::Value;

/// Receipt and log fields that JSON-RPC encodes as hex quantities.
const QUANTITY_KEYS: &[&str] = &[
    "blockNumber",
    "blockTimestamp",
    "blobGasPrice",
    "blobGasUsed",
    "cumulativeGasUsed",
    "effectiveGasPrice",
    "gasUsed",
    "logIndex",
    "status",
    "transactionIndex",
    "type",
];

/// Decimal rendering of an ABI integer. `None` for non-integer values.
pub fn to_decimal_string(value: &DynSolValue) -> Option<String> {
    match value {
        DynSolValue::Uint(n, _) => Some(n.to_string()),
        DynSolValue::Int(n, _) => Some(n.to_string()),
        _ => None,
    }
}

/// Walk a receipt and turn every integer into a decimal string.
///
/// Native JSON numbers are stringified wherever they appear. Hex strings are
/// converted only under known quantity keys so hashes, addresses and log
/// data keep their hex form.
pub fn normalize_receipt(receipt: Value) -> Value {
    normalize(None, receipt)
}

fn normalize(key: Option<&str>, value: Value) -> Value {
    match value {
        Value::Number(n) => Value::String(n.to_string()),
        Value::String(s) if key.is_some_and(is_quantity_key) => {
            Value::String(hex_quantity_to_decimal(&s).unwrap_or(s))
        }
        Value::Array(items) => Value::Array(items.into_iter().map(|v| normalize(key, v)).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| {
                    let normalized = normalize(Some(&k), v);
                    (k, normalized)
                })
                .collect(),
        ),
        other => other,
    }
}

fn is_quantity_key(key: &str) -> bool {
    QUANTITY_KEYS.contains(&key)
}

fn hex_quantity_to_decimal(raw: &str) -> Option<String> {
    let digits = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"))?;
    if digits.is_empty() {
        return None;
    }
    U256::from_str_radix(digits, 16).ok().map(|n| n.to_string())
}
