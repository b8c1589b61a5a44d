// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Decoding of `getMetadata` return tuples.
//!
//! Depending on the ABI the node client exposes the tuple by field name,
//! by position, or both. Each field is looked up by name first and by index
//! second, independently of the others.

use alloy::dyn_abi::DynSolValue;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::backend::CallOutput;

const CID_FIELD: (&str, usize) = ("cid", 0);
const TIMESTAMP_FIELD: (&str, usize) = ("timestamp", 1);
const UPLOADER_FIELD: (&str, usize) = ("uploader", 2);

/// A decoded metadata entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MetadataRecord {
    /// Content identifier of the anchored file
    pub cid: String,
    /// Anchoring time, ISO-8601 with milliseconds
    #[schema(example = "2023-11-14T22:13:20.000Z")]
    pub timestamp: String,
    /// Address that submitted the entry
    pub uploader: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    /// Every field is empty: nothing is stored at this index.
    #[error("Metadata not found")]
    NotFound,

    #[error("Incomplete metadata: {0}")]
    Incomplete(&'static str),
}

/// Decode a metadata tuple into a [`MetadataRecord`].
///
/// The on-chain timestamp is seconds since the epoch.
pub fn decode_metadata(output: &CallOutput) -> Result<MetadataRecord, MetadataError> {
    let cid = output
        .field(CID_FIELD.0, CID_FIELD.1)
        .and_then(text_value);
    let timestamp_ms = output
        .field(TIMESTAMP_FIELD.0, TIMESTAMP_FIELD.1)
        .and_then(timestamp_millis);
    let uploader = output
        .field(UPLOADER_FIELD.0, UPLOADER_FIELD.1)
        .and_then(address_value);

    match (cid, timestamp_ms, uploader) {
        (None, None, None) => Err(MetadataError::NotFound),
        (Some(cid), Some(ms), Some(uploader)) => {
            let timestamp = DateTime::<Utc>::from_timestamp_millis(ms)
                .ok_or(MetadataError::Incomplete("timestamp out of range"))?
                .to_rfc3339_opts(SecondsFormat::Millis, true);
            Ok(MetadataRecord {
                cid,
                timestamp,
                uploader,
            })
        }
        (None, _, _) => Err(MetadataError::Incomplete("missing cid")),
        (_, None, _) => Err(MetadataError::Incomplete("missing or invalid timestamp")),
        (_, _, None) => Err(MetadataError::Incomplete("missing uploader")),
    }
}

fn text_value(value: &DynSolValue) -> Option<String> {
    match value {
        DynSolValue::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn address_value(value: &DynSolValue) -> Option<String> {
    match value {
        DynSolValue::Address(addr) if !addr.is_zero() => Some(addr.to_checksum(None)),
        DynSolValue::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Normalize a timestamp to epoch milliseconds. Zero and unparseable
/// values count as missing.
fn timestamp_millis(value: &DynSolValue) -> Option<i64> {
    let seconds_to_ms = |secs: i64| secs.checked_mul(1000).filter(|ms| *ms != 0);
    match value {
        DynSolValue::Uint(n, _) => {
            let secs = u64::try_from(*n).ok()?;
            seconds_to_ms(i64::try_from(secs).ok()?)
        }
        DynSolValue::Int(n, _) => seconds_to_ms(i64::try_from(*n).ok()?),
        DynSolValue::String(s) => {
            let secs = s.trim().parse::<f64>().ok().filter(|f| f.is_finite())?;
            let ms = (secs * 1000.0).round();
            if ms == 0.0 || ms.abs() > i64::MAX as f64 {
                return None;
            }
            Some(ms as i64)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, Address, U256};

    const UPLOADER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const CID: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";

    fn values(cid: &str, ts: u64, uploader: Address) -> Vec<DynSolValue> {
        vec![
            DynSolValue::String(cid.to_string()),
            DynSolValue::Uint(U256::from(ts), 256),
            DynSolValue::Address(uploader),
        ]
    }

    #[test]
    fn positional_and_named_shapes_decode_identically() {
        let positional = CallOutput::positional(values(CID, 1_700_000_000, UPLOADER));
        let named = CallOutput::named_only(
            ["cid", "timestamp", "uploader"]
                .into_iter()
                .map(str::to_string)
                .zip(values(CID, 1_700_000_000, UPLOADER)),
        );

        let a = decode_metadata(&positional).unwrap();
        let b = decode_metadata(&named).unwrap();
        assert_eq!(a, b);
        assert_eq!(decode_metadata(&positional).unwrap(), a);

        assert_eq!(a.cid, CID);
        assert_eq!(a.timestamp, "2023-11-14T22:13:20.000Z");
        assert_eq!(a.uploader, "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    }

    #[test]
    fn zero_uploader_counts_as_missing() {
        let output = CallOutput::positional(values(CID, 1_700_000_000, Address::ZERO));
        assert_eq!(
            decode_metadata(&output),
            Err(MetadataError::Incomplete("missing uploader"))
        );

        let empty = CallOutput::positional(vec![
            DynSolValue::String(CID.to_string()),
            DynSolValue::Uint(U256::from(1_700_000_000u64), 256),
            DynSolValue::String(String::new()),
        ]);
        assert_eq!(
            decode_metadata(&empty),
            Err(MetadataError::Incomplete("missing uploader"))
        );
    }

    #[test]
    fn named_fields_take_precedence() {
        let named = [
            ("cid".to_string(), DynSolValue::String("QmNamed".to_string())),
            ("timestamp".to_string(), DynSolValue::Uint(U256::from(60), 256)),
        ]
        .into_iter()
        .collect();
        let output = CallOutput::from_parts(values("QmPositional", 1, UPLOADER), named);

        let record = decode_metadata(&output).unwrap();
        assert_eq!(record.cid, "QmNamed");
        assert_eq!(record.timestamp, "1970-01-01T00:01:00.000Z");
        // No named uploader: falls back to index 2.
        assert_eq!(record.uploader, UPLOADER.to_checksum(None));
    }

    #[test]
    fn timestamp_is_seconds_not_milliseconds() {
        let output = CallOutput::positional(values(CID, 1, UPLOADER));
        assert_eq!(
            decode_metadata(&output).unwrap().timestamp,
            "1970-01-01T00:00:01.000Z"
        );
    }

    #[test]
    fn string_timestamp_is_accepted() {
        let output = CallOutput::positional(vec![
            DynSolValue::String(CID.to_string()),
            DynSolValue::String("1700000000".to_string()),
            DynSolValue::Address(UPLOADER),
        ]);
        assert_eq!(
            decode_metadata(&output).unwrap().timestamp,
            "2023-11-14T22:13:20.000Z"
        );
    }

    #[test]
    fn unparseable_timestamp_is_incomplete() {
        let output = CallOutput::positional(vec![
            DynSolValue::String(CID.to_string()),
            DynSolValue::String("soon".to_string()),
            DynSolValue::Address(UPLOADER),
        ]);
        assert!(matches!(
            decode_metadata(&output),
            Err(MetadataError::Incomplete(_))
        ));
    }

    #[test]
    fn zero_timestamp_is_incomplete() {
        let output = CallOutput::positional(values(CID, 0, UPLOADER));
        assert!(matches!(
            decode_metadata(&output),
            Err(MetadataError::Incomplete(_))
        ));
    }

    #[test]
    fn missing_cid_is_incomplete() {
        let output = CallOutput::positional(values("", 1_700_000_000, UPLOADER));
        assert_eq!(
            decode_metadata(&output),
            Err(MetadataError::Incomplete("missing cid"))
        );
    }

    #[test]
    fn all_default_fields_are_not_found() {
        let output = CallOutput::positional(values("", 0, Address::ZERO));
        assert_eq!(decode_metadata(&output), Err(MetadataError::NotFound));
        assert_eq!(
            decode_metadata(&CallOutput::default()),
            Err(MetadataError::NotFound)
        );
    }
}
