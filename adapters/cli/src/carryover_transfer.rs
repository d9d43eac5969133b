//! Single-line text form of a run carryover, for pasting between sessions.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use dungeon_snake_world::state::{RunCarryover, BACKLOG_CAPACITY};
use thiserror::Error;

const TRANSFER_DOMAIN: &str = "snake";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded carryover payload.
pub(crate) const TRANSFER_HEADER: &str = "snake:v1";
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while encoding or decoding carryover strings.
#[derive(Debug, Error)]
pub(crate) enum TransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("carryover string was empty")]
    EmptyPayload,
    /// The encoded carryover did not contain a version segment.
    #[error("carryover string is missing the version")]
    MissingVersion,
    /// The encoded carryover did not include the payload segment.
    #[error("carryover string is missing the payload")]
    MissingPayload,
    /// The encoded carryover used an unexpected prefix segment.
    #[error("carryover prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded carryover used an unsupported version identifier.
    #[error("carryover version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode carryover payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be converted to or from JSON.
    #[error("could not parse carryover payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The payload carried more purchases than the shop allows.
    #[error("carryover holds {held} purchased items but only {capacity} fit")]
    BacklogOverflow {
        /// Items in the decoded backlog.
        held: usize,
        /// Slots available.
        capacity: usize,
    },
}

/// Encodes the carryover into a single-line string.
pub(crate) fn encode(carryover: &RunCarryover) -> Result<String, TransferError> {
    let json = serde_json::to_vec(carryover).map_err(TransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!("{TRANSFER_HEADER}{FIELD_DELIMITER}{encoded}"))
}

/// Decodes a carryover from its string form.
pub(crate) fn decode(value: &str) -> Result<RunCarryover, TransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().unwrap_or_default();
    let version = parts.next().ok_or(TransferError::MissingVersion)?;
    let payload = parts.next().ok_or(TransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(TransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(TransferError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(TransferError::InvalidEncoding)?;
    let carryover: RunCarryover =
        serde_json::from_slice(&bytes).map_err(TransferError::InvalidPayload)?;

    if carryover.backlog.len() > BACKLOG_CAPACITY {
        return Err(TransferError::BacklogOverflow {
            held: carryover.backlog.len(),
            capacity: BACKLOG_CAPACITY,
        });
    }
    Ok(carryover)
}
