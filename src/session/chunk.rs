// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chunk turn encoding
//!
//! A chunk turn reads `Here is code chunk number: <n>, chunk: <json>`, the
//! JSON being the payload record. The sequence number lets the model refer
//! back to chunks by position.

use crate::error::{DoqqError, Result};
use crate::source::PayloadRecord;

const CHUNK_PREFIX: &str = "Here is code chunk number: ";
const CHUNK_SEPARATOR: &str = ", chunk: ";

/// Render a payload as the text of chunk turn `index` (1-based)
pub fn encode_chunk_turn(index: usize, record: &PayloadRecord) -> Result<String> {
    let body = serde_json::to_string(record)?;
    Ok(format!("{CHUNK_PREFIX}{index}{CHUNK_SEPARATOR}{body}"))
}

/// Recover the sequence index and payload from a chunk turn
pub fn parse_chunk_turn(text: &str) -> Result<(usize, PayloadRecord)> {
    let rest = text
        .strip_prefix(CHUNK_PREFIX)
        .ok_or_else(|| DoqqError::InvalidInput("not a chunk turn".to_string()))?;
    let (index, body) = rest
        .split_once(CHUNK_SEPARATOR)
        .ok_or_else(|| DoqqError::InvalidInput("chunk turn has no payload".to_string()))?;
    let index = index
        .parse::<usize>()
        .map_err(|e| DoqqError::InvalidInput(format!("bad chunk number {:?}: {}", index, e)))?;
    let record = serde_json::from_str(body)?;
    Ok((index, record))
}

/// Whether a turn's text is a chunk turn
pub fn is_chunk_turn(text: &str) -> bool {
    parse_chunk_turn(text).is_ok()
}
