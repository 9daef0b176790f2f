//! Minimal ABI word handling for the pool contract.
//!
//! Only what the pool needs: zero-argument selectors, one address argument,
//! `uint256` return words and `Error(string)` revert payloads.

use yieldfarm_core::error::{RawFailure, codes};
use yieldfarm_core::ledger::Account;

pub const DEPOSIT: &str = "0xd0e30db0";
pub const WITHDRAW: &str = "0x3ccfd60b";
pub const GET_POOL_AMOUNT: &str = "0x4ab4ba42";
pub const GET_POOL_RATE: &str = "0xec9ab641";
pub const GET_POOL_LOCK_DURATION: &str = "0x998dc2ef";
pub const GET_USER_DEPOSIT: &str = "0xc084b10b";

/// Selector of the standard `Error(string)` revert payload.
pub const ERROR_STRING: &str = "08c379a0";

const WORD: usize = 32;

fn decode_failure(message: impl Into<String>) -> RawFailure {
    RawFailure::new(codes::DECODE, message)
}

fn strip_0x(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

/// Builds call data from a selector and an address argument.
pub fn call_with_address(selector: &str, account: &Account) -> String {
    format!("{selector}{:0>64}", strip_0x(account.as_str()))
}

/// Decodes `0x`-prefixed (or bare) hex into bytes.
pub fn decode_hex(data: &str) -> Result<Vec<u8>, RawFailure> {
    let hex = strip_0x(data.trim());
    if hex.len() % 2 != 0 {
        return Err(decode_failure(format!("odd-length hex: {data}")));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| decode_failure(format!("invalid hex: {data}")))
        })
        .collect()
}

/// Returns the `index`-th 32-byte word of `data`.
pub fn word(data: &[u8], index: usize) -> Result<&[u8], RawFailure> {
    let end = index
        .checked_add(1)
        .and_then(|words| words.checked_mul(WORD))
        .ok_or_else(|| decode_failure(format!("word index {index} out of range")))?;
    data.get(end - WORD..end).ok_or_else(|| {
        decode_failure(format!(
            "expected at least {end} bytes, got {}",
            data.len()
        ))
    })
}

/// Reads a `uint256` word that must fit in 128 bits.
pub fn word_to_u128(word: &[u8]) -> Result<u128, RawFailure> {
    if word.len() != WORD {
        return Err(decode_failure(format!("word has {} bytes", word.len())));
    }
    let (high, low) = word.split_at(16);
    if high.iter().any(|b| *b != 0) {
        return Err(decode_failure("uint256 value does not fit in 128 bits"));
    }
    let mut buf = [0u8; 16];
    buf.copy_from_slice(low);
    Ok(u128::from_be_bytes(buf))
}

/// Reads a `uint256` word that must fit in 64 bits.
pub fn word_to_u64(word: &[u8]) -> Result<u64, RawFailure> {
    let value = word_to_u128(word)?;
    u64::try_from(value).map_err(|_| decode_failure("uint256 value does not fit in 64 bits"))
}

/// Decodes an `Error(string)` revert payload. Anything else yields `None`.
pub fn decode_revert_reason(data: &str) -> Option<String> {
    let hex = strip_0x(data.trim());
    let payload = hex.strip_prefix(ERROR_STRING)?;
    let bytes = decode_hex(payload).ok()?;
    let offset = usize::try_from(word_to_u128(word(&bytes, 0).ok()?).ok()?).ok()?;
    // Offset and length come from the node; both may be arbitrarily large.
    let start = offset.checked_add(WORD)?;
    let length_word = bytes.get(offset..start)?;
    let length = usize::try_from(word_to_u128(length_word).ok()?).ok()?;
    let text = bytes.get(start..start.checked_add(length)?)?;
    String::from_utf8(text.to_vec()).ok()
}

/// Parses a JSON-RPC quantity (`0x`-prefixed hex, no leading zeros required).
pub fn parse_quantity(value: &str) -> Result<u64, RawFailure> {
    let hex = strip_0x(value.trim());
    if hex.is_empty() {
        return Err(decode_failure(format!("empty quantity: {value}")));
    }
    u64::from_str_radix(hex, 16).map_err(|_| decode_failure(format!("invalid quantity: {value}")))
}

pub fn format_quantity(value: u128) -> String {
    format!("0x{value:x}")
}
