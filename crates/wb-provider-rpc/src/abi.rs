//! Minimal ABI codec for the three ERC20 view calls the bridge issues.

use alloy_primitives::{U256, hex};
use wb_types::WalletAddress;

pub(crate) const SYMBOL: [u8; 4] = [0x95, 0xd8, 0x9b, 0x41];
pub(crate) const DECIMALS: [u8; 4] = [0x31, 0x3c, 0xe5, 0x67];
pub(crate) const BALANCE_OF: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

const WORD: usize = 32;

pub(crate) fn encode_call(selector: [u8; 4]) -> String {
    hex::encode_prefixed(selector)
}

pub(crate) fn encode_balance_of(holder: &WalletAddress) -> String {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&BALANCE_OF);
    data.extend_from_slice(&[0_u8; 12]);
    data.extend_from_slice(holder.as_address().as_slice());
    hex::encode_prefixed(data)
}

pub(crate) fn decode_hex(raw: &str) -> Result<Vec<u8>, String> {
    hex::decode(raw.trim()).map_err(|err| format!("invalid hex in call result: {err}"))
}

pub(crate) fn decode_uint(data: &[u8]) -> Result<U256, String> {
    if data.len() < WORD {
        return Err(format!("expected a 32-byte word, got {} bytes", data.len()));
    }
    Ok(U256::from_be_slice(&data[..WORD]))
}

pub(crate) fn decode_u8(data: &[u8]) -> Result<u8, String> {
    let value = decode_uint(data)?;
    u8::try_from(value).map_err(|_| format!("decimals out of range: {value}"))
}

/// Decodes a `string` return value. Tokens that predate the standard return
/// a right-padded `bytes32` instead; that form is accepted too.
pub(crate) fn decode_string(data: &[u8]) -> Result<String, String> {
    if data.len() == WORD {
        let end = data.iter().position(|b| *b == 0).unwrap_or(WORD);
        return String::from_utf8(data[..end].to_vec()).map_err(|err| err.to_string());
    }

    let offset = word_as_usize(data, 0)?;
    let length = word_as_usize(data, offset)?;
    let start = offset
        .checked_add(WORD)
        .ok_or_else(|| "string offset overflow".to_owned())?;
    let end = start
        .checked_add(length)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| "string length exceeds return data".to_owned())?;

    String::from_utf8(data[start..end].to_vec()).map_err(|err| err.to_string())
}

fn word_as_usize(data: &[u8], at: usize) -> Result<usize, String> {
    let word = data
        .get(at..at.saturating_add(WORD))
        .filter(|word| word.len() == WORD)
        .ok_or_else(|| format!("return data too short for word at {at}"))?;
    usize::try_from(U256::from_be_slice(word)).map_err(|_| "word does not fit in usize".to_owned())
}
