// Fabricated ledger identifiers: entity ids and pseudo transaction hashes.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::ledger::types::Fault;

const ID_SUFFIX_LEN: usize = 9;
const ID_SUFFIX_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TX_HASH_BYTES: usize = 32;

/// `<prefix>_<unix millis>_<9 base36 chars>`. Millis keep ids ordered by creation
/// time, the random tail separates calls landing in the same millisecond.
pub fn entity_id<R: Rng>(
    prefix: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<String, Fault> {
    let millis = u64::try_from(now.timestamp_millis()).map_err(|_| Fault::ClockBeforeEpoch(now))?;
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_SUFFIX_CHARSET[rng.gen_range(0..ID_SUFFIX_CHARSET.len())] as char)
        .collect();
    Ok(format!("{prefix}_{millis}_{suffix}"))
}

/// `0x` followed by 64 lowercase hex characters.
pub fn tx_hash<R: Rng>(rng: &mut R) -> String {
    let mut bytes = [0u8; TX_HASH_BYTES];
    rng.fill(&mut bytes[..]);
    format!("0x{}", hex::encode(bytes))
}

pub fn is_entity_id(prefix: &str, id: &str) -> bool {
    let mut parts = id.splitn(3, '_');
    let (Some(p), Some(ts), Some(tail)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    p == prefix
        && !ts.is_empty()
        && ts.bytes().all(|b| b.is_ascii_digit())
        && !tail.is_empty()
        && tail.bytes().all(|b| b.is_ascii_alphanumeric())
}

pub fn is_tx_hash(hash: &str) -> bool {
    match hash.strip_prefix("0x") {
        Some(hex) => hex.len() == TX_HASH_BYTES * 2 && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}
