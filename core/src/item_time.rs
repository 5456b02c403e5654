//! Composite item-time codec.
//!
//! An item time is a unix timestamp in milliseconds with an optional
//! disambiguation suffix (the "slot"). Its canonical text form is the
//! timestamp zero-padded to 13 digits, a `.`, and the slot zero-padded to
//! 5 digits: `1661564013555.00003`. Range queries against a feed take
//! canonical item times as their bounds.

use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

use crate::error::{ApiError, ApiResult};

/// Largest accepted timestamp component (13 digits).
pub const MAX_ITEM_TIME_MS: u64 = 9_999_999_999_999;

/// Largest accepted slot suffix (5 digits).
pub const MAX_ITEM_TIME_SLOT: u32 = 99_999;

/// A validated item time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemTime {
    base: u64,
    slot: u32,
}

impl ItemTime {
    pub fn new(base: u64, slot: u32) -> ApiResult<Self> {
        if base > MAX_ITEM_TIME_MS {
            return Err(ApiError::validation("item_time timestamp is out of range"));
        }
        if slot > MAX_ITEM_TIME_SLOT {
            return Err(ApiError::validation("item_time suffix is out of range"));
        }
        Ok(Self { base, slot })
    }

    /// Unix epoch milliseconds.
    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }
}

impl fmt::Display for ItemTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:013}.{:05}", self.base, self.slot)
    }
}

impl TryFrom<u64> for ItemTime {
    type Error = ApiError;

    fn try_from(ms: u64) -> ApiResult<Self> {
        Self::new(ms, 0)
    }
}

impl FromStr for ItemTime {
    type Err = ApiError;

    fn from_str(s: &str) -> ApiResult<Self> {
        let (base_part, slot_part) = match s.split_once('.') {
            Some((base, slot)) => (base, Some(slot)),
            None => (s, None),
        };

        let base = parse_part(s, base_part, "item_time timestamp is out of range")?;
        let slot = match slot_part {
            Some(part) => parse_part(s, part, "item_time suffix is out of range")?,
            None => 0,
        };

        // Anything past u32 is already out of the slot range.
        let slot = u32::try_from(slot).unwrap_or(u32::MAX);
        Self::new(base, slot)
    }
}

fn parse_part(input: &str, part: &str, overflow_message: &str) -> ApiResult<u64> {
    part.parse::<u64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => ApiError::validation(overflow_message),
        _ => ApiError::validation(format!("item_time is not a valid integer: {input:?}")),
    })
}

/// Validate an item time given as text or as an integer and return its
/// canonical form.
///
/// Accepts `1234`, `1661564013555`, `"1661564013555"` and
/// `"1661564013555.00003"`. Normalizing a canonical string returns it
/// unchanged.
pub fn normalize_item_time<T: fmt::Display>(item_time: T) -> ApiResult<String> {
    let parsed: ItemTime = item_time.to_string().parse()?;
    Ok(parsed.to_string())
}
