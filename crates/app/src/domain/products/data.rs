//! Products Data

use jiff::Timestamp;
use rand::seq::SliceRandom;

use crate::{
    domain::{
        categories::records::CategoryUuid,
        products::state::QrStatus,
        users::{
            records::RewardEntry,
            validation::{self, ValidationError},
        },
    },
    media::MediaUpload,
};

/// Prefix of generated product codes.
pub const PRODUCT_CODE_PREFIX: &str = "PRD-";

const PRODUCT_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const PRODUCT_CODE_RANDOM_CHARS: usize = 8;

const PRODUCT_CODE_MAX_CHARS: usize = 32;

/// New Product Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    /// Admin-chosen code; one is generated when absent.
    pub product_code: Option<String>,
    pub name: String,
    pub category: Option<CategoryUuid>,
    pub coin_reward: u64,
    pub image: Option<MediaUpload>,
}

/// Product Update Data. Absent fields are left unchanged.
///
/// The product code and QR state are not editable here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductUpdate {
    pub name: Option<String>,

    /// `Some(None)` removes the product from its category.
    pub category: Option<Option<CategoryUuid>>,
    pub coin_reward: Option<u64>,
    pub image: Option<MediaUpload>,
}

/// Admin listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub status: Option<QrStatus>,
    pub category: Option<CategoryUuid>,
}

/// Result of a successful scan request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedemptionOutcome {
    /// The code was consumed and the user credited.
    Redeemed { entry: RewardEntry, coins_earned: u64 },

    /// Someone already consumed the code; nothing was credited.
    AlreadyUsed {
        redeemed_by: Option<String>,
        redeemed_at: Timestamp,
    },
}

/// Generate a fresh `PRD-XXXXXXXX` code.
#[must_use]
pub fn generate_product_code() -> String {
    let mut rng = rand::thread_rng();

    let suffix: String = (0..PRODUCT_CODE_RANDOM_CHARS)
        .filter_map(|_| PRODUCT_CODE_CHARSET.choose(&mut rng).map(|&b| char::from(b)))
        .collect();

    format!("{PRODUCT_CODE_PREFIX}{suffix}")
}

/// Trim and upper-case an admin-supplied code, checking its alphabet.
///
/// # Errors
///
/// Returns an error for empty or over-long codes, or characters other than
/// letters, digits, `-` and `_`.
pub fn normalize_product_code(code: &str) -> Result<String, ValidationError> {
    let code = code.trim().to_ascii_uppercase();

    validation::required("productCode", &code)?;

    if code.len() > PRODUCT_CODE_MAX_CHARS
        || !code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_'))
    {
        return Err(ValidationError::new(
            "productCode",
            "must be up to 32 letters, digits, '-' or '_'",
        ));
    }

    Ok(code)
}

/// Check a coin reward fits the stored column.
///
/// # Errors
///
/// Returns an error for rewards above `i64::MAX`.
pub fn check_coin_reward(coin_reward: u64) -> Result<u64, ValidationError> {
    if i64::try_from(coin_reward).is_err() {
        return Err(ValidationError::new("coinReward", "is too large"));
    }

    Ok(coin_reward)
}
