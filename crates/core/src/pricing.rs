//! Per-course and per-chapter pricing keyed by access duration.
//!
//! A price list maps a [`DurationKey`] (1, 3 or 10 months, or lifetime) to a
//! price in minor currency units. A lifetime price is always required; the
//! month-based tiers are optional. Chapters may override the course price
//! list to support buying a single chapter.

use std::collections::BTreeMap;

use chrono::Months;
use serde::{Deserialize, Serialize};

use crate::entitlement::AccessType;
use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Duration keys
// ---------------------------------------------------------------------------

/// Purchasable access duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DurationKey {
    #[serde(rename = "1")]
    OneMonth,
    #[serde(rename = "3")]
    ThreeMonths,
    #[serde(rename = "10")]
    TenMonths,
    #[serde(rename = "lifetime")]
    Lifetime,
}

impl DurationKey {
    /// Number of months granted, or `None` for lifetime access.
    pub fn months(&self) -> Option<u32> {
        match self {
            Self::OneMonth => Some(1),
            Self::ThreeMonths => Some(3),
            Self::TenMonths => Some(10),
            Self::Lifetime => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneMonth => "1",
            Self::ThreeMonths => "3",
            Self::TenMonths => "10",
            Self::Lifetime => "lifetime",
        }
    }
}

// ---------------------------------------------------------------------------
// Price lists
// ---------------------------------------------------------------------------

/// Price list keyed by duration, in minor currency units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pricing(pub BTreeMap<DurationKey, i64>);

impl Pricing {
    /// Price for `key`, if this list offers it.
    pub fn price_for(&self, key: DurationKey) -> Option<i64> {
        self.0.get(&key).copied()
    }
}

/// Validate a price list: lifetime must be present and no price may be negative.
pub fn validate_pricing(pricing: &Pricing) -> Result<(), CoreError> {
    if !pricing.0.contains_key(&DurationKey::Lifetime) {
        return Err(CoreError::Validation(
            "Pricing must include a 'lifetime' price".into(),
        ));
    }
    if let Some((key, price)) = pricing.0.iter().find(|(_, p)| **p < 0) {
        return Err(CoreError::Validation(format!(
            "Price for duration '{}' must not be negative (got {price})",
            key.as_str()
        )));
    }
    Ok(())
}

/// Pick the price list that applies: the chapter override when present,
/// otherwise the course-level list.
pub fn effective_pricing<'a>(
    course_pricing: Option<&'a Pricing>,
    chapter_pricing: Option<&'a Pricing>,
) -> Option<&'a Pricing> {
    chapter_pricing.or(course_pricing)
}

// ---------------------------------------------------------------------------
// Access windows
// ---------------------------------------------------------------------------

/// The grant produced by purchasing a given duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessWindow {
    pub access_type: AccessType,
    pub end_at: Option<Timestamp>,
}

/// Convert a purchased duration into an access type and expiry, starting at `now`.
pub fn access_window(key: DurationKey, now: Timestamp) -> Result<AccessWindow, CoreError> {
    match key.months() {
        None => Ok(AccessWindow {
            access_type: AccessType::Lifetime,
            end_at: None,
        }),
        Some(months) => {
            let end_at = now.checked_add_months(Months::new(months)).ok_or_else(|| {
                CoreError::Internal(format!("Access window of {months} months overflows"))
            })?;
            Ok(AccessWindow {
                access_type: AccessType::Temporary,
                end_at: Some(end_at),
            })
        }
    }
}
