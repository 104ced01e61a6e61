//! Usage Counter Model
//!
//! Free-tier consumption ledger: one row per (identity, UTC day).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::normalize_email;

/// Free uses per identity per day
pub const DEFAULT_FREE_DAILY_LIMIT: i32 = 3;

/// Usage counter row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct UsageCounter {
    pub identity: String,
    pub day: NaiveDate,
    pub count: i32,
    pub updated_at: DateTime<Utc>,
}

/// Quota accounting key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    Email(String),
    Ip(String),
    Unknown,
}

impl Identity {
    /// Email when known, else the first address of an `X-Forwarded-For`
    /// chain, else `Unknown`.
    pub fn resolve(email: Option<&str>, forwarded_for: Option<&str>) -> Self {
        if let Some(email) = email.and_then(normalize_email) {
            return Self::Email(email);
        }
        forwarded_for
            .and_then(|chain| chain.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(|ip| Self::Ip(ip.to_owned()))
            .unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(email) => write!(f, "email:{email}"),
            Self::Ip(ip) => write!(f, "ip:{ip}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Outcome of an accepted usage increment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaUsage {
    /// Count after this increment
    pub count: i32,
    pub limit: i32,
}

impl QuotaUsage {
    pub fn remaining(&self) -> i32 {
        (self.limit - self.count).max(0)
    }
}
