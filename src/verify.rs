//! # Verification
//!
//! Every card carries a QR code pointing at the employee's verification page:
//! `{base_url}/verify/{employee_id}`. The page itself lives in the
//! surrounding application; this module owns the URL format, the status a
//! verifier should display, and the employee-id sequence the URL relies on.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_BASE_URL;
use crate::records::{Employee, EmploymentStatus};

/// Prefix of issued employee ids.
pub const EMPLOYEE_ID_PREFIX: &str = "SF-";

/// Build the verification URL for an employee.
///
/// An empty `base_url` falls back to [`DEFAULT_BASE_URL`]. Trailing slashes
/// on the base are dropped so the path never doubles up.
///
/// ```
/// use lanyard::verify::verification_url;
///
/// assert_eq!(
///     verification_url("SF-0042", "https://example.com"),
///     "https://example.com/verify/SF-0042"
/// );
/// ```
pub fn verification_url(employee_id: &str, base_url: &str) -> String {
    let base = base_url.trim();
    let base = if base.is_empty() { DEFAULT_BASE_URL } else { base };
    format!("{}/verify/{}", base.trim_end_matches('/'), employee_id)
}

/// What a verifier sees after scanning a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Active employee with a card valid through today.
    Valid,
    /// Card validity ended before today.
    Expired,
    /// Employee is not active.
    Inactive,
    /// Anything else (active, but no validity date on record).
    Invalid,
}

impl VerificationStatus {
    /// Evaluate an employee's card on `today`.
    ///
    /// Checks run in order: valid, expired, inactive, invalid. An expired
    /// card on an inactive employee reports `Expired`.
    pub fn evaluate(employee: &Employee, today: NaiveDate) -> Self {
        let active = employee.status == EmploymentStatus::Active;
        match employee.id_card_valid_until {
            Some(until) if active && until >= today => Self::Valid,
            Some(until) if until < today => Self::Expired,
            _ if !active => Self::Inactive,
            _ => Self::Invalid,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Expired => "expired",
            Self::Inactive => "inactive",
            Self::Invalid => "invalid",
        }
    }
}

/// Next id in the `SF-XXXX` sequence after `last`.
///
/// `None`, or an id that does not match `SF-<digits>`, restarts at `SF-0001`.
/// Numbers past 9999 keep growing (`SF-10000`).
pub fn next_employee_id(last: Option<&str>) -> String {
    let next = last
        .and_then(|id| id.trim().strip_prefix(EMPLOYEE_ID_PREFIX))
        .filter(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
        .and_then(|digits| digits.parse::<u64>().ok())
        .map(|n| n + 1)
        .unwrap_or(1);
    format!("{}{:04}", EMPLOYEE_ID_PREFIX, next)
}
