//! # Input Records
//!
//! The data a card is rendered from: an employee record with its resolved
//! department, designation and location names, plus the company settings.
//! Both come from the surrounding application; the renderer only reads them.
//!
//! Field names follow the upstream store (`snake_case`), so records fetched
//! as JSON deserialize directly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Employment status as stored upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    #[default]
    Active,
    Inactive,
    Terminated,
}

/// A joined relation reduced to its display name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub name: String,
}

impl NamedRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Accepts `"2024-01-31"` or a full RFC 3339 timestamp (`"2024-01-31T00:00:00Z"`).
fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => {
            let day = s.get(..10).unwrap_or(s);
            NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map(Some)
                .map_err(|e| serde::de::Error::custom(format!("invalid date '{}': {}", s, e)))
        }
    }
}

/// An employee record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Employee {
    /// Opaque identifier, conventionally `SF-XXXX`.
    pub employee_id: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub status: EmploymentStatus,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub id_card_valid_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub id_card_valid_until: Option<NaiveDate>,
    #[serde(default)]
    pub department: Option<NamedRef>,
    #[serde(default)]
    pub designation: Option<NamedRef>,
    #[serde(default)]
    pub location: Option<NamedRef>,
}

impl Employee {
    pub fn new(employee_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn department_name(&self) -> &str {
        self.department.as_ref().map(|d| d.name.as_str()).unwrap_or("")
    }

    pub fn designation_name(&self) -> &str {
        self.designation.as_ref().map(|d| d.name.as_str()).unwrap_or("")
    }

    pub fn location_name(&self) -> &str {
        self.location.as_ref().map(|d| d.name.as_str()).unwrap_or("")
    }
}

/// Company-wide settings shown on every card.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompanySettings {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl CompanySettings {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            logo_url: None,
        }
    }
}

/// Everything substitution can read for one card.
///
/// Built per render request and treated as an immutable snapshot for the
/// duration of one render pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataContext {
    pub employee: Employee,
    #[serde(default)]
    pub company: CompanySettings,
}

impl DataContext {
    pub fn new(employee: Employee, company: CompanySettings) -> Self {
        Self { employee, company }
    }
}
