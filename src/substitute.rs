//! # Variable Substitution
//!
//! Replaces `{{token}}` placeholders in text and image sources with values
//! from a [`DataContext`].
//!
//! ## Rules
//!
//! - Tokens are literal and case-sensitive: `{{employee_name}}` works,
//!   `{{Employee_Name}}` and `{{ employee_name }}` do not.
//! - A known token whose source value is missing becomes an empty string.
//! - An unknown token, or an unterminated `{{`, is left in the text as written.
//! - Substitution is a single left-to-right pass. Substituted values are
//!   never scanned again, so an employee named `{{company_name}}` prints as
//!   exactly that.
//!
//! Image sources go through the same pass and are then rejected if anything
//! token-like survives (see [`resolve_image_source`]).
//!
//! ## Tokens
//!
//! | Token | Value |
//! |-------|-------|
//! | `company_name` | Company name |
//! | `employee_name` | Employee name |
//! | `employee_id` | Employee id (`SF-0001`) |
//! | `employee_phone` | Phone number |
//! | `designation_name` | Designation |
//! | `department_name` | Department |
//! | `location_name` | Location |
//! | `id_valid_from_short` | Validity start, `d/m/yyyy` |
//! | `id_valid_until_short` | Validity end, `d/m/yyyy` |
//! | `logo_url` | Company logo URL |
//! | `employee_photo` | Employee photo URL |

use chrono::{Datelike, NaiveDate};

use crate::records::DataContext;

/// A recognized substitution token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    CompanyName,
    EmployeeName,
    EmployeeId,
    EmployeePhone,
    DesignationName,
    DepartmentName,
    LocationName,
    IdValidFromShort,
    IdValidUntilShort,
    LogoUrl,
    EmployeePhoto,
}

impl Token {
    pub const ALL: [Token; 11] = [
        Token::CompanyName,
        Token::EmployeeName,
        Token::EmployeeId,
        Token::EmployeePhone,
        Token::DesignationName,
        Token::DepartmentName,
        Token::LocationName,
        Token::IdValidFromShort,
        Token::IdValidUntilShort,
        Token::LogoUrl,
        Token::EmployeePhoto,
    ];

    /// Name between the braces.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CompanyName => "company_name",
            Self::EmployeeName => "employee_name",
            Self::EmployeeId => "employee_id",
            Self::EmployeePhone => "employee_phone",
            Self::DesignationName => "designation_name",
            Self::DepartmentName => "department_name",
            Self::LocationName => "location_name",
            Self::IdValidFromShort => "id_valid_from_short",
            Self::IdValidUntilShort => "id_valid_until_short",
            Self::LogoUrl => "logo_url",
            Self::EmployeePhoto => "employee_photo",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// The value this token stands for. Missing data resolves to `""`.
    pub fn resolve(&self, ctx: &DataContext) -> String {
        let employee = &ctx.employee;
        match self {
            Self::CompanyName => ctx.company.company_name.clone(),
            Self::EmployeeName => employee.name.clone(),
            Self::EmployeeId => employee.employee_id.clone(),
            Self::EmployeePhone => employee.phone.clone(),
            Self::DesignationName => employee.designation_name().to_string(),
            Self::DepartmentName => employee.department_name().to_string(),
            Self::LocationName => employee.location_name().to_string(),
            Self::IdValidFromShort => employee.id_card_valid_from.map(short_date).unwrap_or_default(),
            Self::IdValidUntilShort => employee.id_card_valid_until.map(short_date).unwrap_or_default(),
            Self::LogoUrl => ctx.company.logo_url.clone().unwrap_or_default(),
            Self::EmployeePhoto => employee.photo_url.clone().unwrap_or_default(),
        }
    }
}

/// Short date in the `en-IN` convention: day/month/year, no zero padding.
pub fn short_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.day(), date.month(), date.year())
}

/// Replace every known `{{token}}` in `text` in a single pass.
pub fn substitute(text: &str, ctx: &DataContext) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find("}}") else {
            // Unterminated: keep the remainder verbatim.
            out.push_str(&rest[start..]);
            return out;
        };

        let name = &after[..end];
        if name.contains("{{") {
            // `{{ ... {{token}}`: the first opener is literal, rescan from the second.
            out.push_str("{{");
            rest = after;
            continue;
        }

        match Token::parse(name) {
            Some(token) => out.push_str(&token.resolve(ctx)),
            None => {
                out.push_str("{{");
                out.push_str(name);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

/// Resolve an image element's source.
///
/// Returns `None` when the element should draw nothing: the source resolved
/// to an empty string, or still contains a `{{` / `}}` remnant (an unknown
/// token, a malformed token, or a missing value in a composite source).
pub fn resolve_image_source(source: &str, ctx: &DataContext) -> Option<String> {
    let resolved = substitute(source, ctx);
    let resolved = resolved.trim();
    if resolved.is_empty() || resolved.contains("{{") || resolved.contains("}}") {
        return None;
    }
    Some(resolved.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{CompanySettings, Employee, NamedRef};

    fn ctx() -> DataContext {
        let mut employee = Employee::new("SF-0001", "John Doe");
        employee.phone = "+91-9876543210".into();
        employee.designation = Some(NamedRef::new("Security Guard"));
        employee.department = Some(NamedRef::new("Security"));
        employee.location = Some(NamedRef::new("New Delhi Office"));
        employee.id_card_valid_from = NaiveDate::from_ymd_opt(2024, 1, 1);
        employee.id_card_valid_until = NaiveDate::from_ymd_opt(2026, 12, 31);
        employee.photo_url = Some("https://img.example.com/john.png".into());
        let company = CompanySettings {
            company_name: "SecureForce India".into(),
            logo_url: Some("https://img.example.com/logo.png".into()),
        };
        DataContext::new(employee, company)
    }

    #[test]
    fn test_name_and_id() {
        assert_eq!(
            substitute("{{employee_name}} ({{employee_id}})", &ctx()),
            "John Doe (SF-0001)"
        );
    }

    #[test]
    fn test_all_tokens() {
        let c = ctx();
        let cases = [
            ("{{company_name}}", "SecureForce India"),
            ("{{employee_phone}}", "+91-9876543210"),
            ("{{designation_name}}", "Security Guard"),
            ("{{department_name}}", "Security"),
            ("{{location_name}}", "New Delhi Office"),
            ("{{id_valid_from_short}}", "1/1/2024"),
            ("{{id_valid_until_short}}", "31/12/2026"),
            ("{{logo_url}}", "https://img.example.com/logo.png"),
            ("{{employee_photo}}", "https://img.example.com/john.png"),
        ];
        for (input, expected) in cases {
            assert_eq!(substitute(input, &c), expected, "{}", input);
        }
    }

    #[test]
    fn test_repeated_tokens_all_replaced() {
        assert_eq!(
            substitute("{{employee_id}}/{{employee_id}}", &ctx()),
            "SF-0001/SF-0001"
        );
    }

    #[test]
    fn test_missing_values_become_empty() {
        let c = DataContext::new(Employee::new("SF-0002", "Jane"), CompanySettings::default());
        assert_eq!(
            substitute("[{{designation_name}}|{{id_valid_until_short}}|{{company_name}}]", &c),
            "[||]"
        );
    }

    #[test]
    fn test_unknown_and_malformed_tokens_left_in_place() {
        let c = ctx();
        assert_eq!(substitute("Hi {{nickname}}!", &c), "Hi {{nickname}}!");
        assert_eq!(substitute("{{Employee_Name}}", &c), "{{Employee_Name}}");
        assert_eq!(substitute("open {{employee_name", &c), "open {{employee_name");
        assert_eq!(substitute("a }} b", &c), "a }} b");
        assert_eq!(substitute("{{ {{employee_id}}", &c), "{{ SF-0001");
    }

    #[test]
    fn test_single_pass_no_reinjection() {
        let mut c = ctx();
        c.employee.name = "{{company_name}}".into();
        assert_eq!(substitute("{{employee_name}}", &c), "{{company_name}}");
    }

    #[test]
    fn test_image_source_resolution() {
        let c = ctx();
        assert_eq!(
            resolve_image_source("{{employee_photo}}", &c).as_deref(),
            Some("https://img.example.com/john.png")
        );
        assert_eq!(
            resolve_image_source("https://cdn.example.com/seal.png", &c).as_deref(),
            Some("https://cdn.example.com/seal.png")
        );
    }

    #[test]
    fn test_image_source_missing_or_dangling() {
        let mut c = ctx();
        c.employee.photo_url = None;
        assert_eq!(resolve_image_source("{{employee_photo}}", &c), None);
        assert_eq!(resolve_image_source("", &c), None);
        assert_eq!(resolve_image_source("{{", &c), None);
        assert_eq!(resolve_image_source("}}", &c), None);
        assert_eq!(resolve_image_source("{{signature_url}}", &c), None);
    }
}
