//! Field-level validation for the registration form.
//!
//! Every function is pure: it reads a snapshot and returns the errors it
//! found. An empty [`FormErrors`] means the snapshot passes.

use std::sync::OnceLock;

use regex::Regex;
use secrecy::ExposeSecret;

use crate::domain::company::CompanyInfo;
use crate::domain::registration::RegistrationData;
use crate::domain::user::UserInfo;
use crate::form::{AddressField, CompanyField, FieldKey, FormErrors, UserField};

pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_SYMBOLS: &str = "@$!%*?&";

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

pub fn validate_company_info(info: &CompanyInfo) -> FormErrors {
    use AddressField as A;
    use CompanyField as C;

    let mut errors = FormErrors::new();
    let required = [
        (FieldKey::Company(C::CompanyName), &info.company_name, "Company name is required"),
        (FieldKey::Company(C::Industry), &info.industry, "Industry is required"),
        (FieldKey::Company(C::CompanySize), &info.company_size, "Company size is required"),
        (FieldKey::Company(C::TaxId), &info.tax_id, "Tax ID is required"),
        (FieldKey::Company(C::Phone), &info.phone, "Phone number is required"),
        (FieldKey::address(A::Street), &info.address.street, "Street address is required"),
        (FieldKey::address(A::City), &info.address.city, "City is required"),
        (FieldKey::address(A::State), &info.address.state, "State/Province is required"),
        (FieldKey::address(A::ZipCode), &info.address.zip_code, "ZIP/Postal code is required"),
        (FieldKey::address(A::Country), &info.address.country, "Country is required"),
    ];

    for (key, value, message) in required {
        if is_blank(value) {
            errors.insert(key, message);
        }
    }

    errors
}

pub fn validate_user_info(info: &UserInfo) -> FormErrors {
    use UserField as U;

    let mut errors = FormErrors::new();

    if is_blank(&info.first_name) {
        errors.insert(FieldKey::User(U::FirstName), "First name is required");
    }
    if is_blank(&info.last_name) {
        errors.insert(FieldKey::User(U::LastName), "Last name is required");
    }

    if is_blank(&info.email) {
        errors.insert(FieldKey::User(U::Email), "Email is required");
    } else if !is_valid_email(&info.email) {
        errors.insert(FieldKey::User(U::Email), "Please enter a valid email address");
    }

    let password = info.password.expose_secret();
    if password.is_empty() {
        errors.insert(FieldKey::User(U::Password), "Password is required");
    } else if !is_strong_password(password) {
        errors.insert(FieldKey::User(U::Password), "Password must meet the requirements above");
    }

    if info.confirm_password.expose_secret().is_empty() {
        errors.insert(FieldKey::User(U::ConfirmPassword), "Please confirm your password");
    } else if !info.passwords_match() {
        errors.insert(FieldKey::User(U::ConfirmPassword), "Passwords do not match");
    }

    if info.role.is_none() {
        errors.insert(FieldKey::User(U::Role), "Role is required");
    }
    if is_blank(&info.department) {
        errors.insert(FieldKey::User(U::Department), "Department is required");
    }
    if is_blank(&info.job_title) {
        errors.insert(FieldKey::User(U::JobTitle), "Job title is required");
    }
    if is_blank(&info.phone) {
        errors.insert(FieldKey::User(U::Phone), "Phone number is required");
    }

    errors
}

/// Company errors, overlaid by user errors, plus `terms` when the terms
/// were not accepted. Documents are not validated.
pub fn validate_registration(data: &RegistrationData) -> FormErrors {
    let mut errors = validate_company_info(&data.company_info);
    errors.merge(validate_user_info(&data.user_info));

    if !data.terms_accepted {
        errors.insert(FieldKey::Terms, "You must accept the terms and conditions");
    }

    errors
}

/// `local@domain.tld` shape only; no further RFC checks.
pub fn is_valid_email(value: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(EMAIL_PATTERN).ok())
        .as_ref()
        .map(|pattern| pattern.is_match(value))
        .unwrap_or(false)
}

/// At least eight characters drawn from letters, digits and
/// [`PASSWORD_SYMBOLS`], with at least one of each class and one of each
/// letter case.
pub fn is_strong_password(value: &str) -> bool {
    let allowed =
        |ch: char| ch.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(ch);

    value.chars().count() >= PASSWORD_MIN_LENGTH
        && value.chars().all(allowed)
        && value.chars().any(|ch| ch.is_ascii_lowercase())
        && value.chars().any(|ch| ch.is_ascii_uppercase())
        && value.chars().any(|ch| ch.is_ascii_digit())
        && value.chars().any(|ch| PASSWORD_SYMBOLS.contains(ch))
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
