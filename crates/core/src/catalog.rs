//! Option lists offered by the registration form's select inputs.
//!
//! Validation only checks that something was picked; these lists are for
//! rendering and for reporting friendly labels.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

const fn option(value: &'static str, label: &'static str) -> SelectOption {
    SelectOption { value, label }
}

pub const INDUSTRIES: [SelectOption; 8] = [
    option("technology", "Technology"),
    option("healthcare", "Healthcare"),
    option("finance", "Finance"),
    option("manufacturing", "Manufacturing"),
    option("retail", "Retail"),
    option("education", "Education"),
    option("consulting", "Consulting"),
    option("other", "Other"),
];

pub const COMPANY_SIZES: [SelectOption; 6] = [
    option("1-10", "1-10 employees"),
    option("11-50", "11-50 employees"),
    option("51-200", "51-200 employees"),
    option("201-500", "201-500 employees"),
    option("501-1000", "501-1000 employees"),
    option("1000+", "1000+ employees"),
];

pub const COUNTRIES: [SelectOption; 8] = [
    option("US", "United States"),
    option("CA", "Canada"),
    option("UK", "United Kingdom"),
    option("DE", "Germany"),
    option("FR", "France"),
    option("AU", "Australia"),
    option("JP", "Japan"),
    option("other", "Other"),
];

pub const ROLES: [SelectOption; 3] = [
    option("admin", "Administrator"),
    option("manager", "Manager"),
    option("employee", "Employee"),
];

pub const DEPARTMENTS: [SelectOption; 7] = [
    option("it", "Information Technology"),
    option("hr", "Human Resources"),
    option("finance", "Finance"),
    option("marketing", "Marketing"),
    option("sales", "Sales"),
    option("operations", "Operations"),
    option("other", "Other"),
];

/// Label for `value`, falling back to the raw value for off-catalog input.
pub fn label_for<'a>(options: &[SelectOption], value: &'a str) -> &'a str {
    options.iter().find(|option| option.value == value).map(|option| option.label).unwrap_or(value)
}
