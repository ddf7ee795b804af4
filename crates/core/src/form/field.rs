use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::wizard::Step;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddressField {
    Street,
    City,
    State,
    ZipCode,
    Country,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompanyField {
    CompanyName,
    Industry,
    CompanySize,
    Website,
    TaxId,
    Phone,
    Address(AddressField),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UserField {
    FirstName,
    LastName,
    Email,
    Password,
    ConfirmPassword,
    Role,
    Department,
    JobTitle,
    Phone,
}

/// Identifies the target of a form error.
///
/// Company and user phone numbers are distinct keys (`companyPhone`,
/// `userPhone`) so that clearing one step's errors can never touch the
/// other's.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Company(CompanyField),
    User(UserField),
    Terms,
    Submit,
}

impl AddressField {
    fn segment(self) -> &'static str {
        match self {
            Self::Street => "street",
            Self::City => "city",
            Self::State => "state",
            Self::ZipCode => "zipCode",
            Self::Country => "country",
        }
    }
}

impl CompanyField {
    fn segment(self) -> &'static str {
        match self {
            Self::CompanyName => "companyName",
            Self::Industry => "industry",
            Self::CompanySize => "companySize",
            Self::Website => "website",
            Self::TaxId => "taxId",
            Self::Phone => "companyPhone",
            Self::Address(_) => "address",
        }
    }
}

impl UserField {
    fn segment(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::Role => "role",
            Self::Department => "department",
            Self::JobTitle => "jobTitle",
            Self::Phone => "userPhone",
        }
    }
}

impl FieldKey {
    pub const fn address(field: AddressField) -> Self {
        Self::Company(CompanyField::Address(field))
    }

    /// Field path from the record root, one segment per nesting level.
    pub fn segments(&self) -> Vec<&'static str> {
        match self {
            Self::Company(CompanyField::Address(field)) => vec!["address", field.segment()],
            Self::Company(field) => vec![field.segment()],
            Self::User(field) => vec![field.segment()],
            Self::Terms => vec!["terms"],
            Self::Submit => vec!["submit"],
        }
    }

    /// The wizard step whose inputs this key belongs to. `Submit` belongs to
    /// no step.
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::Company(_) => Some(Step::Company),
            Self::User(_) => Some(Step::Account),
            Self::Terms => Some(Step::Review),
            Self::Submit => None,
        }
    }

    pub fn is_company(&self) -> bool {
        matches!(self, Self::Company(_))
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments().join("."))
    }
}

impl Serialize for FieldKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownFieldKey(pub String);

impl fmt::Display for UnknownFieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field key `{}`", self.0)
    }
}

impl std::error::Error for UnknownFieldKey {}

impl FromStr for FieldKey {
    type Err = UnknownFieldKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        use AddressField as A;
        use CompanyField as C;
        use UserField as U;

        let key = match value {
            "companyName" => Self::Company(C::CompanyName),
            "industry" => Self::Company(C::Industry),
            "companySize" => Self::Company(C::CompanySize),
            "website" => Self::Company(C::Website),
            "taxId" => Self::Company(C::TaxId),
            "companyPhone" => Self::Company(C::Phone),
            "address.street" => Self::address(A::Street),
            "address.city" => Self::address(A::City),
            "address.state" => Self::address(A::State),
            "address.zipCode" => Self::address(A::ZipCode),
            "address.country" => Self::address(A::Country),
            "firstName" => Self::User(U::FirstName),
            "lastName" => Self::User(U::LastName),
            "email" => Self::User(U::Email),
            "password" => Self::User(U::Password),
            "confirmPassword" => Self::User(U::ConfirmPassword),
            "role" => Self::User(U::Role),
            "department" => Self::User(U::Department),
            "jobTitle" => Self::User(U::JobTitle),
            "userPhone" => Self::User(U::Phone),
            "terms" => Self::Terms,
            "submit" => Self::Submit,
            other => return Err(UnknownFieldKey(other.to_string())),
        };
        Ok(key)
    }
}
