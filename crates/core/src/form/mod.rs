pub mod errors;
pub mod field;

pub use errors::FormErrors;
pub use field::{AddressField, CompanyField, FieldKey, UnknownFieldKey, UserField};
