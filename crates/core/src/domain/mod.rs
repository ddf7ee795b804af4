pub mod company;
pub mod document;
pub mod profile;
pub mod registration;
pub mod user;
