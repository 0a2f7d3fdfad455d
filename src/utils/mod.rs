pub mod jwt;
pub mod password;
pub mod signature;
pub mod validate;

pub use validate::{ValidatedForm, ValidatedJson, ValidatedQuery};
