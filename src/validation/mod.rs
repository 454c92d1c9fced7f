//! Pure field validators for the fan form.

pub mod name;
pub mod tax_id;

pub use name::validate_name;
pub use tax_id::{validate_tax_id, TaxId};
