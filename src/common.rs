pub mod csv_export;
pub mod error;
pub mod i18n;
pub mod reference;
pub mod validation;
