pub mod audit;
pub mod auth;
pub mod catalog;
pub mod finance;
pub mod inventory;
pub mod ocr;
pub mod orders;
pub mod personal_finance;
pub mod portal;
pub mod procurement;
pub mod production;
pub mod rbac;
