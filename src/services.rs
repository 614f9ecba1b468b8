pub mod auth;
pub mod catalog_service;
pub mod finance_service;
pub mod inventory_service;
pub mod nutrition_parser;
pub mod ocr_service;
pub mod order_service;
pub mod personal_finance_service;
pub mod portal_service;
pub mod procurement_service;
pub mod production_service;
pub mod rbac_service;
