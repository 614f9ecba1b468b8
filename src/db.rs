pub mod audit_repo;
pub mod catalog_repo;
pub mod finance_repo;
pub mod inventory_repo;
pub mod ocr_repo;
pub mod orders_repo;
pub mod personal_finance_repo;
pub mod portal_repo;
pub mod procurement_repo;
pub mod production_repo;
pub mod rbac_repo;
pub mod user_repo;

pub use audit_repo::AuditRepository;
pub use catalog_repo::CatalogRepository;
pub use finance_repo::FinanceRepository;
pub use inventory_repo::InventoryRepository;
pub use ocr_repo::OcrRepository;
pub use orders_repo::OrdersRepository;
pub use personal_finance_repo::PersonalFinanceRepository;
pub use portal_repo::PortalRepository;
pub use procurement_repo::ProcurementRepository;
pub use production_repo::ProductionRepository;
pub use rbac_repo::RbacRepository;
pub use user_repo::UserRepository;
