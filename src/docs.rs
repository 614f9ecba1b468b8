// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        handlers::health::health,

        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- RBAC ---
        handlers::rbac::create_role,
        handlers::rbac::assign_role,
        handlers::rbac::list_permissions,

        // --- Catalog ---
        handlers::catalog::create_ingredient,
        handlers::catalog::list_ingredients,
        handlers::catalog::get_ingredient,
        handlers::catalog::update_ingredient,
        handlers::catalog::create_dish,
        handlers::catalog::list_dishes,
        handlers::catalog::get_dish,
        handlers::catalog::replace_recipe,
        handlers::catalog::create_menu_day,
        handlers::catalog::get_menu_day,
        handlers::catalog::add_menu_item,
        handlers::catalog::update_menu_item,

        // --- Inventory ---
        handlers::inventory::create_stock_item,
        handlers::inventory::list_stock_items,
        handlers::inventory::low_stock,
        handlers::inventory::get_stock_item,
        handlers::inventory::list_movements,
        handlers::inventory::apply_movement,

        // --- Procurement ---
        handlers::procurement::create_supplier,
        handlers::procurement::list_suppliers,
        handlers::procurement::create_purchase_order,
        handlers::procurement::list_purchase_orders,
        handlers::procurement::get_purchase_order,
        handlers::procurement::submit_purchase_order,
        handlers::procurement::cancel_purchase_order,
        handlers::procurement::receive_purchase_order,

        // --- Orders ---
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::confirm_order,
        handlers::orders::cancel_order,
        handlers::orders::register_payment,
        handlers::orders::confirm_payment,

        // --- Production ---
        handlers::production::create_batch,
        handlers::production::list_batches,
        handlers::production::get_batch,
        handlers::production::batch_requirements,
        handlers::production::complete_batch,
        handlers::production::cancel_batch,

        // --- Finance ---
        handlers::finance::create_bill,
        handlers::finance::list_bills,
        handlers::finance::pay_bill,
        handlers::finance::list_receivables,
        handlers::finance::settle_receivable,
        handlers::finance::list_cash,
        handlers::finance::cash_balance,
        handlers::finance::export_cash,
        handlers::finance::export_bills,
        handlers::finance::export_receivables,

        // --- OCR ---
        handlers::ocr::submit_label,
        handlers::ocr::list_labels,
        handlers::ocr::get_label,
        handlers::ocr::apply_label,
        handlers::ocr::reject_label,

        // --- Portal ---
        handlers::portal::create_page,
        handlers::portal::list_pages,
        handlers::portal::update_page,
        handlers::portal::publish_page,
        handlers::portal::unpublish_page,
        handlers::portal::list_published,
        handlers::portal::get_published,
        handlers::portal::menu_for,

        // --- Personal Finance ---
        handlers::personal_finance::create_category,
        handlers::personal_finance::list_categories,
        handlers::personal_finance::create_transaction,
        handlers::personal_finance::list_transactions,
        handlers::personal_finance::delete_transaction,
        handlers::personal_finance::month_summary,
        handlers::personal_finance::export_transactions,

        // --- Audit ---
        handlers::audit::list_activity,
    ),
    components(
        schemas(
            handlers::health::HealthResponse,

            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::MeResponse,

            // --- RBAC ---
            models::rbac::Role,
            models::rbac::Permission,
            models::rbac::CreateRolePayload,
            models::rbac::AssignRolePayload,
            models::rbac::RoleResponse,

            // --- Catalog ---
            models::catalog::MeasureUnit,
            models::catalog::Ingredient,
            models::catalog::NutritionFacts,
            models::catalog::Dish,
            models::catalog::RecipeLine,
            models::catalog::DishDetail,
            models::catalog::MenuDay,
            models::catalog::MenuItem,
            models::catalog::MenuItemView,
            models::catalog::MenuDayDetail,
            handlers::catalog::CreateIngredientPayload,
            handlers::catalog::UpdateIngredientPayload,
            handlers::catalog::RecipeLinePayload,
            handlers::catalog::CreateDishPayload,
            handlers::catalog::ReplaceRecipePayload,
            handlers::catalog::CreateMenuDayPayload,
            handlers::catalog::AddMenuItemPayload,
            handlers::catalog::UpdateMenuItemPayload,

            // --- Inventory ---
            models::inventory::MovementKind,
            models::inventory::StockItem,
            models::inventory::StockItemView,
            models::inventory::StockMovement,
            handlers::inventory::CreateStockItemPayload,
            handlers::inventory::ReferencePayload,
            handlers::inventory::ApplyMovementPayload,

            // --- Procurement ---
            models::procurement::PurchaseStatus,
            models::procurement::Supplier,
            models::procurement::PurchaseOrder,
            models::procurement::PurchaseOrderItem,
            models::procurement::PurchaseOrderDetail,
            handlers::procurement::CreateSupplierPayload,
            handlers::procurement::PurchaseLinePayload,
            handlers::procurement::CreatePurchaseOrderPayload,

            // --- Orders ---
            models::orders::OrderStatus,
            models::orders::PaymentMethod,
            models::orders::PaymentStatus,
            models::orders::Order,
            models::orders::OrderItem,
            models::orders::Payment,
            models::orders::OrderDetail,
            handlers::orders::OrderLinePayload,
            handlers::orders::CreateOrderPayload,
            handlers::orders::RegisterPaymentPayload,

            // --- Production ---
            models::production::BatchStatus,
            models::production::ProductionBatch,
            models::production::ProductionBatchItem,
            models::production::IngredientRequirement,
            models::production::ProductionBatchDetail,
            handlers::production::BatchLinePayload,
            handlers::production::CreateBatchPayload,

            // --- Finance ---
            models::finance::SettlementStatus,
            models::finance::CashDirection,
            models::finance::ApBill,
            models::finance::ArReceivable,
            models::finance::CashMovement,
            models::finance::CashBalance,
            handlers::finance::CreateBillPayload,

            // --- OCR ---
            models::ocr::LabelSource,
            models::ocr::LabelStatus,
            models::ocr::ParsedNutrition,
            models::ocr::NutritionLabel,
            handlers::ocr::SubmitLabelPayload,
            handlers::ocr::ApplyLabelPayload,

            // --- Portal ---
            models::portal::PortalPage,
            models::portal::PublishedPage,
            handlers::portal::CreatePagePayload,
            handlers::portal::UpdatePagePayload,

            // --- Personal Finance ---
            models::personal_finance::EntryKind,
            models::personal_finance::PfCategory,
            models::personal_finance::PfTransaction,
            models::personal_finance::CategoryTotal,
            models::personal_finance::MonthSummary,
            handlers::personal_finance::CreateCategoryPayload,
            handlers::personal_finance::CreateTransactionPayload,

            // --- Audit ---
            models::audit::AdminActivityLog,
        )
    ),
    tags(
        (name = "Health", description = "Estado da aplicação"),
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "RBAC", description = "Controle de Acesso (Cargos e Permissões)"),
        (name = "Catalog", description = "Ingredientes, Pratos e Cardápio do Dia"),
        (name = "Inventory", description = "Saldos e Movimentações de Estoque"),
        (name = "Procurement", description = "Fornecedores e Pedidos de Compra"),
        (name = "Orders", description = "Pedidos de Clientes e Pagamentos"),
        (name = "Production", description = "Lotes de Produção"),
        (name = "Finance", description = "Contas a Pagar, a Receber e Caixa"),
        (name = "OCR", description = "Leitura de Rótulos Nutricionais"),
        (name = "Portal", description = "Páginas do Portal"),
        (name = "Public", description = "Portal Público (sem autenticação)"),
        (name = "Personal Finance", description = "Finanças Pessoais do Usuário"),
        (name = "Audit", description = "Log de Atividade Administrativa")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_protected_path_declares_bearer_security() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();
        let paths = json["paths"].as_object().unwrap();

        assert!(paths.contains_key("/api/v1/orders/{id}/confirm"));
        assert!(paths.contains_key("/api/v1/public/menu/{date}"));

        let login = &paths["/api/v1/auth/login"]["post"];
        assert!(login.get("security").is_none());
        let pay = &paths["/api/v1/finance/bills/{id}/pay"]["post"];
        assert!(pay["security"][0].get("api_jwt").is_some());
    }
}
