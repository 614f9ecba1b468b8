// src/routes.rs

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::{audit::audit_admin_activity, auth::auth_guard},
};

/// Monta o router completo da API. Rotas públicas: registro, login, portal, health e o documento OpenAPI.
pub fn app_router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let public_routes = Router::new()
        .route("/pages", get(handlers::portal::list_published))
        .route("/pages/{slug}", get(handlers::portal::get_published))
        .route("/menu/{date}", get(handlers::portal::menu_for));

    let me_routes = Router::new().route("/me", get(handlers::auth::get_me));

    let accounts_routes = Router::new()
        .route("/roles", post(handlers::rbac::create_role))
        .route("/users/{user_id}/roles", post(handlers::rbac::assign_role))
        .route("/permissions", get(handlers::rbac::list_permissions));

    let catalog_routes = Router::new()
        .route(
            "/ingredients",
            post(handlers::catalog::create_ingredient).get(handlers::catalog::list_ingredients),
        )
        .route(
            "/ingredients/{id}",
            get(handlers::catalog::get_ingredient).patch(handlers::catalog::update_ingredient),
        )
        .route(
            "/dishes",
            post(handlers::catalog::create_dish).get(handlers::catalog::list_dishes),
        )
        .route("/dishes/{id}", get(handlers::catalog::get_dish))
        .route("/dishes/{id}/recipe", put(handlers::catalog::replace_recipe))
        .route("/menus", post(handlers::catalog::create_menu_day))
        .route("/menus/{date}", get(handlers::catalog::get_menu_day))
        .route("/menus/{date}/items", post(handlers::catalog::add_menu_item))
        .route("/menu-items/{id}", patch(handlers::catalog::update_menu_item));

    let inventory_routes = Router::new()
        .route(
            "/stock-items",
            post(handlers::inventory::create_stock_item).get(handlers::inventory::list_stock_items),
        )
        .route("/stock-items/low", get(handlers::inventory::low_stock))
        .route("/stock-items/{id}", get(handlers::inventory::get_stock_item))
        .route(
            "/stock-items/{id}/movements",
            get(handlers::inventory::list_movements).post(handlers::inventory::apply_movement),
        );

    let procurement_routes = Router::new()
        .route(
            "/suppliers",
            post(handlers::procurement::create_supplier).get(handlers::procurement::list_suppliers),
        )
        .route(
            "/orders",
            post(handlers::procurement::create_purchase_order)
                .get(handlers::procurement::list_purchase_orders),
        )
        .route("/orders/{id}", get(handlers::procurement::get_purchase_order))
        .route("/orders/{id}/submit", post(handlers::procurement::submit_purchase_order))
        .route("/orders/{id}/cancel", post(handlers::procurement::cancel_purchase_order))
        .route("/orders/{id}/receive", post(handlers::procurement::receive_purchase_order));

    let order_routes = Router::new()
        .route(
            "/",
            post(handlers::orders::create_order).get(handlers::orders::list_orders),
        )
        .route("/{id}", get(handlers::orders::get_order))
        .route("/{id}/confirm", post(handlers::orders::confirm_order))
        .route("/{id}/cancel", post(handlers::orders::cancel_order))
        .route("/{id}/payments", post(handlers::orders::register_payment))
        .route("/payments/{payment_id}/confirm", post(handlers::orders::confirm_payment));

    let production_routes = Router::new()
        .route(
            "/batches",
            post(handlers::production::create_batch).get(handlers::production::list_batches),
        )
        .route("/batches/{id}", get(handlers::production::get_batch))
        .route("/batches/{id}/requirements", get(handlers::production::batch_requirements))
        .route("/batches/{id}/complete", post(handlers::production::complete_batch))
        .route("/batches/{id}/cancel", post(handlers::production::cancel_batch));

    let finance_routes = Router::new()
        .route(
            "/bills",
            post(handlers::finance::create_bill).get(handlers::finance::list_bills),
        )
        .route("/bills/{id}/pay", post(handlers::finance::pay_bill))
        .route("/receivables", get(handlers::finance::list_receivables))
        .route("/receivables/{id}/settle", post(handlers::finance::settle_receivable))
        .route("/cash", get(handlers::finance::list_cash))
        .route("/cash/balance", get(handlers::finance::cash_balance))
        .route("/exports/cash.csv", get(handlers::finance::export_cash))
        .route("/exports/bills.csv", get(handlers::finance::export_bills))
        .route("/exports/receivables.csv", get(handlers::finance::export_receivables));

    let ocr_routes = Router::new()
        .route(
            "/labels",
            post(handlers::ocr::submit_label).get(handlers::ocr::list_labels),
        )
        .route("/labels/{id}", get(handlers::ocr::get_label))
        .route("/labels/{id}/apply", post(handlers::ocr::apply_label))
        .route("/labels/{id}/reject", post(handlers::ocr::reject_label));

    let portal_routes = Router::new()
        .route(
            "/pages",
            post(handlers::portal::create_page).get(handlers::portal::list_pages),
        )
        .route("/pages/{id}", patch(handlers::portal::update_page))
        .route("/pages/{id}/publish", post(handlers::portal::publish_page))
        .route("/pages/{id}/unpublish", post(handlers::portal::unpublish_page));

    let personal_finance_routes = Router::new()
        .route(
            "/categories",
            post(handlers::personal_finance::create_category)
                .get(handlers::personal_finance::list_categories),
        )
        .route(
            "/transactions",
            post(handlers::personal_finance::create_transaction)
                .get(handlers::personal_finance::list_transactions),
        )
        .route(
            "/transactions/{id}",
            delete(handlers::personal_finance::delete_transaction),
        )
        .route("/summary", get(handlers::personal_finance::month_summary))
        .route("/export.csv", get(handlers::personal_finance::export_transactions));

    let audit_routes = Router::new().route("/logs", get(handlers::audit::list_activity));

    // Tudo que exige token. A auditoria roda dentro do auth_guard (a última camada é a mais externa).
    // route_layer: caminhos inexistentes dão 404, não 401.
    let protected_routes = Router::new()
        .nest("/auth", me_routes)
        .nest("/accounts", accounts_routes)
        .nest("/catalog", catalog_routes)
        .nest("/inventory", inventory_routes)
        .nest("/procurement", procurement_routes)
        .nest("/orders", order_routes)
        .nest("/production", production_routes)
        .nest("/finance", finance_routes)
        .nest("/ocr", ocr_routes)
        .nest("/portal", portal_routes)
        .nest("/personal-finance", personal_finance_routes)
        .nest("/audit", audit_routes)
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            audit_admin_activity,
        ))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let api = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/auth", auth_routes)
        .nest("/public", public_routes)
        .merge(protected_routes);

    let cors = cors_layer(app_state.config.cors_allowed_origin.as_deref());

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT_LANGUAGE]);

    match allowed_origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin),
        Some(Err(e)) => {
            tracing::warn!("CORS_ALLOWED_ORIGIN inválida, liberando qualquer origem: {}", e);
            base.allow_origin(Any)
        }
        None => base.allow_origin(Any),
    }
}
