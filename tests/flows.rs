// tests/flows.rs
//
// Fluxos que dependem do banco: idempotência dos efeitos colaterais, atomicidade e auditoria.
// Cada teste recebe um banco novo com as migrações aplicadas.
//
// Rodar com: DATABASE_URL=postgres://... cargo test --test flows -- --ignored

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use backoffice::{
    common::{error::AppError, reference::Reference},
    config::{AppState, Config},
    models::{
        catalog::{MeasureUnit, NutritionFacts},
        finance::SettlementStatus,
        inventory::{MovementKind, NewStockMovement},
        orders::{OrderStatus, PaymentMethod},
        procurement::NewPurchaseLine,
        production::BatchStatus,
    },
    routes::app_router,
    services::{
        catalog_service::RecipeInput, order_service::OrderLineInput,
        production_service::BatchLineInput,
    },
};

const ADMIN_EMAIL: &str = "chef@cozinha.com";

fn test_config() -> Config {
    Config {
        database_url: "postgres://definido-pelo-sqlx-test".into(),
        jwt_secret: "segredo-de-teste-com-mais-de-32-bytes!!".into(),
        bind_addr: "127.0.0.1:0".into(),
        db_max_connections: 5,
        db_acquire_timeout: Duration::from_secs(5),
        jwt_ttl_hours: 1,
        audit_max_body_bytes: 64 * 1024,
        ocr_service_url: None,
        ocr_timeout: Duration::from_secs(1),
        cors_allowed_origin: None,
        admin_email: Some(ADMIN_EMAIL.into()),
    }
}

async fn app_state(pool: PgPool) -> AppState {
    let state = AppState::with_pool(test_config(), pool).unwrap();
    state.rbac_service.sync_permissions().await.unwrap();
    state
}

// Cadastra e devolve (id, token)
async fn register(state: &AppState, email: &str) -> (Uuid, String) {
    let auth = state
        .auth_service
        .register_user(email, "senha-forte-123", "Equipe")
        .await
        .unwrap();
    let user = state.auth_service.validate_token(&auth.token).await.unwrap();
    (user.id, auth.token)
}

async fn ingredient(state: &AppState, name: &str) -> Uuid {
    state
        .catalog_service
        .create_ingredient(name, MeasureUnit::Kg, NutritionFacts::default())
        .await
        .unwrap()
        .id
}

// Item de estoque do ingrediente com um saldo inicial
async fn stocked(state: &AppState, ingredient_id: Uuid, quantity: Decimal) -> Uuid {
    let item = state
        .inventory_service
        .create_stock_item(ingredient_id, Decimal::ZERO)
        .await
        .unwrap();
    state
        .inventory_service
        .apply_movement(movement(item.id, MovementKind::In, quantity), None)
        .await
        .unwrap();
    item.id
}

fn movement(stock_item_id: Uuid, kind: MovementKind, quantity: Decimal) -> NewStockMovement {
    NewStockMovement {
        stock_item_id,
        kind,
        quantity,
        reason: "Inventário".into(),
        unit_cost: None,
        created_by: None,
    }
}

async fn balance(state: &AppState, stock_item_id: Uuid) -> Decimal {
    state
        .inventory_service
        .get_stock_item(stock_item_id)
        .await
        .unwrap()
        .balance
}

fn menu_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "Requer PostgreSQL (DATABASE_URL)"]
async fn order_confirmation_and_payment_side_effects_happen_once(pool: PgPool) {
    let state = app_state(pool).await;
    let (staff, _) = register(&state, "balcao@cozinha.com").await;

    let flour = ingredient(&state, "Farinha").await;
    let dish = state
        .catalog_service
        .create_dish(
            "Lasanha",
            None,
            10,
            Decimal::new(3000, 2),
            vec![RecipeInput { ingredient_id: flour, quantity: Decimal::new(2, 0) }],
        )
        .await
        .unwrap();
    state.catalog_service.create_menu_day(menu_date(), None).await.unwrap();
    let menu_item = state
        .catalog_service
        .add_menu_item(menu_date(), dish.dish.id, None)
        .await
        .unwrap();

    let order = state
        .order_service
        .create_order(
            None,
            menu_date(),
            vec![OrderLineInput { menu_item_id: menu_item.id, quantity: 1 }],
            None,
            staff,
        )
        .await
        .unwrap();
    let order_id = order.order.id;
    assert_eq!(order.order.total_amount, Decimal::new(3000, 2));

    // Confirmar duas vezes não duplica a conta a receber
    state.order_service.confirm_order(order_id).await.unwrap();
    let confirmed = state.order_service.confirm_order(order_id).await.unwrap();
    assert_eq!(confirmed.order.status, OrderStatus::Confirmed);
    let receivables: Vec<_> = state
        .finance_service
        .list_receivables(None)
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.reference_id == order_id)
        .collect();
    assert_eq!(receivables.len(), 1);

    // A conta do pedido não pode ser baixada à mão: o dinheiro entra pelos pagamentos
    let err = state
        .finance_service
        .settle_receivable(receivables[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict("receivable_settled_by_payments")));

    let payment = state
        .order_service
        .register_payment(order_id, Decimal::new(3000, 2), PaymentMethod::Pix)
        .await
        .unwrap();
    state.order_service.confirm_payment(payment.id).await.unwrap();
    state.order_service.confirm_payment(payment.id).await.unwrap();

    let cash = state.finance_service.cash_balance().await.unwrap();
    assert_eq!(cash.total_in, Decimal::new(3000, 2));
    assert_eq!(state.finance_service.list_cash(None, None).await.unwrap().len(), 1);

    let paid = state.order_service.get_order(order_id).await.unwrap();
    assert_eq!(paid.order.status, OrderStatus::Paid);
    assert_eq!(paid.receivable.unwrap().status, SettlementStatus::Paid);

    // Pedido quitado não aceita novos pagamentos
    let err = state
        .order_service
        .register_payment(order_id, Decimal::ONE, PaymentMethod::Cash)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule("order_not_confirmed")));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "Requer PostgreSQL (DATABASE_URL)"]
async fn paying_a_bill_twice_posts_one_cash_out(pool: PgPool) {
    let state = app_state(pool).await;
    let bill = state
        .finance_service
        .create_manual_bill(None, "Conta de luz", Decimal::new(12000, 2), Utc::now().date_naive())
        .await
        .unwrap();

    let paid = state.finance_service.pay_bill(bill.id).await.unwrap();
    let again = state.finance_service.pay_bill(bill.id).await.unwrap();
    assert_eq!(paid.status, SettlementStatus::Paid);
    assert_eq!(again.paid_at, paid.paid_at);

    let cash = state.finance_service.cash_balance().await.unwrap();
    assert_eq!(cash.total_out, Decimal::new(12000, 2));
    assert_eq!(cash.balance, Decimal::new(-12000, 2));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "Requer PostgreSQL (DATABASE_URL)"]
async fn completing_a_batch_is_idempotent_and_atomic(pool: PgPool) {
    let state = app_state(pool).await;
    let (cook, _) = register(&state, "cozinha@cozinha.com").await;

    let flour = ingredient(&state, "Farinha").await;
    let tomato = ingredient(&state, "Tomate").await;
    let flour_stock = stocked(&state, flour, Decimal::new(3, 0)).await;
    let tomato_stock = stocked(&state, tomato, Decimal::new(10, 0)).await;

    // Receita para 10 porções: 2 kg de farinha e 1 kg de tomate
    let dish = state
        .catalog_service
        .create_dish(
            "Lasanha",
            None,
            10,
            Decimal::new(3000, 2),
            vec![
                RecipeInput { ingredient_id: flour, quantity: Decimal::new(2, 0) },
                RecipeInput { ingredient_id: tomato, quantity: Decimal::ONE },
            ],
        )
        .await
        .unwrap();
    let lines = || vec![BatchLineInput { dish_id: dish.dish.id, portions: 10 }];

    let batch = state
        .production_service
        .create_batch(menu_date(), None, lines())
        .await
        .unwrap();
    let done = state.production_service.complete_batch(batch.batch.id, cook).await.unwrap();
    assert_eq!(done.batch.status, BatchStatus::Done);

    // Segunda conclusão devolve o lote sem nova baixa
    let again = state.production_service.complete_batch(batch.batch.id, cook).await.unwrap();
    assert_eq!(again.batch.status, BatchStatus::Done);
    assert_eq!(again.batch.completed_at, done.batch.completed_at);
    assert_eq!(balance(&state, flour_stock).await, Decimal::ONE);
    assert_eq!(balance(&state, tomato_stock).await, Decimal::new(9, 0));
    assert_eq!(state.inventory_service.list_movements(flour_stock).await.unwrap().len(), 2);

    // Farinha insuficiente para o segundo lote: nada é baixado, nem o tomate
    let short = state
        .production_service
        .create_batch(menu_date(), None, lines())
        .await
        .unwrap();
    let err = state
        .production_service
        .complete_batch(short.batch.id, cook)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock { stock_item_id, .. } if stock_item_id == flour_stock));

    let still_planned = state.production_service.get_batch(short.batch.id).await.unwrap();
    assert_eq!(still_planned.batch.status, BatchStatus::Planned);
    assert_eq!(balance(&state, flour_stock).await, Decimal::ONE);
    assert_eq!(balance(&state, tomato_stock).await, Decimal::new(9, 0));
    assert_eq!(state.inventory_service.list_movements(tomato_stock).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "Requer PostgreSQL (DATABASE_URL)"]
async fn receiving_a_purchase_order_twice_changes_nothing(pool: PgPool) {
    let state = app_state(pool).await;
    let (buyer, _) = register(&state, "compras@cozinha.com").await;

    let flour = ingredient(&state, "Farinha").await;
    let supplier = state
        .procurement_service
        .create_supplier("Moinho Central", None, None)
        .await
        .unwrap();
    let order = state
        .procurement_service
        .create_order(
            supplier.id,
            None,
            None,
            vec![NewPurchaseLine {
                ingredient_id: flour,
                quantity: Decimal::new(25, 0),
                unit_cost: Decimal::new(490, 2),
            }],
        )
        .await
        .unwrap();
    let order_id = order.order.id;
    state.procurement_service.submit_order(order_id).await.unwrap();

    let received = state.procurement_service.receive_order(order_id, buyer).await.unwrap();
    let again = state.procurement_service.receive_order(order_id, buyer).await.unwrap();
    assert_eq!(received.bill_id, again.bill_id);

    let stock = state
        .inventory_service
        .list_stock_items()
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.ingredient_id == flour)
        .unwrap();
    assert_eq!(stock.balance, Decimal::new(25, 0));
    assert_eq!(state.inventory_service.list_movements(stock.id).await.unwrap().len(), 1);

    let bills = state.finance_service.list_bills(None).await.unwrap();
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0].amount, Decimal::new(12250, 2));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "Requer PostgreSQL (DATABASE_URL)"]
async fn stock_never_goes_negative_and_references_dedupe(pool: PgPool) {
    let state = app_state(pool).await;
    let salt = ingredient(&state, "Sal").await;
    let stock = stocked(&state, salt, Decimal::ONE).await;

    let err = state
        .inventory_service
        .apply_movement(movement(stock, MovementKind::Out, Decimal::new(2, 0)), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock { .. }));
    assert_eq!(balance(&state, stock).await, Decimal::ONE);

    let count = Reference::new("inventory_count", Uuid::new_v4());
    let first = state
        .inventory_service
        .apply_movement(movement(stock, MovementKind::In, Decimal::new(5, 0)), Some(count.clone()))
        .await
        .unwrap();
    let repeated = state
        .inventory_service
        .apply_movement(movement(stock, MovementKind::In, Decimal::new(5, 0)), Some(count))
        .await
        .unwrap();
    assert_eq!(first.id, repeated.id);
    assert_eq!(balance(&state, stock).await, Decimal::new(6, 0));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "Requer PostgreSQL (DATABASE_URL)"]
async fn admin_email_is_promoted_and_large_bodies_are_audited(pool: PgPool) {
    let state = app_state(pool.clone()).await;
    let (admin, token) = register(&state, ADMIN_EMAIL).await;
    let (customer, _) = register(&state, "cliente@exemplo.com").await;
    assert!(state.rbac_service.user_has_role(admin, "admin").await.unwrap());
    assert!(!state.rbac_service.user_has_role(customer, "admin").await.unwrap());

    // Rótulo colado com mais texto que o limite de auditoria
    let text = format!("Proteínas 4,2 g\n{}", "x".repeat(70 * 1024));
    let body = serde_json::json!({ "text": text }).to_string();
    let response = app_router(state.clone())
        .oneshot(
            Request::post("/api/v1/ocr/labels")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let label: serde_json::Value =
        serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(label["status"], "PENDING_REVIEW");

    let (status_code, truncated): (i32, Option<bool>) = sqlx::query_as(
        "SELECT status_code, (payload->>'truncated')::boolean FROM admin_activity_logs WHERE actor_id = $1",
    )
    .bind(admin)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(status_code, 201);
    assert_eq!(truncated, Some(true));

    // O log é somente inserção
    assert!(sqlx::query("DELETE FROM admin_activity_logs").execute(&pool).await.is_err());
}
