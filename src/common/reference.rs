// src/common/reference.rs

use std::fmt;

use uuid::Uuid;

/// Chave natural `(reference_type, reference_id)` dos efeitos colaterais idempotentes:
/// títulos financeiros, movimentos de caixa e movimentações de estoque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub kind: String,
    pub id: Uuid,
}

pub const ORDER: &str = "order";
pub const PAYMENT: &str = "payment";
pub const PURCHASE_ORDER: &str = "purchase_order";
pub const PURCHASE_ORDER_ITEM: &str = "purchase_order_item";
pub const PRODUCTION_BATCH: &str = "production_batch";
pub const AP_BILL: &str = "ap_bill";
pub const AR_RECEIVABLE: &str = "ar_receivable";
pub const MANUAL: &str = "manual";

// Tipos gerados pelo próprio sistema; não podem vir de uma movimentação manual
const SYSTEM_KINDS: [&str; 8] = [
    ORDER,
    PAYMENT,
    PURCHASE_ORDER,
    PURCHASE_ORDER_ITEM,
    PRODUCTION_BATCH,
    AP_BILL,
    AR_RECEIVABLE,
    MANUAL,
];

/// Comparação sem diferenciar maiúsculas e ignorando espaços nas pontas.
pub fn is_system_kind(kind: &str) -> bool {
    let kind = kind.trim();
    SYSTEM_KINDS.iter().any(|k| k.eq_ignore_ascii_case(kind))
}

impl Reference {
    pub fn new(kind: impl Into<String>, id: Uuid) -> Self {
        Self { kind: kind.into(), id }
    }

    pub fn order(id: Uuid) -> Self {
        Self::new(ORDER, id)
    }

    pub fn payment(id: Uuid) -> Self {
        Self::new(PAYMENT, id)
    }

    pub fn purchase_order(id: Uuid) -> Self {
        Self::new(PURCHASE_ORDER, id)
    }

    pub fn purchase_order_item(id: Uuid) -> Self {
        Self::new(PURCHASE_ORDER_ITEM, id)
    }

    pub fn production_batch(id: Uuid) -> Self {
        Self::new(PRODUCTION_BATCH, id)
    }

    pub fn ap_bill(id: Uuid) -> Self {
        Self::new(AP_BILL, id)
    }

    pub fn ar_receivable(id: Uuid) -> Self {
        Self::new(AR_RECEIVABLE, id)
    }

    pub fn manual() -> Self {
        Self::new(MANUAL, Uuid::new_v4())
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_kinds_are_recognized() {
        assert!(is_system_kind("production_batch"));
        assert!(is_system_kind(" Purchase_Order_Item "));
        assert!(is_system_kind(&Reference::payment(Uuid::nil()).kind));
        assert!(!is_system_kind("inventario_anual"));
        assert_eq!(Reference::order(Uuid::nil()).to_string(), format!("order:{}", Uuid::nil()));
    }
}
