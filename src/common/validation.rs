// src/common/validation.rs

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

use crate::common::{error::AppError, reference::is_system_kind};

// Validadores customizados usados pelos payloads. A mensagem é a chave de tradução.

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.message = Some("must_not_be_negative".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("must_be_positive".into());
        return Err(err);
    }
    Ok(())
}

// Maiores valores das colunas NUMERIC(12, 3), NUMERIC(12, 2), NUMERIC(12, 4) e NUMERIC(10, 2)
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 3);
pub const MAX_MONEY: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);
pub const MAX_UNIT_COST: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 4);
pub const MAX_NUTRIENT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

fn numeric_error(key: &'static str) -> ValidationError {
    let mut err = ValidationError::new("numeric");
    err.message = Some(key.into());
    err
}

// Casas decimais e parte inteira compatíveis com a coluna
fn fits_column(val: &Decimal, scale: u32, max: Decimal) -> Result<(), ValidationError> {
    if val.normalize().scale() > scale {
        return Err(numeric_error("too_many_decimals"));
    }
    if val.abs() > max {
        return Err(numeric_error("out_of_range"));
    }
    Ok(())
}

/// Quantidade física (estoque, receita, compra): maior que zero, até 3 casas.
pub fn validate_quantity(val: &Decimal) -> Result<(), ValidationError> {
    validate_positive(val)?;
    fits_column(val, 3, MAX_QUANTITY)
}

/// Limite de estoque baixo: como quantidade, mas aceita zero.
pub fn validate_threshold(val: &Decimal) -> Result<(), ValidationError> {
    validate_not_negative(val)?;
    fits_column(val, 3, MAX_QUANTITY)
}

/// Preço ou valor que pode ser zero, em centavos.
pub fn validate_price(val: &Decimal) -> Result<(), ValidationError> {
    validate_not_negative(val)?;
    fits_column(val, 2, MAX_MONEY)
}

/// Valor de pagamento, conta ou lançamento: maior que zero, em centavos.
pub fn validate_amount(val: &Decimal) -> Result<(), ValidationError> {
    validate_positive(val)?;
    fits_column(val, 2, MAX_MONEY)
}

/// Custo unitário de compra, até 4 casas.
pub fn validate_unit_cost(val: &Decimal) -> Result<(), ValidationError> {
    validate_not_negative(val)?;
    fits_column(val, 4, MAX_UNIT_COST)
}

/// Valor nutricional por 100 g. Casas extras são arredondadas pelo banco.
pub fn validate_nutrient(val: &Decimal) -> Result<(), ValidationError> {
    validate_not_negative(val)?;
    if *val > MAX_NUTRIENT {
        return Err(numeric_error("out_of_range"));
    }
    Ok(())
}

/// Tipo de referência informado numa movimentação manual de estoque.
pub fn validate_manual_reference_type(val: &str) -> Result<(), ValidationError> {
    let val = val.trim();
    if val.is_empty() || val.len() > 60 {
        let mut err = ValidationError::new("length");
        err.message = Some("required".into());
        return Err(err);
    }
    if is_system_kind(val) {
        let mut err = ValidationError::new("reserved");
        err.message = Some("reserved_reference_type".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_slug(val: &str) -> Result<(), ValidationError> {
    let valid = !val.is_empty()
        && !val.starts_with('-')
        && !val.ends_with('-')
        && !val.contains("--")
        && val.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid {
        let mut err = ValidationError::new("slug");
        err.message = Some("invalid_slug".into());
        return Err(err);
    }
    Ok(())
}

/// Erro de validação de um único campo, para regras checadas fora do derive.
pub fn field_error(field: &'static str, key: &'static str) -> AppError {
    let mut err = ValidationError::new("invalid");
    err.message = Some(key.into());
    let mut errors = ValidationErrors::new();
    errors.add(field, err);
    AppError::ValidationError(errors)
}

/// Forma canônica de nomes únicos (ingredientes, fornecedores):
/// minúsculas, sem espaços nas pontas e com espaços internos colapsados.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Farinha   de TRIGO "), "farinha de trigo");
        assert_eq!(normalize_name("Açúcar"), "açúcar");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn test_decimal_validators() {
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
        assert!(validate_not_negative(&Decimal::new(-1, 2)).is_err());
        assert!(validate_positive(&Decimal::ZERO).is_err());
        assert!(validate_positive(&Decimal::new(1, 3)).is_ok());
    }

    #[test]
    fn test_column_bounds() {
        assert!(validate_quantity(&Decimal::new(1, 3)).is_ok());
        // 0.0004 seria arredondado para zero pela coluna
        assert!(validate_quantity(&Decimal::new(4, 4)).is_err());
        assert!(validate_quantity(&Decimal::new(25000, 4)).is_ok());
        assert!(validate_quantity(&MAX_QUANTITY).is_ok());
        assert!(validate_quantity(&(MAX_QUANTITY + Decimal::ONE)).is_err());

        assert!(validate_price(&Decimal::ZERO).is_ok());
        assert!(validate_price(&Decimal::new(1999, 3)).is_err());
        assert_eq!(MAX_MONEY.to_string(), "9999999999.99");
        assert_eq!(MAX_QUANTITY.to_string(), "999999999.999");
        assert_eq!(MAX_NUTRIENT.to_string(), "99999999.99");
        assert!(validate_amount(&Decimal::new(10_000_000_000, 0)).is_err());

        assert!(validate_unit_cost(&Decimal::new(49_999, 4)).is_ok());
        assert!(validate_unit_cost(&Decimal::new(1, 5)).is_err());

        let huge: Decimal = "100000000000000000000".parse().unwrap();
        assert!(validate_quantity(&huge).is_err());
        assert!(validate_unit_cost(&huge).is_err());
        assert!(validate_nutrient(&huge).is_err());
        assert!(validate_nutrient(&Decimal::new(12345, 3)).is_ok());
    }

    #[test]
    fn test_manual_reference_type() {
        assert!(validate_manual_reference_type("inventory_count").is_ok());
        assert!(validate_manual_reference_type("production_batch").is_err());
        assert!(validate_manual_reference_type("purchase_order_item").is_err());
        assert!(validate_manual_reference_type("  ").is_err());
    }

    #[test]
    fn test_slug() {
        assert!(validate_slug("quem-somos").is_ok());
        assert!(validate_slug("cardapio2026").is_ok());
        assert!(validate_slug("Quem-Somos").is_err());
        assert!(validate_slug("-inicio").is_err());
        assert!(validate_slug("a--b").is_err());
        assert!(validate_slug("").is_err());
    }
}
