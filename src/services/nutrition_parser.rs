// src/services/nutrition_parser.rs

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::models::ocr::ParsedNutrition;

// Número com vírgula ou ponto decimal ("4,2", "4.2", "120")
const NUM: &str = r"(\d+(?:[.,]\d+)?)";

fn label_regex(labels: &str, unit: &str) -> Regex {
    // Rótulo, qualquer coisa na mesma linha (o mínimo possível), número e unidade
    let pattern = format!(r"(?im)(?:{labels})[^\n]*?{NUM}\s*(?:{unit})\b");
    Regex::new(&pattern).expect("Invalid regex")
}

static SERVING_RE: LazyLock<Regex> =
    LazyLock::new(|| label_regex(r"por[çc][ãa]o|serving size|serving", "g|ml"));

static ENERGY_KCAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    label_regex(r"valor energ[ée]tico|energia|energy|calorias|calories", "kcal")
});

static ENERGY_KJ_RE: LazyLock<Regex> =
    LazyLock::new(|| label_regex(r"valor energ[ée]tico|energia|energy", "kj"));

// Formato americano: "Calories 120", sem unidade
static CALORIES_BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?im)^\s*calories\s*{NUM}\b")).expect("Invalid regex"));

static PROTEIN_RE: LazyLock<Regex> =
    LazyLock::new(|| label_regex(r"prote[íi]nas?|protein", "g"));

static CARBS_RE: LazyLock<Regex> = LazyLock::new(|| {
    label_regex(r"carboidratos?|total carbohydrates?|carbohydrates?|carbs", "g")
});

static FAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    label_regex(r"gorduras?\s+totais|gordura\s+total|total\s+fat|gorduras?|fat", "g")
});

static SODIUM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?im)(?:s[óo]dio|sodium)[^\n]*?{NUM}\s*(mg|g)\b")).expect("Invalid regex")
});

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(&raw.replace(',', ".")).ok()
}

fn first_value(re: &Regex, text: &str) -> Option<Decimal> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_decimal(m.as_str()))
}

fn energy_kcal(text: &str) -> Option<Decimal> {
    first_value(&ENERGY_KCAL_RE, text)
        // 1 kcal = 4,184 kJ
        .or_else(|| {
            first_value(&ENERGY_KJ_RE, text).map(|kj| (kj / Decimal::new(4184, 3)).round_dp(1))
        })
        .or_else(|| first_value(&CALORIES_BARE_RE, text))
}

fn sodium_mg(text: &str) -> Option<Decimal> {
    let caps = SODIUM_RE.captures(text)?;
    let value = parse_decimal(caps.get(1)?.as_str())?;
    match caps.get(2).map(|m| m.as_str().to_lowercase()) {
        // Valor absurdo em gramas que não cabe em mg conta como não encontrado
        Some(unit) if unit == "g" => value.checked_mul(Decimal::ONE_THOUSAND),
        _ => Some(value),
    }
}

/// Extrai a tabela nutricional do texto de um rótulo (português ou inglês).
/// A confiança é a fração dos cinco nutrientes encontrados.
pub fn parse_label(text: &str) -> ParsedNutrition {
    let mut parsed = ParsedNutrition {
        serving_size_g: first_value(&SERVING_RE, text),
        energy_kcal: energy_kcal(text),
        protein_g: first_value(&PROTEIN_RE, text),
        carbs_g: first_value(&CARBS_RE, text),
        fat_g: first_value(&FAT_RE, text),
        sodium_mg: sodium_mg(text),
        confidence: Decimal::ZERO,
    };

    let found = [
        parsed.energy_kcal,
        parsed.protein_g,
        parsed.carbs_g,
        parsed.fat_g,
        parsed.sodium_mg,
    ]
    .iter()
    .filter(|v| v.is_some())
    .count();
    parsed.confidence = (Decimal::from(found as u32) / Decimal::from(5)).round_dp(2);
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABEL_PT: &str = "INFORMAÇÃO NUTRICIONAL\n\
        Porção de 30 g (1 xícara)\n\
        Valor energético 120 kcal = 502 kJ 6%\n\
        Carboidratos 20 g 7%\n\
        Proteínas 4,2 g 6%\n\
        Gorduras totais 3,5 g 6%\n\
        Gorduras saturadas 1 g 5%\n\
        Sódio 45 mg 2%\n";

    const LABEL_EN: &str = "Nutrition Facts\n\
        Serving size 1 cup (240ml)\n\
        Calories 150\n\
        Total Fat 8g 10%\n\
        Sodium 0.12g 5%\n\
        Total Carbohydrate 12g 4%\n\
        Protein 8g\n";

    #[test]
    fn test_parses_brazilian_label() {
        let parsed = parse_label(LABEL_PT);
        assert_eq!(parsed.serving_size_g, Some(Decimal::new(30, 0)));
        assert_eq!(parsed.energy_kcal, Some(Decimal::new(120, 0)));
        assert_eq!(parsed.carbs_g, Some(Decimal::new(20, 0)));
        assert_eq!(parsed.protein_g, Some(Decimal::new(42, 1)));
        assert_eq!(parsed.fat_g, Some(Decimal::new(35, 1)));
        assert_eq!(parsed.sodium_mg, Some(Decimal::new(45, 0)));
        assert_eq!(parsed.confidence, Decimal::ONE);
    }

    #[test]
    fn test_parses_american_label() {
        let parsed = parse_label(LABEL_EN);
        assert_eq!(parsed.serving_size_g, Some(Decimal::new(240, 0)));
        assert_eq!(parsed.energy_kcal, Some(Decimal::new(150, 0)));
        assert_eq!(parsed.fat_g, Some(Decimal::new(8, 0)));
        assert_eq!(parsed.carbs_g, Some(Decimal::new(12, 0)));
        assert_eq!(parsed.protein_g, Some(Decimal::new(8, 0)));
        // 0,12 g de sódio = 120 mg
        assert_eq!(parsed.sodium_mg, Some(Decimal::new(120, 0)));
    }

    #[test]
    fn test_energy_only_in_kj_is_converted() {
        let parsed = parse_label("Energia 418,4 kJ\nProteínas 2 g");
        assert_eq!(parsed.energy_kcal, Some(Decimal::new(100, 0)));
        assert_eq!(parsed.confidence, Decimal::new(4, 1));
    }

    #[test]
    fn test_text_without_nutrients_has_zero_confidence() {
        let parsed = parse_label("Ingredientes: farinha de trigo, água e sal.");
        assert!(!parsed.has_values());
        assert_eq!(parsed.confidence, Decimal::ZERO);
    }

    #[test]
    fn test_sodium_overflow_is_not_found() {
        let parsed = parse_label("Sódio 9999999999999999999999999999 g\nProteínas 3 g");
        assert_eq!(parsed.sodium_mg, None);
        assert_eq!(parsed.protein_g, Some(Decimal::new(3, 0)));
        assert_eq!(parsed.confidence, Decimal::new(2, 1));
    }
}
