// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::{DEFAULT_LANG, SUPPORTED_LANGS};

// Nosso extrator de idioma
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl Locale {
    /// Primeiro idioma suportado do Accept-Language ("pt-BR" -> "pt"), ou o padrão.
    pub fn from_header(header_str: Option<&str>) -> Self {
        header_str
            .map(accept_language::parse)
            .and_then(|tags| {
                tags.iter()
                    .map(|tag| tag.split('-').next().unwrap_or(tag).to_lowercase())
                    .find(|lang| SUPPORTED_LANGS.contains(&lang.as_str()))
            })
            .map(Locale)
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_str = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok());

        Ok(Locale::from_header(header_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_from_header() {
        assert_eq!(Locale::from_header(Some("pt-BR,pt;q=0.9")).0, "pt");
        assert_eq!(Locale::from_header(Some("en-US,en;q=0.8")).0, "en");
        assert_eq!(Locale::from_header(Some("de-DE,en;q=0.5")).0, "en");
        assert_eq!(Locale::from_header(Some("fr")).0, "pt");
        assert_eq!(Locale::from_header(None).0, "pt");
    }
}
