// src/common/i18n.rs

use std::{collections::HashMap, sync::LazyLock};

use anyhow::Context;

pub const DEFAULT_LANG: &str = "pt";
pub const SUPPORTED_LANGS: [&str; 2] = ["pt", "en"];

// Catálogos embutidos no binário
const PT_CATALOG: &str = include_str!("../../locales/pt.json");
const EN_CATALOG: &str = include_str!("../../locales/en.json");

static FALLBACK: LazyLock<I18nStore> = LazyLock::new(|| {
    I18nStore::load().unwrap_or_else(|e| {
        tracing::error!("🔥 Falha ao carregar os catálogos de tradução: {:?}", e);
        I18nStore { catalogs: HashMap::new() }
    })
});

/// Mensagens traduzidas, indexadas por idioma e chave.
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in [("pt", PT_CATALOG), ("en", EN_CATALOG)] {
            let catalog: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("catálogo '{lang}' inválido"))?;
            catalogs.insert(lang.to_string(), catalog);
        }
        Ok(Self { catalogs })
    }

    /// Store compartilhado, usado onde não há AppState à mão.
    pub fn fallback() -> &'static I18nStore {
        &FALLBACK
    }

    /// Busca a mensagem no idioma pedido, cai para o padrão e, por fim, devolve a própria chave.
    /// Os parâmetros substituem marcadores `{nome}`.
    pub fn translate(&self, lang: &str, key: &str, params: &[(&str, String)]) -> String {
        let template = self
            .catalogs
            .get(lang)
            .and_then(|c| c.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|c| c.get(key)))
            .map(String::as_str)
            .unwrap_or(key);

        params
            .iter()
            .fold(template.to_string(), |msg, (name, value)| {
                msg.replace(&format!("{{{name}}}"), value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogs_have_the_same_keys() {
        let store = I18nStore::load().unwrap();
        let pt = &store.catalogs["pt"];
        let en = &store.catalogs["en"];
        for key in pt.keys() {
            assert!(en.contains_key(key), "chave '{key}' falta no catálogo en");
        }
        assert_eq!(pt.len(), en.len());
    }

    #[test]
    fn test_translate_with_params() {
        let store = I18nStore::load().unwrap();
        let msg = store.translate("pt", "resource_not_found", &[("resource", "Pedido".into())]);
        assert_eq!(msg, "Pedido não encontrado(a).");
    }

    #[test]
    fn test_unknown_language_falls_back_to_portuguese() {
        let store = I18nStore::load().unwrap();
        assert_eq!(
            store.translate("de", "invalid_token", &[]),
            "Token de autenticação inválido ou ausente."
        );
    }

    #[test]
    fn test_unknown_key_is_returned_verbatim() {
        let store = I18nStore::load().unwrap();
        assert_eq!(store.translate("en", "nao_existe", &[]), "nao_existe");
    }
}
