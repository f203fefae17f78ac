// src/common/i18n.rs

use std::{collections::HashMap, sync::Arc};

pub const DEFAULT_LANG: &str = "pt";

// (chave, português, inglês)
const MESSAGES: &[(&str, &str, &str)] = &[
    ("validation_error", "Um ou mais campos são inválidos.", "One or more fields are invalid."),
    ("required", "Campo obrigatório.", "This field is required."),
    ("invalid_email", "E-mail inválido.", "Invalid e-mail address."),
    ("password_too_short", "A senha deve ter no mínimo 6 caracteres.", "Password must be at least 6 characters long."),
    ("invalid_credentials", "E-mail ou senha inválidos.", "Invalid e-mail or password."),
    ("invalid_token", "Token de autenticação inválido ou ausente.", "Missing or invalid authentication token."),
    ("lead_not_found", "Cliente não encontrado.", "Lead not found."),
    ("invalid_change_payload", "Evento de mudança inválido.", "Invalid change event."),
    ("ai_unavailable", "O assistente está indisponível no momento.", "The assistant is currently unavailable."),
    ("internal_error", "Ocorreu um erro inesperado.", "An unexpected error occurred."),
];

/// Catálogo de mensagens por idioma. Idiomas desconhecidos caem no português;
/// chaves desconhecidas voltam como estão.
#[derive(Clone)]
pub struct I18nStore {
    catalog: Arc<HashMap<&'static str, HashMap<&'static str, &'static str>>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut pt = HashMap::new();
        let mut en = HashMap::new();
        for (key, pt_msg, en_msg) in MESSAGES {
            pt.insert(*key, *pt_msg);
            en.insert(*key, *en_msg);
        }

        let mut catalog = HashMap::new();
        catalog.insert("pt", pt);
        catalog.insert("en", en);

        Self {
            catalog: Arc::new(catalog),
        }
    }

    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.catalog
            .get(lang)
            .and_then(|messages| messages.get(key))
            .or_else(|| {
                self.catalog
                    .get(DEFAULT_LANG)
                    .and_then(|messages| messages.get(key))
            })
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}
