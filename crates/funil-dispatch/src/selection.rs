// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider selection for outbound sends.

use funil_core::{EvolutionConfig, FunilError, MetaConfig, ProviderConfig};

/// The provider chosen for one outbound send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedProvider<'a> {
    Evolution(&'a EvolutionConfig),
    Meta(&'a MetaConfig),
}

/// Pick the provider for an organization.
///
/// A complete Evolution configuration (url, key, and instance all present)
/// takes precedence over Meta credentials. An organization with neither is
/// a caller error, not a silent drop; sends are request/response.
pub fn select_provider(config: &ProviderConfig) -> Result<SelectedProvider<'_>, FunilError> {
    if let Some(evolution) = &config.evolution {
        return Ok(SelectedProvider::Evolution(evolution));
    }
    if let Some(meta) = &config.meta {
        return Ok(SelectedProvider::Meta(meta));
    }
    Err(FunilError::provider(
        "organization has no WhatsApp provider configured",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evolution() -> EvolutionConfig {
        EvolutionConfig {
            base_url: "https://evo.example".into(),
            api_key: "evo-key".into(),
            instance: "Vendas1".into(),
        }
    }

    fn meta() -> MetaConfig {
        MetaConfig {
            phone_number_id: "1550001".into(),
            access_token: "token".into(),
        }
    }

    #[test]
    fn evolution_wins_over_meta() {
        let config = ProviderConfig {
            evolution: Some(evolution()),
            meta: Some(meta()),
        };
        assert!(matches!(
            select_provider(&config).unwrap(),
            SelectedProvider::Evolution(_)
        ));
    }

    #[test]
    fn meta_is_the_fallback() {
        let config = ProviderConfig {
            evolution: None,
            meta: Some(meta()),
        };
        assert!(matches!(
            select_provider(&config).unwrap(),
            SelectedProvider::Meta(_)
        ));
    }

    #[test]
    fn no_provider_is_an_error() {
        let err = select_provider(&ProviderConfig::default()).unwrap_err();
        assert!(err.to_string().contains("no WhatsApp provider"));
    }
}
