use serde::{Deserialize, Serialize};

/// Application config, loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub oracle: OracleConfig,
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Endpoint for the LLM-backed comparison oracle (OpenAI-style chat API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    pub base_url: String,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: String,
}

/// Tunables for the matching pipeline. The fuzzy acceptance floors are
/// asymmetric on purpose: a wrong BOL association has a much smaller
/// blast radius than a wrong PO association.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub po_confidence_floor: f64,
    pub bol_confidence_floor: f64,
    /// Whether a failed exact resolution falls through to the fuzzy
    /// linker inside the run, or fails the run immediately.
    pub fuzzy_fallback: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            po_confidence_floor: 0.7,
            bol_confidence_floor: 0.2,
            fuzzy_fallback: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/freight_recon".to_string(),
            },
            oracle: OracleConfig {
                base_url: "http://localhost:11434/v1".to_string(),
                model: "gemini-2.0-flash-exp".to_string(),
                api_key: String::new(),
            },
            matching: MatchingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(defaults.server.port),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL").unwrap_or(defaults.database.url),
            },
            oracle: OracleConfig {
                base_url: std::env::var("ORACLE_BASE_URL").unwrap_or(defaults.oracle.base_url),
                model: std::env::var("ORACLE_MODEL").unwrap_or(defaults.oracle.model),
                api_key: std::env::var("ORACLE_API_KEY").unwrap_or_default(),
            },
            matching: MatchingConfig {
                po_confidence_floor: std::env::var("MATCH_PO_CONFIDENCE_FLOOR")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.matching.po_confidence_floor),
                bol_confidence_floor: std::env::var("MATCH_BOL_CONFIDENCE_FLOOR")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.matching.bol_confidence_floor),
                fuzzy_fallback: std::env::var("MATCH_FUZZY_FALLBACK")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.matching.fuzzy_fallback),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_are_asymmetric() {
        let matching = MatchingConfig::default();
        assert_eq!(matching.po_confidence_floor, 0.7);
        assert_eq!(matching.bol_confidence_floor, 0.2);
        assert!(!matching.fuzzy_fallback);
    }
}
