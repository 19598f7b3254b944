//! Browser origins allowed to call the management API.
//!
//! The service sits behind an authenticating gateway, so CORS only matters
//! for management consoles talking to it directly during development.

use std::env;

const DEV_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Reads `ALLOWED_ORIGINS` as a comma-separated list, falling back to the
    /// local dev origins.
    pub fn from_env() -> Self {
        let raw = env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| DEV_ORIGINS.to_string());

        Self {
            allowed_origins: parse_origins(&raw),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: parse_origins(DEV_ORIGINS),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_trims_and_drops_empties() {
        let origins = parse_origins(" http://a.example ,, http://b.example ,");
        assert_eq!(origins, vec!["http://a.example", "http://b.example"]);
    }

    #[test]
    fn test_default_matches_env_fallback() {
        assert_eq!(
            CorsConfig::default().allowed_origins,
            parse_origins(DEV_ORIGINS)
        );
    }
}
