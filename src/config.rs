/// Remote model configuration
///
/// Read from the environment (and a local `.env`, loaded in `main`).
/// There is no config file and no command line.

/// Default Gemini REST base URL
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default image-capable model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Settings for the Gemini client
#[derive(Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    /// API key; `None` makes every generation fail with a clear message
    pub api_key: Option<String>,
    /// Base URL without a trailing slash
    pub api_base: String,
    pub model: String,
}

impl GeminiConfig {
    /// Read `GEMINI_API_KEY` (or `GOOGLE_API_KEY`), `GEMINI_API_BASE` and `TRY_ON_MODEL`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = non_empty("GEMINI_API_KEY").or_else(|| non_empty("GOOGLE_API_KEY"));
        let api_base = non_empty("GEMINI_API_BASE")
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let model = non_empty("TRY_ON_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Self {
            api_key,
            api_base,
            model,
        }
    }

    /// `generateContent` endpoint for the configured model
    pub fn endpoint(&self) -> String {
        let model = self.model.trim_start_matches("models/");
        format!("{}/models/{}:generateContent", self.api_base, model)
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

// Never print the key.
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GeminiConfig::default();
        assert_eq!(config.api_key, None);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(
            config.endpoint(),
            format!("{}/models/{}:generateContent", DEFAULT_API_BASE, DEFAULT_MODEL)
        );
    }

    #[test]
    fn test_google_key_is_a_fallback() {
        let config = GeminiConfig::from_lookup(lookup(&[("GOOGLE_API_KEY", "g-key")]));
        assert_eq!(config.api_key.as_deref(), Some("g-key"));

        let config = GeminiConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "gem-key"),
            ("GOOGLE_API_KEY", "g-key"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("gem-key"));
    }

    #[test]
    fn test_blank_values_and_trailing_slash() {
        let config = GeminiConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "   "),
            ("GEMINI_API_BASE", "http://localhost:1234/v1/"),
            ("TRY_ON_MODEL", "models/custom-image"),
        ]));
        assert_eq!(config.api_key, None);
        assert_eq!(config.api_base, "http://localhost:1234/v1");
        assert_eq!(
            config.endpoint(),
            "http://localhost:1234/v1/models/custom-image:generateContent"
        );
    }

    #[test]
    fn test_debug_hides_key() {
        let config = GeminiConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "super-secret")]));
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
