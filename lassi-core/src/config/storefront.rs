/// Storefront (customer frontend) configuration.
#[derive(Debug, Clone, Default)]
pub struct StorefrontConfig {
    /// Origins allowed by CORS. An empty list allows any origin.
    pub allowed_origins: Vec<String>,
}

impl StorefrontConfig {
    pub fn allows_origin(&self, origin: &str) -> bool {
        self.allowed_origins.is_empty()
            || self
                .allowed_origins
                .iter()
                .any(|allowed| allowed.trim_end_matches('/') == origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_allows_any_origin() {
        assert!(StorefrontConfig::default().allows_origin("https://anywhere.example"));
    }

    #[test]
    fn test_origin_matching() {
        let config = StorefrontConfig {
            allowed_origins: vec!["https://lassicorner.example/".to_string()],
        };
        assert!(config.allows_origin("https://lassicorner.example"));
        assert!(!config.allows_origin("https://evil.example"));
    }
}
