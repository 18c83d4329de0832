// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::error::{DoqqError, Result};

use super::Settings;

/// Environment variable overriding `ollama.endpoint`
pub const ENV_OLLAMA_URL: &str = "DOQQ_OLLAMA_URL";
/// Environment variable overriding `ollama.model`
pub const ENV_MODEL: &str = "DOQQ_MODEL";

impl Settings {
    /// Apply `DOQQ_OLLAMA_URL` and `DOQQ_MODEL` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides looked up through `lookup`. Empty values are ignored.
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_OLLAMA_URL).filter(|v| !v.trim().is_empty()) {
            tracing::debug!("{} overrides endpoint: {}", ENV_OLLAMA_URL, url);
            self.ollama.endpoint = url;
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.trim().is_empty()) {
            tracing::debug!("{} overrides model: {}", ENV_MODEL, model);
            self.ollama.model = model;
        }
    }

    /// Apply command-line overrides; they take priority over everything else.
    pub fn apply_cli_overrides(&mut self, endpoint: Option<&str>, model: Option<&str>) {
        if let Some(endpoint) = endpoint {
            self.ollama.endpoint = endpoint.to_string();
        }
        if let Some(model) = model {
            self.ollama.model = model.to_string();
        }
    }

    /// Check the settings a session cannot run without.
    pub fn validate(&self) -> Result<()> {
        if self.ollama.model.trim().is_empty() {
            return Err(DoqqError::Config("ollama.model must not be empty".to_string()));
        }

        let endpoint = self.ollama.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(DoqqError::Config(format!(
                "ollama.endpoint must be an http(s) URL, got {:?}",
                self.ollama.endpoint
            )));
        }

        if self.ollama.request_timeout_secs == 0 {
            return Err(DoqqError::Config(
                "ollama.request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.session.end_signal.trim().is_empty() {
            return Err(DoqqError::Config(
                "session.end_signal must not be empty".to_string(),
            ));
        }

        for pattern in &self.crawl.include {
            glob::Pattern::new(pattern)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let mut settings = Settings::default();
        settings.ollama.model = "  ".to_string();
        assert!(matches!(settings.validate(), Err(DoqqError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_non_http_endpoint() {
        let mut settings = Settings::default();
        settings.ollama.endpoint = "localhost:11434/api/chat".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("http"));

        settings.ollama.endpoint = "https://ollama.internal/api/chat".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_end_signal() {
        let mut settings = Settings::default();
        settings.session.end_signal = String::new();
        assert!(matches!(settings.validate(), Err(DoqqError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut settings = Settings::default();
        settings.ollama.request_timeout_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_include_glob() {
        let mut settings = Settings::default();
        settings.crawl.include = vec!["[".to_string()];
        assert!(matches!(settings.validate(), Err(DoqqError::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings.apply_env_overrides_from(env(&[
            (ENV_OLLAMA_URL, "http://gpu-box:11434/api/chat"),
            (ENV_MODEL, "codellama"),
        ]));
        assert_eq!(settings.ollama.endpoint, "http://gpu-box:11434/api/chat");
        assert_eq!(settings.ollama.model, "codellama");
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut settings = Settings::default();
        settings.apply_env_overrides_from(env(&[(ENV_MODEL, "")]));
        assert_eq!(settings.ollama.model, "llama3");
    }

    #[test]
    fn test_cli_overrides_win_over_env() {
        let mut settings = Settings::default();
        settings.apply_env_overrides_from(env(&[(ENV_MODEL, "codellama")]));
        settings.apply_cli_overrides(None, Some("mistral"));
        assert_eq!(settings.ollama.model, "mistral");
        assert_eq!(settings.ollama.endpoint, "http://localhost:11434/api/chat");
    }
}
