use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded =
            crate::env::expand_env(&raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        tracing::debug!(path = %path.display(), models = config.models.len(), "configuration loaded");

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the Anthropic settings are unusable or a custom
    /// model is incomplete
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_anthropic()?;
        self.validate_models()?;
        Ok(())
    }

    fn validate_anthropic(&self) -> anyhow::Result<()> {
        if self.anthropic.default_max_tokens == 0 {
            anyhow::bail!("anthropic.default_max_tokens must be greater than 0");
        }

        if let Some(ref key) = self.anthropic.api_key
            && key.expose_secret().trim().is_empty()
        {
            anyhow::bail!("anthropic.api_key must not be empty when set; omit it to use ANTHROPIC_API_KEY");
        }

        if let Some(ref url) = self.anthropic.base_url
            && !matches!(url.scheme(), "http" | "https")
        {
            anyhow::bail!("anthropic.base_url must use http or https, got `{}`", url.scheme());
        }

        Ok(())
    }

    fn validate_models(&self) -> anyhow::Result<()> {
        for (name, model) in &self.models {
            if name.trim().is_empty() {
                anyhow::bail!("custom model names must not be empty");
            }
            if model.label.trim().is_empty() {
                anyhow::bail!("custom model '{name}' must have a label");
            }
            if model.versions.iter().any(|version| version.trim().is_empty()) {
                anyhow::bail!("custom model '{name}' has an empty version identifier");
            }
        }

        Ok(())
    }
}
