use crate::config::provider::{GeneratorConfig, ProviderConfig, DEFAULT_TIMEOUT_SECONDS};
use crate::utils::error::{DispatchError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub provider: ProviderSection,
    pub generator: Option<GeneratorSection>,
    pub output: Option<OutputSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSection {
    pub api_key: String,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSection {
    pub base_url: Option<String>,
    pub llm_provider: Option<String>,
    pub llm_model: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    pub report_dir: Option<String>,
    pub draft_file: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DispatchError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DispatchError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BREVO_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DispatchError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn provider_config(&self) -> ProviderConfig {
        let mut config = ProviderConfig::new(
            self.provider.api_key.clone(),
            self.provider
                .base_url
                .clone()
                .unwrap_or_else(|| crate::config::provider::DEFAULT_PROVIDER_URL.to_string()),
        );
        config.timeout_seconds = self
            .provider
            .timeout_seconds
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);
        config
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::default();
        if let Some(section) = &self.generator {
            if let Some(base_url) = &section.base_url {
                config.base_url = base_url.clone();
            }
            if let Some(llm_provider) = &section.llm_provider {
                config.llm_provider = llm_provider.clone();
            }
            if let Some(llm_model) = &section.llm_model {
                config.llm_model = llm_model.clone();
            }
            if let Some(timeout) = section.timeout_seconds {
                config.timeout_seconds = timeout;
            }
            if let Some(user_id) = &section.user_id {
                config.user_id = Some(user_id.clone());
            }
        }
        config
    }

    pub fn report_dir(&self) -> Option<&str> {
        self.output.as_ref()?.report_dir.as_deref()
    }

    pub fn draft_file(&self) -> Option<&str> {
        self.output.as_ref()?.draft_file.as_deref()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        // 未替換的 ${VAR} 代表環境變數缺失
        if self.provider.api_key.starts_with("${") {
            return Err(DispatchError::MissingConfigError {
                field: self
                    .provider
                    .api_key
                    .trim_start_matches("${")
                    .trim_end_matches('}')
                    .to_string(),
            });
        }
        self.provider_config().validate()?;
        self.generator_config().validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[provider]
api_key = "xkeysib-test"
base_url = "https://api.example.com/v3"
timeout_seconds = 10

[generator]
base_url = "http://backend:8000/api/v1"
llm_model = "gpt-4o-mini"
user_id = "aa598689-5fb0-4554-af77-aa82bccbd414"

[output]
report_dir = "./reports"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let provider = config.provider_config();
        let generator = config.generator_config();

        assert_eq!(provider.api_key, "xkeysib-test");
        assert_eq!(provider.base_url, "https://api.example.com/v3");
        assert_eq!(provider.timeout_seconds, 10);
        assert_eq!(generator.base_url, "http://backend:8000/api/v1");
        assert_eq!(generator.llm_model, "gpt-4o-mini");
        assert_eq!(generator.llm_provider, "openai");
        assert_eq!(
            generator.user_id.as_deref(),
            Some("aa598689-5fb0-4554-af77-aa82bccbd414")
        );
        assert_eq!(config.report_dir(), Some("./reports"));
        assert_eq!(config.draft_file(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SEQUENCE_DISPATCH_TEST_KEY", "from-env");

        let toml_content = r#"
[provider]
api_key = "${SEQUENCE_DISPATCH_TEST_KEY}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.provider.api_key, "from-env");
        assert_eq!(
            config.provider_config().base_url,
            crate::config::provider::DEFAULT_PROVIDER_URL
        );

        std::env::remove_var("SEQUENCE_DISPATCH_TEST_KEY");
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        let toml_content = r#"
[provider]
api_key = "${SEQUENCE_DISPATCH_UNSET_KEY}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        match config.validate() {
            Err(DispatchError::MissingConfigError { field }) => {
                assert_eq!(field, "SEQUENCE_DISPATCH_UNSET_KEY")
            }
            other => panic!("expected missing config error, got {:?}", other),
        }
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[provider]
api_key = "key"
base_url = "invalid-url"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[provider]
api_key = "file-key"

[output]
draft_file = "drafts/launch.json"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.provider.api_key, "file-key");
        assert_eq!(config.draft_file(), Some("drafts/launch.json"));
    }
}
