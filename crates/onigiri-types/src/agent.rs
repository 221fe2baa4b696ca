//! Agent configuration types for Onigiri.
//!
//! `AgentConfig` bundles the model invocation settings an agent needs. It is
//! only obtainable through [`AgentConfigBuilder::build`], which validates
//! every field once so the agent never sees an invalid combination.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;

use crate::error::AgentError;
use crate::llm::OutputSchema;
use crate::message::ROLE_SYSTEM;

/// Validated model invocation settings for an agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    model: String,
    system_role: String,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
    parameters: BTreeMap<String, Value>,
    output_schema: OutputSchema,
    request_timeout: Option<Duration>,
}

impl AgentConfig {
    pub fn builder(model: impl Into<String>) -> AgentConfigBuilder {
        AgentConfigBuilder::new(model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Role label of the system message; empty disables the system message.
    pub fn system_role(&self) -> &str {
        &self.system_role
    }

    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    pub fn max_tokens(&self) -> Option<u32> {
        self.max_tokens
    }

    pub fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.parameters
    }

    pub fn output_schema(&self) -> &OutputSchema {
        &self.output_schema
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }
}

/// Builder for [`AgentConfig`].
///
/// Defaults: system role `"system"`, no temperature, no max tokens, no extra
/// parameters, plain-text output schema, no request timeout.
#[derive(Debug, Clone)]
pub struct AgentConfigBuilder {
    model: String,
    system_role: String,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
    parameters: Vec<(String, Value)>,
    output_schema: OutputSchema,
    request_timeout: Option<Duration>,
}

impl AgentConfigBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_role: ROLE_SYSTEM.to_string(),
            temperature: None,
            max_tokens: None,
            parameters: Vec::new(),
            output_schema: OutputSchema::text(),
            request_timeout: None,
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the system message role. An empty string omits the system message.
    pub fn system_role(mut self, role: impl Into<String>) -> Self {
        self.system_role = role.into();
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Add a provider-specific parameter. Later values for the same key win.
    pub fn parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parameters.push((key.into(), value));
        self
    }

    pub fn output_schema(mut self, schema: OutputSchema) -> Self {
        self.output_schema = schema;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Validate and produce the config.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        if self.model.trim().is_empty() {
            return Err(AgentError::InvalidArgument(
                "model name cannot be empty".to_string(),
            ));
        }

        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(AgentError::InvalidArgument(format!(
                    "temperature must be within 0.0..=2.0, got {t}"
                )));
            }
        }

        if self.max_tokens == Some(0) {
            return Err(AgentError::InvalidArgument(
                "max tokens must be greater than zero".to_string(),
            ));
        }

        if self.output_schema.name.is_empty() {
            return Err(AgentError::InvalidArgument(
                "output schema name cannot be empty".to_string(),
            ));
        }

        if self.request_timeout == Some(Duration::ZERO) {
            return Err(AgentError::InvalidArgument(
                "request timeout must be non-zero".to_string(),
            ));
        }

        let mut parameters = BTreeMap::new();
        for (key, value) in self.parameters {
            if key.is_empty() {
                return Err(AgentError::InvalidArgument(
                    "model API parameter key cannot be empty".to_string(),
                ));
            }
            parameters.insert(key, value);
        }

        Ok(AgentConfig {
            model: self.model,
            system_role: self.system_role,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            parameters,
            output_schema: self.output_schema,
            request_timeout: self.request_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::builder("gpt-4o-mini").build().unwrap();
        assert_eq!(config.model(), "gpt-4o-mini");
        assert_eq!(config.system_role(), "system");
        assert!(config.temperature().is_none());
        assert!(config.max_tokens().is_none());
        assert!(config.parameters().is_empty());
        assert!(config.output_schema().is_text());
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_empty_model_rejected() {
        let err = AgentConfig::builder("  ").build().unwrap_err();
        assert!(matches!(err, AgentError::InvalidArgument(_)));
    }

    #[test]
    fn test_empty_system_role_allowed() {
        let config = AgentConfig::builder("m").system_role("").build().unwrap();
        assert_eq!(config.system_role(), "");
    }

    #[test]
    fn test_temperature_range() {
        assert!(AgentConfig::builder("m").temperature(0.0).build().is_ok());
        assert!(AgentConfig::builder("m").temperature(2.0).build().is_ok());
        assert!(AgentConfig::builder("m").temperature(2.5).build().is_err());
        assert!(AgentConfig::builder("m").temperature(-0.1).build().is_err());
    }

    #[test]
    fn test_zero_max_tokens_and_timeout_rejected() {
        assert!(AgentConfig::builder("m").max_tokens(0).build().is_err());
        assert!(
            AgentConfig::builder("m")
                .request_timeout(Duration::ZERO)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_parameters_last_write_wins() {
        let config = AgentConfig::builder("m")
            .parameter("top_p", json!(0.5))
            .parameter("seed", json!(7))
            .parameter("top_p", json!(0.9))
            .build()
            .unwrap();

        assert_eq!(config.parameters().len(), 2);
        assert_eq!(config.parameters()["top_p"], json!(0.9));
    }

    #[test]
    fn test_empty_parameter_key_rejected() {
        let err = AgentConfig::builder("m")
            .parameter("", json!(1))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("parameter key"));
    }

    #[test]
    fn test_empty_output_schema_name_rejected() {
        let err = AgentConfig::builder("m")
            .output_schema(OutputSchema {
                name: String::new(),
                schema: None,
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidArgument(_)));
    }
}
