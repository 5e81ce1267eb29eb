//! Ollama 服务 - 业务能力层
//!
//! 通过本地 Ollama 的 `/api/generate` 接口生成文本

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::GenerationError;
use crate::services::capabilities::TextCompletion;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Ollama 服务
pub struct OllamaService {
    http: reqwest::Client,
    base_url: String,
    model_name: String,
}

impl OllamaService {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.ollama_base_url.trim_end_matches('/').to_string(),
            model_name: config.ollama_model_name.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    pub async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<String, GenerationError> {
        debug!("调用 Ollama，模型: {}", self.model_name);

        let body = GenerateRequest {
            model: &self.model_name,
            prompt,
            system,
            stream: false,
        };

        let response = self
            .http
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!("Ollama 调用失败: {}", e);
                GenerationError::api_failed("ollama", &self.model_name, e)
            })?;

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::api_failed("ollama", &self.model_name, e))?;

        let content = parsed.response.trim().to_string();
        if content.is_empty() {
            return Err(GenerationError::EmptyContent {
                model: self.model_name.clone(),
            });
        }

        Ok(content)
    }
}

#[async_trait]
impl TextCompletion for OllamaService {
    fn backend_name(&self) -> &str {
        "ollama"
    }

    async fn complete(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String, GenerationError> {
        self.generate(user_message, system_message).await
    }
}
