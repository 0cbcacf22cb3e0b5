use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::GenerationClient;
use crate::config::Config;

const SYSTEM_INSTRUCTION: &str = "你是一个专业的乒乓球教练和分析师，擅长分析训练数据并提供针对性的建议。\
    请基于用户提供的信息生成一份专业的训练分析报告。";

/// Chat-completions client for the Baidu Qianfan endpoint. Configuration
/// is injected at construction and immutable afterwards; the underlying
/// reqwest client carries the request timeout, since the upstream API
/// enforces none.
pub struct QianfanClient {
    client: reqwest::Client,
    api_key: String,
    url: String,
    model: String,
    temperature: f64,
    top_p: f64,
}

impl QianfanClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.chat_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.chat_api_key.clone().unwrap_or_default(),
            url: format!("{}{}", config.chat_base_url, config.chat_endpoint),
            model: config.chat_model.clone(),
            temperature: config.chat_temperature,
            top_p: config.chat_top_p,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    top_p: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

fn extract_content(resp: ChatResponse) -> anyhow::Result<String> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .ok_or_else(|| anyhow::anyhow!("response envelope has no assistant message"))
}

#[async_trait::async_trait]
impl GenerationClient for QianfanClient {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| anyhow::anyhow!("invalid API key header: {e}"))?,
        );

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            top_p: self.top_p,
        };

        let response = self
            .client
            .post(&self.url)
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "chat API error ({}): {}",
                status,
                error_body
            ));
        }

        let resp: ChatResponse = response.json().await?;
        extract_content(resp)
    }

    fn name(&self) -> &str {
        "qianfan"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content_from_envelope() {
        let resp: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"content": "生成的报告"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_content(resp).unwrap(), "生成的报告");
    }

    #[test]
    fn test_extract_content_missing_choices() {
        let resp: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(extract_content(resp).is_err());

        let resp: ChatResponse = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert!(extract_content(resp).is_err());
    }

    #[test]
    fn test_extract_content_missing_message_content() {
        let resp: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {}}]}"#).unwrap();
        assert!(extract_content(resp).is_err());

        let resp: ChatResponse = serde_json::from_str(r#"{"choices": [{}]}"#).unwrap();
        assert!(extract_content(resp).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "ernie-3.5-8k",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.7,
            top_p: 0.8,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "ernie-3.5-8k");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["temperature"], 0.7);
    }
}
