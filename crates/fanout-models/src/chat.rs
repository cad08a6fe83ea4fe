//! OpenAI-compatible chat-completions client.
//!
//! Works against any server exposing the `/chat/completions` route (vLLM,
//! llama.cpp, OpenAI itself). The base URL comes from the worker's
//! [`Endpoint`], so one shared client instance serves every worker.

use async_trait::async_trait;
use fanout_abstraction::{ClientError, Endpoint, RemoteClient};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Generation parameters sent with every request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatParameters {
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum number of tokens to generate.
    pub max_tokens: u32,
}

impl Default for ChatParameters {
    fn default() -> Self {
        Self { temperature: 0.7, max_tokens: 512 }
    }
}

/// Chat-completions client for OpenAI-compatible servers.
#[derive(Debug, Clone)]
pub struct ChatClient {
    /// The model name passed through to the server.
    model_id: String,
    /// Bearer token, if the server requires one.
    api_key: Option<String>,
    /// Generation parameters.
    parameters: ChatParameters,
    /// HTTP client for making requests.
    client: Client,
}

impl ChatClient {
    /// Creates a new client for the given model.
    #[must_use]
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            api_key: None,
            parameters: ChatParameters::default(),
            client: Client::new(),
        }
    }

    /// Sets the API key sent as a bearer token.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the generation parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: ChatParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Returns the configured model name.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

// Chat completions API request/response structures
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[async_trait]
impl RemoteClient for ChatClient {
    async fn call(&self, endpoint: &Endpoint, payload: &str) -> Result<String, ClientError> {
        debug!(
            endpoint = %endpoint.name,
            model_id = %self.model_id,
            payload_len = payload.len(),
            "ChatClient sending completion request"
        );

        let url = format!("{}/chat/completions", endpoint.url.trim_end_matches('/'));

        let request_body = ChatRequest {
            model: self.model_id.clone(),
            messages: vec![ChatMessage { role: "user".to_string(), content: payload.to_string() }],
            temperature: self.parameters.temperature,
            max_tokens: self.parameters.max_tokens,
        };

        let mut request = self.client.post(&url).json(&request_body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, endpoint = %endpoint, "Failed to reach chat endpoint");
            if e.is_connect() {
                ClientError::RequestError(format!("endpoint {} not reachable", endpoint))
            } else {
                ClientError::RequestError(format!("network error: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text =
                response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            error!(
                status = %status,
                endpoint = %endpoint.name,
                error = %error_text,
                "Chat endpoint returned error status"
            );
            return Err(ClientError::ResponseError(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse chat completion response");
            ClientError::SerializationError(format!("failed to parse response: {}", e))
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ClientError::ResponseError("response contained no choices".to_string()))
    }
}
