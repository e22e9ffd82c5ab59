//! Answer synthesis: prompt assembly plus the hosted completion call.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::types::RagError;

/// Returned verbatim whenever the completion provider cannot be reached.
pub const FALLBACK_ANSWER: &str =
    "The answer service is temporarily unavailable. Please try again in a moment.";

const DEFAULT_BASE_URL: &str = "https://api.cohere.ai";
const DEFAULT_MODEL: &str = "command";
const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_MAX_TOKENS: u32 = 500;

/// Renders retrieved chunks and the question into the completion prompt.
#[derive(Clone, Debug)]
pub struct PromptTemplate {
    preamble: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            preamble: "You are an assistant for questions about a book. \
                       Answer the user's question using only the context provided below. \
                       If the context does not contain the information needed to answer, \
                       say so clearly instead of guessing."
                .to_string(),
        }
    }
}

impl PromptTemplate {
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
        }
    }

    /// Builds the full prompt. Context chunks are separated by blank lines
    /// inside a delimited block so the model can tell corpus text from
    /// instructions.
    pub fn render(&self, context: &[String], question: &str) -> String {
        let context = context.join("\n\n");
        format!(
            "{preamble}\n\n\
             Context information is below:\n\
             ---------------------\n\
             {context}\n\
             ---------------------\n\n\
             Question: {question}\n\n\
             Answer:",
            preamble = self.preamble,
        )
    }
}

/// Seam between the answer path and the hosted chat/completion model.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String, RagError>;
}

/// Client for the provider's `POST /v1/chat` endpoint.
#[derive(Clone, Debug)]
pub struct CohereChatClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl CohereChatClient {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    text: String,
}

#[async_trait]
impl CompletionProvider for CohereChatClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, RagError> {
        let request = ChatRequest {
            message: prompt,
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response: ChatResponse = self
            .client
            .post(format!("{}/v1/chat", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()
            .map_err(|err| RagError::Completion(err.to_string()))?
            .json()
            .await
            .map_err(|err| RagError::Completion(err.to_string()))?;

        Ok(response.text)
    }
}

/// Template + provider + fixed degradation answer.
///
/// [`Responder::answer`] never fails: a provider error is logged and the
/// fallback string is returned instead.
#[derive(Clone)]
pub struct Responder {
    template: PromptTemplate,
    provider: Arc<dyn CompletionProvider>,
    fallback: String,
}

impl Responder {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            template: PromptTemplate::default(),
            provider,
            fallback: FALLBACK_ANSWER.to_string(),
        }
    }

    #[must_use]
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub async fn answer(&self, question: &str, context: &[String]) -> String {
        let prompt = self.template.render(context, question);
        match self.provider.complete(&prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    "completion failed, returning fallback answer: {err}"
                );
                self.fallback.clone()
            }
        }
    }
}
