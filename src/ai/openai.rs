use crate::ai::{AiError, ChatMessage};
use crate::tools::types::{ActionCall, ToolDefinition, ToolInputSchema};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// OpenAI-compatible chat completions client. One request per turn, bounded
/// by the client timeout; a failed call is classified and returned without
/// automatic retry.
#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    auth_headers: header::HeaderMap,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Serialize)]
struct OpenAITool<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: OpenAIFunction<'a>,
}

#[derive(Serialize)]
struct OpenAIFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a ToolInputSchema,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorBody {
    message: String,
}

/// A parsed completion: the raw body kept verbatim for passthrough to the
/// caller, plus the extracted assistant text and proposed tool calls.
#[derive(Debug, Clone)]
pub struct Completion {
    pub raw: Value,
    pub content: Option<String>,
    pub tool_calls: Vec<ActionCall>,
}

impl OpenAIClient {
    pub fn new(api_key: &str, endpoint: &str, model: &str) -> Result<Self, String> {
        let mut auth_headers = header::HeaderMap::new();
        auth_headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        let auth_value = header::HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| format!("Invalid API key format: {}", e))?;
        auth_headers.insert(header::AUTHORIZATION, auth_value);

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            auth_headers,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one chat completion request with the action declarations and
    /// automatic tool selection. Returns the raw completion body alongside
    /// the extracted tool calls.
    pub async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<Completion, AiError> {
        let openai_tools: Option<Vec<OpenAITool>> = if tools.is_empty() {
            None
        } else {
            Some(
                tools
                    .iter()
                    .map(|t| OpenAITool {
                        tool_type: "function",
                        function: OpenAIFunction {
                            name: &t.name,
                            description: &t.description,
                            parameters: &t.input_schema,
                        },
                    })
                    .collect(),
            )
        };

        let request = CompletionRequest {
            model: &self.model,
            messages,
            tool_choice: openai_tools.as_ref().map(|_| "auto"),
            tools: openai_tools,
        };

        log::info!(
            "[OPENAI] Sending request to {} with model {} ({} messages, {} tools)",
            self.endpoint,
            self.model,
            messages.len(),
            tools.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.auth_headers.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::new(format!("OpenAI API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<OpenAIErrorResponse>(&error_text) {
                Ok(body) => format!("OpenAI API error: {}", body.error.message),
                Err(_) => format!("OpenAI API returned error status: {}", status),
            };
            return Err(AiError::with_status(message, status.as_u16()));
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| AiError::new(format!("Failed to parse OpenAI response: {}", e)))?;

        parse_completion(raw)
    }
}

/// Extract the assistant message and proposed tool calls from a raw
/// completion body. A tool call whose argument string is not valid JSON is
/// kept with `arguments: None` so dispatch can report it instead of
/// guessing.
pub fn parse_completion(raw: Value) -> Result<Completion, AiError> {
    let message = raw
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| AiError::new("OpenAI API returned no choices"))?;

    let content = message
        .get("content")
        .and_then(|c| c.as_str())
        .map(|s| s.to_string());

    let mut tool_calls = Vec::new();
    if let Some(calls) = message.get("tool_calls").and_then(|t| t.as_array()) {
        for call in calls {
            let id = call
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let function = call.get("function");
            let name = function
                .and_then(|f| f.get("name"))
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let arguments = function
                .and_then(|f| f.get("arguments"))
                .and_then(|v| v.as_str())
                .and_then(|s| {
                    if s.trim().is_empty() {
                        Some(Value::Object(Default::default()))
                    } else {
                        serde_json::from_str(s).ok()
                    }
                });
            tool_calls.push(ActionCall { id, name, arguments });
        }
    }

    log::debug!(
        "[OPENAI] Response - content_len: {}, tool_calls: {}",
        content.as_ref().map(|c| c.len()).unwrap_or(0),
        tool_calls.len()
    );

    Ok(Completion { raw, content, tool_calls })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_text_and_tool_calls() {
        let raw = json!({
            "choices": [{
                "message": {
                    "content": "On it!",
                    "tool_calls": [
                        {
                            "id": "call_1",
                            "type": "function",
                            "function": {
                                "name": "fill_form_field",
                                "arguments": "{\"field\":\"amount\",\"value\":\"100\"}"
                            }
                        },
                        {
                            "id": "call_2",
                            "type": "function",
                            "function": { "name": "add_milestone", "arguments": "" }
                        }
                    ]
                }
            }],
            "usage": { "total_tokens": 42 }
        });

        let completion = parse_completion(raw.clone()).unwrap();
        assert_eq!(completion.raw, raw);
        assert_eq!(completion.content.as_deref(), Some("On it!"));
        assert_eq!(completion.tool_calls.len(), 2);
        assert_eq!(completion.tool_calls[0].name, "fill_form_field");
        assert_eq!(
            completion.tool_calls[0].arguments,
            Some(json!({"field": "amount", "value": "100"}))
        );
        assert_eq!(completion.tool_calls[1].arguments, Some(json!({})));
    }

    #[test]
    fn malformed_argument_strings_are_kept_as_none() {
        let raw = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "update_milestone", "arguments": "{not json" }
                    }]
                }
            }]
        });

        let completion = parse_completion(raw).unwrap();
        assert_eq!(completion.tool_calls[0].arguments, None);
    }

    #[test]
    fn missing_choices_is_a_malformed_response() {
        assert!(parse_completion(json!({ "object": "error" })).is_err());
        assert!(parse_completion(json!({ "choices": [] })).is_err());
    }
}
