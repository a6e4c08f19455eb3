use crate::ai::{AiError, ChatMessage, OpenAIClient};
use crate::prompts::SYSTEM_PROMPT;
use crate::tools::dispatch::DispatchEngine;
use crate::tools::registry::ActionRegistry;
use crate::tools::types::{ActionContext, ActionResult};
use serde_json::Value;
use std::sync::Arc;

/// One turn's outcome: the raw completion body for passthrough, plus the
/// results of any tool calls that were dispatched before returning.
#[derive(Debug)]
pub struct TurnOutcome {
    pub completion: Value,
    pub results: Vec<ActionResult>,
}

/// Conversation gateway: fixes up the inbound history, calls the LLM with
/// the action declarations, and routes returned tool calls through the
/// dispatch engine synchronously. An upstream failure aborts the turn before
/// any dispatch, so form state is untouched.
pub struct ConversationGateway {
    client: OpenAIClient,
    dispatch: DispatchEngine,
}

impl ConversationGateway {
    pub fn new(client: OpenAIClient, registry: Arc<ActionRegistry>) -> Self {
        ConversationGateway {
            client,
            dispatch: DispatchEngine::new(registry),
        }
    }

    pub async fn run_turn(
        &self,
        mut messages: Vec<ChatMessage>,
        context: &ActionContext,
    ) -> Result<TurnOutcome, AiError> {
        ensure_system_prompt(&mut messages);

        let definitions = self.dispatch.registry().definitions();
        let completion = self.client.chat_completion(&messages, &definitions).await?;

        let results = if completion.tool_calls.is_empty() {
            Vec::new()
        } else {
            log::info!(
                "[AGENT] Dispatching {} tool call(s) from this turn",
                completion.tool_calls.len()
            );
            self.dispatch.run_batch(&completion.tool_calls, context).await
        };

        Ok(TurnOutcome { completion: completion.raw, results })
    }
}

/// Insert the fixed system instructions at position 0 unless the caller
/// already supplied a leading system message; an existing one is never
/// overwritten.
pub fn ensure_system_prompt(messages: &mut Vec<ChatMessage>) {
    if messages.first().map(ChatMessage::is_system) != Some(true) {
        messages.insert(0, ChatMessage::system(SYSTEM_PROMPT));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FormState;
    use crate::tools::create_default_registry;
    use parking_lot::Mutex;
    use serde_json::json;

    fn user(text: &str) -> ChatMessage {
        ChatMessage {
            role: "user".to_string(),
            content: Some(json!(text)),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    #[test]
    fn system_prompt_is_inserted_when_absent() {
        let mut messages = vec![user("hello")];
        ensure_system_prompt(&mut messages);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_system());
        assert_eq!(messages[1].role, "user");

        let mut empty = Vec::new();
        ensure_system_prompt(&mut empty);
        assert_eq!(empty.len(), 1);
        assert!(empty[0].is_system());
    }

    #[test]
    fn an_existing_system_message_is_kept() {
        let mut messages = vec![ChatMessage::system("custom instructions"), user("hi")];
        ensure_system_prompt(&mut messages);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, Some(json!("custom instructions")));
    }

    #[tokio::test]
    async fn an_upstream_failure_leaves_form_state_unchanged() {
        // Nothing listens on this port; the request fails before any dispatch.
        let client = OpenAIClient::new("test-key", "http://127.0.0.1:9/v1/chat/completions", "gpt-4o")
            .unwrap();
        let gateway = ConversationGateway::new(client, Arc::new(create_default_registry()));

        let form = Arc::new(Mutex::new(FormState::new()));
        let context = ActionContext::new(form.clone());
        let before = form.lock().clone();

        let result = gateway.run_turn(vec![user("add a milestone")], &context).await;
        assert!(result.is_err());
        assert_eq!(*form.lock(), before);
    }
}
