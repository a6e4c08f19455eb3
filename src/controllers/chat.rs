use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::ChatMessage;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/chat").route(web::post().to(chat)));
}

/// Main chat endpoint. Forwards the caller's message history to the LLM,
/// dispatches any returned tool calls against the form state, and returns
/// the raw completion object (with a sibling `tool_results` array when calls
/// were dispatched). An upstream failure is a structured 500 and a no-op on
/// form state.
async fn chat(state: web::Data<AppState>, body: web::Json<ChatRequest>) -> impl Responder {
    let context = state.action_context();
    match state.gateway.run_turn(body.into_inner().messages, &context).await {
        Ok(turn) => {
            let mut payload = turn.completion;
            if !turn.results.is_empty() {
                if let Value::Object(map) = &mut payload {
                    map.insert("tool_results".to_string(), json!(turn.results));
                }
            }
            HttpResponse::Ok().json(payload)
        }
        Err(err) => {
            log::error!("[CHAT] Upstream failure: {}", err);
            HttpResponse::InternalServerError().json(json!({
                "error": {
                    "message": format!("API error: {}", err.message),
                    "type": "api_error",
                    "model_used": state.config.model,
                }
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn upstream_failure_returns_the_structured_error_payload() {
        // The test app state points the client at an unreachable endpoint.
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(crate::test_app_state()))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/chat")
            .set_json(json!({ "messages": [{ "role": "user", "content": "hi" }] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 500);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["type"], "api_error");
        assert_eq!(body["error"]["model_used"], "gpt-4o");
        assert!(body["error"]["message"].as_str().unwrap().starts_with("API error:"));
    }
}
