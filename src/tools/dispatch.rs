use crate::tools::registry::ActionRegistry;
use crate::tools::types::{
    ActionCall, ActionContext, ActionError, ActionResult, ToolInputSchema,
};
use serde_json::Value;
use std::sync::Arc;

/// Applies one LLM turn's batch of proposed action calls, in order, against
/// the conversation's form state.
///
/// Every inbound call is untrusted: unknown names and schema mismatches are
/// recorded as failed results without touching state, and a failure never
/// aborts the remaining calls or rolls back earlier ones. Each call observes
/// the effects of every prior call in the same batch.
pub struct DispatchEngine {
    registry: Arc<ActionRegistry>,
}

impl DispatchEngine {
    pub fn new(registry: Arc<ActionRegistry>) -> Self {
        DispatchEngine { registry }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub async fn run_batch(
        &self,
        calls: &[ActionCall],
        context: &ActionContext,
    ) -> Vec<ActionResult> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let result = self.run_one(call, context).await;
            if result.success {
                log::info!("[DISPATCH] {} ok: {}", call.name, result.summary);
            } else {
                log::warn!("[DISPATCH] {} failed: {}", call.name, result.summary);
            }
            results.push(result);
        }
        results
    }

    async fn run_one(&self, call: &ActionCall, context: &ActionContext) -> ActionResult {
        let action = match self.registry.get(&call.name) {
            Some(a) => a,
            None => return ActionResult::fail(&call.name, ActionError::unknown_action(&call.name)),
        };

        let args = match &call.arguments {
            Some(v) => v.clone(),
            None => {
                return ActionResult::fail(
                    &call.name,
                    ActionError::invalid_arguments("Arguments were not valid JSON"),
                )
            }
        };

        if let Err(err) = validate_arguments(&action.definition().input_schema, &args) {
            return ActionResult::fail(&call.name, err);
        }

        match action.execute(args, context).await {
            Ok(outcome) => ActionResult::ok(&call.name, outcome),
            Err(err) => ActionResult::fail(&call.name, err),
        }
    }
}

/// Validate an argument object against a declared parameter schema: required
/// parameters present, declared types respected, enum membership honored.
/// Parameters the schema does not declare are ignored.
pub fn validate_arguments(schema: &ToolInputSchema, args: &Value) -> Result<(), ActionError> {
    let map = match args {
        Value::Object(map) => map,
        Value::Null if schema.required.is_empty() => return Ok(()),
        _ => {
            return Err(ActionError::invalid_arguments(
                "Arguments must be a JSON object",
            ))
        }
    };

    for name in &schema.required {
        if !map.contains_key(name) {
            return Err(ActionError::invalid_arguments(format!(
                "Missing required parameter '{}'",
                name
            )));
        }
    }

    for (name, value) in map {
        let property = match schema.properties.get(name) {
            Some(p) => p,
            None => continue,
        };

        let type_ok = match property.schema_type.as_str() {
            "string" => value.is_string(),
            "integer" => value.as_i64().is_some() || value.as_u64().is_some(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            _ => true,
        };
        if !type_ok {
            return Err(ActionError::invalid_arguments(format!(
                "Parameter '{}' must be of type {}",
                name, property.schema_type
            )));
        }

        if let (Some(allowed), Some(s)) = (&property.enum_values, value.as_str()) {
            if !allowed.iter().any(|v| v == s) {
                return Err(ActionError::invalid_arguments(format!(
                    "Parameter '{}' must be one of: {}",
                    name,
                    allowed.join(", ")
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FormState;
    use crate::tools::create_default_registry;
    use crate::tools::types::ErrorKind;
    use parking_lot::Mutex;
    use serde_json::json;

    fn engine() -> DispatchEngine {
        DispatchEngine::new(Arc::new(create_default_registry()))
    }

    fn context() -> ActionContext {
        ActionContext::new(Arc::new(Mutex::new(FormState::new())))
    }

    fn call(name: &str, arguments: Value) -> ActionCall {
        ActionCall {
            id: format!("call_{}", name),
            name: name.to_string(),
            arguments: Some(arguments),
        }
    }

    fn percentages(ctx: &ActionContext) -> Vec<u32> {
        ctx.form.lock().milestones.iter().map(|m| m.percentage).collect()
    }

    #[tokio::test]
    async fn unknown_action_does_not_abort_the_batch() {
        let engine = engine();
        let ctx = context();

        let calls = vec![
            call("add_milestone", json!({})),
            call("warp_to_mars", json!({})),
            call("update_milestone", json!({"index": 0, "percentage": 40})),
        ];
        let results = engine.run_batch(&calls, &ctx).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].success);
        assert!(!results[1].success);
        assert_eq!(results[1].error, Some(ErrorKind::UnknownAction));
        assert!(results[2].success);

        // Call 1 grew the list to [34,33,33]; call 3 pinned index 0 to 40.
        assert_eq!(percentages(&ctx), vec![40, 30, 30]);
    }

    #[tokio::test]
    async fn schema_mismatches_are_invalid_arguments() {
        let engine = engine();
        let ctx = context();

        let results = engine
            .run_batch(
                &[
                    call("update_milestone", json!({"index": 0, "percentage": "forty"})),
                    call("navigate_to_page", json!({"page": "settings"})),
                    call("fill_form_field", json!({"field": "amount"})),
                ],
                &ctx,
            )
            .await;

        for result in &results {
            assert!(!result.success);
            assert_eq!(result.error, Some(ErrorKind::InvalidArguments));
        }
        // None of them touched state.
        assert_eq!(*ctx.form.lock(), FormState::new());
    }

    #[tokio::test]
    async fn unparseable_arguments_are_invalid_arguments() {
        let engine = engine();
        let ctx = context();

        let calls = vec![ActionCall {
            id: "call_0".to_string(),
            name: "add_milestone".to_string(),
            arguments: None,
        }];
        let results = engine.run_batch(&calls, &ctx).await;
        assert_eq!(results[0].error, Some(ErrorKind::InvalidArguments));
        assert_eq!(percentages(&ctx), vec![50, 50]);
    }

    #[tokio::test]
    async fn store_errors_are_reported_per_call() {
        let engine = engine();
        let ctx = context();

        let results = engine
            .run_batch(
                &[
                    call("fill_form_field", json!({"field": "payeeAddress", "value": "0x123"})),
                    call("remove_milestone", json!({"index": 7})),
                    call("update_milestone", json!({"index": -1, "percentage": 40})),
                ],
                &ctx,
            )
            .await;

        assert_eq!(results[0].error, Some(ErrorKind::Validation));
        assert_eq!(results[1].error, Some(ErrorKind::IndexOutOfRange));
        assert_eq!(results[2].error, Some(ErrorKind::IndexOutOfRange));
    }

    #[tokio::test]
    async fn read_only_actions_return_snapshots() {
        let engine = engine();
        let ctx = context();

        let results = engine
            .run_batch(
                &[
                    call("fill_form_field", json!({"field": "amount", "value": "250"})),
                    call("get_form_fields", json!({})),
                    call("get_milestones", json!({})),
                    call("get_current_page", json!({})),
                ],
                &ctx,
            )
            .await;

        assert!(results.iter().all(|r| r.success));
        let fields = results[1].data.as_ref().unwrap();
        assert_eq!(fields["amount"], json!(250.0));
        assert_eq!(fields["currentPage"], json!("home"));
        let milestones = results[2].data.as_ref().unwrap();
        assert_eq!(milestones["total"], json!(100));
    }

    #[test]
    fn validate_arguments_accepts_null_for_parameterless_actions() {
        let schema = ToolInputSchema::default();
        assert!(validate_arguments(&schema, &Value::Null).is_ok());
        assert!(validate_arguments(&schema, &json!({})).is_ok());
        assert!(validate_arguments(&schema, &json!([1, 2])).is_err());
    }
}
