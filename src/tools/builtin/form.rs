use crate::state::{FormField, FormState};
use crate::tools::registry::Action;
use crate::tools::types::{
    ActionContext, ActionError, ActionOutcome, PropertySchema, ToolDefinition, ToolInputSchema,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

fn scalar_fields_snapshot(state: &FormState) -> Value {
    json!({
        "currentPage": state.current_page,
        "payeeAddress": state.payee_address,
        "amount": state.amount,
        "duration": state.duration,
    })
}

fn scalar_fields_summary(state: &FormState) -> String {
    let payee = state.payee_address.as_deref().unwrap_or("(empty)").to_string();
    let amount = state
        .amount
        .map(|a| format!("{} USDC", a))
        .unwrap_or_else(|| "(empty)".to_string());
    let duration = state
        .duration
        .map(|d| format!("{} days", d))
        .unwrap_or_else(|| "(empty)".to_string());
    format!(
        "Form state: payee address {}; total amount {}; duration {}.",
        payee, amount, duration
    )
}

/// Read-only snapshot of the contract creation form's scalar fields.
pub struct GetFormFieldsAction {
    definition: ToolDefinition,
}

impl GetFormFieldsAction {
    pub fn new() -> Self {
        GetFormFieldsAction {
            definition: ToolDefinition {
                name: "get_form_fields".to_string(),
                description: "Gets the current values of the contract creation form fields. Use when the user asks what is filled in.".to_string(),
                input_schema: ToolInputSchema::default(),
            },
        }
    }
}

#[async_trait]
impl Action for GetFormFieldsAction {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(
        &self,
        _params: Value,
        context: &ActionContext,
    ) -> Result<ActionOutcome, ActionError> {
        let state = context.form.lock();
        Ok(ActionOutcome::with_data(
            scalar_fields_summary(&state),
            scalar_fields_snapshot(&state),
        ))
    }
}

/// Validate and fill one scalar field of the contract creation form.
pub struct FillFormFieldAction {
    definition: ToolDefinition,
}

#[derive(Debug, Deserialize)]
struct FillParams {
    field: String,
    value: String,
}

impl FillFormFieldAction {
    pub fn new() -> Self {
        let mut properties = HashMap::new();
        properties.insert(
            "field".to_string(),
            PropertySchema {
                schema_type: "string".to_string(),
                description: "Field to fill: payeeAddress (recipient address), amount (value in USDC), duration (deadline in days)".to_string(),
                enum_values: Some(vec![
                    "payeeAddress".to_string(),
                    "amount".to_string(),
                    "duration".to_string(),
                ]),
            },
        );
        properties.insert(
            "value".to_string(),
            PropertySchema {
                schema_type: "string".to_string(),
                description: "Value to set. For amount use a number (e.g. '100'). For duration use a number of days (e.g. '30'). For payeeAddress use an Ethereum address (e.g. '0x...')".to_string(),
                enum_values: None,
            },
        );

        FillFormFieldAction {
            definition: ToolDefinition {
                name: "fill_form_field".to_string(),
                description: "Fills one field of the contract creation form. Use when the user provides information to fill in.".to_string(),
                input_schema: ToolInputSchema {
                    schema_type: "object".to_string(),
                    properties,
                    required: vec!["field".to_string(), "value".to_string()],
                },
            },
        }
    }
}

#[async_trait]
impl Action for FillFormFieldAction {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(
        &self,
        params: Value,
        context: &ActionContext,
    ) -> Result<ActionOutcome, ActionError> {
        let params: FillParams = serde_json::from_value(params)
            .map_err(|e| ActionError::invalid_arguments(e.to_string()))?;
        let field = FormField::parse(&params.field).ok_or_else(|| {
            ActionError::invalid_arguments(format!(
                "Invalid field '{}': valid fields are payeeAddress, amount, duration",
                params.field
            ))
        })?;

        let mut state = context.form.lock();
        state.fill_field(field, &params.value)?;
        Ok(ActionOutcome::with_data(
            format!("Filled {} with: {}", field.label(), params.value),
            scalar_fields_snapshot(&state),
        ))
    }
}
