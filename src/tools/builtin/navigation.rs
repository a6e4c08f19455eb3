use crate::state::Page;
use crate::tools::registry::Action;
use crate::tools::types::{
    ActionContext, ActionError, ActionOutcome, PropertySchema, ToolDefinition, ToolInputSchema,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Navigate to a specific Deal-Fi page.
pub struct NavigateToPageAction {
    definition: ToolDefinition,
}

#[derive(Debug, Deserialize)]
struct NavigateParams {
    page: String,
}

impl NavigateToPageAction {
    pub fn new() -> Self {
        let mut properties = HashMap::new();
        properties.insert(
            "page".to_string(),
            PropertySchema {
                schema_type: "string".to_string(),
                description: "Destination page: home (start), create (create contract), manage (manage contracts)".to_string(),
                enum_values: Some(vec![
                    "home".to_string(),
                    "create".to_string(),
                    "manage".to_string(),
                ]),
            },
        );

        NavigateToPageAction {
            definition: ToolDefinition {
                name: "navigate_to_page".to_string(),
                description: "Navigates to a specific Deal-Fi page. Use when the user asks to go somewhere.".to_string(),
                input_schema: ToolInputSchema {
                    schema_type: "object".to_string(),
                    properties,
                    required: vec!["page".to_string()],
                },
            },
        }
    }
}

#[async_trait]
impl Action for NavigateToPageAction {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(
        &self,
        params: Value,
        context: &ActionContext,
    ) -> Result<ActionOutcome, ActionError> {
        let params: NavigateParams = serde_json::from_value(params)
            .map_err(|e| ActionError::invalid_arguments(e.to_string()))?;
        let page = Page::parse(&params.page).ok_or_else(|| {
            ActionError::invalid_arguments(format!(
                "Invalid page '{}': valid pages are home, create, manage",
                params.page
            ))
        })?;

        context.form.lock().navigate_to(page);
        Ok(ActionOutcome::with_data(
            format!("Navigated to {}.", page.description()),
            json!({ "currentPage": page }),
        ))
    }
}

/// Go back to the home page.
pub struct GoHomeAction {
    definition: ToolDefinition,
}

impl GoHomeAction {
    pub fn new() -> Self {
        GoHomeAction {
            definition: ToolDefinition {
                name: "go_home".to_string(),
                description: "Returns to the Deal-Fi home page. Use when the user asks to go back to the start.".to_string(),
                input_schema: ToolInputSchema::default(),
            },
        }
    }
}

#[async_trait]
impl Action for GoHomeAction {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(
        &self,
        _params: Value,
        context: &ActionContext,
    ) -> Result<ActionOutcome, ActionError> {
        context.form.lock().navigate_to(Page::Home);
        Ok(ActionOutcome::with_data(
            "Navigated to the home page.".to_string(),
            json!({ "currentPage": Page::Home }),
        ))
    }
}

/// Report which page the user is currently on.
pub struct GetCurrentPageAction {
    definition: ToolDefinition,
}

impl GetCurrentPageAction {
    pub fn new() -> Self {
        GetCurrentPageAction {
            definition: ToolDefinition {
                name: "get_current_page".to_string(),
                description: "Gets information about the page the user is currently on."
                    .to_string(),
                input_schema: ToolInputSchema::default(),
            },
        }
    }
}

#[async_trait]
impl Action for GetCurrentPageAction {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(
        &self,
        _params: Value,
        context: &ActionContext,
    ) -> Result<ActionOutcome, ActionError> {
        let page = context.form.lock().current_page;
        Ok(ActionOutcome::with_data(
            format!("You are on {}.", page.description()),
            json!({ "currentPage": page }),
        ))
    }
}
