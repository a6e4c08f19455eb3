use crate::state::FormState;
use crate::tools::registry::Action;
use crate::tools::types::{
    ActionContext, ActionError, ActionOutcome, PropertySchema, ToolDefinition, ToolInputSchema,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

fn index_property() -> PropertySchema {
    PropertySchema {
        schema_type: "integer".to_string(),
        description: "Milestone index (starting at 0). Use get_milestones to see the available indexes.".to_string(),
        enum_values: None,
    }
}

fn milestones_snapshot(state: &FormState) -> Value {
    json!({
        "milestones": state
            .milestones
            .iter()
            .enumerate()
            .map(|(index, m)| json!({ "index": index, "percentage": m.percentage }))
            .collect::<Vec<_>>(),
        "total": state.milestone_total(),
    })
}

fn milestones_summary(state: &FormState) -> String {
    let stages = state
        .milestones
        .iter()
        .enumerate()
        .map(|(i, m)| format!("milestone {}: {}%", i + 1, m.percentage))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Milestones: {}. Total: {}%.", stages, state.milestone_total())
}

fn index_from_i64(index: i64, state: &FormState) -> Result<usize, ActionError> {
    usize::try_from(index).map_err(|_| {
        ActionError::index_out_of_range(format!(
            "Invalid milestone index {}: available indexes are 0 to {}",
            index,
            state.milestones.len() - 1
        ))
    })
}

/// Read-only snapshot of the configured payment milestones.
pub struct GetMilestonesAction {
    definition: ToolDefinition,
}

impl GetMilestonesAction {
    pub fn new() -> Self {
        GetMilestonesAction {
            definition: ToolDefinition {
                name: "get_milestones".to_string(),
                description: "Gets the payment milestones configured in the form.".to_string(),
                input_schema: ToolInputSchema::default(),
            },
        }
    }
}

#[async_trait]
impl Action for GetMilestonesAction {
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
            milestones_summary(&state),
            milestones_snapshot(&state),
        ))
    }
}

/// Append one milestone; percentages are rebalanced automatically.
pub struct AddMilestoneAction {
    definition: ToolDefinition,
}

impl AddMilestoneAction {
    pub fn new() -> Self {
        AddMilestoneAction {
            definition: ToolDefinition {
                name: "add_milestone".to_string(),
                description: "Adds a new payment milestone to the form. The system redistributes the percentages automatically.".to_string(),
                input_schema: ToolInputSchema::default(),
            },
        }
    }
}

#[async_trait]
impl Action for AddMilestoneAction {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(
        &self,
        _params: Value,
        context: &ActionContext,
    ) -> Result<ActionOutcome, ActionError> {
        let mut state = context.form.lock();
        state.add_milestone()?;
        Ok(ActionOutcome::with_data(
            format!("Milestone added. {}", milestones_summary(&state)),
            milestones_snapshot(&state),
        ))
    }
}

/// Pin one milestone's percentage; the others are rebalanced.
pub struct UpdateMilestoneAction {
    definition: ToolDefinition,
}

#[derive(Debug, Deserialize)]
struct UpdateParams {
    index: i64,
    percentage: i64,
}

impl UpdateMilestoneAction {
    pub fn new() -> Self {
        let mut properties = HashMap::new();
        properties.insert("index".to_string(), index_property());
        properties.insert(
            "percentage".to_string(),
            PropertySchema {
                schema_type: "integer".to_string(),
                description: "New percentage for the milestone (1-100). All milestones must sum to 100%.".to_string(),
                enum_values: None,
            },
        );

        UpdateMilestoneAction {
            definition: ToolDefinition {
                name: "update_milestone".to_string(),
                description: "Updates one milestone's percentage. The milestones must sum to 100% in total.".to_string(),
                input_schema: ToolInputSchema {
                    schema_type: "object".to_string(),
                    properties,
                    required: vec!["index".to_string(), "percentage".to_string()],
                },
            },
        }
    }
}

#[async_trait]
impl Action for UpdateMilestoneAction {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(
        &self,
        params: Value,
        context: &ActionContext,
    ) -> Result<ActionOutcome, ActionError> {
        let params: UpdateParams = serde_json::from_value(params)
            .map_err(|e| ActionError::invalid_arguments(e.to_string()))?;

        let mut state = context.form.lock();
        let index = index_from_i64(params.index, &state)?;
        let percentage = u32::try_from(params.percentage)
            .map_err(|_| ActionError::validation("Percentage must be between 1 and 100"))?;
        state.update_milestone(index, percentage)?;
        Ok(ActionOutcome::with_data(
            format!(
                "Milestone {} updated to {}%. {}",
                index + 1,
                percentage,
                milestones_summary(&state)
            ),
            milestones_snapshot(&state),
        ))
    }
}

/// Delete one milestone; the rest are rebalanced.
pub struct RemoveMilestoneAction {
    definition: ToolDefinition,
}

#[derive(Debug, Deserialize)]
struct RemoveParams {
    index: i64,
}

impl RemoveMilestoneAction {
    pub fn new() -> Self {
        let mut properties = HashMap::new();
        properties.insert("index".to_string(), index_property());

        RemoveMilestoneAction {
            definition: ToolDefinition {
                name: "remove_milestone".to_string(),
                description: "Removes a payment milestone. Not possible when only one milestone remains.".to_string(),
                input_schema: ToolInputSchema {
                    schema_type: "object".to_string(),
                    properties,
                    required: vec!["index".to_string()],
                },
            },
        }
    }
}

#[async_trait]
impl Action for RemoveMilestoneAction {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(
        &self,
        params: Value,
        context: &ActionContext,
    ) -> Result<ActionOutcome, ActionError> {
        let params: RemoveParams = serde_json::from_value(params)
            .map_err(|e| ActionError::invalid_arguments(e.to_string()))?;

        let mut state = context.form.lock();
        let index = index_from_i64(params.index, &state)?;
        state.remove_milestone(index)?;
        Ok(ActionOutcome::with_data(
            format!("Milestone {} removed. {}", index + 1, milestones_summary(&state)),
            milestones_snapshot(&state),
        ))
    }
}
