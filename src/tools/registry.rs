use crate::tools::types::{ActionContext, ActionError, ActionOutcome, ToolDefinition};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Trait that all callable actions implement.
#[async_trait]
pub trait Action: Send + Sync {
    /// Returns the action definition sent to the AI API
    fn definition(&self) -> ToolDefinition;

    /// Executes the action with already schema-validated arguments
    async fn execute(
        &self,
        params: Value,
        context: &ActionContext,
    ) -> Result<ActionOutcome, ActionError>;

    fn name(&self) -> String {
        self.definition().name
    }
}

/// Registry that holds the fixed set of actions the model may call.
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        ActionRegistry { actions: HashMap::new() }
    }

    pub fn register(&mut self, action: Arc<dyn Action>) {
        let name = action.definition().name;
        self.actions.insert(name, action);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(name).cloned()
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Definitions for all registered actions (for sending to the AI)
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.actions.values().map(|a| a.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::types::ToolInputSchema;

    struct MockAction {
        definition: ToolDefinition,
    }

    impl MockAction {
        fn new(name: &str) -> Self {
            MockAction {
                definition: ToolDefinition {
                    name: name.to_string(),
                    description: format!("Mock {} action", name),
                    input_schema: ToolInputSchema::default(),
                },
            }
        }
    }

    #[async_trait]
    impl Action for MockAction {
        fn definition(&self) -> ToolDefinition {
            self.definition.clone()
        }

        async fn execute(
            &self,
            _params: Value,
            _context: &ActionContext,
        ) -> Result<ActionOutcome, ActionError> {
            Ok(ActionOutcome::text("mock result"))
        }
    }

    #[test]
    fn register_and_look_up() {
        let mut registry = ActionRegistry::new();
        registry.register(Arc::new(MockAction::new("test_action")));

        assert!(registry.has_action("test_action"));
        assert!(!registry.has_action("nonexistent"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.definitions()[0].name, "test_action");
    }
}
