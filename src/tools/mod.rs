pub mod builtin;
pub mod dispatch;
pub mod registry;
pub mod types;

pub use dispatch::DispatchEngine;
pub use registry::{Action, ActionRegistry};
pub use types::{
    ActionCall, ActionContext, ActionError, ActionOutcome, ActionResult, ErrorKind,
    PropertySchema, SharedFormState, ToolDefinition, ToolInputSchema,
};

use std::sync::Arc;

/// Register the full action set to a registry
fn register_all_actions(registry: &mut ActionRegistry) {
    // Navigation
    registry.register(Arc::new(builtin::NavigateToPageAction::new()));
    registry.register(Arc::new(builtin::GoHomeAction::new()));
    registry.register(Arc::new(builtin::GetCurrentPageAction::new()));

    // Contract creation form
    registry.register(Arc::new(builtin::GetFormFieldsAction::new()));
    registry.register(Arc::new(builtin::FillFormFieldAction::new()));

    // Payment milestones
    registry.register(Arc::new(builtin::GetMilestonesAction::new()));
    registry.register(Arc::new(builtin::AddMilestoneAction::new()));
    registry.register(Arc::new(builtin::UpdateMilestoneAction::new()));
    registry.register(Arc::new(builtin::RemoveMilestoneAction::new()));

    // Wallet
    registry.register(Arc::new(builtin::ConnectWalletAction::new()));
    registry.register(Arc::new(builtin::GetWalletStatusAction::new()));
}

/// Create a new ActionRegistry with the full action set registered
pub fn create_default_registry() -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    register_all_actions(&mut registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_exposes_the_full_action_set() {
        let registry = create_default_registry();
        assert_eq!(registry.len(), 11);
        for name in [
            "navigate_to_page",
            "go_home",
            "get_current_page",
            "get_form_fields",
            "fill_form_field",
            "get_milestones",
            "add_milestone",
            "update_milestone",
            "remove_milestone",
            "connect_wallet",
            "get_wallet_status",
        ] {
            assert!(registry.has_action(name), "missing action {}", name);
        }
    }
}
