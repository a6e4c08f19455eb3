use crate::tools::registry::Action;
use crate::tools::types::{
    ActionContext, ActionError, ActionOutcome, ToolDefinition, ToolInputSchema,
};
use async_trait::async_trait;
use serde_json::{json, Value};

fn short_address(address: &str) -> String {
    if address.len() >= 42 {
        format!("{}...{}", &address[..6], &address[38..])
    } else {
        address.to_string()
    }
}

/// Request a wallet connection from the external provider. The connection
/// result arrives out-of-band through the wallet status event; this action
/// never waits for it.
pub struct ConnectWalletAction {
    definition: ToolDefinition,
}

impl ConnectWalletAction {
    pub fn new() -> Self {
        ConnectWalletAction {
            definition: ToolDefinition {
                name: "connect_wallet".to_string(),
                description: "Connects the user's MetaMask wallet. Use when the user asks to connect their wallet or MetaMask.".to_string(),
                input_schema: ToolInputSchema::default(),
            },
        }
    }
}

#[async_trait]
impl Action for ConnectWalletAction {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(
        &self,
        _params: Value,
        context: &ActionContext,
    ) -> Result<ActionOutcome, ActionError> {
        let mut state = context.form.lock();
        if state.wallet.connected {
            let address = state.wallet.address.clone().unwrap_or_default();
            return Ok(ActionOutcome::with_data(
                format!("Wallet is already connected: {}", short_address(&address)),
                json!({ "connected": true, "address": address }),
            ));
        }

        state.request_wallet_connection();
        Ok(ActionOutcome::with_data(
            "Wallet connection requested. MetaMask will open a window the user must approve; the connection is not confirmed yet.".to_string(),
            json!({ "connected": false, "connectRequested": true }),
        ))
    }
}

/// Report the current wallet connection status.
pub struct GetWalletStatusAction {
    definition: ToolDefinition,
}

impl GetWalletStatusAction {
    pub fn new() -> Self {
        GetWalletStatusAction {
            definition: ToolDefinition {
                name: "get_wallet_status".to_string(),
                description: "Gets the current wallet connection status (connected or not, and the address when connected).".to_string(),
                input_schema: ToolInputSchema::default(),
            },
        }
    }
}

#[async_trait]
impl Action for GetWalletStatusAction {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(
        &self,
        _params: Value,
        context: &ActionContext,
    ) -> Result<ActionOutcome, ActionError> {
        let state = context.form.lock();
        let summary = match (&state.wallet.connected, &state.wallet.address) {
            (true, Some(address)) => format!(
                "Wallet connected. Address: {} (full: {})",
                short_address(address),
                address
            ),
            _ if state.wallet.connect_requested => {
                "Wallet not connected yet: a connection request is awaiting approval.".to_string()
            }
            _ => "Wallet not connected. Ask to connect the wallet to proceed.".to_string(),
        };
        Ok(ActionOutcome::with_data(
            summary,
            json!({
                "connected": state.wallet.connected,
                "address": state.wallet.address,
                "connectRequested": state.wallet.connect_requested,
            }),
        ))
    }
}
