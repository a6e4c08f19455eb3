use crate::state::FormState;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The form state shared between dispatch and the HTTP layer. One instance
/// per conversation context; never global.
pub type SharedFormState = Arc<Mutex<FormState>>;

/// JSON Schema property definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub description: String,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

/// Action input schema using JSON Schema format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInputSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: HashMap<String, PropertySchema>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl Default for ToolInputSchema {
    fn default() -> Self {
        ToolInputSchema {
            schema_type: "object".to_string(),
            properties: HashMap::new(),
            required: vec![],
        }
    }
}

/// Action definition that gets sent to the AI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: ToolInputSchema,
}

/// Failure categories for one action call. Local to that call; dispatch
/// never lets them escape the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    IndexOutOfRange,
    MilestoneLimit,
    MilestoneAllocation,
    UnknownAction,
    InvalidArguments,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::IndexOutOfRange => "index_out_of_range",
            ErrorKind::MilestoneLimit => "milestone_limit",
            ErrorKind::MilestoneAllocation => "milestone_allocation",
            ErrorKind::UnknownAction => "unknown_action",
            ErrorKind::InvalidArguments => "invalid_arguments",
        }
    }
}

/// A typed action failure: category plus a human-readable reason.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ActionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ActionError { kind, message: message.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn index_out_of_range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IndexOutOfRange, message)
    }

    pub fn milestone_limit(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MilestoneLimit, message)
    }

    pub fn milestone_allocation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MilestoneAllocation, message)
    }

    pub fn unknown_action(name: &str) -> Self {
        Self::new(ErrorKind::UnknownAction, format!("Unknown action '{}'", name))
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArguments, message)
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for ActionError {}

/// Successful outcome of one action: a short human summary plus optional
/// structured data for the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub summary: String,
    pub data: Option<Value>,
}

impl ActionOutcome {
    pub fn text(summary: impl Into<String>) -> Self {
        ActionOutcome { summary: summary.into(), data: None }
    }

    pub fn with_data(summary: impl Into<String>, data: Value) -> Self {
        ActionOutcome { summary: summary.into(), data: Some(data) }
    }
}

/// Per-call result fed back into the conversation and surfaced to the caller.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActionResult {
    pub name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    pub summary: String,
}

impl ActionResult {
    pub fn ok(name: impl Into<String>, outcome: ActionOutcome) -> Self {
        ActionResult {
            name: name.into(),
            success: true,
            data: outcome.data,
            error: None,
            summary: outcome.summary,
        }
    }

    pub fn fail(name: impl Into<String>, error: ActionError) -> Self {
        ActionResult {
            name: name.into(),
            success: false,
            data: None,
            error: Some(error.kind),
            summary: error.message,
        }
    }
}

/// One proposed tool call from the model. `arguments` is `None` when the
/// emitted argument string was not valid JSON; dispatch reports that as
/// `InvalidArguments` instead of guessing.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionCall {
    pub id: String,
    pub name: String,
    pub arguments: Option<Value>,
}

/// Context provided to actions during execution. Carries the conversation's
/// form state explicitly so dispatch has no hidden shared state.
#[derive(Clone)]
pub struct ActionContext {
    pub form: SharedFormState,
}

impl ActionContext {
    pub fn new(form: SharedFormState) -> Self {
        ActionContext { form }
    }
}
