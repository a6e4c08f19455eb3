pub mod milestones;

use crate::tools::types::ActionError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use milestones::{MAX_MILESTONES, MIN_MILESTONES, TOTAL_PERCENT};

static PAYEE_ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid address regex"));

pub const MIN_DURATION_DAYS: u32 = 1;
pub const MAX_DURATION_DAYS: u32 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Home,
    Create,
    Manage,
}

impl Page {
    pub fn parse(s: &str) -> Option<Page> {
        match s {
            "home" => Some(Page::Home),
            "create" => Some(Page::Create),
            "manage" => Some(Page::Manage),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Create => "create",
            Page::Manage => "manage",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Page::Home => "the home page",
            Page::Create => "the contract creation page",
            Page::Manage => "the contract management page",
        }
    }
}

/// The three scalar form fields an action may fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    PayeeAddress,
    Amount,
    Duration,
}

impl FormField {
    pub fn parse(s: &str) -> Option<FormField> {
        match s {
            "payeeAddress" => Some(FormField::PayeeAddress),
            "amount" => Some(FormField::Amount),
            "duration" => Some(FormField::Duration),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::PayeeAddress => "payee address",
            FormField::Amount => "amount (USDC)",
            FormField::Duration => "duration (days)",
        }
    }
}

/// One percentage-weighted payment stage. Identity is its position in the
/// milestone list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub percentage: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Set by `connect_wallet` until the external provider reports back.
    pub connect_requested: bool,
}

/// The single mutable aggregate for one conversation: current page, form
/// fields, milestone list and wallet status. Mutated only through the
/// dispatch layer and the out-of-band wallet event; a failed operation
/// leaves it unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub current_page: Page,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    pub milestones: Vec<Milestone>,
    pub wallet: WalletStatus,
}

impl Default for FormState {
    fn default() -> Self {
        FormState {
            current_page: Page::Home,
            payee_address: None,
            amount: None,
            duration: None,
            // The creation form starts with an even two-way split.
            milestones: vec![Milestone { percentage: 50 }, Milestone { percentage: 50 }],
            wallet: WalletStatus::default(),
        }
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigate_to(&mut self, page: Page) {
        self.current_page = page;
    }

    /// Validate and set one scalar form field. Overwrites the prior value;
    /// no history is kept.
    pub fn fill_field(&mut self, field: FormField, value: &str) -> Result<(), ActionError> {
        match field {
            FormField::PayeeAddress => {
                if !PAYEE_ADDRESS_RE.is_match(value) {
                    return Err(ActionError::validation(
                        "Invalid address: must start with 0x followed by 40 hexadecimal characters (42 characters total)",
                    ));
                }
                self.payee_address = Some(value.to_string());
            }
            FormField::Amount => {
                let amount: f64 = value.trim().parse().map_err(|_| {
                    ActionError::validation("Amount must be a number greater than 0")
                })?;
                if !amount.is_finite() || amount <= 0.0 {
                    return Err(ActionError::validation(
                        "Amount must be a number greater than 0",
                    ));
                }
                self.amount = Some(amount);
            }
            FormField::Duration => {
                let days: u32 = value.trim().parse().map_err(|_| {
                    ActionError::validation("Duration must be a whole number of days")
                })?;
                if !(MIN_DURATION_DAYS..=MAX_DURATION_DAYS).contains(&days) {
                    return Err(ActionError::validation(format!(
                        "Duration must be between {} and {} days",
                        MIN_DURATION_DAYS, MAX_DURATION_DAYS
                    )));
                }
                self.duration = Some(days);
            }
        }
        Ok(())
    }

    /// Append one milestone and rebalance the list evenly.
    pub fn add_milestone(&mut self) -> Result<(), ActionError> {
        if self.milestones.len() >= MAX_MILESTONES {
            return Err(ActionError::milestone_limit(format!(
                "Maximum of {} milestones allowed",
                MAX_MILESTONES
            )));
        }
        self.milestones.push(Milestone { percentage: 0 });
        milestones::rebalance_even(&mut self.milestones);
        Ok(())
    }

    /// Remove the milestone at `index` and rebalance the rest evenly.
    pub fn remove_milestone(&mut self, index: usize) -> Result<(), ActionError> {
        if self.milestones.len() <= MIN_MILESTONES {
            return Err(ActionError::milestone_limit(
                "Cannot remove the last milestone: at least one is required",
            ));
        }
        self.check_milestone_index(index)?;
        self.milestones.remove(index);
        milestones::rebalance_even(&mut self.milestones);
        Ok(())
    }

    /// Pin the milestone at `index` to `percentage` and redistribute the
    /// others proportionally.
    pub fn update_milestone(&mut self, index: usize, percentage: u32) -> Result<(), ActionError> {
        self.check_milestone_index(index)?;
        if !(1..=TOTAL_PERCENT).contains(&percentage) {
            return Err(ActionError::validation(
                "Percentage must be between 1 and 100",
            ));
        }
        milestones::pin_update(&mut self.milestones, index, percentage)
    }

    fn check_milestone_index(&self, index: usize) -> Result<(), ActionError> {
        if index >= self.milestones.len() {
            return Err(ActionError::index_out_of_range(format!(
                "Invalid milestone index {}: available indexes are 0 to {}",
                index,
                self.milestones.len() - 1
            )));
        }
        Ok(())
    }

    /// Record a wallet connection request. The actual connection happens in
    /// the external provider; this never blocks on the result.
    pub fn request_wallet_connection(&mut self) {
        if !self.wallet.connected {
            self.wallet.connect_requested = true;
        }
    }

    /// Apply the external provider's out-of-band connection result.
    /// Idempotent: re-applying the same status is a no-op.
    pub fn apply_wallet_status(
        &mut self,
        connected: bool,
        address: Option<String>,
    ) -> Result<(), ActionError> {
        if connected {
            let address = address.ok_or_else(|| {
                ActionError::validation("A connected wallet must include its address")
            })?;
            if !PAYEE_ADDRESS_RE.is_match(&address) {
                return Err(ActionError::validation(
                    "Invalid wallet address: must start with 0x followed by 40 hexadecimal characters",
                ));
            }
            self.wallet.connected = true;
            self.wallet.address = Some(address);
        } else {
            self.wallet.connected = false;
            self.wallet.address = None;
        }
        self.wallet.connect_requested = false;
        Ok(())
    }

    pub fn milestone_total(&self) -> u32 {
        milestones::total(&self.milestones)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::types::ErrorKind;

    const ADDR: &str = "0x1234567890123456789012345678901234567890";

    #[test]
    fn starts_on_home_with_an_even_split() {
        let state = FormState::new();
        assert_eq!(state.current_page, Page::Home);
        assert_eq!(state.milestones.len(), 2);
        assert_eq!(state.milestone_total(), 100);
        assert!(!state.wallet.connected);
    }

    #[test]
    fn payee_address_requires_0x_plus_40_hex() {
        let mut state = FormState::new();
        assert!(state.fill_field(FormField::PayeeAddress, ADDR).is_ok());
        assert_eq!(state.payee_address.as_deref(), Some(ADDR));

        for bad in [
            "",
            "0x123",
            "1234567890123456789012345678901234567890ab",
            "0x12345678901234567890123456789012345678zz",
            "0x12345678901234567890123456789012345678900", // 43 chars
        ] {
            let err = state.fill_field(FormField::PayeeAddress, bad).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "{:?}", bad);
        }
        // Failed fill keeps the previous value.
        assert_eq!(state.payee_address.as_deref(), Some(ADDR));
    }

    #[test]
    fn amount_must_be_positive() {
        let mut state = FormState::new();
        assert!(state.fill_field(FormField::Amount, "500.50").is_ok());
        assert_eq!(state.amount, Some(500.50));

        for bad in ["0", "-3", "abc", ""] {
            assert!(state.fill_field(FormField::Amount, bad).is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn duration_must_be_an_integer_between_1_and_365() {
        let mut state = FormState::new();
        assert!(state.fill_field(FormField::Duration, "1").is_ok());
        assert!(state.fill_field(FormField::Duration, "365").is_ok());
        assert_eq!(state.duration, Some(365));

        for bad in ["0", "366", "30.5", "month", ""] {
            assert!(state.fill_field(FormField::Duration, bad).is_err(), "{:?}", bad);
        }
        assert_eq!(state.duration, Some(365));
    }

    #[test]
    fn milestone_list_bounds_are_enforced() {
        let mut state = FormState::new();
        while state.milestones.len() < 10 {
            state.add_milestone().unwrap();
        }
        let err = state.add_milestone().unwrap_err();
        assert_eq!(err.kind, ErrorKind::MilestoneLimit);

        while state.milestones.len() > 1 {
            state.remove_milestone(0).unwrap();
            assert_eq!(state.milestone_total(), 100);
        }
        let err = state.remove_milestone(0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MilestoneLimit);
    }

    #[test]
    fn milestone_index_and_percentage_are_validated() {
        let mut state = FormState::new();
        assert_eq!(
            state.update_milestone(5, 40).unwrap_err().kind,
            ErrorKind::IndexOutOfRange
        );
        assert_eq!(
            state.remove_milestone(9).unwrap_err().kind,
            ErrorKind::IndexOutOfRange
        );
        assert_eq!(
            state.update_milestone(0, 0).unwrap_err().kind,
            ErrorKind::Validation
        );
        assert_eq!(
            state.update_milestone(0, 101).unwrap_err().kind,
            ErrorKind::Validation
        );
    }

    #[test]
    fn wallet_status_event_is_idempotent() {
        let mut state = FormState::new();
        state.request_wallet_connection();
        assert!(state.wallet.connect_requested);

        state.apply_wallet_status(true, Some(ADDR.to_string())).unwrap();
        assert!(state.wallet.connected);
        assert!(!state.wallet.connect_requested);

        let snapshot = state.clone();
        state.apply_wallet_status(true, Some(ADDR.to_string())).unwrap();
        assert_eq!(state, snapshot);

        state.apply_wallet_status(false, None).unwrap();
        assert!(!state.wallet.connected);
        assert_eq!(state.wallet.address, None);
    }

    #[test]
    fn connected_wallet_event_requires_a_valid_address() {
        let mut state = FormState::new();
        assert!(state.apply_wallet_status(true, None).is_err());
        assert!(state.apply_wallet_status(true, Some("0xnope".into())).is_err());
        assert!(!state.wallet.connected);
    }
}
