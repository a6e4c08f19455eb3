pub mod form;
pub mod milestones;
pub mod navigation;
pub mod wallet;

pub use form::{FillFormFieldAction, GetFormFieldsAction};
pub use milestones::{
    AddMilestoneAction, GetMilestonesAction, RemoveMilestoneAction, UpdateMilestoneAction,
};
pub use navigation::{GetCurrentPageAction, GoHomeAction, NavigateToPageAction};
pub use wallet::{ConnectWalletAction, GetWalletStatusAction};
