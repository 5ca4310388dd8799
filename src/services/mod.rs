pub mod application_intake;
pub mod application_store;
pub mod asset_coordinator;
pub mod retry;

pub use application_intake::{ApplicationIntake, IntakeOutcome, Submission};
pub use application_store::ApplicationStore;
pub use asset_coordinator::AssetCoordinator;
pub use retry::RetryPolicy;
