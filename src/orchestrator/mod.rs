pub mod context;
pub mod credentials;
pub mod error;
pub mod master;
pub mod network;
pub mod parameter_group;
pub mod slave;
pub mod state_machine;
pub mod validation;

pub use context::Context;
pub use credentials::{CredentialSet, PasswordSource};
pub use error::{Error, Result};
pub use master::{GlobalAuroraMaster, RegionalClusterRecord};
pub use parameter_group::ResolvedParameterGroup;
pub use slave::GlobalAuroraSlaveInfra;
pub use state_machine::{GlobalClusterEvent, GlobalClusterPhase, GlobalClusterStateMachine};
pub use validation::{MAX_INSTANCES, MIN_INSTANCES};
