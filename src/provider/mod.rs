//! Lifecycle provider for global database custom resources
//!
//! Runs outside the declaring process: CloudFormation sends a request for
//! each "upgrade to global" or "add regional cluster" resource and the
//! provider reports success or failure back.

pub mod api;
pub mod error;
pub mod event;
pub mod handler;
pub mod memory;
pub mod task;

pub use api::{ApiError, GlobalClusterApi};
pub use error::{ProviderError, ProviderResult};
pub use event::{CustomResourceRequest, CustomResourceResponse, RequestType, ResponseStatus};
pub use handler::LifecycleProvider;
pub use memory::{ApiCall, InMemoryGlobalClusterApi};
pub use task::{ATTACH_RESOURCE_TYPE, AttachTask, LifecycleTask, UPGRADE_RESOURCE_TYPE, UpgradeTask};
