//! CloudFormation template model
//!
//! Everything the orchestrators declare ends up in a [`Stack`]. Turning the
//! rendered template into deployed infrastructure is left to CloudFormation.

pub mod intrinsic;
pub mod resource;
pub mod stack;

pub use resource::{DeletionPolicy, Declarations, Output, Parameter, Resource, Template};
pub use stack::{Environment, Stack};
