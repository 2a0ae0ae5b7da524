pub mod cluster;
pub mod common;
pub mod custom_resource;
pub mod network;
pub mod parameter_group;
pub mod secret;
pub mod subnet_group;

pub use common::{
    MANAGED_BY, MAX_IDENTIFIER_LENGTH, logical_id, physical_name, standard_tags, suffixed_name,
};
