mod engine;
mod master;
mod network;
mod slave;
pub mod time_zone;

pub use engine::*;
pub use master::*;
pub use network::*;
pub use slave::*;
