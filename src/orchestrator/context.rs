use crate::region::RegionCapabilityTable;

/// Shared context for every declaration entry point
///
/// Carries the region table so a deployment target can swap it without any
/// global state.
#[derive(Clone, Debug, Default)]
pub struct Context {
    pub regions: RegionCapabilityTable,
}

impl Context {
    pub fn new(regions: RegionCapabilityTable) -> Self {
        Self { regions }
    }
}
