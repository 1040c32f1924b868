use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dashboard rollup over active trips and bookings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingStats {
    pub total_bookings: u64,
    pub pending_bookings: u64,
    pub approved_bookings: u64,
    pub total_trips: u64,
    /// Branch tag to booking count.
    pub state_stats: BTreeMap<String, u64>,
    /// Package type to booking count.
    pub type_stats: BTreeMap<String, u64>,
}
