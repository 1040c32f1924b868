pub mod intake;
pub mod trash;
pub mod stats;

pub use intake::BookingForm;
pub use trash::{Shadow, TrashPolicy, TripPresence};
pub use stats::StatsAggregator;
