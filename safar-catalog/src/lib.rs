pub mod validation;
pub mod inventory;

pub use validation::{CreateTripRequest, RoomStatusRequest, validate_patch};
pub use inventory::RoomGate;
