pub mod app_config;
pub mod database;
pub mod documents;
pub mod memory;
pub mod trip_repo;
pub mod booking_repo;

pub use database::DbClient;
pub use documents::{DocumentStore, PendingDocument, StoredDocument};
pub use memory::MemoryStore;
pub use trip_repo::PgTripRepository;
pub use booking_repo::PgBookingRepository;
