use std::sync::Arc;
use safar_core::repository::{BookingRepository, TripRepository};
use safar_store::app_config::AuthConfig;
use safar_store::{DocumentStore, MemoryStore};

#[derive(Clone)]
pub struct AppState {
    pub trips: Arc<dyn TripRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub documents: DocumentStore,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(
        trips: Arc<dyn TripRepository>,
        bookings: Arc<dyn BookingRepository>,
        documents: DocumentStore,
        auth: AuthConfig,
    ) -> Self {
        Self { trips, bookings, documents, auth }
    }

    /// Both repositories backed by one process-local store.
    pub fn in_memory(store: Arc<MemoryStore>, documents: DocumentStore, auth: AuthConfig) -> Self {
        Self::new(store.clone(), store, documents, auth)
    }
}
