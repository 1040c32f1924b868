use safar_core::{CoreError, CoreResult, Room, RoomStatus, RoomTier, Trip};
use tracing::debug;

/// Decides whether a booking may be taken against a tier of a trip.
///
/// Checked once at booking time. Marking a tier full later never touches
/// bookings that were already admitted.
pub struct RoomGate;

impl RoomGate {
    pub fn admit(trip: &Trip, tier: RoomTier) -> CoreResult<&Room> {
        let room = trip.rooms.get(tier);
        match room.status {
            RoomStatus::Available => Ok(room),
            RoomStatus::Full => {
                debug!("Room tier {} of trip {} is full", tier, trip.id);
                Err(CoreError::Conflict("This room type is fully booked".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use safar_core::{NewTrip, RoomStatuses};

    fn trip() -> Trip {
        NewTrip {
            date: "2025-01-01".into(),
            airline: "X".into(),
            airline_logo: None,
            hotel: "Y".into(),
            hotel_logo: None,
            hotel_distance: None,
            route: "A-B".into(),
            duration: 5,
            trip_type: "umrah".into(),
            state: "all".into(),
            room5_price: 100,
            room4_price: 200,
            room3_price: 300,
            room2_price: 400,
        }
        .into_trip(9, Utc::now())
    }

    #[test]
    fn test_admit_available_tier() {
        let trip = trip();
        let room = RoomGate::admit(&trip, RoomTier::Three).unwrap();
        assert_eq!(room.price, 300);
    }

    #[test]
    fn test_full_tier_is_rejected_independently() {
        let mut trip = trip();
        trip.rooms.set_statuses(&RoomStatuses {
            room5: RoomStatus::Full,
            room4: RoomStatus::Available,
            room3: RoomStatus::Available,
            room2: RoomStatus::Full,
        });

        let err = RoomGate::admit(&trip, RoomTier::Five).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
        assert!(RoomGate::admit(&trip, RoomTier::Four).is_ok());
        assert!(RoomGate::admit(&trip, RoomTier::Two).is_err());
    }
}
