use crate::booking::Booking;
use crate::trip::Trip;

/// Query value meaning "do not filter".
pub const ALL: &str = "all";

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != ALL)
}

/// Listing filter for trips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripFilter {
    pub state: Option<String>,
    pub trip_type: Option<String>,
}

impl TripFilter {
    pub fn new(state: Option<String>, trip_type: Option<String>) -> Self {
        Self {
            state: normalize(state),
            trip_type: normalize(trip_type),
        }
    }

    /// A trip offered to "all" regions matches every state filter; multi-region
    /// trips are stored comma-joined and match on substring.
    pub fn matches(&self, trip: &Trip) -> bool {
        let state_ok = match &self.state {
            None => true,
            Some(state) => {
                trip.state == ALL || trip.state == *state || trip.state.contains(state.as_str())
            }
        };
        let type_ok = match &self.trip_type {
            None => true,
            Some(t) => trip.trip_type == *t,
        };
        state_ok && type_ok
    }
}

/// Listing filter for bookings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilter {
    pub branch: Option<String>,
}

impl BookingFilter {
    pub fn new(branch: Option<String>) -> Self {
        Self { branch: normalize(branch) }
    }

    pub fn matches(&self, booking: &Booking) -> bool {
        match &self.branch {
            None => true,
            Some(branch) => booking.branch == *branch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::NewTrip;
    use chrono::Utc;

    fn trip(state: &str, trip_type: &str) -> Trip {
        NewTrip {
            date: "2025-03-01".into(),
            airline: "Saudia".into(),
            airline_logo: None,
            hotel: "Dar".into(),
            hotel_logo: None,
            hotel_distance: None,
            route: "ALG-JED".into(),
            duration: 15,
            trip_type: trip_type.into(),
            state: state.into(),
            room5_price: 1,
            room4_price: 2,
            room3_price: 3,
            room2_price: 4,
        }
        .into_trip(1, Utc::now())
    }

    #[test]
    fn test_all_means_no_filter() {
        let filter = TripFilter::new(Some("all".into()), Some(" all ".into()));
        assert_eq!(filter, TripFilter::default());
        assert!(filter.matches(&trip("Oran", "hajj")));
    }

    #[test]
    fn test_state_matching_rules() {
        let filter = TripFilter::new(Some("Oran".into()), None);
        assert!(filter.matches(&trip("Oran", "umrah")));
        assert!(filter.matches(&trip("all", "umrah")));
        assert!(filter.matches(&trip("Alger,Oran", "umrah")));
        assert!(!filter.matches(&trip("Setif", "umrah")));
    }

    #[test]
    fn test_type_is_exact() {
        let filter = TripFilter::new(Some("Oran".into()), Some("hajj".into()));
        assert!(filter.matches(&trip("Oran", "hajj")));
        assert!(!filter.matches(&trip("Oran", "umrah")));
        assert!(!filter.matches(&trip("Oran", "hajj-vip")));
    }
}
