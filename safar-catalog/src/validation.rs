use serde::Deserialize;
use safar_core::trip::lenient_i32;
use safar_core::{CoreError, CoreResult, NewTrip, RoomStatus, RoomStatuses, StateTags, TripPatch};

/// Body of `POST /api/trips`. Every field is optional so that a missing one
/// yields a `Missing required field` message rather than a parse error.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTripRequest {
    pub date: Option<String>,
    pub airline: Option<String>,
    pub airline_logo: Option<String>,
    pub hotel: Option<String>,
    pub hotel_logo: Option<String>,
    pub hotel_distance: Option<String>,
    pub route: Option<String>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub duration: Option<i32>,
    #[serde(rename = "type")]
    pub trip_type: Option<String>,
    pub state: Option<StateTags>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub room5_price: Option<i32>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub room4_price: Option<i32>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub room3_price: Option<i32>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub room2_price: Option<i32>,
}

fn required_text(value: Option<String>, field: &str) -> CoreResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CoreError::missing_field(field)),
    }
}

fn required_positive(value: Option<i32>, field: &str) -> CoreResult<i32> {
    let v = value.ok_or_else(|| CoreError::missing_field(field))?;
    ensure_positive(v, field)
}

fn ensure_positive(value: i32, field: &str) -> CoreResult<i32> {
    if value <= 0 {
        return Err(CoreError::Validation(format!("{} must be a positive integer", field)));
    }
    Ok(value)
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl CreateTripRequest {
    pub fn into_new_trip(self) -> CoreResult<NewTrip> {
        let date = required_text(self.date, "date")?;
        let airline = required_text(self.airline, "airline")?;
        let hotel = required_text(self.hotel, "hotel")?;
        let route = required_text(self.route, "route")?;
        let duration = required_positive(self.duration, "duration")?;
        let trip_type = required_text(self.trip_type, "type")?;
        let state = required_text(self.state.map(StateTags::into_scalar), "state")?;
        let room5_price = required_positive(self.room5_price, "room5_price")?;
        let room4_price = required_positive(self.room4_price, "room4_price")?;
        let room3_price = required_positive(self.room3_price, "room3_price")?;
        let room2_price = required_positive(self.room2_price, "room2_price")?;

        Ok(NewTrip {
            date,
            airline,
            airline_logo: optional_text(self.airline_logo),
            hotel,
            hotel_logo: optional_text(self.hotel_logo),
            hotel_distance: optional_text(self.hotel_distance),
            route,
            duration,
            trip_type,
            state,
            room5_price,
            room4_price,
            room3_price,
            room2_price,
        })
    }
}

/// Rejects patches that would break the trip invariants.
pub fn validate_patch(patch: &TripPatch) -> CoreResult<()> {
    if let Some(d) = patch.duration {
        ensure_positive(d, "duration")?;
    }
    let prices = [
        (patch.room5_price, "room5_price"),
        (patch.room4_price, "room4_price"),
        (patch.room3_price, "room3_price"),
        (patch.room2_price, "room2_price"),
    ];
    for (price, field) in prices {
        if let Some(p) = price {
            ensure_positive(p, field)?;
        }
    }

    let texts = [
        (&patch.date, "date"),
        (&patch.airline, "airline"),
        (&patch.hotel, "hotel"),
        (&patch.route, "route"),
        (&patch.trip_type, "type"),
    ];
    for (value, field) in texts {
        if matches!(value, Some(v) if v.trim().is_empty()) {
            return Err(CoreError::Validation(format!("{} cannot be empty", field)));
        }
    }
    if let Some(state) = &patch.state {
        if state.clone().into_scalar().is_empty() {
            return Err(CoreError::Validation("state cannot be empty".to_string()));
        }
    }
    Ok(())
}

/// Body of `PUT /api/trips/{id}/status`; all four statuses are required.
#[derive(Debug, Default, Deserialize)]
pub struct RoomStatusRequest {
    pub room5_status: Option<RoomStatus>,
    pub room4_status: Option<RoomStatus>,
    pub room3_status: Option<RoomStatus>,
    pub room2_status: Option<RoomStatus>,
}

impl RoomStatusRequest {
    pub fn into_statuses(self) -> CoreResult<RoomStatuses> {
        Ok(RoomStatuses {
            room5: self.room5_status.ok_or_else(|| CoreError::missing_field("room5_status"))?,
            room4: self.room4_status.ok_or_else(|| CoreError::missing_field("room4_status"))?,
            room3: self.room3_status.ok_or_else(|| CoreError::missing_field("room3_status"))?,
            room2: self.room2_status.ok_or_else(|| CoreError::missing_field("room2_status"))?,
        })
    }
}
