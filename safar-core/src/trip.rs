use serde::{Deserialize, Deserializer, Serialize, Serializer};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// One of the four room categories attached to every trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoomTier {
    Five,
    Four,
    Three,
    Two,
}

impl RoomTier {
    pub const ALL: [RoomTier; 4] = [RoomTier::Five, RoomTier::Four, RoomTier::Three, RoomTier::Two];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomTier::Five => "5",
            RoomTier::Four => "4",
            RoomTier::Three => "3",
            RoomTier::Two => "2",
        }
    }
}

impl fmt::Display for RoomTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "5" => Ok(RoomTier::Five),
            "4" => Ok(RoomTier::Four),
            "3" => Ok(RoomTier::Three),
            "2" => Ok(RoomTier::Two),
            other => Err(format!("Invalid room type: {}", other)),
        }
    }
}

impl Serialize for RoomTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RoomTier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Forms send "5", scripted clients send 5.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        let raw = match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s,
            Raw::Number(n) => n.to_string(),
        };
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Accepts `5` as well as `"5"`; dashboard forms post numbers as text.
pub fn lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i32),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected an integer, got {:?}", s))),
    }
}

/// Free-form text that scripted clients may send as a JSON number or boolean.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
        Float(f64),
        Flag(bool),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Integer(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Flag(b) => b.to_string(),
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Available,
    Full,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "available",
            RoomStatus::Full => "full",
        }
    }
}

impl FromStr for RoomStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(RoomStatus::Available),
            "full" => Ok(RoomStatus::Full),
            other => Err(format!("Invalid room status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub price: i32,
    pub status: RoomStatus,
}

impl Room {
    pub fn available(price: i32) -> Self {
        Self { price, status: RoomStatus::Available }
    }
}

/// The four tiers of a trip. Each tier is independent of the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rooms {
    pub room5: Room,
    pub room4: Room,
    pub room3: Room,
    pub room2: Room,
}

impl Rooms {
    pub fn get(&self, tier: RoomTier) -> &Room {
        match tier {
            RoomTier::Five => &self.room5,
            RoomTier::Four => &self.room4,
            RoomTier::Three => &self.room3,
            RoomTier::Two => &self.room2,
        }
    }

    pub fn get_mut(&mut self, tier: RoomTier) -> &mut Room {
        match tier {
            RoomTier::Five => &mut self.room5,
            RoomTier::Four => &mut self.room4,
            RoomTier::Three => &mut self.room3,
            RoomTier::Two => &mut self.room2,
        }
    }

    /// Overwrites statuses only; prices are left alone.
    pub fn set_statuses(&mut self, statuses: &RoomStatuses) {
        for tier in RoomTier::ALL {
            self.get_mut(tier).status = statuses.get(tier);
        }
    }
}

/// A complete status assignment for all four tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomStatuses {
    pub room5: RoomStatus,
    pub room4: RoomStatus,
    pub room3: RoomStatus,
    pub room2: RoomStatus,
}

impl RoomStatuses {
    pub fn get(&self, tier: RoomTier) -> RoomStatus {
        match tier {
            RoomTier::Five => self.room5,
            RoomTier::Four => self.room4,
            RoomTier::Three => self.room3,
            RoomTier::Two => self.room2,
        }
    }
}

/// Target regions of a trip: a single tag or a list that gets stored comma-joined.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StateTags {
    One(String),
    Many(Vec<String>),
}

impl StateTags {
    pub fn into_scalar(self) -> String {
        match self {
            StateTags::One(s) => s.trim().to_string(),
            StateTags::Many(tags) => tags
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: i32,
    pub date: String,
    pub airline: String,
    pub airline_logo: Option<String>,
    pub hotel: String,
    pub hotel_logo: Option<String>,
    pub hotel_distance: Option<String>,
    pub route: String,
    pub duration: i32,
    #[serde(rename = "type")]
    pub trip_type: String,
    pub state: String,
    #[serde(flatten)]
    pub rooms: Rooms,
    pub created_at: DateTime<Utc>,
}

impl Trip {
    /// Merges the supplied fields over the current ones.
    pub fn apply(&mut self, patch: TripPatch) {
        if let Some(v) = patch.date { self.date = v; }
        if let Some(v) = patch.airline { self.airline = v; }
        if let Some(v) = patch.airline_logo { self.airline_logo = Some(v); }
        if let Some(v) = patch.hotel { self.hotel = v; }
        if let Some(v) = patch.hotel_logo { self.hotel_logo = Some(v); }
        if let Some(v) = patch.hotel_distance { self.hotel_distance = Some(v); }
        if let Some(v) = patch.route { self.route = v; }
        if let Some(v) = patch.duration { self.duration = v; }
        if let Some(v) = patch.trip_type { self.trip_type = v; }
        if let Some(v) = patch.state { self.state = v.into_scalar(); }
        if let Some(v) = patch.room5_price { self.rooms.room5.price = v; }
        if let Some(v) = patch.room4_price { self.rooms.room4.price = v; }
        if let Some(v) = patch.room3_price { self.rooms.room3.price = v; }
        if let Some(v) = patch.room2_price { self.rooms.room2.price = v; }
    }
}

/// A validated trip ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrip {
    pub date: String,
    pub airline: String,
    pub airline_logo: Option<String>,
    pub hotel: String,
    pub hotel_logo: Option<String>,
    pub hotel_distance: Option<String>,
    pub route: String,
    pub duration: i32,
    pub trip_type: String,
    pub state: String,
    pub room5_price: i32,
    pub room4_price: i32,
    pub room3_price: i32,
    pub room2_price: i32,
}

impl NewTrip {
    /// Every tier of a new trip starts out available.
    pub fn initial_rooms(&self) -> Rooms {
        Rooms {
            room5: Room::available(self.room5_price),
            room4: Room::available(self.room4_price),
            room3: Room::available(self.room3_price),
            room2: Room::available(self.room2_price),
        }
    }

    pub fn into_trip(self, id: i32, created_at: DateTime<Utc>) -> Trip {
        let rooms = self.initial_rooms();
        Trip {
            id,
            date: self.date,
            airline: self.airline,
            airline_logo: self.airline_logo,
            hotel: self.hotel,
            hotel_logo: self.hotel_logo,
            hotel_distance: self.hotel_distance,
            route: self.route,
            duration: self.duration,
            trip_type: self.trip_type,
            state: self.state,
            rooms,
            created_at,
        }
    }
}

/// Partial update of a trip. Room statuses are changed through [`RoomStatuses`] only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TripPatch {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trip() -> Trip {
        NewTrip {
            date: "2025-01-01".to_string(),
            airline: "X".to_string(),
            airline_logo: None,
            hotel: "Y".to_string(),
            hotel_logo: None,
            hotel_distance: None,
            route: "A-B".to_string(),
            duration: 5,
            trip_type: "umrah".to_string(),
            state: "all".to_string(),
            room5_price: 100,
            room4_price: 200,
            room3_price: 300,
            room2_price: 400,
        }
        .into_trip(1, Utc::now())
    }

    #[test]
    fn test_trip_json_shape() {
        let trip = sample_trip();
        let json = serde_json::to_value(&trip).unwrap();

        assert_eq!(json["type"], "umrah");
        assert_eq!(json["room5"]["price"], 100);
        assert_eq!(json["room5"]["status"], "available");
        assert_eq!(json["room2"]["price"], 400);
    }

    #[test]
    fn test_room_tier_accepts_text_and_number() {
        let a: RoomTier = serde_json::from_str("\"5\"").unwrap();
        let b: RoomTier = serde_json::from_str("3").unwrap();
        assert_eq!(a, RoomTier::Five);
        assert_eq!(b, RoomTier::Three);
        assert!(serde_json::from_str::<RoomTier>("\"6\"").is_err());
        assert_eq!(serde_json::to_string(&RoomTier::Two).unwrap(), "\"2\"");
    }

    #[test]
    fn test_set_statuses_keeps_prices() {
        let mut trip = sample_trip();
        trip.rooms.set_statuses(&RoomStatuses {
            room5: RoomStatus::Full,
            room4: RoomStatus::Available,
            room3: RoomStatus::Full,
            room2: RoomStatus::Available,
        });

        assert_eq!(trip.rooms.room5, Room { price: 100, status: RoomStatus::Full });
        assert_eq!(trip.rooms.room4, Room::available(200));
        assert_eq!(trip.rooms.room3, Room { price: 300, status: RoomStatus::Full });
        assert_eq!(trip.rooms.room2, Room::available(400));
    }

    #[test]
    fn test_apply_patch_merges_supplied_fields_only() {
        let mut trip = sample_trip();
        trip.rooms.room4.status = RoomStatus::Full;

        let patch: TripPatch = serde_json::from_str(
            r#"{"hotel": "Hilton", "state": ["Riyadh", " Jeddah ", ""], "room4_price": 250}"#,
        )
        .unwrap();
        trip.apply(patch);

        assert_eq!(trip.hotel, "Hilton");
        assert_eq!(trip.state, "Riyadh,Jeddah");
        assert_eq!(trip.rooms.room4, Room { price: 250, status: RoomStatus::Full });
        assert_eq!(trip.airline, "X");
        assert_eq!(trip.duration, 5);
    }

    #[test]
    fn test_state_tags_scalar() {
        assert_eq!(StateTags::One(" all ".into()).into_scalar(), "all");
        assert_eq!(StateTags::Many(vec!["a".into(), "b".into()]).into_scalar(), "a,b");
    }

    #[test]
    fn test_lenient_text_accepts_scalars() {
        #[derive(Deserialize)]
        struct Form {
            #[serde(default, deserialize_with = "lenient_text")]
            value: Option<String>,
        }

        let parse = |json: &str| serde_json::from_str::<Form>(json).unwrap().value;
        assert_eq!(parse(r#"{"value": "three"}"#).as_deref(), Some("three"));
        assert_eq!(parse(r#"{"value": 3}"#).as_deref(), Some("3"));
        assert_eq!(parse(r#"{"value": 2.5}"#).as_deref(), Some("2.5"));
        assert_eq!(parse(r#"{"value": true}"#).as_deref(), Some("true"));
        assert_eq!(parse(r#"{"value": null}"#), None);
        assert_eq!(parse(r#"{}"#), None);
    }
}
