use serde::{Deserialize, Deserializer};
use safar_core::trip::{lenient_i32, lenient_text};
use safar_core::{CoreError, CoreResult, NewBooking, RoomTier};
use safar_shared::Masked;

/// Customer submission for `POST /api/bookings`, either as JSON or as
/// multipart text fields (see [`BookingForm::set_field`]).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    #[serde(default, deserialize_with = "lenient_i32")]
    pub trip_id: Option<i32>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub birth_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub birth_place: Option<String>,
    #[serde(default, deserialize_with = "lenient_masked")]
    pub passport_number: Option<Masked<String>>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub passport_issue_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub passport_expiry_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub marital_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub family_members: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub occupation: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub umrah_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub room_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub branch: Option<String>,
}

fn lenient_masked<'de, D>(deserializer: D) -> Result<Option<Masked<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.map(Masked))
}

fn required(value: Option<String>, field: &str) -> CoreResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(CoreError::missing_field(field)),
    }
}

impl BookingForm {
    /// Assigns one multipart text field. Returns `false` for names the form does not know.
    pub fn set_field(&mut self, name: &str, value: String) -> CoreResult<bool> {
        let slot = match name {
            "tripId" => {
                let id = value.trim().parse::<i32>().map_err(|_| {
                    CoreError::Validation(format!("Invalid tripId: {}", value))
                })?;
                self.trip_id = Some(id);
                return Ok(true);
            }
            "passportNumber" => {
                self.passport_number = Some(Masked(value));
                return Ok(true);
            }
            "firstName" => &mut self.first_name,
            "lastName" => &mut self.last_name,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "birthDate" => &mut self.birth_date,
            "birthPlace" => &mut self.birth_place,
            "passportIssueDate" => &mut self.passport_issue_date,
            "passportExpiryDate" => &mut self.passport_expiry_date,
            "maritalStatus" => &mut self.marital_status,
            "familyMembers" => &mut self.family_members,
            "occupation" => &mut self.occupation,
            "umrahType" => &mut self.umrah_type,
            "roomType" => &mut self.room_type,
            "notes" => &mut self.notes,
            "branch" => &mut self.branch,
            _ => return Ok(false),
        };
        *slot = Some(value);
        Ok(true)
    }

    /// Validates presence of every identity field and resolves defaults.
    /// `passport_file` is the stored document reference, if one was uploaded.
    pub fn into_new_booking(self, passport_file: Option<String>) -> CoreResult<NewBooking> {
        let trip_id = self.trip_id.ok_or_else(|| CoreError::missing_field("tripId"))?;
        let first_name = required(self.first_name, "firstName")?;
        let last_name = required(self.last_name, "lastName")?;
        let email = required(self.email, "email")?;
        let phone = required(self.phone, "phone")?;
        let birth_date = required(self.birth_date, "birthDate")?;
        let birth_place = required(self.birth_place, "birthPlace")?;
        let passport_number = required(self.passport_number.map(Masked::into_inner), "passportNumber")?;
        let passport_issue_date = required(self.passport_issue_date, "passportIssueDate")?;
        let passport_expiry_date = required(self.passport_expiry_date, "passportExpiryDate")?;
        let marital_status = required(self.marital_status, "maritalStatus")?;
        let family_members = required(self.family_members, "familyMembers")?;
        let occupation = required(self.occupation, "occupation")?;
        let umrah_type = required(self.umrah_type, "umrahType")?;
        let room_type: RoomTier = required(self.room_type, "roomType")?
            .parse()
            .map_err(CoreError::Validation)?;

        let branch = self
            .branch
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| birth_place.clone());

        Ok(NewBooking {
            trip_id,
            first_name,
            last_name,
            email,
            phone,
            birth_date,
            birth_place,
            passport_number: Masked(passport_number),
            passport_issue_date,
            passport_expiry_date,
            marital_status,
            family_members,
            occupation,
            umrah_type,
            room_type,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            passport_file,
            branch,
        })
    }
}
