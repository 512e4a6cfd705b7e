//! Place records and their persisted single-line form.
//!
//! A committed place is stored as `photo;name;location`, where location is
//! `"<lat>, <lon>"` or empty. Records are decoded at the store boundary; the
//! rest of the crate only sees [`Place`].

use crate::domain::GeoPoint;

/// Field separator of the persisted record.
pub const SEPARATOR: char = ';';

/// An immutable, committed place.
#[derive(Clone, Debug, PartialEq)]
pub struct Place {
    /// Opaque photo reference from the transport (empty when none).
    pub photo: String,
    pub name: String,
    pub location: Option<GeoPoint>,
}

/// In-progress place fields, each optional until commit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DraftPlace {
    pub photo: Option<String>,
    pub name: Option<String>,
    pub location: Option<GeoPoint>,
}

impl DraftPlace {
    pub fn is_empty(&self) -> bool {
        self.photo.is_none() && self.name.is_none() && self.location.is_none()
    }

    /// Finalize the draft; absent fields become empty.
    pub fn into_place(self) -> Place {
        Place {
            photo: self.photo.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            location: self.location,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("expected 3 fields, got {0}")]
    FieldCount(usize),
    #[error("invalid location: {0:?}")]
    Location(String),
}

impl Place {
    pub fn encode(&self) -> String {
        let location = self
            .location
            .map(|p| p.to_string())
            .unwrap_or_default();
        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{location}",
            self.photo, self.name
        )
    }

    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        let parts: Vec<&str> = raw.split(SEPARATOR).collect();
        let [photo, name, location] = parts.as_slice() else {
            return Err(DecodeError::FieldCount(parts.len()));
        };

        let location = match location.trim() {
            "" => None,
            loc => Some(
                GeoPoint::parse(loc).ok_or_else(|| DecodeError::Location(loc.to_string()))?,
            ),
        };

        Ok(Self {
            photo: photo.to_string(),
            name: name.to_string(),
            location,
        })
    }
}

/// True if `field` can be stored without breaking the record layout.
pub fn is_storable_field(field: &str) -> bool {
    !field.contains(SEPARATOR)
}
