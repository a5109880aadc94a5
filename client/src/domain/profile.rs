//! Account profile records.

use chrono::NaiveDate;

use super::{IdentifyingField, Role, route_for};

/// Profile of a student, employee, or staff account.
///
/// Exactly one identifying number is carried; the payload field it travels
/// in is chosen by [`Profile::identifying_field`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Role the profile belongs to.
    pub role: Role,
    /// Student, employee, or staff number.
    pub identifying_number: String,
    /// Given name.
    pub first_name: String,
    /// Optional middle name; empty when absent.
    pub middle_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone number.
    pub contact_number: String,
    /// Postal address.
    pub address: String,
    /// Date of birth, when known.
    pub birthdate: Option<NaiveDate>,
}

impl Profile {
    /// Payload field carrying the identifying number.
    pub const fn identifying_field(&self) -> IdentifyingField {
        route_for(self.role).identifying_field()
    }

    /// Name for display, skipping an empty middle name.
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .into_iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Wire names of the fields that differ between two profiles.
    pub fn changed_fields(&self, other: &Self) -> Vec<&'static str> {
        let checks = [
            ("role", self.role != other.role),
            (
                self.identifying_field().json_key(),
                self.identifying_number != other.identifying_number,
            ),
            ("firstName", self.first_name != other.first_name),
            ("middleName", self.middle_name != other.middle_name),
            ("lastName", self.last_name != other.last_name),
            ("email", self.email != other.email),
            ("contactNumber", self.contact_number != other.contact_number),
            ("address", self.address != other.address),
            ("birthdate", self.birthdate != other.birthdate),
        ];
        checks
            .into_iter()
            .filter_map(|(field, changed)| changed.then_some(field))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn profile() -> Profile {
        Profile {
            role: Role::Employee,
            identifying_number: "EMP-7".to_owned(),
            first_name: "Ada".to_owned(),
            middle_name: String::new(),
            last_name: "Lovelace".to_owned(),
            email: "ada@example.edu".to_owned(),
            contact_number: "09171234567".to_owned(),
            address: "12 Analytical Way".to_owned(),
            birthdate: NaiveDate::from_ymd_opt(1990, 12, 10),
        }
    }

    #[rstest]
    fn identical_profiles_have_no_changes(profile: Profile) {
        assert!(profile.changed_fields(&profile.clone()).is_empty());
    }

    #[rstest]
    fn changed_fields_use_wire_names(profile: Profile) {
        let mut draft = profile.clone();
        draft.contact_number = "09998887777".to_owned();
        draft.identifying_number = "EMP-8".to_owned();
        assert_eq!(
            profile.changed_fields(&draft),
            vec!["employeeNumber", "contactNumber"]
        );
    }

    #[rstest]
    fn full_name_skips_empty_middle_name(profile: Profile) {
        assert_eq!(profile.full_name(), "Ada Lovelace");
    }
}
