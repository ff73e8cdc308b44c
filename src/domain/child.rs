// ==========================================
// Sponsorship MIS - Child bio data
// ==========================================
// Table: child_info
// Natural key: full_name (case-insensitive) + date_of_birth
// ==========================================

use crate::domain::entity::{
    parse_choice, require_choice, text, DateMin, FieldKind, FieldSpec, ImportEntity, LONG_TEXT,
};
use crate::domain::import::{ColumnValue, FieldError, NaturalKey, ValidatedRecord};
use crate::domain::sponsor::SPONSOR_BY_EMAIL;
use crate::domain::types::{EntityKind, Gender, Religion, YesNo};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const CHILD_SCHEMA: &[FieldSpec] = &[
    FieldSpec::required("full_name", "Full Name", FieldKind::PersonName { max_len: 50 }),
    FieldSpec::optional("preferred_name", "Preferred Name", text(50)),
    FieldSpec::optional("residence", "Current Residence", text(50)).with_aliases(&["Residence"]),
    FieldSpec::optional("district", "Home District", text(50)).with_aliases(&["District"]),
    FieldSpec::optional("tribe", "Tribe", text(20)),
    FieldSpec::required("gender", "Gender", FieldKind::Choice(Gender::CHOICES)),
    FieldSpec::optional(
        "date_of_birth",
        "Date of Birth",
        FieldKind::Date {
            min: DateMin::Configured,
        },
    )
    .with_aliases(&["DOB"]),
    FieldSpec::optional(
        "weight",
        "Weight",
        FieldKind::Decimal {
            min: 0.01,
            max: 999.99,
        },
    )
    .with_aliases(&["Weight in kilograms"]),
    FieldSpec::optional("height", "Height", FieldKind::Integer { min: 1, max: 250 })
        .with_aliases(&["Height in centimeters"]),
    FieldSpec::optional("aspiration", "Aspiration", text(50)),
    FieldSpec::optional("c_interest", "Interests", text(100))
        .with_aliases(&["Interest and abilities"]),
    FieldSpec::optional("is_child_in_school", "In School", FieldKind::Bool)
        .with_aliases(&["Is the Child in School?"]),
    FieldSpec::optional("is_sponsored", "Sponsored", FieldKind::Bool)
        .with_aliases(&["Is the Child sponsored?"]),
    FieldSpec::optional("father_name", "Father Name", text(100)),
    FieldSpec::optional("is_father_alive", "Father Alive", FieldKind::Choice(YesNo::CHOICES)),
    FieldSpec::optional("father_description", "Father Description", text(100)),
    FieldSpec::optional("mother_name", "Mother Name", text(100)),
    FieldSpec::optional("is_mother_alive", "Mother Alive", FieldKind::Choice(YesNo::CHOICES)),
    FieldSpec::optional("mother_description", "Mother Description", text(100)),
    FieldSpec::optional("guardian", "Guardian", text(50)),
    FieldSpec::optional("guardian_contact", "Guardian Contact", FieldKind::Phone),
    FieldSpec::optional(
        "relationship_with_guardian",
        "Relationship With Guardian",
        text(20),
    ),
    FieldSpec::optional("siblings", "Siblings", text(100)),
    FieldSpec::optional("background_info", "Background Info", LONG_TEXT),
    FieldSpec::optional("health_status", "Health Status", text(50)),
    FieldSpec::optional("responsibility", "Responsibility", text(50)),
    FieldSpec::optional(
        "relationship_with_christ",
        "Relationship With Christ",
        text(100),
    ),
    FieldSpec::optional("religion", "Religion", FieldKind::Choice(Religion::CHOICES)),
    FieldSpec::optional("prayer_request", "Prayer Request", text(50)),
    FieldSpec::required("year_enrolled", "Year Enrolled", FieldKind::Year { min: 2013 }),
    FieldSpec::optional("is_departed", "Departed", FieldKind::Bool),
    FieldSpec::optional("staff_comment", "Staff Comment", text(50)),
    FieldSpec::optional("compiled_by", "Compiled By", text(10)),
    FieldSpec::optional(
        "sponsor_id",
        "Sponsor Email",
        FieldKind::Reference(SPONSOR_BY_EMAIL),
    )
    .with_aliases(&["Sponsor"]),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub full_name: String,
    pub preferred_name: Option<String>,
    pub residence: Option<String>,
    pub district: Option<String>,
    pub tribe: Option<String>,
    pub gender: Gender,
    pub date_of_birth: Option<NaiveDate>,
    pub weight: Option<f64>,
    pub height: Option<i64>,
    pub aspiration: Option<String>,
    pub c_interest: Option<String>,
    pub is_child_in_school: bool,
    pub is_sponsored: bool,

    // Family background
    pub father_name: Option<String>,
    pub is_father_alive: Option<YesNo>,
    pub father_description: Option<String>,
    pub mother_name: Option<String>,
    pub is_mother_alive: Option<YesNo>,
    pub mother_description: Option<String>,
    pub guardian: Option<String>,
    pub guardian_contact: Option<String>,
    pub relationship_with_guardian: Option<String>,
    pub siblings: Option<String>,
    pub background_info: Option<String>,
    pub health_status: Option<String>,
    pub responsibility: Option<String>,
    pub relationship_with_christ: Option<String>,
    pub religion: Option<Religion>,
    pub prayer_request: Option<String>,
    pub year_enrolled: i64,
    pub is_departed: bool,

    pub staff_comment: Option<String>,
    pub compiled_by: Option<String>,
    pub sponsor_id: Option<i64>,
}

impl ImportEntity for Child {
    const KIND: EntityKind = EntityKind::Child;
    const TABLE: &'static str = "child_info";

    fn schema() -> &'static [FieldSpec] {
        CHILD_SCHEMA
    }

    fn from_record(record: &ValidatedRecord) -> Result<Self, FieldError> {
        Ok(Self {
            full_name: record.require_text("full_name")?,
            preferred_name: record.text("preferred_name"),
            residence: record.text("residence"),
            district: record.text("district"),
            tribe: record.text("tribe"),
            gender: require_choice(record, "gender")?,
            date_of_birth: record.date("date_of_birth"),
            weight: record.decimal("weight"),
            height: record.integer("height"),
            aspiration: record.text("aspiration"),
            c_interest: record.text("c_interest"),
            is_child_in_school: record.flag("is_child_in_school").unwrap_or(false),
            is_sponsored: record.flag("is_sponsored").unwrap_or(false),
            father_name: record.text("father_name"),
            is_father_alive: parse_choice(record, "is_father_alive")?,
            father_description: record.text("father_description"),
            mother_name: record.text("mother_name"),
            is_mother_alive: parse_choice(record, "is_mother_alive")?,
            mother_description: record.text("mother_description"),
            guardian: record.text("guardian"),
            guardian_contact: record.text("guardian_contact"),
            relationship_with_guardian: record.text("relationship_with_guardian"),
            siblings: record.text("siblings"),
            background_info: record.text("background_info"),
            health_status: record.text("health_status"),
            responsibility: record.text("responsibility"),
            relationship_with_christ: record.text("relationship_with_christ"),
            religion: parse_choice(record, "religion")?,
            prayer_request: record.text("prayer_request"),
            year_enrolled: record.require_integer("year_enrolled")?,
            is_departed: record.flag("is_departed").unwrap_or(false),
            staff_comment: record.text("staff_comment"),
            compiled_by: record.text("compiled_by"),
            sponsor_id: record.reference("sponsor_id"),
        })
    }

    fn natural_key(&self) -> NaturalKey {
        NaturalKey::new()
            .case_insensitive("full_name", Some(&self.full_name))
            .exact_date("date_of_birth", self.date_of_birth)
    }

    fn column_values(&self) -> Vec<(&'static str, ColumnValue)> {
        vec![
            ("full_name", self.full_name.clone().into()),
            ("preferred_name", self.preferred_name.clone().into()),
            ("residence", self.residence.clone().into()),
            ("district", self.district.clone().into()),
            ("tribe", self.tribe.clone().into()),
            ("gender", self.gender.as_str().to_string().into()),
            ("date_of_birth", self.date_of_birth.into()),
            ("weight", self.weight.into()),
            ("height", self.height.into()),
            ("aspiration", self.aspiration.clone().into()),
            ("c_interest", self.c_interest.clone().into()),
            ("is_child_in_school", self.is_child_in_school.into()),
            ("is_sponsored", self.is_sponsored.into()),
            ("father_name", self.father_name.clone().into()),
            (
                "is_father_alive",
                self.is_father_alive.map(|v| v.as_str().to_string()).into(),
            ),
            ("father_description", self.father_description.clone().into()),
            ("mother_name", self.mother_name.clone().into()),
            (
                "is_mother_alive",
                self.is_mother_alive.map(|v| v.as_str().to_string()).into(),
            ),
            ("mother_description", self.mother_description.clone().into()),
            ("guardian", self.guardian.clone().into()),
            ("guardian_contact", self.guardian_contact.clone().into()),
            (
                "relationship_with_guardian",
                self.relationship_with_guardian.clone().into(),
            ),
            ("siblings", self.siblings.clone().into()),
            ("background_info", self.background_info.clone().into()),
            ("health_status", self.health_status.clone().into()),
            ("responsibility", self.responsibility.clone().into()),
            (
                "relationship_with_christ",
                self.relationship_with_christ.clone().into(),
            ),
            (
                "religion",
                self.religion.map(|v| v.as_str().to_string()).into(),
            ),
            ("prayer_request", self.prayer_request.clone().into()),
            ("year_enrolled", self.year_enrolled.into()),
            ("is_departed", self.is_departed.into()),
            ("staff_comment", self.staff_comment.clone().into()),
            ("compiled_by", self.compiled_by.clone().into()),
            ("sponsor_id", self.sponsor_id.into()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import::FieldValue;

    fn minimal_record() -> ValidatedRecord {
        let mut record = ValidatedRecord::new(1, 2);
        record.insert("full_name", FieldValue::Text("Alice Nakato".to_string()));
        record.insert("gender", FieldValue::Text("Female".to_string()));
        record.insert("year_enrolled", FieldValue::Integer(2019));
        record
    }

    #[test]
    fn test_from_record_defaults_flags_to_false() {
        let child = Child::from_record(&minimal_record()).unwrap();
        assert_eq!(child.gender, Gender::Female);
        assert!(!child.is_child_in_school);
        assert!(!child.is_departed);
        assert_eq!(child.date_of_birth, None);
    }

    #[test]
    fn test_from_record_requires_year_enrolled() {
        let mut record = ValidatedRecord::new(1, 2);
        record.insert("full_name", FieldValue::Text("Alice Nakato".to_string()));
        record.insert("gender", FieldValue::Text("Female".to_string()));

        let err = Child::from_record(&record).unwrap_err();
        assert_eq!(err.field, "year_enrolled");
    }

    #[test]
    fn test_natural_key_without_birth_date() {
        let child = Child::from_record(&minimal_record()).unwrap();
        assert_eq!(
            child.natural_key().to_string(),
            "full_name='alice nakato', date_of_birth=<empty>"
        );
    }

    #[test]
    fn test_schema_exposes_sponsor_reference_and_contact() {
        assert_eq!(Child::references(), vec![SPONSOR_BY_EMAIL]);
        assert_eq!(Child::contact_columns(), vec!["guardian_contact"]);
    }
}
