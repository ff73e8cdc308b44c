// ==========================================
// Sponsorship MIS - Sponsor details
// ==========================================
// Table: sponsor_info
// Natural key: email (case-insensitive)
// ==========================================

use crate::domain::entity::{
    parse_choice, require_choice, text, DateMin, FieldKind, FieldSpec, ImportEntity,
    ReferenceTarget,
};
use crate::domain::import::{ColumnValue, FieldError, NaturalKey, ValidatedRecord};
use crate::domain::types::{EntityKind, Gender, SponsorshipType, YesNo};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Child rows point at their sponsor through the sponsor's e-mail
pub const SPONSOR_BY_EMAIL: ReferenceTarget = ReferenceTarget {
    table: "sponsor_info",
    column: "email",
    label: "sponsor",
};

const SPONSOR_SCHEMA: &[FieldSpec] = &[
    FieldSpec::required("first_name", "First Name", text(25)),
    FieldSpec::required("last_name", "Last Name", text(25)),
    FieldSpec::required("gender", "Gender", FieldKind::Choice(Gender::CHOICES)),
    FieldSpec::required("email", "Email", FieldKind::Email).with_aliases(&["E-mail"]),
    FieldSpec::optional(
        "sponsorship_type_at_signup",
        "Sponsorship Type",
        FieldKind::Choice(SponsorshipType::CHOICES),
    )
    .with_aliases(&["Type of Sponsorship Interest"]),
    FieldSpec::optional("job_title", "Job Title", text(30)),
    FieldSpec::optional("region", "Region", text(30)),
    FieldSpec::optional("town", "Town", text(30)),
    FieldSpec::optional("origin", "Origin", text(30)),
    FieldSpec::optional("business_telephone", "Business Telephone", FieldKind::Phone),
    FieldSpec::optional("mobile_telephone", "Mobile Telephone", FieldKind::Phone),
    FieldSpec::optional("city", "City", text(30)),
    FieldSpec::optional(
        "start_date",
        "Start Date",
        FieldKind::Date {
            min: DateMin::Fixed {
                year: 2013,
                month: 1,
                day: 1,
            },
        },
    ),
    FieldSpec::optional("first_street_address", "First Street Address", text(100)),
    FieldSpec::optional("second_street_address", "Second Street Address", text(100)),
    FieldSpec::optional("zip_code", "ZIP Code", text(10)),
    FieldSpec::optional("is_departed", "Departed", FieldKind::Choice(YesNo::CHOICES)),
    FieldSpec::optional("comment", "Comment", text(50)),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sponsor {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub email: String,
    pub sponsorship_type_at_signup: Option<SponsorshipType>,
    pub job_title: Option<String>,
    pub region: Option<String>,
    pub town: Option<String>,
    pub origin: Option<String>,
    pub business_telephone: Option<String>,
    pub mobile_telephone: Option<String>,
    pub city: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub first_street_address: Option<String>,
    pub second_street_address: Option<String>,
    pub zip_code: Option<String>,
    pub is_departed: YesNo,
    pub comment: Option<String>,
}

impl ImportEntity for Sponsor {
    const KIND: EntityKind = EntityKind::Sponsor;
    const TABLE: &'static str = "sponsor_info";

    fn schema() -> &'static [FieldSpec] {
        SPONSOR_SCHEMA
    }

    fn from_record(record: &ValidatedRecord) -> Result<Self, FieldError> {
        Ok(Self {
            first_name: record.require_text("first_name")?,
            last_name: record.require_text("last_name")?,
            gender: require_choice(record, "gender")?,
            email: record.require_text("email")?,
            sponsorship_type_at_signup: parse_choice(record, "sponsorship_type_at_signup")?,
            job_title: record.text("job_title"),
            region: record.text("region"),
            town: record.text("town"),
            origin: record.text("origin"),
            business_telephone: record.text("business_telephone"),
            mobile_telephone: record.text("mobile_telephone"),
            city: record.text("city"),
            start_date: record.date("start_date"),
            first_street_address: record.text("first_street_address"),
            second_street_address: record.text("second_street_address"),
            zip_code: record.text("zip_code"),
            is_departed: parse_choice(record, "is_departed")?.unwrap_or(YesNo::No),
            comment: record.text("comment"),
        })
    }

    fn natural_key(&self) -> NaturalKey {
        NaturalKey::new().case_insensitive("email", Some(&self.email))
    }

    fn column_values(&self) -> Vec<(&'static str, ColumnValue)> {
        vec![
            ("first_name", self.first_name.clone().into()),
            ("last_name", self.last_name.clone().into()),
            ("gender", self.gender.as_str().to_string().into()),
            ("email", self.email.clone().into()),
            (
                "sponsorship_type_at_signup",
                self.sponsorship_type_at_signup
                    .map(|v| v.as_str().to_string())
                    .into(),
            ),
            ("job_title", self.job_title.clone().into()),
            ("region", self.region.clone().into()),
            ("town", self.town.clone().into()),
            ("origin", self.origin.clone().into()),
            ("business_telephone", self.business_telephone.clone().into()),
            ("mobile_telephone", self.mobile_telephone.clone().into()),
            ("city", self.city.clone().into()),
            ("start_date", self.start_date.into()),
            ("first_street_address", self.first_street_address.clone().into()),
            ("second_street_address", self.second_street_address.clone().into()),
            ("zip_code", self.zip_code.clone().into()),
            ("is_departed", self.is_departed.as_str().to_string().into()),
            ("comment", self.comment.clone().into()),
        ]
    }
}
