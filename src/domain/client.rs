// ==========================================
// Sponsorship MIS - Client bio data
// ==========================================
// Table: client_info
// Natural key: reg_number (exact)
// ==========================================

use crate::domain::entity::{text, FieldKind, FieldSpec, ImportEntity};
use crate::domain::import::{ColumnValue, FieldError, NaturalKey, ValidatedRecord};
use crate::domain::types::EntityKind;
use serde::{Deserialize, Serialize};

const CLIENT_SCHEMA: &[FieldSpec] = &[
    FieldSpec::required("full_name", "Full Name", FieldKind::PersonName { max_len: 50 }),
    FieldSpec::required("reg_number", "Registration ID", text(10))
        .with_aliases(&["Registration Number", "Reg Number"]),
    FieldSpec::optional("mobile_telephone", "Mobile Telephone", FieldKind::Phone),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub full_name: String,
    pub reg_number: String,
    pub mobile_telephone: Option<String>,
}

impl ImportEntity for Client {
    const KIND: EntityKind = EntityKind::Client;
    const TABLE: &'static str = "client_info";

    fn schema() -> &'static [FieldSpec] {
        CLIENT_SCHEMA
    }

    fn from_record(record: &ValidatedRecord) -> Result<Self, FieldError> {
        Ok(Self {
            full_name: record.require_text("full_name")?,
            reg_number: record.require_text("reg_number")?,
            mobile_telephone: record.text("mobile_telephone"),
        })
    }

    fn natural_key(&self) -> NaturalKey {
        NaturalKey::new().exact("reg_number", Some(self.reg_number.clone()))
    }

    fn column_values(&self) -> Vec<(&'static str, ColumnValue)> {
        vec![
            ("full_name", self.full_name.clone().into()),
            ("reg_number", self.reg_number.clone().into()),
            ("mobile_telephone", self.mobile_telephone.clone().into()),
        ]
    }
}
