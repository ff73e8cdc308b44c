// ==========================================
// Sponsorship MIS - Chart of accounts
// ==========================================
// Table: chart_of_accounts (account_number UNIQUE)
// ==========================================

use crate::domain::entity::{require_choice, FieldKind, FieldSpec, ImportEntity, LONG_TEXT};
use crate::domain::import::{ColumnValue, FieldError, NaturalKey, ValidatedRecord};
use crate::domain::types::{AccountType, EntityKind};
use serde::{Deserialize, Serialize};

const ACCOUNT_SCHEMA: &[FieldSpec] = &[
    FieldSpec::required(
        "account_name",
        "Account Name",
        FieldKind::Text { max_len: Some(255) },
    ),
    FieldSpec::required(
        "account_type",
        "Account Type",
        FieldKind::Choice(AccountType::CHOICES),
    ),
    FieldSpec::required(
        "account_number",
        "Account Number",
        FieldKind::Digits { max_len: 20 },
    )
    .with_aliases(&["Account No"]),
    FieldSpec::optional("description", "Description", LONG_TEXT),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartOfAccount {
    pub account_name: String,
    pub account_type: AccountType,
    pub account_number: String,
    pub description: Option<String>,
}

impl ImportEntity for ChartOfAccount {
    const KIND: EntityKind = EntityKind::ChartOfAccount;
    const TABLE: &'static str = "chart_of_accounts";

    fn schema() -> &'static [FieldSpec] {
        ACCOUNT_SCHEMA
    }

    fn from_record(record: &ValidatedRecord) -> Result<Self, FieldError> {
        Ok(Self {
            account_name: record.require_text("account_name")?,
            account_type: require_choice(record, "account_type")?,
            account_number: record.require_text("account_number")?,
            description: record.text("description"),
        })
    }

    fn natural_key(&self) -> NaturalKey {
        NaturalKey::new().exact("account_number", Some(self.account_number.clone()))
    }

    fn column_values(&self) -> Vec<(&'static str, ColumnValue)> {
        vec![
            ("account_name", self.account_name.clone().into()),
            ("account_type", self.account_type.as_str().to_string().into()),
            ("account_number", self.account_number.clone().into()),
            ("description", self.description.clone().into()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import::FieldValue;

    #[test]
    fn test_account_type_stored_as_canonical_value() {
        let mut record = ValidatedRecord::new(3, 4);
        record.insert("account_name", FieldValue::Text("Cash at bank".to_string()));
        record.insert("account_type", FieldValue::Text("asset".to_string()));
        record.insert("account_number", FieldValue::Text("1001".to_string()));

        let account = ChartOfAccount::from_record(&record).unwrap();
        let columns = account.column_values();
        assert_eq!(
            columns[1],
            ("account_type", ColumnValue::Text("asset".to_string()))
        );
        assert_eq!(account.natural_key().to_string(), "account_number='1001'");
    }
}
