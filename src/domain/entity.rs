// ==========================================
// Sponsorship MIS - import target schema
// ==========================================
// Each importable entity declares its columns once (FieldSpec)
// and the pipeline derives header mapping, validation and
// persistence from that declaration.
// ==========================================

use crate::domain::import::{ColumnValue, FieldError, NaturalKey, ValidatedRecord};
use crate::domain::types::{Choice, EntityKind, UnknownChoice};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Debug;
use std::str::FromStr;

// ==========================================
// Lower bound of a date field
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateMin {
    /// `ImportConfig::min_date`
    Configured,
    Fixed { year: i32, month: u32, day: u32 },
}

impl DateMin {
    pub fn resolve(&self, configured: NaiveDate) -> NaiveDate {
        match self {
            DateMin::Configured => configured,
            DateMin::Fixed { year, month, day } => {
                NaiveDate::from_ymd_opt(*year, *month, *day).unwrap_or(configured)
            }
        }
    }
}

/// Lookup target for a reference field (table.column -> id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReferenceTarget {
    pub table: &'static str,
    pub column: &'static str,
    pub label: &'static str,
}

// ==========================================
// FieldKind - coercion rule per column
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text { max_len: Option<usize> },
    /// Letters separated by single spaces
    PersonName { max_len: usize },
    Integer { min: i64, max: i64 },
    /// Calendar year between `min` and the run year
    Year { min: i32 },
    Decimal { min: f64, max: f64 },
    /// Date between `min` and the run date
    Date { min: DateMin },
    Bool,
    Phone,
    Email,
    Digits { max_len: usize },
    Choice(&'static [Choice]),
    Reference(ReferenceTarget),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub header: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, header: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            header,
            aliases: &[],
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, header: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            header,
            aliases: &[],
            kind,
            required: false,
        }
    }

    pub const fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    /// Header label followed by its aliases
    pub fn labels(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.header).chain(self.aliases.iter().copied())
    }
}

pub const fn text(max_len: usize) -> FieldKind {
    FieldKind::Text {
        max_len: Some(max_len),
    }
}

pub const LONG_TEXT: FieldKind = FieldKind::Text { max_len: None };

/// Parse an already-validated choice column into its enum
pub fn parse_choice<T>(record: &ValidatedRecord, field: &str) -> Result<Option<T>, FieldError>
where
    T: FromStr<Err = UnknownChoice>,
{
    record
        .text(field)
        .map(|value| value.parse::<T>())
        .transpose()
        .map_err(|e| FieldError::new(field, e.to_string()))
}

pub fn require_choice<T>(record: &ValidatedRecord, field: &str) -> Result<T, FieldError>
where
    T: FromStr<Err = UnknownChoice>,
{
    parse_choice(record, field)?.ok_or_else(|| FieldError::new(field, "is required"))
}

// ==========================================
// ImportEntity Trait
// ==========================================
// Implementors: Child, Sponsor, Client, ChartOfAccount
pub trait ImportEntity: Sized + Send + Sync + Clone + Debug + Serialize {
    const KIND: EntityKind;
    const TABLE: &'static str;

    /// Ordered column declaration; order drives positional imports
    fn schema() -> &'static [FieldSpec];

    /// Build the entity from a record that passed field validation
    fn from_record(record: &ValidatedRecord) -> Result<Self, FieldError>;

    fn natural_key(&self) -> NaturalKey;

    /// Column/value pairs written on create and update
    fn column_values(&self) -> Vec<(&'static str, ColumnValue)>;

    /// Reference targets the validator must resolve for this entity
    fn references() -> Vec<ReferenceTarget> {
        Self::schema()
            .iter()
            .filter_map(|spec| match spec.kind {
                FieldKind::Reference(target) => Some(target),
                _ => None,
            })
            .collect()
    }

    /// Stored phone columns (contact maintenance)
    fn contact_columns() -> Vec<&'static str> {
        Self::schema()
            .iter()
            .filter(|spec| matches!(spec.kind, FieldKind::Phone))
            .map(|spec| spec.name)
            .collect()
    }
}
