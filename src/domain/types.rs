// ==========================================
// Sponsorship MIS - domain type definitions
// ==========================================
// Choice sets mirror the drop-down values of the
// administration screens; the canonical value is
// what gets stored.
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One allowed value of a fixed choice set (stored value + display label)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

impl Choice {
    pub const fn same(value: &'static str) -> Self {
        Self {
            value,
            label: value,
        }
    }

    pub const fn labelled(value: &'static str, label: &'static str) -> Self {
        Self { value, label }
    }
}

/// Resolve raw input against a choice set (value or label, case-insensitive)
pub fn match_choice(choices: &[Choice], raw: &str) -> Option<&'static str> {
    let needle = raw.trim();
    choices
        .iter()
        .find(|c| c.value.eq_ignore_ascii_case(needle) || c.label.eq_ignore_ascii_case(needle))
        .map(|c| c.value)
}

/// Error returned when a stored value is outside its choice set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {type_name}")]
pub struct UnknownChoice {
    pub type_name: &'static str,
    pub value: String,
}

// ==========================================
// Entity kind (import target)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Child,
    Sponsor,
    Client,
    ChartOfAccount,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Child,
        EntityKind::Sponsor,
        EntityKind::Client,
        EntityKind::ChartOfAccount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Child => "child",
            EntityKind::Sponsor => "sponsor",
            EntityKind::Client => "client",
            EntityKind::ChartOfAccount => "chart_of_account",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "child" | "children" => Ok(EntityKind::Child),
            "sponsor" | "sponsors" => Ok(EntityKind::Sponsor),
            "client" | "clients" => Ok(EntityKind::Client),
            "chart_of_account" | "chart_of_accounts" | "account" | "accounts" => {
                Ok(EntityKind::ChartOfAccount)
            }
            _ => Err(UnknownChoice {
                type_name: "entity kind",
                value: s.to_string(),
            }),
        }
    }
}

// ==========================================
// Gender
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const CHOICES: &'static [Choice] = &[Choice::same("Male"), Choice::same("Female")];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl FromStr for Gender {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match match_choice(Self::CHOICES, s) {
            Some("Male") => Ok(Gender::Male),
            Some("Female") => Ok(Gender::Female),
            _ => Err(UnknownChoice {
                type_name: "gender",
                value: s.to_string(),
            }),
        }
    }
}

// ==========================================
// Yes / No answers
// ==========================================
// Stored as text ("Yes"/"No") on the parent and departure columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub const CHOICES: &'static [Choice] = &[Choice::same("Yes"), Choice::same("No")];

    pub fn as_str(&self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        }
    }
}

impl FromStr for YesNo {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match match_choice(Self::CHOICES, s) {
            Some("Yes") => Ok(YesNo::Yes),
            Some("No") => Ok(YesNo::No),
            _ => Err(UnknownChoice {
                type_name: "yes/no answer",
                value: s.to_string(),
            }),
        }
    }
}

// ==========================================
// Religion
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Religion {
    BornAgainChristian,
    Anglican,
    Catholic,
    Muslim,
}

impl Religion {
    pub const CHOICES: &'static [Choice] = &[
        Choice::same("Born-again Christian"),
        Choice::same("Anglican"),
        Choice::same("Catholic"),
        Choice::same("Muslim"),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Religion::BornAgainChristian => "Born-again Christian",
            Religion::Anglican => "Anglican",
            Religion::Catholic => "Catholic",
            Religion::Muslim => "Muslim",
        }
    }
}

impl FromStr for Religion {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match match_choice(Self::CHOICES, s) {
            Some("Born-again Christian") => Ok(Religion::BornAgainChristian),
            Some("Anglican") => Ok(Religion::Anglican),
            Some("Catholic") => Ok(Religion::Catholic),
            Some("Muslim") => Ok(Religion::Muslim),
            _ => Err(UnknownChoice {
                type_name: "religion",
                value: s.to_string(),
            }),
        }
    }
}

// ==========================================
// Sponsorship type
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SponsorshipType {
    ChildFullSupport,
    ChildCoSupport,
    FamilyFullSupport,
    FamilyCoSupport,
    GeneralSupport,
}

impl SponsorshipType {
    pub const CHOICES: &'static [Choice] = &[
        Choice::same("Child full support"),
        Choice::same("Child co-support"),
        Choice::same("Family full support"),
        Choice::same("Family co-support"),
        Choice::same("General support"),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SponsorshipType::ChildFullSupport => "Child full support",
            SponsorshipType::ChildCoSupport => "Child co-support",
            SponsorshipType::FamilyFullSupport => "Family full support",
            SponsorshipType::FamilyCoSupport => "Family co-support",
            SponsorshipType::GeneralSupport => "General support",
        }
    }
}

impl FromStr for SponsorshipType {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match match_choice(Self::CHOICES, s) {
            Some("Child full support") => Ok(SponsorshipType::ChildFullSupport),
            Some("Child co-support") => Ok(SponsorshipType::ChildCoSupport),
            Some("Family full support") => Ok(SponsorshipType::FamilyFullSupport),
            Some("Family co-support") => Ok(SponsorshipType::FamilyCoSupport),
            Some("General support") => Ok(SponsorshipType::GeneralSupport),
            _ => Err(UnknownChoice {
                type_name: "sponsorship type",
                value: s.to_string(),
            }),
        }
    }
}

// ==========================================
// Account type (chart of accounts)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountType {
    pub const CHOICES: &'static [Choice] = &[
        Choice::labelled("asset", "Asset"),
        Choice::labelled("liability", "Liability"),
        Choice::labelled("equity", "Equity"),
        Choice::labelled("revenue", "Revenue"),
        Choice::labelled("expense", "Expense"),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Asset => "asset",
            AccountType::Liability => "liability",
            AccountType::Equity => "equity",
            AccountType::Revenue => "revenue",
            AccountType::Expense => "expense",
        }
    }
}

impl FromStr for AccountType {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match match_choice(Self::CHOICES, s) {
            Some("asset") => Ok(AccountType::Asset),
            Some("liability") => Ok(AccountType::Liability),
            Some("equity") => Ok(AccountType::Equity),
            Some("revenue") => Ok(AccountType::Revenue),
            Some("expense") => Ok(AccountType::Expense),
            _ => Err(UnknownChoice {
                type_name: "account type",
                value: s.to_string(),
            }),
        }
    }
}
