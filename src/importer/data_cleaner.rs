// ==========================================
// Sponsorship MIS - value cleaning
// ==========================================
// Whitespace, bool, date and phone parsing.
// Shared by the row validator and contact maintenance.
// ==========================================

use chrono::NaiveDate;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

const PHONE_SEPARATORS: &[char] = &[' ', '-', '.', '(', ')', '\u{a0}'];

pub const PHONE_MIN_DIGITS: usize = 7;
pub const PHONE_MAX_DIGITS: usize = 15;

pub struct DataCleaner;

impl DataCleaner {
    pub fn collapse_whitespace(&self, value: &str) -> String {
        value.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// yes/no, y/n, true/false, 1/0 (case-insensitive)
    pub fn parse_bool(&self, value: &str) -> Option<bool> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" | "1" => Some(true),
            "no" | "n" | "false" | "0" => Some(false),
            _ => None,
        }
    }

    pub fn parse_date(&self, value: &str) -> Option<NaiveDate> {
        let trimmed = value.trim();
        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
                return Some(date);
            }
        }

        // ISO date-time: keep the date part
        if trimmed.len() > 10 && matches!(trimmed.as_bytes()[10], b'T' | b' ') {
            return trimmed
                .get(..10)
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
        }
        None
    }

    /// Strip separators and prefix `+`; idempotent
    pub fn normalize_phone(&self, value: &str) -> Result<String, String> {
        let stripped: String = value
            .trim()
            .chars()
            .filter(|c| !PHONE_SEPARATORS.contains(c))
            .collect();
        let digits = stripped.strip_prefix('+').unwrap_or(&stripped);

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err("is not a valid phone number".to_string());
        }
        if digits.len() < PHONE_MIN_DIGITS || digits.len() > PHONE_MAX_DIGITS {
            return Err(format!(
                "must have between {} and {} digits",
                PHONE_MIN_DIGITS, PHONE_MAX_DIGITS
            ));
        }
        Ok(format!("+{}", digits))
    }

    /// Rewrite of a stored contact value, `None` when already normalized
    pub fn ensure_plus_prefix(&self, value: &str) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.starts_with('+') {
            return None;
        }
        Some(
            self.normalize_phone(trimmed)
                .unwrap_or_else(|_| format!("+{}", trimmed)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_bool("YES"), Some(true));
        assert_eq!(cleaner.parse_bool("n"), Some(false));
        assert_eq!(cleaner.parse_bool("0"), Some(false));
        assert_eq!(cleaner.parse_bool("maybe"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let cleaner = DataCleaner;
        let expected = NaiveDate::from_ymd_opt(2012, 3, 4);
        assert_eq!(cleaner.parse_date("2012-03-04"), expected);
        assert_eq!(cleaner.parse_date("20120304"), expected);
        assert_eq!(cleaner.parse_date("04/03/2012"), expected);
        assert_eq!(cleaner.parse_date("04-03-2012"), expected);
        assert_eq!(cleaner.parse_date("2012-03-04T10:30:00"), expected);
        assert_eq!(cleaner.parse_date("March 4th"), None);
    }

    #[test]
    fn test_normalize_phone_prefixes_once() {
        let cleaner = DataCleaner;
        let once = cleaner.normalize_phone("0772000111").unwrap();
        assert_eq!(once, "+0772000111");
        assert_eq!(cleaner.normalize_phone(&once).unwrap(), once);
    }

    #[test]
    fn test_normalize_phone_strips_separators() {
        let cleaner = DataCleaner;
        assert_eq!(
            cleaner.normalize_phone("+256 (772) 000-111").unwrap(),
            "+256772000111"
        );
        assert!(cleaner.normalize_phone("call me").is_err());
        assert!(cleaner.normalize_phone("12345").is_err());
    }

    #[test]
    fn test_ensure_plus_prefix() {
        let cleaner = DataCleaner;
        assert_eq!(
            cleaner.ensure_plus_prefix("0772 000 111"),
            Some("+0772000111".to_string())
        );
        assert_eq!(cleaner.ensure_plus_prefix("+256772000111"), None);
        assert_eq!(cleaner.ensure_plus_prefix(""), None);
    }
}
