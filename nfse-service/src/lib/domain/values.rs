//! Validated value types shared by the entities.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error for Name validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,

    #[error("Name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for PhoneNumber validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PhoneNumberError {
    #[error("Incorrect phone number: {0}")]
    Unparseable(String),

    #[error("Invalid phone number: {0}")]
    Invalid(String),
}

/// Error for DocumentNumber validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Document must contain only digits and the separators '.', '/', '-'")]
    InvalidCharacters,

    #[error("Document must have 11 (CPF) or 14 (CNPJ) digits, got {0}")]
    InvalidLength(usize),

    #[error("CNPJ must have 14 digits, got {0}")]
    NotCnpj(usize),
}

/// Error for Code validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodeError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} too long: maximum {max} characters, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// Error for Amount validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("{field} must be a decimal number with at most two decimal places")]
    Malformed { field: &'static str },

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("{field} is too large")]
    TooLarge { field: &'static str },
}

/// Error for Description validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DescriptionError {
    #[error("Description too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Display name of a person or organization.
///
/// Trimmed, non-empty, at most 100 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(String);

impl Name {
    const MAX_LENGTH: usize = 100;

    pub fn new(name: String) -> Result<Self, NameError> {
        let trimmed = name.trim();
        let length = trimmed.chars().count();

        if length == 0 {
            Err(NameError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(NameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser. Stored exactly
/// as given; comparisons are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Phone number normalized to E.164.
///
/// Numbers without a country code are read as Brazilian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse, validate and normalize a phone number.
    ///
    /// Every character other than digits and `+` is discarded first, so
    /// "(11) 98765-4321" and "+55 11 98765 4321" normalize identically.
    ///
    /// # Errors
    /// * `Unparseable` - Not recognizable as a phone number
    /// * `Invalid` - Parsed, but not a valid number for its region
    pub fn new(phone: String) -> Result<Self, PhoneNumberError> {
        let cleaned: String = phone
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();

        let parsed = phonenumber::parse(Some(phonenumber::country::Id::BR), &cleaned)
            .map_err(|e| PhoneNumberError::Unparseable(format!("{}: {}", phone, e)))?;

        if !phonenumber::is_valid(&parsed) {
            return Err(PhoneNumberError::Invalid(phone));
        }

        Ok(Self(
            parsed.format().mode(phonenumber::Mode::E164).to_string(),
        ))
    }

    /// Wrap a value already normalized by `new` (e.g. read back from storage).
    pub(crate) fn from_normalized(e164: String) -> Self {
        Self(e164)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// CPF or CNPJ tax document number.
///
/// Kept as submitted (trimmed); validation only looks at the digits left
/// after removing the usual separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNumber(String);

impl DocumentNumber {
    const CPF_DIGITS: usize = 11;
    const CNPJ_DIGITS: usize = 14;

    /// Accept either a CPF (11 digits) or a CNPJ (14 digits).
    pub fn new(document: String) -> Result<Self, DocumentError> {
        let digits = Self::count_digits(&document)?;
        if digits == Self::CPF_DIGITS || digits == Self::CNPJ_DIGITS {
            Ok(Self(document.trim().to_string()))
        } else {
            Err(DocumentError::InvalidLength(digits))
        }
    }

    /// Accept only a CNPJ (14 digits).
    pub fn cnpj(document: String) -> Result<Self, DocumentError> {
        let digits = Self::count_digits(&document)?;
        if digits == Self::CNPJ_DIGITS {
            Ok(Self(document.trim().to_string()))
        } else {
            Err(DocumentError::NotCnpj(digits))
        }
    }

    pub(crate) fn from_stored(document: String) -> Self {
        Self(document)
    }

    fn count_digits(document: &str) -> Result<usize, DocumentError> {
        let mut digits = 0;
        for c in document.trim().chars() {
            match c {
                '0'..='9' => digits += 1,
                '.' | '/' | '-' | ' ' => {}
                _ => return Err(DocumentError::InvalidCharacters),
            }
        }
        Ok(digits)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Free-text description, at most 1000 characters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Description(String);

impl Description {
    const MAX_LENGTH: usize = 1000;

    pub fn new(description: String) -> Result<Self, DescriptionError> {
        let length = description.chars().count();
        if length > Self::MAX_LENGTH {
            Err(DescriptionError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(description))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Short identifier printed on an invoice (number, series, CFOP).
///
/// Trimmed, non-empty, bounded by the column it is stored in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code(String);

impl Code {
    pub fn new(field: &'static str, code: String, max: usize) -> Result<Self, CodeError> {
        let trimmed = code.trim();
        let length = trimmed.chars().count();

        if length == 0 {
            Err(CodeError::Empty { field })
        } else if length > max {
            Err(CodeError::TooLong {
                field,
                max,
                actual: length,
            })
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub(crate) fn from_stored(code: String) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Non-negative amount of money held as integer cents.
///
/// Parsed from decimal text with at most two fractional digits and
/// displayed with exactly two (`1500.00`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(i64);

impl Amount {
    /// Largest amount a `NUMERIC(12, 2)` column holds.
    const MAX_CENTS: i64 = 999_999_999_999;

    /// Parse an amount that may be zero.
    pub fn parse(field: &'static str, text: &str) -> Result<Self, AmountError> {
        let text = text.trim();
        let (negative, magnitude) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (units, fraction) = magnitude.split_once('.').unwrap_or((magnitude, ""));

        let well_formed = !(units.is_empty() && fraction.is_empty())
            && fraction.len() <= 2
            && units.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit());
        if !well_formed {
            return Err(AmountError::Malformed { field });
        }

        let padding = std::iter::repeat(b'0').take(2 - fraction.len());
        let mut cents: i64 = 0;
        for digit in units.bytes().chain(fraction.bytes()).chain(padding) {
            cents = cents
                .checked_mul(10)
                .and_then(|c| c.checked_add(i64::from(digit - b'0')))
                .ok_or(AmountError::TooLarge { field })?;
        }

        if cents > Self::MAX_CENTS {
            return Err(AmountError::TooLarge { field });
        }
        if negative && cents > 0 {
            return Err(AmountError::Negative { field });
        }

        Ok(Self(cents))
    }

    /// Parse an amount that must be greater than zero.
    pub fn positive(field: &'static str, text: &str) -> Result<Self, AmountError> {
        let amount = Self::parse(field, text)?;
        if amount.0 == 0 {
            return Err(AmountError::NotPositive { field });
        }
        Ok(amount)
    }

    pub(crate) fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Remove the `.`, `/` and `-` separators used in formatted CPF/CNPJ.
pub fn strip_document_separators(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '.' | '/' | '-'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_parses_to_cents() {
        assert_eq!(Amount::parse("icms", "1500").unwrap().cents(), 150_000);
        assert_eq!(Amount::parse("icms", "1500.5").unwrap().cents(), 150_050);
        assert_eq!(Amount::parse("icms", " 0.07 ").unwrap().cents(), 7);
        assert_eq!(Amount::parse("icms", ".5").unwrap().cents(), 50);
        assert_eq!(Amount::parse("icms", "0").unwrap().cents(), 0);
        assert_eq!(Amount::parse("icms", "-0.00").unwrap().cents(), 0);
    }

    #[test]
    fn test_amount_display_has_two_decimals() {
        assert_eq!(Amount::parse("total", "1500").unwrap().to_string(), "1500.00");
        assert_eq!(Amount::parse("total", "3.5").unwrap().to_string(), "3.50");
        assert_eq!(Amount::from_cents(7).to_string(), "0.07");
    }

    #[test]
    fn test_amount_rejections() {
        for text in ["", ".", "1.234", "1e3", "12,50", "abc", "1.2.3", "+5"] {
            assert_eq!(
                Amount::parse("total", text),
                Err(AmountError::Malformed { field: "total" }),
                "{}",
                text
            );
        }
        assert_eq!(
            Amount::parse("discount", "-0.01"),
            Err(AmountError::Negative { field: "discount" })
        );
        assert_eq!(
            Amount::parse("total", "10000000000"),
            Err(AmountError::TooLarge { field: "total" })
        );
        assert_eq!(
            Amount::parse("total", "99999999999999999999999"),
            Err(AmountError::TooLarge { field: "total" })
        );
    }

    #[test]
    fn test_positive_amount_rejects_zero() {
        assert_eq!(
            Amount::positive("total", "0.00"),
            Err(AmountError::NotPositive { field: "total" })
        );
        assert_eq!(Amount::positive("total", "0.01").unwrap().cents(), 1);
    }

    #[test]
    fn test_code_trimmed_and_bounded() {
        assert_eq!(Code::new("series", " 1 ".to_string(), 20).unwrap().as_str(), "1");
        assert_eq!(
            Code::new("series", "  ".to_string(), 20),
            Err(CodeError::Empty { field: "series" })
        );
        assert_eq!(
            Code::new("cfop", "12345678901".to_string(), 10),
            Err(CodeError::TooLong {
                field: "cfop",
                max: 10,
                actual: 11
            })
        );
    }

    #[test]
    fn test_name_trimmed() {
        let name = Name::new("  Abacus Ltd ".to_string()).unwrap();
        assert_eq!(name.as_str(), "Abacus Ltd");
    }

    #[test]
    fn test_name_rejects_blank_and_long() {
        assert_eq!(Name::new("   ".to_string()), Err(NameError::Empty));
        assert_eq!(
            Name::new("x".repeat(101)),
            Err(NameError::TooLong {
                max: 100,
                actual: 101
            })
        );
    }

    #[test]
    fn test_email_kept_as_given() {
        let email = EmailAddress::new("Ana.Souza@Example.com".to_string()).unwrap();
        assert_eq!(email.as_str(), "Ana.Souza@Example.com");
        assert!(EmailAddress::new("not-an-email".to_string()).is_err());
    }

    #[test]
    fn test_phone_normalized_to_e164() {
        let local = PhoneNumber::new("(11) 98765-4321".to_string()).unwrap();
        let international = PhoneNumber::new("+55 11 98765 4321".to_string()).unwrap();

        assert_eq!(local.as_str(), "+5511987654321");
        assert_eq!(local, international);
    }

    #[test]
    fn test_phone_rejects_garbage() {
        assert!(PhoneNumber::new("abc".to_string()).is_err());
        assert!(PhoneNumber::new("123".to_string()).is_err());
    }

    #[test]
    fn test_document_accepts_cpf_and_cnpj() {
        let cpf = DocumentNumber::new("123.456.789-09".to_string()).unwrap();
        let cnpj = DocumentNumber::new("12.345.678/0001-99".to_string()).unwrap();

        assert_eq!(cpf.as_str(), "123.456.789-09");
        assert_eq!(cnpj.as_str(), "12.345.678/0001-99");
    }

    #[test]
    fn test_document_rejections() {
        assert_eq!(
            DocumentNumber::new("1234".to_string()),
            Err(DocumentError::InvalidLength(4))
        );
        assert_eq!(
            DocumentNumber::new("12a.456.789-09".to_string()),
            Err(DocumentError::InvalidCharacters)
        );
        assert_eq!(
            DocumentNumber::cnpj("123.456.789-09".to_string()),
            Err(DocumentError::NotCnpj(11))
        );
    }

    #[test]
    fn test_description_limit() {
        assert!(Description::new("Emissão de notas".to_string()).is_ok());
        assert!(Description::new("d".repeat(1001)).is_err());
    }

    #[test]
    fn test_strip_document_separators() {
        assert_eq!(strip_document_separators("12.345.678/0001-99"), "12345678000199");
        assert_eq!(strip_document_separators("Globex"), "Globex");
    }
}
