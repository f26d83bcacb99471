use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ICAO 9303 MRZ layout class, identified purely by line geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MrzFormat {
    /// Identity card: 3 lines of 30 characters.
    #[serde(rename = "TD1")]
    Td1,
    /// Larger identity card: 2 lines of 36 characters.
    #[serde(rename = "TD2")]
    Td2,
    /// Passport: 2 lines of 44 characters.
    #[serde(rename = "TD3")]
    Td3,
}

impl MrzFormat {
    pub fn line_count(self) -> usize {
        match self {
            MrzFormat::Td1 => 3,
            MrzFormat::Td2 | MrzFormat::Td3 => 2,
        }
    }

    pub fn line_width(self) -> usize {
        match self {
            MrzFormat::Td1 => 30,
            MrzFormat::Td2 => 36,
            MrzFormat::Td3 => 44,
        }
    }
}

impl std::fmt::Display for MrzFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MrzFormat::Td1 => write!(f, "TD1"),
            MrzFormat::Td2 => write!(f, "TD2"),
            MrzFormat::Td3 => write!(f, "TD3"),
        }
    }
}

/// Surname and given names split out of a packed MRZ name field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameParts {
    pub primary: String,
    pub secondary: String,
}

/// ICAO 9303 check digit results.
///
/// `None` means the layout carries no check position for the field, or the
/// check character on the document is not a digit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckDigits {
    pub document_number: Option<bool>,
    pub birth_date: Option<bool>,
    pub expiry_date: Option<bool>,
}

impl CheckDigits {
    /// True when no check that could be evaluated has failed.
    pub fn all_valid(&self) -> bool {
        [self.document_number, self.birth_date, self.expiry_date]
            .iter()
            .all(|c| *c != Some(false))
    }
}

/// A successfully decoded MRZ block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedDocument {
    #[serde(rename = "type")]
    pub format: MrzFormat,
    /// Never contains `<` or spaces.
    pub document_number: String,
    pub last_name: String,
    pub first_name: String,
    /// `YYYY-MM-DD`, or `None` when the field was malformed.
    pub birth_date: Option<String>,
    pub expiry_date: Option<String>,
    pub sex: String,
    /// Issuing nationality; only TD3 carries it in this layout.
    pub nationality: Option<String>,
    pub check_digits: CheckDigits,
    /// The blob exactly as it was handed to the decoder.
    pub raw_data: String,
}

impl DecodedDocument {
    pub fn birth_date_parsed(&self) -> Option<NaiveDate> {
        parse_iso(self.birth_date.as_deref()?)
    }

    pub fn expiry_date_parsed(&self) -> Option<NaiveDate> {
        parse_iso(self.expiry_date.as_deref()?)
    }

    /// Whether the document expired before `today`. The expiry day itself is
    /// still valid. `None` when the expiry date is missing or not a real date.
    pub fn is_expired(&self, today: NaiveDate) -> Option<bool> {
        self.expiry_date_parsed().map(|expiry| expiry < today)
    }
}

fn parse_iso(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    #[error("format not recognized")]
    UnrecognizedFormat,
}

/// A blob that could not be decoded. Carries the input untouched so the caller
/// can log it or ask the operator for a rescan.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{reason} (line widths {line_widths:?})")]
pub struct DecodeFailure {
    pub reason: FailureReason,
    /// Character width of every non-empty line that was seen.
    pub line_widths: Vec<usize>,
    pub raw_data: String,
}

impl DecodeFailure {
    pub fn unrecognized(raw: &str) -> Self {
        Self {
            reason: FailureReason::UnrecognizedFormat,
            line_widths: crate::detect::mrz_lines(raw)
                .iter()
                .map(|l| l.chars().count())
                .collect(),
            raw_data: raw.to_string(),
        }
    }
}

pub type DecodeResult = Result<DecodedDocument, DecodeFailure>;
