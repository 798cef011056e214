//! # Filing Number Value Object
//!
//! The official filing number ("número de radicado") assigned to every
//! accepted procedure: `DANE-TYPE-YY-NNNN`, e.g. `11001-0-25-0001` for the
//! first 2025 filing of Bogotá's planning secretaría, or `11001-CUR-25-0001`
//! for a curaduría.
//!
//! The string is a durable legal identifier. The wire contract is byte-exact
//! (`^\d{5}-(0|CUR)-\d{2}-\d{4}$`) and round-trips losslessly:
//! `parse(format(x)) == x` for every valid component combination.

use serde::{Deserialize, Serialize};

use crate::error::{FilingNumberError, ValidationError};
use crate::identity::DaneCode;
use crate::numbering::NumberingType;

/// A calendar year in the window representable by the two-digit wire
/// segment. Filing numbers carry only the last two digits, so the pivot
/// century is fixed at 2000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilingYear(u16);

impl FilingYear {
    /// First representable year.
    pub const MIN: u16 = 2000;
    /// Last representable year.
    pub const MAX: u16 = 2099;

    /// Create a filing year, validating the representable window.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidFilingYear`] outside 2000..=2099.
    pub fn new(year: u16) -> Result<Self, ValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&year) {
            return Err(ValidationError::InvalidFilingYear(year));
        }
        Ok(Self(year))
    }

    /// Resolve a two-digit wire year against the fixed pivot century.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidFilingYear`] if `yy > 99`.
    pub fn from_two_digit(yy: u8) -> Result<Self, ValidationError> {
        if yy > 99 {
            return Err(ValidationError::InvalidFilingYear(2000 + u16::from(yy)));
        }
        Ok(Self(2000 + u16::from(yy)))
    }

    /// The current filing year in UTC, clamped to the representable window.
    pub fn current() -> Self {
        use chrono::Datelike;
        let year = chrono::Utc::now().year().clamp(2000, 2099) as u16;
        Self(year)
    }

    /// The full 4-digit year value.
    pub fn value(&self) -> u16 {
        self.0
    }

    /// The last two digits, as rendered on the wire.
    pub fn two_digit(&self) -> u8 {
        (self.0 % 100) as u8
    }
}

impl std::fmt::Display for FilingYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An official filing number, decomposed into its validated components.
///
/// Construction is the only way to obtain one: either [`FilingNumber::new`]
/// from already-validated components, or [`str::parse`] from the wire
/// string. Both enforce the sequence bounds (1..=9999), so every value of
/// this type renders to a wire-conformant string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilingNumber {
    dane: DaneCode,
    numbering_type: NumberingType,
    year: FilingYear,
    sequence: u32,
}

impl FilingNumber {
    /// Largest sequence the 4-digit field can carry.
    pub const SEQUENCE_MAX: u32 = 9999;

    /// Assemble a filing number from validated components.
    ///
    /// # Errors
    ///
    /// Returns [`FilingNumberError::SequenceSegment`] if `sequence` is 0 or
    /// exceeds [`Self::SEQUENCE_MAX`].
    pub fn new(
        dane: DaneCode,
        numbering_type: NumberingType,
        year: FilingYear,
        sequence: u32,
    ) -> Result<Self, FilingNumberError> {
        if sequence == 0 || sequence > Self::SEQUENCE_MAX {
            return Err(FilingNumberError::SequenceSegment(format!("{sequence}")));
        }
        Ok(Self {
            dane,
            numbering_type,
            year,
            sequence,
        })
    }

    /// The municipality code segment.
    pub fn dane_code(&self) -> &DaneCode {
        &self.dane
    }

    /// The numbering-type segment.
    pub fn numbering_type(&self) -> NumberingType {
        self.numbering_type
    }

    /// The filing year (resolved against the pivot century when parsed).
    pub fn year(&self) -> FilingYear {
        self.year
    }

    /// The sequence component, 1..=9999.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl std::fmt::Display for FilingNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{:02}-{:04}",
            self.dane,
            self.numbering_type.code(),
            self.year.two_digit(),
            self.sequence
        )
    }
}

impl std::str::FromStr for FilingNumber {
    type Err = FilingNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split('-').collect();
        if segments.len() != 4 {
            return Err(FilingNumberError::SegmentCount(segments.len()));
        }

        let dane = DaneCode::new(segments[0])
            .map_err(|_| FilingNumberError::DaneSegment(segments[0].to_string()))?;
        let numbering_type = NumberingType::from_code(segments[1])?;

        let yy_segment = segments[2];
        if yy_segment.len() != 2 || !yy_segment.chars().all(|c| c.is_ascii_digit()) {
            return Err(FilingNumberError::YearSegment(yy_segment.to_string()));
        }
        let yy: u8 = yy_segment
            .parse()
            .map_err(|_| FilingNumberError::YearSegment(yy_segment.to_string()))?;
        let year = FilingYear::from_two_digit(yy)
            .map_err(|_| FilingNumberError::YearSegment(yy_segment.to_string()))?;

        let seq_segment = segments[3];
        if seq_segment.len() != 4 || !seq_segment.chars().all(|c| c.is_ascii_digit()) {
            return Err(FilingNumberError::SequenceSegment(seq_segment.to_string()));
        }
        let sequence: u32 = seq_segment
            .parse()
            .map_err(|_| FilingNumberError::SequenceSegment(seq_segment.to_string()))?;

        Self::new(dane, numbering_type, year, sequence)
    }
}

impl Serialize for FilingNumber {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FilingNumber {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
