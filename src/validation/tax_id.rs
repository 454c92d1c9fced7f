use std::fmt;

use crate::error::ValidationError;

const DIGITS: usize = 11;
const FIRST_WEIGHTS: [u32; 9] = [10, 9, 8, 7, 6, 5, 4, 3, 2];
const SECOND_WEIGHTS: [u32; 10] = [11, 10, 9, 8, 7, 6, 5, 4, 3, 2];

/// An 11-digit taxpayer identifier whose check digits have been verified.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaxId([u8; DIGITS]);

impl TaxId {
    /// Digits only, e.g. `11144477735`.
    pub fn digits(&self) -> String {
        self.0.iter().map(|d| char::from(b'0' + d)).collect()
    }

    /// Canonical punctuated form, e.g. `111.444.777-35`.
    pub fn formatted(&self) -> String {
        let d = self.digits();
        format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
    }

    /// True when `text` carries the same digits, whatever its punctuation.
    pub fn matches(&self, text: &str) -> bool {
        let other: Vec<u8> = digits_of(text);
        other.as_slice() == self.0.as_slice()
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl fmt::Debug for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaxId({})", self.formatted())
    }
}

fn digits_of(text: &str) -> Vec<u8> {
    text.chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| d as u8)
        .collect()
}

fn check_digit(digits: &[u8], weights: &[u32]) -> u8 {
    let sum: u32 = digits
        .iter()
        .zip(weights)
        .map(|(d, w)| u32::from(*d) * w)
        .sum();
    let rest = sum % 11;
    if rest < 2 {
        0
    } else {
        (11 - rest) as u8
    }
}

/// Validates a punctuated or bare tax ID and returns its typed form.
///
/// Punctuation is stripped first; exactly 11 digits must remain. Inputs made of
/// a single repeated digit are rejected even though their check digits work out.
pub fn validate_tax_id(raw: &str) -> Result<TaxId, ValidationError> {
    let digits = digits_of(raw);
    if digits.len() < DIGITS {
        return Err(ValidationError::TooShort);
    }
    if digits.len() > DIGITS {
        return Err(ValidationError::TooLong);
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return Err(ValidationError::AllDigitsEqual);
    }

    let first = check_digit(&digits[..9], &FIRST_WEIGHTS);
    let second = check_digit(&digits[..10], &SECOND_WEIGHTS);
    if digits[9] != first || digits[10] != second {
        return Err(ValidationError::CheckDigitMismatch);
    }

    let mut out = [0u8; DIGITS];
    out.copy_from_slice(&digits);
    Ok(TaxId(out))
}
