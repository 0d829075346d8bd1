//! Pairing request parsing, validation, and pairing-code formatting.

use serde::Deserialize;
use std::fmt;

use crate::calling_codes;

/// Raw query parameters accepted by the pairing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PairingParams {
    pub number: Option<String>,
    #[serde(rename = "pairingCode")]
    pub pairing_code: Option<String>,
    pub mobile: Option<String>,
}

/// How the new device will be linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingMode {
    /// Scan a QR code printed on the server terminal.
    Qr,
    /// Request a pairing code for the given (digit-only) phone number.
    PairingCode { phone: String },
}

/// A parsed pairing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingRequest {
    pub mode: PairingMode,
    pub mobile: bool,
}

/// Why a pairing request was refused before a client was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MobileUnsupported,
    InvalidNumber,
}

impl Rejection {
    /// Response body sent to the caller.
    pub fn message(&self) -> &'static str {
        match self {
            Self::MobileUnsupported => "Cannot use pairing code with mobile API",
            Self::InvalidNumber => {
                "Invalid phone number. Start with the country code, e.g., +2349159895444."
            }
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Strip everything except ASCII digits.
pub fn clean_number(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Split a raw pairing code into hyphen-joined groups of four characters.
///
/// `"ABCD1234EFGH"` becomes `"ABCD-1234-EFGH"`; a trailing short group is kept.
pub fn format_pairing_code(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().filter(|c| !c.is_whitespace()).collect();
    chars
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

fn flag(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

impl PairingRequest {
    /// Derive the pairing mode from query parameters.
    ///
    /// A non-empty cleaned number or a non-empty `pairingCode` selects
    /// pairing-code mode; otherwise the session links by QR code.
    pub fn from_params(params: &PairingParams) -> Self {
        let phone = clean_number(params.number.as_deref().unwrap_or_default());
        let mode = if !phone.is_empty() || flag(&params.pairing_code) {
            PairingMode::PairingCode { phone }
        } else {
            PairingMode::Qr
        };
        Self {
            mode,
            mobile: flag(&params.mobile),
        }
    }

    pub fn is_pairing_code(&self) -> bool {
        matches!(self.mode, PairingMode::PairingCode { .. })
    }

    /// Validate a pairing-code request and return the phone number to pair.
    ///
    /// The mobile check runs first, then the calling-code check.
    pub fn validate(&self) -> Result<String, Rejection> {
        if self.mobile {
            return Err(Rejection::MobileUnsupported);
        }
        match &self.mode {
            PairingMode::PairingCode { phone } if calling_codes::is_known_prefix(phone) => {
                Ok(phone.clone())
            }
            _ => Err(Rejection::InvalidNumber),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(number: Option<&str>, code: Option<&str>, mobile: Option<&str>) -> PairingParams {
        PairingParams {
            number: number.map(String::from),
            pairing_code: code.map(String::from),
            mobile: mobile.map(String::from),
        }
    }

    #[test]
    fn test_clean_number_strips_formatting() {
        assert_eq!(clean_number("+234 (915) 989-5444"), "2349159895444");
        assert_eq!(clean_number("abc"), "");
    }

    #[test]
    fn test_format_pairing_code_groups_of_four() {
        assert_eq!(format_pairing_code("ABCD1234EFGH"), "ABCD-1234-EFGH");
        assert_eq!(format_pairing_code("ABCD1234"), "ABCD-1234");
        assert_eq!(format_pairing_code("ABCDE"), "ABCD-E");
        assert_eq!(format_pairing_code(""), "");
    }

    #[test]
    fn test_number_selects_pairing_code_mode() {
        let req = PairingRequest::from_params(&params(Some("+2349159895444"), None, None));
        assert_eq!(
            req.mode,
            PairingMode::PairingCode {
                phone: "2349159895444".into()
            }
        );
        assert!(!req.mobile);
    }

    #[test]
    fn test_pairing_code_flag_without_number() {
        let req = PairingRequest::from_params(&params(None, Some("1"), None));
        assert!(req.is_pairing_code());
        assert_eq!(req.validate(), Err(Rejection::InvalidNumber));
    }

    #[test]
    fn test_empty_params_select_qr_mode() {
        let req = PairingRequest::from_params(&params(Some(""), Some(""), None));
        assert_eq!(req.mode, PairingMode::Qr);
    }

    #[test]
    fn test_mobile_rejected_before_number_check() {
        let req = PairingRequest::from_params(&params(Some("0000"), None, Some("1")));
        assert_eq!(req.validate(), Err(Rejection::MobileUnsupported));
    }

    #[test]
    fn test_unknown_prefix_rejected() {
        let req = PairingRequest::from_params(&params(Some("0123456789"), None, None));
        assert_eq!(req.validate(), Err(Rejection::InvalidNumber));
    }

    #[test]
    fn test_valid_number_passes() {
        let req = PairingRequest::from_params(&params(Some("234-915-989-5444"), None, None));
        assert_eq!(req.validate(), Ok("2349159895444".to_string()));
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            Rejection::MobileUnsupported.to_string(),
            "Cannot use pairing code with mobile API"
        );
        assert!(Rejection::InvalidNumber
            .message()
            .starts_with("Invalid phone number."));
    }
}
