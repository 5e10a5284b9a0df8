//! Error types for the Mobile Giving client.
//!
//! # Design
//! Every classified result code group gets its own variant so callers can
//! branch on the kind: a bad campaign or phone number is something the donor
//! or operator can fix, bad credentials are a deployment problem. Codes with
//! no dedicated mapping land in `Service` with the raw code preserved.
//! Transport failures are kept apart from service failures because they are
//! raised before any XML is looked at.

use thiserror::Error;

use crate::classify::result_code_name;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MgfError>;

/// Errors returned by every client operation. All of them are fatal to the
/// call that produced them; nothing is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MgfError {
    /// Non-2xx HTTP status, an absent body, or a failure inside the transport.
    #[error("transport failure{}: {message}", status_suffix(.status))]
    Transport { status: Option<u16>, message: String },

    /// Result code 1.
    #[error("invalid credentials: {0}")]
    Credentials(String),

    /// Result codes 2 and 9: unknown campaign, or carrier not running it.
    #[error("invalid campaign: {0}")]
    Campaign(String),

    /// Result codes 3 and 7: malformed phone number or area code.
    #[error("invalid phone number: {0}")]
    PhoneFormat(String),

    /// Result code 6.
    #[error("invalid shortcode: {0}")]
    Shortcode(String),

    /// Result code 8.
    #[error("campaign not running: {0}")]
    CampaignNotRunning(String),

    /// Any other nonzero result code.
    #[error("service error {code}{}: {text}", code_suffix(.code))]
    Service { code: i64, text: String },

    /// The response passed classification but could not be read: malformed
    /// XML, an unexpected root, a non-numeric integer field, or a missing
    /// required field.
    #[error("malformed response: {0}")]
    Parse(String),
}

impl MgfError {
    /// The service result code behind a classified error, if any.
    pub fn result_code(&self) -> Option<i64> {
        match self {
            MgfError::Credentials(_) => Some(1),
            MgfError::Shortcode(_) => Some(6),
            MgfError::CampaignNotRunning(_) => Some(8),
            MgfError::Service { code, .. } => Some(*code),
            // Campaign and PhoneFormat each cover two codes; the text is
            // all that survives classification.
            _ => None,
        }
    }

    /// True for failures the donor or campaign operator can correct by
    /// changing the request.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            MgfError::Campaign(_)
                | MgfError::PhoneFormat(_)
                | MgfError::Shortcode(_)
                | MgfError::CampaignNotRunning(_)
        )
    }

    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        MgfError::Parse(msg.into())
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

fn code_suffix(code: &i64) -> String {
    result_code_name(*code)
        .map(|name| format!(" ({name})"))
        .unwrap_or_default()
}
