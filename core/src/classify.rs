//! Result-code classification for MGF response envelopes.
//!
//! Every MGF response carries `ResultCode` and `ResultText` as children of the
//! document root: `ServiceResult` for plain calls, or the operation-specific
//! root (`WebDonationStatusCheckResult`, `TransactionSetResult`, ...) for the
//! richer ones. Code `0` is success; every other code becomes exactly one
//! `MgfError`. This runs before any normalization.

use log::debug;
use roxmltree::{Document, Node};

use crate::error::{MgfError, Result};
use crate::xml;

pub const SUCCESS: i64 = 0;
pub const INVALID_CREDENTIALS: i64 = 1;
pub const INVALID_CAMPAIGN: i64 = 2;
pub const INVALID_PHONE_FORMAT: i64 = 3;
pub const INVALID_SHORTCODE: i64 = 6;
pub const INVALID_AREA_CODE: i64 = 7;
pub const CAMPAIGN_COMPLETED: i64 = 8;
pub const CARRIER_NOT_RUNNING_CAMPAIGN: i64 = 9;

/// Symbolic name of a documented MGF result code, for diagnostics.
pub fn result_code_name(code: i64) -> Option<&'static str> {
    let name = match code {
        -1 => "UNKNOWN_ERROR",
        0 => "SUCCESS",
        1 => "INVALID_CREDENTIALS",
        2 => "INVALID_CAMPAIGN",
        3 => "INVALID_PHONE_FORMAT",
        4 => "INVALID_CARRIER",
        5 => "DATABASE_ERROR",
        6 => "INVALID_SHORTCODE",
        7 => "INVALID_AREA_CODE",
        8 => "CAMPAIGN_COMPLETED",
        9 => "CARRIER_NOT_RUNNING_CAMPAIGN",
        10 => "NUMBER_NOT_FOUND",
        11 => "NUMBER_ALREADY_OPTED_IN",
        1006 => "USER_NOT_OPTED_IN",
        1026 => "UNABLE_TO_DETERMINE_CARRIER",
        2001 => "NO_KEYWORD_FOUND_FOR_CAMPAIGN",
        3002 => "INVALID_CAMPAIGN_TYPE",
        5000 => "CAMPAIGN_NOT_FOUND",
        5001 => "CAMPAIGN_NOT_RUNNING",
        6000 => "GUID_NOT_FOUND",
        7000 => "USER_ALREADY_OPTED_IN",
        7001 => "USER_ALREADY_OPTED_OUT",
        7002 => "USER_NOT_FOUND_IN_CAMPAIGN",
        7052 => "MESSAGE_LENGTH_EXCEEDED",
        _ => return None,
    };
    Some(name)
}

/// Map a result code and its text to success or a typed failure.
pub fn classify_code(code: i64, text: &str) -> Result<()> {
    let text = text.to_string();
    let err = match code {
        SUCCESS => return Ok(()),
        INVALID_CREDENTIALS => MgfError::Credentials(text),
        INVALID_CAMPAIGN | CARRIER_NOT_RUNNING_CAMPAIGN => MgfError::Campaign(text),
        INVALID_PHONE_FORMAT | INVALID_AREA_CODE => MgfError::PhoneFormat(text),
        INVALID_SHORTCODE => MgfError::Shortcode(text),
        CAMPAIGN_COMPLETED => MgfError::CampaignNotRunning(text),
        code => MgfError::Service { code, text },
    };
    debug!("MGF returned result code {code}: {err}");
    Err(err)
}

/// Classify the response to a request this client made.
///
/// Every such envelope carries a `ResultCode`; a missing or non-integer one
/// is a `Parse` error.
pub fn classify(doc: &Document<'_>) -> Result<()> {
    let root = doc.root_element();
    match xml::child_int(root, "ResultCode")? {
        Some(code) => classify_code(code, result_text(root)),
        None => Err(MgfError::parse(format!(
            "<{}> has no <ResultCode>",
            root.tag_name().name()
        ))),
    }
}

/// Classify a status callback posted by MGF.
///
/// Callbacks may omit `ResultCode`; its absence counts as success. A
/// non-integer `ResultCode` is still a `Parse` error.
pub fn classify_callback(doc: &Document<'_>) -> Result<()> {
    let root = doc.root_element();
    match xml::child_int(root, "ResultCode")? {
        Some(code) => classify_code(code, result_text(root)),
        None => Ok(()),
    }
}

// ResultText is kept verbatim, surrounding whitespace included.
fn result_text<'a>(root: Node<'a, '_>) -> &'a str {
    xml::child(root, "ResultText")
        .and_then(|n| n.text())
        .unwrap_or_default()
}
