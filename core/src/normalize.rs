//! Converts the three MGF response shapes into `Transaction` records.
//!
//! | Shape | Root | Time field |
//! |---|---|---|
//! | status poll | `WebDonationStatusCheckResult` | `MsgTime` |
//! | status push | `GetDonationStatusResult` | `MessageTime` |
//! | transaction set | `TransactionSetResult` | `MessageTime` per message |
//!
//! Every function here expects a document that has already been classified
//! as a success.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, warn};
use roxmltree::{Document, Node};
use rust_decimal::Decimal;

use crate::error::{MgfError, Result};
use crate::types::{DonationStatus, Message, Transaction};
use crate::xml;

pub(crate) const POLL_ROOT: &str = "WebDonationStatusCheckResult";
pub(crate) const PUSH_ROOT: &str = "GetDonationStatusResult";
pub(crate) const SET_ROOT: &str = "TransactionSetResult";

/// Naive layouts MGF has been seen to send, tried in order.
const NAIVE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Read a service timestamp as UTC.
///
/// MGF sends naive `YYYY-MM-DDTHH:MM:SS` values that are UTC-equivalent,
/// occasionally with a space instead of the `T`; fractional seconds and an
/// explicit offset are also accepted. Anything unparsable yields `None`
/// rather than failing the record.
pub fn parse_service_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let parsed = NAIVE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok());
    if parsed.is_none() {
        debug!("Ignoring unparsable MGF timestamp {raw:?}");
    }
    parsed.map(|naive| naive.and_utc())
}

/// Normalize a `WebDonationStatusCheck` response.
pub(crate) fn status_poll(doc: &Document<'_>) -> Result<Transaction> {
    scalar_transaction(xml::expect_root(doc, POLL_ROOT)?, "MsgTime")
}

/// Normalize a status callback posted by MGF.
pub(crate) fn status_push(doc: &Document<'_>) -> Result<Transaction> {
    scalar_transaction(xml::expect_root(doc, PUSH_ROOT)?, "MessageTime")
}

/// Normalize a `TransactionSetResult` into zero or more transactions.
///
/// Transactions without any message are skipped with a warning; a malformed
/// numeric field anywhere fails the whole set.
pub(crate) fn transaction_set(doc: &Document<'_>) -> Result<Vec<Transaction>> {
    let root = xml::expect_root(doc, SET_ROOT)?;
    let Some(container) = xml::child(root, "Transactions") else {
        return Ok(Vec::new());
    };

    let mut transactions = Vec::new();
    for node in xml::children(container, "MobileTransaction") {
        let transaction_id = xml::child_int(node, "MobileTransactionID")?;
        let guid = xml::child_string(node, "FirstMsgGUID");
        let messages = match xml::child(node, "Messages") {
            Some(list) => xml::children(list, "MobileMessage")
                .map(listed_message)
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };
        if messages.is_empty() {
            warn!(
                "Skipping MGF transaction {} ({}) with no messages",
                transaction_id.map_or_else(|| "?".to_string(), |id| id.to_string()),
                guid.as_deref().unwrap_or("no guid"),
            );
            continue;
        }
        let status = DonationStatus::from_wire(xml::child_text(node, "DonationStatus"));
        transactions.push(Transaction::new(transaction_id, guid, status, messages));
    }
    Ok(transactions)
}

/// Messages of a `GetMessagesForTransaction` response.
///
/// Accepts either a transaction set (messages of every transaction, in
/// document order) or a root holding a bare `Messages` list.
pub(crate) fn message_list(doc: &Document<'_>) -> Result<Vec<Message>> {
    let root = doc.root_element();
    if xml::child(root, "Transactions").is_some() {
        return Ok(transaction_set(doc)?
            .into_iter()
            .flat_map(Transaction::into_messages)
            .collect());
    }
    match xml::child(root, "Messages") {
        Some(list) => xml::children(list, "MobileMessage").map(listed_message).collect(),
        None => Ok(Vec::new()),
    }
}

fn scalar_transaction(root: Node<'_, '_>, time_field: &str) -> Result<Transaction> {
    let transaction_id = xml::child_int(root, "MobileTransactionID")?;
    let guid = xml::child_string(root, "DonationMsgGUID");
    let message = Message {
        message_id: None,
        transaction_id,
        guid: guid.clone(),
        campaign_id: xml::child_int(root, "CampaignID")?,
        shortcode: xml::child_string(root, "ShortCode"),
        carrier_id: xml::child_int(root, "CarrierID")?,
        carrier_name: xml::child_string(root, "CarrierName"),
        phone_number: xml::child_string(root, "MobileNumber"),
        text: xml::child_string(root, "MessageText"),
        sent_at: xml::child_text(root, time_field).and_then(parse_service_time),
        billed_amount: None,
    };
    let status = DonationStatus::from_wire(xml::child_text(root, "DonationStatus"));
    Ok(Transaction::new(transaction_id, guid, status, vec![message]))
}

fn listed_message(node: Node<'_, '_>) -> Result<Message> {
    Ok(Message {
        message_id: xml::child_int(node, "MobileMessageID")?,
        transaction_id: xml::child_int(node, "MobileTransactionID")?,
        guid: xml::child_string(node, "MessageGUID"),
        campaign_id: xml::child_int(node, "CampaignID")?,
        shortcode: xml::child_string(node, "ShortCode"),
        carrier_id: xml::child_int(node, "CarrierID")?,
        carrier_name: xml::child_string(node, "CarrierName"),
        phone_number: xml::child_string(node, "MobileNumber"),
        text: xml::child_string(node, "MessageText"),
        sent_at: xml::child_text(node, "MessageTime").and_then(parse_service_time),
        billed_amount: xml::child_text(node, "MobileBilledAmount")
            .map(|raw| {
                Decimal::from_str(raw).map_err(|_| {
                    MgfError::parse(format!("<MobileBilledAmount> is not a decimal: {raw:?}"))
                })
            })
            .transpose()?,
    })
}
