//! Normalized donation records.
//!
//! # Design
//! MGF reports the same donation through three XML shapes (status poll,
//! status push, transaction set). All of them normalize into `Transaction`
//! and `Message` so callers only ever handle one type. Both are immutable
//! once built: fields are crate-private and read through accessors.
//!
//! The campaign, shortcode, phone, carrier, keyword and creation time of a
//! `Transaction` are not stored on the wire per transaction; they are copied
//! from the first message and never reconciled across the list.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Donation status as reported by MGF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DonationStatus {
    #[serde(rename = "MsgSent")]
    MessageSent,
    UserAccepted,
    BillingDeclined,
    /// The service could not classify the donation, or reported a value this
    /// client does not know.
    Unknown,
}

impl DonationStatus {
    /// Map a wire value. Anything unrecognized, including an absent value, is
    /// `Unknown`.
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw {
            Some("MsgSent") => DonationStatus::MessageSent,
            Some("UserAccepted") => DonationStatus::UserAccepted,
            Some("BillingDeclined") => DonationStatus::BillingDeclined,
            _ => DonationStatus::Unknown,
        }
    }

    /// The wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::MessageSent => "MsgSent",
            DonationStatus::UserAccepted => "UserAccepted",
            DonationStatus::BillingDeclined => "BillingDeclined",
            DonationStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One SMS event tied to a donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub(crate) message_id: Option<i64>,
    pub(crate) transaction_id: Option<i64>,
    pub(crate) guid: Option<String>,
    pub(crate) campaign_id: Option<i64>,
    pub(crate) shortcode: Option<String>,
    pub(crate) carrier_id: Option<i64>,
    pub(crate) carrier_name: Option<String>,
    pub(crate) phone_number: Option<String>,
    pub(crate) text: Option<String>,
    pub(crate) sent_at: Option<DateTime<Utc>>,
    pub(crate) billed_amount: Option<Decimal>,
}

impl Message {
    pub fn message_id(&self) -> Option<i64> {
        self.message_id
    }

    pub fn transaction_id(&self) -> Option<i64> {
        self.transaction_id
    }

    pub fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }

    pub fn campaign_id(&self) -> Option<i64> {
        self.campaign_id
    }

    pub fn shortcode(&self) -> Option<&str> {
        self.shortcode.as_deref()
    }

    pub fn carrier_id(&self) -> Option<i64> {
        self.carrier_id
    }

    pub fn carrier_name(&self) -> Option<&str> {
        self.carrier_name.as_deref()
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    /// Amount billed to the donor's phone for this message, when reported.
    pub fn billed_amount(&self) -> Option<Decimal> {
        self.billed_amount
    }
}

/// One donation attempt and the messages exchanged for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    transaction_id: Option<i64>,
    guid: Option<String>,
    status: DonationStatus,
    campaign_id: Option<i64>,
    shortcode: Option<String>,
    phone_number: Option<String>,
    carrier_id: Option<i64>,
    keyword: Option<String>,
    created_at: Option<DateTime<Utc>>,
    messages: Vec<Message>,
}

impl Transaction {
    /// Build a transaction, taking the per-message fields from `messages[0]`.
    pub(crate) fn new(
        transaction_id: Option<i64>,
        guid: Option<String>,
        status: DonationStatus,
        messages: Vec<Message>,
    ) -> Self {
        let first = messages.first();
        Self {
            transaction_id,
            guid,
            status,
            campaign_id: first.and_then(|m| m.campaign_id),
            shortcode: first.and_then(|m| m.shortcode.clone()),
            phone_number: first.and_then(|m| m.phone_number.clone()),
            carrier_id: first.and_then(|m| m.carrier_id),
            keyword: first.and_then(|m| m.text.clone()),
            created_at: first.and_then(|m| m.sent_at),
            messages,
        }
    }

    pub fn transaction_id(&self) -> Option<i64> {
        self.transaction_id
    }

    /// GUID of the donation's first message; the service's primary id.
    pub fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }

    pub fn status(&self) -> DonationStatus {
        self.status
    }

    pub fn campaign_id(&self) -> Option<i64> {
        self.campaign_id
    }

    pub fn shortcode(&self) -> Option<&str> {
        self.shortcode.as_deref()
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    pub fn carrier_id(&self) -> Option<i64> {
        self.carrier_id
    }

    /// Text of the inbound message that started the donation.
    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}
