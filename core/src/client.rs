//! Stateless request builder and response parser for the MGF service.
//!
//! # Design
//! `MobileGivingClient` holds only its `ClientConfig` and carries no mutable
//! state between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Every `parse_*` runs the same pipeline: transport check,
//! XML parse, result-code classification, then normalization. Normalization
//! never sees a response with a nonzero result code.

use chrono::{DateTime, Utc};
use log::debug;

use crate::classify::{classify, classify_callback};
use crate::config::ClientConfig;
use crate::error::{MgfError, Result};
use crate::http::{check_transport, HttpRequest, HttpResponse};
use crate::normalize;
use crate::types::{DonationStatus, Message, Transaction};
use crate::xml;

const WEB_DONATION: &str = "WebDonation";
const STATUS_CHECK: &str = "WebDonationStatusCheck";
const TRANSACTIONS_DURING: &str = "GetTransactionsDuring";
const MESSAGES_FOR_TRANSACTION: &str = "GetMessagesForTransaction";

/// Outbound time format for range queries.
const WIRE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Synchronous, stateless client for the MGF `Service.asmx` API.
#[derive(Debug, Clone)]
pub struct MobileGivingClient {
    config: ClientConfig,
}

impl MobileGivingClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Request a donation for `phone_number`, which is normalized first (see
    /// [`normalize_phone_number`]).
    pub fn build_donate(&self, phone_number: &str, campaign_id: i64, shortcode: &str) -> HttpRequest {
        self.request(
            WEB_DONATION,
            vec![
                ("campaignID", campaign_id.to_string()),
                ("shortCode", shortcode.to_string()),
                ("mobileNumber", normalize_phone_number(phone_number)),
            ],
        )
    }

    pub fn build_status(&self, guid: &str) -> HttpRequest {
        self.request(STATUS_CHECK, vec![("donationMsgGUID", guid.to_string())])
    }

    /// Transactions for `campaign_id` between `start` and `end` (now when
    /// `None`).
    pub fn build_list_transactions(
        &self,
        campaign_id: i64,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> HttpRequest {
        let end = end.unwrap_or_else(Utc::now);
        self.request(
            TRANSACTIONS_DURING,
            vec![
                ("campaignID", campaign_id.to_string()),
                ("start", start.format(WIRE_TIME_FORMAT).to_string()),
                ("end", end.format(WIRE_TIME_FORMAT).to_string()),
            ],
        )
    }

    pub fn build_list_messages(&self, guid: &str) -> HttpRequest {
        self.request(MESSAGES_FOR_TRANSACTION, vec![("donationMsgGUID", guid.to_string())])
    }

    /// The donation GUID, taken verbatim from `ResultText`.
    pub fn parse_donate(&self, response: HttpResponse) -> Result<String> {
        let body = check_transport(&response)?;
        let doc = xml::parse_document(body)?;
        classify(&doc)?;
        xml::child_string(doc.root_element(), "ResultText")
            .ok_or_else(|| MgfError::parse("donation response has no <ResultText>"))
    }

    pub fn parse_status(&self, response: HttpResponse) -> Result<DonationStatus> {
        let body = check_transport(&response)?;
        let doc = xml::parse_document(body)?;
        classify(&doc)?;
        let root = xml::expect_root(&doc, normalize::POLL_ROOT)?;
        let raw = xml::child_text(root, "DonationStatus")
            .ok_or_else(|| MgfError::parse("status response has no <DonationStatus>"))?;
        Ok(DonationStatus::from_wire(Some(raw)))
    }

    /// The full poll-shape record behind a status check.
    pub fn parse_status_detail(&self, response: HttpResponse) -> Result<Transaction> {
        let body = check_transport(&response)?;
        let doc = xml::parse_document(body)?;
        classify(&doc)?;
        normalize::status_poll(&doc)
    }

    pub fn parse_list_transactions(&self, response: HttpResponse) -> Result<Vec<Transaction>> {
        let body = check_transport(&response)?;
        let doc = xml::parse_document(body)?;
        classify(&doc)?;
        normalize::transaction_set(&doc)
    }

    pub fn parse_list_messages(&self, response: HttpResponse) -> Result<Vec<Message>> {
        let body = check_transport(&response)?;
        let doc = xml::parse_document(body)?;
        classify(&doc)?;
        normalize::message_list(&doc)
    }

    fn request(&self, function: &str, fields: Vec<(&str, String)>) -> HttpRequest {
        debug!("Building MGF {function} request for {}", self.config.hostname);
        let mut form: Vec<(String, String)> = fields
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        form.push(("username".to_string(), self.config.username.clone()));
        form.push(("password".to_string(), self.config.password.clone()));
        HttpRequest {
            host: self.config.hostname.clone(),
            port: self.config.port,
            path: format!("{}/{function}", self.config.path),
            form,
        }
    }
}

/// Normalize a status callback body that MGF POSTs to a listener URL.
pub fn parse_status_callback(body: &str) -> Result<Transaction> {
    let doc = xml::parse_document(body)?;
    classify_callback(&doc)?;
    normalize::status_push(&doc)
}

/// Strip everything but digits; a bare 10-digit national number gets the
/// leading `1` country code.
pub fn normalize_phone_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 {
        format!("1{digits}")
    } else {
        digits
    }
}
