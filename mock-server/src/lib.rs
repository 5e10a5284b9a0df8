//! In-memory imitation of the MGF `Service.asmx` endpoints.
//!
//! Accepts the same form-encoded POSTs as the real service and answers with
//! the same XML envelopes, so the client can be exercised end to end without
//! network access to MGF.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::post,
    Form, Router,
};
use chrono::{NaiveDateTime, Utc};
use log::debug;
use serde::Deserialize;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

const NAMESPACES: &str = r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns="http://services.mobilegiving.org""#;
const CARRIER_ID: i64 = 31002;
const CARRIER_NAME: &str = "AT&T Wireless";

/// A campaign the mock knows about.
#[derive(Clone, Debug)]
pub struct Campaign {
    pub id: i64,
    pub shortcode: String,
    pub keyword: String,
    pub running: bool,
}

/// Account and campaigns the mock accepts.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub username: String,
    pub password: String,
    pub campaigns: Vec<Campaign>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            username: "demo".to_string(),
            password: "secret".to_string(),
            campaigns: vec![
                Campaign {
                    id: 1234,
                    shortcode: "12345".to_string(),
                    keyword: "work".to_string(),
                    running: true,
                },
                Campaign {
                    id: 4321,
                    shortcode: "54321".to_string(),
                    keyword: "done".to_string(),
                    running: false,
                },
            ],
        }
    }
}

/// One donation accepted by the mock.
#[derive(Clone, Debug)]
pub struct Donation {
    pub guid: Uuid,
    pub transaction_id: i64,
    /// Id of the inbound message; the reply uses the next one.
    pub first_message_id: i64,
    pub campaign_id: i64,
    pub shortcode: String,
    pub keyword: String,
    pub mobile_number: String,
    pub created_at: NaiveDateTime,
}

#[derive(Default)]
struct Store {
    next_transaction_id: i64,
    next_message_id: i64,
    donations: HashMap<Uuid, Donation>,
}

#[derive(Clone)]
struct AppState {
    config: Arc<MockConfig>,
    store: Arc<RwLock<Store>>,
}

#[derive(Deserialize)]
pub struct DonateForm {
    pub username: String,
    pub password: String,
    #[serde(rename = "campaignID")]
    pub campaign_id: String,
    #[serde(rename = "shortCode")]
    pub shortcode: String,
    #[serde(rename = "mobileNumber")]
    pub mobile_number: String,
}

#[derive(Deserialize)]
pub struct GuidForm {
    pub username: String,
    pub password: String,
    #[serde(rename = "donationMsgGUID")]
    pub guid: String,
}

#[derive(Deserialize)]
pub struct RangeForm {
    pub username: String,
    pub password: String,
    #[serde(rename = "campaignID")]
    pub campaign_id: String,
    pub start: String,
    pub end: String,
}

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
        store: Arc::new(RwLock::new(Store {
            next_transaction_id: 954706,
            next_message_id: 8185119,
            ..Store::default()
        })),
    };
    Router::new()
        .route("/Service.asmx/WebDonation", post(web_donation))
        .route("/Service.asmx/WebDonationStatusCheck", post(status_check))
        .route("/Service.asmx/GetTransactionsDuring", post(transactions_during))
        .route("/Service.asmx/GetMessagesForTransaction", post(messages_for_transaction))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn web_donation(State(state): State<AppState>, Form(form): Form<DonateForm>) -> impl IntoResponse {
    if let Err(fault) = authorize(&state.config, &form.username, &form.password) {
        return xml(fault.envelope("ServiceResult"));
    }
    let campaign = match lookup_campaign(&state.config, &form.campaign_id) {
        Ok(campaign) => campaign,
        Err(fault) => return xml(fault.envelope("ServiceResult")),
    };
    if form.mobile_number.len() != 11 || !form.mobile_number.chars().all(|c| c.is_ascii_digit()) {
        return xml(Fault::new(3, "Incorrect Cell Phone Number Format").envelope("ServiceResult"));
    }
    if form.shortcode != campaign.shortcode {
        return xml(Fault::new(6, "Invalid ShortCode").envelope("ServiceResult"));
    }
    if !campaign.running {
        return xml(Fault::new(8, "Campaign Completed").envelope("ServiceResult"));
    }

    let mut store = state.store.write().await;
    let transaction_id = store.next_transaction_id;
    let first_message_id = store.next_message_id;
    store.next_transaction_id += 1;
    store.next_message_id += 2;
    let donation = Donation {
        guid: Uuid::new_v4(),
        transaction_id,
        first_message_id,
        campaign_id: campaign.id,
        shortcode: campaign.shortcode.clone(),
        keyword: campaign.keyword.clone(),
        mobile_number: form.mobile_number,
        created_at: Utc::now().naive_utc(),
    };
    debug!("Accepted donation {} for campaign {}", donation.guid, donation.campaign_id);
    let guid = donation.guid;
    store.donations.insert(guid, donation);

    xml(envelope("ServiceResult", 0, &guid.to_string(), ""))
}

async fn status_check(State(state): State<AppState>, Form(form): Form<GuidForm>) -> impl IntoResponse {
    if let Err(fault) = authorize(&state.config, &form.username, &form.password) {
        return xml(fault.envelope("WebDonationStatusCheckResult"));
    }
    let store = state.store.read().await;
    let found = Uuid::parse_str(&form.guid)
        .ok()
        .and_then(|guid| store.donations.get(&guid));
    let fields = match found {
        Some(d) => format!(
            "<MobileNumber>{}</MobileNumber><CarrierID>{CARRIER_ID}</CarrierID><CarrierName>{}</CarrierName><DonationStatus>MsgSent</DonationStatus><MobileTransactionID>{}</MobileTransactionID><DonationMsgGUID>{}</DonationMsgGUID><MsgTime>{}</MsgTime>",
            escape(&d.mobile_number),
            escape(CARRIER_NAME),
            d.transaction_id,
            d.guid,
            wire_time(&d.created_at),
        ),
        None => format!(
            "<CarrierID>0</CarrierID><DonationStatus>Unknown</DonationStatus><DonationMsgGUID>{}</DonationMsgGUID>",
            escape(&form.guid)
        ),
    };
    xml(envelope("WebDonationStatusCheckResult", 0, "Success", &fields))
}

async fn transactions_during(State(state): State<AppState>, Form(form): Form<RangeForm>) -> impl IntoResponse {
    if let Err(fault) = authorize(&state.config, &form.username, &form.password) {
        return xml(fault.envelope("TransactionSetResult"));
    }
    let campaign = match lookup_campaign(&state.config, &form.campaign_id) {
        Ok(campaign) => campaign,
        Err(fault) => return xml(fault.envelope("TransactionSetResult")),
    };
    let (Some(start), Some(end)) = (parse_range_time(&form.start), parse_range_time(&form.end)) else {
        return xml(Fault::new(-1, "Invalid date range").envelope("TransactionSetResult"));
    };

    let store = state.store.read().await;
    let mut matching: Vec<&Donation> = store
        .donations
        .values()
        .filter(|d| d.campaign_id == campaign.id && d.created_at >= start && d.created_at <= end)
        .collect();
    matching.sort_by_key(|d| d.transaction_id);
    xml(transaction_set(&matching))
}

async fn messages_for_transaction(State(state): State<AppState>, Form(form): Form<GuidForm>) -> impl IntoResponse {
    if let Err(fault) = authorize(&state.config, &form.username, &form.password) {
        return xml(fault.envelope("TransactionSetResult"));
    }
    let store = state.store.read().await;
    let Some(donation) = Uuid::parse_str(&form.guid)
        .ok()
        .and_then(|guid| store.donations.get(&guid))
    else {
        return xml(Fault::new(6000, "GUID not found").envelope("TransactionSetResult"));
    };
    xml(transaction_set(&[donation]))
}

/// A nonzero result code with its text.
#[derive(Debug)]
struct Fault {
    code: i64,
    text: &'static str,
}

impl Fault {
    fn new(code: i64, text: &'static str) -> Self {
        Self { code, text }
    }

    fn envelope(&self, root: &str) -> String {
        envelope(root, self.code, self.text, "")
    }
}

fn authorize(config: &MockConfig, username: &str, password: &str) -> Result<(), Fault> {
    if username == config.username && password == config.password {
        Ok(())
    } else {
        Err(Fault::new(1, "Incorrect Username or Password"))
    }
}

fn lookup_campaign<'a>(config: &'a MockConfig, raw_id: &str) -> Result<&'a Campaign, Fault> {
    raw_id
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|id| config.campaigns.iter().find(|c| c.id == id))
        .ok_or(Fault::new(2, "Invalid CampaignID"))
}

fn transaction_set(donations: &[&Donation]) -> String {
    let mut body = String::from("<Transactions>");
    for d in donations {
        body.push_str(&format!(
            "<MobileTransaction><FirstMsgGUID>{guid}</FirstMsgGUID><MobileTransactionID>{id}</MobileTransactionID><DonationStatus>MsgSent</DonationStatus><Messages>{inbound}{reply}</Messages></MobileTransaction>",
            guid = d.guid,
            id = d.transaction_id,
            inbound = message(d, d.first_message_id, &d.keyword, "0.0000"),
            reply = message(d, d.first_message_id + 1, "Thanks! $5 charged to your phone bill.", "5.0000"),
        ));
    }
    body.push_str("</Transactions>");
    envelope("TransactionSetResult", 0, "Success", &body)
}

fn message(d: &Donation, message_id: i64, text: &str, billed: &str) -> String {
    format!(
        "<MobileMessage><MobileMessageID>{message_id}</MobileMessageID><CampaignID>{}</CampaignID><ShortCode>{}</ShortCode><MessageTime>{}</MessageTime><CarrierID>{CARRIER_ID}</CarrierID><CarrierName>{}</CarrierName><MobileBilledAmount>{billed}</MobileBilledAmount><MessageText>{}</MessageText><MobileTransactionID>{}</MobileTransactionID><MobileNumber>{}</MobileNumber><MessageGUID>{}</MessageGUID></MobileMessage>",
        d.campaign_id,
        escape(&d.shortcode),
        wire_time(&d.created_at),
        escape(CARRIER_NAME),
        escape(text),
        d.transaction_id,
        escape(&d.mobile_number),
        d.guid,
    )
}

fn envelope(root: &str, code: i64, text: &str, fields: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<{root} {NAMESPACES}><ResultCode>{code}</ResultCode><ResultText>{}</ResultText><RecordID>0</RecordID>{fields}</{root}>"#,
        escape(text)
    )
}

fn xml(body: String) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/xml; charset=utf-8")], body)
}

/// MGF sends message times without a zone marker.
fn wire_time(t: &NaiveDateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn parse_range_time(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M:%SZ").ok()
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
