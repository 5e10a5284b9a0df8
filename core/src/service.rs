//! One-shot MGF operations over a `Transport`.
//!
//! Each method is a single build / execute / parse round trip. Nothing is
//! retried and nothing is remembered between calls.

use chrono::{DateTime, Utc};

use crate::client::MobileGivingClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::Transport;
use crate::types::{DonationStatus, Message, Transaction};

/// A `MobileGivingClient` paired with the transport that executes its
/// requests.
#[derive(Debug, Clone)]
pub struct DonationService<T> {
    client: MobileGivingClient,
    transport: T,
}

impl<T: Transport> DonationService<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            client: MobileGivingClient::new(config),
            transport,
        }
    }

    pub fn client(&self) -> &MobileGivingClient {
        &self.client
    }

    /// Submit a donation and return its GUID.
    pub fn donate(&self, phone_number: &str, campaign_id: i64, shortcode: &str) -> Result<String> {
        let request = self.client.build_donate(phone_number, campaign_id, shortcode);
        self.client.parse_donate(self.transport.execute(&request)?)
    }

    pub fn status(&self, guid: &str) -> Result<DonationStatus> {
        let request = self.client.build_status(guid);
        self.client.parse_status(self.transport.execute(&request)?)
    }

    pub fn status_detail(&self, guid: &str) -> Result<Transaction> {
        let request = self.client.build_status(guid);
        self.client.parse_status_detail(self.transport.execute(&request)?)
    }

    /// Transactions in `[start, end]`; `end` defaults to now. An empty range
    /// is an empty `Vec`, not an error.
    pub fn list_transactions(
        &self,
        campaign_id: i64,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Transaction>> {
        let request = self.client.build_list_transactions(campaign_id, start, end);
        self.client.parse_list_transactions(self.transport.execute(&request)?)
    }

    pub fn list_messages(&self, guid: &str) -> Result<Vec<Message>> {
        let request = self.client.build_list_messages(guid);
        self.client.parse_list_messages(self.transport.execute(&request)?)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use chrono::Duration;

    use super::*;
    use crate::error::MgfError;
    use crate::http::{HttpRequest, HttpResponse};

    const DONATE_SUCCESS: &str = include_str!("../tests/fixtures/donate_success.xml");
    const STATUS_PENDING: &str = include_str!("../tests/fixtures/status_pending.xml");
    const TRANSACTION_SET: &str = include_str!("../tests/fixtures/transaction_set.xml");

    type Seen = Rc<RefCell<Vec<HttpRequest>>>;

    /// Replays one canned response and records every request it is given.
    struct Canned {
        response: Result<HttpResponse>,
        seen: Seen,
    }

    impl Transport for Canned {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
            self.seen.borrow_mut().push(request.clone());
            self.response.clone()
        }
    }

    fn service(response: Result<HttpResponse>) -> (DonationService<Canned>, Seen) {
        let seen = Seen::default();
        let transport = Canned {
            response,
            seen: Rc::clone(&seen),
        };
        (
            DonationService::new(ClientConfig::new("acme", "secret"), transport),
            seen,
        )
    }

    #[test]
    fn donate_round_trip() {
        let (service, seen) = service(Ok(HttpResponse::ok(DONATE_SUCCESS)));
        let guid = service.donate("5551231234", 123, "12345").unwrap();
        assert_eq!(guid, "2fd7f7e0-8dd4-4e07-80a3-4bc95e73f267");

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].form_value("mobileNumber"), Some("15551231234"));
        assert_eq!(seen[0].form_value("campaignID"), Some("123"));
        assert_eq!(seen[0].form_value("shortCode"), Some("12345"));
    }

    #[test]
    fn status_round_trip() {
        let (service, _) = service(Ok(HttpResponse::ok(STATUS_PENDING)));
        let status = service.status("2fd7f7e0-8dd4-4e07-80a3-4bc95e73f267").unwrap();
        assert_eq!(status, DonationStatus::MessageSent);
    }

    #[test]
    fn list_transactions_round_trip() {
        let (service, seen) = service(Ok(HttpResponse::ok(TRANSACTION_SET)));
        let start = Utc::now() - Duration::days(1);
        let txs = service.list_transactions(1234, start, None).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn transport_errors_pass_through_once() {
        let failure = MgfError::Transport {
            status: None,
            message: "connection refused".to_string(),
        };
        let (service, seen) = service(Err(failure.clone()));
        let err = service.list_messages("abc").unwrap_err();
        assert_eq!(err, failure);
        assert_eq!(seen.borrow().len(), 1, "no retry");
    }

    #[test]
    fn closure_transport() {
        let service = DonationService::new(
            ClientConfig::new("acme", "secret"),
            |_: &HttpRequest| -> Result<HttpResponse> {
                Ok(HttpResponse {
                    status: 500,
                    body: None,
                })
            },
        );
        let err = service.status("abc").unwrap_err();
        assert!(matches!(err, MgfError::Transport { status: Some(500), .. }));
    }
}
