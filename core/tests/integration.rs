//! Full donation lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every
//! `DonationService` operation over real HTTP with `UreqTransport`. Validates
//! that request building, form encoding, classification and normalization
//! work end to end against the server's XML.

use std::io::{Read, Write};
use std::net::SocketAddr;

use chrono::{Duration, Utc};
use mobile_giving_core::{
    ClientConfig, DonationService, DonationStatus, MgfError, Transport, UreqTransport,
};

fn start_mock_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

/// Accept one connection, drain the request, then reply with `response`.
fn serve_once(response: &'static [u8]) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        let body_start = loop {
            let n = stream.read(&mut buf).unwrap();
            request.extend_from_slice(&buf[..n]);
            if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            assert!(n > 0, "connection closed before request headers");
        };
        let head = String::from_utf8_lossy(&request[..body_start]).to_ascii_lowercase();
        let content_length: usize = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .map(|v| v.trim().parse().unwrap())
            .unwrap_or(0);
        while request.len() < body_start + content_length {
            let n = stream.read(&mut buf).unwrap();
            assert!(n > 0, "connection closed before request body");
            request.extend_from_slice(&buf[..n]);
        }
        stream.write_all(response).unwrap();
        stream.flush().unwrap();
    });

    addr
}

fn config(addr: SocketAddr, password: &str) -> ClientConfig {
    ClientConfig::new("demo", password)
        .with_hostname(addr.ip().to_string())
        .with_port(addr.port())
}

#[test]
fn donation_lifecycle() {
    let addr = start_mock_server();
    let service = DonationService::new(config(addr, "secret"), UreqTransport::new());
    let start = Utc::now() - Duration::minutes(5);

    // Step 1: nothing recorded yet.
    let txs = service.list_transactions(1234, start, None).unwrap();
    assert!(txs.is_empty(), "expected no transactions");

    // Step 2: donate with a bare 10-digit number.
    let guid = service.donate("(555) 123-1234", 1234, "12345").unwrap();
    assert_eq!(guid.len(), 36, "expected a GUID, got {guid}");

    // Step 3: status of the new donation.
    assert_eq!(service.status(&guid).unwrap(), DonationStatus::MessageSent);
    let detail = service.status_detail(&guid).unwrap();
    assert_eq!(detail.guid(), Some(guid.as_str()));
    assert_eq!(detail.phone_number(), Some("15551231234"));
    assert_eq!(detail.carrier_id(), Some(31002));
    assert!(detail.created_at().is_some());

    // Step 4: status of an unknown GUID.
    assert_eq!(service.status("1").unwrap(), DonationStatus::Unknown);

    // Step 5: the donation shows up in the listing.
    let txs = service
        .list_transactions(1234, start, Some(Utc::now() + Duration::minutes(5)))
        .unwrap();
    assert_eq!(txs.len(), 1);
    let tx = &txs[0];
    assert_eq!(tx.guid(), Some(guid.as_str()));
    assert_eq!(tx.campaign_id(), Some(1234));
    assert_eq!(tx.shortcode(), Some("12345"));
    assert_eq!(tx.carrier_id(), Some(31002));
    assert_eq!(tx.keyword(), Some("work"));
    assert_eq!(tx.messages().len(), 2);

    // Step 6: messages for the donation.
    let messages = service.list_messages(&guid).unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].text(), Some("work"));
    assert_eq!(messages[1].message_id(), messages[0].message_id().map(|id| id + 1));

    // Step 7: a second donation.
    service.donate("15551231235", 1234, "12345").unwrap();
    let txs = service
        .list_transactions(1234, start, Some(Utc::now() + Duration::minutes(5)))
        .unwrap();
    assert_eq!(txs.len(), 2);

    // Step 8: inverted range is empty, not an error.
    let txs = service
        .list_transactions(1234, Utc::now() + Duration::days(365), Some(start))
        .unwrap();
    assert!(txs.is_empty());
}

#[test]
fn classified_errors_over_http() {
    let addr = start_mock_server();
    let service = DonationService::new(config(addr, "secret"), UreqTransport::new());

    let err = service.donate("5551231234", 999, "12345").unwrap_err();
    assert_eq!(err, MgfError::Campaign("Invalid CampaignID".to_string()));

    let err = service.donate("123", 1234, "12345").unwrap_err();
    assert_eq!(err, MgfError::PhoneFormat("Incorrect Cell Phone Number Format".to_string()));

    let err = service.donate("5551231234", 1234, "99999").unwrap_err();
    assert_eq!(err, MgfError::Shortcode("Invalid ShortCode".to_string()));

    let err = service.donate("5551231234", 4321, "54321").unwrap_err();
    assert_eq!(err, MgfError::CampaignNotRunning("Campaign Completed".to_string()));
    assert!(err.is_user_correctable());

    let err = service
        .list_messages("00000000-0000-0000-0000-000000000000")
        .unwrap_err();
    assert!(matches!(err, MgfError::Service { code: 6000, .. }));
}

#[test]
fn bad_credentials_over_http() {
    let addr = start_mock_server();
    let service = DonationService::new(config(addr, "wrong"), UreqTransport::new());

    let err = service.donate("5551231234", 1234, "12345").unwrap_err();
    assert_eq!(err, MgfError::Credentials("Incorrect Username or Password".to_string()));
    assert!(!err.is_user_correctable());

    let err = service.list_transactions(1234, Utc::now(), None).unwrap_err();
    assert!(matches!(err, MgfError::Credentials(_)));
}

#[test]
fn unknown_function_is_transport_error() {
    let addr = start_mock_server();
    let client = mobile_giving_core::MobileGivingClient::new(
        config(addr, "secret").with_path("/NotTheService.asmx"),
    );
    let response = UreqTransport::new()
        .execute(&client.build_status("1"))
        .unwrap();
    let err = client.parse_status(response).unwrap_err();
    assert!(matches!(err, MgfError::Transport { status: Some(404), .. }));
}

#[test]
fn connection_refused_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let service = DonationService::new(config(addr, "secret"), UreqTransport::new());
    let err = service.status("1").unwrap_err();
    assert!(matches!(err, MgfError::Transport { status: None, .. }));
}

#[test]
fn unreadable_body_is_transport_error() {
    let addr = serve_once(
        b"HTTP/1.1 200 OK\r\nContent-Type: text/xml\r\nContent-Length: 4\r\nConnection: close\r\n\r\n\xff\xfe\xfd\xfc",
    );
    let service = DonationService::new(config(addr, "secret"), UreqTransport::new());
    let err = service.status("1").unwrap_err();
    match err {
        MgfError::Transport { status, message } => {
            assert_eq!(status, Some(200));
            assert!(message.contains("response body"), "{message}");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}
