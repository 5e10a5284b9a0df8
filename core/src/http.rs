//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe an MGF call as plain data. `MobileGivingClient`
//! builds `HttpRequest` values and parses `HttpResponse` values without ever
//! touching the network. Whoever executes the request (a `Transport`
//! implementation, or the caller by hand) owns timeouts and retries.
//!
//! Every MGF call is a form-encoded POST, so a request is just the target and
//! its form fields.

use url::form_urlencoded;

use crate::error::{MgfError, Result};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A form-encoded POST to one `Service.asmx` function.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub host: String,
    pub port: u16,
    /// Full path including the function name, e.g. `/Service.asmx/WebDonation`.
    pub path: String,
    pub form: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path)
    }

    /// The body as `application/x-www-form-urlencoded`.
    pub fn encoded_body(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.form.iter())
            .finish()
    }

    /// Value of a form field, if present.
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

// Requests carry the account password in their form fields.
impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let form: Vec<(&str, &str)> = self
            .form
            .iter()
            .map(|(k, v)| (k.as_str(), if k == "password" { "<redacted>" } else { v.as_str() }))
            .collect();
        f.debug_struct("HttpRequest")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("path", &self.path)
            .field("form", &form)
            .finish()
    }
}

/// An HTTP response described as plain data.
///
/// `body` is `None` when the transport received no body at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Option<String>,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: Some(body.into()),
        }
    }
}

/// Executes one request and returns the raw response.
///
/// Implementations return `Ok` for any response that arrived, whatever its
/// status; status interpretation belongs to the client. `Err` is for failures
/// where no response exists (connection refused, timeout, ...).
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse>,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self(request)
    }
}

/// Reject non-2xx responses and absent or blank bodies before any XML
/// parsing happens.
pub(crate) fn check_transport(response: &HttpResponse) -> Result<&str> {
    if !(200..300).contains(&response.status) {
        return Err(MgfError::Transport {
            status: Some(response.status),
            message: "unexpected HTTP status".to_string(),
        });
    }
    match response.body.as_deref() {
        Some(body) if !body.trim().is_empty() => Ok(body),
        _ => Err(MgfError::Transport {
            status: Some(response.status),
            message: "response has no body".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> HttpRequest {
        HttpRequest {
            host: "services.mobilegiving.org".to_string(),
            port: 80,
            path: "/Service.asmx/WebDonation".to_string(),
            form: vec![
                ("campaignID".to_string(), "123".to_string()),
                ("shortCode".to_string(), "12345".to_string()),
                ("username".to_string(), "acme".to_string()),
                ("password".to_string(), "p@ss word&more".to_string()),
            ],
        }
    }

    #[test]
    fn url_joins_host_port_and_path() {
        assert_eq!(
            request().url(),
            "http://services.mobilegiving.org:80/Service.asmx/WebDonation"
        );
    }

    #[test]
    fn body_is_form_encoded_in_field_order() {
        assert_eq!(
            request().encoded_body(),
            "campaignID=123&shortCode=12345&username=acme&password=p%40ss+word%26more"
        );
    }

    #[test]
    fn debug_hides_password() {
        let rendered = format!("{:?}", request());
        assert!(!rendered.contains("p@ss"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn check_transport_accepts_2xx_with_body() {
        assert_eq!(check_transport(&HttpResponse::ok("<x/>")).unwrap(), "<x/>");
    }

    #[test]
    fn check_transport_rejects_bad_status() {
        let response = HttpResponse {
            status: 403,
            body: Some("forbidden".to_string()),
        };
        let err = check_transport(&response).unwrap_err();
        assert!(matches!(err, MgfError::Transport { status: Some(403), .. }));
    }

    #[test]
    fn check_transport_rejects_missing_or_blank_body() {
        for body in [None, Some(String::new()), Some("  \n".to_string())] {
            let response = HttpResponse { status: 200, body };
            let err = check_transport(&response).unwrap_err();
            assert!(matches!(err, MgfError::Transport { status: Some(200), .. }));
        }
    }

    #[test]
    fn closures_are_transports() {
        let transport =
            |req: &HttpRequest| -> Result<HttpResponse> { Ok(HttpResponse::ok(req.path.clone())) };
        let response = transport.execute(&request()).unwrap();
        assert_eq!(response.body.as_deref(), Some("/Service.asmx/WebDonation"));
    }
}
