//! Blocking `Transport` backed by ureq.

use log::debug;

use crate::error::{MgfError, Result};
use crate::http::{HttpRequest, HttpResponse, Transport, FORM_CONTENT_TYPE};

/// Executes requests with a ureq agent.
///
/// The agent is built with status-as-error disabled so 4xx/5xx responses come
/// back as data and the client decides what they mean. No timeout is set by
/// default; pass a configured agent to [`UreqTransport::with_agent`] for one.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let url = request.url();
        debug!("POST {url}");
        let mut response = self
            .agent
            .post(&url)
            .content_type(FORM_CONTENT_TYPE)
            .send(request.encoded_body().as_bytes())
            .map_err(|e| MgfError::Transport {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| MgfError::Transport {
                status: Some(status),
                message: format!("failed to read response body: {e}"),
            })?;
        Ok(HttpResponse {
            status,
            body: Some(body),
        })
    }
}
