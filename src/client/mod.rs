pub mod multipart;
pub mod probe;
pub mod uploads;

use crate::config::ClientSettings;
use crate::session::actions::{ActionId, HttpMethod, ResponseKind};
use crate::session::state::{FieldValue, FormFields, ResultPayload};
use crate::shared::ClientError;
use std::io::Read;
use std::time::Duration;

const USER_AGENT: &str = concat!("dataplay/", env!("CARGO_PKG_VERSION"));

/// One request against the remote service, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequest {
    pub method: HttpMethod,
    pub path: &'static str,
    pub form: Vec<(String, FieldValue)>,
    pub response_kind: ResponseKind,
}

impl ServiceRequest {
    /// Form parts follow the descriptor's field order; names outside the
    /// field spec are dropped.
    pub fn for_action(action: ActionId, fields: &FormFields) -> Self {
        let descriptor = action.descriptor();
        let form = descriptor
            .field_spec
            .iter()
            .filter_map(|spec| {
                fields
                    .get(spec.name)
                    .map(|value| (spec.name.to_string(), value.clone()))
            })
            .collect();
        Self {
            method: descriptor.method,
            path: descriptor.endpoint,
            form,
            response_kind: descriptor.response_kind,
        }
    }
}

/// The network seam used by the dispatcher.
pub trait ServiceTransport: Send + Sync {
    fn execute(&self, request: &ServiceRequest) -> Result<ResultPayload, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ServiceClient {
    api_base: String,
    timeout: Duration,
    agent: ureq::Agent,
}

impl ServiceClient {
    pub fn new(api_base: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            timeout,
            agent,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self::new(&settings.api_base_url, settings.request_timeout())
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    /// GETs `path` and reports only whether the service answered with success.
    pub fn check_status(&self, path: &str) -> Result<u16, ClientError> {
        let url = self.endpoint(path);
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|err| map_ureq_error(&url, err))?;
        Ok(response.status())
    }

    fn send_plain(&self, url: &str, method: HttpMethod) -> Result<Vec<u8>, ClientError> {
        let call = self.agent.request(method.as_str(), url);
        let result = match method {
            HttpMethod::Get => call.call(),
            HttpMethod::Post => call.send_bytes(&[]),
        };
        let response = result.map_err(|err| map_ureq_error(url, err))?;
        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| ClientError::Connectivity {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(body)
    }

    fn send_form(&self, url: &str, request: &ServiceRequest) -> Result<Vec<u8>, ClientError> {
        let prepare_failed = |e: reqwest::Error| ClientError::Request {
            url: url.to_string(),
            message: e.to_string(),
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(prepare_failed)?;
        let form = multipart::build_form(&request.form).map_err(prepare_failed)?;
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let transport_failed = |e: reqwest::Error| ClientError::Connectivity {
            url: url.to_string(),
            message: e.to_string(),
        };
        let response = client
            .request(method, url)
            .multipart(form)
            .send()
            .map_err(transport_failed)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Service {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                body: response.text().unwrap_or_default(),
            });
        }
        let body = response.bytes().map_err(transport_failed)?;
        Ok(body.to_vec())
    }
}

impl ServiceTransport for ServiceClient {
    fn execute(&self, request: &ServiceRequest) -> Result<ResultPayload, ClientError> {
        let url = self.endpoint(request.path);
        let body = if request.form.is_empty() {
            self.send_plain(&url, request.method)?
        } else {
            self.send_form(&url, request)?
        };
        decode_body(&url, request.response_kind, &body)
    }
}

/// Text endpoints return whatever the service sent, with invalid UTF-8
/// replaced rather than rejected.
pub fn decode_body(
    url: &str,
    kind: ResponseKind,
    body: &[u8],
) -> Result<ResultPayload, ClientError> {
    match kind {
        ResponseKind::Text => Ok(ResultPayload::Text(
            String::from_utf8_lossy(body).into_owned(),
        )),
        ResponseKind::Json => serde_json::from_slice(body)
            .map(ResultPayload::Json)
            .map_err(|e| ClientError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            }),
    }
}

fn map_ureq_error(url: &str, err: ureq::Error) -> ClientError {
    match err {
        ureq::Error::Status(status, response) => {
            let reason = response.status_text().to_string();
            let body = response.into_string().unwrap_or_default();
            ClientError::Service {
                url: url.to_string(),
                status,
                reason,
                body,
            }
        }
        ureq::Error::Transport(transport) => ClientError::Connectivity {
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}
