//! HTTP transport for named backend functions (`POST {base}/functions/{name}`).

use std::collections::BTreeMap;

use boardkeep_resilience::{InvokeError, RemoteFunctions, RemoteResponse};
use serde_json::Value;

pub struct HttpFunctionClient {
    client: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
}

impl HttpFunctionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every call.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    fn url(&self, name: &str) -> String {
        format!("{}/functions/{}", self.base_url, name)
    }
}

#[async_trait::async_trait]
impl RemoteFunctions for HttpFunctionClient {
    async fn call(&self, name: &str, payload: &Value) -> Result<RemoteResponse, InvokeError> {
        let mut req = self.client.post(self.url(name)).json(payload);
        if let Some(token) = &self.bearer {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.map_err(|e| InvokeError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(InvokeError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let headers: BTreeMap<String, String> = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = resp
            .json::<Value>()
            .await
            .map_err(|e| InvokeError::Decode(e.to_string()))?;

        Ok(RemoteResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardkeep_resilience::RemoteFailure;

    #[test]
    fn function_urls_hang_off_the_base() {
        let client = HttpFunctionClient::new("http://localhost:8080/");
        assert_eq!(client.url("countParticipants"), "http://localhost:8080/functions/countParticipants");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let client = HttpFunctionClient::new("http://127.0.0.1:9").with_bearer("t");

        let err = client.call("cleanupInvitations", &serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, InvokeError::Transport(_)));
        assert_eq!(err.status(), None);
    }
}
