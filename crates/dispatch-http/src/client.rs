//! Request executor

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::backends::HttpTransport;
use crate::error::{ApiError, TransportError};
use crate::request::ApiRequest;
use crate::transport::{RawResponse, Transport, WireRequest};

/// Request executor.
///
/// Evaluates an [`ApiRequest`] contract into a wire-level request, hands it
/// to the injected [`Transport`], interprets the HTTP status, decodes the
/// body into the contract's declared response type and maps every failure
/// into one [`ApiError`] case.
///
/// The executor is stateless: each [`perform`](ApiClient::perform) call is
/// evaluated independently start to finish, with no retry and no shared
/// mutable state beyond the transport reference. Calls may run concurrently
/// and complete in any order; dropping the returned future cancels the call
/// and nothing (in particular no decode) runs afterwards.
#[derive(Debug, Clone)]
pub struct ApiClient<T: Transport = HttpTransport> {
    transport: T,
}

impl Default for ApiClient<HttpTransport> {
    fn default() -> Self {
        Self::new(HttpTransport::new())
    }
}

impl<T: Transport> ApiClient<T> {
    /// Create an executor over the given transport
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Get the injected transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute one contract, returning the decoded response or a classified
    /// error.
    ///
    /// The contract is fully evaluated before the transport is invoked;
    /// input and encoding failures short-circuit without any network call.
    ///
    /// # Errors
    ///
    /// Returns one [`ApiError`] case per the mapping described on each
    /// variant; every failure is terminal for the call.
    pub async fn perform<R: ApiRequest>(&self, request: &R) -> Result<R::Response, ApiError> {
        let wire = build_wire_request(request)?;
        debug!(method = %wire.method, url = %wire.url, "dispatching request");

        match self.transport.execute(wire).await {
            Ok(response) => interpret_response(response),
            Err(err) => Err(classify_transport_error(err)),
        }
    }
}

/// Evaluate a contract into a wire-level request.
///
/// Body priority: raw body verbatim, else JSON-encoded parameters (with a
/// `Content-Type: application/json` header appended), else empty.
fn build_wire_request<R: ApiRequest>(request: &R) -> Result<WireRequest, ApiError> {
    let url = request.endpoint().ok_or_else(|| {
        warn!("contract declares no endpoint, refusing to dispatch");
        ApiError::InvalidRequest
    })?;

    let mut headers: Vec<(String, String)> = Vec::new();
    if let Some(declared) = request.headers() {
        // Appended, not deduplicated: repeated names all reach the wire.
        headers.extend(declared);
    }

    let body = match request.raw_body() {
        Some(bytes) => Some(bytes),
        None => match request.parameters() {
            Some(parameters) => {
                let mut fields = serde_json::Map::with_capacity(parameters.len());
                for (name, value) in &parameters {
                    let value = value.to_json().map_err(|err| {
                        warn!(field = %name, "request body encoding failed: {err}");
                        ApiError::EncodingError
                    })?;
                    fields.insert(name.clone(), value);
                }
                let encoded = serde_json::to_vec(&Value::Object(fields)).map_err(|err| {
                    warn!("request body encoding failed: {err}");
                    ApiError::EncodingError
                })?;
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                Some(encoded)
            }
            None => None,
        },
    };

    Ok(WireRequest {
        method: request.method(),
        url,
        headers,
        body,
    })
}

fn classify_transport_error(err: TransportError) -> ApiError {
    warn!("transport failure: {err}");
    match err {
        TransportError::Connection(_) => ApiError::NoConnectivity,
        TransportError::Malformed(_) => ApiError::UnexpectedResponse,
        TransportError::Timeout | TransportError::Other(_) => ApiError::UnknownError,
    }
}

/// Interpret the HTTP status, decoding the body only on 2xx.
fn interpret_response<R: DeserializeOwned>(response: RawResponse) -> Result<R, ApiError> {
    match response.status() {
        200..=299 => decode_body(response.body()),
        401 => {
            warn!("server rejected credentials");
            Err(ApiError::AuthenticationFailure)
        }
        status => {
            warn!(status, "server returned error status");
            Err(ApiError::ServerError(status))
        }
    }
}

fn decode_body<R: DeserializeOwned>(body: &[u8]) -> Result<R, ApiError> {
    serde_json::from_slice(body).map_err(|err| {
        // The serde message carries the structural detail (field path,
        // expected vs. actual); it is logged here and never leaks into the
        // error value.
        warn!("response decoding failed: {err}");
        ApiError::DecodingError
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde::Deserialize;
    use url::Url;

    use super::*;
    use crate::request::{HttpMethod, ParamValue};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Greeting {
        message: String,
    }

    #[derive(Debug, Clone)]
    enum Script {
        Respond(RawResponse),
        Fail(TransportError),
    }

    /// Scripted transport: returns a canned outcome and records every wire
    /// request it sees.
    #[derive(Debug)]
    struct ScriptedTransport {
        script: Script,
        seen: Mutex<Vec<WireRequest>>,
    }

    impl ScriptedTransport {
        fn respond(status: u16, body: &str) -> Self {
            Self {
                script: Script::Respond(RawResponse::new(
                    status,
                    vec![],
                    body.as_bytes().to_vec(),
                )),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn fail(err: TransportError) -> Self {
            Self {
                script: Script::Fail(err),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().expect("seen lock").len()
        }

        fn recorded(&self) -> Vec<WireRequest> {
            self.seen.lock().expect("seen lock").clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn execute(&self, request: WireRequest) -> Result<RawResponse, TransportError> {
            self.seen.lock().expect("seen lock").push(request);
            match &self.script {
                Script::Respond(response) => Ok(response.clone()),
                Script::Fail(err) => Err(err.clone()),
            }
        }
    }

    #[derive(Debug, Default)]
    struct TestRequest {
        no_endpoint: bool,
        method: Option<HttpMethod>,
        headers: Option<HashMap<String, String>>,
        parameters: Option<HashMap<String, ParamValue>>,
        raw_body: Option<Vec<u8>>,
    }

    impl ApiRequest for TestRequest {
        type Response = Greeting;

        fn endpoint(&self) -> Option<Url> {
            if self.no_endpoint {
                None
            } else {
                Url::parse("http://localhost/greeting").ok()
            }
        }

        fn method(&self) -> HttpMethod {
            self.method.unwrap_or(HttpMethod::Get)
        }

        fn headers(&self) -> Option<HashMap<String, String>> {
            self.headers.clone()
        }

        fn parameters(&self) -> Option<HashMap<String, ParamValue>> {
            self.parameters.clone()
        }

        fn raw_body(&self) -> Option<Vec<u8>> {
            self.raw_body.clone()
        }
    }

    const GREETING_BODY: &str = r#"{"message": "hello"}"#;

    #[tokio::test]
    async fn test_missing_endpoint_short_circuits() {
        let transport = ScriptedTransport::respond(200, GREETING_BODY);
        let client = ApiClient::new(transport);

        let request = TestRequest {
            no_endpoint: true,
            ..Default::default()
        };
        let result = client.perform(&request).await;

        assert_eq!(result, Err(ApiError::InvalidRequest));
        assert_eq!(client.transport().calls(), 0);
    }

    #[tokio::test]
    async fn test_non_finite_parameter_short_circuits() {
        let transport = ScriptedTransport::respond(200, GREETING_BODY);
        let client = ApiClient::new(transport);

        let request = TestRequest {
            method: Some(HttpMethod::Post),
            parameters: Some(HashMap::from([(
                "ratio".to_string(),
                ParamValue::Number(f64::NAN),
            )])),
            ..Default::default()
        };
        let result = client.perform(&request).await;

        assert_eq!(result, Err(ApiError::EncodingError));
        assert_eq!(client.transport().calls(), 0);
    }

    #[tokio::test]
    async fn test_success_decodes_response() {
        let client = ApiClient::new(ScriptedTransport::respond(200, GREETING_BODY));

        let greeting = client
            .perform(&TestRequest::default())
            .await
            .expect("2xx with valid body decodes");

        assert_eq!(greeting.message, "hello");
        assert_eq!(client.transport().calls(), 1);
    }

    #[tokio::test]
    async fn test_401_short_circuits_before_decoding() {
        // Body is not valid JSON; reaching the decoder would surface
        // DecodingError instead of AuthenticationFailure.
        let client = ApiClient::new(ScriptedTransport::respond(401, "nope"));

        let result = client.perform(&TestRequest::default()).await;

        assert_eq!(result, Err(ApiError::AuthenticationFailure));
    }

    #[tokio::test]
    async fn test_error_status_preserves_code() {
        for status in [404, 422, 500] {
            let client = ApiClient::new(ScriptedTransport::respond(status, "nope"));
            let result = client.perform(&TestRequest::default()).await;
            assert_eq!(result, Err(ApiError::ServerError(status)));
        }
    }

    #[tokio::test]
    async fn test_missing_field_is_decoding_error() {
        let client = ApiClient::new(ScriptedTransport::respond(200, "{}"));

        let result = client.perform(&TestRequest::default()).await;

        assert_eq!(result, Err(ApiError::DecodingError));
    }

    #[tokio::test]
    async fn test_connection_failure_is_no_connectivity() {
        let client = ApiClient::new(ScriptedTransport::fail(TransportError::Connection(
            "connection refused".to_string(),
        )));

        let result = client.perform(&TestRequest::default()).await;

        assert_eq!(result, Err(ApiError::NoConnectivity));
    }

    #[tokio::test]
    async fn test_malformed_response_is_unexpected_response() {
        let client = ApiClient::new(ScriptedTransport::fail(TransportError::Malformed(
            "not HTTP".to_string(),
        )));

        let result = client.perform(&TestRequest::default()).await;

        assert_eq!(result, Err(ApiError::UnexpectedResponse));
    }

    #[tokio::test]
    async fn test_other_transport_failures_are_unknown() {
        for err in [
            TransportError::Timeout,
            TransportError::Other("tls handshake".to_string()),
        ] {
            let client = ApiClient::new(ScriptedTransport::fail(err));
            let result = client.perform(&TestRequest::default()).await;
            assert_eq!(result, Err(ApiError::UnknownError));
        }
    }

    #[tokio::test]
    async fn test_headers_reach_the_wire_verbatim() {
        let client = ApiClient::new(ScriptedTransport::respond(200, GREETING_BODY));

        let request = TestRequest {
            headers: Some(HashMap::from([
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), "2".to_string()),
            ])),
            ..Default::default()
        };
        client.perform(&request).await.expect("request succeeds");

        let recorded = client.transport().recorded();
        let headers = &recorded[0].headers;
        assert!(headers.contains(&("A".to_string(), "1".to_string())));
        assert!(headers.contains(&("B".to_string(), "2".to_string())));
    }

    #[tokio::test]
    async fn test_raw_body_wins_over_parameters() {
        let client = ApiClient::new(ScriptedTransport::respond(200, GREETING_BODY));

        let request = TestRequest {
            method: Some(HttpMethod::Post),
            parameters: Some(HashMap::from([(
                "ignored".to_string(),
                ParamValue::from("field"),
            )])),
            raw_body: Some(b"raw wins".to_vec()),
            ..Default::default()
        };
        client.perform(&request).await.expect("request succeeds");

        let recorded = client.transport().recorded();
        assert_eq!(recorded[0].body.as_deref(), Some(b"raw wins".as_slice()));
        // The JSON content type is only appended on the parameter path.
        assert!(!recorded[0]
            .headers
            .contains(&("Content-Type".to_string(), "application/json".to_string())));
    }

    #[tokio::test]
    async fn test_parameters_encode_as_json_body() {
        let client = ApiClient::new(ScriptedTransport::respond(200, GREETING_BODY));

        let request = TestRequest {
            method: Some(HttpMethod::Post),
            parameters: Some(HashMap::from([
                ("name".to_string(), ParamValue::from("quill")),
                ("active".to_string(), ParamValue::from(true)),
            ])),
            ..Default::default()
        };
        client.perform(&request).await.expect("request succeeds");

        let recorded = client.transport().recorded();
        let body = recorded[0].body.as_deref().expect("body present");
        let sent: Value = serde_json::from_slice(body).expect("body is JSON");
        assert_eq!(sent, serde_json::json!({"name": "quill", "active": true}));
        assert!(recorded[0]
            .headers
            .contains(&("Content-Type".to_string(), "application/json".to_string())));
    }

    #[tokio::test]
    async fn test_empty_contract_sends_empty_body() {
        let client = ApiClient::new(ScriptedTransport::respond(200, GREETING_BODY));

        client
            .perform(&TestRequest::default())
            .await
            .expect("request succeeds");

        let recorded = client.transport().recorded();
        assert_eq!(recorded[0].method, HttpMethod::Get);
        assert!(recorded[0].body.is_none());
    }

    #[tokio::test]
    async fn test_identical_contracts_yield_identical_outcomes() {
        let client = ApiClient::new(ScriptedTransport::respond(200, GREETING_BODY));
        let request = TestRequest::default();

        let first = client.perform(&request).await;
        let second = client.perform(&request).await;

        assert_eq!(first, second);
        assert_eq!(client.transport().calls(), 2);
    }
}
