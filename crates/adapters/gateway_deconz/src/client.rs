//! HTTP client for one deCONZ light group.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use wakelamp_app::ports::Gateway;
use wakelamp_domain::error::WakeLampError;
use wakelamp_domain::group::{GroupCommand, GroupState};

use crate::error::GatewayError;

/// Where the group lives and how to authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeconzConfig {
    /// `host[:port]`, optionally with an `http://` prefix.
    pub host: String,
    pub api_key: String,
    pub group_id: String,
    /// Per-request timeout; `None` keeps the client default.
    pub timeout: Option<Duration>,
}

impl DeconzConfig {
    fn group_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        let base = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{host}")
        };
        format!("{base}/api/{}/groups/{}", self.api_key, self.group_id)
    }
}

/// The group resource; only its last commanded state is of interest.
#[derive(Deserialize)]
struct GroupResource {
    action: GroupState,
}

#[derive(Deserialize)]
struct ErrorDetail {
    description: String,
}

/// One entry of a deCONZ result array.
#[derive(Deserialize)]
struct ResultEntry {
    error: Option<ErrorDetail>,
}

/// First error description in a deCONZ result array, if any.
fn first_error(body: &serde_json::Value) -> Option<String> {
    let entries: Vec<ResultEntry> = serde_json::from_value(body.clone()).ok()?;
    entries
        .into_iter()
        .find_map(|entry| entry.error.map(|e| e.description))
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let description = serde_json::from_str(&text)
        .ok()
        .and_then(|body| first_error(&body))
        .unwrap_or(text);
    Err(GatewayError::Status {
        status: status.as_u16(),
        description,
    })
}

/// [`Gateway`] over the deCONZ REST API.
pub struct DeconzGateway {
    client: reqwest::Client,
    group_url: String,
    action_url: String,
}

impl DeconzGateway {
    /// Build a client for the configured group.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &DeconzConfig) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let group_url = config.group_url();
        Ok(Self {
            client: builder.build()?,
            action_url: format!("{group_url}/action"),
            group_url,
        })
    }

    /// Fetch the group and return its `action` state.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport failure, a non-success status,
    /// or a body without an `action` object.
    pub async fn fetch_state(&self) -> Result<GroupState, GatewayError> {
        let response = self.client.get(&self.group_url).send().await?;
        let group: GroupResource = ensure_success(response).await?.json().await?;
        tracing::trace!(on = group.action.on, bri = group.action.bri, "group state fetched");
        Ok(group.action)
    }

    /// Send a partial state to the group.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport failure, a non-success status,
    /// or when the result array carries an `error` entry.
    pub async fn put_action(&self, command: &GroupCommand) -> Result<(), GatewayError> {
        let response = self
            .client
            .put(&self.action_url)
            .json(command)
            .send()
            .await?;
        let body: serde_json::Value = ensure_success(response).await?.json().await?;
        if let Some(description) = first_error(&body) {
            return Err(GatewayError::Rejected(description));
        }
        Ok(())
    }
}

impl Gateway for DeconzGateway {
    fn group_state(&self) -> impl Future<Output = Result<GroupState, WakeLampError>> + Send {
        async move { self.fetch_state().await.map_err(WakeLampError::from) }
    }

    fn apply(
        &self,
        command: &GroupCommand,
    ) -> impl Future<Output = Result<(), WakeLampError>> + Send {
        let command = command.clone();
        async move { self.put_action(&command).await.map_err(WakeLampError::from) }
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::Json;
    use axum::Router;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::{get, put};
    use serde_json::{Value, json};

    use super::*;
    use wakelamp_domain::color::Xy;
    use wakelamp_domain::event::Direction;

    const KEY: &str = "ABCDEF1234";

    #[derive(Clone, Default)]
    struct FakeDeconz {
        received: Arc<Mutex<Vec<Value>>>,
        reject_puts: bool,
    }

    fn deconz_error(kind: u16, address: &str, description: &str) -> Value {
        json!([{ "error": { "type": kind, "address": address, "description": description } }])
    }

    fn check(key: &str, id: &str) -> Result<(), (StatusCode, Json<Value>)> {
        if key != KEY {
            return Err((
                StatusCode::FORBIDDEN,
                Json(deconz_error(1, "/", "unauthorized user")),
            ));
        }
        if id != "3" {
            let address = format!("/groups/{id}");
            return Err((
                StatusCode::NOT_FOUND,
                Json(deconz_error(3, &address, &format!("resource, {address}, not available"))),
            ));
        }
        Ok(())
    }

    async fn get_group(
        Path((key, id)): Path<(String, String)>,
    ) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
        check(&key, &id)?;
        Ok(Json(json!({
            "name": "wakeuplamps",
            "lights": ["1", "2"],
            "action": { "on": true, "bri": 127, "xy": [0.4, 0.35], "ct": 300, "effect": "none" },
            "state": { "all_on": true, "any_on": true }
        })))
    }

    async fn put_action(
        State(fake): State<FakeDeconz>,
        Path((key, id)): Path<(String, String)>,
        Json(body): Json<Value>,
    ) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
        check(&key, &id)?;
        fake.received.lock().unwrap().push(body.clone());
        if fake.reject_puts {
            return Ok(Json(json!([
                { "success": { "/groups/3/action/on": true } },
                { "error": { "type": 7, "address": "/groups/3/action/bri", "description": "invalid value, 300, for parameter, bri" } }
            ])));
        }
        let entries: Vec<Value> = body
            .as_object()
            .map(|fields| {
                fields
                    .iter()
                    .map(|(field, value)| {
                        let mut success = serde_json::Map::new();
                        success.insert(format!("/groups/3/action/{field}"), value.clone());
                        json!({ "success": success })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(Json(Value::Array(entries)))
    }

    async fn serve(fake: FakeDeconz) -> SocketAddr {
        let app = Router::new()
            .route("/api/{key}/groups/{id}", get(get_group))
            .route("/api/{key}/groups/{id}/action", put(put_action))
            .with_state(fake);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn gateway(addr: SocketAddr, api_key: &str, group_id: &str) -> DeconzGateway {
        DeconzGateway::new(&DeconzConfig {
            host: addr.to_string(),
            api_key: api_key.to_string(),
            group_id: group_id.to_string(),
            timeout: Some(Duration::from_secs(5)),
        })
        .unwrap()
    }

    #[test]
    fn should_build_group_url_from_host() {
        let config = DeconzConfig {
            host: "192.168.1.20:8080".to_string(),
            api_key: KEY.to_string(),
            group_id: "3".to_string(),
            timeout: None,
        };
        assert_eq!(
            config.group_url(),
            "http://192.168.1.20:8080/api/ABCDEF1234/groups/3"
        );

        let prefixed = DeconzConfig {
            host: "http://gateway.local/".to_string(),
            ..config
        };
        assert_eq!(
            prefixed.group_url(),
            "http://gateway.local/api/ABCDEF1234/groups/3"
        );
    }

    #[tokio::test]
    async fn should_read_action_state() {
        let addr = serve(FakeDeconz::default()).await;

        let state = gateway(addr, KEY, "3").group_state().await.unwrap();

        assert!(state.on);
        assert_eq!(state.bri, 127);
        assert_eq!(state.xy, Some(Xy::new(0.4, 0.35)));
    }

    #[tokio::test]
    async fn should_send_partial_state() {
        let fake = FakeDeconz::default();
        let addr = serve(fake.clone()).await;

        gateway(addr, KEY, "3")
            .apply(&GroupCommand::brightness_leg(
                Direction::Off,
                Duration::from_secs(1350),
            ))
            .await
            .unwrap();

        let received = fake.received.lock().unwrap().clone();
        assert_eq!(
            received,
            vec![json!({ "on": true, "bri": 1, "transitiontime": 13500 })]
        );
    }

    #[tokio::test]
    async fn should_fail_when_result_array_has_error() {
        let addr = serve(FakeDeconz {
            reject_puts: true,
            ..FakeDeconz::default()
        })
        .await;

        let err = gateway(addr, KEY, "3")
            .put_action(&GroupCommand::power_off())
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Rejected(ref d) if d.contains("bri")));
    }

    #[tokio::test]
    async fn should_surface_gateway_description_on_error_status() {
        let addr = serve(FakeDeconz::default()).await;

        let err = gateway(addr, KEY, "9").fetch_state().await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Status { status: 404, ref description } if description.contains("/groups/9")
        ));

        let err = gateway(addr, "WRONG", "3").fetch_state().await.unwrap_err();
        assert!(matches!(err, GatewayError::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn should_map_failures_to_gateway_error() {
        let addr = serve(FakeDeconz::default()).await;

        let err = gateway(addr, KEY, "9").group_state().await.unwrap_err();

        assert!(matches!(err, WakeLampError::Gateway(_)));
    }
}
