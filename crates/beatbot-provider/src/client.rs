// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the booking provider API.
//!
//! Provides [`B81Client`], the sole [`BookingApi`] implementation. Each
//! method is one round trip; status codes map onto the shared error
//! taxonomy (401 to `Unauthorized`, 404 to `NotFound`, 409 to `Duplicate`).

use std::time::Duration;

use async_trait::async_trait;
use beatbot_core::traits::BookingApi;
use beatbot_core::types::{AuthSession, City, Event, Ticket};
use beatbot_core::BeatbotError;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use tracing::debug;

use crate::jwt;
use crate::types::{
    AuthPayload, AuthRequest, CreateTicketRequest, Enveloped, EventList, TicketList,
    TicketStatusRequest,
};

/// Timestamp format the provider expects in query parameters.
const QUERY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// HTTP client for provider API communication.
#[derive(Debug, Clone)]
pub struct B81Client {
    client: reqwest::Client,
    base_url: String,
}

impl B81Client {
    /// Creates a new provider client with a bounded request timeout.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, BeatbotError> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| BeatbotError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<T, BeatbotError> {
        if !response.status().is_success() {
            return Err(status_error(endpoint, response).await);
        }
        let body = response.text().await.map_err(|e| transport(endpoint, e))?;
        serde_json::from_str(&body).map_err(|e| BeatbotError::Parse {
            message: format!("{endpoint} returned unexpected JSON: {e}"),
        })
    }
}

fn transport(endpoint: &str, e: reqwest::Error) -> BeatbotError {
    BeatbotError::Transport {
        message: format!("{endpoint} request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

async fn status_error(endpoint: &str, response: reqwest::Response) -> BeatbotError {
    let status = response.status();
    match status {
        StatusCode::UNAUTHORIZED => BeatbotError::Unauthorized,
        StatusCode::NOT_FOUND => BeatbotError::NotFound {
            what: endpoint.to_string(),
        },
        StatusCode::CONFLICT => BeatbotError::Duplicate {
            what: endpoint.to_string(),
        },
        _ => {
            let body = response.text().await.unwrap_or_default();
            BeatbotError::Transport {
                message: format!("{endpoint} returned {status}: {body}"),
                source: None,
            }
        }
    }
}

#[async_trait]
impl BookingApi for B81Client {
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, BeatbotError> {
        let response = self
            .client
            .post(self.url("/api/authentication"))
            .json(&AuthRequest {
                email,
                password,
                strategy: "local",
            })
            .send()
            .await
            .map_err(|e| transport("authentication", e))?;

        debug!(status = %response.status(), "authentication response received");
        let payload: Enveloped<AuthPayload> =
            B81Client::decode("authentication", response).await?;

        let claims = jwt::decode_claims(&payload.data.access_token)?;
        Ok(AuthSession {
            access_token: payload.data.access_token,
            provider_user_id: claims.user_id,
            given_name: claims.given_name,
            family_name: claims.family_name,
            email: if claims.email.is_empty() {
                email.to_string()
            } else {
                claims.email
            },
        })
    }

    async fn list_tickets(
        &self,
        token: &str,
        provider_user_id: &str,
    ) -> Result<Vec<Ticket>, BeatbotError> {
        let now = Utc::now().format(QUERY_TIME_FORMAT).to_string();
        let response = self
            .client
            .get(self.url("/api/tickets"))
            .bearer_auth(token)
            .query(&[
                ("user_id", provider_user_id),
                ("status_ne", "cancelled"),
                ("event_date_begin_gte", now.as_str()),
                ("$sort[event_date_begin]", "1"),
                ("$limit", "30"),
            ])
            .send()
            .await
            .map_err(|e| transport("tickets", e))?;

        let list: TicketList = B81Client::decode("tickets", response).await?;
        Ok(list.data)
    }

    async fn cancel_ticket(&self, token: &str, ticket_id: &str) -> Result<(), BeatbotError> {
        let response = self
            .client
            .post(self.url(&format!("/api/tickets/{ticket_id}/status")))
            .bearer_auth(token)
            .json(&TicketStatusRequest {
                status_name: "cancelled",
            })
            .send()
            .await
            .map_err(|e| transport("ticket cancel", e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(status_error("ticket cancel", response).await)
        }
    }

    async fn get_ticket(&self, token: &str, ticket_id: &str) -> Result<Ticket, BeatbotError> {
        let response = self
            .client
            .get(self.url(&format!("/api/tickets/{ticket_id}")))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| transport("ticket", e))?;

        let ticket: Enveloped<Ticket> = B81Client::decode("ticket", response).await?;
        Ok(ticket.data)
    }

    async fn get_event(&self, event_id: &str) -> Result<Event, BeatbotError> {
        let response = self
            .client
            .get(self.url(&format!("/api/events/{event_id}")))
            .send()
            .await
            .map_err(|e| transport("event", e))?;

        let event: Enveloped<Event> = B81Client::decode("event", response).await?;
        Ok(event.data)
    }

    async fn list_events(
        &self,
        city: City,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Event>, BeatbotError> {
        let from = from.format(QUERY_TIME_FORMAT).to_string();
        let to = to.format(QUERY_TIME_FORMAT).to_string();
        let limit = limit.to_string();
        let response = self
            .client
            .get(self.url("/api/events/"))
            .query(&[
                ("$sort[date_begin]", "1"),
                ("date_begin_gte", from.as_str()),
                ("date_begin_lte", to.as_str()),
                ("is_published", "true"),
                ("status_ne", "cancelled"),
                ("location_city_code", city.code()),
                ("$limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| transport("events", e))?;

        let list: EventList = B81Client::decode("events", response).await?;
        Ok(list.data)
    }

    async fn create_ticket(
        &self,
        token: &str,
        event_id: &str,
        provider_user_id: &str,
    ) -> Result<Ticket, BeatbotError> {
        let response = self
            .client
            .post(self.url("/api/tickets"))
            .bearer_auth(token)
            .json(&CreateTicketRequest {
                event_id,
                user_id: provider_user_id,
            })
            .send()
            .await
            .map_err(|e| transport("ticket create", e))?;

        debug!(status = %response.status(), event_id, "ticket create response received");
        let ticket: Enveloped<Ticket> = B81Client::decode("ticket create", response).await?;
        Ok(ticket.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> B81Client {
        B81Client::new("https://unused.invalid".to_string(), Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri())
    }

    fn fake_jwt() -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::json!({
                "userId": "user-42",
                "given_name": "Ada",
                "family_name": "Lovelace",
                "email": "ada@example.com",
            })
            .to_string()
            .as_bytes(),
        );
        format!("{header}.{payload}.sig")
    }

    fn event_json(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "date_begin": "2026-09-07T16:00:00.000Z",
            "location": {"id": "loc-1", "name": "Gym", "city_code": "munich"},
            "max_participants": 20,
            "participants_count": 3,
            "is_published": true,
            "status": "published",
        })
    }

    #[tokio::test]
    async fn authenticate_decodes_token_claims() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/authentication"))
            .and(body_partial_json(serde_json::json!({
                "email": "ada@example.com",
                "strategy": "local",
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "data": {"accessToken": fake_jwt()},
            })))
            .mount(&server)
            .await;

        let session = test_client(&server)
            .authenticate("ada@example.com", "secret")
            .await
            .unwrap();
        assert_eq!(session.provider_user_id, "user-42");
        assert_eq!(session.given_name, "Ada");
        assert_eq!(session.email, "ada@example.com");
    }

    #[tokio::test]
    async fn authenticate_rejection_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/authentication"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .authenticate("ada@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn list_tickets_sends_bearer_and_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tickets"))
            .and(header("authorization", "Bearer tok-1"))
            .and(query_param("user_id", "user-42"))
            .and(query_param("status_ne", "cancelled"))
            .and(query_param("$limit", "30"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": "t-1", "status": "confirmed", "event": event_json("ev-1")}],
                "total": 1,
            })))
            .mount(&server)
            .await;

        let tickets = test_client(&server)
            .list_tickets("tok-1", "user-42")
            .await
            .unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].id, "t-1");
        assert_eq!(
            tickets[0].event.as_ref().map(|e| e.id.as_str()),
            Some("ev-1")
        );
    }

    #[tokio::test]
    async fn expired_token_surfaces_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tickets"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .list_tickets("stale", "user-42")
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn cancel_posts_status_change() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/tickets/t-9/status"))
            .and(header("authorization", "Bearer tok-1"))
            .and(body_partial_json(serde_json::json!({
                "status_name": "cancelled",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        test_client(&server)
            .cancel_ticket("tok-1", "t-9")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn list_events_scopes_by_city_and_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/events/"))
            .and(query_param("location_city_code", "munich"))
            .and(query_param("is_published", "true"))
            .and(query_param("status_ne", "cancelled"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [event_json("ev-1"), event_json("ev-2")],
                "total": 2,
            })))
            .mount(&server)
            .await;

        let from = "2026-09-07T00:00:00Z".parse().unwrap();
        let to = "2026-09-08T00:00:00Z".parse().unwrap();
        let events = test_client(&server)
            .list_events(City::Munich, from, to, 200)
            .await
            .unwrap();
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_booking_maps_to_duplicate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/tickets"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .create_ticket("tok-1", "ev-1", "user-42")
            .await
            .unwrap_err();
        assert!(err.is_duplicate());
    }

    #[tokio::test]
    async fn create_ticket_returns_ticket() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/tickets"))
            .and(body_partial_json(serde_json::json!({
                "event_id": "ev-1",
                "user_id": "user-42",
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "data": {"id": "t-7", "status": "confirmed", "event": event_json("ev-1")},
            })))
            .mount(&server)
            .await;

        let ticket = test_client(&server)
            .create_ticket("tok-1", "ev-1", "user-42")
            .await
            .unwrap();
        assert_eq!(ticket.id, "t-7");
    }

    #[tokio::test]
    async fn unknown_event_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/events/nope"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = test_client(&server).get_event("nope").await.unwrap_err();
        assert!(matches!(err, BeatbotError::NotFound { .. }));
    }
}
