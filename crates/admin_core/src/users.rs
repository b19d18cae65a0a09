use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{User, UserId},
    error::remote_message,
    protocol::{CreateUserAck, UserPayload},
};

use crate::error::GatewayError;

/// The users REST API, `{api_url}/users`. One attempt per operation; the
/// caller decides whether to retry.
#[async_trait]
pub trait UserGateway: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, GatewayError>;
    async fn create(&self, payload: &UserPayload) -> Result<CreateUserAck, GatewayError>;
    async fn update(&self, id: &UserId, payload: &UserPayload) -> Result<(), GatewayError>;
    async fn delete(&self, id: &UserId) -> Result<(), GatewayError>;
}

pub struct HttpUserGateway {
    http: Client,
    api_url: String,
}

impl HttpUserGateway {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into(),
        }
    }
}

/// Maps a non-success response to `GatewayError::Remote`, pulling the
/// server's message out of the body when one is there.
async fn check_status(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .ok()
        .as_deref()
        .and_then(remote_message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    Err(GatewayError::Remote { status, message })
}

#[async_trait]
impl UserGateway for HttpUserGateway {
    async fn list(&self) -> Result<Vec<User>, GatewayError> {
        let response = self
            .http
            .get(format!("{}/users", self.api_url))
            .send()
            .await?;
        let users = check_status(response).await?.json().await?;
        Ok(users)
    }

    async fn create(&self, payload: &UserPayload) -> Result<CreateUserAck, GatewayError> {
        let response = self
            .http
            .post(format!("{}/users", self.api_url))
            .json(payload)
            .send()
            .await?;
        let ack = check_status(response).await?.json().await?;
        Ok(ack)
    }

    async fn update(&self, id: &UserId, payload: &UserPayload) -> Result<(), GatewayError> {
        let response = self
            .http
            .put(format!("{}/users/{id}", self.api_url))
            .json(payload)
            .send()
            .await?;
        // No required response body on update.
        check_status(response).await?;
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), GatewayError> {
        let response = self
            .http
            .delete(format!("{}/users/{id}", self.api_url))
            .send()
            .await?;
        // Delete may legitimately answer with an empty body.
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/users_tests.rs"]
mod tests;
