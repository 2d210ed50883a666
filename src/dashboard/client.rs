//! HTTP client for the orders API.

use reqwest::{Client, Response};
use uuid::Uuid;

use crate::errors::MessageBody;
use crate::models::order::{Order, UpdateOrder, UpdateOrderResponse};

/// Failures reaching or interpreting the orders API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// Thin wrapper over the three order endpoints.
#[derive(Debug, Clone)]
pub struct OrdersClient {
    http: Client,
    base_url: String,
}

impl OrdersClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// GET /api/orders/all
    pub async fn list_all(&self) -> Result<Vec<Order>, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/orders/all", self.base_url))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// POST /api/orders/update
    pub async fn update(&self, body: &UpdateOrder) -> Result<UpdateOrderResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/orders/update", self.base_url))
            .json(body)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// DELETE /api/orders/{id}
    pub async fn delete(&self, id: Uuid) -> Result<MessageBody, ClientError> {
        let response = self
            .http
            .delete(format!("{}/api/orders/{id}", self.base_url))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }
}

/// Turn non-2xx responses into `ClientError::Api`, keeping the server's message.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<MessageBody>(&text) {
        Ok(MessageBody {
            message,
            error: Some(error),
        }) => format!("{message} ({error})"),
        Ok(MessageBody { message, .. }) => message,
        Err(_) => text,
    };

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slash() {
        let client = OrdersClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn api_error_display() {
        let err = ClientError::Api {
            status: 400,
            message: "Invalid order ID".into(),
        };
        assert_eq!(err.to_string(), "Server returned 400: Invalid order ID");
    }
}
