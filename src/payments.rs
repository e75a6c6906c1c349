//! Hosted-checkout payment gateway.
//!
//! The service never handles card data: it opens a checkout session on the
//! gateway, redirects the buyer to the session URL, and later asks the gateway
//! whether that session was paid.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub name: String,
    /// Minor units.
    pub unit_amount: i64,
}

/// Longest `client_reference_id` the gateway accepts.
pub const MAX_CLIENT_REFERENCE_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionRequest {
    pub currency: String,
    pub line_items: Vec<LineItem>,
    pub success_url: String,
    pub cancel_url: String,
    /// Opaque reference echoed back by the gateway: the buyer's user id.
    /// Settlement goes by session id, so this is informational only.
    pub client_reference: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Open,
    Paid,
    Expired,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> AppResult<CheckoutSession>;

    async fn session_status(&self, session_id: &str) -> AppResult<SessionStatus>;
}

/// Gateway speaking the Stripe Checkout Sessions API.
pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(api_base: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    url: Option<String>,
    status: Option<String>,
    payment_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

/// Form fields for `POST /v1/checkout/sessions`.
pub(crate) fn session_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];
    let reference = request.client_reference.trim();
    if !reference.is_empty() && reference.len() <= MAX_CLIENT_REFERENCE_LEN {
        form.push(("client_reference_id".to_string(), reference.to_string()));
    } else if !reference.is_empty() {
        tracing::warn!(len = reference.len(), "client reference too long, omitted");
    }
    for (i, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((
            format!("{prefix}[price_data][currency]"),
            request.currency.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            item.name.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        form.push((format!("{prefix}[quantity]"), "1".to_string()));
    }
    form
}

pub(crate) fn map_status(status: Option<&str>, payment_status: Option<&str>) -> SessionStatus {
    match (status, payment_status) {
        (_, Some("paid")) | (_, Some("no_payment_required")) => SessionStatus::Paid,
        (Some("expired"), _) => SessionStatus::Expired,
        _ => SessionStatus::Open,
    }
}

async fn read_session(response: reqwest::Response) -> AppResult<StripeSession> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .json::<StripeErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error.message)
            .unwrap_or_else(|| status.to_string());
        return Err(AppError::Payment(message));
    }
    response
        .json::<StripeSession>()
        .await
        .map_err(|e| AppError::Payment(e.to_string()))
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> AppResult<CheckoutSession> {
        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&session_form(&request))
            .send()
            .await
            .map_err(|e| AppError::Payment(e.to_string()))?;

        let session = read_session(response).await?;
        let url = session
            .url
            .ok_or_else(|| AppError::Payment("checkout session has no url".into()))?;
        tracing::debug!(session_id = %session.id, "checkout session created");
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    async fn session_status(&self, session_id: &str) -> AppResult<SessionStatus> {
        let response = self
            .client
            .get(format!(
                "{}/v1/checkout/sessions/{}",
                self.api_base, session_id
            ))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| AppError::Payment(e.to_string()))?;

        let session = read_session(response).await?;
        Ok(map_status(
            session.status.as_deref(),
            session.payment_status.as_deref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_encodes_every_line_item() {
        let request = CheckoutSessionRequest {
            currency: "usd".into(),
            line_items: vec![
                LineItem {
                    name: "Rust 101".into(),
                    unit_amount: 1_999,
                },
                LineItem {
                    name: "Async Rust".into(),
                    unit_amount: 4_500,
                },
            ],
            success_url: "http://localhost:5173/loading/my-enrollments".into(),
            cancel_url: "http://localhost:5173/".into(),
            client_reference: "abc".into(),
        };
        let form = session_form(&request);
        let get = |key: &str| {
            form.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("client_reference_id"), Some("abc"));
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("1999"));
        assert_eq!(
            get("line_items[1][price_data][product_data][name]"),
            Some("Async Rust")
        );
        assert_eq!(get("line_items[1][price_data][currency]"), Some("usd"));
        assert_eq!(get("line_items[1][quantity]"), Some("1"));
    }

    #[test]
    fn oversized_reference_is_left_out() {
        let request = CheckoutSessionRequest {
            currency: "usd".into(),
            line_items: vec![LineItem {
                name: "Rust 101".into(),
                unit_amount: 100,
            }],
            success_url: "http://localhost/ok".into(),
            cancel_url: "http://localhost/".into(),
            client_reference: "x".repeat(MAX_CLIENT_REFERENCE_LEN + 1),
        };
        let form = session_form(&request);
        assert!(form.iter().all(|(k, _)| k != "client_reference_id"));
        assert!(form.iter().any(|(k, _)| k == "line_items[0][quantity]"));
    }

    #[test]
    fn maps_gateway_statuses() {
        assert_eq!(
            map_status(Some("complete"), Some("paid")),
            SessionStatus::Paid
        );
        assert_eq!(
            map_status(Some("complete"), Some("no_payment_required")),
            SessionStatus::Paid
        );
        assert_eq!(
            map_status(Some("expired"), Some("unpaid")),
            SessionStatus::Expired
        );
        assert_eq!(map_status(Some("open"), Some("unpaid")), SessionStatus::Open);
        assert_eq!(map_status(None, None), SessionStatus::Open);
    }
}
