//! `reqwest` implementation of the backend gateways.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;

use tiffin_core::{InvoiceId, RestaurantId};
use tiffin_invoicing::{InvoicePayload, PaymentMethodCatalog, TaxConfig};

use crate::config::ClientConfig;
use crate::error::{GENERIC_NETWORK_ERROR, TransportError};
use crate::gateway::{CreatedInvoice, InvoiceGateway, SettingsGateway};

const INVOICES_PATH: &[&str] = &["invoices"];
const PAYMENT_METHODS_PATH: &[&str] = &["payment-methods"];

/// Talks to the REST backend over HTTP.
///
/// This struct is cheap to clone (the underlying connection pool is shared).
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    api_url: Url,
    token: Option<String>,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            token: config.token.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::Network(format!("invalid API URL {}", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, TransportError> {
        self.authorize(req)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))
    }
}

#[async_trait]
impl InvoiceGateway for HttpGateway {
    async fn create_invoice(
        &self,
        payload: &InvoicePayload,
    ) -> Result<CreatedInvoice, TransportError> {
        let url = self.endpoint(INVOICES_PATH)?;
        tracing::debug!("POST {} ({} items)", url, payload.items.len());

        let resp = self.send(self.client.post(url).json(payload)).await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(api_error(status, &text));
        }

        // The invoice is stored from here on; an unreadable body only loses the id.
        let body = match resp.text().await {
            Ok(text) => serde_json::from_str(&text).unwrap_or(Value::Null),
            Err(e) => {
                tracing::warn!(error = %e, "create-invoice response body unreadable");
                Value::Null
            }
        };

        let invoice_id = extract_invoice_id(&body);
        if invoice_id.is_none() {
            tracing::warn!(%status, "backend accepted the invoice without returning its id");
        }

        Ok(CreatedInvoice {
            invoice_id,
            message: body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

#[async_trait]
impl SettingsGateway for HttpGateway {
    async fn tax_config(
        &self,
        restaurant_id: &RestaurantId,
    ) -> Result<Option<TaxConfig>, TransportError> {
        let url = self.endpoint(&["restaurants", restaurant_id.as_str(), "threshold"])?;
        tracing::debug!("GET {}", url);

        let resp = self.send(self.client.get(url)).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = unwrap_data(read_json(resp).await?);
        if body.is_null() {
            return Ok(None);
        }
        serde_json::from_value(body)
            .map(Some)
            .map_err(|e| TransportError::Parse(format!("tax configuration: {e}")))
    }

    async fn payment_methods(&self) -> Result<PaymentMethodCatalog, TransportError> {
        let url = self.endpoint(PAYMENT_METHODS_PATH)?;
        tracing::debug!("GET {}", url);

        let resp = self.send(self.client.get(url)).await?;
        let body = unwrap_data(read_json(resp).await?);
        serde_json::from_value(body)
            .map_err(|e| TransportError::Parse(format!("payment methods: {e}")))
    }
}

/// Map the response to JSON, or to an `Api` error carrying the backend's message.
async fn read_json(resp: Response) -> Result<Value, TransportError> {
    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| TransportError::Network(e.to_string()))?;

    if !status.is_success() {
        return Err(api_error(status, &text));
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| TransportError::Parse(e.to_string()))
}

fn api_error(status: StatusCode, body: &str) -> TransportError {
    TransportError::Api {
        status: status.as_u16(),
        message: backend_message(body),
    }
}

fn backend_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_NETWORK_ERROR.to_string())
}

/// The backend wraps most payloads as `{ "data": ... }`.
fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Id of the stored invoice from the `{ "data": { "_id": ... } }` envelope.
fn extract_invoice_id(body: &Value) -> Option<InvoiceId> {
    match body.pointer("/data/_id")? {
        Value::String(s) => InvoiceId::new(s.as_str()).ok(),
        Value::Number(n) => InvoiceId::new(n.to_string()).ok(),
        _ => None,
    }
}
