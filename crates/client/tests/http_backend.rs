use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use tiffin_client::{
    ClientConfig, GENERIC_NETWORK_ERROR, HttpGateway, InvoiceSession, SessionError,
    SettingsGateway, TransportError,
};
use tiffin_core::{CustomerId, InvoiceId, Money, Percent, PaymentMethodId, RestaurantId};
use tiffin_invoicing::{Customer, DraftState, InvoiceItem, RoundingChoice};

#[derive(Clone, Default)]
struct Backend {
    received: Arc<Mutex<Vec<Value>>>,
    auth: Arc<Mutex<Vec<String>>>,
    respond_with: Arc<Mutex<Option<(StatusCode, Value)>>>,
}

struct TestServer {
    base_url: String,
    backend: Backend,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        tiffin_observability::init();

        let backend = Backend::default();
        let app = Router::new()
            .route("/restaurants/:id/threshold", get(threshold))
            .route("/payment-methods", get(payment_methods))
            .route("/invoices", post(create_invoice))
            .with_state(backend.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            backend,
            handle,
        }
    }

    fn gateway(&self) -> HttpGateway {
        let config = ClientConfig::new(&self.base_url)
            .unwrap()
            .with_token("secret-token");
        HttpGateway::new(&config).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn threshold(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    match id.as_str() {
        "rest-taxed" => (StatusCode::OK, Json(json!({"data": {"taxPercentage": 5}}))),
        "rest-null" => (StatusCode::OK, Json(json!({"data": null}))),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "no threshold configured"})),
        ),
    }
}

async fn payment_methods() -> Json<Value> {
    Json(json!({
        "data": [
            {"id": "cash", "label": "Cash"},
            {"id": "upi", "label": "UPI"}
        ]
    }))
}

async fn create_invoice(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        backend.auth.lock().unwrap().push(auth.to_string());
    }
    backend.received.lock().unwrap().push(body);

    if let Some((status, body)) = backend.respond_with.lock().unwrap().take() {
        return (status, Json(body));
    }
    (
        StatusCode::CREATED,
        Json(json!({"message": "Invoice created", "data": {"_id": "inv-42"}})),
    )
}

fn inv_42() -> InvoiceId {
    InvoiceId::new("inv-42").unwrap()
}

fn customer() -> Customer {
    Customer::new(CustomerId::new("cust-7").unwrap(), "Arjun")
}

#[tokio::test]
async fn tax_config_reads_envelope_and_treats_missing_as_none() {
    let server = TestServer::spawn().await;
    let gateway = server.gateway();

    let taxed = gateway
        .tax_config(&RestaurantId::new("rest-taxed").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(taxed.tax_percentage, Percent::from_integer(5));

    let null = gateway
        .tax_config(&RestaurantId::new("rest-null").unwrap())
        .await
        .unwrap();
    assert!(null.is_none());

    let missing = gateway
        .tax_config(&RestaurantId::new("rest-unknown").unwrap())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn payment_methods_are_loaded() {
    let server = TestServer::spawn().await;
    let catalog = server.gateway().payment_methods().await.unwrap();

    assert_eq!(catalog.len(), 2);
    assert!(catalog.contains(&PaymentMethodId::new("upi").unwrap()));
}

#[tokio::test]
async fn session_submits_wire_payload_and_commits() {
    let server = TestServer::spawn().await;
    let mut session = InvoiceSession::open(
        server.gateway(),
        RestaurantId::new("rest-taxed").unwrap(),
        customer(),
    )
    .await
    .unwrap();

    session
        .set_items(vec![
            InvoiceItem::new("Lunch plan", "22", Money::from_major(900)),
            InvoiceItem::new("Extra roti", "5", Money::from_major(103)),
        ])
        .unwrap();
    session.set_rounding(RoundingChoice::Floor10).unwrap();
    session
        .set_advance(Money::from_major(1050), Some(PaymentMethodId::new("upi").unwrap()))
        .unwrap();

    let invoice_id = session.submit().await.unwrap();
    assert_eq!(invoice_id, Some(inv_42()));
    assert_eq!(session.draft().state(), DraftState::Committed);

    let received = server.backend.received.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    let body = &received[0];
    assert_eq!(body["subTotal"].as_f64(), Some(1003.0));
    assert_eq!(body["tax"].as_f64(), Some(50.15));
    assert_eq!(body["roundOffAmount"].as_f64(), Some(-3.15));
    assert_eq!(body["finalAmmount"].as_f64(), Some(1050.0));
    assert_eq!(body["invoiceStatus"], "paid");
    assert_eq!(body["paymentMethod"], "upi");
    assert_eq!(body["customerId"], "cust-7");
    assert_eq!(body["restaurantId"], "rest-taxed");
    assert_eq!(body["items"][1]["name"], "Extra roti");

    let auth = server.backend.auth.lock().unwrap().clone();
    assert_eq!(auth, vec!["Bearer secret-token".to_string()]);
}

#[tokio::test]
async fn backend_rejection_surfaces_message_and_allows_retry() {
    let server = TestServer::spawn().await;
    *server.backend.respond_with.lock().unwrap() = Some((
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({"message": "customer is inactive"}),
    ));

    let mut session = InvoiceSession::open(
        server.gateway(),
        RestaurantId::new("rest-unknown").unwrap(),
        customer(),
    )
    .await
    .unwrap();
    session
        .set_items(vec![InvoiceItem::new("Dinner thali", "1", Money::from_major(150))])
        .unwrap();

    let err = session.submit().await.unwrap_err();
    assert_eq!(
        err,
        SessionError::Transport(TransportError::Api {
            status: 422,
            message: "customer is inactive".to_string(),
        })
    );
    assert_eq!(session.draft().state(), DraftState::Editing);
    assert_eq!(session.draft().last_error(), Some("customer is inactive"));

    let invoice_id = session.submit().await.unwrap();
    assert_eq!(invoice_id, Some(inv_42()));
    assert_eq!(server.backend.received.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn unreachable_backend_reports_generic_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::new(&format!("http://{}", addr)).unwrap();
    let gateway = HttpGateway::new(&config).unwrap();

    let err = gateway.payment_methods().await.unwrap_err();
    assert!(matches!(err, TransportError::Network(_)));
    assert_eq!(err.user_message(), GENERIC_NETWORK_ERROR);
}

#[tokio::test]
async fn invalid_session_is_rejected_before_any_request() {
    let server = TestServer::spawn().await;
    let mut session = InvoiceSession::open(
        server.gateway(),
        RestaurantId::new("rest-taxed").unwrap(),
        customer(),
    )
    .await
    .unwrap();

    let err = session.submit().await.unwrap_err();
    assert!(matches!(err, SessionError::Rejected(_)));
    assert_eq!(err.user_message(), "add at least one item before submitting");
    assert!(server.backend.received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn accepted_response_without_id_commits_and_blocks_resubmission() {
    let server = TestServer::spawn().await;
    *server.backend.respond_with.lock().unwrap() = Some((
        StatusCode::CREATED,
        json!({"message": "Invoice created successfully"}),
    ));

    let mut session = InvoiceSession::open(
        server.gateway(),
        RestaurantId::new("rest-taxed").unwrap(),
        customer(),
    )
    .await
    .unwrap();
    session
        .set_items(vec![InvoiceItem::new("Lunch plan", "22", Money::from_major(900))])
        .unwrap();

    let invoice_id = session.submit().await.unwrap();
    assert_eq!(invoice_id, None);
    assert_eq!(session.draft().state(), DraftState::Committed);
    assert_eq!(session.draft().last_error(), None);

    let err = session.submit().await.unwrap_err();
    assert!(matches!(err, SessionError::Rejected(_)));
    assert_eq!(server.backend.received.lock().unwrap().len(), 1);
}
