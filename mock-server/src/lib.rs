use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// Application credentials the server accepts.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub app_id: String,
    pub app_secret: String,
}

impl Credentials {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }

    fn matches(&self, headers: &HeaderMap) -> bool {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        header("x-app-id") == Some(self.app_id.as_str())
            && header("x-app-secret") == Some(self.app_secret.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: u64,
    pub token: String,
    pub client_name: String,
    pub client_email: String,
    pub currency: String,
    pub amount: f64,
    pub status: String,
}

#[derive(Deserialize)]
pub struct CreatePayment {
    pub client_name: String,
    pub client_email: String,
    pub currency: String,
    pub amount: f64,
}

#[derive(Deserialize)]
pub struct QuoteQuery {
    pub currency: String,
    pub amount: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub currency: String,
    pub rate: f64,
    pub amount: f64,
    pub total: f64,
}

/// `{"status": ..., "data": ...}` wrapper used by every JSON endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data: Some(data),
            message: None,
        }
    }

    fn error(message: &str) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            message: Some(message.to_string()),
        }
    }
}

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_CANCELED: &str = "CANCELED";

pub type Db = Arc<RwLock<HashMap<String, Payment>>>;

#[derive(Clone)]
pub struct AppState {
    credentials: Arc<Credentials>,
    db: Db,
}

/// BRL price of one unit of each supported currency.
fn rate_for(currency: &str) -> Option<f64> {
    match currency.to_ascii_uppercase().as_str() {
        "USD" => Some(3.5),
        "EUR" => Some(4.0),
        "GBP" => Some(4.5),
        _ => None,
    }
}

pub fn app(credentials: Credentials) -> Router {
    let state = AppState {
        credentials: Arc::new(credentials),
        db: Arc::new(RwLock::new(HashMap::new())),
    };
    Router::new()
        .route("/service/v1/quote", get(quote))
        .route("/service/v1/checkout/request", post(create_payment))
        .route("/service/v1/checkout/get/{token}", get(get_payment))
        .route("/service/v1/checkout/cancel/{token}", post(cancel_payment))
        .route("/service/v1/checkout/page/{token}", get(payment_page))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_credentials,
        ))
        .with_state(state)
}

pub async fn run(listener: TcpListener, credentials: Credentials) -> Result<(), std::io::Error> {
    axum::serve(listener, app(credentials)).await
}

/// Rejects requests without matching credential headers with an empty 401.
async fn require_credentials(State(state): State<AppState>, request: Request, next: Next) -> Response {
    debug!(method = %request.method(), uri = %request.uri(), "incoming request");
    if !state.credentials.matches(request.headers()) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    next.run(request).await
}

async fn quote(Query(query): Query<QuoteQuery>) -> Result<Json<Quote>, (StatusCode, Json<Envelope<()>>)> {
    let rate = rate_for(&query.currency).ok_or((
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(Envelope::error("unsupported currency")),
    ))?;
    Ok(Json(Quote {
        currency: query.currency.to_ascii_uppercase(),
        rate,
        amount: query.amount,
        total: query.amount * rate,
    }))
}

async fn create_payment(
    State(state): State<AppState>,
    Form(input): Form<CreatePayment>,
) -> (StatusCode, Json<Envelope<Payment>>) {
    let mut payments = state.db.write().await;
    let payment = Payment {
        id: payments.len() as u64 + 1,
        token: Uuid::new_v4().to_string(),
        client_name: input.client_name,
        client_email: input.client_email,
        currency: input.currency.to_ascii_uppercase(),
        amount: input.amount,
        status: STATUS_PENDING.to_string(),
    };
    info!(token = %payment.token, "payment created");
    payments.insert(payment.token.clone(), payment.clone());
    (StatusCode::CREATED, Json(Envelope::success(payment)))
}

async fn get_payment(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<Envelope<Payment>>, StatusCode> {
    let payments = state.db.read().await;
    payments
        .get(&token)
        .cloned()
        .map(|p| Json(Envelope::success(p)))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn cancel_payment(State(state): State<AppState>, Path(token): Path<String>) -> StatusCode {
    let mut payments = state.db.write().await;
    match payments.get_mut(&token) {
        Some(payment) => {
            payment.status = STATUS_CANCELED.to_string();
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn payment_page(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let payments = state.db.read().await;
    let payment = payments.get(&token).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Html(format!(
        "<html><body><h1>Payment {}</h1><p>{} {:.2}</p></body></html>",
        payment.id, payment.currency, payment.amount
    )))
}
