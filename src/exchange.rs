//! Fixed-rate swap calculator for the demo token and a few majors.

use axum::{extract::Query, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};
use crate::state::AppState;

const RATES: &[(&str, &str, f64)] = &[
    ("SFT", "USDT", 0.12),
    ("USDT", "SFT", 8.33),
    ("SFT", "ETH", 0.00007),
    ("ETH", "SFT", 14285.71),
    ("USDT", "ETH", 0.0006),
    ("ETH", "USDT", 1666.67),
    ("SFT", "BTC", 0.000003),
    ("BTC", "SFT", 330000.0),
    ("USDT", "BTC", 0.000025),
    ("BTC", "USDT", 40000.0),
    ("ETH", "BTC", 0.05),
    ("BTC", "ETH", 20.0),
    ("SFT", "SOL", 0.001),
    ("SOL", "SFT", 1000.0),
    ("USDT", "SOL", 0.0083),
    ("SOL", "USDT", 120.0),
    ("ETH", "SOL", 15.0),
    ("SOL", "ETH", 0.066),
    ("BTC", "SOL", 300.0),
    ("SOL", "BTC", 0.0033),
    ("SFT", "XRP", 0.15),
    ("XRP", "SFT", 6.67),
    ("USDT", "XRP", 1.25),
    ("XRP", "USDT", 0.8),
];

pub fn rate(from: &str, to: &str) -> Option<f64> {
    RATES
        .iter()
        .find(|(f, t, _)| f.eq_ignore_ascii_case(from) && t.eq_ignore_ascii_case(to))
        .map(|(_, _, r)| *r)
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub from: String,
    pub to: String,
    pub amount: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Quote {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub rate: f64,
    pub received: f64,
}

pub fn quote(from: &str, to: &str, amount: f64) -> ServiceResult<Quote> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ServiceError::validation("Please enter a valid amount"));
    }
    let rate = rate(from, to).ok_or(ServiceError::NotFound)?;
    Ok(Quote {
        from: from.to_uppercase(),
        to: to.to_uppercase(),
        amount,
        rate,
        received: amount * rate,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/exchange/quote", get(get_quote))
}

async fn get_quote(Query(q): Query<QuoteRequest>) -> Result<Json<Quote>, ServiceError> {
    Ok(Json(quote(&q.from, &q.to, q.amount)?))
}
