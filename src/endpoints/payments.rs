//! The payment gateway boundary.

use crate::{
    endpoints::{self, EndpointError},
    payment::PaymentPayload,
};
use reqwest::{Client, Method};
use serde_derive::Deserialize;

/// Ask the backend for a gateway checkout URL for an order.
///
/// Quirk of the backend: the body is the bare order id, not an object.
pub async fn create_payment_url(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    order_id: i64,
) -> Result<String, EndpointError> {
    let response = endpoints::send_json(
        client,
        base_url,
        Method::POST,
        "payments/create-payment-url",
        token,
        &order_id,
    )
    .await?;

    let body: UrlBody = response.json().await?;
    log::debug!("Checkout URL for order {}: {}", order_id, body.url);

    Ok(body.url)
}

/// Forward a gateway callback to the backend so it can settle the order.
///
/// Returns the backend's outcome message, which it sends as plain text.
pub async fn handle_payment(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    payload: &PaymentPayload,
) -> Result<String, EndpointError> {
    let response = endpoints::send_json(
        client,
        base_url,
        Method::POST,
        "payments/handle-payment",
        token,
        payload,
    )
    .await?;

    Ok(response.text().await?)
}

#[derive(Debug, Deserialize)]
struct UrlBody {
    url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_a_checkout_url_body() {
        let got: UrlBody = serde_json::from_str(
            r#"{"url": "https://pay.example/checkout/abc"}"#,
        )
        .unwrap();

        assert_eq!(got.url, "https://pay.example/checkout/abc");
    }
}
