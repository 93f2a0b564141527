//! Order management.

use crate::{
    endpoints::{self, EndpointError},
    models::{OrderRequest, OrderStatus, OrderSummary},
};
use reqwest::{Client, Method};

/// Every order in the store. Requires an admin token.
pub async fn get_all_orders(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
) -> Result<Vec<OrderSummary>, EndpointError> {
    let response =
        endpoints::send(client, base_url, Method::GET, "orders/all", token)
            .await?;

    Ok(response.json().await?)
}

/// The calling account's own orders; the backend works out whose they are
/// from the token.
pub async fn get_my_orders(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
) -> Result<Vec<OrderSummary>, EndpointError> {
    let response =
        endpoints::send(client, base_url, Method::GET, "orders", token)
            .await?;

    Ok(response.json().await?)
}

pub async fn get_order_by_id(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    id: i64,
) -> Result<OrderSummary, EndpointError> {
    let response = endpoints::send(
        client,
        base_url,
        Method::GET,
        &format!("orders/{}", id),
        token,
    )
    .await?;

    Ok(response.json().await?)
}

/// Place an order line.
///
/// Returns the backend's confirmation message.
pub async fn create_order(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    order: &OrderRequest,
) -> Result<String, EndpointError> {
    order.validate()?;

    let response = endpoints::send_json(
        client,
        base_url,
        Method::POST,
        "orders/create",
        token,
        order,
    )
    .await?;

    Ok(response.text().await?)
}

pub async fn delete_order(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    id: i64,
) -> Result<(), EndpointError> {
    endpoints::send(
        client,
        base_url,
        Method::DELETE,
        &format!("orders/{}", id),
        token,
    )
    .await?;

    Ok(())
}

pub async fn orders_by_status(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    status: OrderStatus,
) -> Result<Vec<OrderSummary>, EndpointError> {
    let response = endpoints::send(
        client,
        base_url,
        Method::GET,
        &format!("orders/status/{}", status),
        token,
    )
    .await?;

    Ok(response.json().await?)
}

pub async fn orders_by_account(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    account_id: i64,
) -> Result<Vec<OrderSummary>, EndpointError> {
    let response = endpoints::send(
        client,
        base_url,
        Method::GET,
        &format!("orders/account/{}", account_id),
        token,
    )
    .await?;

    Ok(response.json().await?)
}

/// Move an order to a new status (e.g. after a payment lands).
pub async fn update_order_status(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    id: i64,
    status: OrderStatus,
) -> Result<OrderSummary, EndpointError> {
    let response = endpoints::send(
        client,
        base_url,
        Method::PUT,
        &format!("orders/{}/status/{}", id, status),
        token,
    )
    .await?;

    Ok(response.json().await?)
}
