//! The lines inside an order.

use crate::{
    endpoints::{self, EndpointError},
    models::OrderDetail,
};
use reqwest::{Client, Method};

pub async fn order_details_by_order(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    order_id: i64,
) -> Result<Vec<OrderDetail>, EndpointError> {
    let response = endpoints::send(
        client,
        base_url,
        Method::GET,
        &format!("order-details/order/{}", order_id),
        token,
    )
    .await?;

    Ok(response.json().await?)
}

pub async fn order_details_by_orchid(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    orchid_id: i64,
) -> Result<Vec<OrderDetail>, EndpointError> {
    let response = endpoints::send(
        client,
        base_url,
        Method::GET,
        &format!("order-details/orchid/{}", orchid_id),
        token,
    )
    .await?;

    Ok(response.json().await?)
}

/// How many units of an orchid have ever been ordered.
pub async fn total_quantity_by_orchid(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    orchid_id: i64,
) -> Result<i64, EndpointError> {
    let response = endpoints::send(
        client,
        base_url,
        Method::GET,
        &format!("order-details/total-quantity/orchid/{}", orchid_id),
        token,
    )
    .await?;

    Ok(response.json().await?)
}

pub async fn total_amount_by_order(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    order_id: i64,
) -> Result<f64, EndpointError> {
    let response = endpoints::send(
        client,
        base_url,
        Method::GET,
        &format!("order-details/total-amount/order/{}", order_id),
        token,
    )
    .await?;

    Ok(response.json().await?)
}
