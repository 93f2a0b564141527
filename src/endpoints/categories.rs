//! Orchid categories.

use crate::{
    endpoints::{self, EndpointError},
    models::Category,
};
use reqwest::{header, Client, Method, StatusCode};
use serde_derive::Serialize;

/// Fetch every category.
///
/// A 404 here means "no categories yet", not a failure, so it comes back
/// as an empty list.
pub async fn get_all_categories(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
) -> Result<Vec<Category>, EndpointError> {
    let result =
        endpoints::send(client, base_url, Method::GET, "categories", token)
            .await;

    match result {
        Ok(response) => Ok(response.json().await?),
        Err(EndpointError::RejectedByServer { status, .. })
            if status == StatusCode::NOT_FOUND =>
        {
            Ok(Vec::new())
        },
        Err(e) => Err(e),
    }
}

pub async fn get_category_by_id(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    id: i64,
) -> Result<Category, EndpointError> {
    let response = endpoints::send(
        client,
        base_url,
        Method::GET,
        &format!("categories/{}", id),
        token,
    )
    .await?;

    Ok(response.json().await?)
}

pub async fn get_category_by_name(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    name: &str,
) -> Result<Category, EndpointError> {
    let response = endpoints::send(
        client,
        base_url,
        Method::GET,
        &format!("categories/name/{}", name),
        token,
    )
    .await?;

    Ok(response.json().await?)
}

/// Create a category. Requires an admin token.
///
/// Quirk of the backend: this endpoint takes the bare category name as a
/// plain-text body, not a JSON document.
pub async fn create_category(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    name: &str,
) -> Result<Category, EndpointError> {
    let request = endpoints::request(
        client,
        base_url,
        Method::POST,
        "categories/create",
        token,
    )
    .header(header::CONTENT_TYPE, "text/plain")
    .body(name.to_string());

    let response = endpoints::dispatch(request).await?;

    Ok(response.json().await?)
}

pub async fn update_category(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    id: i64,
    name: &str,
) -> Result<Category, EndpointError> {
    let data = Data {
        category_name: name,
    };
    let response = endpoints::send_json(
        client,
        base_url,
        Method::PUT,
        &format!("categories/{}", id),
        token,
        &data,
    )
    .await?;

    Ok(response.json().await?)
}

pub async fn delete_category(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    id: i64,
) -> Result<(), EndpointError> {
    endpoints::send(
        client,
        base_url,
        Method::DELETE,
        &format!("categories/{}", id),
        token,
    )
    .await?;

    Ok(())
}

pub async fn search_categories(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    name: &str,
) -> Result<Vec<Category>, EndpointError> {
    let request = endpoints::request(
        client,
        base_url,
        Method::GET,
        "categories/search",
        token,
    )
    .query(&[("name", name)]);

    let response = endpoints::dispatch(request).await?;

    Ok(response.json().await?)
}

pub async fn category_exists(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    name: &str,
) -> Result<bool, EndpointError> {
    let response = endpoints::send(
        client,
        base_url,
        Method::GET,
        &format!("categories/exists/{}", name),
        token,
    )
    .await?;

    Ok(response.json().await?)
}

#[derive(Debug, Serialize)]
struct Data<'a> {
    #[serde(rename = "categoryName")]
    category_name: &'a str,
}
