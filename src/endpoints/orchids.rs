//! The orchid catalogue.

use crate::{
    endpoints::{self, EndpointError},
    models::{Orchid, OrchidRequest},
};
use reqwest::{Client, Method};

/// Fetch the whole catalogue.
pub async fn get_all_orchids(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
) -> Result<Vec<Orchid>, EndpointError> {
    let response =
        endpoints::send(client, base_url, Method::GET, "orchids/", token)
            .await?;

    Ok(response.json().await?)
}

pub async fn get_orchid_by_id(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    id: i64,
) -> Result<Orchid, EndpointError> {
    let response = endpoints::send(
        client,
        base_url,
        Method::GET,
        &format!("orchids/{}", id),
        token,
    )
    .await?;

    Ok(response.json().await?)
}

pub async fn get_orchid_by_name(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    name: &str,
) -> Result<Orchid, EndpointError> {
    let response = endpoints::send(
        client,
        base_url,
        Method::GET,
        &format!("orchids/name/{}", name),
        token,
    )
    .await?;

    Ok(response.json().await?)
}

/// Add an orchid to the catalogue. Requires an admin token.
///
/// The payload is validated locally first, so obviously-bad requests never
/// hit the wire.
pub async fn create_orchid(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    orchid: &OrchidRequest,
) -> Result<(), EndpointError> {
    orchid.validate()?;

    endpoints::send_json(
        client,
        base_url,
        Method::POST,
        "orchids/create",
        token,
        orchid,
    )
    .await?;

    Ok(())
}

pub async fn update_orchid(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    id: i64,
    orchid: &OrchidRequest,
) -> Result<Orchid, EndpointError> {
    orchid.validate()?;

    let response = endpoints::send_json(
        client,
        base_url,
        Method::PUT,
        &format!("orchids/update/{}", id),
        token,
        orchid,
    )
    .await?;

    Ok(response.json().await?)
}

pub async fn delete_orchid(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    id: i64,
) -> Result<(), EndpointError> {
    endpoints::send(
        client,
        base_url,
        Method::DELETE,
        &format!("orchids/delete/{}", id),
        token,
    )
    .await?;

    Ok(())
}

pub async fn orchids_by_category(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    category_id: i64,
) -> Result<Vec<Orchid>, EndpointError> {
    let response = endpoints::send(
        client,
        base_url,
        Method::GET,
        &format!("orchids/category/{}", category_id),
        token,
    )
    .await?;

    Ok(response.json().await?)
}

/// Natural orchids (`true`) or industrially-bred ones (`false`).
pub async fn orchids_by_nature(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    is_natural: bool,
) -> Result<Vec<Orchid>, EndpointError> {
    let response = endpoints::send(
        client,
        base_url,
        Method::GET,
        &format!("orchids/natural/{}", is_natural),
        token,
    )
    .await?;

    Ok(response.json().await?)
}

pub async fn orchids_by_price_range(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    min_price: f64,
    max_price: f64,
) -> Result<Vec<Orchid>, EndpointError> {
    let request = endpoints::request(
        client,
        base_url,
        Method::GET,
        "orchids/price-range",
        token,
    )
    .query(&[("minPrice", min_price), ("maxPrice", max_price)]);

    let response = endpoints::dispatch(request).await?;

    Ok(response.json().await?)
}

pub async fn search_orchids_by_name(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    name: &str,
) -> Result<Vec<Orchid>, EndpointError> {
    let request = endpoints::request(
        client,
        base_url,
        Method::GET,
        "orchids/search/name",
        token,
    )
    .query(&[("name", name)]);

    let response = endpoints::dispatch(request).await?;

    Ok(response.json().await?)
}

pub async fn search_orchids_by_description(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    description: &str,
) -> Result<Vec<Orchid>, EndpointError> {
    let request = endpoints::request(
        client,
        base_url,
        Method::GET,
        "orchids/search/description",
        token,
    )
    .query(&[("description", description)]);

    let response = endpoints::dispatch(request).await?;

    Ok(response.json().await?)
}

/// The catalogue ordered by price, cheapest first when `ascending`.
pub async fn orchids_sorted_by_price(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    ascending: bool,
) -> Result<Vec<Orchid>, EndpointError> {
    let path = if ascending {
        "orchids/sorted/price-asc"
    } else {
        "orchids/sorted/price-desc"
    };
    let response =
        endpoints::send(client, base_url, Method::GET, path, token).await?;

    Ok(response.json().await?)
}

pub async fn orchid_exists(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    name: &str,
) -> Result<bool, EndpointError> {
    let response = endpoints::send(
        client,
        base_url,
        Method::GET,
        &format!("orchids/exists/{}", name),
        token,
    )
    .await?;

    Ok(response.json().await?)
}
