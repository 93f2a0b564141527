//! The Orchid Store API's endpoints.

mod categories;
mod employees;
mod login;
mod orchids;
mod order_details;
mod orders;
mod payments;
mod register;

pub use categories::{
    category_exists, create_category, delete_category, get_all_categories,
    get_category_by_id, get_category_by_name, search_categories,
    update_category,
};
pub use employees::{
    create_employee, delete_employee, get_all_employees,
    get_employees_or_fallback, update_employee, Roster,
};
pub use login::{login, LoginError, LoginResponse};
pub use orchids::{
    create_orchid, delete_orchid, get_all_orchids, get_orchid_by_id,
    get_orchid_by_name, orchid_exists, orchids_by_category,
    orchids_by_nature, orchids_by_price_range, orchids_sorted_by_price,
    search_orchids_by_description, search_orchids_by_name, update_orchid,
};
pub use order_details::{
    order_details_by_orchid, order_details_by_order,
    total_amount_by_order, total_quantity_by_orchid,
};
pub use orders::{
    create_order, delete_order, get_all_orders, get_my_orders,
    get_order_by_id, orders_by_account, orders_by_status,
    update_order_status,
};
pub use payments::{create_payment_url, handle_payment};
pub use register::register;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_derive::Deserialize;
use std::fmt::Debug;

/// Typical endpoint errors.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// The HTTP client encountered an error.
    #[error("Unable to send the request")]
    HttpClient(
        #[source]
        #[from]
        reqwest::Error,
    ),
    /// The server answered 401: the stored token is no longer any good.
    /// Callers clear it and ask the user to log in again.
    #[error("The session has expired, please log in again")]
    SessionExpired,
    /// The server answered 403.
    #[error("Access denied: {0}")]
    AccessDenied(String),
    /// Any other non-2xx answer, with whatever message the body carried.
    #[error("Rejected by the server because {}", message)]
    RejectedByServer {
        status: StatusCode,
        message: String,
    },
    /// The request never left the machine; the backend would have rejected
    /// it anyway.
    #[error("Invalid request")]
    InvalidRequest(
        #[source]
        #[from]
        crate::models::InvalidRequest,
    ),
}

/// Build a request against `{base_url}/api/{path}`, attaching the bearer
/// token when one is supplied.
fn request(
    client: &Client,
    base_url: &str,
    method: Method,
    path: &str,
    token: Option<&str>,
) -> RequestBuilder {
    let url =
        format!("{}/api/{}", base_url.trim_end_matches('/'), path);

    log::debug!("Sending a {} request to {}", method, url);

    let mut request = client.request(method, &url);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    request
}

/// Fire a request and translate a non-2xx answer into an [`EndpointError`],
/// pulling the human-readable message out of the body.
async fn dispatch(
    request: RequestBuilder,
) -> Result<Response, EndpointError> {
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() {
        log::trace!("Headers: {:#?}", response.headers());
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    log::trace!("Error body: {}", body);
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("the request failed")
            .to_string()
    });

    if status == StatusCode::UNAUTHORIZED {
        Err(EndpointError::SessionExpired)
    } else if status == StatusCode::FORBIDDEN {
        Err(EndpointError::AccessDenied(message))
    } else {
        Err(EndpointError::RejectedByServer { status, message })
    }
}

async fn send(
    client: &Client,
    base_url: &str,
    method: Method,
    path: &str,
    token: Option<&str>,
) -> Result<Response, EndpointError> {
    dispatch(request(client, base_url, method, path, token)).await
}

async fn send_json<D>(
    client: &Client,
    base_url: &str,
    method: Method,
    path: &str,
    token: Option<&str>,
    data: &D,
) -> Result<Response, EndpointError>
where
    D: Debug + Serialize,
{
    log::trace!("Payload: {:#?}", data);

    dispatch(request(client, base_url, method, path, token).json(data))
        .await
}

/// The backend writes error bodies as either `{"message": ...}` or
/// `{"error": ...}`, depending on which controller you upset.
fn error_message(body: &str) -> Option<String> {
    #[derive(Debug, Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
    }

    let body: ErrorBody = serde_json::from_str(body).ok()?;
    body.message.or(body.error)
}
