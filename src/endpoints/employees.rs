//! The staff roster.
//!
//! Employees live on their own little service with its own base URL, no
//! `/api` prefix and no bearer auth. It also falls over a lot, which is
//! why listings can degrade to a built-in roster.

use crate::{
    endpoints::{self, EndpointError},
    models::{self, Employee},
};
use reqwest::{Client, Method, RequestBuilder};

/// A roster listing, flagged when it came from the built-in fallback
/// instead of the live service.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Roster {
    pub employees: Vec<Employee>,
    pub from_fallback: bool,
}

pub async fn get_all_employees(
    client: &Client,
    employees_url: &str,
) -> Result<Vec<Employee>, EndpointError> {
    let response =
        endpoints::dispatch(request(client, employees_url, Method::GET, ""))
            .await?;

    let mut employees: Vec<Employee> = response.json().await?;
    // newest staff first, same as the store's own listing
    employees.sort_by(|a, b| b.emp_id.cmp(&a.emp_id));

    Ok(employees)
}

/// Like [`get_all_employees`], but a dead service degrades to the
/// built-in roster rather than an error.
pub async fn get_employees_or_fallback(
    client: &Client,
    employees_url: &str,
) -> Roster {
    match get_all_employees(client, employees_url).await {
        Ok(employees) => Roster {
            employees,
            from_fallback: false,
        },
        Err(e) => {
            log::warn!(
                "The employees service is unreachable ({}), using the \
                 fallback roster",
                e
            );
            Roster {
                employees: models::fallback_employees(),
                from_fallback: true,
            }
        },
    }
}

pub async fn create_employee(
    client: &Client,
    employees_url: &str,
    employee: &Employee,
) -> Result<Employee, EndpointError> {
    log::trace!("Payload: {:#?}", employee);
    let response = endpoints::dispatch(
        request(client, employees_url, Method::POST, "").json(employee),
    )
    .await?;

    Ok(response.json().await?)
}

pub async fn update_employee(
    client: &Client,
    employees_url: &str,
    employee: &Employee,
) -> Result<Employee, EndpointError> {
    log::trace!("Payload: {:#?}", employee);
    let response = endpoints::dispatch(
        request(
            client,
            employees_url,
            Method::PUT,
            &employee.id.to_string(),
        )
        .json(employee),
    )
    .await?;

    Ok(response.json().await?)
}

pub async fn delete_employee(
    client: &Client,
    employees_url: &str,
    id: i64,
) -> Result<(), EndpointError> {
    endpoints::dispatch(request(
        client,
        employees_url,
        Method::DELETE,
        &id.to_string(),
    ))
    .await?;

    Ok(())
}

fn request(
    client: &Client,
    employees_url: &str,
    method: Method,
    path: &str,
) -> RequestBuilder {
    let base = employees_url.trim_end_matches('/');
    let url = if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    };

    log::debug!("Sending a {} request to {}", method, url);

    client.request(method, &url)
}
