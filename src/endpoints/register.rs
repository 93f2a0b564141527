use crate::endpoints::{self, EndpointError};
use reqwest::{Client, Method};
use serde_derive::{Deserialize, Serialize};

/// Create a new account.
///
/// Returns the backend's confirmation message. Registering does not log
/// you in; follow up with [`login`](super::login) once this succeeds.
pub async fn register(
    client: &Client,
    base_url: &str,
    account_name: &str,
    email: &str,
    password: &str,
) -> Result<String, EndpointError> {
    let data = Data {
        account_name,
        email,
        password,
    };
    let response = endpoints::send_json(
        client,
        base_url,
        Method::POST,
        "auth/register",
        None,
        &data,
    )
    .await?;

    let body: MessageBody = response.json().await?;

    Ok(body
        .message
        .unwrap_or_else(|| String::from("Account created successfully")))
}

#[derive(Debug, Serialize)]
struct Data<'a> {
    #[serde(rename = "accountName")]
    account_name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_request_body_uses_the_backend_spelling() {
        let data = Data {
            account_name: "carol",
            email: "carol@example.com",
            password: "s3cret",
        };

        let got = serde_json::to_value(&data).unwrap();

        assert_eq!(
            got,
            serde_json::json!({
                "accountName": "carol",
                "email": "carol@example.com",
                "password": "s3cret"
            })
        );
    }
}
