use crate::endpoints::{self, EndpointError};
use reqwest::{Client, Method};
use serde_derive::{Deserialize, Serialize};

/// Authenticate with the backend and get a bearer token.
///
/// The contract is that a successful login always carries a `token`; the
/// extra fields are along for the ride.
pub async fn login(
    client: &Client,
    base_url: &str,
    account_name: &str,
    password: &str,
) -> Result<LoginResponse, LoginError> {
    let data = Data {
        account_name,
        password: Masked(password),
    };
    let response = endpoints::send_json(
        client,
        base_url,
        Method::POST,
        "auth/login",
        None,
        &data,
    )
    .await?;

    let body: LoginResponse =
        response.json().await.map_err(LoginError::ResponseParse)?;
    log::trace!("Parsed response: {:#?}", body);

    if body.token.is_empty() {
        return Err(LoginError::MissingToken);
    }

    log::info!("Logged in as {}", account_name);

    Ok(body)
}

/// What the backend sends back on a successful login.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[non_exhaustive]
pub struct LoginResponse {
    /// The bearer token, a JWT.
    pub token: String,
    #[serde(default)]
    pub message: Option<String>,
    /// Seconds until the token expires.
    #[serde(default, rename = "expiresIn")]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Serialize)]
struct Data<'a> {
    #[serde(rename = "accountName")]
    account_name: &'a str,
    password: Masked<'a>,
}

/// Serialises as the wrapped string but debug-prints as `***`, so trace
/// logging can't leak a password.
#[derive(Serialize)]
#[serde(transparent)]
struct Masked<'a>(&'a str);

impl std::fmt::Debug for Masked<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "***")
    }
}

/// Possible errors that may be returned by [`login()`].
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// The HTTP client encountered an error.
    #[error("Unable to send the login request")]
    HttpClient(#[source] reqwest::Error),
    /// The server rejected the credentials; the message is whatever it put
    /// in the body.
    #[error("Login was rejected by the server: {0}")]
    Rejected(String),
    /// A 2xx answer with no token in it, which the contract says can't
    /// happen.
    #[error("The login response didn't contain a token")]
    MissingToken,
    /// Unable to parse the login response.
    #[error("Unable to parse the login response")]
    ResponseParse(#[source] reqwest::Error),
}

impl From<EndpointError> for LoginError {
    fn from(err: EndpointError) -> LoginError {
        match err {
            EndpointError::HttpClient(inner) => {
                LoginError::HttpClient(inner)
            },
            // a 401 on the login endpoint itself just means bad credentials
            EndpointError::SessionExpired => {
                LoginError::Rejected(String::from("Invalid credentials"))
            },
            EndpointError::AccessDenied(message)
            | EndpointError::RejectedByServer { message, .. } => {
                LoginError::Rejected(message)
            },
            EndpointError::InvalidRequest(inner) => {
                LoginError::Rejected(inner.to_string())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_a_happy_login_response() {
        let src = r#"{
            "token": "aaa.bbb.ccc",
            "message": "Login successful",
            "expiresIn": 36000
        }"#;
        let should_be = LoginResponse {
            token: String::from("aaa.bbb.ccc"),
            message: Some(String::from("Login successful")),
            expires_in: Some(36000),
        };

        let got: LoginResponse = serde_json::from_str(src).unwrap();

        assert_eq!(got, should_be);
    }

    #[test]
    fn a_bare_token_is_enough() {
        let got: LoginResponse =
            serde_json::from_str(r#"{"token": "aaa.bbb.ccc"}"#).unwrap();

        assert_eq!(got.token, "aaa.bbb.ccc");
        assert_eq!(got.message, None);
        assert_eq!(got.expires_in, None);
    }

    #[test]
    fn rejections_surface_the_backend_message() {
        let err = EndpointError::RejectedByServer {
            status: reqwest::StatusCode::BAD_REQUEST,
            message: String::from("Invalid credentials"),
        };

        match LoginError::from(err) {
            LoginError::Rejected(message) => {
                assert_eq!(message, "Invalid credentials")
            },
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn passwords_never_show_up_in_debug_output() {
        let data = Data {
            account_name: "alice",
            password: Masked("hunter2"),
        };

        let rendered = format!("{:#?}", data);

        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("***"));
    }
}
