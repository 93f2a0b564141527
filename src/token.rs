//! Bearer token inspection.
//!
//! The backend issues JWTs, three dot-separated base64url segments. Only the
//! payload segment is consumed here; the signature is never checked
//! client-side, because the backend re-validates the token on every request
//! anyway. A forged payload buys nothing beyond a confused local view.

use serde::de::{Deserialize as _, Deserializer};
use serde_derive::{Deserialize, Serialize};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

/// What a user is allowed to do, as claimed by their token.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Role, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "USER"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

/// The `role` claim held something other than `USER` or `ADMIN`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

/// The claims this client consumes from a token's payload.
///
/// Every claim is optional; the backend decides what it puts in a token, and
/// anything we don't recognise is ignored.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TokenPayload {
    /// The standard subject claim, set to the account name.
    #[serde(default)]
    pub sub: Option<String>,
    /// `USER` or `ADMIN`. Anything else is treated as no role at all.
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Option<Role>,
    /// Expiry, in seconds since the Unix epoch.
    #[serde(default)]
    pub exp: Option<u64>,
    #[serde(default, rename = "accountId")]
    pub account_id: Option<i64>,
}

impl TokenPayload {
    /// Is this payload expired at the provided Unix timestamp?
    ///
    /// A payload without an `exp` claim is treated as already expired.
    pub fn is_expired_at(&self, now: u64) -> bool {
        match self.exp {
            Some(exp) => exp < now,
            None => true,
        }
    }
}

/// A role claim we can't make sense of shouldn't poison the rest of the
/// payload, so unknown strings decode to `None`.
fn lenient_role<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(|r| r.parse().ok()))
}

/// Decode a token's payload segment.
pub fn decode_payload(token: &str) -> Result<TokenPayload, TokenError> {
    let mut segments = token.split('.');

    let payload = match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(TokenError::MalformedToken),
    };

    // base64url without padding is common; normalise before decoding
    let mut padded = payload.to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }

    let decoded = base64::decode_config(&padded, base64::URL_SAFE)?;
    let payload = serde_json::from_slice(&decoded)?;

    Ok(payload)
}

/// The role baked into a token, if it has one we understand.
///
/// Never fails; a malformed token just has no role.
pub fn role_from_token(token: &str) -> Option<Role> {
    decode_payload(token).ok()?.role
}

/// The `sub` claim, which the backend sets to the account name.
pub fn username_from_token(token: &str) -> Option<String> {
    decode_payload(token).ok()?.sub
}

pub fn has_role(token: &str, required: Role) -> bool {
    role_from_token(token) == Some(required)
}

pub fn is_user(token: &str) -> bool { has_role(token, Role::User) }

pub fn is_admin(token: &str) -> bool { has_role(token, Role::Admin) }

/// Is the token past its `exp` claim?
///
/// A token that can't be decoded, or that carries no `exp` claim, counts as
/// expired.
pub fn is_token_expired(token: &str) -> bool {
    match decode_payload(token) {
        Ok(payload) => payload.is_expired_at(unix_now()),
        Err(_) => true,
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

/// Possible errors when decoding a token payload.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// A bearer token has exactly 3 dot-separated segments.
    #[error("The token isn't made of 3 dot-separated segments")]
    MalformedToken,
    #[error("Unable to decode the payload segment")]
    Base64(
        #[source]
        #[from]
        base64::DecodeError,
    ),
    #[error("Unable to parse the payload as JSON")]
    Json(
        #[source]
        #[from]
        serde_json::Error,
    ),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_payload(payload: &str) -> String {
        let header = base64::encode_config(
            r#"{"alg":"HS256","typ":"JWT"}"#,
            base64::URL_SAFE_NO_PAD,
        );
        let payload =
            base64::encode_config(payload, base64::URL_SAFE_NO_PAD);
        format!("{}.{}.sig", header, payload)
    }

    #[test]
    fn extract_role_and_subject() {
        let token = token_with_payload(
            r#"{"role":"ADMIN","sub":"alice","exp":9999999999}"#,
        );

        let got = decode_payload(&token).unwrap();

        assert_eq!(got.role, Some(Role::Admin));
        assert_eq!(got.sub.as_deref(), Some("alice"));
        assert_eq!(got.exp, Some(9999999999));
        assert_eq!(role_from_token(&token), Some(Role::Admin));
        assert_eq!(username_from_token(&token).as_deref(), Some("alice"));
        assert!(is_admin(&token));
        assert!(!is_user(&token));
    }

    #[test]
    fn two_segments_is_not_a_token() {
        let token = "aGVhZGVy.cGF5bG9hZA";

        assert!(matches!(
            decode_payload(token),
            Err(TokenError::MalformedToken)
        ));
        assert_eq!(role_from_token(token), None);
        assert_eq!(username_from_token(token), None);
    }

    #[test]
    fn garbage_payload_degrades_to_no_claims() {
        let token = token_with_payload("definitely not json");

        assert!(decode_payload(&token).is_err());
        assert_eq!(role_from_token(&token), None);
        assert_eq!(username_from_token(&token), None);
        assert!(is_token_expired(&token));
    }

    #[test]
    fn unknown_role_does_not_poison_other_claims() {
        let token =
            token_with_payload(r#"{"role":"MANAGER","sub":"bob"}"#);

        let got = decode_payload(&token).unwrap();

        assert_eq!(got.role, None);
        assert_eq!(got.sub.as_deref(), Some("bob"));
    }

    #[test]
    fn unpadded_payload_segment_still_decodes() {
        // {"sub":"a"} is 11 bytes, so its base64url form needs padding
        let encoded =
            base64::encode_config(r#"{"sub":"a"}"#, base64::URL_SAFE_NO_PAD);
        assert_ne!(encoded.len() % 4, 0);
        let token = format!("h.{}.s", encoded);

        let got = decode_payload(&token).unwrap();

        assert_eq!(got.sub.as_deref(), Some("a"));
    }

    #[test]
    fn expiry_in_1970_is_expired() {
        let token = token_with_payload(r#"{"exp":1}"#);

        assert!(is_token_expired(&token));
    }

    #[test]
    fn far_future_expiry_is_not_expired() {
        let token = token_with_payload(r#"{"exp":9999999999}"#);

        assert!(!is_token_expired(&token));
    }

    #[test]
    fn missing_expiry_counts_as_expired() {
        let token = token_with_payload(r#"{"role":"USER"}"#);

        assert!(is_token_expired(&token));
        assert!(TokenPayload::default().is_expired_at(0));
    }

    #[test]
    fn roles_round_trip_through_strings() {
        assert_eq!("USER".parse(), Ok(Role::User));
        assert_eq!("ADMIN".parse(), Ok(Role::Admin));
        assert_eq!(Role::Admin.to_string(), "ADMIN");
        assert!("admin".parse::<Role>().is_err());
    }
}
