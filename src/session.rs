//! The client-side session.
//!
//! One object owns the answer to "who is logged in and what can they do".
//! The view is derived from persisted storage on demand and replaced
//! wholesale on login/logout; the role always comes from the token payload,
//! never from a stale cached user record.

use crate::{
    endpoints::{self, LoginError, LoginResponse},
    storage::{
        Storage, StorageError, StorageEvent, AUTH_TOKEN_KEY,
        CURRENT_USER_KEY,
    },
    token::{self, Role},
};
use reqwest::Client;
use serde_derive::{Deserialize, Serialize};

/// The derived, in-memory view of the authentication state.
#[derive(Debug, Clone, PartialEq, Default)]
#[non_exhaustive]
pub struct Session {
    pub is_authenticated: bool,
    pub user: Option<UserInfo>,
    pub role: Option<Role>,
}

/// The persisted user record.
///
/// Backend-defined and free-form; fields we don't know about survive a
/// round trip through the `extra` map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default, rename = "accountName")]
    pub account_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, rename = "userName")]
    pub user_name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// What a caller needs to log someone in.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub account_name: String,
    pub password: String,
}

/// What [`SessionManager::login`] hands back, so the caller can make an
/// immediate navigation decision without re-reading storage.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct LoginOutcome {
    pub role: Option<Role>,
    /// The raw backend response, message and all.
    pub response: LoginResponse,
}

/// The single source of truth for session state, shared by handing out
/// [`Session`] snapshots.
#[derive(Debug)]
pub struct SessionManager<S> {
    storage: S,
    session: Session,
}

impl<S: Storage> SessionManager<S> {
    /// Construct the initial session from whatever storage holds.
    ///
    /// Never fails loudly: unreadable storage or an undecodable token
    /// degrade to an unauthenticated view.
    pub fn initialize(storage: S) -> SessionManager<S> {
        let mut manager = SessionManager {
            storage,
            session: Session::default(),
        };
        manager.derive(true);
        manager
    }

    /// The current view. Cheap to call; re-derived only on the explicit
    /// lifecycle operations.
    pub fn session(&self) -> &Session { &self.session }

    pub fn is_authenticated(&self) -> bool { self.session.is_authenticated }

    pub fn role(&self) -> Option<Role> { self.session.role }

    pub fn is_admin(&self) -> bool { self.session.role == Some(Role::Admin) }

    pub fn is_user(&self) -> bool { self.session.role == Some(Role::User) }

    /// The raw bearer token, straight from storage.
    pub fn token(&self) -> Option<String> {
        self.read_key(AUTH_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Is there a token, and is it still inside its expiry window?
    pub fn has_valid_token(&self) -> bool {
        match self.token() {
            Some(token) => !token::is_token_expired(&token),
            None => false,
        }
    }

    /// Authenticate against the backend and persist the result.
    ///
    /// On success the token and a merged user record land in storage and
    /// the session flips to authenticated. On rejection the session resets
    /// to unauthenticated and the backend's message comes back in the
    /// error. No retries.
    pub async fn login(
        &mut self,
        client: &Client,
        base_url: &str,
        credentials: &Credentials,
    ) -> Result<LoginOutcome, SessionError> {
        let response = match endpoints::login(
            client,
            base_url,
            &credentials.account_name,
            &credentials.password,
        )
        .await
        {
            Ok(response) => response,
            Err(e) => {
                self.session = Session::default();
                return Err(e.into());
            },
        };

        let outcome = self.apply_login(&credentials.account_name, response)?;

        log::info!("Logged in as {}", credentials.account_name);

        Ok(outcome)
    }

    /// Persist a successful login response and flip the session over.
    fn apply_login(
        &mut self,
        account_name: &str,
        response: LoginResponse,
    ) -> Result<LoginOutcome, SessionError> {
        self.storage.set(AUTH_TOKEN_KEY, &response.token)?;

        let role = token::role_from_token(&response.token);
        let user_name = token::username_from_token(&response.token);
        let user = UserInfo {
            account_name: Some(account_name.to_string()),
            role: role.map(|r| r.to_string()),
            user_name,
            ..UserInfo::default()
        };
        self.storage
            .set(CURRENT_USER_KEY, &serde_json::to_string(&user)?)?;

        self.session = Session {
            is_authenticated: true,
            user: Some(user),
            role,
        };

        Ok(LoginOutcome { role, response })
    }

    /// Drop the persisted token and user record and reset the view.
    ///
    /// Purely local: the token is stateless and there is no revocation
    /// endpoint to call.
    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.storage.remove(AUTH_TOKEN_KEY)?;
        self.storage.remove(CURRENT_USER_KEY)?;
        self.session = Session::default();

        log::info!("Logged out");

        Ok(())
    }

    /// Re-run the derivation, picking up whatever is in storage now.
    pub fn update_auth_state(&mut self) { self.derive(false); }

    /// React to another actor mutating shared storage (e.g. a second
    /// process logging out). Events for unrelated keys are ignored.
    pub fn handle_storage_event(&mut self, event: &StorageEvent) {
        if event.key == AUTH_TOKEN_KEY || event.key == CURRENT_USER_KEY {
            log::debug!(
                "Re-deriving the session after a change to {}",
                event.key
            );
            self.derive(true);
        }
    }

    fn derive(&mut self, persist_merge: bool) {
        let token = self.read_key(AUTH_TOKEN_KEY);
        let stored_user: Option<UserInfo> =
            self.read_key(CURRENT_USER_KEY).and_then(|raw| {
                match serde_json::from_str(&raw) {
                    Ok(user) => Some(user),
                    Err(e) => {
                        log::warn!(
                            "Discarding an unreadable user record: {}",
                            e
                        );
                        None
                    },
                }
            });

        let token = match token {
            Some(token) if !token.is_empty() => token,
            _ => {
                self.session = Session::default();
                return;
            },
        };

        let role = token::role_from_token(&token);
        let user_name = token::username_from_token(&token);

        let mut user = stored_user.clone().unwrap_or_default();
        let mut merged = false;
        if user.role.is_none() {
            if let Some(role) = role {
                user.role = Some(role.to_string());
                merged = true;
            }
        }
        if user.user_name.is_none() {
            if let Some(name) = user_name {
                user.user_name = Some(name);
                merged = true;
            }
        }

        if merged && persist_merge && stored_user.is_some() {
            match serde_json::to_string(&user) {
                Ok(raw) => {
                    if let Err(e) =
                        self.storage.set(CURRENT_USER_KEY, &raw)
                    {
                        log::warn!(
                            "Unable to write back the merged user record: {}",
                            e
                        );
                    }
                },
                Err(e) => {
                    log::warn!("Unable to serialise the user record: {}", e)
                },
            }
        }

        self.session = Session {
            is_authenticated: true,
            user: Some(user),
            role,
        };
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Unable to read the \"{}\" key: {}", key, e);
                None
            },
        }
    }
}

/// Possible errors from the session lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Unable to log in")]
    Login(
        #[source]
        #[from]
        LoginError,
    ),
    #[error("Unable to persist the session")]
    Storage(
        #[source]
        #[from]
        StorageError,
    ),
    #[error("Unable to serialise the user record")]
    Serialize(
        #[source]
        #[from]
        serde_json::Error,
    ),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

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
    fn fresh_storage_means_unauthenticated() {
        let manager = SessionManager::initialize(MemoryStore::new());

        assert_eq!(*manager.session(), Session::default());
        assert!(!manager.is_authenticated());
        assert!(!manager.has_valid_token());
    }

    #[test]
    fn initialize_derives_role_and_merges_the_user_record() {
        let store = MemoryStore::new();
        let token = token_with_payload(
            r#"{"role":"ADMIN","sub":"alice","exp":9999999999}"#,
        );
        store.set(AUTH_TOKEN_KEY, &token).unwrap();
        store
            .set(CURRENT_USER_KEY, r#"{"accountName":"alice"}"#)
            .unwrap();

        let manager = SessionManager::initialize(store);

        assert!(manager.is_authenticated());
        assert!(manager.is_admin());
        let user = manager.session().user.clone().unwrap();
        assert_eq!(user.account_name.as_deref(), Some("alice"));
        assert_eq!(user.role.as_deref(), Some("ADMIN"));
        assert_eq!(user.user_name.as_deref(), Some("alice"));

        // the merged record went back to storage
        let persisted =
            manager.storage.get(CURRENT_USER_KEY).unwrap().unwrap();
        let round_tripped: UserInfo =
            serde_json::from_str(&persisted).unwrap();
        assert_eq!(round_tripped.role.as_deref(), Some("ADMIN"));
        assert_eq!(round_tripped.user_name.as_deref(), Some("alice"));
    }

    #[test]
    fn role_comes_from_the_token_not_the_cached_record() {
        let store = MemoryStore::new();
        let token = token_with_payload(
            r#"{"role":"USER","sub":"bob","exp":9999999999}"#,
        );
        store.set(AUTH_TOKEN_KEY, &token).unwrap();
        store
            .set(
                CURRENT_USER_KEY,
                r#"{"accountName":"bob","role":"ADMIN"}"#,
            )
            .unwrap();

        let manager = SessionManager::initialize(store);

        assert_eq!(manager.role(), Some(Role::User));
        assert!(!manager.is_admin());
    }

    #[test]
    fn an_undecodable_token_still_authenticates_without_a_role() {
        let store = MemoryStore::new();
        store.set(AUTH_TOKEN_KEY, "not-a-jwt").unwrap();

        let manager = SessionManager::initialize(store);

        assert!(manager.is_authenticated());
        assert_eq!(manager.role(), None);
        assert!(!manager.has_valid_token());
    }

    #[test]
    fn an_empty_token_string_is_no_token() {
        let store = MemoryStore::new();
        store.set(AUTH_TOKEN_KEY, "").unwrap();

        let manager = SessionManager::initialize(store);

        assert!(!manager.is_authenticated());
        assert_eq!(manager.token(), None);
    }

    #[test]
    fn logout_clears_both_keys() {
        let store = MemoryStore::new();
        let token =
            token_with_payload(r#"{"role":"USER","exp":9999999999}"#);
        store.set(AUTH_TOKEN_KEY, &token).unwrap();
        store
            .set(CURRENT_USER_KEY, r#"{"accountName":"bob"}"#)
            .unwrap();
        let mut manager = SessionManager::initialize(store);
        assert!(manager.is_authenticated());

        manager.logout().unwrap();

        assert!(!manager.is_authenticated());
        assert_eq!(*manager.session(), Session::default());
        assert_eq!(manager.storage.get(AUTH_TOKEN_KEY).unwrap(), None);
        assert_eq!(manager.storage.get(CURRENT_USER_KEY).unwrap(), None);
    }

    #[test]
    fn a_successful_login_persists_the_exact_token() {
        let mut manager = SessionManager::initialize(MemoryStore::new());
        let token = token_with_payload(
            r#"{"role":"USER","sub":"alice","exp":9999999999}"#,
        );
        let response = LoginResponse {
            token: token.clone(),
            message: Some(String::from("Login successful")),
            expires_in: Some(36000),
        };

        let outcome = manager.apply_login("alice", response).unwrap();

        assert_eq!(outcome.role, Some(Role::User));
        assert!(manager.is_authenticated());
        assert_eq!(
            manager.storage.get(AUTH_TOKEN_KEY).unwrap().as_deref(),
            Some(token.as_str())
        );
        let user = manager.session().user.clone().unwrap();
        assert_eq!(user.account_name.as_deref(), Some("alice"));
        assert_eq!(user.user_name.as_deref(), Some("alice"));
    }

    #[test]
    fn a_storage_event_picks_up_an_external_logout() {
        let store = MemoryStore::new();
        let token =
            token_with_payload(r#"{"role":"USER","exp":9999999999}"#);
        store.set(AUTH_TOKEN_KEY, &token).unwrap();
        let mut manager = SessionManager::initialize(store);
        assert!(manager.is_authenticated());

        // some other process logs out
        manager.storage.remove(AUTH_TOKEN_KEY).unwrap();
        manager.handle_storage_event(&StorageEvent::new(AUTH_TOKEN_KEY));

        assert!(!manager.is_authenticated());
    }

    #[test]
    fn a_storage_event_picks_up_an_external_login() {
        let mut manager = SessionManager::initialize(MemoryStore::new());
        assert!(!manager.is_authenticated());

        let token = token_with_payload(
            r#"{"role":"ADMIN","sub":"carol","exp":9999999999}"#,
        );
        manager.storage.set(AUTH_TOKEN_KEY, &token).unwrap();
        manager.handle_storage_event(&StorageEvent::new(AUTH_TOKEN_KEY));

        assert!(manager.is_authenticated());
        assert!(manager.is_admin());
    }

    #[test]
    fn events_for_unrelated_keys_are_ignored() {
        let mut manager = SessionManager::initialize(MemoryStore::new());

        let token =
            token_with_payload(r#"{"role":"USER","exp":9999999999}"#);
        manager.storage.set(AUTH_TOKEN_KEY, &token).unwrap();
        manager.handle_storage_event(&StorageEvent::new("theme"));

        // still the stale view; nobody told us the token changed
        assert!(!manager.is_authenticated());

        manager.update_auth_state();
        assert!(manager.is_authenticated());
    }

    #[test]
    fn unknown_user_record_fields_round_trip() {
        let raw = r#"{"accountName":"dana","favouriteOrchid":"Vanda"}"#;

        let user: UserInfo = serde_json::from_str(raw).unwrap();
        assert_eq!(
            user.extra.get("favouriteOrchid"),
            Some(&serde_json::Value::String(String::from("Vanda")))
        );

        let back = serde_json::to_string(&user).unwrap();
        assert!(back.contains("favouriteOrchid"));
    }
}
