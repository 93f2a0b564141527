//! An unofficial client-side interface to the Orchid Store REST API.

#![forbid(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod endpoints;
mod models;
mod payment;
mod session;
mod storage;
pub mod token;

pub use models::{
    fallback_employees, Category, Employee, InvalidRequest, Orchid,
    OrchidRequest, OrderDetail, OrderRequest, OrderStatus, OrderSummary,
};
pub use payment::{
    PaymentCallback, PaymentCallbackError, PaymentPayload, PaymentStatus,
};
pub use session::{
    Credentials, LoginOutcome, Session, SessionError, SessionManager,
    UserInfo,
};
pub use storage::{
    FileStore, MemoryStore, Storage, StorageError, StorageEvent,
    AUTH_TOKEN_KEY, CURRENT_USER_KEY,
};
pub use token::{Role, TokenError, TokenPayload};

/// The default user agent to use when communicating with the store's
/// backend.
pub const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION"));
