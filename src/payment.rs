//! Payment gateway callbacks.
//!
//! After the buyer pays (or bails out), the gateway redirects them back to
//! the store with the outcome spread across the query string. This module
//! turns that query string into something typed, and into the payload the
//! backend's `handle-payment` endpoint expects. Signature verification is
//! the backend's job; the fields are forwarded untouched.

use serde_derive::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::{self, Display, Formatter}};
use url::Url;

/// Did the buyer actually pay?
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Success,
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Success => write!(f, "success"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// The query-string parameters the gateway appends to its redirect.
///
/// `order_id` and `result_code` are the two we act on; everything else is
/// carried along for the backend.
#[derive(Debug, Clone, PartialEq, Default)]
#[non_exhaustive]
pub struct PaymentCallback {
    pub order_id: String,
    /// `"0"` means the payment went through.
    pub result_code: String,
    pub message: Option<String>,
    pub trans_id: Option<String>,
    pub amount: Option<String>,
    pub partner_code: Option<String>,
    pub request_id: Option<String>,
    pub order_info: Option<String>,
    pub order_type: Option<String>,
    pub pay_type: Option<String>,
    pub response_time: Option<String>,
    pub extra_data: Option<String>,
    pub signature: Option<String>,
}

impl PaymentCallback {
    /// Parse the redirect URL the gateway sent the buyer to.
    pub fn from_url(url: &Url) -> Result<PaymentCallback, PaymentCallbackError> {
        let mut params: HashMap<String, String> =
            url.query_pairs().into_owned().collect();
        PaymentCallback::from_params(&mut params)
    }

    /// Parse a bare query string (no leading `?`).
    pub fn from_query(query: &str) -> Result<PaymentCallback, PaymentCallbackError> {
        let mut params: HashMap<String, String> =
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect();
        PaymentCallback::from_params(&mut params)
    }

    fn from_params(
        params: &mut HashMap<String, String>,
    ) -> Result<PaymentCallback, PaymentCallbackError> {
        let order_id = params
            .remove("orderId")
            .ok_or(PaymentCallbackError::MissingOrderId)?;
        let result_code = params
            .remove("resultCode")
            .ok_or(PaymentCallbackError::MissingResultCode)?;

        Ok(PaymentCallback {
            order_id,
            result_code,
            message: params.remove("message"),
            trans_id: params.remove("transId"),
            amount: params.remove("amount"),
            partner_code: params.remove("partnerCode"),
            request_id: params.remove("requestId"),
            order_info: params.remove("orderInfo"),
            order_type: params.remove("orderType"),
            pay_type: params.remove("payType"),
            response_time: params.remove("responseTime"),
            extra_data: params.remove("extraData"),
            signature: params.remove("signature"),
        })
    }

    pub fn status(&self) -> PaymentStatus {
        if self.result_code == "0" {
            PaymentStatus::Success
        } else {
            PaymentStatus::Failed
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == PaymentStatus::Success
    }

    /// The message to show the buyer, falling back to a bland default.
    pub fn display_message(&self) -> &str {
        self.message.as_deref().unwrap_or("Payment processed")
    }

    /// Build the body for the backend's `handle-payment` endpoint.
    pub fn to_payload(&self) -> PaymentPayload {
        PaymentPayload {
            order_id: self.order_id.clone(),
            status: self.status().to_string(),
            result_code: self.result_code.clone(),
            message: self.display_message().to_string(),
            trans_id: self.trans_id.clone(),
            amount: self.amount.clone(),
            partner_code: self.partner_code.clone(),
            request_id: self.request_id.clone(),
            order_info: self.order_info.clone(),
            order_type: self.order_type.clone(),
            pay_type: self.pay_type.clone(),
            response_time: self.response_time.clone(),
            extra_data: self.extra_data.clone(),
            signature: self.signature.clone(),
        }
    }
}

/// The JSON body `handle-payment` consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub order_id: String,
    /// `"success"` or `"failed"`.
    pub status: String,
    pub result_code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trans_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pay_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// The gateway redirect was missing one of the two fields we can't do
/// without.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PaymentCallbackError {
    #[error("The callback has no orderId parameter")]
    MissingOrderId,
    #[error("The callback has no resultCode parameter")]
    MissingResultCode,
}
