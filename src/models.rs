//! The store's wire types.
//!
//! Field spellings follow the backend's JSON, warts and all; the aliases
//! cover the couple of places where the backend serialises the same record
//! two different ways.

use serde_derive::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A single orchid in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Orchid {
    #[serde(alias = "id")]
    pub orchid_id: i64,
    pub orchid_name: String,
    pub orchid_description: String,
    /// Image URL.
    pub orchid_url: String,
    pub price: f64,
    #[serde(alias = "natural")]
    pub is_natural: bool,
    #[serde(default)]
    pub category: Option<Category>,
}

/// Payload for creating or updating an orchid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchidRequest {
    pub orchid_name: String,
    pub orchid_description: String,
    pub orchid_url: String,
    pub price: f64,
    pub is_natural: bool,
    pub category_id: i64,
}

impl OrchidRequest {
    /// The same checks the backend runs, done before the request leaves the
    /// machine.
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        if self.orchid_name.trim().is_empty() {
            return Err(InvalidRequest::BlankName);
        }
        if self.price <= 0.0 {
            return Err(InvalidRequest::NonPositivePrice(self.price));
        }
        if self.category_id <= 0 {
            return Err(InvalidRequest::BadCategory(self.category_id));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Category {
    pub category_id: i64,
    pub category_name: String,
}

/// One row in an order listing.
///
/// Unlike every other record, the backend spells these fields in
/// snake_case, which happens to match the Rust field names exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct OrderSummary {
    #[serde(alias = "orderId")]
    pub order_id: i64,
    /// Milliseconds since the Unix epoch.
    #[serde(default, alias = "orderDate")]
    pub order_date: Option<i64>,
    #[serde(alias = "orderStatus")]
    pub order_status: OrderStatus,
    #[serde(alias = "totalAmount")]
    pub total_amount: f64,
}

/// Payload for placing an order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub price: f64,
    pub quantity: i32,
    pub orchid_id: i64,
}

impl OrderRequest {
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        if self.price <= 0.0 {
            return Err(InvalidRequest::NonPositivePrice(self.price));
        }
        if self.quantity <= 0 {
            return Err(InvalidRequest::NonPositiveQuantity(self.quantity));
        }
        if self.orchid_id <= 0 {
            return Err(InvalidRequest::BadOrchid(self.orchid_id));
        }

        Ok(())
    }
}

/// A single line inside an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct OrderDetail {
    #[serde(default)]
    pub order_detail_id: Option<i64>,
    pub orchid_name: String,
    pub orchid_url: String,
    pub price: f64,
    pub quantity: i32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
    /// The backend grew a status this build doesn't know about.
    #[serde(other)]
    Unknown,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Paid => write!(f, "PAID"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
            OrderStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A staff record, served by the standalone employees service. Doubles as
/// the create/update payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    pub emp_id: String,
    pub name: String,
    /// Photo URL.
    pub url: String,
    /// `true` for male, `false` for female. The service predates anyone
    /// thinking about this field properly.
    pub gender: bool,
    pub designation: String,
}

/// The roster shown when the employees service is unreachable. A listing
/// degrades to this instead of erroring out.
pub fn fallback_employees() -> Vec<Employee> {
    let roster = [
        (1, "EMP001", "Linh Tran", true, "Orchid Care Specialist"),
        (2, "EMP002", "Maya Okafor", false, "Orchid Breeding Expert"),
        (3, "EMP003", "Tomas Berg", true, "Greenhouse Manager"),
        (4, "EMP004", "Priya Nair", false, "Plant Disease Analyst"),
        (5, "EMP005", "Jonas Keller", true, "Propagation Technician"),
    ];

    roster
        .iter()
        .map(|&(id, emp_id, name, gender, designation)| Employee {
            id,
            emp_id: emp_id.to_string(),
            name: name.to_string(),
            url: format!(
                "https://ui-avatars.com/api/?name={}&size=300",
                name.replace(' ', "+")
            ),
            gender,
            designation: designation.to_string(),
        })
        .collect()
}

/// A request that would be rejected by the backend anyway.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidRequest {
    #[error("The name can't be blank")]
    BlankName,
    #[error("The price must be greater than 0, got {0}")]
    NonPositivePrice(f64),
    #[error("The quantity must be greater than 0, got {0}")]
    NonPositiveQuantity(i32),
    #[error("{0} isn't a valid category id")]
    BadCategory(i64),
    #[error("{0} isn't a valid orchid id")]
    BadOrchid(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> OrchidRequest {
        OrchidRequest {
            orchid_name: String::from("Phalaenopsis amabilis"),
            orchid_description: String::from("Moon orchid"),
            orchid_url: String::from("https://example.com/moon.jpg"),
            price: 25.0,
            is_natural: true,
            category_id: 1,
        }
    }

    #[test]
    fn parse_an_orchid_record() {
        let src = r#"{
            "orchidId": 7,
            "orchidName": "Vanda coerulea",
            "orchidDescription": "Blue orchid",
            "orchidUrl": "https://example.com/vanda.jpg",
            "price": 45.5,
            "isNatural": true,
            "category": {"categoryId": 2, "categoryName": "Vanda"}
        }"#;
        let should_be = Orchid {
            orchid_id: 7,
            orchid_name: String::from("Vanda coerulea"),
            orchid_description: String::from("Blue orchid"),
            orchid_url: String::from("https://example.com/vanda.jpg"),
            price: 45.5,
            is_natural: true,
            category: Some(Category {
                category_id: 2,
                category_name: String::from("Vanda"),
            }),
        };

        let got: Orchid = serde_json::from_str(src).unwrap();

        assert_eq!(got, should_be);
    }

    #[test]
    fn entity_spelling_of_an_orchid_also_parses() {
        // the raw JPA entity serialises "id" and "natural"
        let src = r#"{
            "id": 7,
            "orchidName": "Vanda coerulea",
            "orchidDescription": "Blue orchid",
            "orchidUrl": "https://example.com/vanda.jpg",
            "price": 45.5,
            "natural": true
        }"#;

        let got: Orchid = serde_json::from_str(src).unwrap();

        assert_eq!(got.orchid_id, 7);
        assert!(got.is_natural);
        assert_eq!(got.category, None);
    }

    #[test]
    fn orchid_request_serialises_the_backend_spelling() {
        let request = sample_request();

        let got = serde_json::to_value(&request).unwrap();

        assert_eq!(
            got,
            serde_json::json!({
                "orchidName": "Phalaenopsis amabilis",
                "orchidDescription": "Moon orchid",
                "orchidUrl": "https://example.com/moon.jpg",
                "price": 25.0,
                "isNatural": true,
                "categoryId": 1
            })
        );
    }

    #[test]
    fn validation_rejects_bad_orchid_requests() {
        let mut request = sample_request();
        request.price = 0.0;
        assert_eq!(
            request.validate(),
            Err(InvalidRequest::NonPositivePrice(0.0))
        );

        let mut request = sample_request();
        request.category_id = 0;
        assert_eq!(request.validate(), Err(InvalidRequest::BadCategory(0)));

        let mut request = sample_request();
        request.orchid_name = String::from("   ");
        assert_eq!(request.validate(), Err(InvalidRequest::BlankName));

        assert_eq!(sample_request().validate(), Ok(()));
    }

    #[test]
    fn validation_rejects_bad_order_requests() {
        let request = OrderRequest {
            price: 10.0,
            quantity: 0,
            orchid_id: 3,
        };

        assert_eq!(
            request.validate(),
            Err(InvalidRequest::NonPositiveQuantity(0))
        );
    }

    #[test]
    fn parse_an_order_summary() {
        let src = r#"{
            "order_id": 12,
            "order_date": 1718000000000,
            "order_status": "PENDING",
            "total_amount": 120.5
        }"#;
        let should_be = OrderSummary {
            order_id: 12,
            order_date: Some(1718000000000),
            order_status: OrderStatus::Pending,
            total_amount: 120.5,
        };

        let got: OrderSummary = serde_json::from_str(src).unwrap();

        assert_eq!(got, should_be);
    }

    #[test]
    fn unknown_order_status_is_tolerated() {
        let got: OrderStatus =
            serde_json::from_str(r#""REFUNDED""#).unwrap();

        assert_eq!(got, OrderStatus::Unknown);
    }

    #[test]
    fn fallback_roster_is_not_empty() {
        let roster = fallback_employees();

        assert_eq!(roster.len(), 5);
        assert!(roster.iter().all(|e| e.emp_id.starts_with("EMP")));
    }
}
