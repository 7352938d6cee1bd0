//! Order Aggregate
//!
//! The order is assembled on this side and handed to the hosted backend, which
//! assigns the order id. Nothing here is persisted.

use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::aggregates::cart::{Cart, CartItem};
use crate::domain::value_objects::Kroner;

pub const DEFAULT_COUNTRY: &str = "Danmark";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod { #[default] Standard, Express }

impl ShippingMethod {
    pub fn cost(self) -> Kroner {
        match self { Self::Standard => Kroner::new(39), Self::Express => Kroner::new(79) }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod { #[default] Dankort, MobilePay }

/// Step one of checkout: who is ordering.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[validate(email(message = "Indtast en gyldig email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Fornavn er påkrævet"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Efternavn er påkrævet"))]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ContactInfo {
    pub fn normalized(self) -> Self {
        Self {
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: self.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
        }
    }
}

/// Step two of checkout: where the order ships.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[validate(length(min = 1, message = "Adresse er påkrævet"))]
    pub address: String,
    #[validate(length(min = 1, message = "By er påkrævet"))]
    pub city: String,
    #[validate(length(min = 1, message = "Postnummer er påkrævet"))]
    pub postal_code: String,
    #[validate(length(min = 1, message = "Land er påkrævet"))]
    #[serde(default)]
    pub country: String,
}

impl Default for ShippingAddress {
    fn default() -> Self {
        Self { address: String::new(), city: String::new(), postal_code: String::new(), country: DEFAULT_COUNTRY.to_string() }
    }
}

impl ShippingAddress {
    pub fn normalized(self) -> Self {
        let country = self.country.trim();
        Self {
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
            country: if country.is_empty() { DEFAULT_COUNTRY.to_string() } else { country.to_string() },
        }
    }
}

/// Wire shape of `customerInfo`: contact and address flattened into one object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CustomerInfo {
    #[serde(flatten)]
    pub contact: ContactInfo,
    #[serde(flatten)]
    pub address: ShippingAddress,
}

/// Body of the order-submission request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    pub customer_info: CustomerInfo,
    pub items: Vec<CartItem>,
    pub shipping_method: ShippingMethod,
    pub payment_method: PaymentMethod,
    pub subtotal: Kroner,
    pub shipping_cost: Kroner,
    pub total_amount: Kroner,
}

impl OrderSubmission {
    pub fn from_cart(cart: &Cart, customer_info: CustomerInfo, shipping_method: ShippingMethod, payment_method: PaymentMethod) -> Result<Self, OrderError> {
        if cart.is_empty() { return Err(OrderError::NoItems); }
        let subtotal = cart.total_price();
        let shipping_cost = shipping_method.cost();
        Ok(Self {
            customer_info,
            items: cart.items().to_vec(),
            shipping_method,
            payment_method,
            subtotal,
            shipping_cost,
            total_amount: subtotal.add(shipping_cost),
        })
    }
}

/// Successful acknowledgement from the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt { pub order_id: String }

#[derive(Debug, Clone, PartialEq, Eq)] pub enum OrderError { NoItems }
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "Cart is empty") }
}
