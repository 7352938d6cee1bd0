//! Domain events
use crate::domain::value_objects::{Kroner, ProductId};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum DomainEvent {
    Cart(CartEvent),
    Order(OrderEvent),
}

impl DomainEvent {
    /// Subject suffix used when the event is published.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Cart(_) => "cart",
            Self::Order(_) => "order",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CartEvent {
    ItemAdded { product_id: ProductId, size: String, color: String, quantity: u32, merged: bool },
    QuantityChanged { product_id: ProductId, size: String, color: String, quantity: u32 },
    ItemRemoved { product_id: ProductId, size: String, color: String },
    Cleared { lines: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderEvent {
    Submitted { order_id: String, total: Kroner },
    Failed { reason: String },
}
