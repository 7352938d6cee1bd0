//! Cart Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{Kroner, ProductId, Quantity};

/// Session-scoped cart. Lines are keyed by `(id, size, color)`.
#[derive(Clone, Debug)]
pub struct Cart {
    items: Vec<CartItem>,
    is_open: bool,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub size: String,
    pub color: String,
    pub quantity: Quantity,
    pub price: Kroner,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork: Option<String>,
}

impl CartItem {
    pub fn line_total(&self) -> Kroner { self.price.multiply(self.quantity) }
    pub fn key(&self) -> LineKey { LineKey { id: self.id.clone(), size: self.size.clone(), color: self.color.clone() } }
    fn matches(&self, key: &LineKey) -> bool { self.id == key.id && self.size == key.size && self.color == key.color }
}

/// Identity of a cart line.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineKey {
    #[serde(rename = "productId")]
    pub id: ProductId,
    pub size: String,
    pub color: String,
}

impl Default for Cart {
    fn default() -> Self { Self::new() }
}

impl Cart {
    pub fn new() -> Self {
        Self { items: vec![], is_open: false, updated_at: Utc::now(), events: vec![] }
    }

    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn is_open(&self) -> bool { self.is_open }
    pub fn set_open(&mut self, open: bool) { self.is_open = open; }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// Sum of quantities across all lines.
    pub fn item_count(&self) -> u64 { self.items.iter().map(|i| u64::from(i.quantity.value())).sum() }

    pub fn total_price(&self) -> Kroner { self.items.iter().map(CartItem::line_total).sum() }

    /// Appends the item, or merges it into the line with the same key.
    pub fn add_item(&mut self, item: CartItem) {
        let key = item.key();
        let quantity = item.quantity;
        let merged = if let Some(existing) = self.items.iter_mut().find(|i| i.matches(&key)) {
            existing.quantity = existing.quantity.add(quantity);
            if existing.artwork.is_none() { existing.artwork = item.artwork; }
            true
        } else {
            self.items.push(item);
            false
        };
        self.touch();
        self.raise_event(DomainEvent::Cart(CartEvent::ItemAdded {
            product_id: key.id, size: key.size, color: key.color, quantity: quantity.value(), merged,
        }));
    }

    /// Sets the quantity of a line. Requests below one leave the line unchanged.
    /// Returns whether a line was modified.
    pub fn update_quantity(&mut self, key: &LineKey, requested: i64) -> bool {
        let Some(quantity) = Quantity::from_request(requested) else { return false };
        let Some(item) = self.items.iter_mut().find(|i| i.matches(key)) else { return false };
        if item.quantity == quantity { return false; }
        item.quantity = quantity;
        self.touch();
        self.raise_event(DomainEvent::Cart(CartEvent::QuantityChanged {
            product_id: key.id.clone(), size: key.size.clone(), color: key.color.clone(), quantity: quantity.value(),
        }));
        true
    }

    /// Deletes the line regardless of its quantity. Returns whether a line was removed.
    pub fn remove_item(&mut self, key: &LineKey) -> bool {
        let before = self.items.len();
        self.items.retain(|i| !i.matches(key));
        if self.items.len() == before { return false; }
        self.touch();
        self.raise_event(DomainEvent::Cart(CartEvent::ItemRemoved {
            product_id: key.id.clone(), size: key.size.clone(), color: key.color.clone(),
        }));
        true
    }

    pub fn clear(&mut self) {
        let lines = self.items.len();
        self.items.clear();
        self.touch();
        self.raise_event(DomainEvent::Cart(CartEvent::Cleared { lines }));
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}
