//! Value Objects for the storefront

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

/// Product identifier value object (catalog key such as `tshirt`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    pub fn new(value: impl Into<String>) -> Result<Self, ProductIdError> {
        let value = value.into().trim().to_lowercase();
        if value.is_empty() { return Err(ProductIdError::Empty); }
        if value.len() > 50 { return Err(ProductIdError::TooLong); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for ProductId {
    type Error = ProductIdError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self { id.0 }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ProductIdError { Empty, TooLong }
impl std::error::Error for ProductIdError {}
impl fmt::Display for ProductIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Empty => write!(f, "product id empty"), Self::TooLong => write!(f, "product id too long") }
    }
}

/// Money value object in whole Danish kroner.
///
/// Prices in the shop never carry øre, so the amount is an unsigned integer and
/// a negative price cannot be expressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kroner(u64);

impl Kroner {
    pub const ZERO: Kroner = Kroner(0);

    pub const fn new(amount: u64) -> Self { Self(amount) }
    pub fn amount(&self) -> u64 { self.0 }
    pub fn add(&self, other: Kroner) -> Kroner { Kroner(self.0.saturating_add(other.0)) }
    pub fn multiply(&self, qty: Quantity) -> Kroner { Kroner(self.0.saturating_mul(u64::from(qty.value()))) }
}

impl fmt::Display for Kroner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{} kr", self.0) }
}

impl std::iter::Sum for Kroner {
    fn sum<I: Iterator<Item = Kroner>>(iter: I) -> Self { iter.fold(Kroner::ZERO, |acc, k| acc.add(k)) }
}

/// Quantity value object; a line always holds at least one unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    pub const ONE: Quantity = Quantity(NonZeroU32::MIN);

    pub fn new(value: u32) -> Result<Self, QuantityError> {
        NonZeroU32::new(value).map(Self).ok_or(QuantityError::Zero)
    }

    /// Accepts any requested integer; values below one yield `None`, values above
    /// `u32::MAX` saturate.
    pub fn from_request(value: i64) -> Option<Self> {
        if value < 1 { return None; }
        let value = u32::try_from(value).unwrap_or(u32::MAX);
        NonZeroU32::new(value).map(Self)
    }

    pub fn value(&self) -> u32 { self.0.get() }
    pub fn add(&self, other: Quantity) -> Self { Self(self.0.saturating_add(other.value())) }
}

impl Default for Quantity { fn default() -> Self { Self::ONE } }

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;
    fn try_from(value: u32) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self { q.value() }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum QuantityError { Zero }
impl std::error::Error for QuantityError {}
impl fmt::Display for QuantityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "quantity must be at least 1") }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_product_id() {
        let id = ProductId::new(" TShirt ").unwrap();
        assert_eq!(id.as_str(), "tshirt");
        assert_eq!(ProductId::new("  "), Err(ProductIdError::Empty));
    }
    #[test]
    fn test_kroner_multiply() {
        let price = Kroner::new(299);
        assert_eq!(price.multiply(Quantity::new(3).unwrap()), Kroner::new(897));
        assert_eq!(price.to_string(), "299 kr");
    }
    #[test]
    fn test_quantity_floor() {
        assert_eq!(Quantity::new(0), Err(QuantityError::Zero));
        assert_eq!(Quantity::from_request(-4), None);
        assert_eq!(Quantity::from_request(0), None);
        assert_eq!(Quantity::from_request(7).map(|q| q.value()), Some(7));
    }
    #[test]
    fn test_quantity_rejects_zero_on_deserialize() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("2").unwrap().value(), 2);
    }
}
