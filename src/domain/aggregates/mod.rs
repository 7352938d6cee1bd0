//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;

pub use product::{Catalog, ColorOption, PrintableArea, Product, ProductError, COLORS, SIZES};
pub use order::{ContactInfo, CustomerInfo, OrderError, OrderReceipt, OrderSubmission, PaymentMethod, ShippingAddress, ShippingMethod};
pub use cart::{Cart, CartItem, LineKey};
