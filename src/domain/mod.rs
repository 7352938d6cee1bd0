//! Storefront domain: cart, design canvas, checkout
pub mod aggregates;
pub mod checkout;
pub mod design;
pub mod events;
pub mod value_objects;
