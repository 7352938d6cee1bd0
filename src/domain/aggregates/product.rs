//! Product Aggregate

use serde::Serialize;
use crate::domain::aggregates::cart::CartItem;
use crate::domain::value_objects::{Kroner, ProductId, Quantity};

pub const SIZES: [&str; 6] = ["XS", "S", "M", "L", "XL", "XXL"];

/// Region of the product image where artwork may be printed, as fractions of
/// the rendered image width (`left`, `right`) and height (`top`, `bottom`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PrintableArea { top: f64, bottom: f64, left: f64, right: f64 }

impl PrintableArea {
    pub fn new(top: f64, bottom: f64, left: f64, right: f64) -> Result<Self, ProductError> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if ![top, bottom, left, right].into_iter().all(in_unit) { return Err(ProductError::AreaOutOfRange); }
        if left >= right || top >= bottom { return Err(ProductError::AreaInverted); }
        Ok(Self { top, bottom, left, right })
    }
    pub fn top(&self) -> f64 { self.top }
    pub fn bottom(&self) -> f64 { self.bottom }
    pub fn left(&self) -> f64 { self.left }
    pub fn right(&self) -> f64 { self.right }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColorOption { pub name: &'static str, pub label: &'static str, pub hex: &'static str }

pub const COLORS: [ColorOption; 6] = [
    ColorOption { name: "white", label: "Hvid", hex: "#FFFFFF" },
    ColorOption { name: "black", label: "Sort", hex: "#000000" },
    ColorOption { name: "navy", label: "Marineblå", hex: "#1F2937" },
    ColorOption { name: "gray", label: "Grå", hex: "#6B7280" },
    ColorOption { name: "red", label: "Rød", hex: "#EF4444" },
    ColorOption { name: "blue", label: "Blå", hex: "#3B82F6" },
];

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: ProductId,
    name: String,
    unit_price: Kroner,
    base_image: String,
    printable_area: PrintableArea,
}

impl Product {
    pub fn create(id: ProductId, name: impl Into<String>, unit_price: Kroner, base_image: impl Into<String>, printable_area: PrintableArea) -> Self {
        Self { id, name: name.into(), unit_price, base_image: base_image.into(), printable_area }
    }

    pub fn id(&self) -> &ProductId { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn unit_price(&self) -> Kroner { self.unit_price }
    pub fn base_image(&self) -> &str { &self.base_image }
    pub fn printable_area(&self) -> &PrintableArea { &self.printable_area }

    /// Builds a cart line for this product. Size and colour must exist in the
    /// catalog; the line stores the colour's display label.
    pub fn line_item(&self, size: &str, color: &str, quantity: Quantity, artwork: Option<String>) -> Result<CartItem, ProductError> {
        let size = find_size(size).ok_or_else(|| ProductError::UnknownSize(size.to_string()))?;
        let color = find_color(color).ok_or_else(|| ProductError::UnknownColor(color.to_string()))?;
        Ok(CartItem {
            id: self.id.clone(),
            name: self.name.clone(),
            size: size.to_string(),
            color: color.label.to_string(),
            quantity,
            price: self.unit_price,
            image: self.base_image.clone(),
            artwork,
        })
    }
}

/// Colour lookup by machine name or display label, case-insensitive.
pub fn find_color(value: &str) -> Option<&'static ColorOption> {
    let value = value.trim();
    COLORS.iter().find(|c| c.name.eq_ignore_ascii_case(value) || c.label.to_lowercase() == value.to_lowercase())
}

pub fn find_size(value: &str) -> Option<&'static str> {
    let value = value.trim();
    SIZES.iter().copied().find(|s| s.eq_ignore_ascii_case(value))
}

/// Read-only product reference data.
#[derive(Clone, Debug, Serialize)]
pub struct Catalog { products: Vec<Product> }

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self { Self { products } }

    /// The shop's garments: a T-shirt and a hoodie.
    pub fn storefront() -> Result<Self, ProductError> {
        let tshirt = Product::create(
            ProductId::new("tshirt").map_err(|_| ProductError::InvalidId)?,
            "T-shirt",
            Kroner::new(299),
            "/images/tshirt.png",
            PrintableArea::new(0.25, 0.70, 0.30, 0.70)?,
        );
        let hoodie = Product::create(
            ProductId::new("hoodie").map_err(|_| ProductError::InvalidId)?,
            "Hoodie",
            Kroner::new(399),
            "/images/hoodie.png",
            PrintableArea::new(0.30, 0.62, 0.32, 0.68)?,
        );
        Ok(Self::new(vec![tshirt, hoodie]))
    }

    pub fn products(&self) -> &[Product] { &self.products }
    pub fn get(&self, id: &ProductId) -> Option<&Product> { self.products.iter().find(|p| p.id() == id) }
    pub fn default_product(&self) -> Option<&Product> { self.products.first() }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ProductError { InvalidId, AreaOutOfRange, AreaInverted, UnknownProduct(String), UnknownSize(String), UnknownColor(String) }
impl std::error::Error for ProductError {}
impl std::fmt::Display for ProductError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId => write!(f, "Invalid product id"),
            Self::AreaOutOfRange => write!(f, "Printable area fractions must lie in [0, 1]"),
            Self::AreaInverted => write!(f, "Printable area must satisfy left < right and top < bottom"),
            Self::UnknownProduct(id) => write!(f, "Unknown product: {id}"),
            Self::UnknownSize(size) => write!(f, "Unknown size: {size}"),
            Self::UnknownColor(color) => write!(f, "Unknown color: {color}"),
        }
    }
}
