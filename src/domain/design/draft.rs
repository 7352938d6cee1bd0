//! In-progress garment configuration on the design page.

use serde::Serialize;

use super::canvas::DesignCanvas;
use super::geometry::Size;
use crate::domain::aggregates::product::{find_color, find_size};
use crate::domain::aggregates::{CartItem, Catalog, Product, ProductError};
use crate::domain::value_objects::{Kroner, ProductId, Quantity};

/// Layout width of the product preview when the client has not reported one.
pub const DEFAULT_RENDERED_SIZE: Size = Size { width: 448.0, height: 448.0 };

#[derive(Debug, Clone)]
pub struct DesignDraft {
    product: Product,
    size: &'static str,
    color: &'static str,
    quantity: Quantity,
    artwork_url: Option<String>,
    canvas: DesignCanvas,
}

/// Snapshot of the draft for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSummary {
    pub product_id: ProductId,
    pub size: &'static str,
    pub color: &'static str,
    pub quantity: Quantity,
    pub artwork_url: Option<String>,
    pub total_price: Kroner,
}

impl DesignDraft {
    pub fn new(catalog: &Catalog) -> Result<Self, ProductError> {
        let product = catalog.default_product().ok_or_else(|| ProductError::UnknownProduct("default".into()))?.clone();
        let canvas = DesignCanvas::new(*product.printable_area(), DEFAULT_RENDERED_SIZE);
        Ok(Self { product, size: "M", color: "white", quantity: Quantity::ONE, artwork_url: None, canvas })
    }

    pub fn product(&self) -> &Product { &self.product }
    pub fn canvas(&self) -> &DesignCanvas { &self.canvas }
    pub fn canvas_mut(&mut self) -> &mut DesignCanvas { &mut self.canvas }
    pub fn artwork_url(&self) -> Option<&str> { self.artwork_url.as_deref() }

    pub fn summary(&self) -> DraftSummary {
        DraftSummary {
            product_id: self.product.id().clone(),
            size: self.size,
            color: self.color,
            quantity: self.quantity,
            artwork_url: self.artwork_url.clone(),
            total_price: self.product.unit_price().multiply(self.quantity),
        }
    }

    /// Switching product resets the placement, since printable areas differ.
    pub fn select_product(&mut self, catalog: &Catalog, id: &ProductId) -> Result<(), ProductError> {
        let product = catalog.get(id).ok_or_else(|| ProductError::UnknownProduct(id.to_string()))?;
        if product.id() != self.product.id() {
            self.product = product.clone();
            self.canvas.set_product(*self.product.printable_area());
        }
        Ok(())
    }

    pub fn set_size(&mut self, size: &str) -> Result<(), ProductError> {
        self.size = find_size(size).ok_or_else(|| ProductError::UnknownSize(size.to_string()))?;
        Ok(())
    }

    pub fn set_color(&mut self, color: &str) -> Result<(), ProductError> {
        self.color = find_color(color).ok_or_else(|| ProductError::UnknownColor(color.to_string()))?.name;
        Ok(())
    }

    pub fn set_quantity(&mut self, quantity: Quantity) { self.quantity = quantity; }

    pub fn set_rendered_size(&mut self, rendered: Size) { self.canvas.resize(rendered); }

    pub fn attach_artwork(&mut self, url: impl Into<String>) {
        self.artwork_url = Some(url.into());
        self.canvas.artwork_uploaded();
    }

    /// Builds the cart line from the catalog entry and the chosen options.
    pub fn to_cart_item(&self) -> Result<CartItem, ProductError> {
        self.product.line_item(self.size, self.color, self.quantity, self.artwork_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::design::canvas::{DesignPlacement, ScaleStep};

    #[test]
    fn test_defaults() {
        let catalog = Catalog::storefront().unwrap();
        let draft = DesignDraft::new(&catalog).unwrap();
        let summary = draft.summary();
        assert_eq!(summary.product_id.as_str(), "tshirt");
        assert_eq!(summary.size, "M");
        assert_eq!(summary.color, "white");
        assert_eq!(summary.total_price, Kroner::new(299));
    }

    #[test]
    fn test_to_cart_item_uses_catalog_values() {
        let catalog = Catalog::storefront().unwrap();
        let mut draft = DesignDraft::new(&catalog).unwrap();
        draft.select_product(&catalog, &ProductId::new("hoodie").unwrap()).unwrap();
        draft.set_size("xl").unwrap();
        draft.set_color("navy").unwrap();
        draft.set_quantity(Quantity::new(2).unwrap());
        draft.attach_artwork("https://cdn.test/art.png");
        let item = draft.to_cart_item().unwrap();
        assert_eq!(item.name, "Hoodie");
        assert_eq!(item.price, Kroner::new(399));
        assert_eq!(item.size, "XL");
        assert_eq!(item.color, "Marineblå");
        assert_eq!(item.quantity.value(), 2);
        assert_eq!(item.artwork.as_deref(), Some("https://cdn.test/art.png"));
    }

    #[test]
    fn test_rejects_unknown_options() {
        let catalog = Catalog::storefront().unwrap();
        let mut draft = DesignDraft::new(&catalog).unwrap();
        assert_eq!(draft.set_size("XXXL"), Err(ProductError::UnknownSize("XXXL".into())));
        assert_eq!(draft.set_color("lilla"), Err(ProductError::UnknownColor("lilla".into())));
        assert!(draft.select_product(&catalog, &ProductId::new("mug").unwrap()).is_err());
        assert_eq!(draft.summary().size, "M");
    }

    #[test]
    fn test_product_switch_and_upload_reset_placement() {
        let catalog = Catalog::storefront().unwrap();
        let mut draft = DesignDraft::new(&catalog).unwrap();
        draft.attach_artwork("https://cdn.test/one.png");
        draft.canvas_mut().step_scale(ScaleStep::Down);
        assert_ne!(draft.canvas().placement(), DesignPlacement::default());
        draft.select_product(&catalog, &ProductId::new("hoodie").unwrap()).unwrap();
        assert_eq!(draft.canvas().placement(), DesignPlacement::default());
        draft.canvas_mut().step_scale(ScaleStep::Down);
        draft.attach_artwork("https://cdn.test/two.png");
        assert_eq!(draft.canvas().placement(), DesignPlacement::default());
    }

    #[test]
    fn test_every_product_accepts_default_placement() {
        let catalog = Catalog::storefront().unwrap();
        let mut draft = DesignDraft::new(&catalog).unwrap();
        for product in catalog.products() {
            draft.select_product(&catalog, product.id()).unwrap();
            let canvas = draft.canvas();
            let p = canvas.placement();
            assert!(canvas.boundary().contains_artwork(p.offset, p.scale, 1e-9), "{} rejects default placement", product.name());
        }
    }
}
