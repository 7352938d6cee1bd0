//! HTTP API.

use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::backend::artwork::{ArtworkUpload, UploadRequest};
use crate::backend::contact::{ContactMessage, ContactReceipt};
use crate::backend::{bounded, StorefrontBackend};
use crate::domain::aggregates::product::{find_color, find_size};
use crate::domain::aggregates::{
    Cart, CartItem, Catalog, ColorOption, ContactInfo, LineKey, PaymentMethod, Product, ProductError, ShippingAddress, ShippingMethod, COLORS,
    SIZES,
};
use crate::domain::checkout::{CheckoutDraft, CheckoutStep, CheckoutTotals};
use crate::domain::design::{BoundaryBox, DesignPlacement, DraftSummary, Gesture, Hit, Point, PointerEvent, ScaleStep, Size};
use crate::domain::value_objects::{Kroner, ProductId, Quantity};
use crate::events::EventPublisher;
use crate::session::{submit_checkout, Session, SessionStore, SharedSession};
use crate::{Result, StorefrontError};

/// Base64 inflates by a third; leaves room for artwork well past the
/// recommended size, which is warned about but accepted.
const ARTWORK_BODY_LIMIT: usize = 32 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub sessions: Arc<SessionStore>,
    pub backend: Arc<dyn StorefrontBackend>,
    pub events: EventPublisher,
    pub request_timeout_secs: u64,
}

impl AppState {
    async fn session(&self, id: Uuid) -> Result<SharedSession> {
        self.sessions.get(id).await.ok_or(StorefrontError::SessionNotFound)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "nyhavn-print"})) }))
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/sessions", post(create_session))
        .route("/api/v1/sessions/:id", get(get_session))
        .route("/api/v1/sessions/:id/cart", get(get_cart).delete(clear_cart))
        .route("/api/v1/sessions/:id/cart/items", post(add_item).put(update_item).delete(remove_item))
        .route("/api/v1/sessions/:id/cart/open", put(set_cart_open))
        .route("/api/v1/sessions/:id/design", get(get_design))
        .route("/api/v1/sessions/:id/design/product", put(configure_design))
        .route("/api/v1/sessions/:id/design/pointer", post(design_pointer))
        .route("/api/v1/sessions/:id/design/scale", post(design_scale))
        .route("/api/v1/sessions/:id/design/reset", post(design_reset))
        .route("/api/v1/sessions/:id/design/artwork", post(upload_artwork).layer(DefaultBodyLimit::max(ARTWORK_BODY_LIMIT)))
        .route("/api/v1/sessions/:id/design/add-to-cart", post(add_design_to_cart))
        .route("/api/v1/sessions/:id/checkout", get(get_checkout))
        .route("/api/v1/sessions/:id/checkout/contact", put(set_contact))
        .route("/api/v1/sessions/:id/checkout/shipping", put(set_shipping))
        .route("/api/v1/sessions/:id/checkout/payment", put(set_payment))
        .route("/api/v1/sessions/:id/checkout/advance", post(advance_checkout))
        .route("/api/v1/sessions/:id/checkout/back", post(back_checkout))
        .route("/api/v1/sessions/:id/checkout/submit", post(submit_order))
        .route("/api/v1/sessions/:id/checkout/error", delete(dismiss_checkout_error))
        .route("/api/v1/sessions/:id/checkout/restart", post(restart_checkout))
        .route("/api/v1/contact", post(send_contact))
        .with_state(state)
}

// =============================================================================
// VIEWS
// =============================================================================

#[derive(Debug, Serialize)]
pub struct CatalogView { pub products: Vec<Product>, pub sizes: &'static [&'static str], pub colors: &'static [ColorOption] }

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView { pub items: Vec<CartItem>, pub item_count: u64, pub total_price: Kroner, pub is_open: bool }

impl CartView {
    fn of(cart: &Cart) -> Self {
        Self { items: cart.items().to_vec(), item_count: cart.item_count(), total_price: cart.total_price(), is_open: cart.is_open() }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignView {
    pub draft: DraftSummary,
    pub rendered: Size,
    pub boundary: BoundaryBox,
    pub placement: DesignPlacement,
    pub max_scale: f64,
    pub gesture: Gesture,
    pub has_artwork: bool,
    pub artwork_center: Point,
    pub handle_center: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit: Option<Hit>,
}

impl DesignView {
    fn of(session: &Session) -> Self {
        let canvas = session.design.canvas();
        Self {
            draft: session.design.summary(),
            rendered: canvas.rendered(),
            boundary: *canvas.boundary(),
            placement: canvas.placement(),
            max_scale: canvas.max_scale(),
            gesture: canvas.gesture(),
            has_artwork: canvas.has_artwork(),
            artwork_center: canvas.artwork_center(),
            handle_center: canvas.handle_center(),
            hit: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub step: CheckoutStep,
    pub draft: CheckoutDraft,
    pub totals: CheckoutTotals,
    pub last_error: Option<String>,
    pub order_id: Option<String>,
    pub is_submitting: bool,
}

impl CheckoutView {
    fn of(session: &Session) -> Self {
        let checkout = &session.checkout;
        Self {
            step: checkout.step(),
            draft: checkout.draft().clone(),
            totals: checkout.totals(session.cart()),
            last_error: checkout.last_error().map(str::to_string),
            order_id: checkout.order_id().map(str::to_string),
            is_submitting: checkout.is_submitting(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionView { pub id: Uuid, pub cart: CartView, pub design: DesignView, pub checkout: CheckoutView }

impl SessionView {
    fn of(id: Uuid, session: &Session) -> Self {
        Self { id, cart: CartView::of(session.cart()), design: DesignView::of(session), checkout: CheckoutView::of(session) }
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
    #[serde(default)]
    pub quantity: Quantity,
    #[serde(default)]
    pub artwork: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    #[serde(flatten)]
    pub key: LineKey,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct OpenRequest { pub open: bool }

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureDesignRequest {
    pub product_id: Option<ProductId>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: Option<Quantity>,
    pub rendered: Option<Size>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerRequest {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
    Leave,
}

impl From<PointerRequest> for PointerEvent {
    fn from(req: PointerRequest) -> Self {
        match req {
            PointerRequest::Down { x, y } => Self::Down(Point::new(x, y)),
            PointerRequest::Move { x, y } => Self::Move(Point::new(x, y)),
            PointerRequest::Up => Self::Up,
            PointerRequest::Leave => Self::Leave,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScaleRequest { pub step: ScaleStep }

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingRequest {
    #[serde(flatten)]
    pub address: ShippingAddress,
    #[serde(default)]
    pub shipping_method: ShippingMethod,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest { pub payment_method: PaymentMethod }

#[derive(Debug, Serialize)]
pub struct ContactResponse { pub success: bool, #[serde(flatten)] pub receipt: ContactReceipt }

/// Canonical spelling of a line key, so `"hvid"`/`"white"` and `"m"` find the
/// `"Hvid"`/`"M"` line. Unknown values pass through and match nothing.
fn canonical_key(key: LineKey) -> LineKey {
    let size = find_size(&key.size).map_or(key.size, str::to_string);
    let color = find_color(&key.color).map_or(key.color, |c| c.label.to_string());
    LineKey { id: key.id, size, color }
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn list_products(State(s): State<AppState>) -> Json<CatalogView> {
    Json(CatalogView { products: s.catalog.products().to_vec(), sizes: &SIZES, colors: &COLORS })
}

async fn create_session(State(s): State<AppState>) -> Result<(StatusCode, Json<SessionView>)> {
    let (id, session) = s.sessions.create(&s.catalog).await?;
    let session = session.lock().await;
    Ok((StatusCode::CREATED, Json(SessionView::of(id, &session))))
}

async fn get_session(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    Ok(Json(SessionView::of(id, &session)))
}

async fn get_cart(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CartView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    Ok(Json(CartView::of(session.cart())))
}

async fn add_item(State(s): State<AppState>, Path(id): Path<Uuid>, Json(req): Json<AddItemRequest>) -> Result<Json<CartView>> {
    let product = s.catalog.get(&req.product_id).ok_or_else(|| ProductError::UnknownProduct(req.product_id.to_string()))?;
    let item = product.line_item(&req.size, &req.color, req.quantity, req.artwork)?;
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    session.cart_mut()?.add_item(item);
    s.events.publish(session.take_events());
    Ok(Json(CartView::of(session.cart())))
}

async fn update_item(State(s): State<AppState>, Path(id): Path<Uuid>, Json(req): Json<UpdateItemRequest>) -> Result<Json<CartView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    session.cart_mut()?.update_quantity(&canonical_key(req.key), req.quantity);
    s.events.publish(session.take_events());
    Ok(Json(CartView::of(session.cart())))
}

async fn remove_item(State(s): State<AppState>, Path(id): Path<Uuid>, Query(key): Query<LineKey>) -> Result<Json<CartView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    session.cart_mut()?.remove_item(&canonical_key(key));
    s.events.publish(session.take_events());
    Ok(Json(CartView::of(session.cart())))
}

async fn clear_cart(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CartView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    session.cart_mut()?.clear();
    s.events.publish(session.take_events());
    Ok(Json(CartView::of(session.cart())))
}

async fn set_cart_open(State(s): State<AppState>, Path(id): Path<Uuid>, Json(req): Json<OpenRequest>) -> Result<Json<CartView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    session.set_cart_open(req.open);
    Ok(Json(CartView::of(session.cart())))
}

async fn get_design(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<DesignView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    Ok(Json(DesignView::of(&session)))
}

/// Applies all requested changes or none of them.
async fn configure_design(State(s): State<AppState>, Path(id): Path<Uuid>, Json(req): Json<ConfigureDesignRequest>) -> Result<Json<DesignView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    let mut draft = session.design.clone();
    if let Some(product_id) = &req.product_id {
        draft.select_product(&s.catalog, product_id)?;
    }
    if let Some(size) = &req.size {
        draft.set_size(size)?;
    }
    if let Some(color) = &req.color {
        draft.set_color(color)?;
    }
    if let Some(quantity) = req.quantity {
        draft.set_quantity(quantity);
    }
    if let Some(rendered) = req.rendered {
        draft.set_rendered_size(rendered);
    }
    session.design = draft;
    Ok(Json(DesignView::of(&session)))
}

async fn design_pointer(State(s): State<AppState>, Path(id): Path<Uuid>, Json(req): Json<PointerRequest>) -> Result<Json<DesignView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    let hit = match PointerEvent::from(req) {
        PointerEvent::Down(point) => session.design.canvas_mut().pointer_down(point),
        other => {
            session.design.canvas_mut().handle(other);
            None
        }
    };
    Ok(Json(DesignView { hit, ..DesignView::of(&session) }))
}

async fn design_scale(State(s): State<AppState>, Path(id): Path<Uuid>, Json(req): Json<ScaleRequest>) -> Result<Json<DesignView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    session.design.canvas_mut().step_scale(req.step);
    Ok(Json(DesignView::of(&session)))
}

async fn design_reset(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<DesignView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    session.design.canvas_mut().reset_placement();
    Ok(Json(DesignView::of(&session)))
}

/// The session lock is not held during the upload.
async fn upload_artwork(State(s): State<AppState>, Path(id): Path<Uuid>, Json(req): Json<UploadRequest>) -> Result<Json<DesignView>> {
    let session = s.session(id).await?;
    let upload = ArtworkUpload::from_base64(req.file_name, &req.file_type, &req.file_data)?;
    let stored = bounded(s.request_timeout_secs, s.backend.upload_artwork(&upload)).await.map_err(|e| {
        tracing::warn!(file = upload.file_name(), error = %e, "artwork upload failed");
        e
    })?;
    let mut session = session.lock().await;
    session.touch();
    session.design.attach_artwork(stored.public_url);
    Ok(Json(DesignView::of(&session)))
}

async fn add_design_to_cart(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CartView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    let item = session.design.to_cart_item()?;
    session.cart_mut()?.add_item(item);
    s.events.publish(session.take_events());
    Ok(Json(CartView::of(session.cart())))
}

async fn get_checkout(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CheckoutView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    Ok(Json(CheckoutView::of(&session)))
}

async fn set_contact(State(s): State<AppState>, Path(id): Path<Uuid>, Json(contact): Json<ContactInfo>) -> Result<Json<CheckoutView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    session.checkout.set_contact(contact)?;
    Ok(Json(CheckoutView::of(&session)))
}

async fn set_shipping(State(s): State<AppState>, Path(id): Path<Uuid>, Json(req): Json<ShippingRequest>) -> Result<Json<CheckoutView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    session.checkout.set_shipping(req.address, req.shipping_method)?;
    Ok(Json(CheckoutView::of(&session)))
}

async fn set_payment(State(s): State<AppState>, Path(id): Path<Uuid>, Json(req): Json<PaymentRequest>) -> Result<Json<CheckoutView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    session.checkout.set_payment(req.payment_method)?;
    Ok(Json(CheckoutView::of(&session)))
}

async fn advance_checkout(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CheckoutView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    session.checkout.advance()?;
    Ok(Json(CheckoutView::of(&session)))
}

async fn back_checkout(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CheckoutView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    session.checkout.back()?;
    Ok(Json(CheckoutView::of(&session)))
}

/// Runs on its own task so a dropped client connection cannot strand the
/// checkout in the submitting step.
async fn submit_order(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CheckoutView>> {
    let session = s.session(id).await?;
    let task = {
        let session = session.clone();
        let backend = s.backend.clone();
        let events = s.events.clone();
        let secs = s.request_timeout_secs;
        tokio::spawn(async move { submit_checkout(&session, backend.as_ref(), secs, &events).await })
    };
    task.await.map_err(|e| StorefrontError::Internal(e.to_string()))??;
    let session = session.lock().await;
    Ok(Json(CheckoutView::of(&session)))
}

async fn dismiss_checkout_error(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CheckoutView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    session.checkout.dismiss_error();
    Ok(Json(CheckoutView::of(&session)))
}

async fn restart_checkout(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CheckoutView>> {
    let session = s.session(id).await?;
    let mut session = session.lock().await;
    session.touch();
    session.checkout.restart()?;
    Ok(Json(CheckoutView::of(&session)))
}

async fn send_contact(State(s): State<AppState>, Json(message): Json<ContactMessage>) -> Result<Json<ContactResponse>> {
    let message = message.normalized();
    message.validate()?;
    let receipt = bounded(s.request_timeout_secs, s.backend.submit_contact(&message)).await?;
    tracing::info!(id = ?receipt.id, subject = %message.subject, "contact message sent");
    Ok(Json(ContactResponse { success: true, receipt }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::config::ConfigError;
    use crate::backend::Unconfigured;
    use crate::testing::FakeBackend;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn app_with(backend: Arc<dyn StorefrontBackend>) -> Router {
        let catalog = Arc::new(Catalog::storefront().unwrap());
        router(AppState {
            catalog,
            sessions: Arc::new(SessionStore::new(120)),
            backend,
            events: EventPublisher::disabled(),
            request_timeout_secs: 20,
        })
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder.header("content-type", "application/json").body(Body::from(body.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        // Extractor rejections come back as plain text.
        let json = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, json)
    }

    async fn new_session(app: &Router) -> String {
        let (status, body) = call(app, Method::POST, "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        format!("/api/v1/sessions/{}", body["id"].as_str().unwrap())
    }

    async fn fill_checkout(app: &Router, base: &str) {
        let contact = json!({"email": "ida@example.dk", "firstName": " Ida ", "lastName": "Holm", "phone": ""});
        assert_eq!(call(app, Method::PUT, &format!("{base}/checkout/contact"), Some(contact)).await.0, StatusCode::OK);
        assert_eq!(call(app, Method::POST, &format!("{base}/checkout/advance"), None).await.0, StatusCode::OK);
        let shipping = json!({"address": "Nyhavn 1", "city": "København K", "postalCode": "1051", "shippingMethod": "express"});
        assert_eq!(call(app, Method::PUT, &format!("{base}/checkout/shipping"), Some(shipping)).await.0, StatusCode::OK);
        let (status, body) = call(app, Method::POST, &format!("{base}/checkout/advance"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"], "payment");
        assert_eq!(body["draft"]["address"]["country"], "Danmark");
    }

    #[tokio::test]
    async fn health_and_catalog() {
        let app = app_with(Arc::new(FakeBackend::default()));
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        let (_, body) = call(&app, Method::GET, "/api/v1/products", None).await;
        assert_eq!(body["products"][0]["id"], "tshirt");
        assert_eq!(body["products"][1]["unitPrice"], 399);
        assert_eq!(body["sizes"].as_array().unwrap().len(), 6);
        assert_eq!(body["colors"][2]["label"], "Marineblå");
    }

    #[tokio::test]
    async fn cart_lifecycle() {
        let app = app_with(Arc::new(FakeBackend::default()));
        let base = new_session(&app).await;
        let items = format!("{base}/cart/items");

        let add = json!({"productId": "tshirt", "size": "M", "color": "white"});
        call(&app, Method::POST, &items, Some(add.clone())).await;
        call(&app, Method::POST, &items, Some(add)).await;
        let (status, body) = call(&app, Method::PUT, &items, Some(json!({"productId": "tshirt", "size": "m", "color": "Hvid", "quantity": 3}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["itemCount"], 3);
        assert_eq!(body["totalPrice"], 897);

        let (_, body) = call(&app, Method::PUT, &items, Some(json!({"productId": "tshirt", "size": "M", "color": "Hvid", "quantity": 0}))).await;
        assert_eq!(body["itemCount"], 3);

        let (_, body) = call(&app, Method::PUT, &format!("{base}/cart/open"), Some(json!({"open": true}))).await;
        assert_eq!(body["isOpen"], true);

        let (_, body) = call(&app, Method::DELETE, &format!("{items}?productId=tshirt&size=M&color=white"), None).await;
        assert_eq!(body["itemCount"], 0);
        assert_eq!(body["totalPrice"], 0);
        assert_eq!(body["isOpen"], true);
    }

    #[tokio::test]
    async fn add_item_rejects_unknown_options() {
        let app = app_with(Arc::new(FakeBackend::default()));
        let base = new_session(&app).await;
        let items = format!("{base}/cart/items");
        let (status, body) = call(&app, Method::POST, &items, Some(json!({"productId": "mug", "size": "M", "color": "white"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Unknown product: mug");
        let (status, _) = call(&app, Method::POST, &items, Some(json!({"productId": "tshirt", "size": "XXXL", "color": "white"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = call(&app, Method::POST, &items, Some(json!({"productId": "tshirt", "size": "M", "color": "white", "quantity": 0}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unknown_session() {
        let app = app_with(Arc::new(FakeBackend::default()));
        let (status, body) = call(&app, Method::GET, &format!("/api/v1/sessions/{}/cart", Uuid::new_v4()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Session not found");
    }

    #[tokio::test]
    async fn design_upload_drag_and_add_to_cart() {
        let backend = Arc::new(FakeBackend::default());
        let app = app_with(backend.clone());
        let base = new_session(&app).await;

        let config = json!({"size": "L", "color": "black", "quantity": 2});
        assert_eq!(call(&app, Method::PUT, &format!("{base}/design/product"), Some(config)).await.0, StatusCode::OK);

        let png = json!({"fileData": "data:image/png;base64,iVBORw0KGgo=", "fileName": "logo.png", "fileType": "image/png"});
        let (status, design) = call(&app, Method::POST, &format!("{base}/design/artwork"), Some(png)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(design["hasArtwork"], true);
        assert_eq!(design["placement"]["scale"], 1.0);
        assert_eq!(design["draft"]["artworkUrl"], "https://cdn.test/artwork/1-logo.png");

        let center = design["artworkCenter"].clone();
        let (x, y) = (center["x"].as_f64().unwrap(), center["y"].as_f64().unwrap());
        let (_, down) = call(&app, Method::POST, &format!("{base}/design/pointer"), Some(json!({"type": "down", "x": x, "y": y}))).await;
        assert_eq!(down["hit"], "artwork");
        assert_eq!(down["gesture"]["state"], "dragging");
        let (_, moved) = call(&app, Method::POST, &format!("{base}/design/pointer"), Some(json!({"type": "move", "x": x + 1000.0, "y": y + 1000.0}))).await;
        // T-shirt at 448px: boundary 179.2 x 201.6, artwork 128.
        assert!((moved["placement"]["offset"]["x"].as_f64().unwrap() - 25.6).abs() < 1e-9);
        assert!((moved["placement"]["offset"]["y"].as_f64().unwrap() - 36.8).abs() < 1e-9);
        let (_, up) = call(&app, Method::POST, &format!("{base}/design/pointer"), Some(json!({"type": "leave"}))).await;
        assert_eq!(up["gesture"]["state"], "idle");

        let (_, reset) = call(&app, Method::POST, &format!("{base}/design/reset"), None).await;
        assert_eq!(reset["placement"]["offset"]["x"], 0.0);

        let (_, scaled) = call(&app, Method::POST, &format!("{base}/design/scale"), Some(json!({"step": "down"}))).await;
        assert!((scaled["placement"]["scale"].as_f64().unwrap() - 0.9).abs() < 1e-9);

        let (_, cart) = call(&app, Method::POST, &format!("{base}/design/add-to-cart"), None).await;
        assert_eq!(cart["items"][0]["size"], "L");
        assert_eq!(cart["items"][0]["color"], "Sort");
        assert_eq!(cart["items"][0]["artwork"], "https://cdn.test/artwork/1-logo.png");
        assert_eq!(cart["totalPrice"], 598);
    }

    #[tokio::test]
    async fn design_configuration_is_all_or_nothing() {
        let app = app_with(Arc::new(FakeBackend::default()));
        let base = new_session(&app).await;
        let (status, _) = call(&app, Method::PUT, &format!("{base}/design/product"), Some(json!({"productId": "hoodie", "color": "lilla"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (_, design) = call(&app, Method::GET, &format!("{base}/design"), None).await;
        assert_eq!(design["draft"]["productId"], "tshirt");
    }

    #[tokio::test]
    async fn negative_rendered_size_is_reported_as_zero() {
        let app = app_with(Arc::new(FakeBackend::default()));
        let base = new_session(&app).await;
        let config = json!({"rendered": {"width": -448.0, "height": 300.0}});
        let (status, design) = call(&app, Method::PUT, &format!("{base}/design/product"), Some(config)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(design["rendered"]["width"], 0.0);
        assert_eq!(design["rendered"]["height"], 300.0);
    }

    #[tokio::test]
    async fn artwork_type_is_checked() {
        let backend = Arc::new(FakeBackend::default());
        let app = app_with(backend.clone());
        let base = new_session(&app).await;
        let gif = json!({"fileData": "R0lGODlh", "fileName": "anim.gif", "fileType": "image/gif"});
        let (status, _) = call(&app, Method::POST, &format!("{base}/design/artwork"), Some(gif)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(backend.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn advance_reports_field_errors() {
        let app = app_with(Arc::new(FakeBackend::default()));
        let base = new_session(&app).await;
        let contact = json!({"email": "not-an-email", "firstName": "Ida", "lastName": ""});
        call(&app, Method::PUT, &format!("{base}/checkout/contact"), Some(contact)).await;
        let (status, body) = call(&app, Method::POST, &format!("{base}/checkout/advance"), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["fields"].as_array().unwrap().len(), 2);
        let (_, checkout) = call(&app, Method::GET, &format!("{base}/checkout"), None).await;
        assert_eq!(checkout["step"], "contact_info");
    }

    #[tokio::test]
    async fn submit_fails_then_succeeds() {
        let backend = Arc::new(FakeBackend::failing(1));
        let app = app_with(backend.clone());
        let base = new_session(&app).await;
        call(&app, Method::POST, &format!("{base}/cart/items"), Some(json!({"productId": "hoodie", "size": "S", "color": "navy", "quantity": 2}))).await;
        fill_checkout(&app, &base).await;
        call(&app, Method::PUT, &format!("{base}/checkout/payment"), Some(json!({"paymentMethod": "mobilepay"}))).await;

        let (status, body) = call(&app, Method::POST, &format!("{base}/checkout/submit"), None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Failed to create order");
        let (_, checkout) = call(&app, Method::GET, &format!("{base}/checkout"), None).await;
        assert_eq!(checkout["step"], "payment");
        assert_eq!(checkout["lastError"], "Failed to create order");
        assert_eq!(checkout["totals"]["totalAmount"], 798 + 79);

        let (_, dismissed) = call(&app, Method::DELETE, &format!("{base}/checkout/error"), None).await;
        assert_eq!(dismissed["lastError"], Value::Null);

        let (status, body) = call(&app, Method::POST, &format!("{base}/checkout/submit"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"], "complete");
        assert_eq!(body["orderId"], "NYH0001");
        let (_, cart) = call(&app, Method::GET, &format!("{base}/cart"), None).await;
        assert_eq!(cart["itemCount"], 0);

        let orders = backend.orders.lock().unwrap();
        let order = serde_json::to_value(&orders[0]).unwrap();
        assert_eq!(order["customerInfo"]["firstName"], "Ida");
        assert!(order["customerInfo"].get("phone").is_none());
        assert_eq!(order["shippingMethod"], "express");
        assert_eq!(order["paymentMethod"], "mobilepay");
        assert_eq!(order["totalAmount"], 877);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_submit_times_out() {
        let app = app_with(Arc::new(FakeBackend::slow(Duration::from_secs(3600))));
        let base = new_session(&app).await;
        call(&app, Method::POST, &format!("{base}/cart/items"), Some(json!({"productId": "tshirt", "size": "M", "color": "white"}))).await;
        fill_checkout(&app, &base).await;

        let (status, body) = call(&app, Method::POST, &format!("{base}/checkout/submit"), None).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"], "backend did not respond within 20s");
        let (_, checkout) = call(&app, Method::GET, &format!("{base}/checkout"), None).await;
        assert_eq!(checkout["step"], "payment");
        assert_eq!(checkout["isSubmitting"], false);
    }

    #[tokio::test]
    async fn submit_requires_payment_step() {
        let app = app_with(Arc::new(FakeBackend::default()));
        let base = new_session(&app).await;
        let (status, _) = call(&app, Method::POST, &format!("{base}/checkout/submit"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn contact_form() {
        let backend = Arc::new(FakeBackend::default());
        let app = app_with(backend.clone());
        let msg = json!({"name": " Ida ", "email": "ida@example.dk", "subject": "Firmatøj", "message": "Hej"});
        let (status, body) = call(&app, Method::POST, "/api/v1/contact", Some(msg)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "id": "1"}));
        assert_eq!(backend.contacts.lock().unwrap()[0].name, "Ida");

        let (status, _) = call(&app, Method::POST, "/api/v1/contact", Some(json!({"name": "Ida", "email": "x", "subject": "s", "message": "m"}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unconfigured_backend_reports_missing_variable() {
        let app = app_with(Arc::new(Unconfigured::new(ConfigError::Missing { var: "BACKEND_URL".into() })));
        let msg = json!({"name": "Ida", "email": "ida@example.dk", "subject": "s", "message": "m"});
        let (status, body) = call(&app, Method::POST, "/api/v1/contact", Some(msg)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "backend not configured: BACKEND_URL not set");
    }
}
