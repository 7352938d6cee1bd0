//! Checkout Orchestrator
//!
//! A fixed three-step wizard (contact → shipping → payment) over one
//! accumulating draft. Submission is split in two halves so the caller can
//! release its lock around the network call: [`Checkout::begin_submission`]
//! moves to `Submitting` and yields the payload, then exactly one of
//! [`Checkout::complete`] or [`Checkout::fail`] settles it. A failure lands back
//! on the payment step with the draft intact, ready for another submit.

use serde::Serialize;
use validator::{Validate, ValidationErrors};

use crate::domain::aggregates::{Cart, ContactInfo, CustomerInfo, OrderReceipt, OrderSubmission, PaymentMethod, ShippingAddress, ShippingMethod};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::Kroner;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep { #[default] ContactInfo, Shipping, Payment, Submitting, Complete }

/// Everything the customer has entered so far.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDraft {
    pub contact: ContactInfo,
    pub address: ShippingAddress,
    pub shipping_method: ShippingMethod,
    pub payment_method: PaymentMethod,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutTotals { pub subtotal: Kroner, pub shipping_cost: Kroner, pub total_amount: Kroner }

#[derive(Clone, Debug, Default)]
pub struct Checkout {
    step: CheckoutStep,
    draft: CheckoutDraft,
    last_error: Option<String>,
    order_id: Option<String>,
    events: Vec<DomainEvent>,
}

impl Checkout {
    pub fn new() -> Self { Self::default() }

    pub fn step(&self) -> CheckoutStep { self.step }
    pub fn draft(&self) -> &CheckoutDraft { &self.draft }
    pub fn last_error(&self) -> Option<&str> { self.last_error.as_deref() }
    pub fn order_id(&self) -> Option<&str> { self.order_id.as_deref() }
    pub fn is_submitting(&self) -> bool { self.step == CheckoutStep::Submitting }

    pub fn totals(&self, cart: &Cart) -> CheckoutTotals {
        let subtotal = cart.total_price();
        let shipping_cost = self.draft.shipping_method.cost();
        CheckoutTotals { subtotal, shipping_cost, total_amount: subtotal.add(shipping_cost) }
    }

    pub fn set_contact(&mut self, contact: ContactInfo) -> Result<(), CheckoutError> {
        self.ensure_editable()?;
        self.draft.contact = contact.normalized();
        Ok(())
    }

    pub fn set_shipping(&mut self, address: ShippingAddress, method: ShippingMethod) -> Result<(), CheckoutError> {
        self.ensure_editable()?;
        self.draft.address = address.normalized();
        self.draft.shipping_method = method;
        Ok(())
    }

    pub fn set_payment(&mut self, method: PaymentMethod) -> Result<(), CheckoutError> {
        self.ensure_editable()?;
        self.draft.payment_method = method;
        Ok(())
    }

    /// Validates the current step's fields and moves to the next step.
    pub fn advance(&mut self) -> Result<CheckoutStep, CheckoutError> {
        self.last_error = None;
        self.step = match self.step {
            CheckoutStep::ContactInfo => {
                self.draft.contact.validate().map_err(CheckoutError::from)?;
                CheckoutStep::Shipping
            }
            CheckoutStep::Shipping => {
                self.draft.address.validate().map_err(CheckoutError::from)?;
                CheckoutStep::Payment
            }
            other => return Err(CheckoutError::WrongStep(other)),
        };
        Ok(self.step)
    }

    pub fn back(&mut self) -> Result<CheckoutStep, CheckoutError> {
        self.step = match self.step {
            CheckoutStep::Shipping => CheckoutStep::ContactInfo,
            CheckoutStep::Payment => CheckoutStep::Shipping,
            other => return Err(CheckoutError::WrongStep(other)),
        };
        Ok(self.step)
    }

    /// Moves to `Submitting` and returns the order payload.
    pub fn begin_submission(&mut self, cart: &Cart) -> Result<OrderSubmission, CheckoutError> {
        match self.step {
            CheckoutStep::Payment => {}
            CheckoutStep::Submitting => return Err(CheckoutError::AlreadySubmitting),
            other => return Err(CheckoutError::WrongStep(other)),
        }
        self.draft.contact.validate().map_err(CheckoutError::from)?;
        self.draft.address.validate().map_err(CheckoutError::from)?;
        let customer = CustomerInfo { contact: self.draft.contact.clone(), address: self.draft.address.clone() };
        let submission = OrderSubmission::from_cart(cart, customer, self.draft.shipping_method, self.draft.payment_method)
            .map_err(|_| CheckoutError::EmptyCart)?;
        self.step = CheckoutStep::Submitting;
        self.last_error = None;
        Ok(submission)
    }

    /// The backend acknowledged the order: clear the cart and finish.
    pub fn complete(&mut self, receipt: OrderReceipt, cart: &mut Cart) -> Result<(), CheckoutError> {
        if self.step != CheckoutStep::Submitting { return Err(CheckoutError::WrongStep(self.step)); }
        let total = self.totals(cart).total_amount;
        cart.clear();
        self.raise_event(DomainEvent::Order(OrderEvent::Submitted { order_id: receipt.order_id.clone(), total }));
        self.order_id = Some(receipt.order_id);
        self.step = CheckoutStep::Complete;
        Ok(())
    }

    /// The submission failed: back to the payment step with the message shown.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.step != CheckoutStep::Submitting { return; }
        let message = message.into();
        self.raise_event(DomainEvent::Order(OrderEvent::Failed { reason: message.clone() }));
        self.last_error = Some(message);
        self.step = CheckoutStep::Payment;
    }

    pub fn dismiss_error(&mut self) { self.last_error = None; }

    /// Back to the first step for a new order. The entered details are kept.
    pub fn restart(&mut self) -> Result<(), CheckoutError> {
        if self.is_submitting() { return Err(CheckoutError::AlreadySubmitting); }
        self.step = CheckoutStep::ContactInfo;
        self.last_error = None;
        self.order_id = None;
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }

    fn ensure_editable(&self) -> Result<(), CheckoutError> {
        match self.step {
            CheckoutStep::Submitting => Err(CheckoutError::AlreadySubmitting),
            CheckoutStep::Complete => Err(CheckoutError::WrongStep(CheckoutStep::Complete)),
            _ => Ok(()),
        }
    }
}

/// One failed form field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError { pub field: String, pub message: String }

pub(crate) fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e.message.as_ref().map_or_else(|| e.code.to_string(), ToString::to_string),
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError { WrongStep(CheckoutStep), Validation(Vec<FieldError>), EmptyCart, AlreadySubmitting }

impl From<ValidationErrors> for CheckoutError {
    fn from(errors: ValidationErrors) -> Self { Self::Validation(field_errors(&errors)) }
}

impl std::error::Error for CheckoutError {}
impl std::fmt::Display for CheckoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongStep(step) => write!(f, "Action not available at checkout step {step:?}"),
            Self::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                write!(f, "Invalid fields: {}", fields.join(", "))
            }
            Self::EmptyCart => write!(f, "Cart is empty"),
            Self::AlreadySubmitting => write!(f, "Order submission already in progress"),
        }
    }
}
