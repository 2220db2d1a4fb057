//! Order draft
//!
//! The in-progress order of one creation session. A draft is seeded with
//! one zero-quantity line per catalog product; lines are never added or
//! removed, only changed in place by product id.
//!
//! # Steps
//!
//! ```text
//! CustomerInfo(1) -> Products(2) -> Payment(3) -> Review(4)
//! ```
//!
//! `advance` validates the fields owned by the current step and moves on
//! only when they pass. `retreat` always moves back. Editing a field never
//! changes the step.

mod attachment;

pub use attachment::{MAX_ATTACHMENT_SIZE, PaymentAttachment};

use crate::catalog::CatalogSnapshot;
use crate::error::{DraftError, SubmitError, ValidationErrors};
use crate::pricing::{self, DraftTotals, LineBreakdown, MAX_QUANTITY};
use crate::validator::{self, StepFields};
use rust_decimal::Decimal;
use sales_client::HttpClient;
use shared::{OrderId, PaymentMethod, ProductId};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Workflow cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Step {
    #[default]
    CustomerInfo = 1,
    Products = 2,
    Payment = 3,
    Review = 4,
}

impl Step {
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn next(self) -> Option<Step> {
        match self {
            Self::CustomerInfo => Some(Self::Products),
            Self::Products => Some(Self::Payment),
            Self::Payment => Some(Self::Review),
            Self::Review => None,
        }
    }

    pub fn previous(self) -> Option<Step> {
        match self {
            Self::CustomerInfo => None,
            Self::Products => Some(Self::CustomerInfo),
            Self::Payment => Some(Self::Products),
            Self::Review => Some(Self::Payment),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::CustomerInfo => "Customer Info",
            Self::Products => "Products",
            Self::Payment => "Payment",
            Self::Review => "Review",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.title())
    }
}

/// Customer and delivery fields (step 1)
///
/// `landmark` and `alternate_phone_number` are optional; empty means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerInfo {
    pub full_name: String,
    pub city: String,
    pub delivery_address: String,
    pub landmark: String,
    pub phone_number: String,
    pub alternate_phone_number: String,
}

/// One product's quantity and discount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub discount: Decimal,
}

impl OrderLine {
    fn empty(product_id: ProductId) -> Self {
        Self {
            product_id,
            quantity: 0,
            discount: Decimal::ZERO,
        }
    }
}

fn check_quantity(product_id: ProductId, quantity: u32) -> Result<(), DraftError> {
    if quantity > MAX_QUANTITY {
        return Err(DraftError::QuantityTooLarge {
            product_id,
            quantity,
            max: MAX_QUANTITY,
        });
    }
    Ok(())
}

/// In-progress order
#[derive(Debug)]
pub struct OrderDraft {
    catalog: Arc<CatalogSnapshot>,
    customer: CustomerInfo,
    lines: Vec<OrderLine>,
    delivery_charge: Decimal,
    payment_method: PaymentMethod,
    attachment: Option<PaymentAttachment>,
    remarks: String,
    step: Step,
    submitting: AtomicBool,
}

impl OrderDraft {
    /// New draft on step 1 with one empty line per catalog product
    pub fn new(catalog: Arc<CatalogSnapshot>) -> Self {
        let lines = catalog
            .products()
            .iter()
            .map(|p| OrderLine::empty(p.id))
            .collect();
        Self {
            catalog,
            customer: CustomerInfo::default(),
            lines,
            delivery_charge: Decimal::ZERO,
            payment_method: PaymentMethod::default(),
            attachment: None,
            remarks: String::new(),
            step: Step::default(),
            submitting: AtomicBool::new(false),
        }
    }

    // ========== Step machine ==========

    pub fn step(&self) -> Step {
        self.step
    }

    /// Fields owned by the current step; `None` on the review step
    pub fn step_fields(&self) -> Option<StepFields<'_>> {
        match self.step {
            Step::CustomerInfo => Some(StepFields::Customer(&self.customer)),
            Step::Products => Some(StepFields::Products {
                lines: &self.lines,
                catalog: &self.catalog,
            }),
            Step::Payment => Some(StepFields::Payment {
                delivery_charge: self.delivery_charge,
                attachment: self.attachment.as_ref(),
            }),
            Step::Review => None,
        }
    }

    /// Validates the current step and moves to the next one
    ///
    /// On failure the step is unchanged and every violation is returned.
    /// On the review step this is a no-op.
    pub fn advance(&mut self) -> Result<Step, ValidationErrors> {
        if let Some(fields) = self.step_fields() {
            fields.validate()?;
        }
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Moves back one step without validating; no-op on step 1
    pub fn retreat(&mut self) -> Step {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Runs every rule of every step
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validator::validate_all(self)
    }

    // ========== Customer ==========

    pub fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    pub fn customer_mut(&mut self) -> &mut CustomerInfo {
        &mut self.customer
    }

    pub fn set_customer(&mut self, customer: CustomerInfo) {
        self.customer = customer;
    }

    // ========== Lines ==========

    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn line(&self, product_id: ProductId) -> Option<&OrderLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: ProductId) -> Result<&mut OrderLine, DraftError> {
        self.lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(DraftError::UnknownProduct(product_id))
    }

    /// Sets a line's quantity, at most [`MAX_QUANTITY`]
    ///
    /// The discount is left as is, even when it now exceeds the subtotal
    /// or the quantity drops to zero; validation reports the former.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> Result<(), DraftError> {
        let line = self.line_mut(product_id)?;
        check_quantity(product_id, quantity)?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn increment_quantity(&mut self, product_id: ProductId) -> Result<u32, DraftError> {
        let line = self.line_mut(product_id)?;
        let quantity = line.quantity.saturating_add(1);
        check_quantity(product_id, quantity)?;
        line.quantity = quantity;
        Ok(line.quantity)
    }

    /// Decrements a line's quantity, stopping at zero
    pub fn decrement_quantity(&mut self, product_id: ProductId) -> Result<u32, DraftError> {
        let line = self.line_mut(product_id)?;
        line.quantity = line.quantity.saturating_sub(1);
        Ok(line.quantity)
    }

    /// Sets a line's discount clamped to `[0, subtotal]` and returns what was stored
    pub fn set_discount(
        &mut self,
        product_id: ProductId,
        discount: Decimal,
    ) -> Result<Decimal, DraftError> {
        let unit_price = self
            .catalog
            .unit_price(product_id)
            .ok_or(DraftError::UnknownProduct(product_id))?;
        let line = self.line_mut(product_id)?;
        let subtotal = pricing::line_subtotal(unit_price, line.quantity);
        line.discount = pricing::round_money(discount).clamp(Decimal::ZERO, subtotal);
        Ok(line.discount)
    }

    // ========== Payment ==========

    pub fn delivery_charge(&self) -> Decimal {
        self.delivery_charge
    }

    /// Stored as given; a negative charge is reported by validation
    pub fn set_delivery_charge(&mut self, charge: Decimal) {
        self.delivery_charge = charge;
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    pub fn attachment(&self) -> Option<&PaymentAttachment> {
        self.attachment.as_ref()
    }

    /// Attaches a payment screenshot, releasing any previous one
    pub fn attach_payment_screenshot(&mut self, bytes: Vec<u8>) -> Result<(), DraftError> {
        let attachment = PaymentAttachment::new(bytes)?;
        if let Some(previous) = self.attachment.replace(attachment) {
            tracing::debug!(preview = %previous.preview_path().display(), "Payment attachment replaced");
        }
        Ok(())
    }

    /// Removes the screenshot; returns whether one was attached
    pub fn remove_payment_screenshot(&mut self) -> bool {
        self.attachment.take().is_some()
    }

    pub fn remarks(&self) -> &str {
        &self.remarks
    }

    pub fn set_remarks(&mut self, remarks: impl Into<String>) {
        self.remarks = remarks.into();
    }

    // ========== Derived ==========

    /// Recomputed from the current lines on every call
    pub fn totals(&self) -> DraftTotals {
        pricing::calculate_totals(&self.lines, &self.catalog, self.delivery_charge)
    }

    pub fn breakdown(&self) -> Vec<LineBreakdown> {
        pricing::breakdown(&self.lines, &self.catalog)
    }

    /// Lines with a positive quantity
    pub fn selected_lines(&self) -> impl Iterator<Item = &OrderLine> {
        self.lines.iter().filter(|l| l.quantity > 0)
    }

    // ========== Submission ==========

    /// Submits the draft; see [`crate::submission::submit`]
    pub async fn submit(&self, http: &HttpClient) -> Result<OrderId, SubmitError> {
        crate::submission::submit(self, http).await
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(std::sync::atomic::Ordering::Acquire)
    }

    pub(crate) fn submitting_flag(&self) -> &AtomicBool {
        &self.submitting
    }

    /// Drops the draft and releases its attachment
    pub fn discard(self) {
        tracing::debug!(step = %self.step, "Order draft discarded");
    }
}
