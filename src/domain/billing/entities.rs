use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::BillingError;
use super::value_objects::{
  ApprovalStatus, Discount, GstRates, InvoiceStatus, LineItemDescription, PaymentMode,
  PaymentState, PaymentStatus, Quantity, QuotationStatus, TaxRate, UnitPrice, ValueObjectError,
};

/// Per-line figures feeding document-level totals.
pub trait LineFigures {
  fn line_amount(&self) -> Decimal;
  fn discount_amount(&self) -> Decimal;
  fn tax_amount(&self) -> Decimal;
}

// Quotation line item - single tax rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationLineItem {
  pub id: Uuid,
  pub description: LineItemDescription,
  pub quantity: Quantity,
  pub unit_price: UnitPrice,
  pub discount: Discount,
  pub tax_rate: TaxRate,
  pub tax_amount: Decimal,
  pub total_amount: Decimal,
  pub line_order: i32,
}

impl QuotationLineItem {
  pub fn new(
    description: LineItemDescription,
    quantity: Quantity,
    unit_price: UnitPrice,
    discount: Discount,
    tax_rate: TaxRate,
    line_order: i32,
  ) -> Self {
    let mut item = Self {
      id: Uuid::new_v4(),
      description,
      quantity,
      unit_price,
      discount,
      tax_rate,
      tax_amount: Decimal::ZERO,
      total_amount: Decimal::ZERO,
      line_order,
    };
    item.recalculate();
    item
  }

  pub fn line_amount(&self) -> Decimal {
    self.quantity.value() * self.unit_price.value()
  }

  pub fn discount_amount(&self) -> Decimal {
    self.discount.amount_off(self.line_amount())
  }

  /// Discount applies before tax; tax is charged on the discounted amount.
  pub fn taxable_amount(&self) -> Decimal {
    self.line_amount() - self.discount_amount()
  }

  fn computed_tax(&self) -> Decimal {
    self.taxable_amount() * self.tax_rate.as_multiplier()
  }

  /// Recompute the stored derived fields from the inputs. Idempotent.
  pub fn recalculate(&mut self) {
    self.tax_amount = self.computed_tax();
    self.total_amount = self.taxable_amount() + self.tax_amount;
  }
}

impl LineFigures for QuotationLineItem {
  fn line_amount(&self) -> Decimal {
    QuotationLineItem::line_amount(self)
  }

  fn discount_amount(&self) -> Decimal {
    QuotationLineItem::discount_amount(self)
  }

  fn tax_amount(&self) -> Decimal {
    self.computed_tax()
  }
}

// Invoice line item - GST triple instead of a single rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
  pub id: Uuid,
  pub description: LineItemDescription,
  pub quantity: Quantity,
  pub unit_price: UnitPrice,
  pub discount: Discount,
  pub gst: GstRates,
  pub tax_amount: Decimal,
  pub total_amount: Decimal,
  pub line_order: i32,
}

impl InvoiceLineItem {
  pub fn new(
    description: LineItemDescription,
    quantity: Quantity,
    unit_price: UnitPrice,
    discount: Discount,
    gst: GstRates,
    line_order: i32,
  ) -> Self {
    let mut item = Self {
      id: Uuid::new_v4(),
      description,
      quantity,
      unit_price,
      discount,
      gst,
      tax_amount: Decimal::ZERO,
      total_amount: Decimal::ZERO,
      line_order,
    };
    item.recalculate();
    item
  }

  /// An invoice line carrying a quotation line's figures. The single
  /// quotation rate is split into equal CGST/SGST halves (intra-state),
  /// which preserves the total tax exactly.
  pub fn from_quotation_item(item: &QuotationLineItem) -> Self {
    let half = item.tax_rate.halved();
    Self::new(
      item.description.clone(),
      item.quantity,
      item.unit_price,
      item.discount,
      GstRates::new(half, half, TaxRate::zero()),
      item.line_order,
    )
  }

  pub fn line_amount(&self) -> Decimal {
    self.quantity.value() * self.unit_price.value()
  }

  pub fn discount_amount(&self) -> Decimal {
    self.discount.amount_off(self.line_amount())
  }

  pub fn taxable_amount(&self) -> Decimal {
    self.line_amount() - self.discount_amount()
  }

  fn computed_tax(&self) -> Decimal {
    self.taxable_amount() * self.gst.as_multiplier()
  }

  pub fn recalculate(&mut self) {
    self.tax_amount = self.computed_tax();
    self.total_amount = self.taxable_amount() + self.tax_amount;
  }
}

impl LineFigures for InvoiceLineItem {
  fn line_amount(&self) -> Decimal {
    InvoiceLineItem::line_amount(self)
  }

  fn discount_amount(&self) -> Decimal {
    InvoiceLineItem::discount_amount(self)
  }

  fn tax_amount(&self) -> Decimal {
    self.computed_tax()
  }
}

// Document totals - calculated, stored on the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
  pub subtotal: Decimal,
  pub total_discount: Decimal,
  pub total_tax: Decimal,
  pub grand_total: Decimal,
}

impl DocumentTotals {
  pub fn calculate<T: LineFigures>(items: &[T]) -> Self {
    let subtotal = items.iter().fold(Decimal::ZERO, |acc, i| acc + i.line_amount());
    let total_discount = items
      .iter()
      .fold(Decimal::ZERO, |acc, i| acc + i.discount_amount());
    let total_tax = items.iter().fold(Decimal::ZERO, |acc, i| acc + i.tax_amount());

    Self {
      subtotal,
      total_discount,
      total_tax,
      grand_total: subtotal - total_discount + total_tax,
    }
  }
}

// Quotation - priced offer, convertible to an invoice once approved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
  pub id: Uuid,
  pub client_id: Uuid,
  pub quotation_number: String,
  pub status: QuotationStatus,
  pub approval_status: ApprovalStatus,
  pub items: Vec<QuotationLineItem>,
  pub subtotal: Decimal,
  pub total_discount: Decimal,
  pub total_tax: Decimal,
  pub grand_total: Decimal,
  pub valid_until: Option<DateTime<Utc>>,
  pub converted_to_invoice: Option<Uuid>,
  pub created_by: Uuid,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Quotation {
  pub fn new(
    client_id: Uuid,
    quotation_number: String,
    items: Vec<QuotationLineItem>,
    valid_until: Option<DateTime<Utc>>,
    created_by: Uuid,
  ) -> Self {
    let now = Utc::now();
    let mut quotation = Self {
      id: Uuid::new_v4(),
      client_id,
      quotation_number,
      status: QuotationStatus::Draft,
      approval_status: ApprovalStatus::Pending,
      items,
      subtotal: Decimal::ZERO,
      total_discount: Decimal::ZERO,
      total_tax: Decimal::ZERO,
      grand_total: Decimal::ZERO,
      valid_until,
      converted_to_invoice: None,
      created_by,
      created_at: now,
      updated_at: now,
    };
    quotation.recalculate_totals();
    quotation
  }

  pub fn recalculate_totals(&mut self) {
    for item in &mut self.items {
      item.recalculate();
    }
    let totals = DocumentTotals::calculate(&self.items);
    self.subtotal = totals.subtotal;
    self.total_discount = totals.total_discount;
    self.total_tax = totals.total_tax;
    self.grand_total = totals.grand_total;
  }

  /// Items can only change while the quotation is a draft.
  pub fn replace_items(&mut self, items: Vec<QuotationLineItem>) -> Result<(), BillingError> {
    if !self.status.is_editable() {
      return Err(BillingError::NotEditable {
        current: self.status.as_str().to_string(),
      });
    }
    self.items = items;
    self.recalculate_totals();
    self.touch();
    Ok(())
  }

  pub fn change_status(&mut self, new_status: QuotationStatus) -> Result<(), BillingError> {
    if new_status == QuotationStatus::Converted || !self.status.can_transition_to(new_status) {
      return Err(BillingError::InvalidTransition {
        from: self.status.as_str().to_string(),
        to: new_status.as_str().to_string(),
      });
    }
    self.status = new_status;
    self.touch();
    Ok(())
  }

  /// Move the approval axis. Pending is the only state that accepts a
  /// decision; approved and rejected quotations cannot be re-reviewed.
  pub fn review(&mut self, decision: ApprovalStatus) -> Result<(), BillingError> {
    if !self.approval_status.can_transition_to(decision) {
      return Err(BillingError::InvalidTransition {
        from: self.approval_status.as_str().to_string(),
        to: decision.as_str().to_string(),
      });
    }
    self.approval_status = decision;
    self.touch();
    Ok(())
  }

  pub fn is_editable(&self) -> bool {
    self.status.is_editable()
  }

  /// Produce the invoice for this quotation. Requires an approved quotation
  /// that has not been converted yet; afterwards the quotation is locked in
  /// Converted status with a reference to the new invoice.
  pub fn convert(
    &mut self,
    invoice_number: String,
    due_date: DateTime<Utc>,
  ) -> Result<Invoice, BillingError> {
    if self.approval_status != ApprovalStatus::Approved
      || self.status == QuotationStatus::Converted
    {
      return Err(BillingError::InvalidTransition {
        from: self.status.as_str().to_string(),
        to: QuotationStatus::Converted.as_str().to_string(),
      });
    }

    let items = self
      .items
      .iter()
      .map(InvoiceLineItem::from_quotation_item)
      .collect();

    let mut invoice = Invoice::new(
      self.client_id,
      invoice_number,
      items,
      due_date,
      self.created_by,
    );
    invoice.quotation_id = Some(self.id);

    self.status = QuotationStatus::Converted;
    self.converted_to_invoice = Some(invoice.id);
    self.touch();

    Ok(invoice)
  }

  fn touch(&mut self) {
    self.updated_at = Utc::now();
  }
}

// Invoice - billable document with a payment ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
  pub id: Uuid,
  pub client_id: Uuid,
  pub invoice_number: String,
  pub quotation_id: Option<Uuid>,
  pub status: InvoiceStatus,
  pub payment_status: PaymentStatus,
  pub items: Vec<InvoiceLineItem>,
  pub subtotal: Decimal,
  pub total_discount: Decimal,
  pub total_tax: Decimal,
  pub grand_total: Decimal,
  pub amount_paid: Decimal,
  pub balance_amount: Decimal,
  pub due_date: DateTime<Utc>,
  pub payment_ids: Vec<Uuid>,
  /// Optimistic-concurrency counter; bumped by the repository on update.
  pub version: i64,
  pub created_by: Uuid,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Invoice {
  pub fn new(
    client_id: Uuid,
    invoice_number: String,
    items: Vec<InvoiceLineItem>,
    due_date: DateTime<Utc>,
    created_by: Uuid,
  ) -> Self {
    let now = Utc::now();
    let mut invoice = Self {
      id: Uuid::new_v4(),
      client_id,
      invoice_number,
      quotation_id: None,
      status: InvoiceStatus::Draft,
      payment_status: PaymentStatus::Unpaid,
      items,
      subtotal: Decimal::ZERO,
      total_discount: Decimal::ZERO,
      total_tax: Decimal::ZERO,
      grand_total: Decimal::ZERO,
      amount_paid: Decimal::ZERO,
      balance_amount: Decimal::ZERO,
      due_date,
      payment_ids: Vec::new(),
      version: 0,
      created_by,
      created_at: now,
      updated_at: now,
    };
    invoice.recalculate_totals();
    invoice
  }

  pub fn recalculate_totals(&mut self) {
    for item in &mut self.items {
      item.recalculate();
    }
    let totals = DocumentTotals::calculate(&self.items);
    self.subtotal = totals.subtotal;
    self.total_discount = totals.total_discount;
    self.total_tax = totals.total_tax;
    self.grand_total = totals.grand_total;
    self.balance_amount = self.grand_total - self.amount_paid;
  }

  /// Replace the line items. Recomputes the balance from the existing
  /// amount_paid; recorded payments are never reset by an item edit.
  pub fn replace_items(&mut self, items: Vec<InvoiceLineItem>) -> Result<(), BillingError> {
    if self.payment_status == PaymentStatus::Paid {
      return Err(BillingError::AlreadySettled(self.id));
    }
    if self.status == InvoiceStatus::Cancelled {
      return Err(BillingError::NotEditable {
        current: self.status.as_str().to_string(),
      });
    }

    let mut items = items;
    for item in &mut items {
      item.recalculate();
    }
    let totals = DocumentTotals::calculate(&items);
    if totals.grand_total < self.amount_paid {
      return Err(BillingError::Validation(ValueObjectError::InvalidAmount(
        format!(
          "Grand total {} cannot drop below amount already paid {}",
          totals.grand_total, self.amount_paid
        ),
      )));
    }

    self.items = items;
    self.subtotal = totals.subtotal;
    self.total_discount = totals.total_discount;
    self.total_tax = totals.total_tax;
    self.grand_total = totals.grand_total;
    self.sync_payment_fields();
    self.touch();
    Ok(())
  }

  pub fn change_status(&mut self, new_status: InvoiceStatus) -> Result<(), BillingError> {
    if !self.status.can_transition_to(new_status) {
      return Err(BillingError::InvalidTransition {
        from: self.status.as_str().to_string(),
        to: new_status.as_str().to_string(),
      });
    }
    self.status = new_status;
    self.touch();
    Ok(())
  }

  /// Overdue is a derived label, assigned by the sweep rather than
  /// requested through the explicit transition graph.
  pub fn mark_overdue(&mut self, now: DateTime<Utc>) -> bool {
    if matches!(self.status, InvoiceStatus::Cancelled | InvoiceStatus::Overdue) {
      return false;
    }
    if self.due_date < now && self.payment_status.is_outstanding() {
      self.status = InvoiceStatus::Overdue;
      self.touch();
      return true;
    }
    false
  }

  /// Apply a payment to the ledger. The payment record itself is created by
  /// the caller; this mutates amount_paid, the payment list and the derived
  /// balance/status fields.
  pub fn apply_payment(&mut self, payment: &Payment) -> Result<(), BillingError> {
    if self.status == InvoiceStatus::Cancelled {
      return Err(BillingError::InvalidTransition {
        from: self.status.as_str().to_string(),
        to: InvoiceStatus::Partial.as_str().to_string(),
      });
    }
    if self.payment_status == PaymentStatus::Paid {
      return Err(BillingError::AlreadySettled(self.id));
    }
    if payment.amount > self.balance_amount {
      return Err(BillingError::ExceedsBalance {
        amount: payment.amount,
        balance: self.balance_amount,
      });
    }

    self.amount_paid += payment.amount;
    self.payment_ids.push(payment.id);
    self.sync_payment_fields();
    self.touch();
    Ok(())
  }

  /// Undo a payment. Reversing a payment whose reference is already gone is
  /// a silent no-op; the return value reports whether the ledger changed.
  pub fn reverse_payment(&mut self, payment: &Payment) -> bool {
    let Some(pos) = self.payment_ids.iter().position(|id| *id == payment.id) else {
      return false;
    };
    self.payment_ids.remove(pos);
    self.amount_paid -= payment.amount;
    self.sync_payment_fields();
    self.touch();
    true
  }

  fn sync_payment_fields(&mut self) {
    self.balance_amount = self.grand_total - self.amount_paid;
    self.payment_status = PaymentStatus::derive(self.amount_paid, self.grand_total);
    match self.payment_status {
      PaymentStatus::Paid => self.status = InvoiceStatus::Paid,
      PaymentStatus::Partial => self.status = InvoiceStatus::Partial,
      PaymentStatus::Unpaid => {
        // A fully reversed ledger falls back to Sent
        if matches!(self.status, InvoiceStatus::Partial | InvoiceStatus::Paid) {
          self.status = InvoiceStatus::Sent;
        }
      }
    }
  }

  fn touch(&mut self) {
    self.updated_at = Utc::now();
  }
}

// Payment - independently stored, referenced from the owning invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
  pub id: Uuid,
  pub invoice_id: Uuid,
  pub client_id: Uuid,
  pub amount: Decimal,
  pub payment_mode: PaymentMode,
  pub state: PaymentState,
  pub payment_date: DateTime<Utc>,
  pub reference: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Payment {
  pub fn new(
    invoice: &Invoice,
    amount: Decimal,
    payment_mode: PaymentMode,
    payment_date: DateTime<Utc>,
    reference: Option<String>,
  ) -> Result<Self, BillingError> {
    if amount <= Decimal::ZERO {
      return Err(BillingError::Validation(ValueObjectError::InvalidAmount(
        "Payment amount must be positive".to_string(),
      )));
    }
    let now = Utc::now();
    Ok(Self {
      id: Uuid::new_v4(),
      invoice_id: invoice.id,
      client_id: invoice.client_id,
      amount,
      payment_mode,
      state: PaymentState::Completed,
      payment_date,
      reference,
      created_at: now,
      updated_at: now,
    })
  }

  pub fn cancel(&mut self) {
    self.state = PaymentState::Cancelled;
    self.updated_at = Utc::now();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::billing::value_objects::DiscountType;
  use chrono::Duration;
  use rust_decimal_macros::dec;

  fn description(text: &str) -> LineItemDescription {
    LineItemDescription::new(text.to_string()).unwrap()
  }

  fn quotation_item(
    qty: Decimal,
    price: Decimal,
    discount: Decimal,
    discount_type: DiscountType,
    tax_rate: Decimal,
  ) -> QuotationLineItem {
    QuotationLineItem::new(
      description("Service visit"),
      Quantity::new(qty).unwrap(),
      UnitPrice::new(price).unwrap(),
      Discount::new(discount, discount_type).unwrap(),
      TaxRate::new(tax_rate).unwrap(),
      1,
    )
  }

  fn invoice_item(qty: Decimal, price: Decimal) -> InvoiceLineItem {
    InvoiceLineItem::new(
      description("Installation"),
      Quantity::new(qty).unwrap(),
      UnitPrice::new(price).unwrap(),
      Discount::none(),
      GstRates::default(),
      1,
    )
  }

  fn sample_invoice(items: Vec<InvoiceLineItem>) -> Invoice {
    Invoice::new(
      Uuid::new_v4(),
      "INV-1001".to_string(),
      items,
      Utc::now() + Duration::days(30),
      Uuid::new_v4(),
    )
  }

  fn completed_payment(invoice: &Invoice, amount: Decimal) -> Payment {
    Payment::new(invoice, amount, PaymentMode::BankTransfer, Utc::now(), None).unwrap()
  }

  #[test]
  fn test_line_total_law_percentage_discount() {
    let item = quotation_item(dec!(2), dec!(500), dec!(10), DiscountType::Percentage, dec!(18));
    // line 1000, discount 100, taxable 900, tax 162
    assert_eq!(item.line_amount(), dec!(1000));
    assert_eq!(item.discount_amount(), dec!(100));
    assert_eq!(item.tax_amount, dec!(162));
    assert_eq!(
      item.total_amount,
      item.line_amount() - item.discount_amount() + item.tax_amount
    );
  }

  #[test]
  fn test_line_total_law_fixed_discount() {
    let item = quotation_item(dec!(3), dec!(400), dec!(150), DiscountType::Fixed, dec!(5));
    // line 1200, discount 150, taxable 1050, tax 52.50
    assert_eq!(item.discount_amount(), dec!(150));
    assert_eq!(item.tax_amount, dec!(52.50));
    assert_eq!(
      item.total_amount,
      item.line_amount() - item.discount_amount() + item.tax_amount
    );
  }

  #[test]
  fn test_invoice_line_uses_gst_triple() {
    let item = invoice_item(dec!(1), dec!(10000));
    // default 9/9/0 over 10000
    assert_eq!(item.tax_amount, dec!(1800));
    assert_eq!(item.total_amount, dec!(11800));
  }

  #[test]
  fn test_document_totals_law() {
    let items = vec![
      quotation_item(dec!(2), dec!(500), dec!(10), DiscountType::Percentage, dec!(18)),
      quotation_item(dec!(1), dec!(300), dec!(50), DiscountType::Fixed, dec!(12)),
    ];
    let totals = DocumentTotals::calculate(&items);

    assert_eq!(totals.subtotal, dec!(1300));
    assert_eq!(totals.total_discount, dec!(150));
    assert_eq!(totals.total_tax, dec!(192)); // 162 + 30
    assert_eq!(
      totals.grand_total,
      totals.subtotal - totals.total_discount + totals.total_tax
    );
  }

  #[test]
  fn test_recalculation_is_idempotent() {
    let mut quotation = Quotation::new(
      Uuid::new_v4(),
      "QT-42".to_string(),
      vec![quotation_item(dec!(2), dec!(500), dec!(10), DiscountType::Percentage, dec!(18))],
      None,
      Uuid::new_v4(),
    );
    let before = (
      quotation.subtotal,
      quotation.total_discount,
      quotation.total_tax,
      quotation.grand_total,
    );
    quotation.recalculate_totals();
    quotation.recalculate_totals();
    let after = (
      quotation.subtotal,
      quotation.total_discount,
      quotation.total_tax,
      quotation.grand_total,
    );
    assert_eq!(before, after);
  }

  #[test]
  fn test_quotation_items_editable_only_in_draft() {
    let mut quotation = Quotation::new(
      Uuid::new_v4(),
      "QT-43".to_string(),
      vec![quotation_item(dec!(1), dec!(100), dec!(0), DiscountType::Fixed, dec!(18))],
      None,
      Uuid::new_v4(),
    );

    assert!(quotation
      .replace_items(vec![quotation_item(dec!(2), dec!(100), dec!(0), DiscountType::Fixed, dec!(18))])
      .is_ok());
    assert_eq!(quotation.subtotal, dec!(200));

    quotation.change_status(QuotationStatus::Sent).unwrap();
    let err = quotation
      .replace_items(vec![quotation_item(dec!(3), dec!(100), dec!(0), DiscountType::Fixed, dec!(18))])
      .unwrap_err();
    assert!(matches!(err, BillingError::NotEditable { .. }));
  }

  #[test]
  fn test_quotation_cannot_skip_states() {
    let mut quotation = Quotation::new(
      Uuid::new_v4(),
      "QT-44".to_string(),
      vec![quotation_item(dec!(1), dec!(100), dec!(0), DiscountType::Fixed, dec!(18))],
      None,
      Uuid::new_v4(),
    );
    let err = quotation.change_status(QuotationStatus::Accepted).unwrap_err();
    assert!(matches!(err, BillingError::InvalidTransition { .. }));
  }

  #[test]
  fn test_approval_is_single_shot() {
    let mut quotation = Quotation::new(
      Uuid::new_v4(),
      "QT-45".to_string(),
      vec![quotation_item(dec!(1), dec!(100), dec!(0), DiscountType::Fixed, dec!(18))],
      None,
      Uuid::new_v4(),
    );
    quotation.review(ApprovalStatus::Approved).unwrap();
    assert!(quotation.review(ApprovalStatus::Rejected).is_err());
    assert!(quotation.review(ApprovalStatus::Approved).is_err());
  }

  #[test]
  fn test_convert_requires_approval() {
    let mut quotation = Quotation::new(
      Uuid::new_v4(),
      "QT-46".to_string(),
      vec![quotation_item(dec!(1), dec!(100), dec!(0), DiscountType::Fixed, dec!(18))],
      None,
      Uuid::new_v4(),
    );
    let due = Utc::now() + Duration::days(15);

    let err = quotation.convert("INV-1".to_string(), due).unwrap_err();
    assert!(matches!(err, BillingError::InvalidTransition { .. }));

    quotation.review(ApprovalStatus::Approved).unwrap();
    let invoice = quotation.convert("INV-1".to_string(), due).unwrap();

    assert_eq!(quotation.status, QuotationStatus::Converted);
    assert_eq!(quotation.converted_to_invoice, Some(invoice.id));
    assert_eq!(invoice.quotation_id, Some(quotation.id));

    // Converting twice fails
    assert!(quotation.convert("INV-2".to_string(), due).is_err());
  }

  #[test]
  fn test_convert_preserves_totals_exactly() {
    let mut quotation = Quotation::new(
      Uuid::new_v4(),
      "QT-47".to_string(),
      vec![
        quotation_item(dec!(2), dec!(500), dec!(10), DiscountType::Percentage, dec!(18)),
        quotation_item(dec!(1), dec!(300), dec!(50), DiscountType::Fixed, dec!(12)),
      ],
      None,
      Uuid::new_v4(),
    );
    quotation.review(ApprovalStatus::Approved).unwrap();
    let invoice = quotation
      .convert("INV-9".to_string(), Utc::now() + Duration::days(15))
      .unwrap();

    assert_eq!(invoice.items.len(), quotation.items.len());
    assert_eq!(invoice.subtotal, quotation.subtotal);
    assert_eq!(invoice.total_discount, quotation.total_discount);
    assert_eq!(invoice.total_tax, quotation.total_tax);
    assert_eq!(invoice.grand_total, quotation.grand_total);
  }

  #[test]
  fn test_payment_scenario_partial_then_settled() {
    // grand total 11800 = 10000 subtotal + 1800 tax
    let mut invoice = sample_invoice(vec![invoice_item(dec!(1), dec!(10000))]);
    assert_eq!(invoice.grand_total, dec!(11800));
    assert_eq!(invoice.balance_amount, dec!(11800));

    let first = completed_payment(&invoice, dec!(5000));
    invoice.apply_payment(&first).unwrap();
    assert_eq!(invoice.balance_amount, dec!(6800));
    assert_eq!(invoice.payment_status, PaymentStatus::Partial);
    assert_eq!(invoice.status, InvoiceStatus::Partial);

    let second = completed_payment(&invoice, dec!(6800));
    invoice.apply_payment(&second).unwrap();
    assert_eq!(invoice.balance_amount, dec!(0));
    assert_eq!(invoice.payment_status, PaymentStatus::Paid);
    assert_eq!(invoice.status, InvoiceStatus::Paid);

    let third = completed_payment(&invoice, dec!(1));
    let err = invoice.apply_payment(&third).unwrap_err();
    assert!(matches!(err, BillingError::AlreadySettled(_)));
  }

  #[test]
  fn test_payment_exceeding_balance_is_rejected() {
    let mut invoice = sample_invoice(vec![invoice_item(dec!(1), dec!(10000))]);
    let payment = completed_payment(&invoice, dec!(11800.01));
    let err = invoice.apply_payment(&payment).unwrap_err();
    assert!(matches!(err, BillingError::ExceedsBalance { .. }));
    assert_eq!(invoice.amount_paid, dec!(0));
  }

  #[test]
  fn test_exact_balance_payment_settles() {
    let mut invoice = sample_invoice(vec![invoice_item(dec!(1), dec!(10000))]);
    let payment = completed_payment(&invoice, dec!(11800));
    invoice.apply_payment(&payment).unwrap();
    assert_eq!(invoice.payment_status, PaymentStatus::Paid);
    assert_eq!(invoice.balance_amount, dec!(0));
  }

  #[test]
  fn test_reverse_payment_round_trip() {
    let mut invoice = sample_invoice(vec![invoice_item(dec!(1), dec!(10000))]);
    let before = (
      invoice.amount_paid,
      invoice.balance_amount,
      invoice.payment_status,
    );

    let payment = completed_payment(&invoice, dec!(5000));
    invoice.apply_payment(&payment).unwrap();
    assert!(invoice.reverse_payment(&payment));

    assert_eq!(
      (
        invoice.amount_paid,
        invoice.balance_amount,
        invoice.payment_status
      ),
      before
    );
    assert!(invoice.payment_ids.is_empty());
  }

  #[test]
  fn test_double_reversal_is_a_no_op() {
    let mut invoice = sample_invoice(vec![invoice_item(dec!(1), dec!(10000))]);
    let payment = completed_payment(&invoice, dec!(5000));
    invoice.apply_payment(&payment).unwrap();

    assert!(invoice.reverse_payment(&payment));
    let snapshot = invoice.clone();
    assert!(!invoice.reverse_payment(&payment));
    assert_eq!(invoice.amount_paid, snapshot.amount_paid);
    assert_eq!(invoice.balance_amount, snapshot.balance_amount);
  }

  #[test]
  fn test_full_reversal_falls_back_to_sent() {
    let mut invoice = sample_invoice(vec![invoice_item(dec!(1), dec!(10000))]);
    let payment = completed_payment(&invoice, dec!(11800));
    invoice.apply_payment(&payment).unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);

    invoice.reverse_payment(&payment);
    assert_eq!(invoice.payment_status, PaymentStatus::Unpaid);
    assert_eq!(invoice.status, InvoiceStatus::Sent);
  }

  #[test]
  fn test_item_edit_keeps_existing_payments() {
    let mut invoice = sample_invoice(vec![invoice_item(dec!(1), dec!(10000))]);
    let payment = completed_payment(&invoice, dec!(5000));
    invoice.apply_payment(&payment).unwrap();

    invoice
      .replace_items(vec![invoice_item(dec!(2), dec!(10000))])
      .unwrap();
    assert_eq!(invoice.grand_total, dec!(23600));
    assert_eq!(invoice.amount_paid, dec!(5000));
    assert_eq!(invoice.balance_amount, dec!(18600));
    assert_eq!(invoice.payment_status, PaymentStatus::Partial);
  }

  #[test]
  fn test_item_edit_cannot_undercut_amount_paid() {
    let mut invoice = sample_invoice(vec![invoice_item(dec!(1), dec!(10000))]);
    let payment = completed_payment(&invoice, dec!(5000));
    invoice.apply_payment(&payment).unwrap();

    let err = invoice
      .replace_items(vec![invoice_item(dec!(1), dec!(100))])
      .unwrap_err();
    assert!(matches!(err, BillingError::Validation(_)));
  }

  #[test]
  fn test_settled_invoice_items_are_immutable() {
    let mut invoice = sample_invoice(vec![invoice_item(dec!(1), dec!(10000))]);
    let payment = completed_payment(&invoice, dec!(11800));
    invoice.apply_payment(&payment).unwrap();

    let err = invoice
      .replace_items(vec![invoice_item(dec!(3), dec!(10000))])
      .unwrap_err();
    assert!(matches!(err, BillingError::AlreadySettled(_)));
  }

  #[test]
  fn test_mark_overdue() {
    let mut invoice = Invoice::new(
      Uuid::new_v4(),
      "INV-7".to_string(),
      vec![invoice_item(dec!(1), dec!(1000))],
      Utc::now() - Duration::days(2),
      Uuid::new_v4(),
    );
    invoice.change_status(InvoiceStatus::Sent).unwrap();

    assert!(invoice.mark_overdue(Utc::now()));
    assert_eq!(invoice.status, InvoiceStatus::Overdue);
    // Second sweep leaves it alone
    assert!(!invoice.mark_overdue(Utc::now()));
  }

  #[test]
  fn test_paid_invoice_is_never_overdue() {
    let mut invoice = Invoice::new(
      Uuid::new_v4(),
      "INV-8".to_string(),
      vec![invoice_item(dec!(1), dec!(1000))],
      Utc::now() - Duration::days(2),
      Uuid::new_v4(),
    );
    let payment = completed_payment(&invoice, dec!(1180));
    invoice.apply_payment(&payment).unwrap();

    assert!(!invoice.mark_overdue(Utc::now()));
    assert_eq!(invoice.status, InvoiceStatus::Paid);
  }

  #[test]
  fn test_cancel_only_from_draft_or_sent() {
    let mut invoice = sample_invoice(vec![invoice_item(dec!(1), dec!(1000))]);
    let payment = completed_payment(&invoice, dec!(500));
    invoice.apply_payment(&payment).unwrap();
    assert!(invoice.change_status(InvoiceStatus::Cancelled).is_err());

    let mut fresh = sample_invoice(vec![invoice_item(dec!(1), dec!(1000))]);
    assert!(fresh.change_status(InvoiceStatus::Cancelled).is_ok());
  }

  #[test]
  fn test_payment_amount_must_be_positive() {
    let invoice = sample_invoice(vec![invoice_item(dec!(1), dec!(1000))]);
    assert!(Payment::new(&invoice, dec!(0), PaymentMode::Cash, Utc::now(), None).is_err());
    assert!(Payment::new(&invoice, dec!(-5), PaymentMode::Cash, Utc::now(), None).is_err());
  }
}
