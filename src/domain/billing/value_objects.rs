use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("Invalid quantity: {0}")]
  InvalidQuantity(String),
  #[error("Invalid amount: {0}")]
  InvalidAmount(String),
  #[error("Invalid discount: {0}")]
  InvalidDiscount(String),
  #[error("Invalid tax rate: {0}")]
  InvalidTaxRate(String),
  #[error("Invalid line item description: {0}")]
  InvalidDescription(String),
  #[error("Invalid status: {0}")]
  InvalidStatus(String),
  #[error("Invalid payment mode: {0}")]
  InvalidPaymentMode(String),
}

// Quantity - whole or fractional units, at least one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity(Decimal);

impl Quantity {
  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    if value < Decimal::ONE {
      return Err(ValueObjectError::InvalidQuantity(
        "Quantity must be at least 1".to_string(),
      ));
    }
    Ok(Self(value))
  }

  pub fn value(&self) -> Decimal {
    self.0
  }
}

// Unit price - non-negative money amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPrice(Decimal);

impl UnitPrice {
  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    if value.is_sign_negative() {
      return Err(ValueObjectError::InvalidAmount(
        "Unit price cannot be negative".to_string(),
      ));
    }
    Ok(Self(value))
  }

  pub fn value(&self) -> Decimal {
    self.0
  }
}

// Line Item Description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemDescription(String);

impl LineItemDescription {
  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidDescription(
        "Description cannot be empty".to_string(),
      ));
    }
    if trimmed.len() > 500 {
      return Err(ValueObjectError::InvalidDescription(
        "Description cannot exceed 500 characters".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

// Discount type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
  Percentage,
  Fixed,
}

impl DiscountType {
  pub fn as_str(&self) -> &'static str {
    match self {
      DiscountType::Percentage => "percentage",
      DiscountType::Fixed => "fixed",
    }
  }
}

impl FromStr for DiscountType {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "percentage" => Ok(DiscountType::Percentage),
      "fixed" => Ok(DiscountType::Fixed),
      _ => Err(ValueObjectError::InvalidDiscount(format!(
        "Unknown discount type: {}",
        s
      ))),
    }
  }
}

// Discount - percentage of the line amount or a fixed deduction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
  value: Decimal,
  discount_type: DiscountType,
}

impl Discount {
  pub fn new(value: Decimal, discount_type: DiscountType) -> Result<Self, ValueObjectError> {
    if value.is_sign_negative() {
      return Err(ValueObjectError::InvalidDiscount(
        "Discount cannot be negative".to_string(),
      ));
    }
    if discount_type == DiscountType::Percentage && value > Decimal::from(100) {
      return Err(ValueObjectError::InvalidDiscount(
        "Percentage discount cannot exceed 100".to_string(),
      ));
    }
    Ok(Self {
      value,
      discount_type,
    })
  }

  pub fn none() -> Self {
    Self {
      value: Decimal::ZERO,
      discount_type: DiscountType::Fixed,
    }
  }

  pub fn value(&self) -> Decimal {
    self.value
  }

  pub fn discount_type(&self) -> DiscountType {
    self.discount_type
  }

  /// Amount deducted from the given pre-tax line amount.
  pub fn amount_off(&self, line_amount: Decimal) -> Decimal {
    match self.discount_type {
      DiscountType::Percentage => line_amount * self.value / Decimal::from(100),
      DiscountType::Fixed => self.value,
    }
  }
}

// Tax rate - percent of the taxable amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(Decimal);

impl TaxRate {
  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    if value < Decimal::ZERO || value > Decimal::from(100) {
      return Err(ValueObjectError::InvalidTaxRate(
        "Tax rate must be between 0 and 100".to_string(),
      ));
    }
    Ok(Self(value))
  }

  pub fn zero() -> Self {
    Self(Decimal::ZERO)
  }

  pub fn value(&self) -> Decimal {
    self.0
  }

  pub fn as_multiplier(&self) -> Decimal {
    self.0 / Decimal::from(100)
  }

  /// Half of this rate; used when splitting a single rate into equal
  /// CGST/SGST components.
  pub fn halved(&self) -> TaxRate {
    TaxRate(self.0 / Decimal::from(2))
  }
}

// GST rate triple for invoice line items. Intra-state default is 9/9/0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstRates {
  pub cgst: TaxRate,
  pub sgst: TaxRate,
  pub igst: TaxRate,
}

impl GstRates {
  pub fn new(cgst: TaxRate, sgst: TaxRate, igst: TaxRate) -> Self {
    Self { cgst, sgst, igst }
  }

  pub fn total_rate(&self) -> Decimal {
    self.cgst.value() + self.sgst.value() + self.igst.value()
  }

  pub fn as_multiplier(&self) -> Decimal {
    self.total_rate() / Decimal::from(100)
  }
}

impl Default for GstRates {
  fn default() -> Self {
    Self {
      cgst: TaxRate(Decimal::from(9)),
      sgst: TaxRate(Decimal::from(9)),
      igst: TaxRate(Decimal::ZERO),
    }
  }
}

// Quotation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotationStatus {
  Draft,
  Sent,
  Viewed,
  Accepted,
  Rejected,
  Expired,
  Converted,
}

impl QuotationStatus {
  /// Legal explicit transitions. Conversion is handled by
  /// `Quotation::convert`, which additionally requires approval.
  pub fn can_transition_to(&self, new_status: QuotationStatus) -> bool {
    match (self, new_status) {
      (QuotationStatus::Draft, QuotationStatus::Sent) => true,
      (QuotationStatus::Sent, QuotationStatus::Viewed) => true,
      (QuotationStatus::Viewed, QuotationStatus::Accepted) => true,
      (QuotationStatus::Viewed, QuotationStatus::Rejected) => true,
      (QuotationStatus::Viewed, QuotationStatus::Expired) => true,
      _ => false,
    }
  }

  pub fn is_editable(&self) -> bool {
    matches!(self, QuotationStatus::Draft)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      QuotationStatus::Draft => "draft",
      QuotationStatus::Sent => "sent",
      QuotationStatus::Viewed => "viewed",
      QuotationStatus::Accepted => "accepted",
      QuotationStatus::Rejected => "rejected",
      QuotationStatus::Expired => "expired",
      QuotationStatus::Converted => "converted",
    }
  }
}

impl FromStr for QuotationStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "draft" => Ok(QuotationStatus::Draft),
      "sent" => Ok(QuotationStatus::Sent),
      "viewed" => Ok(QuotationStatus::Viewed),
      "accepted" => Ok(QuotationStatus::Accepted),
      "rejected" => Ok(QuotationStatus::Rejected),
      "expired" => Ok(QuotationStatus::Expired),
      "converted" => Ok(QuotationStatus::Converted),
      _ => Err(ValueObjectError::InvalidStatus(format!(
        "Unknown quotation status: {}",
        s
      ))),
    }
  }
}

// Approval axis, independent of quotation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
  Pending,
  Approved,
  Rejected,
}

impl ApprovalStatus {
  /// Approved and Rejected are terminal.
  pub fn can_transition_to(&self, new_status: ApprovalStatus) -> bool {
    matches!(
      (self, new_status),
      (ApprovalStatus::Pending, ApprovalStatus::Approved)
        | (ApprovalStatus::Pending, ApprovalStatus::Rejected)
    )
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      ApprovalStatus::Pending => "pending",
      ApprovalStatus::Approved => "approved",
      ApprovalStatus::Rejected => "rejected",
    }
  }
}

impl FromStr for ApprovalStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "pending" => Ok(ApprovalStatus::Pending),
      "approved" => Ok(ApprovalStatus::Approved),
      "rejected" => Ok(ApprovalStatus::Rejected),
      _ => Err(ValueObjectError::InvalidStatus(format!(
        "Unknown approval status: {}",
        s
      ))),
    }
  }
}

// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
  Draft,
  Sent,
  Partial,
  Paid,
  Overdue,
  Cancelled,
}

impl InvoiceStatus {
  /// Legal explicit transitions (send, cancel, overdue flagging).
  /// Payment-driven moves to Partial/Paid are derived from the ledger in
  /// `Invoice::sync_payment_fields`, not requested through this graph.
  pub fn can_transition_to(&self, new_status: InvoiceStatus) -> bool {
    match (self, new_status) {
      (InvoiceStatus::Draft, InvoiceStatus::Sent) => true,
      (InvoiceStatus::Draft, InvoiceStatus::Cancelled) => true,
      (InvoiceStatus::Sent, InvoiceStatus::Cancelled) => true,
      (InvoiceStatus::Sent, InvoiceStatus::Overdue) => true,
      (InvoiceStatus::Partial, InvoiceStatus::Overdue) => true,
      _ => false,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      InvoiceStatus::Draft => "draft",
      InvoiceStatus::Sent => "sent",
      InvoiceStatus::Partial => "partial",
      InvoiceStatus::Paid => "paid",
      InvoiceStatus::Overdue => "overdue",
      InvoiceStatus::Cancelled => "cancelled",
    }
  }
}

impl FromStr for InvoiceStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "draft" => Ok(InvoiceStatus::Draft),
      "sent" => Ok(InvoiceStatus::Sent),
      "partial" => Ok(InvoiceStatus::Partial),
      "paid" => Ok(InvoiceStatus::Paid),
      "overdue" => Ok(InvoiceStatus::Overdue),
      "cancelled" => Ok(InvoiceStatus::Cancelled),
      _ => Err(ValueObjectError::InvalidStatus(format!(
        "Unknown invoice status: {}",
        s
      ))),
    }
  }
}

// Payment status - pure function of amount_paid vs grand_total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Unpaid,
  Partial,
  Paid,
}

impl PaymentStatus {
  pub fn derive(amount_paid: Decimal, grand_total: Decimal) -> Self {
    if amount_paid <= Decimal::ZERO {
      PaymentStatus::Unpaid
    } else if amount_paid >= grand_total {
      PaymentStatus::Paid
    } else {
      PaymentStatus::Partial
    }
  }

  pub fn is_outstanding(&self) -> bool {
    matches!(self, PaymentStatus::Unpaid | PaymentStatus::Partial)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      PaymentStatus::Unpaid => "unpaid",
      PaymentStatus::Partial => "partial",
      PaymentStatus::Paid => "paid",
    }
  }
}

impl FromStr for PaymentStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "unpaid" => Ok(PaymentStatus::Unpaid),
      "partial" => Ok(PaymentStatus::Partial),
      "paid" => Ok(PaymentStatus::Paid),
      _ => Err(ValueObjectError::InvalidStatus(format!(
        "Unknown payment status: {}",
        s
      ))),
    }
  }
}

// Payment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
  Cash,
  Cheque,
  BankTransfer,
  Upi,
  Card,
  Online,
}

impl PaymentMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      PaymentMode::Cash => "cash",
      PaymentMode::Cheque => "cheque",
      PaymentMode::BankTransfer => "bank_transfer",
      PaymentMode::Upi => "upi",
      PaymentMode::Card => "card",
      PaymentMode::Online => "online",
    }
  }
}

impl FromStr for PaymentMode {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "cash" => Ok(PaymentMode::Cash),
      "cheque" => Ok(PaymentMode::Cheque),
      "bank_transfer" => Ok(PaymentMode::BankTransfer),
      "upi" => Ok(PaymentMode::Upi),
      "card" => Ok(PaymentMode::Card),
      "online" => Ok(PaymentMode::Online),
      _ => Err(ValueObjectError::InvalidPaymentMode(format!(
        "Unknown payment mode: {}",
        s
      ))),
    }
  }
}

impl fmt::Display for PaymentMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

// Lifecycle of an individual payment record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
  Pending,
  Completed,
  Failed,
  Cancelled,
}

impl PaymentState {
  pub fn as_str(&self) -> &'static str {
    match self {
      PaymentState::Pending => "pending",
      PaymentState::Completed => "completed",
      PaymentState::Failed => "failed",
      PaymentState::Cancelled => "cancelled",
    }
  }
}

impl FromStr for PaymentState {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "pending" => Ok(PaymentState::Pending),
      "completed" => Ok(PaymentState::Completed),
      "failed" => Ok(PaymentState::Failed),
      "cancelled" => Ok(PaymentState::Cancelled),
      _ => Err(ValueObjectError::InvalidStatus(format!(
        "Unknown payment state: {}",
        s
      ))),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  #[test]
  fn test_quantity() {
    assert!(Quantity::new(dec!(1)).is_ok());
    assert!(Quantity::new(dec!(2.5)).is_ok());
    assert!(Quantity::new(dec!(0)).is_err());
    assert!(Quantity::new(dec!(-1)).is_err());
  }

  #[test]
  fn test_discount_amount_off() {
    let pct = Discount::new(dec!(10), DiscountType::Percentage).unwrap();
    assert_eq!(pct.amount_off(dec!(200)), dec!(20));

    let fixed = Discount::new(dec!(15), DiscountType::Fixed).unwrap();
    assert_eq!(fixed.amount_off(dec!(200)), dec!(15));
  }

  #[test]
  fn test_discount_validation() {
    assert!(Discount::new(dec!(-1), DiscountType::Fixed).is_err());
    assert!(Discount::new(dec!(101), DiscountType::Percentage).is_err());
    assert!(Discount::new(dec!(100), DiscountType::Percentage).is_ok());
    // Fixed discounts above 100 are fine, they are money not percent
    assert!(Discount::new(dec!(500), DiscountType::Fixed).is_ok());
  }

  #[test]
  fn test_gst_default_is_nine_nine_zero() {
    let gst = GstRates::default();
    assert_eq!(gst.cgst.value(), dec!(9));
    assert_eq!(gst.sgst.value(), dec!(9));
    assert_eq!(gst.igst.value(), dec!(0));
    assert_eq!(gst.total_rate(), dec!(18));
  }

  #[test]
  fn test_quotation_status_transitions() {
    assert!(QuotationStatus::Draft.can_transition_to(QuotationStatus::Sent));
    assert!(QuotationStatus::Sent.can_transition_to(QuotationStatus::Viewed));
    assert!(QuotationStatus::Viewed.can_transition_to(QuotationStatus::Accepted));
    assert!(QuotationStatus::Viewed.can_transition_to(QuotationStatus::Rejected));
    assert!(QuotationStatus::Viewed.can_transition_to(QuotationStatus::Expired));

    assert!(!QuotationStatus::Draft.can_transition_to(QuotationStatus::Viewed));
    assert!(!QuotationStatus::Accepted.can_transition_to(QuotationStatus::Sent));
    assert!(!QuotationStatus::Converted.can_transition_to(QuotationStatus::Sent));
  }

  #[test]
  fn test_approval_status_is_terminal() {
    assert!(ApprovalStatus::Pending.can_transition_to(ApprovalStatus::Approved));
    assert!(ApprovalStatus::Pending.can_transition_to(ApprovalStatus::Rejected));
    assert!(!ApprovalStatus::Approved.can_transition_to(ApprovalStatus::Rejected));
    assert!(!ApprovalStatus::Approved.can_transition_to(ApprovalStatus::Approved));
    assert!(!ApprovalStatus::Rejected.can_transition_to(ApprovalStatus::Approved));
  }

  #[test]
  fn test_invoice_status_transitions() {
    assert!(InvoiceStatus::Draft.can_transition_to(InvoiceStatus::Sent));
    assert!(InvoiceStatus::Draft.can_transition_to(InvoiceStatus::Cancelled));
    assert!(InvoiceStatus::Sent.can_transition_to(InvoiceStatus::Cancelled));
    assert!(InvoiceStatus::Sent.can_transition_to(InvoiceStatus::Overdue));
    assert!(InvoiceStatus::Partial.can_transition_to(InvoiceStatus::Overdue));

    // Paid invoices cannot be cancelled
    assert!(!InvoiceStatus::Paid.can_transition_to(InvoiceStatus::Cancelled));
    assert!(!InvoiceStatus::Partial.can_transition_to(InvoiceStatus::Cancelled));
    assert!(!InvoiceStatus::Overdue.can_transition_to(InvoiceStatus::Sent));
  }

  #[test]
  fn test_payment_status_derivation() {
    assert_eq!(
      PaymentStatus::derive(dec!(0), dec!(11800)),
      PaymentStatus::Unpaid
    );
    assert_eq!(
      PaymentStatus::derive(dec!(5000), dec!(11800)),
      PaymentStatus::Partial
    );
    assert_eq!(
      PaymentStatus::derive(dec!(11800), dec!(11800)),
      PaymentStatus::Paid
    );
    assert_eq!(
      PaymentStatus::derive(dec!(12000), dec!(11800)),
      PaymentStatus::Paid
    );
    // Zero-value invoice with no payments stays unpaid
    assert_eq!(PaymentStatus::derive(dec!(0), dec!(0)), PaymentStatus::Unpaid);
  }

  #[test]
  fn test_status_round_trip() {
    for s in [
      QuotationStatus::Draft,
      QuotationStatus::Sent,
      QuotationStatus::Viewed,
      QuotationStatus::Accepted,
      QuotationStatus::Rejected,
      QuotationStatus::Expired,
      QuotationStatus::Converted,
    ] {
      assert_eq!(QuotationStatus::from_str(s.as_str()).unwrap(), s);
    }
    assert!(QuotationStatus::from_str("archived").is_err());
  }
}
