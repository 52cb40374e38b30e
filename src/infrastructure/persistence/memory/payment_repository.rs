use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::billing::entities::Payment;
use crate::domain::billing::errors::BillingError;
use crate::domain::billing::ports::PaymentRepository;

#[derive(Default)]
pub struct InMemoryPaymentRepository {
  payments: RwLock<HashMap<Uuid, Payment>>,
}

impl InMemoryPaymentRepository {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
  async fn create(&self, payment: Payment) -> Result<Payment, BillingError> {
    let mut payments = self.payments.write().unwrap();
    payments.insert(payment.id, payment.clone());
    Ok(payment)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, BillingError> {
    let payments = self.payments.read().unwrap();
    Ok(payments.get(&id).cloned())
  }

  async fn find_by_invoice(&self, invoice_id: Uuid) -> Result<Vec<Payment>, BillingError> {
    let payments = self.payments.read().unwrap();
    Ok(
      payments
        .values()
        .filter(|p| p.invoice_id == invoice_id)
        .cloned()
        .collect(),
    )
  }

  async fn delete(&self, id: Uuid) -> Result<(), BillingError> {
    let mut payments = self.payments.write().unwrap();
    payments.remove(&id);
    Ok(())
  }
}
