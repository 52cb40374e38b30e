use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::entities::AmcContract;
use super::errors::AmcError;

#[async_trait]
pub trait AmcRepository: Send + Sync {
  async fn create(&self, contract: AmcContract) -> Result<AmcContract, AmcError>;
  async fn update(&self, contract: AmcContract) -> Result<AmcContract, AmcError>;
  async fn find_by_id(&self, id: Uuid) -> Result<Option<AmcContract>, AmcError>;
  async fn find_by_client(&self, client_id: Uuid) -> Result<Vec<AmcContract>, AmcError>;

  /// Active contracts ending on or before the cutoff. Feeds both the
  /// renewal-reminder window and the expiry sweep.
  async fn find_active_ending_before(
    &self,
    cutoff: DateTime<Utc>,
  ) -> Result<Vec<AmcContract>, AmcError>;
}
