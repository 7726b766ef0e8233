//! Portfolio persistence port trait.

use crate::domain::error::RebalanceError;
use crate::domain::portfolio::Portfolio;

/// Durable storage for a portfolio snapshot. The storage location is state
/// of the implementing adapter, fixed at construction.
pub trait StorePort {
    fn load(&self) -> Result<Portfolio, RebalanceError>;

    fn save(&self, portfolio: &Portfolio) -> Result<(), RebalanceError>;

    fn exists(&self) -> bool;
}
