//! Payment service: one payment per order, delete-protected once approved.
//!
//! The amount is snapshotted from the order total when the payment is
//! created and never recomputed afterward; later line mutations on a
//! pending order do not chase the payment.

use crate::store::{Store, UnitOfWork};
use storefront_core::{
    Error, Order, OrderId, Payment, PaymentId, PaymentMethod, PaymentStatus, Result,
};
use chrono::{DateTime, Utc};
use tracing::info;

/// Payment lifecycle operations.
#[derive(Debug, Clone)]
pub struct PaymentService<S> {
    store: S,
}

impl<S: Store> PaymentService<S> {
    /// Create the service over a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Create the payment for an order, snapshotting its total.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the order does not exist.
    /// - [`Error::DuplicatePayment`] if the order already has one.
    /// - [`Error::Store`] on storage failure.
    pub async fn create(&self, order_id: OrderId, method: PaymentMethod) -> Result<Payment> {
        let mut uow = self.store.begin().await?;

        let order: Order = uow
            .order(order_id)
            .await?
            .ok_or_else(|| Error::not_found("order", order_id))?;

        if uow.payment_for_order(order_id).await?.is_some() {
            return Err(Error::DuplicatePayment { order_id });
        }

        let payment = Payment::pending(order_id, order.total, method);
        uow.insert_payment(&payment).await?;
        uow.commit().await?;

        info!(payment_id = %payment.id, %order_id, amount = %payment.amount, "payment created");
        Ok(payment)
    }

    /// Fetch a payment by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the payment does not exist.
    pub async fn get(&self, payment_id: PaymentId) -> Result<Payment> {
        let mut uow = self.store.begin().await?;
        require_payment(&mut uow, payment_id).await
    }

    /// Fetch the payment of an order, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the order does not exist.
    pub async fn get_for_order(&self, order_id: OrderId) -> Result<Option<Payment>> {
        let mut uow = self.store.begin().await?;
        if uow.order(order_id).await?.is_none() {
            return Err(Error::not_found("order", order_id));
        }
        uow.payment_for_order(order_id).await
    }

    /// Record the gateway outcome: an optional status change and an
    /// optional settlement timestamp.
    ///
    /// An approved payment is locked in; the only status it may still
    /// move to is refunded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the payment does not exist, or
    /// [`Error::InvalidTransition`] for a disallowed status change.
    pub async fn update(
        &self,
        payment_id: PaymentId,
        status: Option<PaymentStatus>,
        settled_at: Option<DateTime<Utc>>,
    ) -> Result<Payment> {
        let mut uow = self.store.begin().await?;
        let mut payment = require_payment(&mut uow, payment_id).await?;

        if let Some(next) = status {
            if !payment.status.can_transition_to(next) {
                return Err(Error::InvalidTransition {
                    entity: "payment",
                    from: payment.status.as_str(),
                    to: next.as_str(),
                });
            }
            payment.status = next;
        }
        if let Some(at) = settled_at {
            payment.settled_at = Some(at);
        }
        payment.updated_at = Utc::now();

        uow.update_payment(&payment).await?;
        uow.commit().await?;

        info!(%payment_id, status = %payment.status, "payment updated");
        Ok(payment)
    }

    /// Delete a payment. Approved payments are immutable records and
    /// cannot be removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the payment does not exist, or
    /// [`Error::CannotDeleteApproved`] if it has been approved.
    pub async fn delete(&self, payment_id: PaymentId) -> Result<()> {
        let mut uow = self.store.begin().await?;
        let payment = require_payment(&mut uow, payment_id).await?;

        if payment.status == PaymentStatus::Approved {
            return Err(Error::CannotDeleteApproved { payment_id });
        }

        uow.delete_payment(payment_id).await?;
        uow.commit().await?;

        info!(%payment_id, "payment deleted");
        Ok(())
    }
}

async fn require_payment<U: UnitOfWork>(uow: &mut U, payment_id: PaymentId) -> Result<Payment> {
    uow.payment(payment_id)
        .await?
        .ok_or_else(|| Error::not_found("payment", payment_id))
}
