//! Identifier newtypes.
//!
//! Every entity gets its own UUID newtype so a cart id can never be
//! handed to an order lookup by accident.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            /// Generate a new random id.
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(id: uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_type!(
    /// Unique identifier for a customer.
    ///
    /// Customers are managed outside the engine; the id is carried opaquely.
    CustomerId
);
id_type!(
    /// Unique identifier for a product.
    ProductId
);
id_type!(
    /// Unique identifier for a shopping cart.
    CartId
);
id_type!(
    /// Unique identifier for a cart line.
    CartLineId
);
id_type!(
    /// Unique identifier for an order.
    OrderId
);
id_type!(
    /// Unique identifier for an order line.
    OrderLineId
);
id_type!(
    /// Unique identifier for a payment.
    PaymentId
);
