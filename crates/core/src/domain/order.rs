use serde::{Deserialize, Serialize};

use super::product::ProductId;
use super::user::UserId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub i64);

/// Order header as read for recommendation purposes: only ownership matters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHeader {
    pub id: OrderId,
    pub user_id: Option<UserId>,
}

/// One purchased line. `product_id` is nullable in storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
}
