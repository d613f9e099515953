use serde::{Deserialize, Serialize};

use super::product::ProductId;
use super::user::UserId;

/// A product a user bookmarked ("collected") without buying it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub user_id: Option<UserId>,
    pub product_id: Option<ProductId>,
}
