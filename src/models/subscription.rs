//! Subscription list update request.

use serde::{Serialize, Serializer};

/// Body of `POST trading/update_subscriptions`.
///
/// The API expects `visible` as the string `"true"` or `"false"`, not a
/// JSON boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateSubscriptionRequest {
    pub symbol: String,
    #[serde(serialize_with = "bool_as_str")]
    pub visible: bool,
}

impl UpdateSubscriptionRequest {
    pub fn new(symbol: &str, visible: bool) -> Self {
        Self {
            symbol: symbol.to_string(),
            visible,
        }
    }
}

fn bool_as_str<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "true" } else { "false" })
}
