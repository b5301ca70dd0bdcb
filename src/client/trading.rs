//! Instrument, offer and subscription operations.

use tracing::info;

use super::FxcmClient;
use crate::Result;
use crate::models::{
    Envelope, Instrument, InstrumentsResponse, Model, Offer, OffersResponse,
    UpdateSubscriptionRequest,
};
use crate::websocket::Session;

const INSTRUMENTS_PATH: &str = "trading/get_instruments";
const MODEL_PATH: &str = "trading/get_model";
const UPDATE_SUBSCRIPTIONS_PATH: &str = "trading/update_subscriptions";

impl FxcmClient {
    /// Lists every instrument and whether the account is subscribed to it.
    ///
    /// GET trading/get_instruments
    pub async fn get_instruments(&self, session: &Session) -> Result<Vec<Instrument>> {
        let response: InstrumentsResponse = self.get(session, INSTRUMENTS_PATH).await?;
        Ok(response.data.instrument)
    }

    /// Lists the offers for the account's subscribed instruments.
    ///
    /// GET trading/get_model?models=Offer
    pub async fn get_offers(&self, session: &Session) -> Result<Vec<Offer>> {
        let response: OffersResponse = self.get(session, &model_path(Model::Offer)).await?;
        Ok(response.offers)
    }

    /// Adds `symbol` to the account's subscription list.
    ///
    /// POST trading/update_subscriptions
    ///
    /// # Errors
    ///
    /// Unknown symbols fail with [`FxcmError::Server`](crate::FxcmError::Server)
    /// carrying `"Invalid symbol."`.
    pub async fn subscribe(&self, session: &Session, symbol: &str) -> Result<Envelope> {
        self.update_subscriptions(session, symbol, true).await
    }

    /// Removes `symbol` from the account's subscription list.
    ///
    /// POST trading/update_subscriptions
    pub async fn unsubscribe(&self, session: &Session, symbol: &str) -> Result<Envelope> {
        self.update_subscriptions(session, symbol, false).await
    }

    async fn update_subscriptions(
        &self,
        session: &Session,
        symbol: &str,
        visible: bool,
    ) -> Result<Envelope> {
        let request = UpdateSubscriptionRequest::new(symbol, visible);
        let envelope = self
            .post(session, UPDATE_SUBSCRIPTIONS_PATH, &request)
            .await?;
        info!(symbol, visible, "Updated subscription");

        Ok(envelope)
    }
}

fn model_path(model: Model) -> String {
    format!("{MODEL_PATH}?models={}", model.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_model_path() {
        assert_eq!(model_path(Model::Offer), "trading/get_model?models=Offer");
    }
}
