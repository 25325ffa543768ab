//! Spot-price polling
//!
//! The UI shows a live price that the contract recomputes as reserves
//! move, so the client re-fetches it on a fixed cadence. The poll runs
//! as an explicit tokio task whose lifetime is tied to the subscription
//! handle — dropping the handle stops the task. A failed fetch logs and
//! leaves the last published value in place.

use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use web3::types::{Address, U256};
use web3::Transport;

use simpleswap_contracts::PoolContract;

pub struct PricePoller;

impl PricePoller {
    /// Start polling `getPrice(token_in, token_out)` every `interval`.
    pub fn spawn<T>(
        pool: PoolContract<T>,
        token_in: Address,
        token_out: Address,
        interval: Duration,
    ) -> PriceSubscription
    where
        T: Transport + Send + Sync + 'static,
        T::Out: Send,
    {
        let (price_tx, price_rx) = watch::channel(None);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        debug!("price poller stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        match pool.get_price(token_in, token_out).await {
                            Ok(price) => {
                                let _ = price_tx.send(Some(price));
                            }
                            Err(e) => warn!("price fetch failed: {e}"),
                        }
                    }
                }
            }
        });

        PriceSubscription {
            receiver: price_rx,
            shutdown: Some(shutdown_tx),
        }
    }
}

/// Live price handle. The polling task stops when this is dropped.
pub struct PriceSubscription {
    receiver: watch::Receiver<Option<U256>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl PriceSubscription {
    /// Last successfully fetched price, if any fetch has succeeded yet.
    pub fn latest(&self) -> Option<U256> {
        *self.receiver.borrow()
    }

    /// Wait until the published price changes.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.receiver.changed().await
    }

    /// Stop the polling task explicitly.
    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for PriceSubscription {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use web3::types::H160;

    #[tokio::test]
    async fn test_subscription_starts_empty_and_stops_cleanly() {
        let transport = web3::transports::Http::new("http://localhost:1").unwrap();
        let web3 = web3::Web3::new(transport);
        let pool = PoolContract::new(web3, H160::from_low_u64_be(0x99)).unwrap();

        let subscription =
            PricePoller::spawn(pool, H160::zero(), H160::zero(), Duration::from_secs(60));

        // Nothing has been fetched successfully against a dead endpoint.
        assert_eq!(subscription.latest(), None);
        subscription.stop();
    }
}
