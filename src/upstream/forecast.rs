//! Forecast provider access guarded by the `nws-api` breaker.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::FORECAST_BREAKER;
use crate::resilience::{BreakerConfig, BreakerError, BreakerManager, CircuitBreaker};

/// A point on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// What the provider returns for a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub temperature: f64,
    pub temperature_unit: String,
    pub short_forecast: String,
}

/// An upstream forecast provider.
pub trait ForecastClient: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get_forecast(
        &self,
        coords: Coordinates,
    ) -> impl Future<Output = Result<Forecast, Self::Error>> + Send;
}

/// Wraps a [`ForecastClient`] so every lookup goes through the forecast breaker.
pub struct GuardedForecastClient<C> {
    client: C,
    breaker: Arc<CircuitBreaker>,
}

impl<C: ForecastClient> GuardedForecastClient<C> {
    /// Guard `client` with the registry's forecast breaker, creating it with
    /// `config` if this is the first use.
    pub fn new(client: C, manager: &BreakerManager, config: BreakerConfig) -> Self {
        Self {
            client,
            breaker: manager.get_breaker(FORECAST_BREAKER, config),
        }
    }

    pub async fn get_forecast(&self, coords: Coordinates) -> Result<Forecast, BreakerError<C::Error>> {
        self.breaker
            .call("get-forecast", || self.client.get_forecast(coords))
            .await
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }
}
