//! Backtest service trait and its HTTP implementation.
//!
//! The trait decouples the session and the TUI worker from the transport, so
//! tests can script responses without a server.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use basketlab_core::{BacktestRequest, BacktestResultRow, BasketCatalog, Strategy};

use crate::config::ClientConfig;
use crate::error::ServiceError;

/// The three calls the client makes against the collaborator service.
pub trait BacktestService: Send + Sync {
    /// `GET /strategies`
    fn strategies(&self) -> Result<Vec<Strategy>, ServiceError>;

    /// `GET /assets`, unwrapped to the basket map.
    fn assets(&self) -> Result<BasketCatalog, ServiceError>;

    /// `POST /backtest`, unwrapped to the result rows.
    fn run_backtest(
        &self,
        request: &BacktestRequest,
    ) -> Result<Vec<BacktestResultRow>, ServiceError>;
}

impl<S: BacktestService + ?Sized> BacktestService for Box<S> {
    fn strategies(&self) -> Result<Vec<Strategy>, ServiceError> {
        (**self).strategies()
    }

    fn assets(&self) -> Result<BasketCatalog, ServiceError> {
        (**self).assets()
    }

    fn run_backtest(
        &self,
        request: &BacktestRequest,
    ) -> Result<Vec<BacktestResultRow>, ServiceError> {
        (**self).run_backtest(request)
    }
}

/// `GET /assets` body.
#[derive(Debug, Deserialize)]
pub struct AssetsResponse {
    pub baskets: BasketCatalog,
}

/// `POST /backtest` body.
#[derive(Debug, Deserialize)]
pub struct BacktestResponse {
    pub results: Vec<BacktestResultRow>,
}

/// Blocking HTTP/JSON client for the service.
pub struct HttpService {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpService {
    /// Build a client for `config.api_url`.
    ///
    /// No request timeout is set unless `request_timeout_secs` is configured;
    /// a run is bounded only by the service's own response time.
    pub fn new(config: &ClientConfig) -> Result<Self, ServiceError> {
        let timeout: Option<Duration> = config.request_timeout();
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("basketlab/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ServiceError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let resp = self.client.get(&url).send()?;
        decode(resp)
    }
}

/// Check the status, then decode the body as JSON.
fn decode<T: DeserializeOwned>(resp: reqwest::blocking::Response) -> Result<T, ServiceError> {
    let status = resp.status();
    let body = resp.text()?;
    if !status.is_success() {
        return Err(ServiceError::status(status.as_u16(), &body));
    }
    Ok(serde_json::from_str(&body)?)
}

impl BacktestService for HttpService {
    fn strategies(&self) -> Result<Vec<Strategy>, ServiceError> {
        self.get_json("strategies")
    }

    fn assets(&self) -> Result<BasketCatalog, ServiceError> {
        self.get_json::<AssetsResponse>("assets").map(|r| r.baskets)
    }

    fn run_backtest(
        &self,
        request: &BacktestRequest,
    ) -> Result<Vec<BacktestResultRow>, ServiceError> {
        let url = self.url("backtest");
        debug!(%url, strategy = %request.strategy, symbols = request.basket.len(), "POST");
        let resp = self.client.post(&url).json(request).send()?;
        decode::<BacktestResponse>(resp).map(|r| r.results)
    }
}
