//! CoinCap assets endpoint, used as the secondary ticker source.

use crate::error::Result;
use crate::services::market_data::{RawTicker, TickerSource};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const ASSET_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct AssetsResponse {
    data: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    symbol: String,
    name: String,
    #[serde(rename = "priceUsd")]
    price_usd: Option<String>,
    #[serde(rename = "changePercent24Hr")]
    change_percent_24h: Option<String>,
    #[serde(rename = "volumeUsd24Hr")]
    volume_usd_24h: Option<String>,
}

fn parse(value: &Option<String>) -> Option<f64> {
    value.as_deref()?.parse().ok()
}

pub struct CoinCapClient {
    base_url: String,
    quote_asset: String,
    client: reqwest::Client,
}

impl CoinCapClient {
    pub fn new(base_url: impl Into<String>, quote_asset: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(base_url, quote_asset, client)
    }

    pub fn with_client(
        base_url: impl Into<String>,
        quote_asset: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            quote_asset: quote_asset.into().to_uppercase(),
            client,
        }
    }
}

#[async_trait]
impl TickerSource for CoinCapClient {
    fn name(&self) -> &'static str {
        "coincap"
    }

    async fn fetch_tickers(&self) -> Result<Vec<RawTicker>> {
        let url = format!("{}/v2/assets", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("limit", ASSET_LIMIT.to_string())])
            .send()
            .await?
            .error_for_status()?
            .json::<AssetsResponse>()
            .await?;

        // CoinCap prices are USD-denominated; they stand in for the quote asset.
        let tickers = response
            .data
            .into_iter()
            .filter_map(|asset| {
                let volume = parse(&asset.volume_usd_24h).unwrap_or(0.0);
                Some(RawTicker {
                    base: asset.symbol.to_uppercase(),
                    quote: Some(self.quote_asset.clone()),
                    name: Some(asset.name),
                    price_usd: parse(&asset.price_usd)?,
                    change_percent_24h: parse(&asset.change_percent_24h).unwrap_or(0.0),
                    volume,
                    quote_volume: volume,
                })
            })
            .collect();
        Ok(tickers)
    }
}
