//! Payload handed over by one acquisition run.
//!
//! Numeric fields accept either JSON numbers or scraped text such as
//! `"4,068,224,032"` or `"$1,898.50"`.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use super::{BreadthInput, Exchange, SignalInput};
use crate::error::Result;
use crate::services::normalize::{clean_number, normalize_ticker, parse_scraped_date};

/// Breadth numbers for one exchange, without the date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreadthFields {
    #[serde(deserialize_with = "scraped_number")]
    pub advancing_volume: f64,
    #[serde(deserialize_with = "scraped_number")]
    pub declining_volume: f64,
    #[serde(deserialize_with = "scraped_number")]
    pub close: f64,
    #[serde(deserialize_with = "scraped_number")]
    pub advances: f64,
    #[serde(deserialize_with = "scraped_number")]
    pub declines: f64,
    #[serde(deserialize_with = "scraped_number")]
    pub new_highs: f64,
    #[serde(deserialize_with = "scraped_number")]
    pub new_lows: f64,
}

/// Quoted range for one ticker, without the date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalFields {
    pub ticker: String,
    pub description: String,
    #[serde(deserialize_with = "scraped_number")]
    pub buy: f64,
    #[serde(deserialize_with = "scraped_number")]
    pub sell: f64,
    #[serde(deserialize_with = "scraped_number")]
    pub close: f64,
}

/// Everything scraped for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySnapshot {
    /// Scraped date text; any format accepted by `parse_scraped_date`.
    pub date: String,
    #[serde(default)]
    pub breadth: BTreeMap<Exchange, BreadthFields>,
    #[serde(default)]
    pub signals: Vec<SignalFields>,
}

impl DailySnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Snapshot date as `YYYY-MM-DD`.
    pub fn normalized_date(&self) -> Result<String> {
        parse_scraped_date(&self.date)
    }

    pub fn breadth_inputs(&self) -> Result<Vec<(Exchange, BreadthInput)>> {
        let date = self.normalized_date()?;
        Ok(self
            .breadth
            .iter()
            .map(|(exchange, fields)| {
                (
                    *exchange,
                    BreadthInput {
                        date: date.clone(),
                        advancing_volume: fields.advancing_volume,
                        declining_volume: fields.declining_volume,
                        close: fields.close,
                        advances: fields.advances,
                        declines: fields.declines,
                        new_highs: fields.new_highs,
                        new_lows: fields.new_lows,
                    },
                )
            })
            .collect())
    }

    pub fn signal_inputs(&self) -> Result<Vec<SignalInput>> {
        let date = self.normalized_date()?;
        Ok(self
            .signals
            .iter()
            .map(|fields| SignalInput {
                date: date.clone(),
                ticker: normalize_ticker(&fields.ticker),
                description: fields.description.trim().to_uppercase(),
                buy: fields.buy,
                sell: fields.sell,
                close: fields.close,
            })
            .collect())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn scraped_number<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(text) => clean_number(&text).map_err(serde::de::Error::custom),
    }
}
