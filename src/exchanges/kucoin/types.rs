use serde::{Deserialize, Serialize};

/// Envelope of a response the classifier already accepted (`code` was checked there)
#[derive(Debug, Deserialize)]
pub struct KuCoinResponse<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct KuCoinAccount {
    #[serde(default)]
    pub id: String,
    pub currency: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub balance: String,
    pub available: String,
}

#[derive(Debug, Deserialize)]
pub struct KuCoinSymbol {
    pub symbol: String,
    #[serde(rename = "baseCurrency")]
    pub base_currency: String,
    #[serde(rename = "quoteCurrency")]
    pub quote_currency: String,
    #[serde(rename = "baseIncrement")]
    pub base_increment: String,
}

#[derive(Debug, Serialize)]
pub struct KuCoinOrderRequest {
    #[serde(rename = "clientOid")]
    pub client_oid: String,
    pub side: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub price: String,
    pub size: String,
}

#[derive(Debug, Deserialize)]
pub struct KuCoinOrderResult {
    #[serde(rename = "orderId")]
    pub order_id: String,
}
