use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct BybitApiResponse<T> {
    #[serde(rename = "retCode")]
    pub ret_code: i32,
    #[serde(rename = "retMsg")]
    pub ret_msg: String,
    pub result: T,
}

#[derive(Debug, Deserialize)]
pub struct BybitWalletResult {
    #[serde(default)]
    pub list: Vec<BybitWalletAccount>,
}

#[derive(Debug, Deserialize)]
pub struct BybitWalletAccount {
    #[serde(rename = "accountType")]
    pub account_type: String,
    #[serde(default)]
    pub coin: Vec<BybitCoinBalance>,
}

#[derive(Debug, Deserialize)]
pub struct BybitCoinBalance {
    pub coin: String,
    #[serde(default)]
    pub free: Option<String>,
    #[serde(rename = "walletBalance", default)]
    pub wallet_balance: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BybitInstrumentsResult {
    #[serde(default)]
    pub list: Vec<BybitInstrument>,
}

#[derive(Debug, Deserialize)]
pub struct BybitInstrument {
    pub symbol: String,
    #[serde(rename = "baseCoin")]
    pub base_coin: String,
    #[serde(rename = "quoteCoin")]
    pub quote_coin: String,
    #[serde(rename = "lotSizeFilter")]
    pub lot_size_filter: BybitLotSizeFilter,
}

#[derive(Debug, Deserialize)]
pub struct BybitLotSizeFilter {
    #[serde(rename = "basePrecision")]
    pub base_precision: String,
}

#[derive(Debug, Deserialize)]
pub struct BybitServerTime {
    #[serde(rename = "timeSecond")]
    pub time_second: String,
}

#[derive(Debug, Serialize)]
pub struct BybitOrderRequest {
    pub category: String,
    pub symbol: String,
    pub side: String,
    #[serde(rename = "orderType")]
    pub order_type: String,
    pub qty: String,
    pub price: String,
}

#[derive(Debug, Deserialize)]
pub struct BybitOrderResult {
    #[serde(rename = "orderId")]
    pub order_id: String,
    #[serde(rename = "orderLinkId", default)]
    pub order_link_id: Option<String>,
}
