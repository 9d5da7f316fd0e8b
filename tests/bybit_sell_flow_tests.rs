mod common;

use common::RoutedTransport;
use lotus_autosell::core::config::ExchangeConfig;
use lotus_autosell::core::kernel::RetryPolicy;
use lotus_autosell::{
    AutoSeller, BurstDispatcher, BybitConnector, RunOutcome, SellVenue, TradingPair,
};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

const SALE_TIME: u64 = 1_700_000_000;

fn wallet(free: &str) -> String {
    format!(
        r#"{{"retCode":0,"retMsg":"OK","result":{{"list":[{{"accountType":"SPOT","coin":[
            {{"coin":"USDT","free":"5"}},
            {{"coin":"ARB","free":"{}","walletBalance":"99"}}]}}]}}}}"#,
        free
    )
}

const INSTRUMENTS: &str = r#"{"retCode":0,"retMsg":"OK","result":{"list":[
    {"symbol":"ARBUSDT","baseCoin":"ARB","quoteCoin":"USDT",
     "lotSizeFilter":{"basePrecision":"0.001"}}]}}"#;

fn server_time(seconds: u64) -> String {
    format!(
        r#"{{"retCode":0,"retMsg":"OK","result":{{"timeSecond":"{}","timeNano":"{}000000000"}}}}"#,
        seconds, seconds
    )
}

const ORDER_OK: &str =
    r#"{"retCode":0,"retMsg":"OK","result":{"orderId":"1321003749386327552","orderLinkId":""}}"#;
const ORDER_BUSY: &str = r#"{"retCode":10006,"retMsg":"Too many visits!","result":{}}"#;

fn connector(transport: Arc<RoutedTransport>) -> Arc<BybitConnector<Arc<RoutedTransport>>> {
    let config = ExchangeConfig::new("test_key".to_string(), "test_secret".to_string())
        .base_url("https://bybit.test".to_string());
    Arc::new(BybitConnector::new(transport, &config, RetryPolicy::default()))
}

fn pair() -> TradingPair {
    TradingPair::new("arb", "usdt").unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_full_sell_flow_truncates_and_signs_each_order() {
    let transport = Arc::new(
        RoutedTransport::default()
            .route("/v5/account/wallet-balance", &[wallet("12.3456789").as_str()])
            .route("/v5/market/instruments-info", &[INSTRUMENTS])
            .route(
                "/v5/market/time",
                &[server_time(SALE_TIME - 2).as_str(), server_time(SALE_TIME).as_str()],
            )
            .route("/v5/order/create", &[ORDER_BUSY, ORDER_OK]),
    );
    let venue = connector(transport.clone());
    let dispatcher = BurstDispatcher::new(2, 3).with_poll_interval(Duration::from_millis(100));

    let outcome = AutoSeller::new(venue, pair(), dec!(1.25), SALE_TIME, dispatcher)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.filled_count(), 3);
    assert_eq!(transport.sent_to("/v5/market/time").len(), 2);

    // Three attempts plus one resend after the busy answer
    let orders = transport.sent_to("/v5/order/create");
    assert_eq!(orders.len(), 4);
    for order in &orders {
        assert!(order.header("X-BAPI-SIGN").is_some());
        assert_eq!(order.header("X-BAPI-API-KEY"), Some("test_key"));

        let body: serde_json::Value =
            serde_json::from_slice(order.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["category"], "spot");
        assert_eq!(body["symbol"], "ARBUSDT");
        assert_eq!(body["side"], "Sell");
        assert_eq!(body["orderType"], "Limit");
        assert_eq!(body["qty"], "12.345");
        assert_eq!(body["price"], "1.25");
    }
}

#[tokio::test(start_paused = true)]
async fn test_zero_balance_never_reaches_order_endpoint() {
    let transport = Arc::new(
        RoutedTransport::default()
            .route("/v5/account/wallet-balance", &[wallet("0").as_str()])
            .route("/v5/order/create", &[ORDER_OK]),
    );
    let venue = connector(transport.clone());

    let outcome = AutoSeller::new(
        venue,
        pair(),
        dec!(1.25),
        SALE_TIME,
        BurstDispatcher::new(1, 1),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(outcome, RunOutcome::NoBalance);
    assert!(transport.sent_to("/v5/order/create").is_empty());
    assert!(transport.sent_to("/v5/market/time").is_empty());
}

#[tokio::test]
async fn test_balance_falls_back_to_wallet_balance() {
    let body = r#"{"retCode":0,"retMsg":"OK","result":{"list":[{"accountType":"SPOT",
        "coin":[{"coin":"ARB","free":"","walletBalance":"3.5"}]}]}}"#;
    let transport =
        Arc::new(RoutedTransport::default().route("/v5/account/wallet-balance", &[body]));
    let venue = connector(transport.clone());

    let balance = venue.get_balance("arb").await.unwrap();

    assert_eq!(balance, Some(dec!(3.5)));
    let sent = transport.sent_to("/v5/account/wallet-balance");
    assert!(sent[0].url.ends_with("?accountType=SPOT&coin=ARB"));
}

#[tokio::test]
async fn test_unlisted_pair_has_no_precision() {
    let body = r#"{"retCode":0,"retMsg":"OK","result":{"list":[]}}"#;
    let transport =
        Arc::new(RoutedTransport::default().route("/v5/market/instruments-info", &[body]));
    let venue = connector(transport);

    let step = venue.get_quantity_precision(&pair()).await.unwrap();

    assert_eq!(step, None);
}
