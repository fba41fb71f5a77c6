use std::sync::{Arc, Mutex};
use std::time::Duration;

use shop_commerce::cart::Cart;
use shop_commerce::catalog::Product;
use shop_commerce::checkout::{OrderApi, OrderRequest, PaymentInput};
use shop_commerce::{Amount, Currency, OrderApiError};
use shop_orders::{BackoffStrategy, ClientConfig, FetchPolicy, HttpOrderClient, RetryPolicy, TimeoutConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
struct Recorded {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Recorded {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Serve one canned response per connection, in order.
async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<Recorded>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorded = Arc::new(Mutex::new(Vec::new()));

    let log = recorded.clone();
    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            log.lock().unwrap().push(request);
            let response = format!(
                "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
    });

    (format!("http://{}", addr), recorded)
}

async fn read_request(socket: &mut TcpStream) -> Recorded {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        assert!(n > 0, "connection closed before headers");
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let length: usize = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .map(|(_, v)| v.parse().unwrap())
        .unwrap_or(0);
    while buf.len() < header_end + length {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before body");
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..header_end + length]).to_string();

    Recorded {
        request_line,
        headers,
        body,
    }
}

fn fast_policy(catalog_retries: u32) -> FetchPolicy {
    FetchPolicy {
        timeout: TimeoutConfig::from_total(Duration::from_millis(500)),
        catalog_retry: RetryPolicy::new(catalog_retries).with_backoff(BackoffStrategy::None),
        order_retry: RetryPolicy::none(),
    }
}

fn client(base_url: &str, policy: FetchPolicy) -> HttpOrderClient {
    HttpOrderClient::new(
        ClientConfig::new(base_url)
            .with_auth_token("secret-token")
            .with_policy(policy),
    )
    .unwrap()
}

fn pix_request() -> OrderRequest {
    let mut cart = Cart::new();
    cart.add(&Product::new("tee", "Tee", Amount::from_cents(4990))).unwrap();
    let method = PaymentInput::Pix.validate().unwrap();
    OrderRequest::from_cart(&cart, Currency::BRL, Some("PROMO10".to_string()), &method)
}

#[tokio::test]
async fn pix_order_posts_json_with_bearer_token() {
    let (url, recorded) = serve(vec![(201, r#"{"orderNumber": "BR-55", "total": 44.91, "status": "pending"}"#)]).await;
    let api = client(&url, fast_policy(0));

    let confirmation = api.create_order_by_pix(&pix_request()).await.unwrap();
    assert_eq!(confirmation.order_number.as_str(), "BR-55");
    assert_eq!(confirmation.total.cents(), 4491);

    let requests = recorded.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].request_line.starts_with("POST /orders/pix "));
    assert_eq!(requests[0].header("authorization"), Some("Bearer secret-token"));
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "items": [{"productId": "tee", "quantity": 1}],
            "currency": "BRL",
            "couponCode": "PROMO10"
        })
    );
}

#[tokio::test]
async fn rejected_order_carries_server_message_and_is_not_retried() {
    let (url, recorded) = serve(vec![
        (503, r#"{"message": "Serviço indisponível"}"#),
        (201, r#"{"orderNumber": "dup", "total": 1}"#),
    ])
    .await;
    let api = client(&url, fast_policy(3));

    let err = api.create_order_by_card(&pix_request()).await.unwrap_err();
    assert_eq!(
        err,
        OrderApiError::Rejected {
            status: 503,
            message: Some("Serviço indisponível".to_string()),
        }
    );
    assert_eq!(err.user_message(), "Serviço indisponível");
    assert_eq!(recorded.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn unstructured_error_body_has_no_message() {
    let (url, _) = serve(vec![(500, "oops")]).await;
    let api = client(&url, fast_policy(0));

    let err = api.create_order_by_pix(&pix_request()).await.unwrap_err();
    assert_eq!(err, OrderApiError::Rejected { status: 500, message: None });
    assert_eq!(err.user_message(), OrderApiError::GENERIC_MESSAGE);
}

#[tokio::test]
async fn catalog_fetch_passes_currency_and_retries_server_errors() {
    let (url, recorded) = serve(vec![
        (502, "{}"),
        (200, r#"[{"id": 1, "title": "Tee", "price": 9.99, "image": "tee.png"}]"#),
    ])
    .await;
    let api = client(&url, fast_policy(2));

    let products = api.list_products(Currency::USD).await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].price.cents(), 999);

    let requests = recorded.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].request_line.starts_with("GET /products?curr=USD "));
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let (url, _) = serve(vec![(200, r#"{"unexpected": true}"#)]).await;
    let api = client(&url, fast_policy(0));

    let err = api.create_order_by_pix(&pix_request()).await.unwrap_err();
    assert!(matches!(err, OrderApiError::Decode(_)));
}

#[tokio::test]
async fn refused_connection_is_a_connection_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client(&format!("http://{}", addr), fast_policy(0));
    let err = api.list_products(Currency::BRL).await.unwrap_err();
    assert!(matches!(err, OrderApiError::Connection(_)), "{:?}", err);
}

#[tokio::test]
async fn silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let policy = FetchPolicy {
        timeout: TimeoutConfig::new(Duration::from_millis(200), Duration::from_millis(200)),
        ..fast_policy(0)
    };
    let api = client(&format!("http://{}", addr), policy);
    let err = api.create_order_by_pix(&pix_request()).await.unwrap_err();
    assert!(matches!(err, OrderApiError::Timeout(_)), "{:?}", err);
}
