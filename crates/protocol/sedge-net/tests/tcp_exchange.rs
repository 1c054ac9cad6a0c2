//! TCP client/server round trips.

use async_trait::async_trait;
use sedge_net::{
    ExchangeTransport, NetworkConfig, NetworkError, RequestHandler, TcpExchangeClient,
    TcpExchangeServer,
};
use sedge_wire::{ExchangeRequest, ExchangeResponse};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::watch;

/// Echoes the option and payload back, counting requests.
#[derive(Default)]
struct EchoHandler {
    seen: AtomicUsize,
}

#[async_trait]
impl RequestHandler for EchoHandler {
    async fn handle(&self, request: ExchangeRequest) -> ExchangeResponse {
        self.seen.fetch_add(1, Ordering::SeqCst);
        let mut payload = request.option.into_bytes();
        payload.push(b':');
        payload.extend_from_slice(&request.payload);
        ExchangeResponse::new(payload)
    }
}

async fn start_server(handler: Arc<EchoHandler>) -> (std::net::SocketAddr, watch::Sender<bool>) {
    let server = TcpExchangeServer::bind(NetworkConfig::local()).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(server.serve(handler, shutdown_rx));
    (addr, shutdown_tx)
}

#[tokio::test]
async fn test_request_response_over_tcp() {
    let handler = Arc::new(EchoHandler::default());
    let (addr, _shutdown) = start_server(Arc::clone(&handler)).await;

    let client = TcpExchangeClient::new(NetworkConfig::local());
    let response = client
        .request(addr, ExchangeRequest::post("Data", b"CAFFE".to_vec()))
        .await
        .unwrap();

    assert_eq!(response.payload, b"Data:CAFFE");
    assert_eq!(handler.seen.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_binary_payload_preserved() {
    let handler = Arc::new(EchoHandler::default());
    let (addr, _shutdown) = start_server(handler).await;

    let client = TcpExchangeClient::new(NetworkConfig::local());
    let payload: Vec<u8> = (0..=255u8).collect();
    let response = client
        .request(addr, ExchangeRequest::post("X", payload.clone()))
        .await
        .unwrap();

    assert_eq!(&response.payload[..2], b"X:");
    assert_eq!(&response.payload[2..], &payload[..]);
}

#[tokio::test]
async fn test_sequential_requests() {
    let handler = Arc::new(EchoHandler::default());
    let (addr, _shutdown) = start_server(Arc::clone(&handler)).await;

    let client = TcpExchangeClient::new(NetworkConfig::local());
    for option in ["ContractAddress", "PublicKeyAvailable", "Data"] {
        let response = client
            .request(addr, ExchangeRequest::post(option, Vec::new()))
            .await
            .unwrap();
        assert_eq!(response.payload, format!("{}:", option).into_bytes());
    }
    assert_eq!(handler.seen.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_oversized_request_rejected_locally() {
    let handler = Arc::new(EchoHandler::default());
    let (addr, _shutdown) = start_server(Arc::clone(&handler)).await;

    let client = TcpExchangeClient::new(NetworkConfig::local().with_max_frame_size(64));
    let err = client
        .request(addr, ExchangeRequest::post("Data", vec![0u8; 128]))
        .await
        .unwrap_err();

    assert!(matches!(err, NetworkError::Io(_)));
    assert_eq!(handler.seen.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_idle_connection_closed() {
    let handler = Arc::new(EchoHandler::default());
    let config = NetworkConfig::local().with_request_timeout(Duration::from_millis(200));
    let server = TcpExchangeServer::bind(config).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (_shutdown, shutdown_rx) = watch::channel(false);
    tokio::spawn(server.serve(handler.clone(), shutdown_rx));

    // Connect and never send a frame
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut buf = [0u8; 16];
    let read = tokio::time::timeout(Duration::from_secs(2), stream.read(&mut buf))
        .await
        .expect("server kept the idle connection open")
        .unwrap();

    assert_eq!(read, 0);
    assert_eq!(handler.seen.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let handler = Arc::new(EchoHandler::default());
    let server = TcpExchangeServer::bind(NetworkConfig::local()).await.unwrap();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(server.serve(handler, shutdown_rx));

    shutdown_tx.send(true).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}
