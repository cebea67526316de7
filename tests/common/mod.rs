#![allow(dead_code)]

use async_trait::async_trait;
use stackdeck::ApiClient;
use stackdeck::http::Sleeper;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Records requested backoff delays instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays_ms(&self) -> Vec<u128> {
        self.delays
            .lock()
            .unwrap()
            .iter()
            .map(Duration::as_millis)
            .collect()
    }

    pub fn total_ms(&self) -> u128 {
        self.delays_ms().iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

pub fn recording_client() -> (ApiClient, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let client = ApiClient::new().with_sleeper(sleeper.clone());
    (client, sleeper)
}

const OK_RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\n\
content-type: application/json\r\n\
content-length: 11\r\n\
connection: close\r\n\r\n\
{\"ok\":true}";

async fn read_request_head(socket: &mut TcpStream) {
    let mut head = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => {
                head.extend_from_slice(&chunk[..n]);
                if head.windows(4).any(|w| w == b"\r\n\r\n") {
                    return;
                }
            }
        }
    }
}

/// Raw TCP server that reads each request and hangs up without answering
/// on the first `drop_first` connections, then answers `200 {"ok":true}`.
/// Returns the base URL and the number of accepted connections.
pub async fn hang_up_server(drop_first: usize) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::spawn(async move {
                read_request_head(&mut socket).await;
                if n > drop_first {
                    let _ = socket.write_all(OK_RESPONSE).await;
                    let _ = socket.shutdown().await;
                }
            });
        }
    });
    (format!("http://{addr}"), accepted)
}
