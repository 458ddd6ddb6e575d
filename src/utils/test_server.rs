//! Local HTTP/1.1 stub for exercising the real client against canned
//! indexer responses. Routes match the request target exactly, query
//! string included; anything else gets a 404.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Clone)]
struct Route {
    status: u16,
    body: String,
    delay: Duration,
}

#[derive(Default)]
pub(crate) struct StubServer {
    routes: HashMap<String, Route>,
}

impl StubServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, target: &str, status: u16, body: &str) -> Self {
        self.slow_route(target, status, body, Duration::ZERO)
    }

    /// Answer `target` only after `delay`
    pub fn slow_route(mut self, target: &str, status: u16, body: &str, delay: Duration) -> Self {
        self.routes.insert(
            target.to_string(),
            Route {
                status,
                body: body.to_string(),
                delay,
            },
        );
        self
    }

    /// Bind to an ephemeral port and serve until the runtime shuts down.
    /// Returns the base URL, e.g. `http://127.0.0.1:41234`.
    pub async fn start(self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes = Arc::new(self.routes);

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, routes.clone()));
            }
        });

        format!("http://{}", addr)
    }
}

async fn serve(mut stream: TcpStream, routes: Arc<HashMap<String, Route>>) {
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&chunk[..n]),
        }
    }

    let head = String::from_utf8_lossy(&request);
    let target = head.split_whitespace().nth(1).unwrap_or("/");
    let route = routes.get(target).cloned().unwrap_or(Route {
        status: 404,
        body: "not found".to_string(),
        delay: Duration::ZERO,
    });

    tokio::time::sleep(route.delay).await;

    let reason = if (200..300).contains(&route.status) { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        route.status,
        reason,
        route.body.len(),
        route.body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}
