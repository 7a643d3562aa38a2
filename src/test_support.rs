// src/test_support.rs
// =============================================================================
// A tiny HTTP server for tests.
//
// The probe and robots code talks to real sockets through reqwest, so instead
// of mocking the client we start a throwaway server on 127.0.0.1 with a fixed
// set of routes. Unknown paths return 404. Every request path is recorded so
// tests can check exactly what was asked for.
//
// Only compiled for `cargo test`.
// =============================================================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use url::Url;

#[derive(Debug, Clone)]
struct Route {
    status: u16,
    body: String,
    location: Option<String>,
    delay: Option<Duration>,
    // Declared body length that is never fully sent
    stall: Option<(usize, Duration)>,
}

#[derive(Debug, Default)]
pub struct Fixture {
    routes: HashMap<String, Route>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, path: &str, status: u16, body: &str) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                status,
                body: body.to_string(),
                location: None,
                delay: None,
                stall: None,
            },
        );
        self
    }

    pub fn redirect(mut self, path: &str, to: &str) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                status: 301,
                body: String::new(),
                location: Some(to.to_string()),
                delay: None,
                stall: None,
            },
        );
        self
    }

    // Answers 200 after `delay`, for timeout tests
    pub fn slow(mut self, path: &str, delay: Duration) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                status: 200,
                body: "late".to_string(),
                location: None,
                delay: Some(delay),
                stall: None,
            },
        );
        self
    }

    // Sends the headers and the first few body bytes of a 200, then goes
    // quiet for `delay` before dropping the connection
    pub fn stalled_body(mut self, path: &str, delay: Duration) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                status: 200,
                body: "0123456789".to_string(),
                location: None,
                delay: None,
                stall: Some((1000, delay)),
            },
        );
        self
    }

    pub async fn serve(self) -> FixtureServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes = Arc::new(self.routes);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = requests.clone();
        let handle = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let routes = routes.clone();
                let seen = seen.clone();
                tokio::spawn(async move {
                    handle_connection(socket, &routes, &seen).await;
                });
            }
        });

        FixtureServer {
            base: Url::parse(&format!("http://{}", addr)).unwrap(),
            requests,
            handle,
        }
    }
}

pub struct FixtureServer {
    pub base: Url,
    requests: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl FixtureServer {
    // Request paths in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// A base URL nothing is listening on, for connection-refused tests
pub async fn dead_base_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}", addr)).unwrap()
}

async fn handle_connection(
    mut socket: TcpStream,
    routes: &HashMap<String, Route>,
    seen: &Mutex<Vec<String>>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }

    let request = String::from_utf8_lossy(&buf);
    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
    seen.lock().unwrap().push(path.clone());

    let route = routes.get(&path).cloned().unwrap_or(Route {
        status: 404,
        body: "not found".to_string(),
        location: None,
        delay: None,
        stall: None,
    });

    if let Some(delay) = route.delay {
        tokio::time::sleep(delay).await;
    }

    let declared = route.stall.map(|(len, _)| len).unwrap_or(route.body.len());
    let mut response = format!(
        "HTTP/1.1 {} Fixture\r\nContent-Length: {}\r\nConnection: close\r\n",
        route.status, declared
    );
    if let Some(location) = &route.location {
        response.push_str(&format!("Location: {}\r\n", location));
    }
    response.push_str("\r\n");
    response.push_str(&route.body);

    let _ = socket.write_all(response.as_bytes()).await;
    if let Some((_, delay)) = route.stall {
        let _ = socket.flush().await;
        tokio::time::sleep(delay).await;
    }
    let _ = socket.shutdown().await;
}
