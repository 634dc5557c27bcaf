//! Throw-away HTTP/1.1 responders for exercising the client without a real service.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub(crate) async fn read_request_head(sock: &mut TcpStream) -> String {
    let mut req = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = sock.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        req.extend_from_slice(&buf[..n]);
        if req.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    String::from_utf8_lossy(&req).into_owned()
}

pub(crate) async fn write_response(sock: &mut TcpStream, status_line: &str, body: &str) {
    let resp = format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    sock.write_all(resp.as_bytes()).await.unwrap();
    let _ = sock.shutdown().await;
}

/// Serve one canned response and hand back the request head that was received.
pub(crate) async fn serve_once(status_line: &'static str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = body.to_string();
    let handle = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let head = read_request_head(&mut sock).await;
        write_response(&mut sock, status_line, &body).await;
        head
    });
    (format!("http://{addr}"), handle)
}

/// Serve any number of connections, answering each by request path.
pub(crate) async fn serve_routes<F>(route: F) -> (String, JoinHandle<()>)
where
    F: Fn(&str) -> (&'static str, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let route = std::sync::Arc::new(route);
    let handle = tokio::spawn(async move {
        loop {
            let Ok((mut sock, _)) = listener.accept().await else {
                break;
            };
            let route = route.clone();
            tokio::spawn(async move {
                let head = read_request_head(&mut sock).await;
                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status_line, body) = route(&path);
                write_response(&mut sock, status_line, &body).await;
            });
        }
    });
    (format!("http://{addr}"), handle)
}
