//! Accepts connections and passes each raw request to [handle_request].

use std::{
    future::Future,
    io,
    net::{IpAddr, SocketAddr},
    time::Duration,
};

use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    signal, time,
};

use crate::{AppState, Error, handle_request};

/// The ports tried, in order, when none are configured.
pub const DEFAULT_PORTS: [u16; 4] = [8888, 8080, 8081, 3000];

/// How long a connection may take to send its request.
///
/// A request still incomplete after this is handled with whatever arrived.
pub const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(5);

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Bind to the first port in `ports` that is free on `host`.
///
/// # Errors
/// Returns [Error::NoAvailablePort] if every port fails to bind.
pub async fn bind_first_available(host: IpAddr, ports: &[u16]) -> Result<TcpListener, Error> {
    for &port in ports {
        match TcpListener::bind(SocketAddr::new(host, port)).await {
            Ok(listener) => return Ok(listener),
            Err(error) => tracing::warn!("Could not bind to port {port}: {error}"),
        }
    }

    Err(Error::NoAvailablePort(ports.to_vec()))
}

/// Serve requests from `listener` until `shutdown` completes.
///
/// Each connection gets its own task and carries exactly one request and one
/// response. At most `max_request_size` bytes of a request are read.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    max_request_size: usize,
    shutdown: impl Future,
) {
    tokio::select! {
        _ = accept_connections(&listener, state, max_request_size) => {}
        _ = shutdown => {
            tracing::info!("Shutting down");
        }
    }
}

/// Completes on either the ctrl+c or terminate signal, whichever comes first.
pub async fn graceful_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
        },
    }
}

async fn accept_connections(listener: &TcpListener, state: AppState, max_request_size: usize) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let state = state.clone();

                tokio::spawn(async move {
                    if let Err(error) = handle_connection(stream, state, max_request_size).await {
                        tracing::error!("Connection with {peer} failed: {error}");
                    }
                });
            }
            Err(error) => tracing::error!("Could not accept connection: {error}"),
        }
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    state: AppState,
    max_request_size: usize,
) -> io::Result<()> {
    let request = read_request(&mut stream, max_request_size, REQUEST_READ_TIMEOUT).await?;

    if request.is_empty() {
        return Ok(());
    }

    // The store does blocking file I/O.
    let response = tokio::task::spawn_blocking(move || handle_request(&state, &request))
        .await
        .map_err(io::Error::other)?;

    stream.write_all(&response).await?;
    stream.shutdown().await
}

/// Read one request of at most `max_request_size` bytes.
///
/// Stops once the headers and `Content-Length` bytes of body have arrived,
/// at end of stream, when the buffer is full or after `read_timeout`. A
/// request longer than the buffer is truncated, and a request cut short by
/// the timeout is returned as far as it got.
async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
    max_request_size: usize,
    read_timeout: Duration,
) -> io::Result<Vec<u8>> {
    let mut buffer = vec![0; max_request_size];
    let mut filled = 0;

    let read_all = async {
        while filled < max_request_size {
            let read = reader.read(&mut buffer[filled..]).await?;

            if read == 0 {
                break;
            }

            filled += read;

            if is_complete(&buffer[..filled]) {
                break;
            }
        }

        Ok::<_, io::Error>(())
    };

    match time::timeout(read_timeout, read_all).await {
        Ok(result) => result?,
        Err(_) => {
            tracing::warn!("Request not complete after {read_timeout:?}, handling it as is");
        }
    }

    buffer.truncate(filled);

    Ok(buffer)
}

fn is_complete(request: &[u8]) -> bool {
    let Some(header_end) = request
        .windows(HEADER_TERMINATOR.len())
        .position(|window| window == HEADER_TERMINATOR)
    else {
        return false;
    };

    let headers = String::from_utf8_lossy(&request[..header_end]);
    let content_length = headers
        .lines()
        .skip(1)
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    request.len() >= header_end + HEADER_TERMINATOR.len() + content_length
}

#[cfg(test)]
mod tests {
    use std::{
        net::{IpAddr, Ipv4Addr},
        time::Duration,
    };

    use serde_json::Value;
    use tempfile::TempDir;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
        sync::oneshot,
    };

    use crate::{Error, test_utils::get_test_state};

    use super::{REQUEST_READ_TIMEOUT, bind_first_available, is_complete, read_request, serve};

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    async fn send(addr: std::net::SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    fn body(response: &str) -> &str {
        response.split_once("\r\n\r\n").unwrap().1
    }

    #[tokio::test]
    async fn binds_next_port_when_first_is_taken() {
        let taken = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let taken_port = taken.local_addr().unwrap().port();

        let listener = bind_first_available(LOCALHOST, &[taken_port, 0])
            .await
            .unwrap();

        assert_ne!(listener.local_addr().unwrap().port(), taken_port);
    }

    #[tokio::test]
    async fn fails_when_no_port_is_free() {
        let taken = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let taken_port = taken.local_addr().unwrap().port();

        let result = bind_first_available(LOCALHOST, &[taken_port]).await;

        assert!(matches!(result, Err(Error::NoAvailablePort(ports)) if ports == vec![taken_port]));
    }

    #[tokio::test]
    async fn serves_requests_until_shutdown() {
        let dir = TempDir::new().unwrap();
        let state = get_test_state(&dir);
        let listener = bind_first_available(LOCALHOST, &[0]).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, state, 4096, async move {
            shutdown_rx.await.ok();
        }));

        let post_body = r#"{"type":"pengeluaran","category":"Food","amount":25000,"description":"Lunch","date":"2024-03-01"}"#;
        let response = send(
            addr,
            &format!(
                "POST /api/transactions HTTP/1.1\r\nContent-Length: {}\r\n\r\n{post_body}",
                post_body.len()
            ),
        )
        .await;
        assert_eq!(
            body(&response),
            r#"{"success":true,"message":"Transaction saved"}"#
        );

        let response = send(addr, "GET /api/transactions HTTP/1.1\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Connection: close\r\n"));
        let listed: Value = serde_json::from_str(body(&response)).unwrap();
        assert_eq!(listed[0]["id"], 1);
        assert_eq!(listed[0]["date"], "2024-03-01");

        shutdown_tx.send(()).unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_posts_get_unique_ids() {
        let dir = TempDir::new().unwrap();
        let state = get_test_state(&dir);
        let listener = bind_first_available(LOCALHOST, &[0]).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server_state = state.clone();
        tokio::spawn(serve(listener, server_state, 4096, std::future::pending::<()>()));

        let post_body = r#"{"amount":1}"#;
        let request = format!(
            "POST /api/transactions HTTP/1.1\r\nContent-Length: {}\r\n\r\n{post_body}",
            post_body.len()
        );
        let clients: Vec<_> = (0..16)
            .map(|_| {
                let request = request.clone();
                tokio::spawn(async move { send(addr, &request).await })
            })
            .collect();
        for client in clients {
            client.await.unwrap();
        }

        let mut ids: Vec<_> = state
            .lock_store()
            .unwrap()
            .list_all()
            .unwrap()
            .iter()
            .map(|transaction| transaction.id)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=16).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn empty_connection_gets_no_response() {
        let dir = TempDir::new().unwrap();
        let state = get_test_state(&dir);
        let listener = bind_first_available(LOCALHOST, &[0]).await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, state, 4096, std::future::pending::<()>()));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.shutdown().await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();

        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn read_request_truncates_at_buffer_size() {
        let request = b"POST /api/transactions HTTP/1.1\r\nContent-Length: 100\r\n\r\n{\"amount\":1";
        let mut reader = &request[..];

        let read = read_request(&mut reader, 16, REQUEST_READ_TIMEOUT)
            .await
            .unwrap();

        assert_eq!(read, &request[..16]);
    }

    #[tokio::test]
    async fn read_request_stops_at_end_of_stream() {
        let request = b"GET /api/health HTTP/1.1\r\n";
        let mut reader = &request[..];

        let read = read_request(&mut reader, 4096, REQUEST_READ_TIMEOUT)
            .await
            .unwrap();

        assert_eq!(read, request.to_vec());
    }

    #[tokio::test]
    async fn read_request_gives_up_on_short_body_after_timeout() {
        let request = b"POST /api/transactions HTTP/1.1\r\nContent-Length: 100\r\n\r\n{\"amount\":1}";
        let (mut client, mut server) = tokio::io::duplex(4096);
        client.write_all(request).await.unwrap();

        let read = read_request(&mut server, 4096, Duration::from_millis(50))
            .await
            .unwrap();

        assert_eq!(read, request.to_vec());
        drop(client);
    }

    #[test]
    fn request_is_complete_once_body_has_arrived() {
        assert!(!is_complete(b"GET / HTTP/1.1\r\nHost: x\r\n"));
        assert!(is_complete(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n"));
        assert!(!is_complete(
            b"POST / HTTP/1.1\r\ncontent-length: 5\r\n\r\n{\"a\""
        ));
        assert!(is_complete(
            b"POST / HTTP/1.1\r\ncontent-length: 5\r\n\r\n{\"a\"}"
        ));
    }
}
