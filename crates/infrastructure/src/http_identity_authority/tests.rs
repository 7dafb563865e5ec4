use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use warden_application::{PermissionAuthority, TokenAuthority};
use warden_core::{AppError, UserId};

use super::{HttpPermissionAuthority, HttpTokenAuthority, InternalRpcClient};

const SECRET: &str = "internal-secret-internal-secret-0001";

/// Serves one canned response and hands back the raw request it received.
async fn serve_once(
    status_line: &'static str,
    body: &'static str,
) -> (String, oneshot::Receiver<String>) {
    let listener = match TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(error) => panic!("failed to bind test listener: {error}"),
    };
    let address = match listener.local_addr() {
        Ok(address) => address,
        Err(error) => panic!("failed to read test listener address: {error}"),
    };
    let (sender, receiver) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };

        let mut request = Vec::new();
        let mut buffer = [0_u8; 1024];
        loop {
            let Ok(read) = socket.read(&mut buffer).await else {
                return;
            };
            if read == 0 {
                break;
            }
            request.extend_from_slice(&buffer[..read]);
            if request_is_complete(&request) {
                break;
            }
        }

        let response = format!(
            "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
        let _ = sender.send(String::from_utf8_lossy(&request).into_owned());
    });

    (format!("http://{address}"), receiver)
}

fn request_is_complete(request: &[u8]) -> bool {
    let text = String::from_utf8_lossy(request);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    request.len() >= header_end + 4 + content_length
}

fn client(base_url: &str) -> InternalRpcClient {
    match InternalRpcClient::new(base_url, SECRET, Duration::from_secs(2)) {
        Ok(client) => client,
        Err(error) => panic!("failed to build RPC client: {error}"),
    }
}

#[tokio::test]
async fn permission_bridge_returns_flattened_set_and_sends_secret() {
    let (base_url, request) = serve_once(
        "HTTP/1.1 200 OK",
        r#"{"permissions":["Pages.Products","Pages.Categories"]}"#,
    )
    .await;

    let authority = HttpPermissionAuthority::new(client(base_url.as_str()));
    let permissions = authority.granted_permissions(UserId::new(5)).await;
    assert!(permissions.is_ok());
    let permissions = permissions.unwrap_or_default();
    assert!(permissions.contains("Pages.Products"));
    assert_eq!(permissions.len(), 2);

    let request = request.await.unwrap_or_default();
    assert!(request.starts_with("POST /api/internal/permissions/user "));
    assert!(request.contains(&format!("Bearer {SECRET}")));
    assert!(request.contains(r#""user_id":5"#));
}

#[tokio::test]
async fn token_authority_reads_validity_answer() {
    let (base_url, request) = serve_once("HTTP/1.1 200 OK", r#"{"is_valid":false}"#).await;

    let authority = HttpTokenAuthority::new(client(base_url.as_str()));
    let result = authority
        .validate_token_key("token_validity_key.5.abc", UserId::new(5), "abc")
        .await;
    assert!(matches!(result, Ok(false)));

    let request = request.await.unwrap_or_default();
    assert!(request.starts_with("POST /api/internal/identity/validate-token-key "));
    assert!(request.contains(r#""cache_key":"token_validity_key.5.abc""#));
}

#[tokio::test]
async fn not_found_status_maps_to_not_found() {
    let (base_url, _request) =
        serve_once("HTTP/1.1 404 Not Found", r#"{"message":"missing"}"#).await;

    let authority = HttpPermissionAuthority::new(client(base_url.as_str()));
    let result = authority.granted_permissions(UserId::new(9)).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn server_error_fails_closed_as_unavailable() {
    let (base_url, _request) = serve_once(
        "HTTP/1.1 500 Internal Server Error",
        r#"{"message":"boom"}"#,
    )
    .await;

    let authority = HttpTokenAuthority::new(client(base_url.as_str()));
    let result = authority
        .validate_security_stamp("security_stamp.1", UserId::new(1), "stamp")
        .await;
    assert!(matches!(result, Err(AppError::Unavailable(_))));
}

#[tokio::test]
async fn unreachable_identity_service_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await;
    let address = match listener.and_then(|listener| listener.local_addr()) {
        Ok(address) => address,
        Err(error) => panic!("failed to reserve a local port: {error}"),
    };

    let authority = HttpPermissionAuthority::new(client(format!("http://{address}").as_str()));
    let result = authority.granted_permissions(UserId::new(1)).await;
    assert!(matches!(result, Err(AppError::Unavailable(_))));
}
