//! One HTTP/1.1 GET per fetch, on a hyper client connection.

use http_body_util::{BodyExt, Empty, LengthLimitError, Limited};
use hyper::body::Bytes;
use hyper::client::conn::http1;
use hyper::header::{ACCEPT, CONNECTION, HOST, USER_AGENT};
use hyper::{Request, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::endpoint::Endpoint;
use crate::error::FetchError;

/// Read buffer cap, which bounds the response head. hyper rejects values below 8 KiB.
const MAX_HEAD_BYTES: usize = 16 * 1024;
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug)]
pub(crate) struct HttpResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Send `GET target` to the endpoint and read the full response.
///
/// Informational (1xx) responses are skipped; the first final response is returned.
pub(crate) async fn get(endpoint: &Endpoint, target: &str) -> Result<HttpResponse, FetchError> {
    let stream = TcpStream::connect((endpoint.host(), endpoint.port())).await?;

    let mut builder = http1::Builder::new();
    builder.max_buf_size(MAX_HEAD_BYTES);
    let (mut sender, connection) = builder
        .handshake::<_, Empty<Bytes>>(TokioIo::new(stream))
        .await?;

    let request = Request::get(target)
        .header(HOST, endpoint.authority())
        .header(ACCEPT, "application/json")
        .header(USER_AGENT, concat!("tileworld/", env!("CARGO_PKG_VERSION")))
        .header(CONNECTION, "close")
        .body(Empty::<Bytes>::new())
        .map_err(|e| FetchError::Protocol(format!("bad request target {target:?}: {e}")))?;

    let exchange = async {
        let response = sender.send_request(request).await?;
        let status = response.status();
        let body = Limited::new(response.into_body(), MAX_BODY_BYTES)
            .collect()
            .await
            .map_err(body_error)?
            .to_bytes();
        Ok::<_, FetchError>(HttpResponse { status, body })
    };
    let drive = async {
        if let Err(e) = connection.await {
            tracing::trace!("world service connection ended: {e}");
        }
    };
    // The connection is driven alongside the exchange so dropping the fetch drops both.
    let (response, ()) = tokio::join!(exchange, drive);
    let response = response?;

    tracing::trace!(
        status = response.status.as_u16(),
        bytes = response.body.len(),
        "read http response"
    );
    Ok(response)
}

fn body_error(e: Box<dyn std::error::Error + Send + Sync>) -> FetchError {
    match e.downcast::<hyper::Error>() {
        Ok(e) => FetchError::Http(*e),
        Err(e) if e.is::<LengthLimitError>() => {
            FetchError::Protocol(format!("response body exceeds {MAX_BODY_BYTES} bytes"))
        }
        Err(e) => FetchError::Protocol(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::serve_once;

    async fn exchange(raw: &str) -> Result<HttpResponse, FetchError> {
        let addr = serve_once(raw.to_string()).await;
        let endpoint = Endpoint::parse(&format!("http://{addr}")).unwrap();
        get(&endpoint, "/generate_world?seed=1&size=2").await
    }

    #[tokio::test]
    async fn content_length_body() {
        let res = exchange("HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 5\r\n\r\nhello")
            .await
            .unwrap();
        assert!(res.status.is_success());
        assert_eq!(&res.body[..], b"hello");
    }

    #[tokio::test]
    async fn chunked_body() {
        let res = exchange("HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nabcd\r\n3;ext=1\r\nefg\r\n0\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(&res.body[..], b"abcdefg");
    }

    #[tokio::test]
    async fn body_until_close() {
        let res = exchange("HTTP/1.0 500 INTERNAL SERVER ERROR\r\n\r\noops").await.unwrap();
        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(&res.body[..], b"oops");
    }

    #[tokio::test]
    async fn informational_response_is_skipped() {
        let res = exchange("HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok")
            .await
            .unwrap();
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(&res.body[..], b"ok");
    }

    #[tokio::test]
    async fn truncated_body_is_an_error() {
        let err = exchange("HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nshort")
            .await
            .unwrap_err();
        assert!(err.is_network(), "{err:?}");
    }

    #[tokio::test]
    async fn garbage_status_line() {
        let err = exchange("SSH-2.0-OpenSSH\r\n\r\n").await.unwrap_err();
        assert!(matches!(err, FetchError::Http(_)), "{err:?}");
    }

    #[tokio::test]
    async fn oversized_head_is_rejected() {
        let raw = format!(
            "HTTP/1.1 200 OK\r\nX-Big: {}\r\nContent-Length: 2\r\n\r\nok",
            "a".repeat(4 * 1024 * 1024)
        );
        let err = exchange(&raw).await.unwrap_err();
        assert!(matches!(err, FetchError::Http(_)), "{err:?}");
    }
}
