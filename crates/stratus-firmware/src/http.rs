//! HTTPS uploads with reqwless over embassy-net
//!
//! The collector's certificate is not verified; the node has no trust
//! store and no reliable clock before the upload.

use embassy_net::Stack;
use embassy_net::dns::DnsSocket;
use embassy_net::tcp::client::{TcpClient, TcpClientState};
use esp_hal::rng::Rng;
use log::{debug, info};
use reqwless::client::{HttpClient, TlsConfig, TlsVerify};
use reqwless::headers::ContentType;
use reqwless::request::{Method, RequestBuilder};
use static_cell::ConstStaticCell;
use stratus_core::telemetry::{CONTENT_TYPE_JSON, Uploader};
use thiserror_no_std::Error;

const TCP_BUFFER_LEN: usize = 4096;

/// Largest TLS record plus header
const TLS_READ_LEN: usize = 16_640;
const TLS_WRITE_LEN: usize = 4096;
const RESPONSE_LEN: usize = 1024;

type TcpState = TcpClientState<1, TCP_BUFFER_LEN, TCP_BUFFER_LEN>;

pub struct UplinkBuffers {
    tls_read: [u8; TLS_READ_LEN],
    tls_write: [u8; TLS_WRITE_LEN],
    response: [u8; RESPONSE_LEN],
}

impl UplinkBuffers {
    const fn new() -> Self {
        Self {
            tls_read: [0; TLS_READ_LEN],
            tls_write: [0; TLS_WRITE_LEN],
            response: [0; RESPONSE_LEN],
        }
    }
}

#[derive(Error, Debug)]
pub enum UplinkError {
    #[error("HTTP client failed: {0:?}")]
    Http(reqwless::Error),
}

impl From<reqwless::Error> for UplinkError {
    fn from(e: reqwless::Error) -> Self {
        Self::Http(e)
    }
}

/// POSTs request bodies over TLS through the node's IP stack.
pub struct HttpsUploader {
    stack: Stack<'static>,
    rng: Rng,
    tcp_state: &'static TcpState,
    buffers: &'static mut UplinkBuffers,
}

impl HttpsUploader {
    /// Only one uploader may exist; the buffers are taken from static
    /// storage on the first call.
    pub fn new(stack: Stack<'static>, rng: Rng) -> Self {
        static TCP_STATE: ConstStaticCell<TcpState> = ConstStaticCell::new(TcpState::new());
        static BUFFERS: ConstStaticCell<UplinkBuffers> = ConstStaticCell::new(UplinkBuffers::new());

        Self {
            stack,
            rng,
            tcp_state: TCP_STATE.take(),
            buffers: BUFFERS.take(),
        }
    }

    fn seed(&mut self) -> u64 {
        (u64::from(self.rng.random()) << 32) | u64::from(self.rng.random())
    }
}

impl Uploader for HttpsUploader {
    type Error = UplinkError;

    async fn post(
        &mut self,
        url: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<u16, UplinkError> {
        let seed = self.seed();
        let UplinkBuffers {
            tls_read,
            tls_write,
            response,
        } = &mut *self.buffers;

        let tcp = TcpClient::new(self.stack, self.tcp_state);
        let dns = DnsSocket::new(self.stack);
        let tls = TlsConfig::new(seed, tls_read, tls_write, TlsVerify::None);
        let mut client = HttpClient::new_with_tls(&tcp, &dns, tls);

        let content_type = if content_type == CONTENT_TYPE_JSON {
            ContentType::ApplicationJson
        } else {
            ContentType::TextPlain
        };

        debug!("POST {} ({} bytes)", url, body.len());
        let mut request = client
            .request(Method::POST, url)
            .await?
            .content_type(content_type)
            .body(body);
        let answer = request.send(response).await?;

        let status = answer.status.0;
        info!("HTTP {} from {}", status, url);
        Ok(status)
    }
}
