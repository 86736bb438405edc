//! HTTPS download of the unit rates
//!
//! The certificate chain is not verified; the device has no trust store.

use alloc::vec;

use agile_core::tariff::{PriceSet, parse_unit_rates};
use embassy_net::Stack;
use embassy_net::dns::DnsSocket;
use embassy_net::tcp::client::{TcpClient, TcpClientState};
use embassy_time::{Duration, with_timeout};
use log::{debug, info};
use reqwless::client::{HttpClient, TlsConfig, TlsVerify};
use reqwless::request::Method;

use crate::app_state::{AppError, error_message};

/// Largest TLS record
const TLS_RECORD_LEN: usize = 16_640;

/// One page of 100 unit rates is about 15 kB
const RESPONSE_BUFFER_LEN: usize = 32 * 1024;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

fn http_error(e: &impl core::fmt::Debug) -> AppError {
    AppError::Http(error_message(e))
}

/// GET `url` and parse the body as a unit rates page.
pub async fn fetch_prices(stack: Stack<'_>, url: &str, seed: u64) -> Result<PriceSet, AppError> {
    with_timeout(FETCH_TIMEOUT, fetch_inner(stack, url, seed))
        .await
        .map_err(|e| http_error(&e))?
}

async fn fetch_inner(stack: Stack<'_>, url: &str, seed: u64) -> Result<PriceSet, AppError> {
    info!("GET {}", url);

    // Buffers live on the heap (PSRAM) rather than the task stack
    let mut tls_read = vec![0u8; TLS_RECORD_LEN];
    let mut tls_write = vec![0u8; TLS_RECORD_LEN];
    let mut response_buffer = vec![0u8; RESPONSE_BUFFER_LEN];

    let state = TcpClientState::<1, 4096, 4096>::new();
    let tcp = TcpClient::new(stack, &state);
    let dns = DnsSocket::new(stack);
    let tls = TlsConfig::new(seed, &mut tls_read, &mut tls_write, TlsVerify::None);
    let mut client = HttpClient::new_with_tls(&tcp, &dns, tls);

    let mut request = client
        .request(Method::GET, url)
        .await
        .map_err(|e| http_error(&e))?;
    let response = request
        .send(&mut response_buffer)
        .await
        .map_err(|e| http_error(&e))?;

    let status = response.status;
    if !status.is_successful() {
        return Err(http_error(&status));
    }

    let body = response
        .body()
        .read_to_end()
        .await
        .map_err(|e| http_error(&e))?;
    debug!("Received {} bytes", body.len());

    Ok(parse_unit_rates(body)?)
}
