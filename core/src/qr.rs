//! # Payment Request Payloads
//!
//! What the Receive screen encodes into a QR code and the scanner reads
//! back. Two forms are accepted:
//!
//! - a bare base58 address, which is what this wallet has always shown;
//! - a Solana Pay transfer URI,
//!   `solana:<address>?amount=<sol>&label=<text>&message=<text>`.
//!
//! URI parsing and percent-encoding go through `reqwest::Url`.

use reqwest::Url;
use std::fmt;
use thiserror::Error;

use crate::crypto::address::{public_key_from_string, Address, AddressError};
use crate::transaction::{format_sol, parse_sol, AmountError};

const SCHEME: &str = "solana";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QrError {
    #[error("QR payload is empty")]
    Empty,

    #[error("malformed payment URI: {0}")]
    InvalidUri(String),

    #[error("QR code does not contain a valid address: {0}")]
    Address(#[from] AddressError),

    #[error("payment request amount is invalid: {0}")]
    Amount(#[from] AmountError),

    /// SPL token transfers are out of this wallet's reach.
    #[error("token payment requests are not supported")]
    UnsupportedToken,
}

/// A decoded payment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub address: Address,
    /// Requested amount in lamports.
    pub amount: Option<u64>,
    pub label: Option<String>,
    pub message: Option<String>,
}

impl PaymentRequest {
    /// A request for an unspecified amount to `address`.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            amount: None,
            label: None,
            message: None,
        }
    }

    /// Decodes a scanned payload.
    pub fn parse(payload: &str) -> Result<Self, QrError> {
        let payload = payload.trim();
        if payload.is_empty() {
            return Err(QrError::Empty);
        }

        let is_uri = payload
            .get(..SCHEME.len() + 1)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("solana:"));
        if !is_uri {
            return Ok(Self::new(public_key_from_string(payload)?));
        }

        let url = Url::parse(payload).map_err(|e| QrError::InvalidUri(e.to_string()))?;
        let mut request = Self::new(public_key_from_string(url.path())?);
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "amount" => request.amount = Some(parse_sol(&value)?),
                "label" => request.label = Some(value.into_owned()),
                "message" => request.message = Some(value.into_owned()),
                "spl-token" => return Err(QrError::UnsupportedToken),
                // reference, memo and future keys don't affect a plain transfer
                _ => {}
            }
        }
        Ok(request)
    }

    /// The payload to render. A request with nothing but an address stays
    /// a bare address so older scanners can read it.
    pub fn to_uri(&self) -> String {
        if self.amount.is_none() && self.label.is_none() && self.message.is_none() {
            return self.address.to_string();
        }
        let mut uri = format!("{SCHEME}:{}", self.address);
        let mut query = Vec::new();
        if let Some(lamports) = self.amount {
            query.push(("amount", format_sol(lamports)));
        }
        if let Some(label) = &self.label {
            query.push(("label", label.clone()));
        }
        if let Some(message) = &self.message {
            query.push(("message", message.clone()));
        }
        let encoded = Url::parse("solana:x")
            .map(|mut url| {
                url.query_pairs_mut().extend_pairs(&query);
                url.query().unwrap_or_default().to_string()
            })
            .unwrap_or_default();
        uri.push('?');
        uri.push_str(&encoded);
        uri
    }
}

impl fmt::Display for PaymentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}
