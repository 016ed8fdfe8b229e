//! SOL amounts.
//!
//! Balances and transfer amounts live in lamports (`u64`). Floating
//! point only appears at the edges, for display, and user input is parsed
//! from its decimal text so "0.1" is exactly 100_000_000 lamports.

use thiserror::Error;

use crate::config::{LAMPORTS_PER_SOL, SOL_DECIMALS};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("not a valid amount: {0:?}")]
    Invalid(String),

    #[error("amount must be greater than zero")]
    NotPositive,

    #[error("SOL amounts have at most {SOL_DECIMALS} decimal places")]
    TooManyDecimals,

    #[error("amount is too large")]
    Overflow,
}

/// Lamports to SOL, for display and for APIs that report balances in SOL.
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// SOL to lamports, rounded to the nearest lamport. Negative and
/// non-finite inputs give 0; values past `u64::MAX` saturate.
pub fn sol_to_lamports(sol: f64) -> u64 {
    if !sol.is_finite() || sol <= 0.0 {
        return 0;
    }
    // `as` saturates on overflow.
    (sol * LAMPORTS_PER_SOL as f64).round() as u64
}

/// Parses a user-entered SOL amount such as `"1"`, `"0.25"` or `".5"`.
///
/// The result is strictly positive.
pub fn parse_sol(text: &str) -> Result<u64, AmountError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AmountError::Empty);
    }
    let invalid = || AmountError::Invalid(text.to_string());

    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(frac) {
        return Err(invalid());
    }
    if frac.len() > SOL_DECIMALS as usize {
        return Err(AmountError::TooManyDecimals);
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| AmountError::Overflow)?
    };
    let frac_lamports: u64 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{frac:0<width$}", width = SOL_DECIMALS as usize);
        padded.parse().map_err(|_| invalid())?
    };

    let lamports = whole
        .checked_mul(LAMPORTS_PER_SOL)
        .and_then(|l| l.checked_add(frac_lamports))
        .ok_or(AmountError::Overflow)?;
    if lamports == 0 {
        return Err(AmountError::NotPositive);
    }
    Ok(lamports)
}

/// Exact decimal rendering with trailing zeros dropped: `1.5`, `0.000000001`, `2`.
pub fn format_sol(lamports: u64) -> String {
    let whole = lamports / LAMPORTS_PER_SOL;
    let frac = lamports % LAMPORTS_PER_SOL;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{frac:0width$}", width = SOL_DECIMALS as usize);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
