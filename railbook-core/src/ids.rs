use crate::error::BookingError;
use crate::models::BookingId;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt::Write;

/// Source of fresh booking identifiers.
///
/// Uniqueness is not checked here; the ledger rejects a colliding id.
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> Result<BookingId, BookingError>;
}

/// 128 bits from the operating system CSPRNG, rendered as 32 lowercase hex
/// characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&self) -> Result<BookingId, BookingError> {
        let mut bytes = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| BookingError::Generation(e.to_string()))?;
        Ok(BookingId::from(to_hex(&bytes)))
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
            let _ = write!(out, "{:02x}", b);
            out
        })
}
