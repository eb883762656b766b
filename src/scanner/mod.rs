pub mod line;
pub mod session;

use crate::error::ScanError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::future::Future;

pub use line::LineScanner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Symbologies a scanner reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolType {
    Qr,
    Ean13,
    Ean8,
    Code128,
    Code39,
    Code93,
    UpcE,
    UpcA,
}

impl SymbolType {
    pub const ALL: [SymbolType; 8] = [
        SymbolType::Qr,
        SymbolType::Ean13,
        SymbolType::Ean8,
        SymbolType::Code128,
        SymbolType::Code39,
        SymbolType::Code93,
        SymbolType::UpcE,
        SymbolType::UpcA,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SymbolType::Qr => "qr",
            SymbolType::Ean13 => "ean-13",
            SymbolType::Ean8 => "ean-8",
            SymbolType::Code128 => "code-128",
            SymbolType::Code39 => "code-39",
            SymbolType::Code93 => "code-93",
            SymbolType::UpcE => "upc-e",
            SymbolType::UpcA => "upc-a",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Guess the symbology of a bare decoded value from its shape.
    pub fn infer(value: &str) -> Self {
        let all_digits = value.chars().all(|c| c.is_ascii_digit());
        match (all_digits, value.len()) {
            (true, 13) => SymbolType::Ean13,
            (true, 12) => SymbolType::UpcA,
            (true, 8) => SymbolType::Ean8,
            _ => SymbolType::Code128,
        }
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Same names as the `<symbol>:<value>` input syntax.
impl Serialize for SymbolType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanEvent {
    pub symbol: SymbolType,
    pub value: String,
}

/// A source of decoded barcodes.
pub trait CodeScanner {
    fn request_permission(&mut self) -> impl Future<Output = Result<Permission, ScanError>>;

    fn set_active(&mut self, active: bool);

    #[cfg(test)]
    fn is_active(&self) -> bool;

    /// Next decoded code, or `None` once the source is exhausted.
    fn next_event(&mut self) -> impl Future<Output = Result<Option<ScanEvent>, ScanError>>;
}
