use serde::{Serialize, Serializer};

/// CSV column order. The sink writes this header verbatim.
pub const CSV_FIELDNAMES: [&str; 5] = ["id", "title", "price", "promo_price", "link"];

// ── Price ─────────────────────────────────────────────────────────────────────

/// A price column: a figure, leftover text that is not a clean numeral, the `N/A`
/// out-of-stock sentinel, or nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Price {
    Amount(u64),
    /// Digit-bearing text written through as displayed, e.g. "1 999 " or "от 99,90".
    Text(String),
    NotAvailable,
    Empty,
}

impl Price {
    pub const NOT_AVAILABLE: &'static str = "N/A";

    pub fn is_empty(&self) -> bool {
        *self == Price::Empty
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Price::Amount(n) => serializer.serialize_u64(*n),
            Price::Text(text) => serializer.serialize_str(text),
            Price::NotAvailable => serializer.serialize_str(Self::NOT_AVAILABLE),
            Price::Empty => serializer.serialize_str(""),
        }
    }
}

// ── Record ────────────────────────────────────────────────────────────────────

/// One product card from a listing page. Field order matches `CSV_FIELDNAMES`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Record {
    pub id: u64,
    pub title: String,
    pub price: Price,
    pub promo_price: Price, // never NotAvailable
    pub link: String,
}

impl Record {
    pub fn is_out_of_stock(&self) -> bool {
        self.price == Price::NotAvailable
    }

    pub fn has_promo(&self) -> bool {
        !self.promo_price.is_empty()
    }
}
