use crate::error::{Result, ScrapeError};
use crate::models::Price;

// ── Normalisers ───────────────────────────────────────────────────────────────

const THIN_SPACE: char = '\u{2009}';
const NO_BREAK_SPACE: char = '\u{a0}';
const ROUBLE_SIGN: char = '₽';

/// Concatenate every ASCII digit in `text`, in order, and parse the result.
/// Digits from other scripts are skipped.
/// "https://www.detmir.ru/product/index/id/3985244/" → 3985244 | "Все 95 товаров" → 95
pub fn normalize_digits(field: &'static str, text: &str) -> Result<u64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(ScrapeError::format(field, text));
    }
    digits.parse().map_err(|_| ScrapeError::format(field, text))
}

/// Strip the thin space, rouble sign and no-break space from displayed price text.
/// "2\u{2009}599\u{a0}₽" → "2599". Ordinary spaces are left alone.
pub fn normalize_price_text(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(*c, THIN_SPACE | ROUBLE_SIGN | NO_BREAK_SPACE))
        .collect()
}

/// Coerce normalised price text into a price column.
/// "2599" → Amount(2599) | "" → Empty | "1 999 " → Text("1 999 ") | "Нет" → error
pub fn coerce_price(field: &'static str, text: &str) -> Result<Price> {
    let s = text.trim();
    if s.is_empty() {
        return Ok(Price::Empty);
    }
    if !s.chars().any(|c| c.is_ascii_digit()) {
        return Err(ScrapeError::format(field, text));
    }
    if s.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(n) = s.parse() {
            return Ok(Price::Amount(n));
        }
    }
    Ok(Price::Text(text.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
