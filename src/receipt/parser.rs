//! Line-based parser for OCR'd receipt text

use regex::Regex;
use std::sync::OnceLock;

use super::{classify, Item, Receipt};
use crate::text_utils::{cached_regex, parse_amount};

static DATE: OnceLock<Regex> = OnceLock::new();
static TOTAL: OnceLock<Regex> = OnceLock::new();
static LINE_PRICE: OnceLock<Regex> = OnceLock::new();
static MONEY: OnceLock<Regex> = OnceLock::new();

fn date_pattern() -> &'static Regex {
    cached_regex(&DATE, r"([0-9]{1,2}[-/][0-9]{1,2}[-/][0-9]{2,4})")
}

fn total_pattern() -> &'static Regex {
    cached_regex(&TOTAL, r"(?i)total:?\s*\$?\s*([0-9]+\.?[0-9]*)")
}

/// Loose price: optional `$`, digits, optional fraction of any length
fn line_price_pattern() -> &'static Regex {
    cached_regex(&LINE_PRICE, r"\$?\s*([0-9]+\.?[0-9]*)")
}

/// Strict money amount: exactly two decimals after the point
fn money_pattern() -> &'static Regex {
    cached_regex(&MONEY, r"\$?[0-9]+\.[0-9]{2}")
}

/// Accumulates items, total and date across receipt lines
#[derive(Debug, Default)]
pub struct ReceiptParser {
    items: Vec<Item>,
    total: Option<f64>,
    date: Option<String>,
}

impl ReceiptParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line of receipt text. Lines that carry nothing are dropped.
    pub fn parse_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        if self.date.is_none() {
            if let Some(caps) = date_pattern().captures(line) {
                self.date = Some(caps[1].to_string());
                return;
            }
        }

        if let Some(caps) = total_pattern().captures(line) {
            // Later totals replace earlier ones
            self.total = parse_amount(&caps[1]);
            return;
        }

        let Some(caps) = line_price_pattern().captures(line) else {
            tracing::trace!("Skipping receipt line: {}", line);
            return;
        };

        let price = parse_amount(&caps[1]);
        let name = line_price_pattern().replace(line, "");
        let name = name.trim();
        if name.is_empty() {
            return;
        }

        if extract_price(line).is_none() {
            tracing::debug!("No two-decimal amount on {:?}, read price {:?}", line, price);
        }

        self.items.push(Item {
            name: name.to_string(),
            price,
            category: Some(classify(name)),
        });
    }

    pub fn finish(self) -> Receipt {
        tracing::debug!(
            "Parsed receipt: {} items, total {:?}, date {:?}",
            self.items.len(),
            self.total,
            self.date
        );
        Receipt {
            items: self.items,
            total: self.total,
            date: self.date,
        }
    }
}

/// Parse the full text of a receipt
pub fn parse_receipt(raw: &str) -> Receipt {
    let mut parser = ReceiptParser::new();
    for line in raw.lines() {
        parser.parse_line(line);
    }
    parser.finish()
}

/// First strict money amount (`$12.34`, `0.99`) in `text`
pub fn extract_price(text: &str) -> Option<f64> {
    let found = money_pattern().find(text)?;
    parse_amount(found.as_str().trim_start_matches('$'))
}
