//! Turn a dictated phrase like "milk $3.99" into an item

use regex::Regex;
use std::sync::OnceLock;

use crate::receipt::Item;
use crate::text_utils::{cached_regex, collapse_whitespace, parse_amount};

static DOLLARS_AND_CENTS: OnceLock<Regex> = OnceLock::new();
static SPOKEN_PRICE: OnceLock<Regex> = OnceLock::new();
static DOLLAR_SIGN_AMOUNT: OnceLock<Regex> = OnceLock::new();
static DOLLARS_WORD: OnceLock<Regex> = OnceLock::new();
static CENTS_WORD: OnceLock<Regex> = OnceLock::new();
static BARE_NUMBER: OnceLock<Regex> = OnceLock::new();

fn dollars_and_cents() -> &'static Regex {
    cached_regex(
        &DOLLARS_AND_CENTS,
        r"([0-9]+)\s*dollars?\s+(?:and\s+)?([0-9]+)\s*cents?",
    )
}

fn spoken_price() -> &'static Regex {
    cached_regex(&SPOKEN_PRICE, r"\$?\s*([0-9]+(?:\.[0-9]*)?)")
}

/// Number-shaped noise removed from the name, applied in this order
fn name_noise() -> [&'static Regex; 4] {
    [
        cached_regex(&DOLLAR_SIGN_AMOUNT, r"\$\s*[0-9]+(?:\.[0-9]*)?"),
        cached_regex(&DOLLARS_WORD, r"[0-9]+(?:\.[0-9]*)?\s*dollars?"),
        cached_regex(&CENTS_WORD, r"[0-9]+(?:\.[0-9]*)?\s*cents?"),
        cached_regex(&BARE_NUMBER, r"[0-9]+(?:\.[0-9]*)?"),
    ]
}

/// Parse one utterance. The first amount mentioned becomes the price; every
/// amount is stripped from the name. Spoken items are never categorized.
pub fn parse_spoken_item(utterance: &str) -> Item {
    if let Some(caps) = dollars_and_cents().captures(utterance) {
        let dollars = parse_amount(&caps[1]).unwrap_or(0.0);
        let cents = parse_amount(&caps[2]).unwrap_or(0.0);
        let name = dollars_and_cents().replace_all(utterance, "");
        return Item::new(collapse_whitespace(&name), Some(dollars + cents / 100.0));
    }

    let price = spoken_price()
        .captures(utterance)
        .and_then(|caps| parse_amount(&caps[1]));

    let mut name = utterance.to_string();
    for pattern in name_noise() {
        name = pattern.replace_all(&name, "").into_owned();
    }

    Item::new(collapse_whitespace(&name), price)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spoken(text: &str) -> (String, Option<f64>) {
        let item = parse_spoken_item(text);
        (item.name, item.price)
    }

    #[test]
    fn test_dollar_sign_price() {
        assert_eq!(spoken("milk $3.99"), ("milk".into(), Some(3.99)));
    }

    #[test]
    fn test_no_price() {
        assert_eq!(spoken("apple"), ("apple".into(), None));
    }

    #[test]
    fn test_dollars_word() {
        assert_eq!(spoken("bread 5 dollars"), ("bread".into(), Some(5.0)));
        assert_eq!(spoken("gum 1 dollar"), ("gum".into(), Some(1.0)));
    }

    #[test]
    fn test_decimal_without_sign() {
        assert_eq!(spoken("coffee 2.50"), ("coffee".into(), Some(2.50)));
    }

    #[test]
    fn test_bare_integer() {
        assert_eq!(spoken("eggs 4"), ("eggs".into(), Some(4.0)));
    }

    #[test]
    fn test_first_of_two_prices_wins() {
        assert_eq!(spoken("milk $3.99 or $4.99"), ("milk or".into(), Some(3.99)));
    }

    #[test]
    fn test_dollars_and_cents() {
        assert_eq!(
            spoken("coffee 5 dollars and 50 cents"),
            ("coffee".into(), Some(5.50))
        );
        assert_eq!(spoken("tea 2 dollars 5 cents"), ("tea".into(), Some(2.05)));
    }

    #[test]
    fn test_dollars_and_cents_mid_sentence() {
        assert_eq!(
            spoken("organic   honey 7 dollars and 25 cents please"),
            ("organic honey please".into(), Some(7.25))
        );
    }

    #[test]
    fn test_cents_only() {
        assert_eq!(spoken("candy 75 cents"), ("candy".into(), Some(75.0)));
    }

    #[test]
    fn test_numbers_only() {
        assert_eq!(spoken("5 dollars"), ("".into(), Some(5.0)));
        assert_eq!(spoken(""), ("".into(), None));
        assert_eq!(spoken("   "), ("".into(), None));
    }

    #[test]
    fn test_number_in_name_is_stripped() {
        assert_eq!(spoken("2 percent milk"), ("percent milk".into(), Some(2.0)));
    }

    #[test]
    fn test_spoken_items_have_no_category() {
        // Receipt lines are classified; dictated items are not
        assert_eq!(parse_spoken_item("milk $3.99").category, None);
    }
}
