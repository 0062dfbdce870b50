//! Structured values produced from receipt and dictation text

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Category;

/// One purchased item, from a receipt line or a spoken utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Item {
    pub fn new(name: impl Into<String>, price: Option<f64>) -> Self {
        Self {
            name: name.into(),
            price,
            category: None,
        }
    }
}

/// A scanned receipt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    /// Date token exactly as it appeared in the text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Receipt {
    /// Interpret `date` as month/day/year. Two-digit years map to 1970-2069.
    pub fn purchase_date(&self) -> Option<NaiveDate> {
        let date = self.date.as_deref()?;
        let mut parts = date.split(|c| c == '/' || c == '-');
        let month: u32 = parts.next()?.parse().ok()?;
        let day: u32 = parts.next()?.parse().ok()?;
        let year_part = parts.next()?;
        if parts.next().is_some() {
            return None;
        }

        let year: i32 = year_part.parse().ok()?;
        let year = match year_part.len() {
            2 if year < 70 => 2000 + year,
            2 => 1900 + year,
            4 => year,
            _ => return None,
        };

        NaiveDate::from_ymd_opt(year, month, day)
    }
}
