//! Plain-text rendering of item lists and receipts

use crate::receipt::{group_by_category, subtotal, unique_categories, Item, Receipt};

const NAME_WIDTH: usize = 28;
const PRICE_WIDTH: usize = 10;

pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(price) => format!("${:.2}", price),
        None => "-".to_string(),
    }
}

/// Item name for display; spoken items can have none
pub fn display_name(item: &Item) -> &str {
    if item.name.is_empty() {
        "(unnamed)"
    } else {
        &item.name
    }
}

fn line(out: &mut String, indent: &str, label: &str, price: Option<f64>) {
    out.push_str(&format!(
        "{}{:<width$}{:>pwidth$}\n",
        indent,
        label,
        format_price(price),
        width = NAME_WIDTH,
        pwidth = PRICE_WIDTH
    ));
}

/// Items grouped by category with subtotals, then a grand total
pub fn render_items(items: &[Item]) -> String {
    if items.is_empty() {
        return "No items yet\n".to_string();
    }

    let mut out = String::new();

    for (category, group) in group_by_category(items) {
        out.push_str(&format!("{}\n", category));
        for item in &group {
            line(&mut out, "  ", &item.name, item.price);
        }
        line(&mut out, "  ", "Subtotal", Some(subtotal(&group)));
        out.push('\n');
    }

    let uncategorized: Vec<&Item> = items.iter().filter(|i| i.category.is_none()).collect();
    if !uncategorized.is_empty() {
        out.push_str("Uncategorized\n");
        for item in uncategorized {
            line(&mut out, "  ", display_name(item), item.price);
        }
        out.push('\n');
    }

    line(&mut out, "", "Total", Some(subtotal(items)));
    out
}

pub fn render_receipt(receipt: &Receipt) -> String {
    let mut out = String::new();

    if let Some(date) = &receipt.date {
        match receipt.purchase_date() {
            Some(parsed) => out.push_str(&format!("Date: {} ({})\n", date, parsed)),
            None => out.push_str(&format!("Date: {}\n", date)),
        }
    }
    let categories = unique_categories(&receipt.items);
    if !categories.is_empty() {
        let labels: Vec<String> = categories.iter().map(ToString::to_string).collect();
        out.push_str(&format!("Categories: {}\n", labels.join(", ")));
    }
    out.push_str(&render_items(&receipt.items));
    if receipt.total.is_some() {
        line(&mut out, "", "Receipt total", receipt.total);
    }

    out
}
