//! Category grouping for item lists

use super::{Category, Item};

/// Categories present in `items`, in first-seen order
pub fn unique_categories(items: &[Item]) -> Vec<Category> {
    let mut categories = Vec::new();
    for category in items.iter().filter_map(|item| item.category) {
        if !categories.contains(&category) {
            categories.push(category);
        }
    }
    categories
}

/// Items bucketed by category, in first-seen order. Uncategorized items are left out.
pub fn group_by_category(items: &[Item]) -> Vec<(Category, Vec<Item>)> {
    let mut groups: Vec<(Category, Vec<Item>)> = Vec::new();

    for item in items {
        let Some(category) = item.category else {
            continue;
        };
        match groups.iter_mut().find(|(c, _)| *c == category) {
            Some((_, bucket)) => bucket.push(item.clone()),
            None => groups.push((category, vec![item.clone()])),
        }
    }

    groups
}

/// Sum of the known prices
pub fn subtotal(items: &[Item]) -> f64 {
    items.iter().filter_map(|item| item.price).sum()
}
