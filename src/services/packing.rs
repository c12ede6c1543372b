use crate::models::packing::{PackingCategory, PackingItem};

/// Seeded into every new trip.
pub const DEFAULT_PACKING_ITEMS: &[(&str, PackingCategory)] = &[
    ("Passport", PackingCategory::Documents),
    ("Credit/debit cards + cash", PackingCategory::Documents),
    ("Clothes", PackingCategory::Clothes),
    ("Jacket", PackingCategory::Clothes),
    ("Sandals or flip-flops", PackingCategory::Footwear),
    ("Toothbrush", PackingCategory::Toiletries),
    ("Toothpaste", PackingCategory::Toiletries),
    ("Deodorant", PackingCategory::Toiletries),
    ("Shampoo, conditioner, body wash", PackingCategory::Toiletries),
    ("Skincare products", PackingCategory::Toiletries),
    ("Sunscreen", PackingCategory::Toiletries),
    ("Medicine", PackingCategory::Health),
    ("Charger", PackingCategory::Electronics),
    ("Portable power bank", PackingCategory::Electronics),
    ("Universal travel adapter", PackingCategory::Electronics),
    ("Earphones", PackingCategory::Electronics),
    ("Water bottle", PackingCategory::Accessories),
    ("Pen", PackingCategory::Accessories),
    ("SIM card removal pin", PackingCategory::Accessories),
];

pub fn packed_count(items: &[PackingItem]) -> usize {
    items.iter().filter(|item| item.packed).count()
}
