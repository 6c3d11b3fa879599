use super::fixtures::{book, Book};
use proptest::prelude::*;

/// Strategy for generating short book names over a small alphabet, so filters collide
pub fn book_name_strategy() -> impl Strategy<Value = String> {
    "[A-C][a-c0-9]{0,3}"
}

/// Strategy for generating optional prices, including zero and negative values
pub fn price_strategy() -> impl Strategy<Value = Option<f64>> {
    prop::option::of((-3i32..=3).prop_map(f64::from))
}

/// Strategy for generating a table of books with unique, ascending ids
pub fn books_strategy() -> impl Strategy<Value = Vec<Book>> {
    prop::collection::vec(
        (book_name_strategy(), any::<bool>(), price_strategy(), -2i32..=2),
        0..24,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (name, electronic, price, stock))| {
                let mut row = book(i as i64 + 1, &name, electronic).with_stock(stock);
                row.price = price;
                row
            })
            .collect()
    })
}

/// A filter over `Book` described by data, so properties can build it several ways
#[derive(Debug, Clone)]
pub enum BookFilter {
    Electronic(bool),
    NameStartsWith(String),
    NameEquals(String),
    PricePositive,
    StockAtLeast(i32),
}

impl BookFilter {
    pub fn matches(&self, row: &Book) -> bool {
        match self {
            BookFilter::Electronic(flag) => row.electronic == *flag,
            BookFilter::NameStartsWith(prefix) => row.name.starts_with(prefix.as_str()),
            BookFilter::NameEquals(name) => row.name == *name,
            BookFilter::PricePositive => row.price.is_some_and(|price| price > 0.0),
            BookFilter::StockAtLeast(stock) => row.stock >= *stock,
        }
    }
}

/// Strategy for generating a single filter
pub fn book_filter_strategy() -> impl Strategy<Value = BookFilter> {
    prop_oneof![
        any::<bool>().prop_map(BookFilter::Electronic),
        "[A-C]".prop_map(BookFilter::NameStartsWith),
        book_name_strategy().prop_map(BookFilter::NameEquals),
        Just(BookFilter::PricePositive),
        (-2i32..=2).prop_map(BookFilter::StockAtLeast),
    ]
}
