use criteria_core::model::{Association, Attribute, Entity, Record, Value};
use criteria_core::{CriteriaError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

impl Author {
    pub const ID: Attribute<Author, i64> = Attribute::new("id");
    pub const NAME: Attribute<Author, String> = Attribute::new("name");
}

impl Record for Author {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::Int(self.id)),
            "name" => Some(Value::Text(self.name.clone())),
            _ => None,
        }
    }
}

impl Entity for Author {
    const NAME: &'static str = "author";

    fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
        match (name, value) {
            ("name", Value::Text(text)) => self.name = text,
            (field @ ("id" | "name"), value) => {
                return Err(CriteriaError::invalid_assignment(<Self as Entity>::NAME, field, &value))
            }
            (field, _) => return Err(CriteriaError::unknown_field(<Self as Entity>::NAME, field)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: i64,
    pub book_id: i64,
    pub rating: i32,
}

impl Review {
    pub const RATING: Attribute<Review, i32> = Attribute::new("rating");
}

impl Record for Review {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::Int(self.id)),
            "book_id" => Some(Value::Int(self.book_id)),
            "rating" => Some(Value::Int(i64::from(self.rating))),
            _ => None,
        }
    }
}

impl Entity for Review {
    const NAME: &'static str = "review";

    fn set_field(&mut self, name: &str, _value: Value) -> Result<()> {
        Err(CriteriaError::unknown_field(Self::NAME, name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: i64,
    pub isbn: String,
    pub name: String,
    pub electronic: bool,
    pub price: Option<f64>,
    pub stock: i32,
    pub author: Option<Author>,
    pub reviews: Vec<Review>,
}

impl Book {
    pub const ID: Attribute<Book, i64> = Attribute::new("id");
    pub const ISBN: Attribute<Book, String> = Attribute::new("isbn");
    pub const NAME: Attribute<Book, String> = Attribute::new("name");
    pub const ELECTRONIC: Attribute<Book, bool> = Attribute::new("electronic");
    pub const PRICE: Attribute<Book, f64> = Attribute::new("price");
    pub const STOCK: Attribute<Book, i32> = Attribute::new("stock");

    pub const AUTHOR: Association<Book, Author> = Association::to_one("author", "author_id", "id");
    pub const REVIEWS: Association<Book, Review> = Association::to_many("reviews", "id", "book_id");

    pub fn with_author(mut self, id: i64, name: &str) -> Self {
        self.author = Some(Author {
            id,
            name: name.to_string(),
        });
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_stock(mut self, stock: i32) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_reviews(mut self, ratings: &[i32]) -> Self {
        let book_id = self.id;
        self.reviews = ratings
            .iter()
            .enumerate()
            .map(|(i, rating)| Review {
                id: book_id * 100 + i as i64,
                book_id,
                rating: *rating,
            })
            .collect();
        self
    }
}

impl Record for Book {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::Int(self.id)),
            "isbn" => Some(Value::Text(self.isbn.clone())),
            "name" => Some(Value::Text(self.name.clone())),
            "electronic" => Some(Value::Bool(self.electronic)),
            "price" => Some(Value::from(self.price)),
            "stock" => Some(Value::Int(i64::from(self.stock))),
            "author_id" => Some(Value::from(self.author.as_ref().map(|a| a.id))),
            _ => None,
        }
    }

    fn related(&self, association: &str) -> Vec<&dyn Record> {
        match association {
            "author" => self.author.iter().map(|a| a as &dyn Record).collect(),
            "reviews" => self.reviews.iter().map(|r| r as &dyn Record).collect(),
            _ => Vec::new(),
        }
    }
}

impl Entity for Book {
    const NAME: &'static str = "book";

    fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
        match (name, value) {
            ("isbn", Value::Text(text)) => self.isbn = text,
            ("name", Value::Text(text)) => self.name = text,
            ("electronic", Value::Bool(flag)) => self.electronic = flag,
            ("price", Value::Float(price)) => self.price = Some(price),
            ("price", Value::Int(price)) => self.price = Some(price as f64),
            ("price", Value::Null) => self.price = None,
            ("stock", Value::Int(stock)) => {
                self.stock = i32::try_from(stock)
                    .map_err(|_| CriteriaError::invalid_assignment(<Self as Entity>::NAME, "stock", &Value::Int(stock)))?
            }
            (field @ ("id" | "isbn" | "name" | "electronic" | "price" | "stock"), value) => {
                return Err(CriteriaError::invalid_assignment(<Self as Entity>::NAME, field, &value))
            }
            (field, _) => return Err(CriteriaError::unknown_field(<Self as Entity>::NAME, field)),
        }
        Ok(())
    }
}

pub fn book(id: i64, name: &str, electronic: bool) -> Book {
    Book {
        id,
        isbn: format!("978-{id:04}"),
        name: name.to_string(),
        electronic,
        price: None,
        stock: 0,
        author: None,
        reviews: Vec::new(),
    }
}

/// The three rows of the electronic/name-prefix scenario
pub fn scenario_books() -> Vec<Book> {
    vec![
        book(1, "A1", true),
        book(2, "B1", true),
        book(3, "A2", false),
    ]
}

/// A small catalogue with authors, prices and reviews
pub fn catalogue() -> Vec<Book> {
    vec![
        book(1, "Dune", false)
            .with_author(10, "Herbert")
            .with_price(9.5)
            .with_stock(3)
            .with_reviews(&[5, 4]),
        book(2, "Dune Messiah", true)
            .with_author(10, "Herbert")
            .with_price(7.0)
            .with_reviews(&[3]),
        book(3, "Foundation", false)
            .with_author(20, "Asimov")
            .with_price(12.0)
            .with_stock(-1),
        book(4, "Anonymous Tales", true).with_stock(8),
        book(5, "Hyperion", true)
            .with_author(30, "Simmons")
            .with_reviews(&[2, 5, 1]),
    ]
}

pub fn ids(books: &[Book]) -> Vec<i64> {
    books.iter().map(|b| b.id).collect()
}
