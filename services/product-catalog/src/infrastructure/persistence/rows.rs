//! 数据库行映射结构

use sqlx::FromRow;

use crate::domain::{Money, Product};

/// products 表的一行
#[derive(Debug, FromRow)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub picture: String,
    pub price_currency_code: String,
    pub price_units: i64,
    pub price_nanos: i32,
    pub categories: Vec<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            picture: row.picture,
            price_usd: Money::new(row.price_currency_code, row.price_units, row.price_nanos),
            categories: row.categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_into_product() {
        let row = ProductRow {
            id: "L9ECAV7KIM".to_string(),
            name: "Lens Cleaning Kit".to_string(),
            description: "Wipe away dust".to_string(),
            picture: "LensCleaningKit.jpg".to_string(),
            price_currency_code: "USD".to_string(),
            price_units: 21,
            price_nanos: 950_000_000,
            categories: vec!["accessories".to_string()],
        };

        let product = Product::from(row);
        assert_eq!(product.price_usd, Money::new("USD", 21, 950_000_000));
        assert_eq!(product.categories, vec!["accessories"]);
    }
}
