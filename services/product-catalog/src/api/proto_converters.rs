//! Domain to Proto conversions

use crate::domain::{Money, Product};
use crate::proto;

pub fn money_to_proto(money: &Money) -> proto::Money {
    proto::Money {
        currency_code: money.currency_code.clone(),
        units: money.units,
        nanos: money.nanos,
    }
}

pub fn product_to_proto(product: Product) -> proto::Product {
    proto::Product {
        price_usd: Some(money_to_proto(&product.price_usd)),
        id: product.id,
        name: product.name,
        description: product.description,
        picture: product.picture,
        categories: product.categories,
    }
}

pub fn products_to_proto(products: Vec<Product>) -> Vec<proto::Product> {
    products.into_iter().map(product_to_proto).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_to_proto() {
        let product = Product {
            id: "OLJCESPC7Z".to_string(),
            name: "National Park Foundation Explorascope".to_string(),
            description: "Entry-level refractor".to_string(),
            picture: "NationalParkFoundationExplorascope.jpg".to_string(),
            price_usd: Money::new("USD", 101, 960_000_000),
            categories: vec!["telescopes".to_string()],
        };

        let p = product_to_proto(product);
        assert_eq!(p.id, "OLJCESPC7Z");
        let price = p.price_usd.unwrap();
        assert_eq!((price.currency_code.as_str(), price.units, price.nanos), ("USD", 101, 960_000_000));
        assert_eq!(p.categories, vec!["telescopes"]);
    }
}
