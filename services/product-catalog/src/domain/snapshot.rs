//! 目录快照

use super::Product;

/// 某一时刻完整、一致的商品列表
///
/// 只能整体替换，不会被原地修改
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    products: Vec<Product>,
    /// 安装序号，空的初始快照为 0
    generation: u64,
}

impl CatalogSnapshot {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            generation: 0,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// 按 ID 精确查找
    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// 名称或描述包含查询串的商品，保持快照顺序
    pub fn search(&self, query: &str) -> Vec<Product> {
        let needle = query.to_lowercase();
        self.products
            .iter()
            .filter(|p| p.matches_lowercase(&needle))
            .cloned()
            .collect()
    }
}

impl From<Vec<Product>> for CatalogSnapshot {
    fn from(products: Vec<Product>) -> Self {
        Self::new(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, description: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            ..Product::default()
        }
    }

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::new(vec![
            product("B", "Roof Binoculars", "Compact roof prism binoculars"),
            product("A", "Solar Filter", "Protects your telescope"),
            product("C", "Red Flashlight", "Preserves night vision"),
        ])
    }

    #[test]
    fn test_find() {
        let snapshot = snapshot();
        assert_eq!(snapshot.find("A").map(|p| p.name.as_str()), Some("Solar Filter"));
        assert!(snapshot.find("a").is_none());
        assert!(snapshot.find("Z").is_none());
    }

    #[test]
    fn test_search_keeps_snapshot_order() {
        let ids: Vec<_> = snapshot().search("").into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_search_matches_description() {
        let ids: Vec<_> = snapshot().search("TELESCOPE").into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["A"]);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = CatalogSnapshot::empty();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.generation(), 0);
        assert!(snapshot.search("").is_empty());
    }
}
