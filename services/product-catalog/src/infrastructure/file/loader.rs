//! 商品文件加载

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::{Product, ProductList};
use crate::error::CatalogError;

/// 从目录读取所有 `.json` 商品文件
///
/// 文件按文件名排序后依次解析，结果按文件顺序、文件内顺序拼接。
/// 任意一个文件读取或解析失败，整次加载失败。
#[derive(Debug, Clone)]
pub struct ProductFileLoader {
    dir: PathBuf,
    suffix: String,
}

impl ProductFileLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            suffix: ".json".to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 目录中参与加载的文件，按文件名排序
    pub fn eligible_files(&self) -> Result<Vec<PathBuf>, CatalogError> {
        let read_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| CatalogError::Read { path, source }
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(read_err(&self.dir))? {
            let entry = entry.map_err(read_err(&self.dir))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(read_err(&path))?;

            // 按文件名后缀匹配，名为 `.json` 的文件同样参与加载
            let eligible = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(self.suffix.as_str()));
            if eligible && !file_type.is_dir() {
                files.push(path);
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// 加载全部商品
    pub fn load(&self) -> Result<Vec<Product>, CatalogError> {
        let mut products = Vec::new();

        for path in self.eligible_files()? {
            let data = fs::read(&path).map_err(|source| CatalogError::Read {
                path: path.clone(),
                source,
            })?;
            let list: ProductList = serde_json::from_slice(&data).map_err(|source| CatalogError::Parse {
                path: path.clone(),
                source,
            })?;

            debug!(file = %path.display(), products = list.products.len(), "Parsed product file");
            products.extend(list.products);
        }

        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, ids: &[&str]) {
        let products: Vec<_> = ids
            .iter()
            .map(|id| serde_json::json!({ "id": id, "name": format!("Product {}", id) }))
            .collect();
        fs::write(dir.join(name), serde_json::json!({ "products": products }).to_string()).unwrap();
    }

    #[test]
    fn test_load_concatenates_in_file_name_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.json", &["B1", "B2"]);
        write(dir.path(), "a.json", &["A1", "A2"]);
        write(dir.path(), "c.json", &["C1"]);

        let ids: Vec<_> = ProductFileLoader::new(dir.path())
            .load()
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["A1", "A2", "B1", "B2", "C1"]);
    }

    #[test]
    fn test_other_extensions_are_ignored() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.json", &["A1"]);
        fs::write(dir.path().join("notes.txt"), "not json").unwrap();
        fs::write(dir.path().join("a.json.bak"), "not json").unwrap();
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let products = ProductFileLoader::new(dir.path()).load().unwrap();
        assert_eq!(products.len(), 1);
    }

    #[test]
    fn test_bare_suffix_file_name_is_loaded() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".json", &["H1"]);
        write(dir.path(), "a.json", &["A1"]);

        let files = ProductFileLoader::new(dir.path()).eligible_files().unwrap();
        assert_eq!(files.len(), 2);

        let ids: Vec<_> = ProductFileLoader::new(dir.path())
            .load()
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["H1", "A1"]);
    }

    #[test]
    fn test_empty_directory_loads_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(ProductFileLoader::new(dir.path()).load().unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = ProductFileLoader::new(dir.path().join("missing")).load().unwrap_err();
        assert!(err.is_read());
    }

    #[test]
    fn test_one_bad_file_fails_the_whole_load() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.json", &["A1"]);
        fs::write(dir.path().join("b.json"), r#"{"products": [{"id": 7}]}"#).unwrap();

        let err = ProductFileLoader::new(dir.path()).load().unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("b.json"));
    }
}
