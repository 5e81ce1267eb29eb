use crate::models::product::{ProductContext, ProductFile};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载产品列表
pub async fn load_toml_to_product_file(toml_file_path: &Path) -> Result<ProductFile> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let mut file: ProductFile = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    file.file_path = Some(toml_file_path.to_string_lossy().to_string());

    Ok(file)
}

/// 从文件夹中加载所有 TOML 文件，合并为一个产品列表
///
/// 单个文件解析失败只记录警告，不影响其他文件。
pub async fn load_all_products(folder_path: &str) -> Result<Vec<ProductContext>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    // 目录遍历顺序不稳定，排序保证每次处理顺序一致
    toml_files.sort();

    let mut products = Vec::new();
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_toml_to_product_file(&path).await {
            Ok(file) => {
                tracing::info!("成功加载 {} 个产品", file.products.len());
                products.extend(file.products);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("seo_refiner_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn loads_every_toml_file_and_skips_broken_ones() {
        let dir = temp_dir("loader");
        std::fs::write(
            dir.join("a.toml"),
            "[[products]]\nname = \"Lamp\"\nfeatures = \"LED, dimmable\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("b.toml"),
            "[[products]]\nname = \"Mug\"\nfeatures = [\"ceramic\"]\n\n\
             [[products]]\nname = \"Bottle\"\n",
        )
        .unwrap();
        std::fs::write(dir.join("broken.toml"), "[[products]\nname = ").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let products = load_all_products(dir.to_str().unwrap()).await.unwrap();
        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Lamp", "Mug", "Bottle"]);
        assert!(products[2].features.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_folder_is_an_error() {
        let result = load_all_products("/definitely/not/here/seo_refiner").await;
        assert!(result.is_err());
    }
}
