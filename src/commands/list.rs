//! List collection contents

use anyhow::Result;

use crate::collections::CollectionOutput;
use crate::content::ContentLoader;
use crate::registry::HookRegistry;
use crate::Site;

/// Lines describing a collection's entries
pub fn describe(site: &Site, collection: &str) -> Result<Vec<String>> {
    let registry = HookRegistry::standard(&site.config)?;
    let Some(hook) = registry.collection(collection) else {
        let available: Vec<&str> = registry.collection_names().collect();
        anyhow::bail!(
            "Unknown collection: {}. Available: {}",
            collection,
            available.join(", ")
        );
    };

    let records = ContentLoader::new(site).load_records()?;

    let lines = match hook.derive(&records) {
        CollectionOutput::Records(records) => records
            .iter()
            .map(|record| {
                let date = record
                    .date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "----------".to_string());
                format!(
                    "{} - {} [{}]",
                    date,
                    record.title().unwrap_or("Untitled"),
                    record.input_path
                )
            })
            .collect(),
        CollectionOutput::Values(values) => values,
    };

    Ok(lines)
}

/// Print a collection by name
pub fn run(site: &Site, collection: &str) -> Result<()> {
    let lines = describe(site, collection)?;
    println!("{} ({}):", collection, lines.len());
    for line in lines {
        println!("  {}", line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::fs;
    use tempfile::TempDir;

    fn site_with_posts() -> (TempDir, Site) {
        let dir = TempDir::new().unwrap();
        let posts = dir.path().join("posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(
            posts.join("one.md"),
            "---\ntitle: One\ndate: 2024-03-05\ntags: [rust, web]\n---\nBody\n",
        )
        .unwrap();
        fs::write(posts.join("two.md"), "---\ntags: Rust\n---\nBody\n").unwrap();
        let site = Site::with_config(dir.path(), SiteConfig::default()).unwrap();
        (dir, site)
    }

    #[test]
    fn test_describe_posts() {
        let (_dir, site) = site_with_posts();
        let lines = describe(&site, "posts").unwrap();
        assert_eq!(
            lines,
            vec![
                "2024-03-05 - One [posts/one.md]",
                "---------- - Untitled [posts/two.md]"
            ]
        );
    }

    #[test]
    fn test_describe_tags() {
        let (_dir, site) = site_with_posts();
        assert_eq!(describe(&site, "tags").unwrap(), vec!["Rust", "rust", "web"]);
    }

    #[test]
    fn test_unknown_collection() {
        let (_dir, site) = site_with_posts();
        let err = describe(&site, "drafts").unwrap_err();
        assert!(err.to_string().contains("Available: posts, projects, tags"));
    }
}
