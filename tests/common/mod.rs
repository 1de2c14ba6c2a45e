// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use dispendio::application::HierarchyService;
use dispendio::domain::{CategoryId, Principal, TagId};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(HierarchyService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = HierarchyService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

pub fn jimmy() -> Principal {
    Principal::user("jimmy")
}

pub fn mallory() -> Principal {
    Principal::user("mallory")
}

/// Seed one category and two tags; returns (category_id, tag_ids).
pub async fn seed_refdata(service: &HierarchyService) -> Result<(CategoryId, Vec<TagId>)> {
    let category = service.refdata().create_category("electronics").await?;
    let gadgets = service.refdata().create_tag("gadgets").await?;
    let work = service.refdata().create_tag("work").await?;
    Ok((category.id, vec![gadgets.id, work.id]))
}
