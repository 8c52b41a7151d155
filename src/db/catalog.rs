//! Problem catalog loader
//!
//! Reads problem documents from a directory of `.json` files. A file holds
//! either one problem or an array of problems. Documents without an `id`
//! take the file stem (single problem) or a slug of the title (array).

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use super::MemoryProblemStore;
use crate::error::{JudgeError, JudgeResult};
use crate::models::ProblemDefinition;

/// Load every problem document under `dir`
pub async fn load_problem_directory(dir: &Path) -> JudgeResult<MemoryProblemStore> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        JudgeError::Configuration(format!("Cannot read problem directory {}: {}", dir.display(), e))
    })?;

    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| JudgeError::Storage(e.to_string()))?
    {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let store = MemoryProblemStore::new();
    for path in paths {
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| JudgeError::Storage(format!("{}: {}", path.display(), e)))?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        for problem in parse_document(&raw, &stem)
            .map_err(|e| JudgeError::Configuration(format!("{}: {}", path.display(), e)))?
        {
            debug!(problem_id = %problem.id, file = %path.display(), "Loaded problem");
            if store.contains(&problem.id).await {
                return Err(JudgeError::Configuration(format!(
                    "Duplicate problem id '{}' in {}",
                    problem.id,
                    path.display()
                )));
            }
            store.insert(problem).await;
        }
    }

    let count = store.len().await;
    info!(count, dir = %dir.display(), "Problem catalog loaded");
    Ok(store)
}

/// Parse one file's contents into problems
pub fn parse_document(raw: &str, stem: &str) -> Result<Vec<ProblemDefinition>, serde_json::Error> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Array(items) => items
            .into_iter()
            .map(|mut item| {
                let slug = item.get("title").and_then(Value::as_str).map(slugify);
                if let Some(slug) = slug {
                    default_id(&mut item, &slug);
                }
                serde_json::from_value(item)
            })
            .collect(),
        mut item => {
            default_id(&mut item, stem);
            Ok(vec![serde_json::from_value(item)?])
        }
    }
}

fn default_id(item: &mut Value, id: &str) {
    if let Value::Object(map) = item {
        map.entry("id").or_insert_with(|| Value::String(id.to_string()));
    }
}

/// Lower-case, dash separated form of a title ("Two Sum" -> "two-sum")
pub fn slugify(title: &str) -> String {
    title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
