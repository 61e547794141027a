use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use graph::{Result, StructuredQuery};

/// Write-once record of generated queries, one file per request.
#[derive(Debug, Clone)]
pub struct QueryLog {
    dir: PathBuf,
}

impl QueryLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn record(&self, question: &str, query: &StructuredQuery) -> Result<PathBuf> {
        self.record_at(question, query, Local::now()).await
    }

    pub async fn record_at(
        &self,
        question: &str,
        query: &StructuredQuery,
        at: DateTime<Local>,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).await?;

        let stem = format!("query_{}", at.format("%Y_%m_%d-%I_%M_%S_%p"));
        let contents = format!("# User input: {question}\n{query}");

        // Two requests inside the same second get a numeric suffix.
        let mut attempt = 1;
        loop {
            let name = if attempt == 1 {
                format!("{stem}.txt")
            } else {
                format!("{stem}_{attempt}.txt")
            };
            let path = self.dir.join(name);

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(contents.as_bytes()).await?;
                    file.flush().await?;
                    info!(path = %path.display(), "Query written to log");
                    return Ok(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[tokio::test]
    async fn test_record_names_file_by_timestamp() {
        let dir = TempDir::new().unwrap();
        let log = QueryLog::new(dir.path().join("queries"));
        let query = StructuredQuery::new("query q { meta { name } }");

        let path = log.record_at("Which version?", &query, fixed_time()).await.unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "query_2024_03_09-02_05_07_PM.txt"
        );
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "# User input: Which version?\nquery q { meta { name } }");
    }

    #[tokio::test]
    async fn test_same_second_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let log = QueryLog::new(dir.path());
        let first = log
            .record_at("a", &StructuredQuery::new("query a { x }"), fixed_time())
            .await
            .unwrap();
        let second = log
            .record_at("b", &StructuredQuery::new("query b { y }"), fixed_time())
            .await
            .unwrap();

        assert_ne!(first, second);
        assert!(std::fs::read_to_string(first).unwrap().contains("query a"));
        assert!(second.to_str().unwrap().ends_with("_2.txt"));
    }
}
