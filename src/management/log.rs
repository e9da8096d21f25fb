use std::{
    io,
    path::{Path, PathBuf},
};

use async_fs::OpenOptions;
use chrono::Utc;
use futures::io::AsyncWriteExt;

use crate::config;

/// Append-only, line-oriented record of what a run did to each item.
///
/// One line per processed item: `timestamp<TAB>outcome<TAB>item<TAB>detail`.
/// The file is opened for every line, so a crash never loses earlier entries.
#[derive(Debug, Clone)]
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/logs/<driver>.log`
    pub fn for_driver(driver: &str) -> Self {
        Self::new(
            config::data_dir()
                .join("logs")
                .join(format!("{}.log", driver)),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a run separator.
    pub async fn begin_run(&self, title: &str) -> io::Result<()> {
        let line = format!("# {} {}\n", Utc::now().to_rfc3339(), title);
        self.write_line(&line).await
    }

    pub async fn append(&self, outcome: &str, item: &str, detail: &str) -> io::Result<()> {
        let line = format!(
            "{}\t{}\t{}\t{}\n",
            Utc::now().to_rfc3339(),
            outcome,
            single_line(item),
            single_line(detail)
        );
        self.write_line(&line).await
    }

    async fn write_line(&self, line: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                async_fs::create_dir_all(parent).await?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

fn single_line(text: &str) -> String {
    text.replace(['\n', '\r', '\t'], " ")
}
