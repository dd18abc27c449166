//! Daily flat-file log of extracted metrics.
//!
//! One file per local calendar day, named `results-<day>-<month>-<year>`
//! without zero padding. Each completed fetch appends a single line whose
//! labels and field order are consumed by existing tooling and must not
//! change.

use crate::error::GtmetrixResult;
use crate::types::TestResults;
use chrono::{Datelike, Local, NaiveDate};
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ResultsLog {
    dir: PathBuf,
}

impl ResultsLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_name(date: NaiveDate) -> String {
        format!("results-{}-{}-{}", date.day(), date.month(), date.year())
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(Self::file_name(date))
    }

    pub fn format_line(key: &str, results: &TestResults) -> String {
        format!(
            "site:{} pagespeed:{} yslow:{} tempo_carregamento:{} tamanho_pagina:{} total_elementos:{} \n",
            key,
            results.pagespeed_score,
            results.yslow_score,
            results.page_load_time,
            results.page_bytes,
            results.page_elements
        )
    }

    /// Append `key`'s metrics to today's file, returning the path written.
    pub async fn append(&self, key: &str, results: &TestResults) -> GtmetrixResult<PathBuf> {
        self.append_on(Local::now().date_naive(), key, results).await
    }

    pub async fn append_on(
        &self,
        date: NaiveDate,
        key: &str,
        results: &TestResults,
    ) -> GtmetrixResult<PathBuf> {
        let path = self.path_for(date);
        let line = Self::format_line(key, results);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!("Appended results for {} to {}", key, path.display());
        Ok(path)
    }
}
