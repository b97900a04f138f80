// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::domain::models::observation::Observation;
use crate::domain::repositories::result_repository::{ResultRepository, SinkError};

/// 结果文件的固定列
pub const HEADER: [&str; 4] = ["job_title", "location", "ts", "count"];

/// 只追加的 CSV 结果存储
///
/// 每次 `append` 都会重新检查表头、写入一行并 fsync，
/// 进程在两个搜索词之间被杀掉也不会丢失已写入的行
pub struct CsvResultSink {
    path: PathBuf,
}

impl CsvResultSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ResultRepository for CsvResultSink {
    async fn append(&self, observation: &Observation) -> Result<(), SinkError> {
        let path = self.path.clone();
        let observation = observation.clone();

        tokio::task::spawn_blocking(move || append_blocking(&path, &observation))
            .await
            .map_err(|e| SinkError::Join(e.to_string()))?
    }

    async fn check(&self) -> Result<(), SinkError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || match fs::metadata(&path) {
            Ok(meta) if meta.len() > 0 => validate_header(&path),
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        })
        .await
        .map_err(|e| SinkError::Join(e.to_string()))?
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

fn append_blocking(path: &Path, observation: &Observation) -> Result<(), SinkError> {
    let is_new = match fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => return Err(e.into()),
    };

    if is_new {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
    } else {
        validate_header(path)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if !is_new && !ends_with_newline(path)? {
        file.write_all(b"\n")?;
    }

    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut file);
        if is_new {
            writer.write_record(HEADER)?;
        }
        writer.serialize(observation)?;
        writer.flush()?;
    }
    file.sync_data()?;

    tracing::debug!(
        path = %path.display(),
        job_title = %observation.job_title,
        location = %observation.location,
        count = observation.count,
        "observation appended"
    );
    Ok(())
}

fn validate_header(path: &Path) -> Result<(), SinkError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let found: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if found.iter().map(String::as_str).ne(HEADER.iter().copied()) {
        return Err(SinkError::SchemaMismatch {
            path: path.display().to_string(),
            expected: HEADER.join(","),
            found: found.join(","),
        });
    }
    Ok(())
}

fn ends_with_newline(path: &Path) -> Result<bool, SinkError> {
    let mut file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// 读回整个结果文件
pub fn read_all(path: &Path) -> Result<Vec<Observation>, SinkError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut observations = Vec::new();
    for record in reader.deserialize() {
        observations.push(record?);
    }
    Ok(observations)
}
