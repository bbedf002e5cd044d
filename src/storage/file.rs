// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::{error::Result, metadata};

use super::{IsPersistent, Storage};

pub(crate) struct File {
    path: PathBuf,
}

impl File {
    pub(crate) fn new<P: AsRef<Path>>(file: P) -> Option<Self> {
        metadata::PROJECT_DIRS
            .as_ref()
            .map(|dirs| Self::at(dirs.data_dir().join(file)))
    }

    pub(crate) fn at<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl IsPersistent for File {
    fn is_persistent(&self) -> bool {
        true
    }
}

#[async_trait]
impl<T: Send + Serialize + Sync + for<'de> Deserialize<'de>> Storage<T> for File {
    async fn get(&mut self) -> Result<Option<T>> {
        match fs::read(&self.path).await {
            Ok(data) => Ok(Some(serde_json::from_slice::<T>(&data)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&mut self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, serde_json::to_vec(data)?).await?;
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            Ok(()) | Err(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{env, process};

    use crate::error::Result;

    use super::*;

    fn scratch(name: &str) -> PathBuf {
        env::temp_dir()
            .join(format!("lt-console-{}", process::id()))
            .join(name)
    }

    #[tokio::test]
    async fn round_trips_and_clears() -> Result<()> {
        let mut storage = File::at(scratch("round-trip.json"));

        Storage::<String>::update(&mut storage, &"a.b.c".to_owned()).await?;
        assert_eq!(Storage::<String>::get(&mut storage).await?, Some("a.b.c".to_owned()));

        Storage::<String>::clear(&mut storage).await?;
        assert_eq!(Storage::<String>::get(&mut storage).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn clearing_an_empty_slot_succeeds() -> Result<()> {
        let mut storage = File::at(scratch("never-written.json"));

        Storage::<String>::clear(&mut storage).await?;
        Storage::<String>::clear(&mut storage).await?;
        Ok(())
    }
}
