// Copyright 2025 iorgate Contributors
// SPDX-License-Identifier: Apache-2.0

//! Client host files for the MPI launcher.

use crate::error::{Result, RunError};
use std::path::{Path, PathBuf};

/// Render a host file with `slots` processes per host.
pub fn render_hostfile(hosts: &[String], slots: u32) -> Result<String> {
    if hosts.is_empty() {
        return Err(RunError::HostFile("no client hosts".to_string()));
    }
    if slots == 0 {
        return Err(RunError::HostFile("slots must be at least 1".to_string()));
    }
    Ok(hosts
        .iter()
        .map(|host| format!("{host} slots={slots}\n"))
        .collect())
}

/// Write a host file to `path` and return the path.
pub async fn write_hostfile(path: &Path, hosts: &[String], slots: u32) -> Result<PathBuf> {
    let contents = render_hostfile(hosts, slots)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts() -> Vec<String> {
        vec!["client-1".to_string(), "client-2".to_string()]
    }

    #[test]
    fn test_render_one_line_per_host() {
        assert_eq!(
            render_hostfile(&hosts(), 16).unwrap(),
            "client-1 slots=16\nclient-2 slots=16\n"
        );
    }

    #[test]
    fn test_render_rejects_empty() {
        assert!(render_hostfile(&[], 8).is_err());
        assert!(render_hostfile(&hosts(), 0).is_err());
    }

    #[tokio::test]
    async fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run/hostfile-testID_1");
        let written = write_hostfile(&path, &hosts(), 8).await.unwrap();
        assert_eq!(written, path);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("client-1 slots=8\n"));
    }
}
