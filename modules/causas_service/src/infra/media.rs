//! Local filesystem storage for uploaded attachments

use crate::contract::Upload;
use crate::domain::MediaStore;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

const NOMBRE_MAX: usize = 100;

/// Stores uploads under `<root>/adjuntos/<yyyy>/<mm>/<uuid>_<name>`
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a stored path; rejects anything escaping the root
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            bail!("invalid media path '{}'", relative.display());
        }
        Ok(self.root.join(relative))
    }
}

/// Keep the final path segment and only portable characters
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');

    if cleaned.is_empty() {
        return "archivo".to_string();
    }

    // Keep the extension when truncating
    if cleaned.chars().count() > NOMBRE_MAX {
        let ext = cleaned
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| ext.len() <= 10)
            .unwrap_or_default();
        let keep = NOMBRE_MAX.saturating_sub(ext.len() + 1);
        let stem: String = cleaned.chars().take(keep).collect();
        return if ext.is_empty() {
            stem
        } else {
            format!("{}.{}", stem, ext)
        };
    }

    cleaned.to_string()
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn save(&self, upload: &Upload, now: DateTime<Utc>) -> Result<String> {
        let relative = format!(
            "adjuntos/{:04}/{:02}/{}_{}",
            now.year(),
            now.month(),
            Uuid::new_v4().simple(),
            sanitize_file_name(&upload.nombre)
        );
        let target = self.resolve(&relative)?;

        if let Some(dir) = target.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        tokio::fs::write(&target, &upload.bytes)
            .await
            .with_context(|| format!("writing {}", target.display()))?;

        tracing::debug!(path = %relative, bytes = upload.bytes.len(), "upload written");
        Ok(relative)
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("removing {}", target.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("demanda.pdf"), "demanda.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\escrito final.docx"), "escrito_final.docx");
        assert_eq!(sanitize_file_name(".."), "archivo");
        assert_eq!(sanitize_file_name(""), "archivo");

        let long = format!("{}.pdf", "a".repeat(300));
        let cleaned = sanitize_file_name(&long);
        assert_eq!(cleaned.len(), NOMBRE_MAX);
        assert!(cleaned.ends_with(".pdf"));
    }

    #[test]
    fn test_resolve_rejects_escapes() {
        let store = LocalMediaStore::new("/srv/media");
        assert!(store.resolve("../secret").is_err());
        assert!(store.resolve("/etc/passwd").is_err());
        assert_eq!(
            store.resolve("adjuntos/2024/03/x.pdf").unwrap(),
            PathBuf::from("/srv/media/adjuntos/2024/03/x.pdf")
        );
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path());
        let upload = Upload {
            nombre: "escrito.pdf".into(),
            content_type: Some("application/pdf".into()),
            bytes: b"%PDF-1.4".to_vec(),
        };
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap();

        let path = store.save(&upload, now).await.unwrap();
        assert!(path.starts_with("adjuntos/2024/03/"));
        assert!(path.ends_with("_escrito.pdf"));
        let stored = tokio::fs::read(dir.path().join(&path)).await.unwrap();
        assert_eq!(stored, upload.bytes);

        store.remove(&path).await.unwrap();
        assert!(!dir.path().join(&path).exists());
        // Second removal is a no-op
        store.remove(&path).await.unwrap();
    }
}
