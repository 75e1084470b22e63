//! Filesystem helpers - 상위 폴더 탐색, 디렉토리 복사

use crate::Result;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// `start_dir`부터 위로 올라가며 `folder_name` 디렉토리를 찾는다.
///
/// 각 단계에서 `<current>/<folder_name>`이 디렉토리면 그 경로를 반환.
/// stat 실패는 "없음"으로 보고 계속 올라간다. 루트에 도달하면 `None`.
pub async fn locate_folder(start_dir: &Path, folder_name: &str) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let candidate = current.join(folder_name);
        if let Ok(meta) = tokio::fs::metadata(&candidate).await {
            if meta.is_dir() {
                debug!(path = %candidate.display(), "Located folder");
                return Some(candidate);
            }
        }

        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            _ => break,
        }
    }

    None
}

/// `src_dir`의 내용을 `dest_dir`로 복사한다.
///
/// - 대상 디렉토리가 없으면 생성 (중간 경로 포함)
/// - 하위 디렉토리는 `recursive`일 때만 내려감
/// - 파일은 덮어씀
/// - 원본이 없으면 경고만 남기고 성공 처리
pub async fn copy_dir(src_dir: &Path, dest_dir: &Path, recursive: bool) -> Result<()> {
    let mut pending = vec![(src_dir.to_path_buf(), dest_dir.to_path_buf())];

    while let Some((src, dest)) = pending.pop() {
        tokio::fs::create_dir_all(&dest).await?;

        let mut entries = match tokio::fs::read_dir(&src).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(src = %src.display(), "Copy source not found, skipping");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let src_path = entry.path();
            let dest_path = dest.join(entry.file_name());

            if entry.file_type().await?.is_dir() {
                if recursive {
                    pending.push((src_path, dest_path));
                }
                continue;
            }

            match tokio::fs::copy(&src_path, &dest_path).await {
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    warn!(src = %src_path.display(), "Copy source entry vanished, skipping");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree(root: &Path) {
        std::fs::create_dir_all(root.join("sub")).unwrap();
        std::fs::write(root.join("a.txt"), "alpha").unwrap();
        std::fs::write(root.join("sub").join("b.txt"), "beta").unwrap();
    }

    #[tokio::test]
    async fn test_locate_folder_from_descendant() {
        let dir = tempfile::tempdir().unwrap();
        let pool = dir.path().join("aos-data-pool");
        let deep = dir.path().join("projects").join("demo").join("src");
        std::fs::create_dir_all(&pool).unwrap();
        std::fs::create_dir_all(&deep).unwrap();

        let found = locate_folder(&deep, "aos-data-pool").await;
        assert_eq!(found, Some(pool));
    }

    #[tokio::test]
    async fn test_locate_folder_includes_start_dir() {
        let dir = tempfile::tempdir().unwrap();
        let pool = dir.path().join("pool");
        std::fs::create_dir_all(&pool).unwrap();

        assert_eq!(locate_folder(dir.path(), "pool").await, Some(pool));
    }

    #[tokio::test]
    async fn test_locate_folder_ignores_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("aos-data-pool-file-marker"), "x").unwrap();

        let found = locate_folder(dir.path(), "aos-data-pool-file-marker").await;
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_locate_folder_not_found_reaches_root() {
        let dir = tempfile::tempdir().unwrap();
        let found = locate_folder(dir.path(), "no-such-folder-7f3a9c").await;
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_locate_folder_missing_start_dir() {
        let found = locate_folder(Path::new("/definitely/not/here"), "no-such-folder-7f3a9c").await;
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_copy_dir_shallow_skips_subdirs() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("out").join("nested");
        sample_tree(&src);

        copy_dir(&src, &dest, false).await.unwrap();

        assert_eq!(std::fs::read_to_string(dest.join("a.txt")).unwrap(), "alpha");
        assert!(!dest.join("sub").exists());
    }

    #[tokio::test]
    async fn test_copy_dir_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        sample_tree(&src);

        copy_dir(&src, &dest, true).await.unwrap();

        assert_eq!(std::fs::read_to_string(dest.join("a.txt")).unwrap(), "alpha");
        assert_eq!(
            std::fs::read_to_string(dest.join("sub").join("b.txt")).unwrap(),
            "beta"
        );
    }

    #[tokio::test]
    async fn test_copy_dir_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        sample_tree(&src);
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("a.txt"), "stale").unwrap();

        copy_dir(&src, &dest, false).await.unwrap();

        assert_eq!(std::fs::read_to_string(dest.join("a.txt")).unwrap(), "alpha");
    }

    #[tokio::test]
    async fn test_copy_dir_missing_source_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dest");

        copy_dir(&dir.path().join("missing"), &dest, false)
            .await
            .unwrap();
        assert!(dest.exists());
    }
}
