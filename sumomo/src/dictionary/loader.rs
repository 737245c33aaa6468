//! 辞書アーティファクトの非同期読み込み
//!
//! 解析前の唯一の非同期境界です。読み込みが完了してから辞書を組み立てます。

use std::future::Future;
use std::path::{Path, PathBuf};

use futures::future::try_join_all;

use crate::dictionary::artifact::{ArtifactName, Artifacts};
use crate::errors::{Result, SumomoError};

/// 圧縮されたアーティファクトの拡張子
pub const ZSTD_EXTENSION: &str = "zst";

const ZSTD_LEVEL: i32 = 19;

/// 論理名からバイト列への写像を返すローダー
pub trait ArtifactLoader {
    /// すべてのアーティファクトを読み込みます。
    fn load(&self) -> impl Future<Output = Result<Artifacts>> + Send;
}

/// ディレクトリに置かれたファイルからアーティファクトを読み込むローダー
///
/// `<論理名>`のファイルを優先し、存在しなければ`<論理名>.zst`を展開して使います。
#[derive(Clone, Debug)]
pub struct DirectoryLoader {
    dir: PathBuf,
}

impl DirectoryLoader {
    pub fn new<P>(dir: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self { dir: dir.into() }
    }

    #[inline(always)]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn load_one(&self, name: ArtifactName) -> Result<(ArtifactName, Vec<u8>)> {
        let path = self.dir.join(name.as_str());
        if tokio::fs::try_exists(&path).await? {
            let bytes = tokio::fs::read(&path).await?;
            log::debug!("Loaded {} ({} bytes)", path.display(), bytes.len());
            return Ok((name, bytes));
        }

        let zst_path = self
            .dir
            .join(format!("{}.{ZSTD_EXTENSION}", name.as_str()));
        if tokio::fs::try_exists(&zst_path).await? {
            let compressed = tokio::fs::read(&zst_path).await?;
            let bytes = zstd::decode_all(compressed.as_slice())?;
            log::debug!(
                "Loaded {} ({} bytes, {} bytes decompressed)",
                zst_path.display(),
                compressed.len(),
                bytes.len()
            );
            return Ok((name, bytes));
        }

        Err(SumomoError::MissingArtifact(format!(
            "{} is not found in {}",
            name,
            self.dir.display()
        )))
    }

    /// アーティファクトをディレクトリに書き出します。
    ///
    /// `compress`が`true`の場合は`<論理名>.zst`としてZstandard圧縮して書き出します。
    pub async fn store(&self, artifacts: &Artifacts, compress: bool) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let writes = artifacts.iter().map(|(name, bytes)| async move {
            if compress {
                let path = self
                    .dir
                    .join(format!("{}.{ZSTD_EXTENSION}", name.as_str()));
                let compressed = zstd::encode_all(bytes, ZSTD_LEVEL)?;
                tokio::fs::write(path, compressed).await?;
            } else {
                tokio::fs::write(self.dir.join(name.as_str()), bytes).await?;
            }
            Ok::<_, SumomoError>(())
        });
        try_join_all(writes).await?;
        log::debug!("Stored {} artifacts in {}", artifacts.len(), self.dir.display());
        Ok(())
    }
}

impl ArtifactLoader for DirectoryLoader {
    async fn load(&self) -> Result<Artifacts> {
        let loaded = try_join_all(ArtifactName::ALL.map(|name| self.load_one(name))).await?;
        Ok(loaded.into_iter().collect())
    }
}

/// メモリ上のアーティファクトをそのまま返すローダー
impl ArtifactLoader for Artifacts {
    async fn load(&self) -> Result<Artifacts> {
        Ok(self.clone())
    }
}
