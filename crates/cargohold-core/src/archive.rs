//! アーカイブの一時バッファ
//!
//! シリアライズされたイメージを一時ファイルに保持する。所有者は作成した
//! オペレーションのみで、Drop 時に必ずファイルが削除される。

use crate::error::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// 一時ファイルに裏打ちされたアーカイブのバイト列
#[derive(Debug)]
pub struct ArchiveStream {
    file: NamedTempFile,
    len: u64,
}

impl ArchiveStream {
    /// 空のアーカイブバッファを作成
    pub fn create() -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("cargohold-")
            .suffix(".tar")
            .tempfile()?;
        Ok(Self { file, len: 0 })
    }

    /// バイト列から作成（テストやフェイク実装用にも使う）
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = Self::create()?;
        archive.write_chunk(bytes)?;
        Ok(archive)
    }

    /// チャンクを追記する
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.file.as_file_mut().write_all(chunk)?;
        self.len += chunk.len() as u64;
        Ok(())
    }

    /// 書き込みを終えてバッファをフラッシュする
    pub fn flush(&mut self) -> Result<()> {
        self.file.as_file_mut().flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 内容全体を読み出す
    pub fn read_to_bytes(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(self.path())?)
    }
}
