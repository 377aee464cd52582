//! Archive Bridge の Docker 実装
//!
//! bollard 経由で docker save / load / tag / inspect を呼び出す。
//! エクスポートとインポートの中間バッファは ArchiveStream が所有し、
//! どの経路で抜けても一時ファイルが残らない。

use async_trait::async_trait;
use bollard::Docker;
use bytes::Bytes;
use cargohold_core::{ArchiveBridge, ArchiveStream, ImageReference, Result, TransferError};
use futures_util::StreamExt;
use http_body_util::{Either, Full};

use crate::docker::{init_docker, map_engine_error};

/// Docker をアーカイブの供給元・取り込み先として使う Bridge
pub struct DockerBridge {
    docker: Docker,
}

impl DockerBridge {
    /// Docker に接続して Bridge を作成（接続確認付き）
    pub async fn connect() -> Result<Self> {
        Ok(Self {
            docker: init_docker().await?,
        })
    }

    /// 既存のクライアントから作成
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }
}

#[async_trait]
impl ArchiveBridge for DockerBridge {
    async fn export(&self, reference: &ImageReference) -> Result<ArchiveStream> {
        let image = reference.to_string();

        // 存在確認を先に行い、404 をイメージ不在として返す
        match self.docker.inspect_image(&image).await {
            Ok(_) => {}
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => {
                return Err(TransferError::ImageNotFound { image });
            }
            Err(e) => return Err(map_engine_error(e)),
        }

        let mut archive = ArchiveStream::create()?;
        let mut stream = self.docker.export_image(&image);
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_engine_error)?;
            archive.write_chunk(&chunk)?;
        }
        archive.flush()?;

        tracing::debug!(%image, bytes = archive.len(), "image exported");
        Ok(archive)
    }

    async fn import(&self, archive: &ArchiveStream) -> Result<Vec<String>> {
        let contents = archive.read_to_bytes()?;
        let body = Full::new(Bytes::from(contents));

        #[allow(deprecated)]
        let options = bollard::image::ImportImageOptions { quiet: false };
        #[allow(deprecated)]
        let mut stream = self.docker.import_image(options, Either::Left(body), None);

        let mut loaded = Vec::new();
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(info) => {
                    if let Some(error) = info.error {
                        return Err(TransferError::Archive(error));
                    }
                    if let Some(detail) = info.error_detail {
                        let message = detail
                            .message
                            .unwrap_or_else(|| "unknown load error".to_string());
                        return Err(TransferError::Archive(message));
                    }
                    if let Some(line) = info.stream {
                        if let Some(reference) = parse_loaded_line(&line) {
                            loaded.push(reference.to_string());
                        }
                    }
                }
                Err(bollard::errors::Error::DockerResponseServerError {
                    message, ..
                }) => {
                    // エンジンがペイロードを拒否した
                    return Err(TransferError::Archive(message));
                }
                Err(e) => return Err(map_engine_error(e)),
            }
        }

        tracing::debug!(?loaded, "archive imported");
        Ok(loaded)
    }

    async fn tag(&self, source: &str, target: &str) -> Result<()> {
        let target_ref = ImageReference::parse(target)?;

        #[allow(deprecated)]
        let options = bollard::image::TagImageOptions {
            repo: target_ref.name().to_string(),
            tag: target_ref.tag().to_string(),
        };
        self.docker
            .tag_image(source, Some(options))
            .await
            .map_err(map_engine_error)?;
        Ok(())
    }

    async fn resolve_digest(&self, reference: &ImageReference) -> Result<Option<String>> {
        let image = reference.to_string();
        let inspect = match self.docker.inspect_image(&image).await {
            Ok(inspect) => inspect,
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => {
                return Err(TransferError::ImageNotFound { image });
            }
            Err(e) => return Err(map_engine_error(e)),
        };

        // RepoDigests は "name@sha256:..." 形式。ダイジェスト部分だけ取り出す。
        // 一度もレジストリに上がっていないイメージでは空になる。
        let digest = inspect
            .repo_digests
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|entry| entry.split_once('@').map(|(_, digest)| digest.to_string()));
        Ok(digest)
    }
}

/// `docker load` の出力行から読み込まれた参照を拾う
///
/// 例: "Loaded image: app:1.0" / "Loaded image ID: sha256:..."
fn parse_loaded_line(line: &str) -> Option<&str> {
    let line = line.trim();
    line.strip_prefix("Loaded image: ")
        .or_else(|| line.strip_prefix("Loaded image ID: "))
        .map(str::trim)
        .filter(|rest| !rest.is_empty())
}
