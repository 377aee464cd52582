//! 転送オペレーションの契約
//!
//! コンテナエンジン側とオブジェクトストレージ側をそれぞれトレイトで抽象化し、
//! push / pull をその上で編成する。実装を差し替えられるため、フェイクを使った
//! 呼び出し順序・回数の検証が可能になる。

use crate::archive::ArchiveStream;
use crate::error::{Result, TransferError};
use crate::key::ObjectKey;
use crate::reference::ImageReference;
use async_trait::async_trait;

/// コンテナエンジンのエクスポート / インポート契約
#[async_trait]
pub trait ArchiveBridge: Send + Sync {
    /// イメージをシリアライズしてアーカイブにする
    async fn export(&self, reference: &ImageReference) -> Result<ArchiveStream>;

    /// アーカイブをエンジンに読み込ませ、読み込まれた参照を返す
    async fn import(&self, archive: &ArchiveStream) -> Result<Vec<String>>;

    /// `source` に `target` のタグを付ける
    async fn tag(&self, source: &str, target: &str) -> Result<()>;

    /// イメージのリポジトリダイジェストを調べる（存在しなければ None）
    async fn resolve_digest(&self, reference: &ImageReference) -> Result<Option<String>>;
}

/// オブジェクトストレージの put / get 契約
#[async_trait]
pub trait ObjectTransfer: Send + Sync {
    /// アーカイブをアップロードし、オブジェクトの場所を返す
    async fn put(&self, bucket: &str, key: &ObjectKey, archive: &ArchiveStream) -> Result<String>;

    /// オブジェクトをダウンロードして新しいアーカイブにする
    async fn get(&self, bucket: &str, key: &ObjectKey) -> Result<ArchiveStream>;
}

#[derive(Debug, Clone)]
pub struct PushRequest {
    pub image: String,
    pub bucket: String,
}

#[derive(Debug, Clone)]
pub struct PullRequest {
    pub key: String,
    pub bucket: String,
}

#[derive(Debug)]
pub struct PushOutcome {
    pub key: ObjectKey,
    pub location: String,
    pub bytes: u64,
    pub digest: Option<String>,
}

#[derive(Debug)]
pub struct PullOutcome {
    pub bytes: u64,
    pub loaded: Vec<String>,
    pub retagged: Option<String>,
    /// タグ付けに失敗しても pull 自体は成功として扱い、警告だけ持ち帰る
    pub tag_warning: Option<String>,
}

/// イメージをエクスポートしてバケットへアップロードする
///
/// 検証 → ダイジェスト解決 → エクスポート → キー導出 → アップロードの順で、
/// どの段階の失敗も即座に呼び出し元へ返す。リトライはしない。
pub async fn push_image<B, S>(bridge: &B, store: &S, request: &PushRequest) -> Result<PushOutcome>
where
    B: ArchiveBridge,
    S: ObjectTransfer,
{
    if request.bucket.trim().is_empty() {
        return Err(TransferError::Validation(
            "バケット名が空です".to_string(),
        ));
    }
    let reference = ImageReference::parse(&request.image)?;

    let digest = bridge.resolve_digest(&reference).await?;
    tracing::debug!(image = %reference, digest = ?digest, "resolved digest");

    let archive = bridge.export(&reference).await?;
    tracing::info!(image = %reference, bytes = archive.len(), "exported image");

    let key = ObjectKey::derive(&reference, digest.as_deref());
    let location = store.put(&request.bucket, &key, &archive).await?;
    tracing::info!(%key, %location, "uploaded archive");

    Ok(PushOutcome {
        key,
        location,
        bytes: archive.len(),
        digest,
    })
}

/// バケットからオブジェクトを取得してエンジンに読み込ませる
///
/// キーにダイジェストが含まれる場合は `name:ダイジェストhex` で付け直す。
/// タグ付けの失敗は警告に格下げし、インポート自体の成功は取り消さない。
pub async fn pull_image<B, S>(bridge: &B, store: &S, request: &PullRequest) -> Result<PullOutcome>
where
    B: ArchiveBridge,
    S: ObjectTransfer,
{
    if request.bucket.trim().is_empty() {
        return Err(TransferError::Validation(
            "バケット名が空です".to_string(),
        ));
    }
    let key = ObjectKey::from_raw(request.key.clone())?;

    let archive = store.get(&request.bucket, &key).await?;
    tracing::info!(%key, bytes = archive.len(), "downloaded archive");

    let loaded = bridge.import(&archive).await?;
    tracing::info!(?loaded, "imported archive");

    let parts = key.parts();
    let mut retagged = None;
    let mut tag_warning = None;
    if let (Some(source), Some(target)) = (parts.embedded_reference(), parts.local_tag()) {
        match bridge.tag(&source, &target).await {
            Ok(()) => retagged = Some(target),
            Err(err) => tag_warning = Some(err.to_string()),
        }
    }

    Ok(PullOutcome {
        bytes: archive.len(),
        loaded,
        retagged,
        tag_warning,
    })
}
