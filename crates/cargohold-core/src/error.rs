use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("無効な引数: {0}")]
    Validation(String),

    #[error(
        "Dockerに接続できません: {0}\n\nヒント:\n  • Dockerが起動しているか確認してください\n  • docker ps コマンドが正常に動作するか確認してください"
    )]
    Engine(String),

    #[error("Docker APIエラー: {0}")]
    EngineApi(String),

    #[error(
        "イメージ '{image}' が見つかりません\n\nヒント:\n  • イメージ名とタグを確認してください\n  • docker images でローカルのイメージ一覧を確認してください"
    )]
    ImageNotFound { image: String },

    #[error("アーカイブを読み込めません: {0}")]
    Archive(String),

    #[error(
        "ストレージ認証に失敗しました: {0}\n\nヒント:\n  • AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY を確認してください"
    )]
    StorageAuth(String),

    #[error("バケット '{bucket}' が見つかりません")]
    BucketNotFound { bucket: String },

    #[error("オブジェクト '{key}' が見つかりません")]
    ObjectNotFound { key: String },

    #[error("転送エラー: {0}")]
    StorageTransfer(String),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransferError>;
