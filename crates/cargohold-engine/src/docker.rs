use bollard::Docker;
use cargohold_core::{Result, TransferError};

/// Docker接続を初期化
///
/// 接続確認（ping）まで済ませてからクライアントを返す。
pub async fn init_docker() -> Result<Docker> {
    let docker = Docker::connect_with_local_defaults()
        .map_err(|e| TransferError::Engine(e.to_string()))?;

    docker
        .ping()
        .await
        .map_err(|e| TransferError::Engine(e.to_string()))?;

    Ok(docker)
}

/// bollard のエラーを転送エラーに変換
pub(crate) fn map_engine_error(err: bollard::errors::Error) -> TransferError {
    let message = err.to_string();
    if message.contains("Connection refused") || message.contains("No such file or directory") {
        TransferError::Engine(message)
    } else {
        TransferError::EngineApi(message)
    }
}
