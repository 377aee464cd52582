use cargohold_core::PushRequest;
use cargohold_engine::DockerBridge;
use cargohold_store::S3Transfer;
use colored::Colorize;

use crate::utils::format_bytes;

pub async fn handle(image: Option<String>, bucket: Option<String>) -> anyhow::Result<()> {
    // フラグ検証（クライアントを作る前に行う）
    let (image, bucket) = super::require_flags(image, bucket)?;

    println!(
        "{}",
        format!("'{}' を '{}' へプッシュ中...", image, bucket).green()
    );

    let bridge = DockerBridge::connect().await?;
    let store = S3Transfer::connect().await?;

    let request = PushRequest { image, bucket };
    let outcome = cargohold_core::push_image(&bridge, &store, &request).await?;

    println!();
    if let Some(digest) = &outcome.digest {
        println!("  ダイジェスト: {}", digest.cyan());
    }
    println!("  キー: {}", outcome.key.as_str().cyan());
    println!("  サイズ: {}", format_bytes(outcome.bytes));
    println!();
    println!(
        "{}",
        format!("✓ {} へアップロードしました", outcome.location)
            .green()
            .bold()
    );

    Ok(())
}
