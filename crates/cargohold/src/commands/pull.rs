use cargohold_core::PullRequest;
use cargohold_engine::DockerBridge;
use cargohold_store::S3Transfer;
use colored::Colorize;

use crate::utils::format_bytes;

pub async fn handle(image: Option<String>, bucket: Option<String>) -> anyhow::Result<()> {
    // フラグ検証（クライアントを作る前に行う）
    let (key, bucket) = super::require_flags(image, bucket)?;

    println!(
        "{}",
        format!("'{}' を '{}' から取得中...", key, bucket).green()
    );

    let bridge = DockerBridge::connect().await?;
    let store = S3Transfer::connect().await?;

    let request = PullRequest { key, bucket };
    let outcome = cargohold_core::pull_image(&bridge, &store, &request).await?;

    println!();
    println!("  サイズ: {}", format_bytes(outcome.bytes));
    for reference in &outcome.loaded {
        println!("  ✓ 読み込み: {}", reference.cyan());
    }
    if let Some(warning) = &outcome.tag_warning {
        eprintln!("  {} タグ付けに失敗しました: {}", "⚠".yellow(), warning);
    }
    if let Some(tag) = &outcome.retagged {
        println!("  ✓ タグ付け: {}", tag.cyan());
    }
    println!();
    println!("{}", "✓ イメージを読み込みました".green().bold());

    Ok(())
}
