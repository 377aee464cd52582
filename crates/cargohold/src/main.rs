mod commands;
mod plugin;
mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "docker-s3")]
#[command(about = "イメージを、レジストリの代わりにバケットへ。", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// イメージをS3互換ストレージへアップロード
    Push {
        /// アップロードするイメージ名 (例: app:1.0)
        #[arg(short, long)]
        image: Option<String>,
        /// アップロード先のバケット名
        #[arg(short, long)]
        bucket: Option<String>,
    },
    /// S3互換ストレージからイメージをダウンロードして読み込む
    Pull {
        /// ダウンロードするオブジェクトキー
        #[arg(short, long)]
        image: Option<String>,
        /// ダウンロード元のバケット名
        #[arg(short, long)]
        bucket: Option<String>,
    },
    /// バージョン情報を表示
    Version,
    /// Docker CLI プラグインの記述子を出力
    #[command(name = "docker-cli-plugin-metadata", hide = true)]
    Metadata,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // docker 経由で起動されると argv[1] にプラグイン名が入るので取り除く
    let args = plugin::strip_plugin_prefix(std::env::args());
    let cli = Cli::parse_from(args);

    // メタデータは stdout を JSON だけにしたいのでログ初期化より前に返す
    if matches!(cli.command, Commands::Metadata) {
        println!("{}", plugin::metadata_json()?);
        return Ok(());
    }

    tracing_subscriber::fmt::init();

    match cli.command {
        Commands::Push { image, bucket } => {
            commands::push::handle(image, bucket).await?;
        }
        Commands::Pull { image, bucket } => {
            commands::pull::handle(image, bucket).await?;
        }
        Commands::Version => {
            println!("cargohold {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Metadata => {
            unreachable!("Metadata is handled before dispatch");
        }
    }

    Ok(())
}
