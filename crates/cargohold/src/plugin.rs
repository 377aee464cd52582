//! Docker CLI プラグインのメタデータ
//!
//! `docker-cli-plugin-metadata` で Docker CLI に返す固定の記述子と、
//! docker 経由で起動されたときの引数調整を担当する。

use serde::Serialize;

/// Docker CLI に返すプラグイン記述子
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PluginMetadata {
    pub schema_version: &'static str,
    pub vendor: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    pub short_description: &'static str,
    pub docker_version: &'static str,
    pub experimental: bool,
    pub platforms: &'static [&'static str],
}

pub const METADATA: PluginMetadata = PluginMetadata {
    schema_version: "0.1.0",
    vendor: "Chronista Club",
    name: "s3",
    version: env!("CARGO_PKG_VERSION"),
    short_description: "Push and pull Docker images to S3 compatible storage",
    docker_version: ">=20.10.0",
    experimental: false,
    platforms: &["linux/amd64", "darwin/amd64", "windows/amd64"],
};

pub fn metadata_json() -> anyhow::Result<String> {
    Ok(serde_json::to_string(&METADATA)?)
}

/// docker 経由の起動で argv[1] に入るプラグイン名を取り除く
///
/// `docker s3 push ...` はプラグインを `docker-s3 s3 push ...` として起動する。
/// 直接 `docker-s3 push ...` と叩いた場合はそのまま。
pub fn strip_plugin_prefix(args: impl Iterator<Item = String>) -> Vec<String> {
    let mut args: Vec<String> = args.collect();
    if args.len() >= 2 && args[1] == METADATA.name {
        args.remove(1);
    }
    args
}
