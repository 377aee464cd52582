//! イメージ参照のパース
//!
//! `name:tag` / `name@sha256:...` 形式の文字列を名前とタグ（またはダイジェスト）に
//! 分解する。レジストリホストにポートが含まれる場合（localhost:5000/app など）も
//! 正しく扱う。

use crate::error::{Result, TransferError};
use std::fmt;

/// コンテナエンジンに渡すイメージ参照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    name: String,
    tag: String,
    digest: Option<String>,
}

impl ImageReference {
    /// 文字列をパースして参照を作る
    ///
    /// タグ省略時は `latest` を補う。空文字列や空白を含む入力は拒否する。
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(TransferError::Validation(
                "イメージ参照が空です".to_string(),
            ));
        }
        if input.chars().any(char::is_whitespace) {
            return Err(TransferError::Validation(format!(
                "イメージ参照に空白を含めることはできません: {input}"
            )));
        }

        // name@sha256:... 形式
        if let Some((name, digest)) = input.split_once('@') {
            if name.is_empty() || !digest.contains(':') {
                return Err(TransferError::Validation(format!(
                    "不正なダイジェスト参照です: {input}"
                )));
            }
            return Ok(Self {
                name: name.to_string(),
                tag: "latest".to_string(),
                digest: Some(digest.to_string()),
            });
        }

        let (name, tag) = split_name_tag(input);
        if name.is_empty() {
            return Err(TransferError::Validation(format!(
                "イメージ名が空です: {input}"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            tag: tag.to_string(),
            digest: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.digest {
            Some(digest) => write!(f, "{}@{}", self.name, digest),
            None => write!(f, "{}:{}", self.name, self.tag),
        }
    }
}

/// イメージ名とタグを分離
///
/// 最後の `:` の後ろをタグ候補とし、`/` を含む・純粋な数字（ポート番号）の
/// 場合はタグなしとみなす。
///
/// 例: `ghcr.io/org/app:v1.0` -> `("ghcr.io/org/app", "v1.0")`
///     `localhost:5000/app` -> `("localhost:5000/app", "latest")`
pub(crate) fn split_name_tag(input: &str) -> (&str, &str) {
    if let Some(pos) = input.rfind(':') {
        let potential_tag = &input[pos + 1..];
        if !potential_tag.is_empty()
            && !potential_tag.contains('/')
            && !potential_tag.chars().all(|c| c.is_ascii_digit())
        {
            return (&input[..pos], potential_tag);
        }
    }
    (input, "latest")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_tag() {
        let reference = ImageReference::parse("app:1.0").unwrap();
        assert_eq!(reference.name(), "app");
        assert_eq!(reference.tag(), "1.0");
        assert_eq!(reference.digest(), None);
    }

    #[test]
    fn test_parse_without_tag() {
        let reference = ImageReference::parse("ghcr.io/org/app").unwrap();
        assert_eq!(reference.name(), "ghcr.io/org/app");
        assert_eq!(reference.tag(), "latest");
    }

    #[test]
    fn test_parse_registry_with_port() {
        // localhost:5000/app はポート番号を含むレジストリ
        let reference = ImageReference::parse("localhost:5000/app").unwrap();
        assert_eq!(reference.name(), "localhost:5000/app");
        assert_eq!(reference.tag(), "latest");
    }

    #[test]
    fn test_parse_registry_with_port_and_tag() {
        let reference = ImageReference::parse("localhost:5000/app:dev").unwrap();
        assert_eq!(reference.name(), "localhost:5000/app");
        assert_eq!(reference.tag(), "dev");
    }

    #[test]
    fn test_parse_digest_reference() {
        let reference = ImageReference::parse("app@sha256:abcdef0123").unwrap();
        assert_eq!(reference.name(), "app");
        assert_eq!(reference.digest(), Some("sha256:abcdef0123"));
        assert_eq!(reference.to_string(), "app@sha256:abcdef0123");
    }

    #[test]
    fn test_parse_empty_fails() {
        let err = ImageReference::parse("  ").unwrap_err();
        assert!(matches!(err, TransferError::Validation(_)));
    }

    #[test]
    fn test_parse_whitespace_fails() {
        let err = ImageReference::parse("app :1.0").unwrap_err();
        assert!(matches!(err, TransferError::Validation(_)));
    }

    #[test]
    fn test_display_roundtrip() {
        let reference = ImageReference::parse("app:1.0").unwrap();
        assert_eq!(reference.to_string(), "app:1.0");
    }
}
