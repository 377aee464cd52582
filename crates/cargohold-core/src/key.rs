//! オブジェクトキーの命名規則
//!
//! push と pull は同じ規則を共有する。
//!
//! - ダイジェストあり: `{name}:{tag}:sha256:{hex}` — コロン区切りで、末尾の
//!   `sha256:{hex}` がダイジェスト
//! - ダイジェストなし: `{name}_{tag}` — コロンをアンダースコアに置き換えた
//!   キーセーフ形式。この形式は不可逆で、pull 時のタグ付けは行わない
//!
//! `parse` はどちらの形式も受け付け、セグメント数に関わらずパニックしない。

use crate::error::{Result, TransferError};
use crate::reference::{ImageReference, split_name_tag};

/// バケット内のオブジェクトを識別するキー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKey {
    raw: String,
}

impl ObjectKey {
    /// イメージ参照（と分かっていればダイジェスト）からキーを導出
    pub fn derive(reference: &ImageReference, digest: Option<&str>) -> Self {
        let digest = digest.or_else(|| reference.digest());
        let raw = match digest {
            Some(digest) => format!("{}:{}:{}", reference.name(), reference.tag(), digest),
            None => format!("{}:{}", reference.name(), reference.tag()).replace(':', "_"),
        };
        Self { raw }
    }

    /// ユーザー入力のキー文字列をそのまま包む
    pub fn from_raw(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(TransferError::Validation(
                "オブジェクトキーが空です".to_string(),
            ));
        }
        Ok(Self { raw })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// キーを名前・タグ・ダイジェストに分解する
    ///
    /// 末尾が `sha256:<64桁hex>` のときだけダイジェストありとみなす。
    /// アンダースコア形式は分解できないため、キー全体を名前として返す。
    pub fn parts(&self) -> KeyParts {
        if let Some((head, digest)) = strip_digest_suffix(&self.raw) {
            let (name, tag) = split_name_tag(head);
            return KeyParts {
                name: name.to_string(),
                tag: Some(tag.to_string()),
                digest: Some(digest),
            };
        }
        if self.raw.contains(':') {
            let (name, tag) = split_name_tag(&self.raw);
            return KeyParts {
                name: name.to_string(),
                tag: Some(tag.to_string()),
                digest: None,
            };
        }
        KeyParts {
            name: self.raw.clone(),
            tag: None,
            digest: None,
        }
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// キーから復元した構成要素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParts {
    pub name: String,
    pub tag: Option<String>,
    pub digest: Option<String>,
}

impl KeyParts {
    /// pull 後にローカルで付け直すタグ（`name:ダイジェストhex`）
    pub fn local_tag(&self) -> Option<String> {
        let digest = self.digest.as_deref()?;
        let (_, hex) = digest.split_once(':')?;
        Some(format!("{}:{}", self.name, hex))
    }

    /// アーカイブに埋め込まれている元の参照（`name:tag`）
    pub fn embedded_reference(&self) -> Option<String> {
        let tag = self.tag.as_deref()?;
        Some(format!("{}:{}", self.name, tag))
    }
}

/// 末尾の `:sha256:<64桁hex>` を切り出す
fn strip_digest_suffix(key: &str) -> Option<(&str, String)> {
    const MARKER: &str = ":sha256:";
    let idx = key.rfind(MARKER)?;
    let hex = &key[idx + MARKER.len()..];
    let is_hex = hex.len() == 64
        && hex
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
    if is_hex {
        Some((&key[..idx], format!("sha256:{hex}")))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn digest() -> String {
        format!("sha256:{HEX}")
    }

    #[test]
    fn test_derive_without_digest_uses_underscores() {
        let reference = ImageReference::parse("app:1.0").unwrap();
        let key = ObjectKey::derive(&reference, None);
        assert_eq!(key.as_str(), "app_1.0");
    }

    #[test]
    fn test_derive_with_digest_is_colon_delimited() {
        let reference = ImageReference::parse("app:1.0").unwrap();
        let key = ObjectKey::derive(&reference, Some(&digest()));
        assert_eq!(key.as_str(), format!("app:1.0:sha256:{HEX}"));
    }

    #[test]
    fn test_parse_digest_key_roundtrips() {
        let reference = ImageReference::parse("app:1.0").unwrap();
        let key = ObjectKey::derive(&reference, Some(&digest()));
        let parts = key.parts();
        assert_eq!(parts.name, "app");
        assert_eq!(parts.tag.as_deref(), Some("1.0"));
        assert_eq!(parts.digest.as_deref(), Some(digest().as_str()));
    }

    #[test]
    fn test_parse_digest_key_with_registry_port() {
        let reference = ImageReference::parse("localhost:5000/app:dev").unwrap();
        let key = ObjectKey::derive(&reference, Some(&digest()));
        let parts = key.parts();
        assert_eq!(parts.name, "localhost:5000/app");
        assert_eq!(parts.tag.as_deref(), Some("dev"));
        assert_eq!(parts.local_tag().unwrap(), format!("localhost:5000/app:{HEX}"));
    }

    #[test]
    fn test_parse_underscore_key_has_no_digest() {
        let key = ObjectKey::from_raw("app_1.0").unwrap();
        let parts = key.parts();
        assert_eq!(parts.name, "app_1.0");
        assert_eq!(parts.tag, None);
        assert_eq!(parts.digest, None);
        assert_eq!(parts.local_tag(), None);
    }

    #[test]
    fn test_parse_short_keys_do_not_panic() {
        for raw in ["a", "a:b", "a:b:c", "sha256", ":sha256:"] {
            let key = ObjectKey::from_raw(raw).unwrap();
            let _ = key.parts();
        }
    }

    #[test]
    fn test_parse_rejects_uppercase_or_short_hex() {
        let upper = format!("app:1.0:sha256:{}", HEX.to_uppercase());
        assert_eq!(ObjectKey::from_raw(upper).unwrap().parts().digest, None);

        let short = "app:1.0:sha256:abc123".to_string();
        assert_eq!(ObjectKey::from_raw(short).unwrap().parts().digest, None);
    }

    #[test]
    fn test_from_raw_empty_fails() {
        let err = ObjectKey::from_raw("   ").unwrap_err();
        assert!(matches!(err, TransferError::Validation(_)));
    }

    #[test]
    fn test_local_tag_uses_digest_hex() {
        let key = ObjectKey::from_raw(format!("app:1.0:sha256:{HEX}")).unwrap();
        assert_eq!(key.parts().local_tag().unwrap(), format!("app:{HEX}"));
    }

    #[test]
    fn test_embedded_reference() {
        let key = ObjectKey::from_raw(format!("app:1.0:sha256:{HEX}")).unwrap();
        assert_eq!(key.parts().embedded_reference().unwrap(), "app:1.0");
    }
}
