pub mod pull;
pub mod push;

use cargohold_core::TransferError;

/// --image / --bucket の両方が揃っているか検証する
///
/// エンジンにもストレージにも触る前に呼ぶこと。
pub(crate) fn require_flags(
    image: Option<String>,
    bucket: Option<String>,
) -> Result<(String, String), TransferError> {
    let image = image.filter(|v| !v.trim().is_empty());
    let bucket = bucket.filter(|v| !v.trim().is_empty());
    match (image, bucket) {
        (Some(image), Some(bucket)) => Ok((image, bucket)),
        _ => Err(TransferError::Validation(
            "--image と --bucket の両方を指定してください".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_flags_both_present() {
        let (image, bucket) =
            require_flags(Some("app:1.0".to_string()), Some("demo".to_string())).unwrap();
        assert_eq!(image, "app:1.0");
        assert_eq!(bucket, "demo");
    }

    #[test]
    fn test_require_flags_missing_image() {
        let err = require_flags(None, Some("demo".to_string())).unwrap_err();
        assert!(matches!(err, TransferError::Validation(_)));
    }

    #[test]
    fn test_require_flags_blank_bucket() {
        let err = require_flags(Some("app:1.0".to_string()), Some("  ".to_string())).unwrap_err();
        assert!(matches!(err, TransferError::Validation(_)));
    }
}
