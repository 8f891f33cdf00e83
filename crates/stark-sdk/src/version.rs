//! RPC spec version compatibility

use crate::SdkError;

/// RPC spec version this SDK speaks
pub const RPC_SPEC_VERSION: &str = "0.3.0";

/// `major.minor` prefix of a dotted version, if it has at least two parts
fn major_minor(version: &str) -> Option<(&str, &str)> {
    let mut parts = version.trim().split('.');
    match (parts.next(), parts.next()) {
        (Some(major), Some(minor)) if !major.is_empty() && !minor.is_empty() => {
            Some((major, minor))
        }
        _ => None,
    }
}

/// Check that two versions share major and minor; patch may differ
pub fn check_version_compatibility(provider_version: &str, sdk_version: &str) -> Result<(), SdkError> {
    let incompatible = || SdkError::VersionIncompatible {
        provider: provider_version.to_string(),
        sdk: sdk_version.to_string(),
    };

    let provider = major_minor(provider_version).ok_or_else(incompatible)?;
    let sdk = major_minor(sdk_version).ok_or_else(incompatible)?;
    if provider != sdk {
        return Err(incompatible());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_minor_different_patch() {
        assert!(check_version_compatibility("0.3.1", "0.3.0").is_ok());
        assert!(check_version_compatibility("0.3", "0.3.0").is_ok());
    }

    #[test]
    fn test_different_minor() {
        let err = check_version_compatibility("0.5.1", RPC_SPEC_VERSION).unwrap_err();
        match err {
            SdkError::VersionIncompatible { provider, sdk } => {
                assert_eq!(provider, "0.5.1");
                assert_eq!(sdk, RPC_SPEC_VERSION);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_malformed_version() {
        assert!(check_version_compatibility("v1", "0.3.0").is_err());
        assert!(check_version_compatibility("", "0.3.0").is_err());
        assert!(check_version_compatibility("0.3.0", "0.").is_err());
    }
}
