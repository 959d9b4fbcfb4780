use sdkup_common::error::{Result, SdkupError};
use url::Url;

/// Validates a package URL, ensuring it uses the HTTP or HTTPS scheme.
pub fn validate_url(url_str: &str) -> Result<()> {
    let url = Url::parse(url_str).map_err(|e| {
        SdkupError::ValidationError(format!("Failed to parse URL '{url_str}': {e}"))
    })?;
    match url.scheme() {
        "https" => Ok(()),
        "http" => {
            tracing::warn!("Package URL '{}' is not using https", url_str);
            Ok(())
        }
        other => Err(SdkupError::ValidationError(format!(
            "Invalid URL scheme for '{url_str}': must be http or https, but got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        validate_url(
            "https://github.com/immersivevreducation/Engage_CreatorSDK/blob/master/CreatorSDK.unitypackage?raw=true",
        )
        .unwrap();
        validate_url("http://127.0.0.1:8080/CreatorSDK.unitypackage").unwrap();
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(matches!(
            validate_url("ftp://example.com/CreatorSDK.unitypackage"),
            Err(SdkupError::ValidationError(_))
        ));
        assert!(matches!(
            validate_url("not a url"),
            Err(SdkupError::ValidationError(_))
        ));
    }
}
