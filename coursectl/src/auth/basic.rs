//! HTTP Basic credential parsing.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use base64::{Engine as _, engine::general_purpose};
use std::fmt;
use thiserror::Error;

/// Email and password decoded from an `Authorization: Basic ...` header
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Why a request carried no usable Basic credentials. Only ever logged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("no Authorization header")]
    Missing,
    #[error("Authorization header is not valid ASCII")]
    NotAscii,
    #[error("Authorization scheme is not Basic")]
    WrongScheme,
    #[error("Basic credentials are not valid base64")]
    BadEncoding,
    #[error("Basic credentials are not valid UTF-8")]
    NotUtf8,
    #[error("Basic credentials have no ':' separator")]
    NoSeparator,
}

/// Decode Basic credentials from request headers.
///
/// The scheme name is case-insensitive. The password is everything after the first colon,
/// so passwords may themselves contain colons.
pub fn extract_credentials(headers: &HeaderMap) -> Result<BasicCredentials, CredentialsError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(CredentialsError::Missing)?
        .to_str()
        .map_err(|_| CredentialsError::NotAscii)?;

    let (scheme, encoded) = value.trim().split_once(' ').ok_or(CredentialsError::WrongScheme)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(CredentialsError::WrongScheme);
    }

    let decoded = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|_| CredentialsError::BadEncoding)?;
    let decoded = String::from_utf8(decoded).map_err(|_| CredentialsError::NotUtf8)?;

    let (email, password) = decoded.split_once(':').ok_or(CredentialsError::NoSeparator)?;
    Ok(BasicCredentials {
        email: email.to_string(),
        password: password.to_string(),
    })
}

/// Build an `Authorization` header value for the given credentials
pub fn encode_credentials(email: &str, password: &str) -> String {
    format!("Basic {}", general_purpose::STANDARD.encode(format!("{email}:{password}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_valid_credentials() {
        let headers = headers_with(&encode_credentials("joe@smith.com", "joepassword"));
        assert_eq!(
            extract_credentials(&headers).unwrap(),
            BasicCredentials {
                email: "joe@smith.com".to_string(),
                password: "joepassword".to_string(),
            }
        );
    }

    #[test]
    fn test_password_may_contain_colons() {
        let headers = headers_with(&encode_credentials("joe@smith.com", "pass:with:colons"));
        assert_eq!(extract_credentials(&headers).unwrap().password, "pass:with:colons");
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let encoded = general_purpose::STANDARD.encode("joe@smith.com:pw");
        let headers = headers_with(&format!("basic {encoded}"));
        assert_eq!(extract_credentials(&headers).unwrap().email, "joe@smith.com");
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(extract_credentials(&HeaderMap::new()), Err(CredentialsError::Missing));
    }

    #[test]
    fn test_bearer_is_rejected() {
        assert_eq!(
            extract_credentials(&headers_with("Bearer abc.def.ghi")),
            Err(CredentialsError::WrongScheme)
        );
        assert_eq!(extract_credentials(&headers_with("Basic")), Err(CredentialsError::WrongScheme));
    }

    #[test]
    fn test_malformed_payloads() {
        assert_eq!(
            extract_credentials(&headers_with("Basic not-base64!!")),
            Err(CredentialsError::BadEncoding)
        );

        let no_colon = general_purpose::STANDARD.encode("joe@smith.com");
        assert_eq!(
            extract_credentials(&headers_with(&format!("Basic {no_colon}"))),
            Err(CredentialsError::NoSeparator)
        );

        let not_utf8 = general_purpose::STANDARD.encode([0xff, 0xfe, b':', b'x']);
        assert_eq!(
            extract_credentials(&headers_with(&format!("Basic {not_utf8}"))),
            Err(CredentialsError::NotUtf8)
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = BasicCredentials {
            email: "joe@smith.com".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("joe@smith.com"));
        assert!(!debug.contains("hunter2"));
    }
}
