use std::str::FromStr;

use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// JWT signer/verifier over a shared server secret.
///
/// Only the HMAC family (`HS256`, `HS384`, `HS512`) is accepted since the
/// service holds a single symmetric secret. Expiry is not checked here:
/// `decode` verifies structure and signature only, and the caller compares
/// `exp` against its own clock.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a handler signing with `HS256`.
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes)
    /// - Load it from configuration or the environment, never from code
    pub fn new(secret: &[u8]) -> Self {
        Self::build(secret, Algorithm::HS256)
    }

    /// Create a handler for a named algorithm.
    ///
    /// # Arguments
    /// * `secret` - Shared signing secret
    /// * `algorithm` - Algorithm name as configured (e.g. "HS256")
    ///
    /// # Errors
    /// * `UnsupportedAlgorithm` - Unknown name or not an HMAC algorithm
    pub fn with_algorithm(secret: &[u8], algorithm: &str) -> Result<Self, JwtError> {
        let parsed = Algorithm::from_str(algorithm.trim())
            .map_err(|_| JwtError::UnsupportedAlgorithm(algorithm.to_string()))?;

        match parsed {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                Ok(Self::build(secret, parsed))
            }
            _ => Err(JwtError::UnsupportedAlgorithm(algorithm.to_string())),
        }
    }

    fn build(secret: &[u8], algorithm: Algorithm) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
        }
    }

    /// Algorithm used for signing and the only one accepted on decode.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Sign claims into a compact JWT.
    ///
    /// # Errors
    /// * `EncodingFailed` - Claims could not be serialized or signed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify signature and structure, then deserialize the claims.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed token, bad signature or foreign algorithm
    pub fn decode<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        decode::<T>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestClaims {
        sub: String,
        exp: i64,
    }

    const SECRET: &[u8] = b"nfse_test_secret_at_least_32_bytes!!";

    #[test]
    fn test_encode_and_decode() {
        let handler = JwtHandler::new(SECRET);
        let claims = TestClaims {
            sub: "ana@example.com".to_string(),
            exp: 4_000_000_000,
        };

        let token = handler.encode(&claims).expect("Failed to encode token");
        assert_eq!(token.split('.').count(), 3);

        let decoded: TestClaims = handler.decode(&token).expect("Failed to decode token");
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_decode_does_not_enforce_expiry() {
        let handler = JwtHandler::new(SECRET);
        let claims = TestClaims {
            sub: "ana@example.com".to_string(),
            exp: 1,
        };

        let token = handler.encode(&claims).unwrap();
        let decoded: TestClaims = handler.decode(&token).unwrap();
        assert_eq!(decoded.exp, 1);
    }

    #[test]
    fn test_decode_invalid_token() {
        let handler = JwtHandler::new(SECRET);
        let result = handler.decode::<TestClaims>("invalid.token.here");
        assert!(matches!(result, Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!");
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!");
        let claims = TestClaims {
            sub: "ana@example.com".to_string(),
            exp: 4_000_000_000,
        };

        let token = handler1.encode(&claims).unwrap();
        let result = handler2.decode::<TestClaims>(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_with_algorithm_hmac_family() {
        for name in ["HS256", "HS384", "HS512"] {
            let handler = JwtHandler::with_algorithm(SECRET, name).unwrap();
            assert_eq!(format!("{:?}", handler.algorithm()), name);
        }
    }

    #[test]
    fn test_with_algorithm_rejects_asymmetric_and_unknown() {
        assert!(matches!(
            JwtHandler::with_algorithm(SECRET, "RS256"),
            Err(JwtError::UnsupportedAlgorithm(_))
        ));
        assert!(matches!(
            JwtHandler::with_algorithm(SECRET, "none"),
            Err(JwtError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_decode_rejects_other_algorithm() {
        let hs512 = JwtHandler::with_algorithm(SECRET, "HS512").unwrap();
        let hs256 = JwtHandler::new(SECRET);
        let token = hs512
            .encode(&TestClaims {
                sub: "ana@example.com".to_string(),
                exp: 4_000_000_000,
            })
            .unwrap();

        assert!(matches!(
            hs256.decode::<TestClaims>(&token),
            Err(JwtError::InvalidToken(_))
        ));
    }
}
