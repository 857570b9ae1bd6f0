//! Keystore decryption
//!
//! Files are checked for being readable Web3 Secret Storage JSON before the
//! password is tried, so a bad file and a bad password surface as different
//! errors.

use super::SigningIdentity;
use crate::{Error, Result};
use alloy::signers::local::PrivateKeySigner;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::path::Path;

/// Turns encrypted key material plus a password into a signing identity
pub trait KeystoreDecryptor: Send + Sync {
    fn decrypt(&self, name: &str, path: &Path, password: &SecretString) -> Result<SigningIdentity>;
}

/// Decrypts standard encrypted-key JSON files (scrypt or pbkdf2)
#[derive(Debug, Default, Clone, Copy)]
pub struct EthKeystore;

impl KeystoreDecryptor for EthKeystore {
    fn decrypt(&self, name: &str, path: &Path, password: &SecretString) -> Result<SigningIdentity> {
        validate_keystore_file(path)?;

        let signer = PrivateKeySigner::decrypt_keystore(path, password.expose_secret()).map_err(|e| {
            Error::Decryption {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(SigningIdentity::new(signer))
    }
}

/// Read `path` and check that it looks like an encrypted key file
pub(crate) fn validate_keystore_file(path: &Path) -> Result<()> {
    let key_load = |reason: String| Error::KeyLoad {
        path: path.to_path_buf(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| key_load(e.to_string()))?;
    let json: Value = serde_json::from_str(&content).map_err(|e| key_load(e.to_string()))?;

    // geth writes "crypto", some older tools "Crypto"
    let crypto = json
        .get("crypto")
        .or_else(|| json.get("Crypto"))
        .ok_or_else(|| key_load("missing crypto section".to_string()))?;
    for field in ["cipher", "ciphertext", "kdf", "mac"] {
        if crypto.get(field).is_none() {
            return Err(key_load(format!("missing crypto.{}", field)));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::b256;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Web3 Secret Storage pbkdf2 test vector, password "testpassword"
    fn pbkdf2_vector() -> Value {
        json!({
            "crypto": {
                "cipher": "aes-128-ctr",
                "cipherparams": { "iv": "6087dab2f9fdbbfaddc31a909735c1e6" },
                "ciphertext": "5318b4d5bcd28de64ee5559e671353e16f075ecae9f99c7a79a38af5f869aa46",
                "kdf": "pbkdf2",
                "kdfparams": {
                    "c": 262144,
                    "dklen": 32,
                    "prf": "hmac-sha256",
                    "salt": "ae3cd4e7013836a3df6bd7241b12db061dbe2c6785853cce422d148a624ce0bd"
                },
                "mac": "517ead924a9d0dc3124507e3393d175ce3ff7c1e96529c6c555ce9a51a6e7f0d"
            },
            "id": "3198bc9c-6672-5ab3-d995-4942343ae5b6",
            "version": 3
        })
    }

    fn write_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn decrypts_test_vector() {
        let file = write_file(&pbkdf2_vector().to_string());
        let identity = EthKeystore
            .decrypt("alice", file.path(), &SecretString::from("testpassword".to_string()))
            .unwrap();

        let expected = PrivateKeySigner::from_bytes(&b256!(
            "7a28b5ba57c53603b0b07b56bba752f7784bf506fa95edc395f5cf6c7514fe9d"
        ))
        .unwrap();
        assert_eq!(identity.address(), expected.address());
    }

    #[test]
    fn wrong_password_is_a_decryption_error() {
        let file = write_file(&pbkdf2_vector().to_string());
        let err = EthKeystore
            .decrypt("alice", file.path(), &SecretString::from("wrong".to_string()))
            .unwrap_err();
        match err {
            Error::Decryption { name, .. } => assert_eq!(name, "alice"),
            other => panic!("expected decryption error, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_a_key_load_error() {
        let err = EthKeystore
            .decrypt(
                "alice",
                Path::new("/nonexistent/key.json"),
                &SecretString::from("testpassword".to_string()),
            )
            .unwrap_err();
        assert!(matches!(err, Error::KeyLoad { .. }));
    }

    #[test]
    fn malformed_file_is_a_key_load_error() {
        let file = write_file("not json at all");
        let err = EthKeystore
            .decrypt("alice", file.path(), &SecretString::from("testpassword".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::KeyLoad { .. }));

        let file = write_file(r#"{"version": 3}"#);
        let err = validate_keystore_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("missing crypto section"));
    }
}
