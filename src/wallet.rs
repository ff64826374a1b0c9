//! Wallet account and message signing.
//!
//! The consent flow only needs two things from a wallet: the connected
//! account address and a signature over a text message. `LocalWallet`
//! provides both from an Ed25519 key kept on disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

pub const SECRET_KEY_LENGTH: usize = 32;
/// Bytes of the public-key hash used as the address.
const ADDRESS_BYTES: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("Wallet not connected")]
    NotConnected,

    #[error("Signature request rejected: {0}")]
    Rejected(String),

    #[error("Wallet key file {path}: {source}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid wallet key")]
    InvalidKey,
}

/// Account access and personal-message signing.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Connected account address, `None` when no wallet is connected.
    fn account(&self) -> Option<String>;

    /// Sign `message`, returning a `0x`-prefixed hex signature.
    async fn sign_message(&self, message: &str) -> Result<String, WalletError>;
}

/// File-backed Ed25519 wallet.
pub struct LocalWallet {
    key: SigningKey,
    address: String,
}

impl LocalWallet {
    pub fn from_secret_bytes(secret: &[u8; SECRET_KEY_LENGTH]) -> Self {
        let key = SigningKey::from_bytes(secret);
        let address = address_from_public_key(&key.verifying_key());
        Self { key, address }
    }

    pub fn generate() -> Self {
        let mut secret = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
        rand::rngs::OsRng.fill_bytes(&mut secret[..]);
        Self::from_secret_bytes(&secret)
    }

    /// Load the key stored at `path`, creating one on first use.
    pub fn load_or_create(path: &Path) -> Result<Self, WalletError> {
        let key_file_error = |source| WalletError::KeyFile {
            path: path.to_path_buf(),
            source,
        };

        if path.exists() {
            let encoded = Zeroizing::new(std::fs::read_to_string(path).map_err(key_file_error)?);
            let bytes = Zeroizing::new(
                hex::decode(encoded.trim()).map_err(|_| WalletError::InvalidKey)?,
            );
            let mut secret = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
            if bytes.len() != SECRET_KEY_LENGTH {
                return Err(WalletError::InvalidKey);
            }
            secret.copy_from_slice(&bytes);
            let wallet = Self::from_secret_bytes(&secret);
            tracing::debug!(address = %wallet.address, "Wallet key loaded");
            return Ok(wallet);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(key_file_error)?;
        }
        let wallet = Self::generate();
        let encoded = Zeroizing::new(hex::encode(wallet.key.to_bytes()));
        write_new_key_file(path, encoded.as_bytes()).map_err(key_file_error)?;
        tracing::info!(address = %wallet.address, path = %path.display(), "Wallet key created");
        Ok(wallet)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    fn sign_hex(&self, message: &str) -> String {
        let signature = self.key.sign(message.as_bytes());
        format!("0x{}", hex::encode(signature.to_bytes()))
    }
}

#[async_trait]
impl WalletSigner for LocalWallet {
    fn account(&self) -> Option<String> {
        Some(self.address.clone())
    }

    async fn sign_message(&self, message: &str) -> Result<String, WalletError> {
        Ok(self.sign_hex(message))
    }
}

/// Stands in when no wallet is configured.
pub struct DisconnectedWallet;

#[async_trait]
impl WalletSigner for DisconnectedWallet {
    fn account(&self) -> Option<String> {
        None
    }

    async fn sign_message(&self, _message: &str) -> Result<String, WalletError> {
        Err(WalletError::NotConnected)
    }
}

/// `0x` + hex of the first 20 bytes of SHA-256(public key).
pub fn address_from_public_key(key: &VerifyingKey) -> String {
    let digest = Sha256::digest(key.as_bytes());
    format!("0x{}", hex::encode(&digest[..ADDRESS_BYTES]))
}

/// Check a `0x`-prefixed hex signature produced by `sign_message`.
pub fn verify_signature(key: &VerifyingKey, message: &str, signature: &str) -> bool {
    let Ok(bytes) = hex::decode(signature.trim_start_matches("0x")) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(&bytes) else {
        return false;
    };
    key.verify(message.as_bytes(), &signature).is_ok()
}

/// Create `path` (failing if it exists) readable by the owner only from
/// the moment it appears.
#[cfg(unix)]
fn write_new_key_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_new_key_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}
