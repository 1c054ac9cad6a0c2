//! Generate the consumer key pair.

use std::path::Path;
use tracing::info;

use sedge_crypto::{generate_keypair, KeyPair, PrivateKeyPem, DEFAULT_KEY_BITS};

use crate::config::KeysConfig;
use crate::error::{NodeError, NodeResult};

/// Execute the keygen command.
pub fn keygen(keys: &KeysConfig, force: bool) -> NodeResult<String> {
    if !force {
        for path in [&keys.private_key, &keys.public_key] {
            if path.exists() {
                return Err(NodeError::AlreadyExists(path.clone()));
            }
        }
    }

    let pair = generate_keypair(DEFAULT_KEY_BITS)?;
    write_private_key(&keys.private_key, &pair.private_pem)?;
    write_file(&keys.public_key, &pair.public_pem)?;
    info!(
        private_key = %keys.private_key.display(),
        public_key = %keys.public_key.display(),
        bits = DEFAULT_KEY_BITS,
        "Key pair generated"
    );

    Ok(format!(
        "Private key: {}\nPublic key:  {}",
        keys.private_key.display(),
        keys.public_key.display()
    ))
}

/// Read a key pair written by [`keygen`].
pub fn load_keypair(keys: &KeysConfig) -> NodeResult<KeyPair> {
    let private_pem = read_key(&keys.private_key)?;
    let public_pem = read_key(&keys.public_key)?;
    Ok(KeyPair {
        private_pem: PrivateKeyPem::new(private_pem),
        public_pem,
    })
}

fn read_key(path: &Path) -> NodeResult<String> {
    std::fs::read_to_string(path).map_err(|source| NodeError::KeyFile {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> NodeResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents)?;
    Ok(())
}

fn write_private_key(path: &Path, pem: &PrivateKeyPem) -> NodeResult<()> {
    write_file(path, pem.expose())?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}
