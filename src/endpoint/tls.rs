//! TLS material for mutually authenticated daemon connections.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

/// File name of the authority certificate inside the material directory.
pub const CA_FILE: &str = "ca.pem";

/// File name of the client certificate inside the material directory.
pub const CERT_FILE: &str = "cert.pem";

/// File name of the client private key inside the material directory.
pub const KEY_FILE: &str = "key.pem";

/// The three files that make up a complete set of TLS material.
pub const MATERIAL_FILES: &[&str] = &[CA_FILE, CERT_FILE, KEY_FILE];

/// The authority certificate, client certificate, and client private key
/// required for mutually authenticated TLS to the daemon.
///
/// Owns the three byte buffers and remembers the expanded directory they
/// were read from. Ownership is exclusive to the descriptor holding the
/// material; nothing is shared across descriptors, and no file handles
/// are retained after loading.
#[derive(Debug, PartialEq, Eq)]
pub struct TlsMaterial {
    dir: Utf8PathBuf,
    ca: Vec<u8>,
    cert: Vec<u8>,
    key: Vec<u8>,
}

impl TlsMaterial {
    /// Read `ca.pem`, `cert.pem`, and `key.pem` from the given directory.
    ///
    /// The directory handle is scoped to this call and released once the
    /// bytes are copied out.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the directory cannot be
    /// opened or any of the three files cannot be read.
    pub fn load(dir: &Utf8Path) -> std::io::Result<Self> {
        let handle = Dir::open_ambient_dir(dir, ambient_authority())?;
        let ca = handle.read(CA_FILE)?;
        let cert = handle.read(CERT_FILE)?;
        let key = handle.read(KEY_FILE)?;
        Ok(Self {
            dir: dir.to_owned(),
            ca,
            cert,
            key,
        })
    }

    /// The expanded directory the material was read from.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// The authority certificate bytes.
    #[must_use]
    pub fn authority_certificate(&self) -> &[u8] {
        &self.ca
    }

    /// The client certificate bytes.
    #[must_use]
    pub fn client_certificate(&self) -> &[u8] {
        &self.cert
    }

    /// The client private key bytes.
    #[must_use]
    pub fn client_key(&self) -> &[u8] {
        &self.key
    }

    /// Path of the authority certificate file.
    #[must_use]
    pub fn authority_path(&self) -> Utf8PathBuf {
        self.dir.join(CA_FILE)
    }

    /// Path of the client certificate file.
    #[must_use]
    pub fn certificate_path(&self) -> Utf8PathBuf {
        self.dir.join(CERT_FILE)
    }

    /// Path of the client private key file.
    #[must_use]
    pub fn key_path(&self) -> Utf8PathBuf {
        self.dir.join(KEY_FILE)
    }
}
