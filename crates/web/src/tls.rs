//! TLS acceptor loaded from PEM files.
//!
//! When the certificate or key can't be loaded the bridge serves plain http instead, that
//! decision belongs to the caller.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("can't read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("no certificate found in {}", path.display())]
    NoCertificates { path: PathBuf },

    #[error("no private key found in {}", path.display())]
    NoPrivateKey { path: PathBuf },

    #[error("invalid certificate or key: {source}")]
    Rustls {
        #[from]
        source: tokio_rustls::rustls::Error,
    },
}

pub fn load_acceptor(cert_path: &Path, key_path: &Path) -> Result<TlsAcceptor, TlsError> {
    let certs = load_certs(cert_path)?;
    let key = load_private_key(key_path)?;

    let config = ServerConfig::builder().with_no_client_auth().with_single_cert(certs, key)?;
    Ok(TlsAcceptor::from(Arc::new(config)))
}

fn open(path: &Path) -> Result<BufReader<File>, TlsError> {
    File::open(path).map(BufReader::new).map_err(|source| TlsError::Io { path: path.to_path_buf(), source })
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let certs = rustls_pemfile::certs(&mut open(path)?)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Io { path: path.to_path_buf(), source })?;

    if certs.is_empty() {
        return Err(TlsError::NoCertificates { path: path.to_path_buf() });
    }
    Ok(certs)
}

fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    rustls_pemfile::private_key(&mut open(path)?)
        .map_err(|source| TlsError::Io { path: path.to_path_buf(), source })?
        .ok_or_else(|| TlsError::NoPrivateKey { path: path.to_path_buf() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("localhost.pem");
        let key = dir.path().join("localhost-key.pem");

        let result = load_acceptor(&cert, &key);
        assert!(matches!(result, Err(TlsError::Io { path, .. }) if path == cert));
    }

    #[test]
    fn files_without_pem_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("localhost.pem");
        let key = dir.path().join("localhost-key.pem");
        std::fs::write(&cert, "not a certificate\n").unwrap();
        std::fs::write(&key, "not a key\n").unwrap();

        assert!(matches!(load_certs(&cert), Err(TlsError::NoCertificates { .. })));
        assert!(matches!(load_private_key(&key), Err(TlsError::NoPrivateKey { .. })));
        assert!(load_acceptor(&cert, &key).is_err());
    }
}
