//! Byte stream to the IRC server, plain TCP or TLS.

use crate::config::ConnectionConfig;
use crate::error::ConnectionError;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tracing::{info, warn};

/// A connected duplex stream. Which variant is used is decided once, from
/// [`ConnectionConfig::tls`].
pub enum Transport {
    Plain(TcpStream),
    /// Boxed for size.
    Tls(Box<TlsStream<TcpStream>>),
}

impl Transport {
    pub fn is_secure(&self) -> bool {
        matches!(self, Self::Tls(_))
    }
}

/// Open a connection to the configured server, performing the TLS handshake
/// when enabled.
pub async fn connect(config: &ConnectionConfig) -> Result<Transport, ConnectionError> {
    let address = config.address();
    let tcp = TcpStream::connect((config.host.as_str(), config.port))
        .await
        .map_err(|source| ConnectionError::Connect {
            address: address.clone(),
            source,
        })?;

    if !config.tls {
        return Ok(Transport::Plain(tcp));
    }

    let connector = TlsConnector::from(Arc::new(tls_config(config.accept_invalid_certs)));
    let server_name = ServerName::try_from(config.host.clone())
        .map_err(|_| ConnectionError::InvalidServerName(config.host.clone()))?;
    let stream = connector
        .connect(server_name, tcp)
        .await
        .map_err(|source| ConnectionError::Handshake {
            host: config.host.clone(),
            source,
        })?;

    info!(address = %address, verify = !config.accept_invalid_certs, "TLS handshake completed");
    Ok(Transport::Tls(Box::new(stream)))
}

fn tls_config(accept_invalid_certs: bool) -> ClientConfig {
    if accept_invalid_certs {
        // Skips certificate verification; for self-signed test servers only.
        return ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCert::new()))
            .with_no_client_auth();
    }

    let mut roots = RootCertStore::empty();
    let native = rustls_native_certs::load_native_certs();
    for cert in native.certs {
        if let Err(e) = roots.add(cert) {
            warn!("Failed to add root cert: {}", e);
        }
    }
    for e in &native.errors {
        warn!("Error loading native certs: {}", e);
    }

    ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth()
}

/// Accepts any server certificate while still checking handshake signatures.
#[derive(Debug)]
struct AcceptAnyCert {
    provider: CryptoProvider,
}

impl AcceptAnyCert {
    fn new() -> Self {
        Self {
            provider: rustls::crypto::aws_lc_rs::default_provider(),
        }
    }
}

impl ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

impl AsyncRead for Transport {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(inner) => Pin::new(inner).poll_read(cx, buf),
            Self::Tls(inner) => Pin::new(inner).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Transport {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Plain(inner) => Pin::new(inner).poll_write(cx, buf),
            Self::Tls(inner) => Pin::new(inner).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(inner) => Pin::new(inner).poll_flush(cx),
            Self::Tls(inner) => Pin::new(inner).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(inner) => Pin::new(inner).poll_shutdown(cx),
            Self::Tls(inner) => Pin::new(inner).poll_shutdown(cx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::{generate_simple_self_signed, CertifiedKey};
    use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
    use rustls::ServerConfig;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio_rustls::TlsAcceptor;

    fn plain_config(port: u16) -> ConnectionConfig {
        ConnectionConfig {
            host: "127.0.0.1".into(),
            port,
            tls: false,
            nickname: "nick".into(),
            channel: "#channel".into(),
            accept_invalid_certs: false,
        }
    }

    #[tokio::test]
    async fn test_plain_connect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            sock.write_all(b"PING :x\r\n").await.unwrap();
            let mut buf = [0u8; 16];
            let n = sock.read(&mut buf).await.unwrap();
            buf[..n].to_vec()
        });

        let mut transport = connect(&plain_config(port)).await.unwrap();
        assert!(!transport.is_secure());

        let mut buf = [0u8; 16];
        let n = transport.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"PING :x\r\n");
        transport.write_all(b"PONG :x\r\n").await.unwrap();

        assert_eq!(server.await.unwrap(), b"PONG :x\r\n");
    }

    fn tls_config_for(port: u16, accept_invalid_certs: bool) -> ConnectionConfig {
        ConnectionConfig {
            tls: true,
            accept_invalid_certs,
            ..plain_config(port)
        }
    }

    /// Loopback TLS listener with a fresh self-signed certificate.
    async fn tls_listener() -> (TcpListener, TlsAcceptor) {
        let CertifiedKey { cert, key_pair } =
            generate_simple_self_signed(vec!["127.0.0.1".to_string(), "localhost".to_string()])
                .unwrap();
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));
        let server_config = ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(vec![cert.der().clone()], key)
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        (listener, TlsAcceptor::from(Arc::new(server_config)))
    }

    #[test]
    fn test_tls_configs_build() {
        let verified = tls_config(false);
        assert!(verified.alpn_protocols.is_empty());

        let unverified = tls_config(true);
        assert!(unverified.alpn_protocols.is_empty());
        assert!(!AcceptAnyCert::new().supported_verify_schemes().is_empty());
    }

    #[tokio::test]
    async fn test_tls_connect_accepting_invalid_certs() {
        let (listener, acceptor) = tls_listener().await;
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (sock, _) = listener.accept().await.unwrap();
            let mut tls = acceptor.accept(sock).await.unwrap();
            tls.write_all(b"PING :secure\r\n").await.unwrap();
            tls.flush().await.unwrap();
            let mut buf = [0u8; 32];
            let n = tls.read(&mut buf).await.unwrap();
            buf[..n].to_vec()
        });

        let mut transport = connect(&tls_config_for(port, true)).await.unwrap();
        assert!(transport.is_secure());

        let mut buf = [0u8; 32];
        let n = transport.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"PING :secure\r\n");
        transport.write_all(b"PONG :secure\r\n").await.unwrap();
        transport.flush().await.unwrap();

        assert_eq!(server.await.unwrap(), b"PONG :secure\r\n");
    }

    #[tokio::test]
    async fn test_tls_rejects_self_signed_when_verifying() {
        let (listener, acceptor) = tls_listener().await;
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (sock, _) = listener.accept().await.unwrap();
            let _ = acceptor.accept(sock).await;
        });

        let err = connect(&tls_config_for(port, false)).await.err().unwrap();
        assert!(matches!(err, ConnectionError::Handshake { .. }));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = connect(&plain_config(port)).await.err().unwrap();
        assert!(matches!(err, ConnectionError::Connect { .. }));
    }
}
