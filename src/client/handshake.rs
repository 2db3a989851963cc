//! Client side of the Bolt handshake.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::BoltError;
use crate::version::{BOLT_MAGIC, Proposal, Version, encode_proposals};

/// Sends the magic preamble and up to four version proposals, then reads
/// the version the server picked.
///
/// Fails if the server refuses every proposal or answers with a version
/// that was never offered.
pub async fn client_handshake<S>(stream: &mut S, proposals: &[Proposal]) -> Result<Version, BoltError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut request = [0u8; 20];
    request[..4].copy_from_slice(&BOLT_MAGIC);
    request[4..].copy_from_slice(&encode_proposals(proposals));
    stream.write_all(&request).await?;
    stream.flush().await?;

    let mut response = [0u8; 4];
    stream.read_exact(&mut response).await?;

    let version = Version::from_bytes(response)
        .ok_or_else(|| BoltError::Protocol("server rejected all proposed versions".into()))?;
    if !proposals.iter().take(4).any(|p| p.accepts(version)) {
        return Err(BoltError::Protocol(format!(
            "server chose version {version}, which was not proposed (response {response:02X?})"
        )));
    }

    tracing::debug!(%version, "negotiated Bolt version");
    Ok(version)
}
