//! Length-prefixed framing for exchange messages.
//!
//! Each frame is a 4-byte big-endian length followed by a CBOR-encoded
//! [`ExchangeRequest`] or [`ExchangeResponse`].

use sedge_wire::{decode_frame, encode_frame, ExchangeRequest, ExchangeResponse};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{NetworkError, NetworkResult};

/// Read a length-prefixed frame from the stream.
///
/// Returns `Ok(None)` if the stream ends cleanly before a length prefix.
pub async fn read_length_prefixed<T>(io: &mut T, max_size: usize) -> io::Result<Option<Vec<u8>>>
where
    T: AsyncRead + Unpin + Send,
{
    // Read 4-byte big-endian length
    let mut len_buf = [0u8; 4];
    match io.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }
    let len = u32::from_be_bytes(len_buf) as usize;

    if len > max_size {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame too large: {} > {}", len, max_size),
        ));
    }

    let mut data = vec![0u8; len];
    io.read_exact(&mut data).await?;

    Ok(Some(data))
}

/// Write a length-prefixed frame to the stream.
pub async fn write_length_prefixed<T>(io: &mut T, data: &[u8], max_size: usize) -> io::Result<()>
where
    T: AsyncWrite + Unpin + Send,
{
    if data.len() > max_size {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame too large: {} > {}", data.len(), max_size),
        ));
    }

    let len_buf = (data.len() as u32).to_be_bytes();
    io.write_all(&len_buf).await?;
    io.write_all(data).await?;
    io.flush().await?;

    Ok(())
}

/// Write one request frame.
pub async fn write_request<T>(
    io: &mut T,
    request: &ExchangeRequest,
    max_size: usize,
) -> NetworkResult<()>
where
    T: AsyncWrite + Unpin + Send,
{
    let bytes = encode_frame(request)?;
    write_length_prefixed(io, &bytes, max_size).await?;
    Ok(())
}

/// Read one request frame, or `None` at end of stream.
pub async fn read_request<T>(io: &mut T, max_size: usize) -> NetworkResult<Option<ExchangeRequest>>
where
    T: AsyncRead + Unpin + Send,
{
    match read_length_prefixed(io, max_size).await? {
        Some(bytes) => Ok(Some(decode_frame(&bytes)?)),
        None => Ok(None),
    }
}

/// Write one response frame.
pub async fn write_response<T>(
    io: &mut T,
    response: &ExchangeResponse,
    max_size: usize,
) -> NetworkResult<()>
where
    T: AsyncWrite + Unpin + Send,
{
    let bytes = encode_frame(response)?;
    write_length_prefixed(io, &bytes, max_size).await?;
    Ok(())
}

/// Read one response frame. End of stream is an error here.
pub async fn read_response<T>(io: &mut T, max_size: usize) -> NetworkResult<ExchangeResponse>
where
    T: AsyncRead + Unpin + Send,
{
    let bytes = read_length_prefixed(io, max_size)
        .await?
        .ok_or(NetworkError::ConnectionClosed)?;
    Ok(decode_frame(&bytes)?)
}
