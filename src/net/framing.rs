//! Message framing for length-prefixed protocol
//!
//! Format: [4 bytes little-endian length][payload]. This is the byte-level
//! boundary an external transport reads client messages from and writes
//! broadcast frames to.

use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::game::constants::net::MAX_MESSAGE_SIZE;

/// Errors that can occur during message framing
#[derive(Debug, thiserror::Error)]
pub enum FramingError {
    #[error("Connection closed")]
    ConnectionClosed,
    #[error("Message too large: {0} bytes (max {1})")]
    MessageTooLarge(usize, usize),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Prefix a payload with its length, ready to write as-is
pub fn frame(payload: &[u8]) -> Result<Vec<u8>, FramingError> {
    frame_with_limit(payload, MAX_MESSAGE_SIZE)
}

/// [`frame`] with a caller-chosen size cap (outbound broadcasts)
pub fn frame_with_limit(payload: &[u8], limit: usize) -> Result<Vec<u8>, FramingError> {
    if payload.len() > limit || payload.len() > u32::MAX as usize {
        return Err(FramingError::MessageTooLarge(payload.len(), limit));
    }
    let mut framed = Vec::with_capacity(4 + payload.len());
    framed.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    framed.extend_from_slice(payload);
    Ok(framed)
}

/// Read a length-prefixed message from a stream
pub async fn read_message<R: AsyncRead + Unpin>(stream: &mut R) -> Result<Vec<u8>, FramingError> {
    read_message_with_limit(stream, MAX_MESSAGE_SIZE).await
}

/// [`read_message`] with a caller-chosen size cap
pub async fn read_message_with_limit<R: AsyncRead + Unpin>(
    stream: &mut R,
    limit: usize,
) -> Result<Vec<u8>, FramingError> {
    let mut len_buf = [0u8; 4];
    match stream.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            return Err(FramingError::ConnectionClosed);
        }
        Err(e) => return Err(FramingError::Io(e)),
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > limit {
        return Err(FramingError::MessageTooLarge(len, limit));
    }
    if len == 0 {
        return Ok(Vec::new());
    }

    let mut buf = vec![0u8; len];
    match stream.read_exact(&mut buf).await {
        Ok(_) => Ok(buf),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(FramingError::ConnectionClosed),
        Err(e) => Err(FramingError::Io(e)),
    }
}

/// Write a length-prefixed message to a stream
pub async fn write_message<W: AsyncWrite + Unpin>(
    stream: &mut W,
    data: &[u8],
) -> Result<(), FramingError> {
    let framed = frame(data)?;
    stream.write_all(&framed).await?;
    stream.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_read_write_message() {
        let data = b"delta payload";
        let mut buffer = Vec::new();

        write_message(&mut buffer, data).await.unwrap();

        let mut cursor = Cursor::new(buffer);
        let result = read_message(&mut cursor).await.unwrap();
        assert_eq!(result, data);
    }

    #[tokio::test]
    async fn test_reads_from_split_stream() {
        // Length prefix and payload arrive in separate reads
        let mut stream = tokio_test::io::Builder::new()
            .read(&5u32.to_le_bytes())
            .read(b"he")
            .read(b"llo")
            .build();

        let result = read_message(&mut stream).await.unwrap();
        assert_eq!(result, b"hello");
    }

    #[tokio::test]
    async fn test_write_is_single_frame() {
        let mut expected = 3u32.to_le_bytes().to_vec();
        expected.extend_from_slice(b"abc");
        let mut stream = tokio_test::io::Builder::new().write(&expected).build();

        write_message(&mut stream, b"abc").await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_message() {
        let mut buffer = Vec::new();
        write_message(&mut buffer, b"").await.unwrap();

        let mut cursor = Cursor::new(buffer);
        assert!(read_message(&mut cursor).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_message_too_large() {
        let large_data = vec![0u8; MAX_MESSAGE_SIZE + 1];
        let mut buffer = Vec::new();

        let result = write_message(&mut buffer, &large_data).await;
        assert!(matches!(result, Err(FramingError::MessageTooLarge(_, _))));
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_length_prefix_rejected() {
        let prefix = ((MAX_MESSAGE_SIZE + 1) as u32).to_le_bytes();
        let mut cursor = Cursor::new(prefix.to_vec());

        let result = read_message(&mut cursor).await;
        assert!(matches!(result, Err(FramingError::MessageTooLarge(_, _))));
    }

    #[tokio::test]
    async fn test_custom_limit() {
        let payload = vec![7u8; MAX_MESSAGE_SIZE + 10];
        assert!(frame(&payload).is_err());

        let framed = frame_with_limit(&payload, MAX_MESSAGE_SIZE * 2).unwrap();
        let mut cursor = Cursor::new(framed.clone());
        assert!(matches!(
            read_message(&mut cursor).await,
            Err(FramingError::MessageTooLarge(_, _))
        ));

        let mut cursor = Cursor::new(framed);
        let result = read_message_with_limit(&mut cursor, MAX_MESSAGE_SIZE * 2).await.unwrap();
        assert_eq!(result, payload);

        assert!(matches!(
            frame_with_limit(b"abcdef", 4),
            Err(FramingError::MessageTooLarge(6, 4))
        ));
    }

    #[tokio::test]
    async fn test_read_truncated_payload() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&10u32.to_le_bytes());
        buffer.extend_from_slice(&[1, 2, 3]);

        let mut cursor = Cursor::new(buffer);
        let result = read_message(&mut cursor).await;
        assert!(matches!(result, Err(FramingError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_multiple_messages() {
        let messages = vec![b"first".to_vec(), b"second".to_vec(), b"third one".to_vec()];

        let mut buffer = Vec::new();
        for msg in &messages {
            buffer.extend_from_slice(&frame(msg).unwrap());
        }

        let mut cursor = Cursor::new(buffer);
        for expected in &messages {
            assert_eq!(&read_message(&mut cursor).await.unwrap(), expected);
        }
        assert!(matches!(
            read_message(&mut cursor).await,
            Err(FramingError::ConnectionClosed)
        ));
    }
}
