//! # Byte Streams
//!
//! Building blocks for reconstructing an aggregate's payload without
//! buffering whole pieces.

use std::io;

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};

/// A boxed stream of payload chunks.
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

const ZERO_CHUNK_LEN: usize = 64 * 1024;
static ZERO_CHUNK: [u8; ZERO_CHUNK_LEN] = [0u8; ZERO_CHUNK_LEN];

fn zero_bytes(len: usize) -> Bytes {
    Bytes::from_static(&ZERO_CHUNK[..len])
}

/// `len` zero bytes.
pub fn zeros(len: u64) -> ByteStream {
    let full = len / ZERO_CHUNK_LEN as u64;
    let rest = (len % ZERO_CHUNK_LEN as u64) as usize;
    let tail = (rest > 0).then(|| zero_bytes(rest));
    stream::iter(
        (0..full)
            .map(|_| zero_bytes(ZERO_CHUNK_LEN))
            .chain(tail)
            .map(Ok),
    )
    .boxed()
}

/// A single in-memory chunk.
pub fn once(bytes: Bytes) -> ByteStream {
    stream::iter([Ok(bytes)]).boxed()
}

/// Exactly `len` bytes of `source`: longer sources are cut, shorter ones are
/// zero-filled. The stream ends after the first error.
pub fn exact_length(source: ByteStream, len: u64) -> ByteStream {
    stream::unfold(
        (source.fuse(), len),
        |(mut source, remaining)| async move {
            if remaining == 0 {
                return None;
            }
            match source.next().await {
                Some(Ok(mut chunk)) => {
                    if chunk.len() as u64 > remaining {
                        chunk.truncate(remaining as usize);
                    }
                    let left = remaining - chunk.len() as u64;
                    Some((Ok(chunk), (source, left)))
                }
                Some(Err(e)) => Some((Err(e), (source, 0))),
                None => {
                    let n = remaining.min(ZERO_CHUNK_LEN as u64) as usize;
                    Some((Ok(zero_bytes(n)), (source, remaining - n as u64)))
                }
            }
        },
    )
    .boxed()
}

/// Parts one after another.
pub fn concat(parts: Vec<ByteStream>) -> ByteStream {
    stream::iter(parts).flatten().boxed()
}

/// Drain a stream into memory.
pub async fn collect(mut stream: ByteStream) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(parts: &[&'static [u8]]) -> ByteStream {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok(Bytes::from_static(p)))
                .collect::<Vec<_>>(),
        )
        .boxed()
    }

    #[tokio::test]
    async fn test_zeros_length() {
        let out = collect(zeros(ZERO_CHUNK_LEN as u64 * 2 + 5)).await.unwrap();
        assert_eq!(out.len(), ZERO_CHUNK_LEN * 2 + 5);
        assert!(out.iter().all(|b| *b == 0));
        assert!(collect(zeros(0)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exact_length_truncates() {
        let out = collect(exact_length(chunks(&[b"abc", b"defg"]), 5)).await.unwrap();
        assert_eq!(out, b"abcde");
    }

    #[tokio::test]
    async fn test_exact_length_zero_fills() {
        let out = collect(exact_length(chunks(&[b"ab"]), 5)).await.unwrap();
        assert_eq!(out, b"ab\0\0\0");
    }

    #[tokio::test]
    async fn test_exact_length_stops_on_error() {
        let source = stream::iter(vec![
            Ok(Bytes::from_static(b"ab")),
            Err(io::Error::new(io::ErrorKind::Other, "boom")),
            Ok(Bytes::from_static(b"cd")),
        ])
        .boxed();
        let items: Vec<_> = exact_length(source, 10).collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[1].is_err());
    }

    #[tokio::test]
    async fn test_concat_in_order() {
        let out = collect(concat(vec![
            chunks(&[b"x"]),
            zeros(2),
            once(Bytes::from_static(b"yz")),
        ]))
        .await
        .unwrap();
        assert_eq!(out, b"x\0\0yz");
    }
}
