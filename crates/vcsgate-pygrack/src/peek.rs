//! Reads the first line off a chunk stream without losing the bytes: the
//! original rewinds `request.body_file_seekable` after reading the want
//! line so the full body, including that line, still reaches `git`'s
//! stdin. A chunk stream can't be rewound, so instead the bytes consumed
//! while looking for the line boundary (the line itself plus whatever was
//! read past it) are spliced back in front of whatever remains unread,
//! reconstructing the full original body.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use vcsgate_subprocio::ByteStream;

pub async fn peek_first_line(mut stream: ByteStream) -> std::io::Result<(Vec<u8>, ByteStream)> {
    let mut buf = Vec::new();

    loop {
        if let Some(pos) = buf.iter().position(|&b| b == b'\n') {
            let line = buf[..=pos].to_vec();
            let rebuilt = prepend(buf, stream);
            return Ok((line, rebuilt));
        }

        match stream.next().await {
            Some(Ok(chunk)) => buf.extend_from_slice(&chunk),
            Some(Err(e)) => return Err(e),
            None => return Ok((buf, Box::pin(futures::stream::empty()))),
        }
    }
}

fn prepend(consumed: Vec<u8>, rest: ByteStream) -> ByteStream {
    if consumed.is_empty() {
        return rest;
    }
    let head = futures::stream::once(async move { Ok(Bytes::from(consumed)) });
    Box::pin(head.chain(rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_of(chunks: Vec<&'static [u8]>) -> ByteStream {
        Box::pin(futures::stream::iter(
            chunks.into_iter().map(|c| Ok(Bytes::from_static(c))),
        ))
    }

    #[tokio::test]
    async fn splits_line_and_splices_it_back_into_the_rebuilt_body() {
        let stream = stream_of(vec![b"0054want x\n00000009done\n"]);
        let (line, mut rest) = peek_first_line(stream).await.unwrap();
        assert_eq!(line, b"0054want x\n");

        let mut collected = Vec::new();
        while let Some(chunk) = rest.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(collected, b"0054want x\n00000009done\n");
    }

    #[tokio::test]
    async fn line_spanning_multiple_chunks() {
        let stream = stream_of(vec![b"0054wa", b"nt x\ntail"]);
        let (line, mut rest) = peek_first_line(stream).await.unwrap();
        assert_eq!(line, b"0054want x\n");

        let mut collected = Vec::new();
        while let Some(chunk) = rest.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(collected, b"0054want x\ntail");
    }
}
