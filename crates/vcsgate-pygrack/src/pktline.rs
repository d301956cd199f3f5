//! Git pkt-line framing: the 4-byte-ASCII-hex-length-prefixed packets used
//! by the smart-HTTP protocol, plus the sideband channel wrapper layered on
//! top of it. Grounded line-for-line on `original_source/vcsserver/pygrack.py`'s
//! `Protocol.write_pkt_line`/`write_sideband` usage (dulwich's own
//! implementation, not reproduced here, since nothing in the workspace
//! depends on dulwich).

use std::collections::HashSet;

/// The canonical empty Git pack: a 12-byte header (version 2, zero objects)
/// followed by the SHA-1 of those 12 bytes. Sent to abort a pull
/// protocol-legally when a pre-pull hook rejects the request.
pub const EMPTY_PACK: [u8; 32] = [
    0x50, 0x41, 0x43, 0x4b, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x02, 0x9d, 0x08, 0x82,
    0x3b, 0xd8, 0xa8, 0xea, 0xb5, 0x10, 0xad, 0x6a, 0xc7, 0x5c, 0x82, 0x3c, 0xfd, 0x3e, 0xd3, 0x1e,
];

const SIDE_BAND_64K_CHUNK: usize = 65515;
const SIDE_BAND_CHUNK: usize = 995;

/// Frames `data` as a pkt-line: a 4-byte hex length (including the header
/// itself) followed by the payload. Empty data produces the flush-pkt
/// `0000`.
pub fn pkt_line(data: &[u8]) -> Vec<u8> {
    if data.is_empty() {
        return b"0000".to_vec();
    }
    let len = data.len() + 4;
    let mut out = format!("{len:04x}").into_bytes();
    out.extend_from_slice(data);
    out
}

/// The flush-pkt, `0000`, used to terminate a response.
pub fn flush_pkt() -> Vec<u8> {
    pkt_line(&[])
}

/// One sideband packet: a pkt-line whose payload is a 1-byte channel
/// (1 = pack data, 2 = progress, 3 = fatal) followed by `data`.
pub fn sideband_packet(channel: u8, data: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(data.len() + 1);
    payload.push(channel);
    payload.extend_from_slice(data);
    pkt_line(&payload)
}

/// Which sideband chunk size a client's negotiated capability set implies,
/// per the pack protocol documentation: 65515 bytes for `side-band-64k`,
/// 995 for the older `side-band`, `None` if neither was negotiated.
pub fn sideband_chunk_size(capabilities: &HashSet<String>) -> Option<usize> {
    if capabilities.contains("side-band-64k") {
        Some(SIDE_BAND_64K_CHUNK)
    } else if capabilities.contains("side-band") {
        Some(SIDE_BAND_CHUNK)
    } else {
        None
    }
}

/// Splits `data` into `chunk_size`-sized pieces and frames each as a
/// sideband packet on `channel`. Empty data yields no packets.
pub fn sideband_chunks(channel: u8, data: &[u8], chunk_size: usize) -> Vec<Vec<u8>> {
    if data.is_empty() {
        return Vec::new();
    }
    data.chunks(chunk_size)
        .map(|chunk| sideband_packet(channel, chunk))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_pkt_is_0000() {
        assert_eq!(flush_pkt(), b"0000");
    }

    #[test]
    fn pkt_line_length_includes_header() {
        assert_eq!(pkt_line(b"NAK\n"), b"0008NAK\n");
    }

    #[test]
    fn sideband_packet_prefixes_channel_byte() {
        let packet = sideband_packet(2, b"foo");
        assert_eq!(packet, b"0008\x02foo");
    }

    #[test]
    fn empty_pack_is_32_bytes() {
        assert_eq!(EMPTY_PACK.len(), 32);
        assert!(EMPTY_PACK.starts_with(b"PACK"));
    }
}
