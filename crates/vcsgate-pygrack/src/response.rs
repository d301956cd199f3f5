//! Builds the synthetic response that stands in for an upload-pack reply
//! when a pre-pull hook rejects the request, and injects hook-produced
//! progress messages into an already-materialized response. Both mirror
//! `original_source/vcsserver/pygrack.py`'s `_build_failed_pre_pull_response`
//! and `_inject_messages_to_response`.

use std::collections::HashSet;

use bytes::Bytes;

use crate::pktline::{flush_pkt, pkt_line, sideband_chunk_size, sideband_chunks, sideband_packet, EMPTY_PACK};

/// When `capabilities` negotiated a sideband, the rejection is framed as
/// `NAK`, a channel-2 progress message carrying the pre-pull hook's own
/// `pre_pull_messages`, a channel-2 message carrying `reason`, and the empty
/// pack on channel 1, terminated by a flush-pkt. Without a sideband there is
/// no channel to carry either message on, so the response degrades to the
/// bare empty pack.
pub fn build_failed_pre_pull_response(
    capabilities: &HashSet<String>,
    pre_pull_messages: &[u8],
    reason: &[u8],
) -> Vec<Bytes> {
    match sideband_chunk_size(capabilities) {
        Some(chunk_size) => {
            let mut packets = vec![pkt_line(b"NAK\n")];
            packets.extend(sideband_chunks(2, pre_pull_messages, chunk_size));
            packets.extend(sideband_chunks(2, reason, chunk_size));
            packets.extend(sideband_chunks(1, &EMPTY_PACK, chunk_size));
            packets.push(flush_pkt());
            packets.into_iter().map(Bytes::from).collect()
        }
        None => vec![Bytes::copy_from_slice(&EMPTY_PACK)],
    }
}

/// Splices `start_messages`/`end_messages` into an already-materialized
/// sideband response as extra channel-2 packets, immediately after the
/// leading `NAK` and immediately before the trailing flush-pkt. A response
/// with no sideband negotiated is returned unchanged, since there is no
/// progress channel to carry the messages on.
pub fn inject_messages(
    response: Vec<Bytes>,
    capabilities: &HashSet<String>,
    start_messages: &[u8],
    end_messages: &[u8],
) -> Vec<Bytes> {
    let Some(chunk_size) = sideband_chunk_size(capabilities) else {
        return response;
    };
    if start_messages.is_empty() && end_messages.is_empty() {
        return response;
    }

    let whole: Vec<u8> = response.iter().flat_map(|b| b.iter().copied()).collect();
    if !whole.starts_with(b"0008NAK\n") || !whole.ends_with(b"0000") {
        return response;
    }

    let mut out = vec![Bytes::from_static(b"0008NAK\n")];
    out.extend(sideband_chunks(2, start_messages, chunk_size).into_iter().map(Bytes::from));

    let body = &whole[8..whole.len() - 4];
    if !body.is_empty() {
        out.push(Bytes::copy_from_slice(body));
    }

    out.extend(sideband_chunks(2, end_messages, chunk_size).into_iter().map(Bytes::from));
    out.push(Bytes::from(flush_pkt()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn failed_pre_pull_with_sideband_carries_hook_output_reason_and_empty_pack() {
        let response = build_failed_pre_pull_response(
            &caps(&["side-band-64k"]),
            b"foo",
            b"Pre pull hook failed: aborting\n",
        );
        let whole: Vec<u8> = response.iter().flat_map(|b| b.iter().copied()).collect();

        assert!(whole.starts_with(b"0008NAK\n"));
        assert!(whole.ends_with(b"0000"));
        assert!(whole.windows(3).any(|w| w == b"foo"));
        assert!(whole
            .windows(b"Pre pull hook failed: aborting".len())
            .any(|w| w == b"Pre pull hook failed: aborting"));
        let pack_packet_marker = {
            let mut m = vec![1u8];
            m.extend_from_slice(&EMPTY_PACK);
            m
        };
        assert!(whole
            .windows(pack_packet_marker.len())
            .any(|w| w == pack_packet_marker.as_slice()));

        // Scenario 2 from the spec: parsed sideband packets in order.
        let mut de = vec![b"NAK\n".to_vec(), b"\x02foo".to_vec(), b"\x02Pre pull hook failed: aborting\n".to_vec()];
        de.push({
            let mut m = vec![1u8];
            m.extend_from_slice(&EMPTY_PACK);
            m
        });
        let mut rest = whole.as_slice();
        let mut packets = Vec::new();
        while !rest.is_empty() {
            let len = usize::from_str_radix(std::str::from_utf8(&rest[..4]).unwrap(), 16).unwrap();
            if len == 0 {
                rest = &rest[4..];
                continue;
            }
            packets.push(rest[4..len].to_vec());
            rest = &rest[len..];
        }
        assert_eq!(packets, de);
    }

    #[test]
    fn failed_pre_pull_without_sideband_is_just_the_empty_pack() {
        let response = build_failed_pre_pull_response(&caps(&[]), b"foo", b"ignored\n");
        assert_eq!(response.len(), 1);
        assert_eq!(response[0].as_ref(), &EMPTY_PACK);
    }

    #[test]
    fn inject_messages_wraps_body_between_nak_and_flush() {
        let response = vec![Bytes::from_static(b"0008NAK\n0009subp\n0000")];
        let injected = inject_messages(response, &caps(&["side-band-64k"]), b"foo", b"bar");
        let whole: Vec<u8> = injected.iter().flat_map(|b| b.iter().copied()).collect();

        let mut packets = Vec::new();
        let mut rest = whole.as_slice();
        while !rest.is_empty() {
            let len = usize::from_str_radix(std::str::from_utf8(&rest[..4]).unwrap(), 16).unwrap();
            if len == 0 {
                rest = &rest[4..];
                continue;
            }
            packets.push(&rest[4..len]);
            rest = &rest[len..];
        }

        assert_eq!(packets, vec![b"NAK\n".as_slice(), b"\x02foo", b"subp\n", b"\x02bar"]);
    }

    #[test]
    fn inject_messages_without_sideband_is_a_no_op() {
        let response = vec![Bytes::from_static(b"some-raw-pack-bytes")];
        let injected = inject_messages(response.clone(), &caps(&[]), b"foo", b"bar");
        assert_eq!(injected, response);
    }
}
