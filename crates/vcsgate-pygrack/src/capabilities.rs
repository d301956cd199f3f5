//! Parses the capability list off a client's first `want` pkt-line.
//! Dulwich-style (`extract_want_line_capabilities`): the line is
//! `<pkt-len><"want" SP sha1 SP cap SP cap ...>\n`; everything after the
//! sha1 is a capability.

use std::collections::HashSet;

pub fn parse_want_line_capabilities(line: &[u8]) -> HashSet<String> {
    let text = String::from_utf8_lossy(line);
    let without_len = if text.len() >= 4 && text.as_bytes()[..4].iter().all(u8::is_ascii_hexdigit) {
        &text[4..]
    } else {
        text.as_ref()
    };
    let trimmed = without_len.trim_end_matches('\n').trim_end_matches('\r');

    let mut parts = trimmed.split(' ').filter(|s| !s.is_empty());
    let _want = parts.next();
    let _sha = parts.next();
    parts.map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_capabilities_after_want_and_sha() {
        let line = b"0054want 74730d410fcb6603ace96f1dc55ea6196122532d multi_ack side-band-64k ofs-delta\n";
        let caps = parse_want_line_capabilities(line);
        assert!(caps.contains("multi_ack"));
        assert!(caps.contains("side-band-64k"));
        assert!(caps.contains("ofs-delta"));
        assert_eq!(caps.len(), 3);
    }
}
