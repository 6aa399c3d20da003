//! The parsing engine.
//!
//! A single forward pass drives a small state machine over the input. The
//! character tables in [`tables`](crate::tables) decide byte validity, and
//! batch scans cover the bulk components: the authority body, the interior
//! of an IP literal, and the path, query, and fragment. Nothing on this
//! path allocates.

use crate::{
    error::{ParseError, ParseErrorKind, Result},
    tables::{self, Class},
    view::{FieldTag, UrlView},
};
use memchr::{memchr, memchr_iter, memrchr};

/// Returns immediately with an error.
macro_rules! err {
    ($index:expr, $kind:ident) => {
        return Err(ParseError {
            index: $index,
            kind: ParseErrorKind::$kind,
        })
    };
}

pub(crate) fn parse(bytes: &[u8], authority_only: bool) -> Result<UrlView> {
    if bytes.is_empty() {
        err!(0, EmptyInput);
    }
    if bytes.len() > u32::MAX as usize {
        err!(0, InputTooLong);
    }

    let mut parser = Parser {
        reader: Reader::new(bytes),
        out: UrlView::new(),
    };
    if authority_only {
        parser.parse_authority(true)?;
    } else {
        parser.parse_from_start()?;
    }
    parser.validate_host_pct()?;
    Ok(parser.out)
}

/// Cursor over the input bytes.
///
/// The invariant holds that `pos <= len` and `pos` is non-decreasing.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, pos: 0 }
    }

    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn peek(&self, i: usize) -> Option<u8> {
        self.bytes.get(self.pos + i).copied()
    }

    // Any call to this method must keep the invariants.
    fn skip(&mut self, n: usize) {
        // INVARIANT: `pos` is non-decreasing.
        self.pos += n;
        debug_assert!(self.pos <= self.len());
    }

    fn read_str(&mut self, s: &str) -> bool {
        if self.bytes[self.pos..].starts_with(s.as_bytes()) {
            // INVARIANT: The remaining bytes start with `s` so it's fine
            // to skip `s.len()`.
            self.skip(s.len());
            true
        } else {
            false
        }
    }

    /// Batch-scans a run of authority-body bytes, returning the delimiter
    /// that ended the run, or `None` at end of input.
    ///
    /// Fails on any byte that is neither an authority-body byte nor a
    /// delimiter.
    fn scan_authority_run(&mut self) -> Result<Option<u8>> {
        while let Some(x) = self.peek(0) {
            if matches!(x, b'@' | b'[' | b']' | b':' | b'/' | b'?') {
                return Ok(Some(x));
            }
            if !tables::is_userinfo(x) {
                err!(self.pos, BadHostChar);
            }
            // INVARIANT: The current byte is valid so it's fine to skip it.
            self.skip(1);
        }
        Ok(None)
    }

    /// Scans a bracketed IP literal. On entry `pos` is one past the `[`
    /// at index `open`; on success `pos` is one past the matching `]`.
    ///
    /// A `%` introduces a zone identifier whose bytes are taken verbatim
    /// up to the closing `]`.
    fn scan_ip_literal(&mut self, open: usize) -> Result<()> {
        loop {
            match self.peek(0) {
                None => err!(open, UnclosedIpv6),
                Some(b']') => {
                    // INVARIANT: Skipping "]" is fine.
                    self.skip(1);
                    return Ok(());
                }
                Some(b'%') => {
                    let bytes = self.bytes;
                    let Some(i) = memchr(b']', &bytes[self.pos..]) else {
                        err!(open, UnclosedIpv6);
                    };
                    // INVARIANT: `pos + i` is the index of a "]".
                    self.skip(i + 1);
                    return Ok(());
                }
                Some(x) if tables::is_hexdig(x) || x == b':' || x == b'.' => {
                    // INVARIANT: The current byte is valid so it's fine
                    // to skip it.
                    self.skip(1);
                }
                Some(_) => err!(self.pos, BadIpv6Char),
            }
        }
    }
}

/// Decodes a run of 1 to 5 decimal digits into a port number.
fn decode_port(digits: &[u8]) -> Option<u16> {
    if digits.is_empty() || digits.len() > 5 {
        return None;
    }
    let mut v: u32 = 0;
    for &x in digits {
        if !tables::is_digit(x) {
            return None;
        }
        v = v * 10 + u32::from(x - b'0');
        if v > u16::MAX as u32 {
            return None;
        }
    }
    Some(v as u16)
}

struct Parser<'a> {
    reader: Reader<'a>,
    out: UrlView,
}

impl<'a> core::ops::Deref for Parser<'a> {
    type Target = Reader<'a>;

    fn deref(&self) -> &Self::Target {
        &self.reader
    }
}

impl core::ops::DerefMut for Parser<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.reader
    }
}

impl Parser<'_> {
    fn parse_from_start(&mut self) -> Result<()> {
        match self.bytes[0] {
            b'/' if self.peek(1) == Some(b'/') => {
                // Scheme-relative: the authority begins after the two
                // slashes and no scheme field is recorded.
                self.skip(2);
                self.parse_authority(false)
            }
            // A rootless path or an asterisk-form request target.
            b'/' | b'*' => self.parse_path(),
            x if tables::is_alpha(x) => {
                self.parse_scheme()?;
                self.parse_authority(false)
            }
            _ => err!(0, BadStart),
        }
    }

    /// Scans the scheme and the `://` that must follow it.
    fn parse_scheme(&mut self) -> Result<()> {
        // Literal prefixes for the common schemes. The generic scan below
        // accepts exactly the same language.
        const FAST_SCHEMES: &[&str] = &["https:", "http:", "wss:", "ws:", "ftp:"];
        for s in FAST_SCHEMES {
            if self.read_str(s) {
                self.out.set(FieldTag::Scheme, 0, (s.len() - 1) as u32);
                return self.expect_authority_slashes();
            }
        }

        while let Some(x) = self.peek(0) {
            match tables::class(x) {
                Class::Alpha | Class::Digit | Class::Plus | Class::Dash | Class::Dot => {
                    // INVARIANT: The current byte is valid so it's fine
                    // to skip it.
                    self.skip(1);
                }
                Class::Colon => {
                    self.out.set(FieldTag::Scheme, 0, self.pos as u32);
                    // INVARIANT: Skipping ":" is fine.
                    self.skip(1);
                    return self.expect_authority_slashes();
                }
                _ => err!(self.pos, BadScheme),
            }
        }
        err!(self.pos, SchemeWithoutAuthority)
    }

    fn expect_authority_slashes(&mut self) -> Result<()> {
        if self.read_str("//") {
            Ok(())
        } else {
            err!(self.pos, SchemeWithoutAuthority)
        }
    }

    /// Scans the authority, from the byte after `://` (or the start of an
    /// authority-form target) up to the path, query, or end of input.
    fn parse_authority(&mut self, connect: bool) -> Result<()> {
        self.out.mark(FieldTag::Host);
        if matches!(self.peek(0), None | Some(b'/') | Some(b'?') | Some(b'#')) {
            err!(self.pos, EmptyHost);
        }

        let mut field_start = self.pos;
        let mut saw_at = false;
        let mut saw_colon = false;
        let mut port_start = 0;

        loop {
            let Some(x) = self.scan_authority_run()? else {
                // End of input: flush the host and port fields.
                let end = self.len();
                self.finish_authority(field_start, end, saw_colon, port_start)?;
                if connect && !self.out.is_present(FieldTag::Port) {
                    err!(end, ConnectWithoutPort);
                }
                return Ok(());
            };
            match x {
                b'/' | b'?' => {
                    if connect {
                        err!(self.pos, ConnectWithNonAuthority);
                    }
                    let end = self.pos;
                    self.finish_authority(field_start, end, saw_colon, port_start)?;
                    return if x == b'/' {
                        self.parse_path()
                    } else {
                        // INVARIANT: Skipping "?" is fine.
                        self.skip(1);
                        self.parse_query()
                    };
                }
                b'@' => {
                    if saw_at {
                        err!(self.pos, DoubleAt);
                    }
                    // Everything scanned so far was userinfo, not host.
                    self.out.set(
                        FieldTag::Userinfo,
                        field_start as u32,
                        (self.pos - field_start) as u32,
                    );
                    self.out.unmark(FieldTag::Host);
                    // INVARIANT: Skipping "@" is fine.
                    self.skip(1);
                    field_start = self.pos;
                    self.out.mark(FieldTag::Host);
                    saw_at = true;
                    saw_colon = false;
                }
                b'[' => {
                    let open = self.pos;
                    // INVARIANT: Skipping "[" is fine.
                    self.skip(1);
                    self.scan_ip_literal(open)?;
                }
                // A stray "]" is tolerated as a host byte.
                b']' => self.skip(1),
                b':' => {
                    // INVARIANT: Skipping ":" is fine.
                    self.skip(1);
                    // Only the first unbracketed colon can start a port;
                    // later ones surface as a port decode failure.
                    if !saw_colon {
                        saw_colon = true;
                        port_start = self.pos;
                    }
                }
                _ => unreachable!(),
            }
        }
    }

    /// Splits the scanned authority into host and port fields.
    ///
    /// `end` is one past the last authority byte and `port_start` is the
    /// byte after the first unbracketed colon, meaningful only when
    /// `saw_colon` is set.
    fn finish_authority(
        &mut self,
        field_start: usize,
        end: usize,
        saw_colon: bool,
        port_start: usize,
    ) -> Result<()> {
        let bytes = self.reader.bytes;
        let host_len = if saw_colon {
            port_start - field_start - 1
        } else {
            end - field_start
        };

        if host_len >= 2 && bytes[field_start] == b'[' {
            // Bracketed literal: the stored host excludes the brackets,
            // and only a colon directly after `]` introduces a port.
            let Some(k) = memrchr(b']', &bytes[field_start..end]) else {
                err!(field_start, UnclosedIpv6);
            };
            let k = field_start + k;
            if k + 1 < end && bytes[k + 1] == b':' {
                let Some(port) = decode_port(&bytes[k + 2..end]) else {
                    err!(k + 2, BadPort);
                };
                self.out
                    .set(FieldTag::Port, (k + 2) as u32, (end - (k + 2)) as u32);
                self.out.set_port_value(port);
            }
            self.out.set(
                FieldTag::Host,
                (field_start + 1) as u32,
                (k - field_start - 1) as u32,
            );
        } else if saw_colon && port_start > field_start && port_start < end {
            let Some(port) = decode_port(&bytes[port_start..end]) else {
                err!(port_start, BadPort);
            };
            self.out
                .set(FieldTag::Host, field_start as u32, host_len as u32);
            self.out
                .set(FieldTag::Port, port_start as u32, (end - port_start) as u32);
            self.out.set_port_value(port);
        } else {
            // No port. A trailing colon, if any, stays in the host.
            self.out
                .set(FieldTag::Host, field_start as u32, (end - field_start) as u32);
        }
        Ok(())
    }

    /// Scans the path, then dispatches on `?` or `#`.
    fn parse_path(&mut self) -> Result<()> {
        let start = self.pos;
        while let Some(x) = self.peek(0) {
            match tables::class(x) {
                Class::Invalid => err!(self.pos, BadPathChar),
                Class::Question => {
                    self.out
                        .set(FieldTag::Path, start as u32, (self.pos - start) as u32);
                    // INVARIANT: Skipping "?" is fine.
                    self.skip(1);
                    return self.parse_query();
                }
                Class::Hash => {
                    self.out
                        .set(FieldTag::Path, start as u32, (self.pos - start) as u32);
                    // INVARIANT: Skipping "#" is fine.
                    self.skip(1);
                    return self.parse_fragment();
                }
                _ => {
                    // INVARIANT: The current byte is valid so it's fine
                    // to skip it.
                    self.skip(1);
                }
            }
        }
        self.out
            .set(FieldTag::Path, start as u32, (self.pos - start) as u32);
        Ok(())
    }

    /// Scans the query, locating the terminating `#` with a fast forward
    /// search. `?` is an ordinary query byte.
    fn parse_query(&mut self) -> Result<()> {
        let start = self.pos;
        let bytes = self.reader.bytes;
        let end = match memchr(b'#', &bytes[start..]) {
            Some(i) => start + i,
            None => bytes.len(),
        };
        if let Some(bad) = self.first_invalid(start, end) {
            err!(bad, BadQueryChar);
        }
        // INVARIANT: All bytes up to `end` have been validated.
        self.skip(end - start);
        self.out
            .set(FieldTag::Query, start as u32, (end - start) as u32);

        if self.read_str("#") {
            self.parse_fragment()
        } else {
            Ok(())
        }
    }

    /// Scans the fragment, which extends to the end of input. `?` and `#`
    /// are ordinary fragment bytes.
    fn parse_fragment(&mut self) -> Result<()> {
        let start = self.pos;
        let end = self.len();
        if let Some(bad) = self.first_invalid(start, end) {
            err!(bad, BadFragmentChar);
        }
        // INVARIANT: All bytes up to `end` have been validated.
        self.skip(end - start);
        self.out
            .set(FieldTag::Fragment, start as u32, (end - start) as u32);
        Ok(())
    }

    /// Index of the first `Invalid`-class byte in `bytes[start..end]`.
    fn first_invalid(&self, start: usize, end: usize) -> Option<usize> {
        self.bytes[start..end]
            .iter()
            .position(|&x| !tables::is_url_char(x))
            .map(|i| start + i)
    }

    /// Validates percent-encoding within the final host field.
    ///
    /// A host that also contains a colon is taken to be an IP literal
    /// with a zone identifier and is accepted verbatim.
    fn validate_host_pct(&self) -> Result<()> {
        let Some(range) = self.out.range(FieldTag::Host) else {
            return Ok(());
        };
        let off = range.start;
        let host = &self.bytes[range];
        if memchr(b'%', host).is_none() || memchr(b':', host).is_some() {
            return Ok(());
        }
        for p in memchr_iter(b'%', host) {
            if p + 2 >= host.len()
                || !tables::is_hexdig(host[p + 1])
                || !tables::is_hexdig(host[p + 2])
            {
                err!(off + p, BadPercentEncoding);
            }
        }
        Ok(())
    }
}
