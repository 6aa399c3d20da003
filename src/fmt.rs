use crate::{
    error::{ParseError, ParseErrorKind},
    view::FieldTag,
};
use core::fmt::{Debug, Display, Formatter, Result};

impl Debug for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("ParseError")
            .field("index", &self.index)
            .field("kind", &self.kind)
            .finish()
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let msg = match self.kind {
            ParseErrorKind::EmptyInput => return f.write_str("empty input"),
            ParseErrorKind::InputTooLong => {
                return f.write_str("input longer than u32::MAX bytes")
            }
            ParseErrorKind::BadStart => "unexpected start byte at index ",
            ParseErrorKind::BadScheme => "unexpected byte in scheme at index ",
            ParseErrorKind::SchemeWithoutAuthority => "expected \"//\" at index ",
            ParseErrorKind::EmptyHost => "empty host at index ",
            ParseErrorKind::DoubleAt => "second \"@\" in authority at index ",
            ParseErrorKind::BadHostChar => "unexpected byte in host at index ",
            ParseErrorKind::UnclosedIpv6 => "unclosed IP literal at index ",
            ParseErrorKind::BadIpv6Char => "unexpected byte in IP literal at index ",
            ParseErrorKind::BadPort => "invalid port at index ",
            ParseErrorKind::BadPercentEncoding => {
                "invalid percent-encoded octet in host at index "
            }
            ParseErrorKind::BadPathChar => "unexpected byte in path at index ",
            ParseErrorKind::BadQueryChar => "unexpected byte in query at index ",
            ParseErrorKind::BadFragmentChar => "unexpected byte in fragment at index ",
            ParseErrorKind::ConnectWithNonAuthority => {
                "unexpected non-authority bytes at index "
            }
            ParseErrorKind::ConnectWithoutPort => "authority form without a port at index ",
        };
        write!(f, "{}{}", msg, self.index)
    }
}

impl Display for FieldTag {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.name())
    }
}
