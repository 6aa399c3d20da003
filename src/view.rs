//! The parsed URL view and its field model.

use crate::error::Result;
use core::ops::Range;

/// Identifies one of the seven URL fields.
///
/// The discriminants are stable and key the presence bitset returned by
/// [`UrlView::field_set`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FieldTag {
    /// The scheme, without the trailing `:`.
    Scheme = 0,
    /// The host. For a bracketed IP literal, the bytes between `[` and `]`.
    Host = 1,
    /// The port digit run.
    Port = 2,
    /// The path, including its leading `/` or `*`.
    Path = 3,
    /// The query, without the leading `?`.
    Query = 4,
    /// The fragment, without the leading `#`.
    Fragment = 5,
    /// The userinfo, without the trailing `@`.
    Userinfo = 6,
}

impl FieldTag {
    /// All field tags, in discriminant order.
    pub const ALL: [FieldTag; 7] = [
        FieldTag::Scheme,
        FieldTag::Host,
        FieldTag::Port,
        FieldTag::Path,
        FieldTag::Query,
        FieldTag::Fragment,
        FieldTag::Userinfo,
    ];

    /// Returns the field's name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            FieldTag::Scheme => "scheme",
            FieldTag::Host => "host",
            FieldTag::Port => "port",
            FieldTag::Path => "path",
            FieldTag::Query => "query",
            FieldTag::Fragment => "fragment",
            FieldTag::Userinfo => "userinfo",
        }
    }

    #[inline]
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// The location of a field within the parsed input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldSpan {
    /// Byte offset of the field within the input.
    pub off: u32,
    /// Byte length of the field.
    pub len: u32,
}

impl FieldSpan {
    /// Returns the span as a half-open byte range.
    #[inline]
    #[must_use]
    pub const fn range(self) -> Range<usize> {
        self.off as usize..(self.off + self.len) as usize
    }
}

/// A zero-copy decomposition of a URL.
///
/// A `UrlView` stores, for each recognized field, a byte offset and length
/// into the input it was parsed from, never a copy. It is therefore only
/// meaningful together with that input (or a byte-identical one): offsets
/// are relative to the buffer passed to [`parse`](UrlView::parse).
///
/// Presence is tracked independently of a field being non-empty; a URL
/// ending in `?` has a present, zero-length query.
///
/// # Examples
///
/// ```
/// use url_view::{FieldTag, UrlView};
///
/// let url = "https://example.com:8080/search?q=1#top";
/// let view = UrlView::parse(url)?;
///
/// assert_eq!(view.slice(FieldTag::Scheme, url.as_bytes()), Some(&b"https"[..]));
/// assert_eq!(view.slice(FieldTag::Host, url.as_bytes()), Some(&b"example.com"[..]));
/// assert_eq!(view.port(), Some(8080));
/// assert_eq!(view.range(FieldTag::Path), Some(24..31));
/// assert!(!view.is_present(FieldTag::Userinfo));
/// # Ok::<_, url_view::ParseError>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UrlView {
    field_set: u8,
    fields: [FieldSpan; 7],
    port: u16,
}

impl UrlView {
    /// Creates a zeroed view: no field present, all spans `(0, 0)`.
    #[inline]
    #[must_use]
    pub const fn new() -> UrlView {
        UrlView {
            field_set: 0,
            fields: [FieldSpan { off: 0, len: 0 }; 7],
            port: 0,
        }
    }

    /// Parses a URL from a byte sequence.
    ///
    /// Accepts absolute URLs (`scheme://…`), scheme-relative URLs
    /// (`//host…`), and path-relative targets starting with `/` or `*`.
    /// For the authority form used by HTTP `CONNECT`, use
    /// [`parse_authority`](UrlView::parse_authority).
    ///
    /// # Examples
    ///
    /// ```
    /// use url_view::{FieldTag, UrlView};
    ///
    /// let url = "//example.com/path";
    /// let view = UrlView::parse(url)?;
    /// assert!(!view.is_present(FieldTag::Scheme));
    /// assert_eq!(view.range(FieldTag::Host), Some(2..13));
    /// # Ok::<_, url_view::ParseError>(())
    /// ```
    #[inline]
    pub fn parse<S: AsRef<[u8]> + ?Sized>(input: &S) -> Result<UrlView> {
        crate::parse::parse(input.as_ref(), false)
    }

    /// Parses an authority-form target (`host:port`), as used by HTTP
    /// `CONNECT`.
    ///
    /// The port is required, and a path, query, or fragment is rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use url_view::{FieldTag, UrlView};
    ///
    /// let target = "example.com:443";
    /// let view = UrlView::parse_authority(target)?;
    /// assert_eq!(view.slice(FieldTag::Host, target.as_bytes()), Some(&b"example.com"[..]));
    /// assert_eq!(view.port(), Some(443));
    /// # Ok::<_, url_view::ParseError>(())
    /// ```
    #[inline]
    pub fn parse_authority<S: AsRef<[u8]> + ?Sized>(input: &S) -> Result<UrlView> {
        crate::parse::parse(input.as_ref(), true)
    }

    /// Returns the raw presence bitset, keyed by `1 << tag`.
    #[inline]
    #[must_use]
    pub const fn field_set(&self) -> u8 {
        self.field_set
    }

    /// Returns `true` if the field was recognized, even when empty.
    #[inline]
    #[must_use]
    pub const fn is_present(&self, tag: FieldTag) -> bool {
        self.field_set & tag.bit() != 0
    }

    /// Returns the field's span, or `None` if the field is absent.
    #[inline]
    #[must_use]
    pub fn field(&self, tag: FieldTag) -> Option<FieldSpan> {
        self.is_present(tag).then(|| self.fields[tag as usize])
    }

    /// Returns the field's byte range within the input, or `None` if the
    /// field is absent.
    #[inline]
    #[must_use]
    pub fn range(&self, tag: FieldTag) -> Option<Range<usize>> {
        self.field(tag).map(FieldSpan::range)
    }

    /// Returns the field's bytes within `input`, or `None` if the field
    /// is absent.
    ///
    /// `input` must be the buffer this view was parsed from; offsets are
    /// relative to it.
    #[inline]
    #[must_use]
    pub fn slice<'a>(&self, tag: FieldTag, input: &'a [u8]) -> Option<&'a [u8]> {
        self.range(tag).map(|r| &input[r])
    }

    /// Returns the decoded port, or `None` if no port is present.
    #[inline]
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        if self.is_present(FieldTag::Port) {
            Some(self.port)
        } else {
            None
        }
    }

    /// Resets the view to the zeroed state.
    #[inline]
    pub fn clear(&mut self) {
        *self = UrlView::new();
    }

    pub(crate) fn mark(&mut self, tag: FieldTag) {
        self.field_set |= tag.bit();
    }

    pub(crate) fn unmark(&mut self, tag: FieldTag) {
        self.field_set &= !tag.bit();
    }

    pub(crate) fn set(&mut self, tag: FieldTag, off: u32, len: u32) {
        self.fields[tag as usize] = FieldSpan { off, len };
        self.mark(tag);
    }

    pub(crate) fn set_port_value(&mut self, port: u16) {
        self.port = port;
    }
}
