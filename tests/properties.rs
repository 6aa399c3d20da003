//! Property-based invariants over generated inputs.

use proptest::prelude::*;
use url_view::{FieldTag, ParseErrorKind, UrlView};

proptest! {
    #[test]
    fn spans_stay_in_bounds(input in proptest::collection::vec(any::<u8>(), 0..256)) {
        if let Ok(view) = url_view::parse(&input[..]) {
            for tag in FieldTag::ALL {
                if let Some(r) = view.range(tag) {
                    prop_assert!(r.end <= input.len());
                }
            }
        }
    }

    // The free functions and the associated functions are one entry point.
    #[test]
    fn free_functions_agree(input in proptest::collection::vec(any::<u8>(), 0..128)) {
        prop_assert_eq!(url_view::parse(&input[..]), UrlView::parse(&input[..]));
        prop_assert_eq!(
            url_view::parse_authority(&input[..]),
            UrlView::parse_authority(&input[..])
        );
    }

    #[test]
    fn parsing_is_idempotent(input in proptest::collection::vec(any::<u8>(), 0..128)) {
        prop_assert_eq!(UrlView::parse(&input[..]), UrlView::parse(&input[..]));
        prop_assert_eq!(
            UrlView::parse_authority(&input[..]),
            UrlView::parse_authority(&input[..])
        );
    }

    #[test]
    fn scheme_implies_host(input in proptest::collection::vec(any::<u8>(), 0..128)) {
        if let Ok(view) = UrlView::parse(&input[..]) {
            if view.is_present(FieldTag::Scheme) {
                prop_assert!(view.is_present(FieldTag::Host));
            }
        }
    }

    #[test]
    fn connect_accepts_only_authorities(input in proptest::collection::vec(any::<u8>(), 0..128)) {
        if let Ok(view) = url_view::parse_authority(&input[..]) {
            prop_assert!(view.is_present(FieldTag::Host));
            prop_assert!(view.is_present(FieldTag::Port));
            prop_assert!(!view.is_present(FieldTag::Scheme));
            prop_assert!(!view.is_present(FieldTag::Path));
            prop_assert!(!view.is_present(FieldTag::Query));
            prop_assert!(!view.is_present(FieldTag::Fragment));
        }
    }

    #[test]
    fn generated_urls_decompose(
        scheme in "[a-z][a-z0-9+.-]{0,8}",
        host in "[a-z0-9.-]{1,16}",
        port in proptest::option::of(0u32..65536),
        path in "(/[a-zA-Z0-9._~-]{0,8}){0,4}",
        query in proptest::option::of("[a-zA-Z0-9=&?]{0,12}"),
        fragment in proptest::option::of("[a-zA-Z0-9#?]{0,12}"),
    ) {
        let mut url = format!("{scheme}://{host}");
        if let Some(p) = port {
            url.push_str(&format!(":{p}"));
        }
        url.push_str(&path);
        if let Some(q) = &query {
            url.push('?');
            url.push_str(q);
        }
        if let Some(f) = &fragment {
            url.push('#');
            url.push_str(f);
        }

        let view = UrlView::parse(&url).unwrap();
        let bytes = url.as_bytes();
        prop_assert_eq!(view.slice(FieldTag::Scheme, bytes).unwrap(), scheme.as_bytes());
        prop_assert_eq!(view.slice(FieldTag::Host, bytes).unwrap(), host.as_bytes());
        match port {
            Some(p) => prop_assert_eq!(view.port(), Some(p as u16)),
            None => prop_assert!(!view.is_present(FieldTag::Port)),
        }
        if path.is_empty() {
            prop_assert!(!view.is_present(FieldTag::Path));
        } else {
            prop_assert_eq!(view.slice(FieldTag::Path, bytes).unwrap(), path.as_bytes());
        }
        match &query {
            Some(q) => prop_assert_eq!(view.slice(FieldTag::Query, bytes).unwrap(), q.as_bytes()),
            None => prop_assert!(!view.is_present(FieldTag::Query)),
        }
        match &fragment {
            Some(f) => {
                prop_assert_eq!(view.slice(FieldTag::Fragment, bytes).unwrap(), f.as_bytes());
            }
            None => prop_assert!(!view.is_present(FieldTag::Fragment)),
        }
    }

    #[test]
    fn connect_port_agrees_with_digit_run(
        host in "[a-z][a-z0-9.-]{0,12}",
        port in 0u32..100_000,
    ) {
        let input = format!("{host}:{port}");
        match UrlView::parse_authority(&input) {
            Ok(view) => {
                prop_assert!(port <= 65535);
                let digits = view.slice(FieldTag::Port, input.as_bytes()).unwrap();
                prop_assert!(!digits.is_empty() && digits.len() <= 5);
                let digits = core::str::from_utf8(digits).unwrap();
                prop_assert_eq!(digits.parse::<u32>().unwrap(), port);
                prop_assert_eq!(view.port(), Some(port as u16));
            }
            Err(e) => {
                prop_assert!(port > 65535);
                prop_assert_eq!(e.kind(), ParseErrorKind::BadPort);
            }
        }
    }

    #[test]
    fn bracketed_host_excludes_brackets(
        head in "[0-9a-f]{1,4}",
        tail in "[0-9a-f]{0,4}",
        zone in proptest::option::of("[a-z0-9]{1,6}"),
    ) {
        let mut host = format!("{head}::{tail}");
        if let Some(z) = &zone {
            host.push('%');
            host.push_str(z);
        }
        let url = format!("http://[{host}]:8080/");
        let view = UrlView::parse(&url).unwrap();

        let r = view.range(FieldTag::Host).unwrap();
        prop_assert_eq!(&url.as_bytes()[r.clone()], host.as_bytes());
        prop_assert_eq!(url.as_bytes()[r.start - 1], b'[');
        prop_assert_eq!(url.as_bytes()[r.end], b']');
        prop_assert_eq!(view.port(), Some(8080));
    }

    #[test]
    fn offsets_are_relative_to_the_buffer(
        url in "[a-z]{1,8}://[a-z0-9.]{1,12}(:[0-9]{1,4})?(/[a-z0-9]{0,8}){0,3}",
    ) {
        let a = UrlView::parse(&url).unwrap();
        let copy = url.clone().into_bytes();
        let b = UrlView::parse(&copy[..]).unwrap();
        prop_assert_eq!(a, b);
    }
}
