// Property-based tests for decoding, sizing and query composition.
//
// Generated documents stay small so the suite runs quickly.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;

use lazycbor::{Decoder, GraphQuery, TagRegistry};

#[derive(Debug, Clone)]
enum Item {
    Uint(u64),
    Neg(u64),
    Text(String, bool),
    Bytes(Vec<u8>),
    Float(f64),
    Bool(bool),
    Null,
    Array(Vec<Item>, bool),
    Map(Vec<(Item, Item)>, bool),
    Tag(u64, Box<Item>),
}

fn head(out: &mut Vec<u8>, major: u8, arg: u64) {
    let m = major << 5;
    if arg < 24 {
        out.push(m | arg as u8);
    } else if arg <= u64::from(u8::MAX) {
        out.extend_from_slice(&[m | 24, arg as u8]);
    } else if arg <= u64::from(u16::MAX) {
        out.push(m | 25);
        out.extend_from_slice(&(arg as u16).to_be_bytes());
    } else if arg <= u64::from(u32::MAX) {
        out.push(m | 26);
        out.extend_from_slice(&(arg as u32).to_be_bytes());
    } else {
        out.push(m | 27);
        out.extend_from_slice(&arg.to_be_bytes());
    }
}

fn encode(item: &Item, out: &mut Vec<u8>) {
    match item {
        Item::Uint(v) => head(out, 0, *v),
        Item::Neg(v) => head(out, 1, *v),
        Item::Text(s, chunked) => {
            if *chunked {
                out.push(0x7f);
                for c in s.chars() {
                    let mut buf = [0u8; 4];
                    let enc = c.encode_utf8(&mut buf);
                    head(out, 3, enc.len() as u64);
                    out.extend_from_slice(enc.as_bytes());
                }
                out.push(0xff);
            } else {
                head(out, 3, s.len() as u64);
                out.extend_from_slice(s.as_bytes());
            }
        }
        Item::Bytes(b) => {
            head(out, 2, b.len() as u64);
            out.extend_from_slice(b);
        }
        Item::Float(f) => {
            out.push(0xfb);
            out.extend_from_slice(&f.to_bits().to_be_bytes());
        }
        Item::Bool(b) => out.push(if *b { 0xf5 } else { 0xf4 }),
        Item::Null => out.push(0xf6),
        Item::Array(items, indefinite) => {
            if *indefinite {
                out.push(0x9f);
            } else {
                head(out, 4, items.len() as u64);
            }
            for i in items {
                encode(i, out);
            }
            if *indefinite {
                out.push(0xff);
            }
        }
        Item::Map(pairs, indefinite) => {
            if *indefinite {
                out.push(0xbf);
            } else {
                head(out, 5, pairs.len() as u64);
            }
            for (k, v) in pairs {
                encode(k, out);
                encode(v, out);
            }
            if *indefinite {
                out.push(0xff);
            }
        }
        Item::Tag(n, inner) => {
            head(out, 6, *n);
            encode(inner, out);
        }
    }
}

fn to_bytes(item: &Item) -> Vec<u8> {
    let mut out = Vec::new();
    encode(item, &mut out);
    out
}

fn arb_leaf() -> impl Strategy<Value = Item> {
    prop_oneof![
        any::<u64>().prop_map(Item::Uint),
        any::<u64>().prop_map(Item::Neg),
        ("[a-z]{0,12}", any::<bool>()).prop_map(|(s, c)| Item::Text(s, c)),
        proptest::collection::vec(any::<u8>(), 0..32).prop_map(Item::Bytes),
        any::<f64>().prop_map(Item::Float),
        any::<bool>().prop_map(Item::Bool),
        Just(Item::Null),
    ]
}

fn arb_item() -> impl Strategy<Value = Item> {
    arb_leaf().prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            (proptest::collection::vec(inner.clone(), 0..8), any::<bool>())
                .prop_map(|(v, indef)| Item::Array(v, indef)),
            (
                proptest::collection::vec((inner.clone(), inner.clone()), 0..6),
                any::<bool>()
            )
                .prop_map(|(v, indef)| Item::Map(v, indef)),
            (0u64..100_000, inner).prop_map(|(n, i)| Item::Tag(n, Box::new(i))),
        ]
    })
}

/// Nested arrays only, so any index path is a valid query shape.
fn arb_arrays() -> impl Strategy<Value = Item> {
    any::<u64>()
        .prop_map(Item::Uint)
        .prop_recursive(4, 64, 6, |inner| {
            (proptest::collection::vec(inner, 1..6), any::<bool>())
                .prop_map(|(v, indef)| Item::Array(v, indef))
        })
}

/// Offsets of every item in the document, in encoded order.
fn all_offsets(d: &Decoder<'_>, offset: u64, out: &mut Vec<u64>) {
    out.push(offset);
    let v = d.read_value(offset, TagRegistry::empty()).unwrap();
    if let Some(seq) = v.sequence().ok().flatten() {
        for i in 0..seq.len() {
            all_offsets(d, seq.offset_of(i).unwrap(), out);
        }
    } else if let Some(dict) = v.dictionary().ok().flatten() {
        for i in 0..dict.len() {
            all_offsets(d, dict.key_offset(i).unwrap(), out);
            all_offsets(d, dict.value_offset(i).unwrap(), out);
        }
    } else if let Ok(inner) = v.tagged_item() {
        all_offsets(d, inner.offset(), out);
    }
}

proptest! {
    #[test]
    fn unsigned_integers_roundtrip(v in any::<u64>()) {
        let bytes = to_bytes(&Item::Uint(v));
        let d = Decoder::new(&bytes);
        let decoded = d.read_int(0).unwrap().unwrap();
        prop_assert_eq!(decoded.as_u64(), Some(v));
        prop_assert_eq!(decoded.is_big(), bytes.len() == 9);
        prop_assert_eq!(d.skip(0).unwrap(), bytes.len() as u64);
    }

    #[test]
    fn negative_integers_roundtrip(v in any::<u64>()) {
        let bytes = to_bytes(&Item::Neg(v));
        let d = Decoder::new(&bytes);
        let decoded = d.read_int(0).unwrap().unwrap();
        prop_assert_eq!(decoded.as_i128(), -1 - i128::from(v));
        prop_assert_eq!(d.read_uint(0).unwrap().unwrap().as_u64(), Some(v));
    }

    #[test]
    fn text_roundtrips_chunked_or_not(s in "[a-z]{0,24}", chunked in any::<bool>()) {
        let bytes = to_bytes(&Item::Text(s.clone(), chunked));
        let d = Decoder::new(&bytes);
        prop_assert_eq!(d.read_string(0).unwrap(), Some(s));
    }

    #[test]
    fn skip_is_offset_plus_length_everywhere(item in arb_item()) {
        let bytes = to_bytes(&item);
        let d = Decoder::new(&bytes);
        prop_assert_eq!(d.skip(0).unwrap(), bytes.len() as u64);

        let mut offsets = Vec::new();
        all_offsets(&d, 0, &mut offsets);
        for off in offsets {
            let major = d.major_type(off).unwrap();
            let len = d.length(major, off).unwrap();
            prop_assert_eq!(d.skip(off).unwrap(), off + len);
            prop_assert_eq!(d.skip_with(major, off).unwrap(), off + len);
        }
    }

    #[test]
    fn element_count_matches_index_table(item in arb_item()) {
        let bytes = to_bytes(&item);
        let d = Decoder::new(&bytes);
        let v = d.read_value(0, TagRegistry::empty()).unwrap();
        if let Some(seq) = v.sequence().ok().flatten() {
            prop_assert_eq!(d.element_count(0).unwrap(), seq.len());
        }
        if let Some(dict) = v.dictionary().ok().flatten() {
            prop_assert_eq!(d.element_count(0).unwrap(), dict.len());
        }
    }

    #[test]
    fn chains_are_associative(
        item in arb_arrays(),
        path in proptest::collection::vec(0u64..6, 0..5),
        split in 0usize..5,
    ) {
        let bytes = to_bytes(&item);
        let d = Decoder::new(&bytes);
        let split = split.min(path.len());

        let steps: Vec<GraphQuery> = path.iter().map(|&i| GraphQuery::sequence(i)).collect();
        let flat = GraphQuery::chain(steps.clone());
        let nested = GraphQuery::chain([
            GraphQuery::chain(steps[..split].to_vec()),
            GraphQuery::chain(steps[split..].to_vec()),
        ]);

        let a = flat.evaluate(d, TagRegistry::empty(), None);
        let b = nested.evaluate(d, TagRegistry::empty(), None);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let d = Decoder::new(&bytes);
        let _ = d.skip(0);
        let _ = d.element_count(0);
        let _ = d.read_string(0);
        if let Ok(v) = d.read_value(0, TagRegistry::empty()) {
            let _ = v.tag();
        }
        let q = GraphQuery::chain([GraphQuery::sequence(1), GraphQuery::dictionary("a")]);
        let _ = q.evaluate(d, TagRegistry::empty(), None);
    }
}
