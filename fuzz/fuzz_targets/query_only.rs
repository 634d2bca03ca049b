#![no_main]

use libfuzzer_sys::fuzz_target;

use lazycbor::{DecodeLimits, Decoder, GraphQuery, KeyMatcher, MatchMode, TagRegistry, TypeSpec};

fuzz_target!(|data: &[u8]| {
    // First byte picks the query shape; the rest is the document.
    let Some((&selector, doc)) = data.split_first() else {
        return;
    };
    let limits = DecodeLimits::for_extraction(doc.len() as u64).with_max_depth(64);
    let d = Decoder::with_limits(&doc, limits);

    let index = u64::from(selector & 0x07);
    let mode = match selector >> 6 {
        0 => MatchMode::Value,
        1 => MatchMode::Key,
        _ => MatchMode::SkipFirstKey,
    };
    let steps = [
        GraphQuery::sequence(index),
        GraphQuery::dictionary_with(KeyMatcher::Int(i128::from(index)), mode),
        GraphQuery::dictionary_with("a", mode),
        GraphQuery::null_or_type(TypeSpec::Number),
    ];
    let q = GraphQuery::chain(steps.iter().skip(usize::from((selector >> 3) & 0x03)).cloned());

    if let Ok(Some(off)) = q.evaluate(d, TagRegistry::empty(), None) {
        assert!((off as usize) < doc.len());
    }
});
