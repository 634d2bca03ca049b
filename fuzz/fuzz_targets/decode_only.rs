#![no_main]

use libfuzzer_sys::fuzz_target;

use lazycbor::{DecodeLimits, Decoder, TagRegistry};

fn fuzz_limits(input_len: usize) -> DecodeLimits {
    DecodeLimits::for_extraction(input_len as u64)
        .with_max_depth(64)
        .with_index_shard_len(1 << 10)
}

fuzz_target!(|data: &[u8]| {
    let d = Decoder::with_limits(&data, fuzz_limits(data.len()));
    let registry = TagRegistry::with_common();

    let _ = d.value_type(0);
    let _ = d.read_int(0);
    let _ = d.read_float(0);
    let _ = d.read_string(0);
    let _ = d.boolean_value(0);
    let _ = d.element_count(0);

    if let Ok(end) = d.skip(0) {
        assert!(end as usize <= data.len());
    }

    if let Ok(v) = d.read_value(0, &registry) {
        let _ = v.tag();
        let _ = v.raw();
        if let Ok(Some(seq)) = v.sequence() {
            for item in seq.iter().take(4) {
                let _ = item.map(|i| i.tag());
            }
        }
        if let Ok(Some(dict)) = v.dictionary() {
            for entry in dict.iter().take(4) {
                let _ = entry.map(|(k, _)| k.string());
            }
        }
    }
});
