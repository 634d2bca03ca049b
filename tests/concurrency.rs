use std::sync::Arc;
use std::thread;

use lazycbor::{
    ByteSource, CborError, Decoder, GraphQuery, KeyMatcher, MatchMode, QueryContext, QueryStep,
    TagRegistry,
};

/// [ {"v": 0}, {"v": 1}, ..., {"v": 15} ]
fn document() -> Vec<u8> {
    let mut bytes = vec![0x90];
    for i in 0..16u8 {
        bytes.extend_from_slice(&[0xa1, 0x61, b'v', i]);
    }
    bytes
}

#[derive(Debug)]
struct Remember;

impl QueryStep for Remember {
    fn access(&self, offset: u64, ctx: &mut QueryContext<'_>) -> Result<Option<u64>, CborError> {
        ctx.push(offset);
        Ok(Some(offset))
    }
}

#[test]
fn independent_contexts_do_not_share_state() {
    let bytes = document();
    let registry = TagRegistry::with_common();

    thread::scope(|s| {
        let handles: Vec<_> = (0..16u64)
            .map(|i| {
                let bytes = &bytes;
                let registry = &registry;
                s.spawn(move || {
                    let decoder = Decoder::new(bytes);
                    let q = GraphQuery::chain([
                        GraphQuery::sequence(i),
                        GraphQuery::custom(Remember),
                        GraphQuery::dictionary("v"),
                    ]);
                    let mut results = Vec::new();
                    for _ in 0..50 {
                        let mut ctx = QueryContext::new(decoder, registry);
                        let off = ctx.evaluate(&q, None).unwrap().unwrap();
                        assert_eq!(ctx.stack_len(), 1);
                        assert_eq!(ctx.pop::<u64>().unwrap(), 1 + 4 * i);
                        results.push(off);
                    }
                    (i, results)
                })
            })
            .collect();

        for h in handles {
            let (i, results) = h.join().unwrap();
            for off in results {
                assert_eq!(off, 4 + 4 * i);
                let v = Decoder::new(&bytes)
                    .read_int(off)
                    .unwrap()
                    .and_then(|n| n.as_u64());
                assert_eq!(v, Some(i));
            }
        }
    });
}

#[test]
fn shared_source_behind_arc() {
    let source: Arc<dyn ByteSource + Send + Sync> = Arc::new(document());
    let q = Arc::new(GraphQuery::chain([
        GraphQuery::sequence(15),
        GraphQuery::dictionary("v"),
    ]));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let source = Arc::clone(&source);
            let q = Arc::clone(&q);
            thread::spawn(move || {
                let decoder = Decoder::new(&source);
                q.evaluate(decoder, TagRegistry::empty(), None).unwrap()
            })
        })
        .collect();

    for w in workers {
        assert_eq!(w.join().unwrap(), Some(64));
    }
}

#[test]
fn one_sequence_view_serves_many_threads() {
    let bytes = document();
    let registry = TagRegistry::with_common();
    let decoder = Decoder::new(&bytes);
    let seq = decoder.read_sequence(0, &registry).unwrap().unwrap();
    let key = KeyMatcher::from("v");

    thread::scope(|s| {
        let handles: Vec<_> = (0..seq.len())
            .map(|i| {
                let (seq, key) = (&seq, &key);
                s.spawn(move || {
                    let entry = seq.get(i).unwrap().unwrap();
                    let dict = entry.dictionary().unwrap().unwrap();
                    let off = dict.find(key, MatchMode::Value).unwrap().unwrap();
                    decoder.read_int(off).unwrap().and_then(|n| n.as_u64())
                })
            })
            .collect();

        for (i, h) in (0u64..).zip(handles) {
            assert_eq!(h.join().unwrap(), Some(i));
        }
    });
}
