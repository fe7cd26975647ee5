#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as a block stream: framing must either succeed with
    // payloads that tile the input exactly, or fail, never panic.
    let max_payload = 64 * 1024 + 64;
    if let Ok(blocks) = qatcodec::stream::split_blocks(data, max_payload) {
        let framed: usize = blocks
            .iter()
            .map(|b| qatcodec::stream::BLOCK_HEADER_LEN + b.len())
            .sum();
        assert_eq!(framed, data.len());
        assert!(blocks.iter().all(|b| !b.is_empty() && b.len() <= max_payload));
    }
});
