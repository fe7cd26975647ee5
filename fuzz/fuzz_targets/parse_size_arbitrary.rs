#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = qatcodec::config::parse_size(s);
        let size = qatcodec::config::init_block_size_from(Some(s));
        assert!(size >= qatcodec::config::BLOCK_SIZE_MIN);
        assert!(size <= qatcodec::config::BLOCK_SIZE_MAX);
    }
});
