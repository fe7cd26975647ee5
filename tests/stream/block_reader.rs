// Integration tests for BlockReader: round trips through BlockWriter and the
// handling of malformed streams.

use std::io::{self, Cursor, Read, Write};

use qatcodec::{BlockReader, BlockWriter, StreamOptions};

use crate::mock;

const BLOCK: usize = 4096;

fn opts() -> StreamOptions {
    StreamOptions::default().with_block_size(BLOCK)
}

fn encode(lib: &qatcodec::QzLibrary, data: &[u8]) -> Vec<u8> {
    let mut w = BlockWriter::with_options(lib, Vec::new(), opts()).unwrap();
    w.write_all(data).unwrap();
    w.finish().unwrap()
}

#[test]
fn round_trip_across_block_boundaries() {
    let lib = mock::library();
    for len in [0usize, 1, BLOCK - 1, BLOCK, BLOCK + 1, 5 * BLOCK + 17] {
        let data = mock::sample(len);
        let stream = encode(&lib, &data);
        let mut r = BlockReader::with_options(&lib, Cursor::new(stream), opts()).unwrap();
        let mut out = Vec::new();
        r.read_to_end(&mut out).unwrap();
        assert_eq!(out, data, "len {}", len);
    }
}

#[test]
fn small_reads_see_every_byte() {
    let lib = mock::library();
    let data = mock::sample(3 * BLOCK + 5);
    let stream = encode(&lib, &data);
    let mut r = BlockReader::with_options(&lib, Cursor::new(stream), opts()).unwrap();
    let mut out = Vec::new();
    let mut buf = [0u8; 13];
    loop {
        let n = r.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
    }
    assert_eq!(out, data);
    assert_eq!(r.read(&mut []).unwrap(), 0);
}

#[test]
fn truncated_header_is_unexpected_eof() {
    let lib = mock::library();
    let mut stream = encode(&lib, b"AAAAAAAAAA");
    stream.extend_from_slice(&[5, 0]);
    let mut r = BlockReader::with_options(&lib, Cursor::new(stream), opts()).unwrap();
    let mut out = Vec::new();
    assert_eq!(r.read_to_end(&mut out).unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn truncated_payload_is_unexpected_eof() {
    let lib = mock::library();
    let mut stream = encode(&lib, &mock::sample(100));
    stream.truncate(stream.len() - 10);
    let mut r = BlockReader::with_options(&lib, Cursor::new(stream), opts()).unwrap();
    let mut out = Vec::new();
    assert_eq!(r.read_to_end(&mut out).unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn zero_and_oversize_lengths_are_invalid_data() {
    let lib = mock::library();
    for header in [0u32, (BLOCK + mock::HEADER_LEN + 1) as u32] {
        let mut stream = header.to_le_bytes().to_vec();
        stream.extend_from_slice(&[0u8; 64]);
        let mut r = BlockReader::with_options(&lib, Cursor::new(stream), opts()).unwrap();
        let mut out = Vec::new();
        assert_eq!(r.read_to_end(&mut out).unwrap_err().kind(), io::ErrorKind::InvalidData);
    }
}

#[test]
fn corrupt_payload_is_invalid_data() {
    let lib = mock::library();
    let mut stream = encode(&lib, b"AAAAAAAAAA");
    stream[4] = b'X';
    let mut r = BlockReader::with_options(&lib, Cursor::new(stream), opts()).unwrap();
    let mut out = Vec::new();
    let err = r.read_to_end(&mut out).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert!(err.to_string().contains("Could not decompress data"));
}

#[test]
fn into_inner_returns_the_source() {
    let lib = mock::library();
    let stream = encode(&lib, b"abc");
    let len = stream.len() as u64;
    let mut r = BlockReader::with_options(&lib, Cursor::new(stream), opts()).unwrap();
    let mut out = String::new();
    r.read_to_string(&mut out).unwrap();
    assert_eq!(out, "abc");
    assert_eq!(r.into_inner().position(), len);
}
