//! Streaming tests for the LZ transform.

use oxistream_core::{ByteStream, CompressionLevel, Direction, MemoryStream, TransformStream};
use oxistream_lz::{LzCodec, LzConfig, decode, encode};

fn lcg_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            (state >> 32) as u8
        })
        .collect()
}

/// Text built from a small vocabulary, so it has long repeats.
fn lcg_words(len: usize, seed: u64) -> Vec<u8> {
    let words: [&[u8]; 8] = [
        b"stream ", b"window ", b"match ", b"literal ", b"buffer ", b"chain ", b"hash ", b"\n",
    ];
    let mut state = seed;
    let mut out = Vec::with_capacity(len + 8);
    while out.len() < len {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.extend_from_slice(words[((state >> 33) as usize) % words.len()]);
    }
    out.truncate(len);
    out
}

fn encode_chunked(data: &[u8], config: LzConfig, chunk: usize) -> Vec<u8> {
    let mut enc = LzCodec::new(MemoryStream::writer(), Direction::Encode, config).unwrap();
    for piece in data.chunks(chunk) {
        enc.write(piece).unwrap();
    }
    enc.close().unwrap();
    enc.into_inner().into_inner()
}

#[test]
fn test_roundtrip_every_level() {
    let words = lcg_words(40_000, 1);
    let noise = lcg_bytes(5_000, 2);
    for level in 0..=9 {
        let config = LzConfig::from_level(CompressionLevel::new(level));
        for data in [&words, &noise] {
            let packed = encode(data, config).unwrap();
            assert_eq!(&decode(&packed).unwrap(), data, "level {level}");
        }
    }
}

#[test]
fn test_matching_levels_compress() {
    let words = lcg_words(60_000, 3);
    let fast = encode(&words, LzConfig::FAST).unwrap();
    let best = encode(&words, LzConfig::BEST).unwrap();
    let store = encode(&words, LzConfig::STORE).unwrap();
    assert!(fast.len() < store.len());
    assert!(best.len() < words.len() / 2, "{} bytes", best.len());
}

#[test]
fn test_write_partitioning_does_not_change_output() {
    let data = lcg_words(20_000, 4);
    for config in [LzConfig::FAST, LzConfig::DEFAULT] {
        let reference = encode_chunked(&data, config, data.len());
        for chunk in [1, 2, 259, 260, 1000] {
            assert_eq!(encode_chunked(&data, config, chunk), reference, "chunk {chunk}");
        }
    }
}

#[test]
fn test_input_longer_than_window() {
    // Small window: matches must stay inside it while history is compacted.
    let config = LzConfig::new(8, 64, true).unwrap();
    let mut data = lcg_words(30_000, 5);
    data.extend(lcg_bytes(2_000, 6));
    data.extend(lcg_words(30_000, 5));
    let packed = encode_chunked(&data, config, 777);
    assert_eq!(decode(&packed).unwrap(), data);
}

#[test]
fn test_match_longer_than_window_without_lazy() {
    let config = LzConfig::new(8, 4, false).unwrap();
    let data = vec![b'a'; 2000];
    let packed = encode_chunked(&data, config, data.len());
    assert!(packed.len() < 100, "{} bytes", packed.len());
    assert_eq!(decode(&packed).unwrap(), data);

    let mut mixed = lcg_words(5_000, 11);
    mixed.extend(vec![b'z'; 3_000]);
    mixed.extend(lcg_words(5_000, 12));
    for chunk in [1, 300, mixed.len()] {
        let packed = encode_chunked(&mixed, config, chunk);
        assert_eq!(decode(&packed).unwrap(), mixed, "chunk {chunk}");
    }
}

#[test]
fn test_single_byte_reads() {
    let data = lcg_words(4_000, 7);
    let packed = encode(&data, LzConfig::DEFAULT).unwrap();
    let mut dec =
        LzCodec::new(MemoryStream::reader(packed), Direction::Decode, LzConfig::DEFAULT).unwrap();
    let mut out = Vec::new();
    let mut byte = [0u8; 1];
    while dec.read(&mut byte, 1).unwrap() == 1 {
        out.push(byte[0]);
    }
    assert!(dec.is_eof());
    assert_eq!(out, data);
}

#[test]
fn test_finish_leaves_target_open() {
    let mut enc = LzCodec::new(MemoryStream::writer(), Direction::Encode, LzConfig::DEFAULT).unwrap();
    enc.write(b"abcabcabc").unwrap();
    enc.finish().unwrap();
    enc.target_mut().write(b"tail").unwrap();
    let bytes = enc.into_inner().into_inner();
    assert!(bytes.ends_with(b"tail"));
}
