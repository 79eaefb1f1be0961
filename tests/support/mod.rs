//! A reference decoder for the encoded stream.
#![allow(dead_code)]
use adlzw::{Code, Encoder, LzwStatus, Strategy, FIRST_CODE, MAX_CODES, MAX_CODESIZE, MIN_CODESIZE};

/// Reads code words, each least significant byte first, from a MSB-first bit stream.
struct BitReader<'d> {
    data: &'d [u8],
    pos: usize,
}

impl BitReader<'_> {
    fn read(&mut self, size: u8) -> Option<Code> {
        if self.data.len() * 8 - self.pos < usize::from(size) {
            return None;
        }

        let mut code: Code = 0;
        let mut shift = 0;
        let mut remaining = size;
        while remaining > 0 {
            let chunk = remaining.min(8);
            let mut part: Code = 0;
            for _ in 0..chunk {
                let bit = (self.data[self.pos / 8] >> (7 - self.pos % 8)) & 1;
                part = part << 1 | Code::from(bit);
                self.pos += 1;
            }
            code |= part << shift;
            shift += 8;
            remaining -= chunk;
        }

        Some(code)
    }
}

fn expand(mut code: Code, table: &[(Code, u8)], out: &mut Vec<u8>) {
    let start = out.len();
    while code >= FIRST_CODE {
        let (prefix, suffix) = table[(code - FIRST_CODE) as usize];
        out.push(suffix);
        code = prefix;
    }
    out.push(code as u8);
    out[start..].reverse();
}

/// Decode a complete stream.
pub fn decode(data: &[u8]) -> Vec<u8> {
    let mut reader = BitReader { data, pos: 0 };
    let mut size = MIN_CODESIZE;
    let mut table: Vec<(Code, u8)> = Vec::new();
    let mut prev: Option<Code> = None;
    let mut out = Vec::new();

    while let Some(code) = reader.read(size) {
        if code == (1 << size) - 1 && size < MAX_CODESIZE {
            size += 1;
            continue;
        }

        let next = FIRST_CODE + table.len() as Code;
        let start = out.len();
        if code < next {
            expand(code, &table, &mut out);
        } else {
            assert_eq!(code, next, "code {} was never assigned", code);
            let prev = prev.expect("stream starts with an unknown code");
            expand(prev, &table, &mut out);
            let first = out[start];
            out.push(first);
        }

        if let Some(prev) = prev {
            if next < MAX_CODES {
                table.push((prev, out[start]));
            }
        }
        prev = Some(code);
    }

    out
}

/// Encode a complete buffer through the stream interface.
pub fn encode(strategy: Strategy, data: &[u8]) -> (Vec<u8>, LzwStatus) {
    let mut encoder = Encoder::with_strategy(strategy);
    let mut out = Vec::new();
    let result = encoder.into_stream(&mut out).encode_all(data);
    assert_eq!(result.bytes_read, data.len());
    assert_eq!(result.bytes_written, out.len());
    (out, result.status.unwrap())
}

/// Deterministic noise.
pub fn noise(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 32) as u8
        })
        .collect()
}
