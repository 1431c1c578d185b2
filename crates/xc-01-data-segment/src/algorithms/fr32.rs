//! # Fr32 Padding
//!
//! Every 127 payload bytes are spread over 128 bytes: four 32-byte nodes
//! each carrying 254 bits, with the top two bits of each node left zero.
//! Bits are consumed least significant first.

/// Payload bytes per padded chunk.
pub const UNPADDED_CHUNK: usize = 127;

/// Padded bytes per chunk.
pub const PADDED_CHUNK: usize = 128;

const BITS_PER_NODE: usize = 254;

fn bit(data: &[u8], pos: usize) -> u8 {
    (data[pos / 8] >> (pos % 8)) & 1
}

fn set_bit(data: &mut [u8], pos: usize) {
    data[pos / 8] |= 1 << (pos % 8);
}

/// Expand payload bytes. `unpadded.len()` must be a multiple of 127.
pub fn pad(unpadded: &[u8]) -> Vec<u8> {
    debug_assert_eq!(unpadded.len() % UNPADDED_CHUNK, 0);
    let chunks = unpadded.len() / UNPADDED_CHUNK;
    let mut out = vec![0u8; chunks * PADDED_CHUNK];

    for (src, dst) in unpadded
        .chunks_exact(UNPADDED_CHUNK)
        .zip(out.chunks_exact_mut(PADDED_CHUNK))
    {
        for node in 0..4 {
            for b in 0..BITS_PER_NODE {
                if bit(src, node * BITS_PER_NODE + b) == 1 {
                    set_bit(dst, node * 256 + b);
                }
            }
        }
    }
    out
}

/// Strip padding bits. `padded.len()` must be a multiple of 128.
pub fn unpad(padded: &[u8]) -> Vec<u8> {
    debug_assert_eq!(padded.len() % PADDED_CHUNK, 0);
    let chunks = padded.len() / PADDED_CHUNK;
    let mut out = vec![0u8; chunks * UNPADDED_CHUNK];

    for (src, dst) in padded
        .chunks_exact(PADDED_CHUNK)
        .zip(out.chunks_exact_mut(UNPADDED_CHUNK))
    {
        for node in 0..4 {
            for b in 0..BITS_PER_NODE {
                if bit(src, node * 256 + b) == 1 {
                    set_bit(dst, node * BITS_PER_NODE + b);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_stays_zero() {
        assert_eq!(pad(&[0u8; 127]), vec![0u8; 128]);
        assert_eq!(unpad(&[0u8; 256]), vec![0u8; 254]);
    }

    #[test]
    fn test_pad_leaves_top_bits_clear() {
        let padded = pad(&[0xffu8; 127]);
        for node in padded.chunks(32) {
            assert_eq!(node[31] & 0b1100_0000, 0);
            assert_eq!(node[31], 0b0011_1111);
        }
    }

    #[test]
    fn test_first_node_is_prefix() {
        // The first 31 payload bytes land unchanged in the first node.
        let data: Vec<u8> = (0..127u8).collect();
        let padded = pad(&data);
        assert_eq!(&padded[..31], &data[..31]);
    }

    #[test]
    fn test_unpad_inverts_pad() {
        let data: Vec<u8> = (0..254u32).map(|i| (i * 37 % 251) as u8).collect();
        assert_eq!(unpad(&pad(&data)), data);
    }
}
