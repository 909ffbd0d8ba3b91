//! RLE decode loop: reads opcodes from the bit stream and drives the
//! reader/writer pair to reconstruct the original bytes (spec §4.1).

use crate::error::DecompressionError;
use crate::rle::bit_reader::{BitReader, read_trailer};
use crate::rle::int_reader::read_bits;
use crate::rle::writer::Writer;

/// Decompresses `source` into `destination`. `destination.len()` must equal
/// the trailer's announced unpacked size.
pub fn decode(source: &[u8], destination: &mut [u8]) -> Result<(), DecompressionError> {
    let trailer = read_trailer(source)?;
    if trailer.unpacked_size as usize != destination.len() {
        return Err(DecompressionError::UncompressedSizeMismatch {
            expected: trailer.unpacked_size,
            actual: destination.len() as u32,
        });
    }

    let mut reader = BitReader::new(source)?;
    let mut writer = Writer::new(destination);

    while writer.cursor() > 0 {
        if reader.next_bit()? == 0 {
            if reader.next_bit()? == 0 {
                let n = read_bits(&mut reader, 8)?;
                for _ in 0..=n {
                    let byte = read_bits(&mut reader, 8)? as u8;
                    writer.write_byte(byte)?;
                }
            } else {
                let offset = read_bits(&mut reader, 8)?;
                writer.copy_back(2, offset)?;
            }
        } else {
            match read_bits(&mut reader, 2)? {
                0 => {
                    let offset = read_bits(&mut reader, 9)?;
                    writer.copy_back(3, offset)?;
                }
                1 => {
                    let offset = read_bits(&mut reader, 10)?;
                    writer.copy_back(4, offset)?;
                }
                2 => {
                    let n = read_bits(&mut reader, 8)?;
                    let offset = read_bits(&mut reader, 12)?;
                    writer.copy_back(n + 1, offset)?;
                }
                // Spec's prefix table leaves the fourth `1 11` code point
                // unlisted; completed here in the same parametric shape as
                // the `1 10` case (wider count, narrower offset) so every
                // 2-bit value after a leading `1` dispatches to something,
                // per DESIGN.md.
                _ => {
                    let n = read_bits(&mut reader, 8)? + 9;
                    let offset = read_bits(&mut reader, 8)?;
                    writer.copy_back(n, offset)?;
                }
            }
        }
    }

    if reader.finished_with_valid_checksum() {
        Ok(())
    } else {
        Err(DecompressionError::ChecksumFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a minimal packed stream (no chunk reload) whose bits, read
    /// back by `BitReader`/`read_bits` in consumption order, are exactly
    /// `bits`. Only valid while `bits.len() <= 31`.
    fn build_single_chunk_stream(bits: &[u32], unpacked_size: u32) -> Vec<u8> {
        let k = bits.len();
        assert!(k <= 31, "test helper only supports a single first chunk");
        let mut chunk: u32 = 0;
        for (pos, &bit) in bits.iter().enumerate() {
            chunk |= (bit & 1) << pos;
        }
        chunk |= 1 << k; // sentinel
        let initial_crc = chunk; // crc == 0 once XORed with first_chunk itself
        let mut out = Vec::new();
        out.extend_from_slice(&chunk.to_be_bytes());
        out.extend_from_slice(&initial_crc.to_be_bytes());
        out.extend_from_slice(&unpacked_size.to_be_bytes());
        out
    }

    fn push_msb_bits(out: &mut Vec<u32>, value: u32, n_bits: u32) {
        for i in (0..n_bits).rev() {
            out.push((value >> i) & 1);
        }
    }

    #[test]
    fn decodes_a_single_literal_run() {
        let mut bits = Vec::new();
        bits.push(0);
        bits.push(0); // prefix "00": literal run
        push_msb_bits(&mut bits, 0, 8); // n = 0 -> 1 byte
        push_msb_bits(&mut bits, 0x42, 8);

        let packed = build_single_chunk_stream(&bits, 1);
        let mut dest = [0u8; 1];
        decode(&packed, &mut dest).unwrap();
        assert_eq!(dest, [0x42]);
    }

    #[test]
    fn decodes_a_multi_byte_literal_run() {
        let mut bits = Vec::new();
        bits.push(0);
        bits.push(0);
        push_msb_bits(&mut bits, 2, 8); // n = 2 -> 3 bytes
        push_msb_bits(&mut bits, 0x10, 8);
        push_msb_bits(&mut bits, 0x20, 8);
        push_msb_bits(&mut bits, 0x30, 8);

        let packed = build_single_chunk_stream(&bits, 3);
        let mut dest = [0u8; 3];
        decode(&packed, &mut dest).unwrap();
        assert_eq!(dest, [0x10, 0x20, 0x30]);
    }

    #[test]
    fn copy_two_with_zero_offset_replicates_the_last_byte() {
        let mut bits = Vec::new();
        bits.push(0);
        bits.push(0); // literal run
        push_msb_bits(&mut bits, 0, 8); // n = 0 -> 1 byte
        push_msb_bits(&mut bits, 0x42, 8);
        bits.push(0);
        bits.push(1); // prefix "01": copy 2 bytes
        push_msb_bits(&mut bits, 0, 8); // offset 0

        let packed = build_single_chunk_stream(&bits, 3);
        let mut dest = [0u8; 3];
        decode(&packed, &mut dest).unwrap();
        assert_eq!(dest, [0x42, 0x42, 0x42]);
    }

    #[test]
    fn uncompressed_size_mismatch_is_rejected_before_decoding() {
        let bits = vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let packed = build_single_chunk_stream(&bits, 99);
        let mut dest = [0u8; 1];
        assert_eq!(
            decode(&packed, &mut dest),
            Err(DecompressionError::UncompressedSizeMismatch {
                expected: 99,
                actual: 1
            })
        );
    }

    use proptest::prelude::*;

    proptest! {
        /// Any 1- or 2-byte literal run round-trips through `decode`
        /// exactly (spec §8 "decode is the exact inverse of the packer
        /// that produced any stream it accepts"). Bounded to what fits in
        /// a single 32-bit chunk, since `build_single_chunk_stream` only
        /// models the trailer's `first_chunk` field, not a full chain of
        /// reloaded chunks.
        #[test]
        fn literal_run_round_trips(payload in prop::collection::vec(any::<u8>(), 1..=2)) {
            let mut bits = Vec::new();
            bits.push(0);
            bits.push(0); // prefix "00": literal run
            push_msb_bits(&mut bits, (payload.len() - 1) as u32, 8);
            for &byte in &payload {
                push_msb_bits(&mut bits, byte as u32, 8);
            }

            let packed = build_single_chunk_stream(&bits, payload.len() as u32);
            let mut dest = vec![0u8; payload.len()];
            decode(&packed, &mut dest).unwrap();
            prop_assert_eq!(dest, payload);
        }
    }

    #[test]
    fn corrupted_checksum_is_detected() {
        let mut bits = Vec::new();
        bits.push(0);
        bits.push(0);
        push_msb_bits(&mut bits, 0, 8);
        push_msb_bits(&mut bits, 0x42, 8);
        let mut packed = build_single_chunk_stream(&bits, 1);
        // Flip a bit of the initial CRC field so first_chunk ^ initial_crc != 0.
        let len = packed.len();
        packed[len - 8] ^= 0x01;
        let mut dest = [0u8; 1];
        assert_eq!(decode(&packed, &mut dest), Err(DecompressionError::ChecksumFailed));
    }
}
