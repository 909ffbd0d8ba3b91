//! MSB-first multi-bit integer assembly on top of `BitReader` (spec §4.1).

use crate::error::DecompressionError;
use crate::rle::bit_reader::BitReader;

/// Reads `n_bits` from a `BitReader`, assembling the result MSB-first: the
/// first bit pulled off the stream becomes the most significant bit of the
/// returned value.
pub fn read_bits(reader: &mut BitReader<'_>, n_bits: u32) -> Result<u32, DecompressionError> {
    let mut value = 0u32;
    for _ in 0..n_bits {
        value = (value << 1) | reader.next_bit()?;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader_from_chunks(chunks: &[u32]) -> Vec<u8> {
        // Builds a packed stream with `chunks` as the code words (highest
        // index = first chunk loaded), a matching CRC, and a dummy
        // unpacked-size trailer word, same shape as bit_reader's tests.
        let mut crc = 0u32;
        for &c in chunks {
            crc ^= c;
        }
        let mut out = Vec::new();
        for &c in chunks.iter().rev() {
            out.extend_from_slice(&c.to_be_bytes());
        }
        out.extend_from_slice(&crc.to_be_bytes());
        out.extend_from_slice(&0u32.to_be_bytes());
        out
    }

    #[test]
    fn assembles_msb_first() {
        // first_chunk = 0x1A = 0b1_1010: sentinel is bit 4, payload bits 3..0
        // are popped LSB-first (0,1,0,1) and assembled with the first-popped
        // bit as the result's MSB, giving 0b0101.
        let data = reader_from_chunks(&[0x1A]);
        let mut reader = BitReader::new(&data).unwrap();
        let value = read_bits(&mut reader, 4).unwrap();
        assert_eq!(value, 0b0101);
    }

    #[test]
    fn reads_across_a_chunk_reload() {
        // first chunk holds only its sentinel (no payload bits below it),
        // forcing an immediate reload; the 8 requested bits are popped
        // LSB-first from the second chunk's low byte (0xF0 = 0b1111_0000 ->
        // bits 0,0,0,0,1,1,1,1 in pop order) and assembled MSB-first, which
        // bit-reverses the byte to 0x0F.
        let second: u32 = 0x0000_00F0;
        let first: u32 = 0x0000_0001;
        let data = reader_from_chunks(&[second, first]);
        let mut reader = BitReader::new(&data).unwrap();
        let value = read_bits(&mut reader, 8).unwrap();
        assert_eq!(value, 0x0F);
    }
}
