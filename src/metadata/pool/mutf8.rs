use crate::Result;

/// Decode the JVM's modified UTF-8 encoding into a Rust string.
///
/// Modified UTF-8 differs from standard UTF-8 in two ways: U+0000 is written as the two-byte
/// sequence `C0 80` (so encoded strings never contain a raw NUL), and supplementary code
/// points are written as CESU-8 style surrogate pairs of three-byte sequences instead of a
/// single four-byte sequence. Decoding therefore goes through UTF-16 code units, which pairs
/// the surrogates back up for free.
///
/// ## Arguments
/// * 'bytes' - The encoded bytes of a `Utf8` constant-pool entry
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for truncated sequences, invalid continuation bytes, or
/// unpaired surrogates.
pub fn decode(bytes: &[u8]) -> Result<String> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b0 = bytes[i];

        if b0 & 0x80 == 0 {
            if b0 == 0 {
                return Err(malformed_error!("Raw NUL byte in modified UTF-8 at {}", i));
            }
            units.push(u16::from(b0));
            i += 1;
        } else if b0 & 0xE0 == 0xC0 {
            let b1 = *bytes
                .get(i + 1)
                .ok_or_else(|| malformed_error!("Truncated two-byte sequence at {}", i))?;
            if b1 & 0xC0 != 0x80 {
                return Err(malformed_error!("Invalid continuation byte at {}", i + 1));
            }
            units.push((u16::from(b0 & 0x1F) << 6) | u16::from(b1 & 0x3F));
            i += 2;
        } else if b0 & 0xF0 == 0xE0 {
            if i + 2 >= bytes.len() {
                return Err(malformed_error!("Truncated three-byte sequence at {}", i));
            }
            let (b1, b2) = (bytes[i + 1], bytes[i + 2]);
            if b1 & 0xC0 != 0x80 || b2 & 0xC0 != 0x80 {
                return Err(malformed_error!("Invalid continuation byte at {}", i + 1));
            }
            units.push(
                (u16::from(b0 & 0x0F) << 12) | (u16::from(b1 & 0x3F) << 6) | u16::from(b2 & 0x3F),
            );
            i += 3;
        } else {
            // Four-byte UTF-8 sequences do not occur in modified UTF-8
            return Err(malformed_error!(
                "Invalid modified UTF-8 lead byte 0x{:02X} at {}",
                b0,
                i
            ));
        }
    }

    String::from_utf16(&units).map_err(|_| malformed_error!("Unpaired surrogate in Utf8 constant"))
}
