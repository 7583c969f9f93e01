//! T64 tape container parsing.
//!
//! Enough of the format to pull a program out: the 64-byte header
//! (signature, directory sizes, container name) and the 32-byte
//! directory entries carrying each file's load range and data offset.

/// One program extracted from a container.
pub struct T64Entry {
    /// Memory address the payload loads at.
    pub load_addr: u16,
    /// Program bytes.
    pub data: Vec<u8>,
}

impl T64Entry {
    /// The entry re-encoded as a PRG image.
    #[must_use]
    pub fn to_prg(&self) -> Vec<u8> {
        let mut prg = Vec::with_capacity(self.data.len() + 2);
        prg.extend_from_slice(&self.load_addr.to_le_bytes());
        prg.extend_from_slice(&self.data);
        prg
    }
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

/// Extract the first used directory entry from a T64 container.
pub fn first_entry(data: &[u8]) -> Result<T64Entry, String> {
    if data.len() < 0x40 {
        return Err("T64 file too short for a header".to_string());
    }
    if !data.starts_with(b"C64") {
        return Err("not a T64 container (bad signature)".to_string());
    }

    let max_entries = read_u16(data, 0x22) as usize;
    let used_entries = read_u16(data, 0x24) as usize;
    // Plenty of real containers report zero used entries; scan anyway.
    let entries = used_entries.max(1).min(max_entries.max(1));

    for index in 0..entries {
        let base = 0x40 + index * 0x20;
        if base + 0x20 > data.len() {
            break;
        }
        let entry = &data[base..base + 0x20];
        if entry[0] == 0 {
            continue; // free slot
        }

        let start = read_u16(entry, 0x02);
        let end = read_u16(entry, 0x04);
        let offset = u32::from_le_bytes([entry[0x08], entry[0x09], entry[0x0A], entry[0x0B]])
            as usize;

        if end < start {
            return Err(format!(
                "T64 entry has inverted load range ${start:04X}-${end:04X}"
            ));
        }
        let length = usize::from(end - start);
        if offset + length > data.len() {
            return Err("T64 entry data runs past the end of the file".to_string());
        }

        return Ok(T64Entry {
            load_addr: start,
            data: data[offset..offset + length].to_vec(),
        });
    }

    Err("T64 container has no usable entries".to_string())
}
