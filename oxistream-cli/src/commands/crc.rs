//! CRC command implementation.

use crate::utils::open_input;
use oxistream::Crc32;
use serde::Serialize;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct CrcEntry {
    path: String,
    size: u64,
    crc32: String,
}

/// CRC-32 and length of everything readable from `path`.
pub fn checksum_file(path: &Path) -> std::io::Result<(u32, u64)> {
    let mut reader = open_input(path)?;
    let mut crc = Crc32::new();
    let mut size = 0u64;
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        crc.update(&buf[..n]);
        size += n as u64;
    }
    Ok((crc.finalize(), size))
}

pub fn cmd_crc(files: &[PathBuf], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut entries = Vec::with_capacity(files.len());
    for path in files {
        let (crc, size) = checksum_file(path)?;
        entries.push(CrcEntry {
            path: path.display().to_string(),
            size,
            crc32: format!("{crc:08x}"),
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            println!("{}  {:>12}  {}", entry.crc32, entry.size, entry.path);
        }
    }
    Ok(())
}
