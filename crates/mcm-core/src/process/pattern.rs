//! Signature patterns and module scanning.
//!
//! A pattern is a fixed-length run of literal bytes and wildcards, written the
//! way disassemblers print them: `"48 8B 0D ? ? ? ? 48 8D 05"`.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::config::scan::CHUNK_SIZE;
use crate::error::{Error, Result};
use crate::process::ReadMemory;

/// A byte signature with wildcard positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    bytes: Vec<Option<u8>>,
}

impl Pattern {
    /// Parse a whitespace-separated hex pattern; `?` and `??` are wildcards.
    ///
    /// # Example
    ///
    /// ```
    /// use mcm_core::process::Pattern;
    ///
    /// let pattern = Pattern::parse("48 8D 0D ?? ?? ?? ??").unwrap();
    /// assert_eq!(pattern.len(), 7);
    /// assert_eq!(pattern.to_string(), "48 8D 0D ?? ?? ?? ??");
    /// ```
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut bytes = Vec::new();
        for token in pattern.split_whitespace() {
            if token == "??" || token == "?" {
                bytes.push(None);
                continue;
            }

            let value = u8::from_str_radix(token, 16).map_err(|e| {
                Error::InvalidPattern(format!("Invalid signature token '{}': {}", token, e))
            })?;
            bytes.push(Some(value));
        }

        if bytes.is_empty() {
            return Err(Error::InvalidPattern(
                "Signature pattern is empty".to_string(),
            ));
        }

        Ok(Self { bytes })
    }

    pub fn from_bytes(bytes: Vec<Option<u8>>) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[Option<u8>] {
        &self.bytes
    }

    /// Check the pattern against `window`, which must be at least as long.
    pub fn matches(&self, window: &[u8]) -> bool {
        window.len() >= self.bytes.len()
            && self
                .bytes
                .iter()
                .zip(window)
                .all(|(expected, actual)| expected.is_none_or(|b| b == *actual))
    }

    /// Offset of the first match in `buffer`.
    ///
    /// Candidate positions are found with `memchr` on the first literal byte,
    /// so long runs of non-matching code are skipped quickly.
    pub fn find_in(&self, buffer: &[u8]) -> Option<usize> {
        self.find_iter(buffer).next()
    }

    /// Offsets of every match in `buffer`, in ascending order.
    pub fn find_all_in(&self, buffer: &[u8]) -> Vec<usize> {
        self.find_iter(buffer).collect()
    }

    fn find_iter<'a>(&'a self, buffer: &'a [u8]) -> Box<dyn Iterator<Item = usize> + 'a> {
        if self.bytes.is_empty() || buffer.len() < self.bytes.len() {
            return Box::new(std::iter::empty());
        }
        let last = buffer.len() - self.bytes.len();

        match self.anchor() {
            Some((anchor, byte)) => Box::new(
                memchr::memchr_iter(byte, &buffer[anchor..])
                    .take_while(move |&start| start <= last)
                    .filter(move |&start| self.matches(&buffer[start..])),
            ),
            // All wildcards: every position matches
            None => Box::new(0..=last),
        }
    }

    /// First literal byte and its index within the pattern.
    fn anchor(&self) -> Option<(usize, u8)> {
        self.bytes
            .iter()
            .enumerate()
            .find_map(|(i, b)| b.map(|value| (i, value)))
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .bytes
            .iter()
            .map(|b| match b {
                Some(value) => format!("{:02X}", value),
                None => "??".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ");
        f.write_str(&text)
    }
}

/// Scan the whole module image and return the absolute address of the first match.
///
/// The image is read in chunks; the last `len - 1` bytes of each chunk are
/// carried over so matches spanning a chunk boundary are found.
pub fn scan_first<R: ReadMemory>(reader: &R, pattern: &Pattern) -> Result<Option<u64>> {
    let mut found = None;
    scan_chunks(reader, pattern, |data, data_base| {
        if let Some(pos) = pattern.find_in(data) {
            found = Some(data_base + pos as u64);
            return false;
        }
        true
    })?;
    Ok(found)
}

/// Scan the whole module image and return every match address.
///
/// Resolution never uses this; it exists for diagnosing patterns that are
/// expected to be unique.
pub fn scan_all<R: ReadMemory>(reader: &R, pattern: &Pattern) -> Result<Vec<u64>> {
    let mut results = Vec::new();
    scan_chunks(reader, pattern, |data, data_base| {
        results.extend(
            pattern
                .find_all_in(data)
                .into_iter()
                .map(|pos| data_base + pos as u64),
        );
        true
    })?;

    results.sort_unstable();
    results.dedup();
    Ok(results)
}

fn scan_chunks<R, F>(reader: &R, pattern: &Pattern, mut visit: F) -> Result<()>
where
    R: ReadMemory,
    F: FnMut(&[u8], u64) -> bool,
{
    let base = reader.base_address();
    let limit = reader.image_size();
    let mut scanned: usize = 0;
    let mut tail: Vec<u8> = Vec::new();

    while scanned < limit {
        let read_size = (limit - scanned).min(CHUNK_SIZE);
        let addr = base + scanned as u64;

        let chunk = match reader.read_bytes(addr, read_size) {
            Ok(bytes) => bytes,
            Err(e) => {
                if scanned == 0 {
                    return Err(e);
                }
                debug!(
                    "Scan stopped at offset {:#x} (scanned {:#x} bytes): {}",
                    scanned, scanned, e
                );
                break;
            }
        };

        let mut data = Vec::with_capacity(tail.len() + chunk.len());
        data.extend_from_slice(&tail);
        data.extend_from_slice(&chunk);
        let data_base = addr - tail.len() as u64;

        if !visit(&data, data_base) {
            return Ok(());
        }

        let keep = pattern.len().saturating_sub(1);
        tail = data[data.len().saturating_sub(keep)..].to_vec();
        scanned += read_size;
    }

    Ok(())
}
