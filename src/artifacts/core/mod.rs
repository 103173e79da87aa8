//! Shared utilities
//!
//! Currently just the pager adapter used by the CLI when stdout is a
//! terminal.

use derive_new::new;
use minus::Pager;
use std::io::{self, Write};

/// Adapter implementing `Write` on top of the minus pager, so rendered
/// diff output can be pushed through the same code path as a plain
/// stdout handle.
#[derive(new)]
pub struct PagerWriter {
    pager: Pager,
}

impl Write for PagerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text =
            std::str::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.pager.push_str(text).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
