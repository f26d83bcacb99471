//! Turns the scanner's byte stream into text frames, one per MRZ scan.
//!
//! A frame ends at `ETX`, at a blank line, or when the caller flushes after an
//! idle gap. `STX` throws away anything pending and starts over. Other control
//! bytes never reach a frame, and `\r\n` / `\r` become `\n`.

const STX: u8 = 0x02;
const ETX: u8 = 0x03;
const DEL: u8 = 0x7f;

pub struct MrzFramer {
    pending: Vec<u8>,
    /// Bytes seen on the current line, including discarded ones.
    line_len: usize,
    after_cr: bool,
    /// Set once `pending` overflowed; cleared at the next frame boundary.
    discarding: bool,
    max_frame_bytes: usize,
}

impl MrzFramer {
    pub fn new(max_frame_bytes: usize) -> Self {
        Self {
            pending: Vec::new(),
            line_len: 0,
            after_cr: false,
            discarding: false,
            max_frame_bytes,
        }
    }

    /// Feed bytes; returns every frame they complete, in order.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut frames = Vec::new();
        for &b in bytes {
            let after_cr = std::mem::replace(&mut self.after_cr, false);
            match b {
                STX => {
                    if !self.pending.is_empty() {
                        tracing::debug!(bytes = self.pending.len(), "STX discarded partial frame");
                    }
                    self.reset();
                }
                ETX => frames.extend(self.take_frame()),
                b'\r' => {
                    self.end_line(&mut frames);
                    self.after_cr = true;
                }
                b'\n' if after_cr => {}
                b'\n' => self.end_line(&mut frames),
                b if b < 0x20 || b == DEL => {}
                b => self.push_byte(b),
            }
        }
        frames
    }

    /// Complete whatever is pending. Called after an idle gap or at EOF.
    pub fn flush(&mut self) -> Option<String> {
        self.after_cr = false;
        self.take_frame()
    }

    fn push_byte(&mut self, b: u8) {
        self.line_len += 1;
        if self.discarding {
            return;
        }
        if self.pending.len() >= self.max_frame_bytes {
            tracing::warn!(
                max_frame_bytes = self.max_frame_bytes,
                "scanner frame too long, discarding until next boundary"
            );
            self.pending.clear();
            self.discarding = true;
            return;
        }
        self.pending.push(b);
    }

    fn end_line(&mut self, frames: &mut Vec<String>) {
        if self.line_len == 0 {
            // Blank line: frame boundary.
            frames.extend(self.take_frame());
            return;
        }
        self.line_len = 0;
        if !self.discarding {
            self.pending.push(b'\n');
        }
    }

    fn take_frame(&mut self) -> Option<String> {
        let text = String::from_utf8_lossy(&self.pending).trim().to_string();
        self.reset();
        (!text.is_empty()).then_some(text)
    }

    fn reset(&mut self) {
        self.pending.clear();
        self.line_len = 0;
        self.discarding = false;
    }
}

impl Default for MrzFramer {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCAN: &str = "LINE<ONE\nLINE<TWO";

    #[test]
    fn stx_etx_wrapped_scan() {
        let mut f = MrzFramer::default();
        let frames = f.push(b"\x02LINE<ONE\r\nLINE<TWO\r\n\x03");
        assert_eq!(frames, vec![SCAN]);
        assert_eq!(f.flush(), None);
    }

    #[test]
    fn blank_line_separates_scans() {
        let mut f = MrzFramer::default();
        let frames = f.push(b"LINE<ONE\nLINE<TWO\n\nAAA\nBBB\n\n");
        assert_eq!(frames, vec![SCAN.to_string(), "AAA\nBBB".to_string()]);
    }

    #[test]
    fn crlf_blank_line_is_a_boundary() {
        let mut f = MrzFramer::default();
        let frames = f.push(b"LINE<ONE\r\nLINE<TWO\r\n\r\n");
        assert_eq!(frames, vec![SCAN]);
    }

    #[test]
    fn bare_cr_terminates_lines() {
        let mut f = MrzFramer::default();
        assert!(f.push(b"LINE<ONE\rLINE<TWO\r").is_empty());
        assert_eq!(f.flush().as_deref(), Some(SCAN));
    }

    #[test]
    fn flush_completes_idle_scan() {
        let mut f = MrzFramer::default();
        assert!(f.push(b"LINE<ONE\nLINE<").is_empty());
        assert!(f.push(b"TWO\n").is_empty());
        assert_eq!(f.flush().as_deref(), Some(SCAN));
        assert_eq!(f.flush(), None);
    }

    #[test]
    fn frame_split_across_pushes() {
        let mut f = MrzFramer::default();
        assert!(f.push(b"\x02LINE<O").is_empty());
        assert!(f.push(b"NE\r").is_empty());
        assert!(f.push(b"\nLINE<TWO").is_empty());
        assert_eq!(f.push(b"\x03"), vec![SCAN]);
    }

    #[test]
    fn control_bytes_are_stripped() {
        let mut f = MrzFramer::default();
        let frames = f.push(b"\x02LI\x00NE<\x1bONE\nLINE<TWO\x7f\x03");
        assert_eq!(frames, vec![SCAN]);
    }

    #[test]
    fn stx_discards_partial_frame() {
        let mut f = MrzFramer::default();
        let frames = f.push(b"GARBAGE\x02LINE<ONE\nLINE<TWO\x03");
        assert_eq!(frames, vec![SCAN]);
    }

    #[test]
    fn empty_frames_are_not_emitted() {
        let mut f = MrzFramer::default();
        assert!(f.push(b"\x02\x03\n\n\r\n  \x03").is_empty());
        assert_eq!(f.flush(), None);
    }

    #[test]
    fn overflow_discards_until_boundary() {
        let mut f = MrzFramer::new(8);
        let frames = f.push(b"0123456789ABCDEF\nMORE\n\nOK\n\n");
        assert_eq!(frames, vec!["OK"]);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_dropped() {
        let mut f = MrzFramer::default();
        let frames = f.push(b"AB\xffCD\x03");
        assert_eq!(frames, vec!["AB\u{fffd}CD"]);
    }
}
