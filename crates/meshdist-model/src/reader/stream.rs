//! Buffered token stream over a byte reader.
//!
//! The loader never touches the reader directly: all input goes through
//! [`TokenStream`], which refills an in-memory block on demand and supports
//! one byte of pushback across a refill. A refill reads a nominal amount and
//! then keeps pulling single bytes until the block ends on a whitespace
//! separator, so numeric tokens stay contiguous in the block.

use std::io::Read;

/// Characters that are considered whitespace in VRML (a comma is one).
pub(crate) const VRML_WS: &[u8] = b" \t,\n\r";
/// Whitespace, or the start of a comment or quoted string.
pub(crate) const VRML_WS_COMM_STR: &[u8] = b" \t,\n\r#\"";
/// Characters terminating a word, including field delimiters.
const WORD_STOP: &[u8] = b" \t,\n\r#\"[{";
/// Characters skipped before a numeric token.
const NUM_SKIP: &[u8] = b" \t\n\r#\",";

/// Maximum allowed word length.
pub(crate) const MAX_WORD_LEN: usize = 60;
/// Total block size.
const BUF_SZ: usize = 16 * 1024;
/// Nominal number of bytes read per refill; the rest of the block absorbs
/// the bytes pulled while looking for a trailing separator.
const REFILL_BYTES: usize = 15_565;
/// Maximum line length for the line-oriented headers (RAW, OFF).
const MAX_LINE_LEN: usize = 256;

/// A refill-on-demand token stream with single-byte pushback.
pub struct TokenStream<R> {
    inner: R,
    block: Vec<u8>,
    pos: usize,
    nbytes: usize,
    eof_reached: bool,
}

impl<R: Read> TokenStream<R> {
    /// Wraps a reader. Nothing is read until the first token is requested.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            block: vec![0; BUF_SZ],
            // Slot 0 is reserved for the pushback byte kept across refills.
            pos: 1,
            nbytes: 0,
            eof_reached: false,
        }
    }

    /// Refills the block from the reader. Keeps the last consumed byte at
    /// index 0 so one `unget` stays valid across the refill, then extends
    /// the block until it ends on a whitespace separator. Returns false
    /// only when no further byte is available.
    fn refill(&mut self) -> bool {
        if self.eof_reached {
            return false;
        }
        if self.nbytes > 0 {
            self.block[0] = self.block[self.pos - 1];
        }
        self.pos = 1;
        let mut filled = 1;
        while filled < 1 + REFILL_BYTES {
            match self.inner.read(&mut self.block[filled..1 + REFILL_BYTES]) {
                Ok(0) => {
                    self.eof_reached = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(_) => {
                    self.eof_reached = true;
                    break;
                }
            }
        }
        // Top up until the block ends on a separator, so a numeric token
        // never straddles the refill boundary.
        if !self.eof_reached {
            let mut byte = [0u8; 1];
            while filled < BUF_SZ && !VRML_WS.contains(&self.block[filled - 1]) {
                match self.inner.read(&mut byte) {
                    Ok(1) => {
                        self.block[filled] = byte[0];
                        filled += 1;
                    }
                    _ => {
                        self.eof_reached = true;
                        break;
                    }
                }
            }
        }
        self.nbytes = filled;
        filled > 1
    }

    /// Reads the next byte, or `None` at end of input.
    pub fn getc(&mut self) -> Option<u8> {
        if self.pos >= self.nbytes && !self.refill() {
            return None;
        }
        let c = self.block[self.pos];
        self.pos += 1;
        Some(c)
    }

    /// Pushes the last read byte back. At most one byte may be pushed back
    /// between reads.
    pub fn unget(&mut self) {
        debug_assert!(self.pos > 0);
        if self.pos > 0 {
            self.pos -= 1;
        }
    }

    /// Rewinds to the start of the input. Only valid while the first block
    /// is still loaded; used by format autodetection, which inspects at
    /// most a few dozen bytes.
    pub fn rewind_to_start(&mut self) {
        self.pos = 1;
    }

    /// Skips whitespace and `#` comments, returning the next meaningful
    /// byte without consuming it.
    pub fn skip_ws_comm(&mut self) -> Option<u8> {
        loop {
            let c = self.getc()?;
            match c {
                b'#' => self.skip_comment()?,
                b' ' | b'\t' | b',' | b'\n' | b'\r' => {}
                _ => {
                    self.unget();
                    return Some(c);
                }
            }
        }
    }

    /// Like [`Self::skip_ws_comm`], but also skips over quoted strings
    /// (`"..."` with `\"` escapes; string content is never interpreted).
    pub fn skip_ws_comm_str(&mut self) -> Option<u8> {
        let mut c = self.skip_ws_comm()?;
        while c == b'"' {
            self.getc();
            self.skip_quoted()?;
            c = self.skip_ws_comm()?;
        }
        Some(c)
    }

    /// Consumes a quoted string body up to and including the closing quote.
    /// The opening quote must already be consumed.
    fn skip_quoted(&mut self) -> Option<()> {
        let mut in_escape = false;
        loop {
            let c = self.getc()?;
            if in_escape {
                in_escape = false;
            } else if c == b'\\' {
                in_escape = true;
            } else if c == b'"' {
                return Some(());
            }
        }
    }

    /// Consumes the rest of a comment line. The `#` must already be
    /// consumed. Returns `None` at end of input.
    fn skip_comment(&mut self) -> Option<()> {
        loop {
            match self.getc()? {
                b'\n' | b'\r' => return Some(()),
                _ => {}
            }
        }
    }

    /// Advances until one of `chars` is the next byte to be read, skipping
    /// quoted strings and comment bodies. Returns the matched byte
    /// unconsumed.
    pub fn find_chars(&mut self, chars: &[u8]) -> Option<u8> {
        loop {
            let c = self.getc()?;
            if chars.contains(&c) {
                self.unget();
                return Some(c);
            }
            match c {
                b'"' => {
                    self.skip_quoted()?;
                }
                b'#' => loop {
                    let nc = self.getc()?;
                    if nc == b'\n' || nc == b'\r' {
                        // A comment terminator may itself be a match.
                        if chars.contains(&nc) {
                            self.unget();
                            return Some(nc);
                        }
                        break;
                    }
                },
                _ => {}
            }
        }
    }

    /// Advances until `word` appears as a whole word outside comments and
    /// strings, leaving the stream just after it. Returns false if the
    /// input ends first.
    pub fn find_string(&mut self, word: &str) -> bool {
        let word = word.as_bytes();
        loop {
            let Some(mut c) = self.getc() else {
                return false;
            };
            if VRML_WS_COMM_STR.contains(&c) {
                self.unget();
                if self.skip_ws_comm_str().is_none() {
                    return false;
                }
                match self.getc() {
                    Some(nc) => c = nc,
                    None => return false,
                }
            }
            let mut i = 0;
            let mut at_eof = false;
            while i < word.len() && word[i] == c {
                i += 1;
                match self.getc() {
                    Some(nc) => c = nc,
                    None => {
                        at_eof = true;
                        break;
                    }
                }
            }
            if i == word.len() {
                if at_eof {
                    return true;
                }
                if VRML_WS_COMM_STR.contains(&c) {
                    self.unget();
                    return true;
                }
            } else if at_eof {
                return false;
            }
        }
    }

    /// Reads a word (a run of bytes up to a separator or field delimiter),
    /// capped at [`MAX_WORD_LEN`]. Leading whitespace is not skipped.
    pub fn read_word(&mut self) -> Option<String> {
        let mut s = String::new();
        loop {
            match self.getc() {
                None => break,
                Some(c) if WORD_STOP.contains(&c) => {
                    self.unget();
                    break;
                }
                Some(c) => {
                    if s.len() >= MAX_WORD_LEN {
                        return None;
                    }
                    s.push(char::from(c));
                }
            }
        }
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }

    fn skip_num_separators(&mut self) {
        loop {
            match self.getc() {
                None => return,
                Some(c) if NUM_SKIP.contains(&c) => {}
                Some(_) => {
                    self.unget();
                    return;
                }
            }
        }
    }

    /// Consumes and returns the next byte if it satisfies `pred`.
    fn next_if(&mut self, pred: impl Fn(u8) -> bool) -> Option<u8> {
        match self.getc() {
            Some(c) if pred(c) => Some(c),
            Some(_) => {
                self.unget();
                None
            }
            None => None,
        }
    }

    /// Reads a base-10 integer, skipping separators first. Returns `None`
    /// if the next token is not an integer.
    pub fn read_int(&mut self) -> Option<i64> {
        self.skip_num_separators();
        let mut s = String::with_capacity(24);
        if let Some(c) = self.next_if(|c| c == b'+' || c == b'-') {
            s.push(char::from(c));
        }
        let mut any = false;
        while let Some(c) = self.next_if(|c| c.is_ascii_digit()) {
            if s.len() < 24 {
                s.push(char::from(c));
            }
            any = true;
        }
        if !any {
            return None;
        }
        s.parse().ok()
    }

    /// Reads a floating-point token, skipping separators first. The token
    /// is parsed in double precision and narrowed, like the vertex data it
    /// feeds.
    pub fn read_float(&mut self) -> Option<f32> {
        self.skip_num_separators();
        let mut s = String::with_capacity(24);
        if let Some(c) = self.next_if(|c| c == b'+' || c == b'-') {
            s.push(char::from(c));
        }
        let mut any = false;
        while let Some(c) = self.next_if(|c| c.is_ascii_digit()) {
            s.push(char::from(c));
            any = true;
        }
        if self.next_if(|c| c == b'.').is_some() {
            s.push('.');
            while let Some(c) = self.next_if(|c| c.is_ascii_digit()) {
                s.push(char::from(c));
                any = true;
            }
        }
        if !any {
            return None;
        }
        if self.next_if(|c| c == b'e' || c == b'E').is_some() {
            s.push('e');
            if let Some(c) = self.next_if(|c| c == b'+' || c == b'-') {
                s.push(char::from(c));
            }
            let mut exp_any = false;
            while let Some(c) = self.next_if(|c| c.is_ascii_digit()) {
                s.push(char::from(c));
                exp_any = true;
            }
            if !exp_any {
                return None;
            }
        }
        s.parse::<f64>().ok().map(|v| v as f32)
    }

    /// Reads the remainder of the current line (without its terminator),
    /// leaving the terminator unconsumed. Returns `None` if the input ends
    /// first or the line exceeds the header line cap.
    pub fn read_line(&mut self) -> Option<String> {
        let mut s = String::new();
        loop {
            match self.getc() {
                None => return None,
                Some(b'\n' | b'\r') => {
                    self.unget();
                    return Some(s);
                }
                Some(c) => {
                    if s.len() >= MAX_LINE_LEN {
                        return None;
                    }
                    s.push(char::from(c));
                }
            }
        }
    }

    /// Consumes up to and including the next line terminator. Returns
    /// `None` if the input ends first.
    pub fn skip_to_eol(&mut self) -> Option<()> {
        loop {
            match self.getc()? {
                b'\n' | b'\r' => return Some(()),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(s: &str) -> TokenStream<&[u8]> {
        TokenStream::new(s.as_bytes())
    }

    #[test]
    fn test_ints_and_floats() {
        let mut ts = stream("  12 -3,4.5\t1e-2 .25 6.");
        assert_eq!(ts.read_int(), Some(12));
        assert_eq!(ts.read_int(), Some(-3));
        assert_eq!(ts.read_float(), Some(4.5));
        assert_eq!(ts.read_float(), Some(0.01));
        assert_eq!(ts.read_float(), Some(0.25));
        assert_eq!(ts.read_float(), Some(6.0));
        assert_eq!(ts.read_float(), None);
    }

    #[test]
    fn test_non_numeric_fails() {
        let mut ts = stream("abc");
        assert_eq!(ts.read_int(), None);
    }

    #[test]
    fn test_skip_ws_comm_and_words() {
        let mut ts = stream("# header comment\n  hello{world");
        assert_eq!(ts.skip_ws_comm(), Some(b'h'));
        assert_eq!(ts.read_word().as_deref(), Some("hello"));
        // '{' terminates the word and stays in the stream
        assert_eq!(ts.getc(), Some(b'{'));
        assert_eq!(ts.read_word().as_deref(), Some("world"));
    }

    #[test]
    fn test_quoted_strings_are_skipped() {
        let mut ts = stream("  \"a \\\" quoted # string\" token");
        assert_eq!(ts.skip_ws_comm_str(), Some(b't'));
        assert_eq!(ts.read_word().as_deref(), Some("token"));
    }

    #[test]
    fn test_find_string_whole_words_only() {
        let mut ts = stream("IndexedFaceSetX IndexedFaceSet {");
        assert!(ts.find_string("IndexedFaceSet"));
        assert_eq!(ts.skip_ws_comm(), Some(b'{'));
    }

    #[test]
    fn test_find_chars_skips_comments_and_strings() {
        let mut ts = stream("\"}\" # }\n stop }");
        assert_eq!(ts.find_chars(b"}"), Some(b'}'));
        assert_eq!(ts.getc(), Some(b'}'));
    }

    #[test]
    fn test_pushback_across_refill() {
        // Force several refills with a long run of numbers and check that
        // nothing is lost or duplicated at block boundaries.
        let mut text = String::new();
        for i in 0..20_000 {
            text.push_str(&format!("{i} "));
        }
        let mut ts = stream(&text);
        for i in 0..20_000i64 {
            assert_eq!(ts.read_int(), Some(i));
        }
        assert_eq!(ts.read_int(), None);
    }

    #[test]
    fn test_read_line_keeps_terminator() {
        let mut ts = stream("3 1 0\nrest");
        assert_eq!(ts.read_line().as_deref(), Some("3 1 0"));
        assert_eq!(ts.getc(), Some(b'\n'));
        assert_eq!(ts.read_word().as_deref(), Some("rest"));
    }
}
