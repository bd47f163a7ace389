//! Line-oriented shell: read a key, read a value, store it, print the table.
//!
//! The protocol is fixed: prompt `key > `, read one line, prompt
//! `value > `, read one line, parse it as an integer (non-numeric input
//! reads as 0), `set` it, then dump the whole table. End of input at either
//! prompt ends the session quietly.
//!
//! Lines are read as raw bytes. Invalid UTF-8 is replaced with U+FFFD rather
//! than rejected, so arbitrary input never ends the session.

use crate::hash_chain::HashChain;
use core::hash::BuildHasher;
use std::io::{self, BufRead, Write};

pub const KEY_PROMPT: &str = "key > ";
pub const VALUE_PROMPT: &str = "value > ";

/// Permissive integer parse: optional leading whitespace and sign, then
/// leading digits. No digits yields 0; out-of-range input saturates.
pub fn parse_int(s: &str) -> i32 {
    let s = s.trim_start();
    let (neg, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let limit = i64::from(i32::MAX) + 1;
    let mut n: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        n = (n * 10 + i64::from(b - b'0')).min(limit);
    }
    let n = if neg { -n } else { n };
    n.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Drop one trailing `\n` (and a `\r` before it).
pub fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

pub struct Repl<R, W> {
    input: R,
    output: W,
}

impl<R, W> Repl<R, W>
where
    R: BufRead,
    W: Write,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Show `prompt` and read one line. `None` at end of input.
    fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.output.write_all(prompt.as_bytes())?;
        self.output.flush()?;
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Run until end of input. Returns the number of pairs read.
    ///
    /// A failed `set` is logged and the table left as it was; only I/O
    /// errors end the loop early.
    pub fn run<S: BuildHasher>(&mut self, map: &mut HashChain<Box<i32>, S>) -> io::Result<usize> {
        let mut pairs = 0;
        loop {
            let Some(key_line) = self.prompt(KEY_PROMPT)? else {
                break;
            };
            let key = strip_line_ending(&key_line);
            if key.len() > map.max_key_len() {
                log::debug!(
                    "key of {} bytes truncated to {}",
                    key.len(),
                    map.max_key_len()
                );
            }

            let Some(value_line) = self.prompt(VALUE_PROMPT)? else {
                break;
            };
            let value = parse_int(&value_line);

            if let Err(e) = map.set(key, Box::new(value)) {
                log::warn!("dropped update for {:?}: {}", key, e);
            }
            map.dump_to(&mut self.output)?;
            pairs += 1;
        }
        self.output.flush()?;
        Ok(pairs)
    }
}

/// Drive one whole session over `map`, then destroy it.
pub fn run_session<R, W, S>(mut map: HashChain<Box<i32>, S>, input: R, output: W) -> io::Result<usize>
where
    R: BufRead,
    W: Write,
    S: BuildHasher,
{
    let mut repl = Repl::new(input, output);
    let res = repl.run(&mut map);
    map.destroy();
    res
}
