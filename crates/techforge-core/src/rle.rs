//! Run-length coding for the grid string sections.
//!
//! A run is written as the character followed by its length, and the length is
//! left out for runs of one: `AAABBCDDDD` <-> `A3B2CD4`. Digits can therefore
//! never be data characters; every alphabet fed through here is digit free.

/// Compresses `s` into `char[count]` runs.
pub fn compress(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        let mut run = 1usize;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }
        out.push(c);
        if run >= 2 {
            out.push_str(&run.to_string());
        }
    }

    out
}

/// Inverse of [`compress`].
///
/// A count too large for a `usize` yields an empty string. Use
/// [`decompress_bounded`] for anything that came from outside the process.
pub fn decompress(s: &str) -> String {
    decompress_bounded(s, usize::MAX).unwrap_or_default()
}

/// [`decompress`] that gives up instead of producing more than `limit` chars
/// or reading a count that overflows.
pub fn decompress_bounded(s: &str, limit: usize) -> Option<String> {
    let mut out = String::new();
    let mut produced = 0usize;

    for (c, run) in Runs::new(s) {
        let run = run?;
        produced = produced.checked_add(run)?;
        if produced > limit {
            return None;
        }
        out.extend(std::iter::repeat(c).take(run));
    }

    Some(out)
}

/// Yields `(char, count)`; the count is `None` when its literal overflows.
struct Runs<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Runs<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            chars: s.chars().peekable(),
        }
    }
}

impl Iterator for Runs<'_> {
    type Item = (char, Option<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.chars.next()?;

        let mut count: Option<usize> = None;
        let mut overflow = false;
        while let Some(d) = self.chars.peek().and_then(|d| d.to_digit(10)) {
            self.chars.next();
            if overflow {
                continue;
            }
            match count
                .unwrap_or(0)
                .checked_mul(10)
                .and_then(|n| n.checked_add(d as usize))
            {
                Some(n) => count = Some(n),
                None => overflow = true,
            }
        }

        if overflow {
            Some((c, None))
        } else {
            Some((c, Some(count.unwrap_or(1))))
        }
    }
}
