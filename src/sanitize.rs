//! Normalization of generated text for downstream rendering.
//!
//! Completion output routinely arrives with smart punctuation, and
//! occasionally with UTF-8 that was mis-decoded as Latin-1 somewhere
//! upstream ("â€™" where an apostrophe was meant). The PDF renderer lays out
//! a single built-in font with a printable-ASCII repertoire, so everything
//! else is normalized here, exactly once, before rendering or logging.
//!
//! Policy for code points with no ASCII equivalent: each run collapses to a
//! single space. Stripping them outright would silently delete meaningful
//! punctuation; a space keeps word boundaries intact.
//!
//! [`sanitize`] is total and idempotent: its output contains only `\n`,
//! `\t`, and printable ASCII, on which every rule is a no-op.

/// Mojibake sequences produced by decoding UTF-8 smart punctuation as
/// Latin-1, mapped to their intended ASCII forms.
const MOJIBAKE: &[(&str, &str)] = &[
    ("\u{00e2}\u{20ac}\u{2122}", "'"),  // â€™
    ("\u{00e2}\u{20ac}\u{02dc}", "'"),  // â€˜
    ("\u{00e2}\u{20ac}\u{0153}", "\""), // â€œ
    ("\u{00e2}\u{20ac}\u{009d}", "\""), // â€<9d>
    ("\u{00e2}\u{20ac}\u{201c}", "-"),  // â€“
    ("\u{00e2}\u{20ac}\u{201d}", "-"),  // â€”
    ("\u{00e2}\u{20ac}\u{00a6}", "..."), // â€¦
    ("\u{00e2}\u{20ac}", "\""),         // bare â€ (closing quote remnant)
];

/// Normalize generated text to the renderer's supported character set.
///
/// Pure and total: never fails, never panics. Applies, in order:
/// 1. mojibake repair (see [`MOJIBAKE`]);
/// 2. smart punctuation → ASCII (curly quotes, en/em dashes, ellipsis,
///    non-breaking space);
/// 3. `\r\n` / `\r` → `\n`;
/// 4. any remaining run of unsupported code points → one space.
pub fn sanitize(text: &str) -> String {
    let mut repaired = text.to_owned();
    for (broken, fixed) in MOJIBAKE {
        if repaired.contains(broken) {
            repaired = repaired.replace(broken, fixed);
        }
    }

    let mut out = String::with_capacity(repaired.len());
    let mut in_unsupported_run = false;
    let mut chars = repaired.chars().peekable();
    while let Some(ch) = chars.next() {
        let mapped: Option<&str> = match ch {
            '\u{2018}' | '\u{2019}' | '\u{201a}' | '\u{02bc}' => Some("'"),
            '\u{201c}' | '\u{201d}' | '\u{201e}' => Some("\""),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => Some("-"),
            '\u{2026}' => Some("..."),
            '\u{00a0}' => Some(" "),
            '\r' => {
                // \r\n collapses to \n; a lone \r is treated the same.
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                Some("\n")
            }
            '\n' | '\t' => None,
            c if (' '..='~').contains(&c) => None,
            _ => {
                if !in_unsupported_run {
                    out.push(' ');
                }
                in_unsupported_run = true;
                continue;
            }
        };
        in_unsupported_run = false;
        match mapped {
            Some(s) => out.push_str(s),
            None => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through_unchanged() {
        let text = "Dear Jane,\n\nI hope this finds you well.\t-- F.";
        assert_eq!(sanitize(text), text);
    }

    #[test]
    fn smart_punctuation_becomes_ascii() {
        assert_eq!(sanitize("It\u{2019}s \u{201c}great\u{201d} \u{2014} truly\u{2026}"),
            "It's \"great\" - truly...");
    }

    #[test]
    fn mojibake_is_repaired() {
        assert_eq!(sanitize("weâ€™re â€œreadyâ€\u{009d}"), "we're \"ready\"");
        assert_eq!(sanitize("2019â€“2024"), "2019-2024");
    }

    #[test]
    fn unsupported_runs_collapse_to_one_space() {
        assert_eq!(sanitize("ore\u{4e2d}\u{56fd}deposit"), "ore deposit");
        assert_eq!(sanitize("\u{1f600}\u{1f600}"), " ");
    }

    #[test]
    fn crlf_normalizes() {
        assert_eq!(sanitize("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn idempotent_on_varied_inputs() {
        let samples = [
            "",
            "plain ascii",
            "It\u{2019}s â€œfineâ€\u{009d} \u{2014} ok\u{2026}",
            "mixed \u{4e2d} runs \u{1f600}\u{1f600} here",
            "line\r\nbreaks\rhere\n",
            "\u{00a0}\u{00a0}leading",
        ];
        for s in samples {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn total_on_empty_and_control_input() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("\u{0000}\u{0007}"), " ");
    }
}
