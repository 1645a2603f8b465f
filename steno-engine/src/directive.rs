//! Brace-delimited translation directives.
//!
//! Dictionary entries written by a human (or a JSON/RTF/CRE source dictionary)
//! use a surface syntax of `{...}` tokens rather than the raw control
//! characters `replacements` works with internally:
//!
//! - `{^}` - suppress the space on the adjacent side.
//! - `{^text}` / `{text^}` - suppress the space before/after `text` (glue).
//! - `{-|}` - capitalize the next word.
//! - `{<}` - uppercase the next word.
//! - `{>}` - force the next word to not be capitalized.
//! - `{&x}` - glue `x` directly onto adjacent glued output, no space.
//! - `{#key}` - emit a raw key-code sequence instead of typed text.
//! - `{:name:args}` - invoke a named macro.
//!
//! A directive this parser doesn't recognize is logged and stripped rather
//! than rejected outright, per the engine's degrade-gracefully policy for
//! malformed dictionary text.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::replacements::Replacement;

/// Parse dictionary entry text containing `{...}` directives into a sequence of replacements.
///
/// Plain runs of text become `Replacement::Text`; recognized directives become their
/// corresponding `Replacement` variant. An unrecognized or unterminated directive is logged at
/// `warn!` and dropped; the surrounding text is still translated.
pub fn parse(text: &str) -> Vec<Replacement> {
    let mut result: Vec<Replacement> = Vec::new();
    let mut chars = text.char_indices();

    let mut plain = String::new();

    while let Some((_, c)) = chars.next() {
        if c != '{' {
            plain.push(c);
            continue;
        }

        let mut body = String::new();
        let mut closed = false;
        for (_, c2) in chars.by_ref() {
            if c2 == '}' {
                closed = true;
                break;
            }
            body.push(c2);
        }

        if !closed {
            crate::log::warn!("unterminated directive: {{{}", body);
            plain.push('{');
            plain.push_str(&body);
            continue;
        }

        if !plain.is_empty() {
            result.push(Replacement::Text(core::mem::take(&mut plain)));
        }

        match parse_directive(&body) {
            Some(repls) => result.extend(repls),
            None => {
                crate::log::warn!("malformed directive: {{{}}}", body);
            }
        }
    }

    if !plain.is_empty() {
        result.push(Replacement::Text(plain));
    }

    result
}

fn parse_directive(body: &str) -> Option<Vec<Replacement>> {
    if body == "^" {
        return Some(alloc::vec![Replacement::DeleteSpace]);
    }

    if let Some(rest) = body.strip_prefix('^') {
        // {^text} - no space before text.
        return Some(alloc::vec![
            Replacement::DeleteSpace,
            Replacement::Text(rest.to_string()),
        ]);
    }

    if let Some(rest) = body.strip_suffix('^') {
        // {text^} - no space after text.
        return Some(alloc::vec![
            Replacement::Text(rest.to_string()),
            Replacement::DeleteSpace,
        ]);
    }

    match body {
        "-|" => return Some(alloc::vec![Replacement::CapNext]),
        "<" => return Some(alloc::vec![Replacement::UpNext]),
        ">" => return Some(alloc::vec![Replacement::NoCapNext]),
        _ => {}
    }

    if let Some(rest) = body.strip_prefix('&') {
        // Glue: concatenate directly onto adjacent glued output, no space either side.
        return Some(alloc::vec![
            Replacement::Stitch,
            Replacement::Text(rest.to_string()),
        ]);
    }

    if let Some(rest) = body.strip_prefix('#') {
        return Some(alloc::vec![Replacement::Raw(rest.to_string())]);
    }

    if let Some(rest) = body.strip_prefix(':') {
        let (name, args) = match rest.split_once(':') {
            Some((name, args)) => (name, args),
            None => (rest, ""),
        };
        return Some(alloc::vec![Replacement::Macro(
            name.to_string(),
            args.to_string()
        )]);
    }

    None
}

#[cfg(test)]
mod test {
    use super::parse;
    use crate::replacements::Replacement;

    #[test]
    fn plain_text() {
        let r = parse("hello");
        assert_eq!(r, alloc::vec![Replacement::Text("hello".into())]);
    }

    #[test]
    fn glue_prefix() {
        let r = parse("{^}the");
        assert_eq!(
            r,
            alloc::vec![Replacement::DeleteSpace, Replacement::Text("the".into())]
        );
    }

    #[test]
    fn cap_next() {
        let r = parse("{-|}");
        assert_eq!(r, alloc::vec![Replacement::CapNext]);
    }

    #[test]
    fn macro_directive() {
        let r = parse("{:retro_case:upper}");
        assert_eq!(
            r,
            alloc::vec![Replacement::Macro("retro_case".into(), "upper".into())]
        );
    }

    #[test]
    fn unterminated_is_literal() {
        let r = parse("foo{bar");
        assert_eq!(r, alloc::vec![Replacement::Text("foo{bar".into())]);
    }
}
