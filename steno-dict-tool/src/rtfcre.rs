//! RTF/CRE import, as used by the Phoenix dictionary.

use regex::Regex;
use steno_engine::stroke::StenoWord;

use crate::Result;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Bytes, Read};
use std::path::Path;

struct Tokens {
    file: Bytes<BufReader<File>>,
    peeked: Option<char>,
}

impl Tokens {
    // RTFCRE isn't UTF-8; treat each byte as a char, as if this were "latin 1".
    fn next_char(&mut self) -> Option<Result<char>> {
        match self.file.next() {
            Some(Ok(ch)) => Some(Ok(ch as char)),
            Some(Err(e)) => Some(Err(e.into())),
            None => None,
        }
    }
}

#[derive(Debug)]
enum Token {
    Open,
    Close,
    Command(String),
    Text(String),
}

impl Token {
    fn is_open(&self) -> bool {
        matches!(self, Token::Open)
    }

    fn is_close(&self) -> bool {
        matches!(self, Token::Close)
    }

    fn is_command(&self) -> bool {
        matches!(self, Token::Command(_))
    }

    fn is_text(&self) -> bool {
        matches!(self, Token::Text(_))
    }

    fn text(&self) -> &str {
        match self {
            Token::Text(t) => t,
            Token::Command(t) => t,
            _ => panic!("invalid token for text"),
        }
    }

    fn into_text(self) -> String {
        match self {
            Token::Text(t) => t,
            Token::Command(t) => t,
            _ => panic!("invalid token for text"),
        }
    }
}

impl Iterator for Tokens {
    type Item = Result<Token>;
    fn next(&mut self) -> Option<Self::Item> {
        let mut command = false;
        let ch = self.peeked.take();
        let ch = match ch {
            Some(ch) => ch,
            None => match self.next_char()? {
                Ok(ch) => ch,
                Err(e) => return Some(Err(e)),
            },
        };
        match ch {
            '{' => return Some(Ok(Token::Open)),
            '}' => return Some(Ok(Token::Close)),
            '\\' => command = true,
            _ => (),
        }

        let mut buf = String::new();
        if !command {
            buf.push(ch);
        }

        loop {
            let ch = match self.next_char() {
                Some(Ok(ch)) => ch,
                Some(Err(e)) => return Some(Err(e)),
                None => return None,
            };
            if ch == '{' || ch == '}' || ch == '\\' || (command && ch == ' ') {
                if !command || ch != ' ' {
                    self.peeked = Some(ch);
                }
                break;
            }
            buf.push(ch);
        }
        if command {
            Some(Ok(Token::Command(buf)))
        } else {
            Some(Ok(Token::Text(buf)))
        }
    }
}

pub fn import<P: AsRef<Path>>(name: P) -> Result<BTreeMap<StenoWord, String>> {
    let p = Tokens {
        file: BufReader::new(File::open(name)?).bytes(),
        peeked: None,
    };
    let mut state = 0;
    let mut dict = BTreeMap::new();
    let mut last = String::new();
    let mut defn = Vec::new();
    let mut skipped = 0;
    let encoder = Encoder::new();

    // Open \* \cxs Text Close Text ... until next open.
    //  1   2    3   4    5
    // In state 5, we might see an `open` that isn't followed by `\*`, which should continue
    // to build this definition.
    for tok in p {
        let tok = tok?;

        match state {
            0 => {
                if tok.is_open() {
                    state = 1;
                } else {
                    defn.push(tok);
                }
            }
            1 => {
                if tok.is_command() && tok.text() == "*" {
                    state = 2;
                } else if tok.is_open() {
                    defn.push(tok);
                    state = 1;
                } else {
                    defn.push(tok);
                    state = 0;
                }
            }
            2 => {
                if tok.is_command() && tok.text() == "cxs" {
                    if skipped >= 2 {
                        let last_word = StenoWord::parse(&last)?;
                        dict.insert(last_word, encoder.encode(&defn));
                    }
                    skipped += 1;
                    defn.clear();
                    state = 3;
                } else if tok.is_open() {
                    state = 1;
                } else {
                    state = 0;
                }
            }
            3 => {
                if tok.is_text() {
                    last = tok.into_text();
                    state = 4;
                } else {
                    panic!("impossible state near: {:?}", last);
                }
            }
            4 => {
                if tok.is_close() {
                    state = 0;
                } else {
                    panic!("impossible state near: {:?}", last);
                }
            }
            _ => unreachable!(),
        }
    }

    let last_word = StenoWord::parse(&last)?;
    dict.insert(last_word, encoder.encode(&defn));

    Ok(dict)
}

struct Encoder {
    punct: Regex,
}

impl Encoder {
    fn new() -> Encoder {
        Encoder {
            punct: Regex::new(r"^([\.\?;:,]) ?$").unwrap(),
        }
    }

    /// Convert RTFCRE tokens into dictionary entry text, written in the `{...}` brace surface
    /// syntax `directive::parse` understands rather than raw control characters.
    fn encode(&self, tokens: &[Token]) -> String {
        let mut result = String::new();

        for token in tokens {
            match token {
                Token::Open | Token::Close => (),
                Token::Command(cmd) if cmd == "cxds" => result.push_str("{^}"),
                Token::Command(cmd) if cmd == "cxfc" => {
                    // Cap next; no leading delete-space, since a space is only inserted once
                    // there's text to put it before.
                    result.push_str("{-|}");
                }
                Token::Command(cmd) => {
                    result.push('{');
                    result.push_str(cmd);
                    result.push('}');
                }
                Token::Text(text) => {
                    let text = text.trim_end_matches("\r\n");
                    if let Some(cap) = self.punct.captures(text) {
                        result.push_str("{^}");
                        result.push_str(&cap[1]);
                        if cap[1].starts_with(['.', '?']) {
                            result.push_str("{-|}");
                        }
                    } else {
                        result.push_str(text);
                    }
                }
            }
        }
        result
    }
}
