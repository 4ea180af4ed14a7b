use log::trace;

use crate::model::ParseError;

/// A parsed `go.mod` file.
///
/// Only the directives needed to compare two snapshots are retained; `exclude`,
/// `retract`, `toolchain` and `godebug` are validated and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub module: Option<String>,
    pub go_version: Option<String>,
    pub requirements: Vec<Requirement>,
    pub replacements: Vec<Replacement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub path: String,
    pub version: String,
    pub indirect: bool,
}

impl Requirement {
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Requirement {
            path: path.into(),
            version: version.into(),
            indirect: false,
        }
    }
}

/// `replace old [old-version] => new [new-version]`
///
/// `new_version` is absent when the replacement points at a local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub old_path: String,
    pub old_version: Option<String>,
    pub new_path: String,
    pub new_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Open,
    Close,
}

struct Line {
    number: usize,
    tokens: Vec<Token>,
    comment: Option<String>,
}

impl Manifest {
    /// Parses the content of a manifest. `file_name` is only used in errors.
    pub fn parse(file_name: &str, content: &[u8]) -> Result<Manifest, ParseError> {
        let content = std::str::from_utf8(content).map_err(|_| ParseError::Encoding {
            file: file_name.to_owned(),
        })?;
        Parser {
            file: file_name,
            manifest: Manifest::default(),
        }
        .parse(content)
    }
}

struct Parser<'a> {
    file: &'a str,
    manifest: Manifest,
}

impl<'a> Parser<'a> {
    fn parse(mut self, content: &str) -> Result<Manifest, ParseError> {
        let mut block: Option<(String, usize)> = None;

        for (index, raw) in content.lines().enumerate() {
            let line = self.lex(index + 1, raw)?;
            if line.tokens.is_empty() {
                continue;
            }

            if let Some((verb, _)) = block.clone() {
                if line.tokens == [Token::Close] {
                    block = None;
                    continue;
                }
                let args = self.words(line.number, &line.tokens)?;
                self.directive(&verb, args, &line)?;
                continue;
            }

            let verb = match &line.tokens[0] {
                Token::Word(verb) => verb.clone(),
                other => return Err(self.unexpected(line.number, other)),
            };
            match &line.tokens[1..] {
                [Token::Open] => block = Some((verb, line.number)),
                [Token::Open, Token::Close] => {}
                _ => {
                    let args = self.words(line.number, &line.tokens[1..])?;
                    self.directive(&verb, args, &line)?;
                }
            }
        }

        if let Some((verb, line)) = block {
            return Err(ParseError::UnterminatedBlock {
                file: self.file.to_owned(),
                line,
                verb,
            });
        }

        trace!(
            "Parsed {}: {} requirements, {} replacements",
            self.file,
            self.manifest.requirements.len(),
            self.manifest.replacements.len()
        );
        Ok(self.manifest)
    }

    fn directive(&mut self, verb: &str, args: Vec<String>, line: &Line) -> Result<(), ParseError> {
        match verb {
            "module" => {
                let [path] = self.arity::<1>(verb, args, line)?;
                self.manifest.module = Some(path);
            }
            "go" => {
                let [version] = self.arity::<1>(verb, args, line)?;
                self.manifest.go_version = Some(version);
            }
            "require" => {
                let [path, version] = self.arity::<2>(verb, args, line)?;
                let indirect = line.comment.as_deref().is_some_and(|comment| {
                    comment == "indirect" || comment.starts_with("indirect;")
                });
                self.manifest.requirements.push(Requirement {
                    path,
                    version,
                    indirect,
                });
            }
            "replace" => {
                let replacement = self.replacement(args, line)?;
                self.manifest.replacements.push(replacement);
            }
            "exclude" => {
                self.arity::<2>(verb, args, line)?;
            }
            "retract" | "toolchain" | "godebug" => {
                if args.is_empty() {
                    return Err(self.invalid(verb, line, "expected at least one argument"));
                }
            }
            _ => {
                return Err(ParseError::UnknownDirective {
                    file: self.file.to_owned(),
                    line: line.number,
                    verb: verb.to_owned(),
                })
            }
        }
        Ok(())
    }

    fn replacement(&self, args: Vec<String>, line: &Line) -> Result<Replacement, ParseError> {
        let arrow = args
            .iter()
            .position(|arg| arg == "=>")
            .ok_or_else(|| self.invalid("replace", line, "missing `=>`"))?;
        let (old, new) = args.split_at(arrow);
        let new = &new[1..];
        match (old, new) {
            ([old_path], [new_path]) | ([old_path, _], [new_path]) => {
                Ok(Replacement {
                    old_path: old_path.clone(),
                    old_version: old.get(1).cloned(),
                    new_path: new_path.clone(),
                    new_version: None,
                })
            }
            ([old_path], [new_path, new_version]) | ([old_path, _], [new_path, new_version]) => {
                Ok(Replacement {
                    old_path: old_path.clone(),
                    old_version: old.get(1).cloned(),
                    new_path: new_path.clone(),
                    new_version: Some(new_version.clone()),
                })
            }
            _ => Err(self.invalid(
                "replace",
                line,
                "expected `old [version] => new [version]`",
            )),
        }
    }

    fn arity<const N: usize>(
        &self,
        verb: &str,
        args: Vec<String>,
        line: &Line,
    ) -> Result<[String; N], ParseError> {
        let count = args.len();
        args.try_into().map_err(|_| {
            self.invalid(
                verb,
                line,
                &format!("expected {} argument(s), found {}", N, count),
            )
        })
    }

    fn words(&self, number: usize, tokens: &[Token]) -> Result<Vec<String>, ParseError> {
        tokens
            .iter()
            .map(|token| match token {
                Token::Word(word) => Ok(word.clone()),
                other => Err(self.unexpected(number, other)),
            })
            .collect()
    }

    fn lex(&self, number: usize, raw: &str) -> Result<Line, ParseError> {
        let mut tokens = Vec::new();
        let mut comment = None;
        let mut chars = raw.char_indices().peekable();

        while let Some((start, c)) = chars.next() {
            match c {
                c if c.is_whitespace() => {}
                '(' => tokens.push(Token::Open),
                ')' => tokens.push(Token::Close),
                '/' if raw[start..].starts_with("//") => {
                    comment = Some(raw[start + 2..].trim().to_owned());
                    break;
                }
                '"' => {
                    let mut word = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '"')) => break,
                            Some((_, '\\')) => match chars.next() {
                                Some((_, escaped)) => word.push(escaped),
                                None => {
                                    return Err(ParseError::UnterminatedQuote {
                                        file: self.file.to_owned(),
                                        line: number,
                                    })
                                }
                            },
                            Some((_, c)) => word.push(c),
                            None => {
                                return Err(ParseError::UnterminatedQuote {
                                    file: self.file.to_owned(),
                                    line: number,
                                })
                            }
                        }
                    }
                    tokens.push(Token::Word(word));
                }
                '`' => {
                    let rest = &raw[start + 1..];
                    let end = rest.find('`').ok_or_else(|| ParseError::UnterminatedQuote {
                        file: self.file.to_owned(),
                        line: number,
                    })?;
                    tokens.push(Token::Word(rest[..end].to_owned()));
                    while chars.next_if(|(i, _)| *i <= start + 1 + end).is_some() {}
                }
                _ => {
                    let mut end = raw.len();
                    while let Some(&(i, next)) = chars.peek() {
                        if next.is_whitespace()
                            || matches!(next, '(' | ')' | '"' | '`')
                            || raw[i..].starts_with("//")
                        {
                            end = i;
                            break;
                        }
                        chars.next();
                    }
                    tokens.push(Token::Word(raw[start..end].to_owned()));
                }
            }
        }

        Ok(Line {
            number,
            tokens,
            comment,
        })
    }

    fn unexpected(&self, line: usize, token: &Token) -> ParseError {
        let token = match token {
            Token::Word(word) => word.clone(),
            Token::Open => "(".to_owned(),
            Token::Close => ")".to_owned(),
        };
        ParseError::UnexpectedToken {
            file: self.file.to_owned(),
            line,
            token,
        }
    }

    fn invalid(&self, verb: &str, line: &Line, reason: &str) -> ParseError {
        ParseError::InvalidDirective {
            file: self.file.to_owned(),
            line: line.number,
            verb: verb.to_owned(),
            reason: reason.to_owned(),
        }
    }
}
