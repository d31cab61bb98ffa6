//! Turns a token stream into an execution tree and its blocks.
// Copyright (C) 2024  Frankie Baffa
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use {
    crate::{
        block::{
            Block,
            Blocks,
        },
        error::{
            Error,
            Result,
        },
        expr::{
            Call,
            Expr,
            Selector,
        },
        file::{
            Coordinate,
            Source,
        },
        lexer::Lexer,
        token::{
            Token,
            TokenKind,
        },
        tree::{
            Evoke,
            If,
            Node,
            Range,
            Sequence,
            Tree,
            With,
        },
    },
    log::debug,
    std::{
        mem::{
            replace,
            take,
        },
        path::PathBuf,
    },
};

const INLINE: &str = "<inline>";
const DISCARD: &str = "_";
const DEFAULT_KEY: &str = "key";
const DEFAULT_VALUE: &str = "val";

/// Settings applied while compiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub
struct CompileOptions {
    /// Drop literals consisting only of whitespace.
    pub strip_whitespace: bool,
}

/// Compile in-memory template text with the default options.
pub
fn compile(src: &str) -> Result<Tree> {
    compile_with(&Source::faux_source(INLINE, src), &CompileOptions::default())
}

/// Compile `source`.
pub
fn compile_with(source: &Source, options: &CompileOptions) -> Result<Tree> {
    debug!("Compiling {}", source);
    let mut parser = Parser::new(source, *options);
    let (base, _) = parser.sub_parse(None, Coordinate::default())?;
    debug!("Compiled {} with {} blocks", source, parser.blocks.len());
    Ok(Tree::new(base, parser.blocks, source.file().clone()))
}

/// Tokens with a single token of pushback.
struct Tokens<'s> {
    lexer: Lexer<'s>,
    current: Option<Token>,
    backed: bool,
}

impl<'s> Tokens<'s> {
    fn new(lexer: Lexer<'s>) -> Self {
        Self { lexer, current: None, backed: false, }
    }

    fn next(&mut self) -> Token {
        if self.backed {
            self.backed = false;
            if let Some(tok) = &self.current {
                return tok.clone();
            }
        }

        let tok = self.lexer.next_token();
        self.current = Some(tok.clone());
        tok
    }

    /// Hand the last token out again. Only one token may be pushed back.
    fn backup(&mut self) {
        if self.backed || self.current.is_none() {
            panic!("backup called twice or before any token was read");
        }

        self.backed = true;
    }
}

/// How a sub-parse finished.
#[derive(Debug, PartialEq)]
enum Exit {
    Eof,
    End,
    Else(Token),
}

enum State {
    Text,
    Open,
    End,
    Block(Coordinate),
    Evoke(Coordinate),
    With(Coordinate),
    Range(Coordinate),
    If(Coordinate),
    Done(Exit),
}

struct Parser<'s> {
    tokens: Tokens<'s>,
    file: PathBuf,
    options: CompileOptions,
    blocks: Blocks,
    /// The block being parsed, if any, and where it was opened.
    block: Option<(String, Coordinate)>,
    /// The keyword that closes the current sub-parse.
    end: Option<TokenKind>,
    opened: Coordinate,
    out: Vec<Node>,
}

impl<'s> Parser<'s> {
    fn new(source: &'s Source, options: CompileOptions) -> Self {
        Self {
            tokens: Tokens::new(Lexer::new(source.content())),
            file: source.file().clone(),
            options,
            blocks: Blocks::new(),
            block: None,
            end: None,
            opened: Coordinate::default(),
            out: Vec::new(),
        }
    }

    /// Parse until `end` (or eof when `None`) with a fresh output,
    /// restoring the enclosing state afterwards.
    fn sub_parse(&mut self, end: Option<TokenKind>, opened: Coordinate) -> Result<(Sequence, Exit)> {
        let outer_end = replace(&mut self.end, end);
        let outer_opened = replace(&mut self.opened, opened);
        let outer_out = take(&mut self.out);

        let res = self.run();

        self.end = outer_end;
        self.opened = outer_opened;
        let nodes = replace(&mut self.out, outer_out);
        let exit = res?;

        let mut seq = Sequence::from(nodes);
        seq.compact(self.options.strip_whitespace);
        Ok((seq, exit))
    }

    fn run(&mut self) -> Result<Exit> {
        let mut state = State::Text;
        loop {
            state = match state {
                State::Text => self.parse_text()?,
                State::Open => self.parse_open()?,
                State::End => self.parse_end()?,
                State::Block(c) => self.parse_block(c)?,
                State::Evoke(c) => self.parse_evoke(c)?,
                State::With(c) => self.parse_with(c)?,
                State::Range(c) => self.parse_range(c)?,
                State::If(c) => self.parse_if(c)?,
                State::Done(exit) => return Ok(exit),
            };
        }
    }

    /// The next token, with lexical errors turned into errors.
    fn next(&mut self) -> Result<Token> {
        let tok = self.tokens.next();
        match tok.kind() {
            TokenKind::Error => Err(Error::Lex(tok.text().to_owned(), tok.coord())),
            _ => Ok(tok),
        }
    }

    fn peek(&mut self) -> Result<Token> {
        let tok = self.next()?;
        self.tokens.backup();
        Ok(tok)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        let tok = self.next()?;
        if tok.kind() == kind {
            Ok(tok)
        }
        else {
            Err(Error::Expected(kind, tok))
        }
    }

    fn parse_text(&mut self) -> Result<State> {
        let tok = self.next()?;
        match tok.kind() {
            TokenKind::Literal => {
                self.out.push(Node::Literal(tok.text().to_owned()));
                Ok(State::Text)
            },
            TokenKind::Comment => Ok(State::Text),
            TokenKind::Open => Ok(State::Open),
            TokenKind::Eof => match self.end {
                None => Ok(State::Done(Exit::Eof)),
                Some(kind) => Err(Error::UnexpectedEof(kind, self.opened)),
            },
            _ => Err(Error::Unexpected(tok)),
        }
    }

    fn parse_open(&mut self) -> Result<State> {
        let tok = self.next()?;
        let coord = tok.coord();
        match tok.kind() {
            TokenKind::Block => Ok(State::Block(coord)),
            TokenKind::Evoke => Ok(State::Evoke(coord)),
            TokenKind::With => Ok(State::With(coord)),
            TokenKind::Range => Ok(State::Range(coord)),
            TokenKind::If => Ok(State::If(coord)),
            TokenKind::End => Ok(State::End),
            TokenKind::Else if self.end == Some(TokenKind::If) => {
                self.expect(TokenKind::Close)?;
                Ok(State::Done(Exit::Else(tok)))
            },
            TokenKind::Else => Err(Error::ElseOutsideIf(coord)),
            TokenKind::Close => Err(Error::EmptyAction(coord)),
            kind if kind.starts_value() => {
                self.tokens.backup();
                let value = self.value()?;
                self.expect(TokenKind::Close)?;
                self.out.push(Node::Value(value));
                Ok(State::Text)
            },
            _ => Err(Error::Unexpected(tok)),
        }
    }

    fn parse_end(&mut self) -> Result<State> {
        let tok = self.next()?;
        match self.end {
            Some(kind) if tok.kind() == kind => {},
            Some(kind) => return Err(Error::Expected(kind, tok)),
            None => return Err(Error::Unexpected(tok)),
        }

        self.expect(TokenKind::Close)?;
        Ok(State::Done(Exit::End))
    }

    fn parse_block(&mut self, opened: Coordinate) -> Result<State> {
        let name = self.expect(TokenKind::Ident)?;
        if let Some((outer, _)) = &self.block {
            return Err(Error::NestedBlock(name.text().to_owned(), outer.clone(), name.coord()));
        }

        let context = self.optional_selector("block")?;
        self.expect(TokenKind::Close)?;

        self.block = Some((name.text().to_owned(), opened));
        let res = self.sub_parse(Some(TokenKind::Block), opened);
        self.block = None;
        let (body, _) = res?;

        debug!("Defined block {} at {}", name.text(), opened);
        self.blocks.define(Block::new(
            name.text().to_owned(),
            context,
            body,
            opened,
            self.file.clone(),
        ))?;
        Ok(State::Text)
    }

    fn parse_evoke(&mut self, opened: Coordinate) -> Result<State> {
        let name = self.expect(TokenKind::Ident)?;
        let context = self.optional_selector("evoke")?;
        self.expect(TokenKind::Close)?;
        self.out.push(Node::Evoke(Evoke::new(name.text().to_owned(), context, opened)));
        Ok(State::Text)
    }

    fn parse_with(&mut self, opened: Coordinate) -> Result<State> {
        let context = self.selector("with")?;
        self.expect(TokenKind::Close)?;
        let (body, _) = self.sub_parse(Some(TokenKind::With), opened)?;
        self.out.push(Node::With(With::new(context, body)));
        Ok(State::Text)
    }

    fn parse_range(&mut self, opened: Coordinate) -> Result<State> {
        let at = self.peek()?.coord();
        let source = self.value()?;
        if source.is_constant() {
            return Err(Error::ExpectedIterable(at));
        }

        let (key, value) = if self.peek()?.kind() == TokenKind::As {
            self.next()?;
            let key = self.expect(TokenKind::Ident)?;
            let value = self.expect(TokenKind::Ident)?;
            (binding(key.text()), binding(value.text()))
        }
        else {
            (Some(DEFAULT_KEY.to_owned()), Some(DEFAULT_VALUE.to_owned()))
        };
        self.expect(TokenKind::Close)?;

        let (body, _) = self.sub_parse(Some(TokenKind::Range), opened)?;
        self.out.push(Node::Range(Range::new(source, key, value, body)));
        Ok(State::Text)
    }

    fn parse_if(&mut self, opened: Coordinate) -> Result<State> {
        let condition = self.value()?;
        self.expect(TokenKind::Close)?;

        let (success, exit) = self.sub_parse(Some(TokenKind::If), opened)?;
        let failure = match exit {
            Exit::Else(_) => match self.sub_parse(Some(TokenKind::If), opened)? {
                (_, Exit::Else(tok)) => return Err(Error::Unexpected(tok)),
                (failure, _) => Some(failure),
            },
            _ => None,
        };

        self.out.push(Node::If(If::new(condition, success, failure)));
        Ok(State::Text)
    }

    fn optional_selector(&mut self, tag: &str) -> Result<Option<Selector>> {
        if self.peek()?.kind().starts_value() {
            self.selector(tag).map(Some)
        }
        else {
            Ok(None)
        }
    }

    fn selector(&mut self, tag: &str) -> Result<Selector> {
        let at = self.peek()?.coord();
        match self.value()? {
            Expr::Selector(sel) => Ok(sel),
            _ => Err(Error::ExpectedSelector(tag.to_owned(), at)),
        }
    }

    /// A selector, constant or call.
    fn value(&mut self) -> Result<Expr> {
        let tok = self.next()?;
        match tok.kind() {
            TokenKind::Call => {
                let name = self.expect(TokenKind::Ident)?;
                let mut args = Vec::new();
                while self.peek()?.kind().starts_argument() {
                    args.push(self.argument()?);
                }

                Ok(Expr::Call(Call::new(name.text().to_owned(), args, tok.coord())))
            },
            _ => {
                self.tokens.backup();
                self.argument()
            },
        }
    }

    /// A selector or constant.
    fn argument(&mut self) -> Result<Expr> {
        let tok = self.next()?;
        match tok.kind() {
            TokenKind::StartSel => {
                let mut parts = Vec::new();
                loop {
                    let part = self.next()?;
                    match part.kind() {
                        TokenKind::EndSel => break,
                        TokenKind::Push | TokenKind::Pop | TokenKind::Root | TokenKind::Ident => {
                            parts.push(part);
                        },
                        _ => return Err(Error::Expected(TokenKind::EndSel, part)),
                    }
                }

                Selector::from_tokens(&parts, tok.coord()).map(Expr::Selector)
            },
            TokenKind::Value => Ok(Expr::Str(tok.text().to_owned())),
            TokenKind::Numeric => Expr::numeric(&tok),
            _ => Err(Error::ExpectedValue(tok)),
        }
    }
}

fn binding(name: &str) -> Option<String> {
    match name {
        DISCARD => None,
        name => Some(name.to_owned()),
    }
}
