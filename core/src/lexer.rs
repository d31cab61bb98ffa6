//! The lexical scanner of the Evoke Templating Engine.
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

pub(crate) mod consts;

use {
    crate::{
        file::Coordinate,
        token::{
            Token,
            TokenKind,
        },
    },
    std::collections::VecDeque,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    Comment,
    Open,
    Close,
    InsideAction,
    InsideSelector,
    Value,
    Identifier,
    Number,
    Done,
}

/// A state machine turning template text into tokens.
///
/// Tokens are produced lazily as [`Lexer::next_token`] is pulled. Once an
/// `Eof` or `Error` token has been produced the lexer never resumes and
/// hands out that same token on every further request. As an [`Iterator`]
/// the lexer yields the terminal token once and then stops.
#[derive(Debug)]
pub
struct Lexer<'s> {
    data: &'s str,
    pos: usize,
    tail: usize,
    width: usize,
    line: usize,
    line_start: usize,
    counted: usize,
    state: State,
    pending: VecDeque<Token>,
    terminal: Option<Token>,
    exhausted: bool,
}

/// Start lexing `data`.
pub
fn lex(data: &str) -> Lexer<'_> {
    Lexer::new(data)
}

impl<'s> Lexer<'s> {
    pub
    fn new(data: &'s str) -> Self {
        Self {
            data,
            pos: 0,
            tail: 0,
            width: 0,
            line: 0,
            line_start: 0,
            counted: 0,
            state: State::Text,
            pending: VecDeque::new(),
            terminal: None,
            exhausted: false,
        }
    }

    /// Produce the next token, running the state machine until one is ready.
    pub
    fn next_token(&mut self) -> Token {
        loop {
            if let Some(tok) = self.pending.pop_front() {
                if tok.kind().is_terminal() {
                    self.terminal = Some(tok.clone());
                }

                return tok;
            }

            if let Some(tok) = &self.terminal {
                return tok.clone();
            }

            self.state = match self.state {
                State::Text => self.lex_text(),
                State::Comment => self.lex_comment(),
                State::Open => self.lex_open(),
                State::Close => self.lex_close(),
                State::InsideAction => self.lex_inside_action(),
                State::InsideSelector => self.lex_inside_selector(),
                State::Value => self.lex_value(),
                State::Identifier => self.lex_identifier(),
                State::Number => self.lex_number(),
                // the terminal token is always queued before Done
                State::Done => {
                    self.emit(TokenKind::Eof);
                    State::Done
                },
            };
        }
    }

    fn rest(&self) -> &'s str {
        &self.data[self.pos..]
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.rest().chars().next();
        self.width = c.map(|c| c.len_utf8()).unwrap_or(0);
        self.pos += self.width;
        c
    }

    fn backup(&mut self) {
        self.pos -= self.width;
        self.width = 0;
    }

    fn accept(&mut self, valid: &str) -> bool {
        match self.next_char() {
            Some(c) if valid.contains(c) => true,
            _ => {
                self.backup();
                false
            },
        }
    }

    fn accept_run(&mut self, valid: &str) {
        while self.accept(valid) {}
    }

    fn accept_while<F>(&mut self, f: F)
    where
        F: Fn(char) -> bool
    {
        loop {
            match self.next_char() {
                Some(c) if f(c) => (),
                _ => {
                    self.backup();
                    break;
                },
            }
        }
    }

    /// Skip the pending text without emitting it.
    fn ignore(&mut self) {
        self.tail = self.pos;
    }

    fn coord_of(&mut self, offset: usize) -> Coordinate {
        let scanned = &self.data[self.counted..offset];
        if let Some(last) = scanned.rfind('\n') {
            self.line += scanned.matches('\n').count();
            self.line_start = self.counted + last + 1;
        }
        self.counted = offset;

        Coordinate::new(self.line, offset - self.line_start)
    }

    fn emit(&mut self, kind: TokenKind) {
        let coord = self.coord_of(self.tail);
        let text = &self.data[self.tail..self.pos];
        self.pending.push_back(Token::new(kind, text, coord));
        self.tail = self.pos;
    }

    fn errorf<S: Into<String>>(&mut self, msg: S) -> State {
        let coord = self.coord_of(self.tail);
        self.pending.push_back(Token::new(TokenKind::Error, msg, coord));
        State::Done
    }

    fn lex_text(&mut self) -> State {
        loop {
            let rest = self.rest();
            if rest.starts_with(consts::OPEN) {
                if self.pos > self.tail {
                    self.emit(TokenKind::Literal);
                }

                return State::Open;
            }
            else if rest.starts_with(consts::COMMENT) {
                if self.pos > self.tail {
                    self.emit(TokenKind::Literal);
                }

                return State::Comment;
            }

            // skip ahead to the next candidate delimiter
            match rest.char_indices().skip(1).find(|(_, c)| *c == '{') {
                Some((idx, _)) => self.pos += idx,
                None => {
                    self.pos = self.data.len();
                    break;
                },
            }
        }

        if self.pos > self.tail {
            self.emit(TokenKind::Literal);
        }

        self.emit(TokenKind::Eof);
        State::Done
    }

    fn lex_comment(&mut self) -> State {
        let inner = &self.rest()[consts::COMMENT.len()..];
        match inner.find(consts::ENDCOMMENT) {
            Some(idx) => {
                self.pos += consts::COMMENT.len() + idx + consts::ENDCOMMENT.len();
                self.emit(TokenKind::Comment);
                State::Text
            },
            None => self.errorf("unexpected eof in comment"),
        }
    }

    fn lex_open(&mut self) -> State {
        self.pos += consts::OPEN.len();
        self.emit(TokenKind::Open);
        State::InsideAction
    }

    fn lex_close(&mut self) -> State {
        self.pos += consts::CLOSE.len();
        self.emit(TokenKind::Close);
        State::Text
    }

    fn lex_inside_action(&mut self) -> State {
        loop {
            if self.rest().starts_with(consts::CLOSE) {
                return State::Close;
            }

            match self.next_char() {
                None => return self.errorf("unclosed action"),
                Some(c) if c.is_whitespace() => self.ignore(),
                Some(consts::PUSH | consts::POP | consts::ROOT) => {
                    self.backup();
                    self.emit(TokenKind::StartSel);
                    return State::InsideSelector;
                },
                Some(c) if consts::SIGNS.contains(c) || consts::DIGITS.contains(c) => {
                    self.backup();
                    return State::Number;
                },
                Some(consts::QUOTE) => {
                    self.ignore();
                    return State::Value;
                },
                Some(c) if consts::is_ident_start(c) => return State::Identifier,
                Some(c) => return self.errorf(format!("invalid character: {:?}", c)),
            }
        }
    }

    fn lex_inside_selector(&mut self) -> State {
        if self.rest().starts_with(consts::CLOSE) {
            self.emit(TokenKind::EndSel);
            return State::InsideAction;
        }

        match self.next_char() {
            Some(consts::PUSH) => {
                self.emit(TokenKind::Push);
                State::InsideSelector
            },
            Some(consts::POP) => {
                self.emit(TokenKind::Pop);
                State::InsideSelector
            },
            Some(consts::ROOT) => {
                self.emit(TokenKind::Root);
                State::InsideSelector
            },
            Some(c) if consts::is_ident_start(c) => {
                self.accept_while(consts::is_ident_char);
                self.emit(TokenKind::Ident);
                State::InsideSelector
            },
            Some(c) if c.is_whitespace() => {
                self.backup();
                self.emit(TokenKind::EndSel);
                State::InsideAction
            },
            None => self.errorf("unclosed action"),
            Some(c) => self.errorf(format!("invalid character in selector: {:?}", c)),
        }
    }

    fn lex_value(&mut self) -> State {
        match self.rest().find(consts::QUOTE) {
            Some(idx) => {
                self.pos += idx;
                self.emit(TokenKind::Value);
                // chunk the closing quote
                self.pos += consts::QUOTE.len_utf8();
                self.ignore();
                State::InsideAction
            },
            None => self.errorf("unterminated string"),
        }
    }

    fn lex_identifier(&mut self) -> State {
        self.accept_while(consts::is_ident_char);
        let word = &self.data[self.tail..self.pos];
        let kind = TokenKind::keyword(word).unwrap_or(TokenKind::Ident);
        self.emit(kind);
        State::InsideAction
    }

    fn lex_number(&mut self) -> State {
        self.accept(consts::SIGNS);
        self.accept_run(consts::DIGITS);
        if self.accept(consts::DECIMAL) {
            self.accept_run(consts::DIGITS);
        }
        if self.accept(consts::EXPONENT) {
            self.accept(consts::SIGNS);
            self.accept_run(consts::DIGITS);
        }
        self.emit(TokenKind::Numeric);
        State::InsideAction
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let tok = self.next_token();
        if tok.kind().is_terminal() {
            self.exhausted = true;
        }

        Some(tok)
    }
}
