//! The token vocabulary shared by the lexer and the parser.
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
    crate::file::Coordinate,
    std::fmt::{
        Display,
        Formatter,
        Result as FmtResult,
    },
};

/// The kind of a lexical unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub
enum TokenKind {
    /// `{%`
    Open,
    /// `%}`
    Close,
    /// `call`
    Call,
    /// `.`
    Push,
    /// `$`
    Pop,
    /// `/`
    Root,
    /// `"foo"`
    Value,
    /// `-123.5`
    Numeric,
    /// `foo`
    Ident,
    As,
    Block,
    Evoke,
    If,
    Else,
    With,
    Range,
    End,
    /// `{# ... #}`
    Comment,
    /// Text outside of any action.
    Literal,
    Eof,
    /// Zero-width marker opening a selector like `$.foo.bar`.
    StartSel,
    /// Zero-width marker closing a selector.
    EndSel,
    Error,
}

impl TokenKind {
    pub
    fn name(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Call => "call",
            Self::Push => "push",
            Self::Pop => "pop",
            Self::Root => "root",
            Self::Value => "value",
            Self::Numeric => "numeric",
            Self::Ident => "ident",
            Self::As => "as",
            Self::Block => "block",
            Self::Evoke => "evoke",
            Self::If => "if",
            Self::Else => "else",
            Self::With => "with",
            Self::Range => "range",
            Self::End => "end",
            Self::Comment => "comment",
            Self::Literal => "literal",
            Self::Eof => "eof",
            Self::StartSel => "startSel",
            Self::EndSel => "endSel",
            Self::Error => "error",
        }
    }

    /// The keyword spelled by `word`, if any.
    pub(crate)
    fn keyword(word: &str) -> Option<Self> {
        match word {
            "call" => Some(Self::Call),
            "block" => Some(Self::Block),
            "evoke" => Some(Self::Evoke),
            "if" => Some(Self::If),
            "else" => Some(Self::Else),
            "with" => Some(Self::With),
            "range" => Some(Self::Range),
            "end" => Some(Self::End),
            "as" => Some(Self::As),
            _ => None,
        }
    }

    /// Eof and Error end the stream; nothing follows them.
    pub
    fn is_terminal(&self) -> bool {
        matches!(self, Self::Eof | Self::Error)
    }

    /// Whether a value (selector, constant or call) starts with this kind.
    pub(crate)
    fn starts_value(&self) -> bool {
        matches!(self, Self::StartSel | Self::Call | Self::Value | Self::Numeric)
    }

    /// Whether a call argument starts with this kind. Calls do not nest.
    pub(crate)
    fn starts_argument(&self) -> bool {
        matches!(self, Self::StartSel | Self::Value | Self::Numeric)
    }
}

impl Display for TokenKind {
    fn fmt(&self, fmtr: &mut Formatter<'_>) -> FmtResult {
        fmtr.write_str(self.name())
    }
}

/// A single lexical unit. For `Error` tokens the text is the message.
#[derive(Debug, Clone, PartialEq)]
pub
struct Token {
    kind: TokenKind,
    text: String,
    coord: Coordinate,
}

impl Token {
    pub(crate)
    fn new<S: Into<String>>(kind: TokenKind, text: S, coord: Coordinate) -> Self {
        Self { kind, text: text.into(), coord, }
    }

    pub
    fn kind(&self) -> TokenKind {
        self.kind
    }

    pub
    fn text(&self) -> &str {
        &self.text
    }

    pub
    fn coord(&self) -> Coordinate {
        self.coord
    }
}

impl Display for Token {
    fn fmt(&self, fmtr: &mut Formatter<'_>) -> FmtResult {
        fmtr.write_fmt(format_args!(
            "{}:{}[{}]{}",
            self.coord.line() + 1,
            self.coord.position() + 1,
            self.kind,
            self.text,
        ))
    }
}
