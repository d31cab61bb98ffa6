//! Error types for the Evoke Templating Engine.
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
        file::Coordinate,
        token::{
            Token,
            TokenKind,
        },
        value::Shape,
    },
    std::{
        error::Error as StdError,
        fmt::{
            Display,
            Formatter,
            Result as FmtResult,
        },
        io::Error as IOError,
        path::PathBuf,
        result::Result as StdResult,
    },
    serde_json::Error as JsonError,
};

/// A block name defined in two different sources.
#[derive(Debug, Clone, PartialEq)]
pub
struct Duplicate {
    pub name: String,
    pub existing: PathBuf,
    pub incoming: PathBuf,
}

/// The error type for the Evoke Templating Engine.
#[derive(Debug)]
pub enum Error {
    IO(IOError, PathBuf),
    JsonParse(JsonError, PathBuf),
    Lex(String, Coordinate),
    Expected(TokenKind, Token),
    ExpectedValue(Token),
    ExpectedSelector(String, Coordinate),
    ExpectedIterable(Coordinate),
    Unexpected(Token),
    UnexpectedEof(TokenKind, Coordinate),
    EmptyAction(Coordinate),
    ElseOutsideIf(Coordinate),
    NestedBlock(String, String, Coordinate),
    BlockRedefined(String, Coordinate, Coordinate),
    DuplicateBlocks(Vec<Duplicate>),
    IllegalSelector(String, Coordinate),
    IllegalNumber(String, Coordinate),
    CannotPop(String, usize),
    ValueNotFound(String, usize, String),
    NotAccessible(String, String, Shape),
    NoBlock(String),
    NoFunction(String),
    Arity(String, usize, usize),
    Call(String, String),
    NotIterable(String, Shape),
    Write(IOError),
    Serialize(String),
}

impl Display for Error {
    fn fmt(&self, fmtr: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::IO(e, p) => fmtr.write_fmt(format_args!("IO error in {:?} {:?}", p, e)),
            Self::JsonParse(e, p) => fmtr.write_fmt(format_args!("Json error in {:?} {:?}", p, e)),
            Self::Lex(msg, c) => fmtr.write_fmt(format_args!(
                "Lexical error at {}: {}",
                c,
                msg,
            )),
            Self::Expected(kind, got) => fmtr.write_fmt(format_args!(
                "Expected a \"{}\" got a \"{}\"",
                kind,
                got,
            )),
            Self::ExpectedValue(got) => fmtr.write_fmt(format_args!(
                "Expected a value got a \"{}\"",
                got,
            )),
            Self::ExpectedSelector(tag, c) => fmtr.write_fmt(format_args!(
                "The argument of {} at {} must be a selector",
                tag,
                c,
            )),
            Self::ExpectedIterable(c) => fmtr.write_fmt(format_args!(
                "The argument of range at {} must be a selector or a call",
                c,
            )),
            Self::Unexpected(t) => fmtr.write_fmt(format_args!("Unexpected \"{}\"", t)),
            Self::UnexpectedEof(kind, c) => fmtr.write_fmt(format_args!(
                "Unexpected eof in a \"{}\" context opened at {}",
                kind,
                c,
            )),
            Self::EmptyAction(c) => fmtr.write_fmt(format_args!("Empty action at {}", c)),
            Self::ElseOutsideIf(c) => fmtr.write_fmt(format_args!(
                "Unexpected else not inside an if context at {}",
                c,
            )),
            Self::NestedBlock(inner, outer, c) => fmtr.write_fmt(format_args!(
                "Block {} at {} is nested inside block {}",
                inner,
                c,
                outer,
            )),
            Self::BlockRedefined(name, first, second) => fmtr.write_fmt(format_args!(
                "Block {} defined at {} was already defined at {}",
                name,
                second,
                first,
            )),
            Self::DuplicateBlocks(dups) => {
                fmtr.write_str("Duplicate blocks:")?;
                for dup in dups {
                    fmtr.write_fmt(format_args!(
                        " {:?} from {:?} already exists from {:?};",
                        dup.name,
                        dup.incoming,
                        dup.existing,
                    ))?;
                }

                Ok(())
            },
            Self::IllegalSelector(msg, c) => fmtr.write_fmt(format_args!(
                "Illegal selector at {}: {}",
                c,
                msg,
            )),
            Self::IllegalNumber(n, c) => fmtr.write_fmt(format_args!(
                "Illegal number {:?} at {}",
                n,
                c,
            )),
            Self::CannotPop(p, n) => fmtr.write_fmt(format_args!(
                "{:?} can't pop {} items off",
                p,
                n,
            )),
            Self::ValueNotFound(p, idx, key) => fmtr.write_fmt(format_args!(
                "{:?}: error accessing item {}: {:?} not found",
                p,
                idx,
                key,
            )),
            Self::NotAccessible(p, key, shape) => fmtr.write_fmt(format_args!(
                "{:?}.{:?}: can't step into a {}",
                p,
                key,
                shape,
            )),
            Self::NoBlock(name) => fmtr.write_fmt(format_args!("No block by the name {}", name)),
            Self::NoFunction(name) => fmtr.write_fmt(format_args!(
                "No function by the name {}",
                name,
            )),
            Self::Arity(name, expected, got) => fmtr.write_fmt(format_args!(
                "Function {} takes {} arguments but was given {}",
                name,
                expected,
                got,
            )),
            Self::Call(name, msg) => fmtr.write_fmt(format_args!(
                "Function {} failed: {}",
                name,
                msg,
            )),
            Self::NotIterable(what, shape) => fmtr.write_fmt(format_args!(
                "{} is a {}, a non iterable type",
                what,
                shape,
            )),
            Self::Write(e) => fmtr.write_fmt(format_args!("Write error {:?}", e)),
            Self::Serialize(msg) => fmtr.write_fmt(format_args!(
                "Could not convert host value: {}",
                msg,
            )),
        }
    }
}

impl StdError for Error {}

impl serde::ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Serialize(msg.to_string())
    }
}

/// The result type for the Evoke Templating Engine.
pub type Result<T> = StdResult<T, Error>;
