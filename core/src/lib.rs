//! The Evoke Templating Engine: block-oriented text templates driven by a context stack.
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

mod block;
mod context;
mod error;
mod expr;
mod file;
mod function;
mod lexer;
mod parser;
mod path;
mod template;
mod token;
mod tree;
mod value;

#[cfg(test)]
mod test;

pub use {
    block::{
        Block,
        Blocks,
    },
    error::{
        Duplicate,
        Error,
        Result,
    },
    expr::{
        Call,
        Expr,
        Selector,
    },
    file::{
        read_context,
        Coordinate,
        Source,
    },
    function::{
        Function,
        Functions,
    },
    lexer::{
        lex,
        Lexer,
    },
    parser::{
        compile,
        compile_with,
        CompileOptions,
    },
    template::Template,
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
    value::{
        to_value,
        Record,
        Shape,
        Value,
    },
};
