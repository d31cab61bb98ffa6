//! Selectors, constants and calls: everything that evaluates to a value.
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
        context::Context,
        error::{
            Error,
            Result,
        },
        file::Coordinate,
        token::{
            Token,
            TokenKind,
        },
        value::Value,
    },
    std::{
        borrow::Cow,
        fmt::{
            Display,
            Formatter,
            Result as FmtResult,
        },
        io::Write,
    },
};

/// A path into the context stack.
///
/// The header is either nothing (relative to the current frame), a `/`
/// (the root frame) or one or more `$` (that many frames up), and is always
/// followed by at least one `.`. `.`, `$.` and `/.` have no steps and name
/// the frame itself.
#[derive(Debug, Clone, PartialEq)]
pub
struct Selector {
    absolute: bool,
    pops: usize,
    path: Vec<String>,
    coord: Coordinate,
}

impl Selector {
    /// Validate the tokens found between a selector's start and end
    /// markers.
    pub(crate)
    fn from_tokens(toks: &[Token], coord: Coordinate) -> Result<Self> {
        let mut iter = toks.iter().peekable();
        let mut absolute = false;
        let mut pops = 0;
        match iter.peek().map(|t| t.kind()) {
            Some(TokenKind::Root) => {
                absolute = true;
                iter.next();
            },
            Some(TokenKind::Pop) => while iter.peek().map(|t| t.kind()) == Some(TokenKind::Pop) {
                pops += 1;
                iter.next();
            },
            _ => {},
        }

        let illegal = |msg: String| Err(Error::IllegalSelector(msg, coord));
        let mut path = Vec::new();
        let mut bare = false;
        while let Some(tok) = iter.next() {
            if tok.kind() != TokenKind::Push {
                return illegal(format!("unexpected {} in selector", tok.kind()));
            }

            match iter.next() {
                Some(step) if step.kind() == TokenKind::Ident => {
                    path.push(step.text().to_owned());
                },
                Some(step) => return illegal(format!(
                    "unexpected {} after {}",
                    step.kind(),
                    TokenKind::Push,
                )),
                None if path.is_empty() => bare = true,
                None => return illegal(format!("trailing {}", TokenKind::Push)),
            }
        }

        if path.is_empty() && !bare {
            return illegal(format!("a selector must contain a {}", TokenKind::Push));
        }

        Ok(Self { absolute, pops, path, coord, })
    }

    /// Whether this selector starts at the root frame.
    pub
    fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// How many frames this selector climbs before stepping.
    pub
    fn pops(&self) -> usize {
        self.pops
    }

    /// The keys stepped through after the header.
    pub
    fn path(&self) -> &[String] {
        &self.path
    }

    pub
    fn coord(&self) -> Coordinate {
        self.coord
    }
}

impl Display for Selector {
    fn fmt(&self, fmtr: &mut Formatter<'_>) -> FmtResult {
        if self.absolute {
            fmtr.write_str("/")?;
        }
        for _ in 0..self.pops {
            fmtr.write_str("$")?;
        }
        if self.path.is_empty() {
            return fmtr.write_str(".");
        }
        for step in self.path.iter() {
            fmtr.write_fmt(format_args!(".{}", step))?;
        }

        Ok(())
    }
}

/// A host function invocation.
#[derive(Debug, Clone, PartialEq)]
pub
struct Call {
    name: String,
    args: Vec<Expr>,
    coord: Coordinate,
}

impl Call {
    pub(crate)
    fn new(name: String, args: Vec<Expr>, coord: Coordinate) -> Self {
        Self { name, args, coord, }
    }

    pub
    fn name(&self) -> &str {
        &self.name
    }

    pub
    fn args(&self) -> &[Expr] {
        &self.args
    }

    pub
    fn coord(&self) -> Coordinate {
        self.coord
    }

    fn compute<'a>(&self, ctx: &Context<'a>) -> Result<Value> {
        let function = ctx.function(&self.name)
            .ok_or_else(|| Error::NoFunction(self.name.clone()))?;
        let args = self.args.iter()
            .map(|arg| arg.compute(ctx).map(Cow::into_owned))
            .collect::<Result<Vec<Value>>>()?;
        function.call(&self.name, &args)
    }
}

/// A value-producing node.
#[derive(Debug, Clone, PartialEq)]
pub
enum Expr {
    Selector(Selector),
    Str(String),
    Int(i64),
    Float(f64),
    Call(Call),
}

impl Expr {
    /// Read a numeric lexeme as an integer when possible, otherwise as a
    /// float.
    pub(crate)
    fn numeric(tok: &Token) -> Result<Self> {
        let text = tok.text();
        if let Ok(i) = text.parse::<i64>() {
            Ok(Self::Int(i))
        }
        else if let Ok(f) = text.parse::<f64>() {
            Ok(Self::Float(f))
        }
        else {
            Err(Error::IllegalNumber(text.to_owned(), tok.coord()))
        }
    }

    /// Constants never consult the context.
    pub
    fn is_constant(&self) -> bool {
        matches!(self, Self::Str(_) | Self::Int(_) | Self::Float(_))
    }

    pub(crate)
    fn constant_value(&self) -> Option<Value> {
        match self {
            Self::Str(s) => Some(Value::Str(s.clone())),
            Self::Int(i) => Some(Value::Int(*i)),
            Self::Float(f) => Some(Value::Float(*f)),
            _ => None,
        }
    }

    pub(crate)
    fn compute<'a>(&self, ctx: &Context<'a>) -> Result<Cow<'a, Value>> {
        match self {
            Self::Selector(sel) => ctx.value_for(sel),
            Self::Call(call) => call.compute(ctx).map(Cow::Owned),
            constant => Ok(Cow::Owned(constant.constant_value().unwrap_or_default())),
        }
    }

    pub(crate)
    fn render(&self, w: &mut dyn Write, ctx: &Context<'_>) -> Result<()> {
        let value = self.compute(ctx)?;
        w.write_fmt(format_args!("{}", value)).map_err(Error::Write)
    }
}

impl Display for Expr {
    fn fmt(&self, fmtr: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Selector(sel) => fmtr.write_fmt(format_args!("[selector {}]", sel)),
            Self::Str(s) => fmtr.write_fmt(format_args!("[constant {:?}]", s)),
            Self::Int(i) => fmtr.write_fmt(format_args!("[int {}]", i)),
            Self::Float(f) => fmtr.write_fmt(format_args!("[float {}]", f)),
            Self::Call(call) => {
                fmtr.write_fmt(format_args!("[call {}", call.name))?;
                for arg in call.args.iter() {
                    fmtr.write_fmt(format_args!(" {}", arg))?;
                }
                fmtr.write_str("]")
            },
        }
    }
}
