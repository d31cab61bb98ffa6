//! File handling utilities for the Evoke Templating Engine.
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
        error::{
            Error,
            Result,
        },
        value::Value,
    },
    std::{
        fmt::{ Display, Formatter, Result as FmtResult, },
        fs::read_to_string,
        path::{ Path, PathBuf, },
    },
    serde_json::{
        from_str as from_json_str,
        Value as JsonValue,
    },
};

/// A read-position within a source. Both fields are zero-based.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub
struct Coordinate {
    line: usize,
    position: usize,
}

impl Coordinate {
    pub(crate)
    fn new(line: usize, position: usize) -> Self {
        Self { line, position, }
    }

    /// The zero-based line.
    pub
    fn line(&self) -> usize {
        self.line
    }

    /// The zero-based byte position within the line.
    pub
    fn position(&self) -> usize {
        self.position
    }
}

impl Display for Coordinate {
    fn fmt(&self, fmtr: &mut Formatter<'_>) -> FmtResult {
        fmtr.write_fmt(format_args!(
            "line {} position {}",
            self.line + 1,
            self.position + 1,
        ))
    }
}

/// Template text together with the file it came from.
#[derive(Debug, Clone, Default)]
pub
struct Source {
    file: PathBuf,
    content: String,
}

impl Source {
    /// Wrap in-memory text. The name is only used to identify the source in
    /// diagnostics.
    pub
    fn faux_source<P, S>(p: P, content: S) -> Self
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        Self {
            file: p.as_ref().into(),
            content: content.as_ref().to_owned(),
        }
    }

    /// Read a source from disk.
    pub
    fn read_file<P>(p: P) -> Result<Self>
    where
        P: AsRef<Path>
    {
        let content = read_to_string(&p).map_err(|e| Error::IO(e, p.as_ref().into()))?;

        Ok(Self {
            file: p.as_ref().into(),
            content,
        })
    }

    pub
    fn file(&self) -> &PathBuf {
        &self.file
    }

    pub
    fn content(&self) -> &str {
        &self.content
    }
}

impl Display for Source {
    fn fmt(&self, fmtr: &mut Formatter<'_>) -> FmtResult {
        fmtr.write_fmt(format_args!("{:?}", self.file))
    }
}

/// Read a JSON file to use as the root of a render.
pub
fn read_context<P>(p: P) -> Result<Value>
where
    P: AsRef<Path>
{
    let content = read_to_string(&p).map_err(|e| Error::IO(e, p.as_ref().into()))?;
    let json = from_json_str::<JsonValue>(&content)
        .map_err(|e| Error::JsonParse(e, p.as_ref().into()))?;

    Ok(Value::from(json))
}
