//! The directory-like location of a render inside its context value.
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
        borrow::Cow,
        fmt::{
            Display,
            Formatter,
            Result as FmtResult,
        },
    },
};

const ROOT: &str = "/";
const SEP: char = '.';

/// One step of a path: the key that was stepped through and the value it
/// reached. The root frame has an empty name.
#[derive(Debug, Clone)]
pub(crate)
struct Frame<'a> {
    name: String,
    value: Cow<'a, Value>,
}

impl<'a> Frame<'a> {
    pub(crate)
    fn value(&self) -> &Cow<'a, Value> {
        &self.value
    }
}

/// An ordered, never empty stack of frames.
#[derive(Debug, Clone)]
pub(crate)
struct Path<'a> {
    frames: Vec<Frame<'a>>,
}

impl<'a> Path<'a> {
    pub(crate)
    fn rooted_at(root: &'a Value) -> Self {
        Self {
            frames: vec![Frame {
                name: String::new(),
                value: Cow::Borrowed(root),
            }],
        }
    }

    pub(crate)
    fn depth(&self) -> usize {
        self.frames.len()
    }

    pub(crate)
    fn push<S: Into<String>>(&mut self, name: S, value: Cow<'a, Value>) {
        self.frames.push(Frame { name: name.into(), value, });
    }

    /// Remove `num` frames. The root frame can never be popped.
    pub(crate)
    fn pop(&mut self, num: usize) -> Result<()> {
        if num >= self.depth() {
            return Err(Error::CannotPop(self.to_string(), num));
        }

        self.frames.truncate(self.depth() - num);
        Ok(())
    }

    /// The frame `num` steps behind the top.
    pub(crate)
    fn item_behind(&self, num: usize) -> Result<&Frame<'a>> {
        if num >= self.depth() {
            return Err(Error::CannotPop(self.to_string(), num));
        }

        Ok(&self.frames[self.depth() - (num + 1)])
    }

    pub(crate)
    fn last_value(&self) -> &Cow<'a, Value> {
        // a path always holds at least the root frame
        &self.frames[self.frames.len() - 1].value
    }

    /// The human readable path of the first `depth` frames followed by
    /// `keys`, e.g. `/.foo.key`.
    pub(crate)
    fn string_with<S: AsRef<str>>(&self, depth: usize, keys: &[S]) -> String {
        let mut out = String::from(ROOT);
        for frame in self.frames.iter().take(depth).skip(1) {
            out.push(SEP);
            out.push_str(&frame.name);
        }
        for key in keys {
            out.push(SEP);
            out.push_str(key.as_ref());
        }

        out
    }
}

impl Display for Path<'_> {
    fn fmt(&self, fmtr: &mut Formatter<'_>) -> FmtResult {
        fmtr.write_str(&self.string_with::<&str>(self.depth(), &[]))
    }
}

fn step_into<'v>(value: &'v Value, at: &str, idx: usize, key: &str) -> Result<&'v Value> {
    match value.access(key) {
        Ok(Some(next)) => Ok(next),
        Ok(None) => Err(Error::ValueNotFound(at.to_owned(), idx, key.to_owned())),
        Err(shape) => Err(Error::NotAccessible(at.to_owned(), key.to_owned(), shape)),
    }
}

fn walk_ref<'v, S>(mut value: &'v Value, at: &str, first: usize, keys: &[S]) -> Result<&'v Value>
where
    S: AsRef<str>
{
    for (idx, key) in keys.iter().enumerate() {
        value = step_into(value, at, first + idx, key.as_ref())?;
    }

    Ok(value)
}

/// Walk `keys` starting from `start`. Borrowed starting points stay
/// borrowed, owned ones hand back an owned copy of what was reached.
///
/// `at` names the location the walk starts from and `first` is the index
/// of the first key within the whole selector, both for diagnostics.
pub(crate)
fn walk<'a, S>(start: &Cow<'a, Value>, at: &str, first: usize, keys: &[S]) -> Result<Cow<'a, Value>>
where
    S: AsRef<str>
{
    match start {
        Cow::Borrowed(value) => walk_ref(*value, at, first, keys).map(Cow::Borrowed),
        Cow::Owned(value) => walk_ref(value, at, first, keys).map(|v| Cow::Owned(v.clone())),
    }
}
