//! Host functions callable from templates with the `call` keyword.
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
        collections::HashMap,
        fmt::{
            Debug,
            Formatter,
            Result as FmtResult,
        },
        result::Result as StdResult,
        sync::Arc,
    },
};

type Callable = dyn Fn(&[Value]) -> StdResult<Value, String> + Send + Sync;

/// A host function. Failures are reported as plain messages and wrapped
/// with the function's name when a template calls it.
#[derive(Clone)]
pub
struct Function {
    arity: Option<usize>,
    callable: Arc<Callable>,
}

impl Function {
    /// A function accepting any number of arguments.
    pub
    fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> StdResult<Value, String> + Send + Sync + 'static
    {
        Self { arity: None, callable: Arc::new(f), }
    }

    /// A function accepting exactly `arity` arguments.
    pub
    fn with_arity<F>(arity: usize, f: F) -> Self
    where
        F: Fn(&[Value]) -> StdResult<Value, String> + Send + Sync + 'static
    {
        Self { arity: Some(arity), callable: Arc::new(f), }
    }

    pub(crate)
    fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        if let Some(arity) = self.arity {
            if arity != args.len() {
                return Err(Error::Arity(name.to_owned(), arity, args.len()));
            }
        }

        (self.callable)(args).map_err(|msg| Error::Call(name.to_owned(), msg))
    }
}

impl Debug for Function {
    fn fmt(&self, fmtr: &mut Formatter<'_>) -> FmtResult {
        match self.arity {
            Some(n) => fmtr.write_fmt(format_args!("Function({})", n)),
            None => fmtr.write_str("Function(..)"),
        }
    }
}

/// Functions by name.
#[derive(Debug, Clone, Default)]
pub
struct Functions {
    map: HashMap<String, Function>,
}

impl Functions {
    pub
    fn new() -> Self {
        Self::default()
    }

    /// Register `f` under `name`, handing back any function it replaces.
    pub
    fn insert<S: Into<String>>(&mut self, name: S, f: Function) -> Option<Function> {
        self.map.insert(name.into(), f)
    }

    pub
    fn get(&self, name: &str) -> Option<&Function> {
        self.map.get(name)
    }

    pub
    fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Add every function of `other`. Later registrations win.
    pub
    fn extend(&mut self, other: Functions) {
        self.map.extend(other.map);
    }

    pub
    fn len(&self) -> usize {
        self.map.len()
    }

    pub
    fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
