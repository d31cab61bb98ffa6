//! The render-time state: the context stack, range variables, blocks and functions.
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
        error::Result,
        expr::Selector,
        function::{
            Function,
            Functions,
        },
        path::{
            walk,
            Path,
        },
        value::Value,
    },
    std::{
        borrow::Cow,
        collections::HashMap,
    },
};

/// Everything a render needs while walking a tree.
///
/// The stack starts at the root value. Range variables live beside it,
/// keyed by the path of the frame they were bound at, so `.key` inside a
/// range resolves to the binding before the current value is consulted.
#[derive(Debug)]
pub(crate)
struct Context<'a> {
    path: Path<'a>,
    blocks: &'a Blocks,
    overlay: Option<&'a Blocks>,
    functions: &'a Functions,
    vars: HashMap<String, Value>,
}

impl<'a> Context<'a> {
    pub(crate)
    fn new(
        root: &'a Value,
        blocks: &'a Blocks,
        overlay: Option<&'a Blocks>,
        functions: &'a Functions,
    ) -> Self {
        Self {
            path: Path::rooted_at(root),
            blocks,
            overlay,
            functions,
            vars: HashMap::new(),
        }
    }

    /// The number of frames on the stack, root included.
    pub(crate)
    fn depth(&self) -> usize {
        self.path.depth()
    }

    /// The location of the top frame, e.g. `/.foo.bar`.
    pub(crate)
    fn path_string(&self) -> String {
        self.path.to_string()
    }

    /// Push a frame named `name` holding `value`.
    pub(crate)
    fn push<S: Into<String>>(&mut self, name: S, value: Cow<'a, Value>) {
        self.path.push(name, value);
    }

    /// Remove `num` frames. The root frame always stays.
    pub(crate)
    fn pop(&mut self, num: usize) -> Result<()> {
        self.path.pop(num)
    }

    /// How many frames remain visible to `sel`.
    fn target_depth(&self, sel: &Selector) -> Result<usize> {
        if sel.is_absolute() {
            Ok(1)
        }
        else {
            self.path.item_behind(sel.pops())?;
            Ok(self.depth() - sel.pops())
        }
    }

    /// The deepest range binding along `sel`'s path, as the index of the
    /// step it was bound for and its value.
    fn var_for(&self, depth: usize, sel: &Selector) -> Option<(usize, &Value)> {
        let path = sel.path();
        (0..path.len())
            .rev()
            .find_map(|idx| {
                self.vars
                    .get(&self.path.string_with(depth, &path[..=idx]))
                    .map(|var| (idx, var))
            })
    }

    /// Resolve `sel` without touching the stack.
    pub(crate)
    fn value_for(&self, sel: &Selector) -> Result<Cow<'a, Value>> {
        let depth = self.target_depth(sel)?;
        let start = self.path.item_behind(self.depth() - depth)?.value();
        let at = self.path.string_with::<&str>(depth, &[]);
        if sel.path().is_empty() {
            return Ok(start.clone());
        }

        match self.var_for(depth, sel) {
            Some((idx, var)) => {
                let var = Cow::Owned(var.clone());
                walk(&var, &at, idx + 1, &sel.path()[idx + 1..])
            },
            None => walk(start, &at, 0, sel.path()),
        }
    }

    /// Move the top of the stack to where `sel` points, pushing one frame
    /// per step. A step that names a range binding enters the binding.
    pub(crate)
    fn cd(&mut self, sel: &Selector) -> Result<()> {
        let depth = self.target_depth(sel)?;
        self.pop(self.depth() - depth)?;
        for (idx, step) in sel.path().iter().enumerate() {
            let next = match self.vars.get(&self.var_key(step)) {
                Some(var) => Cow::Owned(var.clone()),
                None => {
                    let at = self.path.to_string();
                    walk(self.path.last_value(), &at, idx, &[step])?
                },
            };
            self.push(step.clone(), next);
        }

        Ok(())
    }

    /// A snapshot of the stack to hand back to [`Context::restore`].
    pub(crate)
    fn dup(&self) -> Path<'a> {
        self.path.clone()
    }

    pub(crate)
    fn restore(&mut self, path: Path<'a>) {
        self.path = path;
    }

    /// Run `f` and put the stack back the way it was, whether or not `f`
    /// succeeded.
    pub(crate)
    fn scoped<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>
    {
        let saved = self.dup();
        let res = f(self);
        self.restore(saved);
        res
    }

    /// The key a range variable called `name` is bound under at the
    /// current frame.
    pub(crate)
    fn var_key(&self, name: &str) -> String {
        self.path.string_with(self.depth(), &[name])
    }

    /// Bind `value` under `key`, handing back the previous binding.
    pub(crate)
    fn set_var(&mut self, key: &str, value: Value) -> Option<Value> {
        self.vars.insert(key.to_owned(), value)
    }

    /// Put back what [`Context::set_var`] replaced.
    pub(crate)
    fn reset_var(&mut self, key: &str, previous: Option<Value>) {
        match previous {
            Some(value) => { self.vars.insert(key.to_owned(), value); },
            None => { self.vars.remove(key); },
        }
    }

    /// Temporary blocks win over the tree's own.
    pub(crate)
    fn block(&self, name: &str) -> Option<&'a Block> {
        self.overlay
            .and_then(|overlay| overlay.get(name))
            .or_else(|| self.blocks.get(name))
    }

    pub(crate)
    fn function(&self, name: &str) -> Option<&'a Function> {
        self.functions.get(name)
    }
}
