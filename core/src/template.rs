//! A compiled base template with attached blocks and host functions.
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
        block::Blocks,
        error::{
            Error,
            Result,
        },
        file::Source,
        function::{
            Function,
            Functions,
        },
        parser::{
            compile_with,
            CompileOptions,
        },
        tree::Tree,
        value::Value,
    },
    log::debug,
    std::{
        io::Write,
        path::Path,
    },
};

/// A base template plus everything attached to it.
///
/// ```
/// use evoke_core::{Function, Source, Template, Value};
///
/// let mut tmpl = Template::new(&Source::faux_source(
///     "base",
///     "{% evoke greeting .name %}",
/// )).unwrap();
/// tmpl.attach(&Source::faux_source(
///     "greeting",
///     "{% block greeting %}hello {% call upper . %}{% end block %}",
/// )).unwrap();
/// tmpl.call("upper", Function::with_arity(1, |args| {
///     Ok(Value::from(args[0].to_string().to_uppercase()))
/// }));
///
/// let ctx = Value::from(serde_json::json!({ "name": "world" }));
/// assert_eq!("hello WORLD", tmpl.render(&ctx).unwrap());
/// ```
#[derive(Debug, Clone)]
pub
struct Template {
    tree: Tree,
    functions: Functions,
    options: CompileOptions,
}

impl Template {
    /// Compile `source` as the base template.
    pub
    fn new(source: &Source) -> Result<Self> {
        Self::with_options(source, CompileOptions::default())
    }

    pub
    fn with_options(source: &Source, options: CompileOptions) -> Result<Self> {
        Ok(Self {
            tree: compile_with(source, &options)?,
            functions: Functions::new(),
            options,
        })
    }

    /// Read and compile the base template at `p`.
    pub
    fn read_file<P: AsRef<Path>>(p: P) -> Result<Self> {
        Self::new(&Source::read_file(p)?)
    }

    pub
    fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Read the file at `p` and attach its blocks.
    pub
    fn blocks<P: AsRef<Path>>(&mut self, p: P) -> Result<&mut Self> {
        self.attach(&Source::read_file(p)?)
    }

    /// Compile `source` and attach its blocks. A block already known to
    /// the template is an error and leaves the template unchanged.
    pub
    fn attach(&mut self, source: &Source) -> Result<&mut Self> {
        let tree = compile_with(source, &self.options)?;
        debug!("Attaching {} blocks from {}", tree.blocks().len(), source);
        self.tree.merge_blocks(tree.into_blocks())?;
        Ok(self)
    }

    /// Register a host function.
    pub
    fn call<S: Into<String>>(&mut self, name: S, f: Function) -> &mut Self {
        self.functions.insert(name, f);
        self
    }

    pub
    fn functions_mut(&mut self) -> &mut Functions {
        &mut self.functions
    }

    pub
    fn render(&self, root: &Value) -> Result<String> {
        self.tree.render_to_string(root, &self.functions)
    }

    /// Render into `w` with the blocks of `temporary` available for this
    /// render only.
    pub
    fn render_to<W: Write>(&self, w: &mut W, root: &Value, temporary: &[Source]) -> Result<()> {
        if temporary.is_empty() {
            return self.tree.render(w, root, &self.functions);
        }

        let mut overlay = Blocks::new();
        for source in temporary {
            let blocks = compile_with(source, &self.options)?.into_blocks();
            let mut dups = self.tree.blocks().duplicates(&blocks);
            dups.extend(overlay.duplicates(&blocks));
            if !dups.is_empty() {
                return Err(Error::DuplicateBlocks(dups));
            }
            overlay.merge(blocks)?;
        }
        debug!("Rendering {} with {} temporary blocks", self.tree.file().display(), overlay.len());

        self.tree.render_with(w, root, &self.functions, Some(&overlay))
    }
}
