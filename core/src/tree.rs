//! The execution tree produced by the parser and how it renders.
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
        context::Context,
        error::{
            Error,
            Result,
        },
        expr::{
            Expr,
            Selector,
        },
        file::Coordinate,
        function::Functions,
        value::Value,
    },
    log::trace,
    std::{
        fmt::{
            Display,
            Formatter,
            Result as FmtResult,
        },
        io::Write,
        mem::take,
        path::{
            Path,
            PathBuf,
        },
        result::Result as StdResult,
    },
};

/// Renders a block by name.
#[derive(Debug, Clone, PartialEq)]
pub
struct Evoke {
    name: String,
    context: Option<Selector>,
    coord: Coordinate,
}

impl Evoke {
    pub(crate)
    fn new(name: String, context: Option<Selector>, coord: Coordinate) -> Self {
        Self { name, context, coord, }
    }

    pub
    fn name(&self) -> &str {
        &self.name
    }

    pub
    fn context(&self) -> Option<&Selector> {
        self.context.as_ref()
    }

    pub
    fn coord(&self) -> Coordinate {
        self.coord
    }

    fn render(&self, w: &mut dyn Write, ctx: &mut Context<'_>) -> Result<()> {
        let block = ctx.block(&self.name).ok_or_else(|| Error::NoBlock(self.name.clone()))?;
        trace!("Evoking {} at {}", self.name, ctx.path_string());
        match self.context.as_ref().or(block.context()) {
            Some(sel) => ctx.scoped(|ctx| {
                ctx.cd(sel)?;
                block.render(w, ctx)
            }),
            None => block.render(w, ctx),
        }
    }
}

/// Renders its body with the context moved to a selector.
#[derive(Debug, Clone, PartialEq)]
pub
struct With {
    context: Selector,
    body: Sequence,
}

impl With {
    pub(crate)
    fn new(context: Selector, body: Sequence) -> Self {
        Self { context, body, }
    }

    pub
    fn context(&self) -> &Selector {
        &self.context
    }

    pub
    fn body(&self) -> &Sequence {
        &self.body
    }

    fn render(&self, w: &mut dyn Write, ctx: &mut Context<'_>) -> Result<()> {
        ctx.scoped(|ctx| {
            ctx.cd(&self.context)?;
            trace!("With {}", ctx.path_string());
            self.body.render(w, ctx)
        })
    }
}

/// Renders its body once per item of a mapping, sequence or record.
///
/// Each pass binds the item's key and value under the names given with
/// `as`. A `None` name was written `_` and is not bound.
#[derive(Debug, Clone, PartialEq)]
pub
struct Range {
    source: Expr,
    key: Option<String>,
    value: Option<String>,
    body: Sequence,
}

impl Range {
    pub(crate)
    fn new(source: Expr, key: Option<String>, value: Option<String>, body: Sequence) -> Self {
        Self { source, key, value, body, }
    }

    pub
    fn source(&self) -> &Expr {
        &self.source
    }

    pub
    fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub
    fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub
    fn body(&self) -> &Sequence {
        &self.body
    }

    fn pass(
        &self,
        w: &mut dyn Write,
        ctx: &mut Context<'_>,
        keys: &(Option<String>, Option<String>),
        key: Value,
        value: Value,
    ) -> Result<()> {
        if let Some(k) = &keys.0 {
            ctx.set_var(k, key);
        }
        if let Some(v) = &keys.1 {
            ctx.set_var(v, value);
        }

        self.body.render(w, ctx)
    }

    fn render(&self, w: &mut dyn Write, ctx: &mut Context<'_>) -> Result<()> {
        let source = self.source.compute(ctx)?;
        let keys = (
            self.key.as_ref().map(|k| ctx.var_key(k)),
            self.value.as_ref().map(|v| ctx.var_key(v)),
        );
        let saved = (
            keys.0.as_ref().and_then(|k| ctx.set_var(k, Value::Nil)),
            keys.1.as_ref().and_then(|v| ctx.set_var(v, Value::Nil)),
        );
        trace!("Ranging over {} at {}", self.source, ctx.path_string());

        let res = match source.as_ref() {
            Value::Map(map) => map.iter().try_for_each(|(k, v)| {
                self.pass(w, ctx, &keys, Value::from(k.as_str()), v.clone())
            }),
            Value::Seq(seq) => seq.iter().enumerate().try_for_each(|(i, v)| {
                self.pass(w, ctx, &keys, Value::from(i), v.clone())
            }),
            Value::Record(rec) => rec.fields().iter().enumerate().try_for_each(|(i, (_, v))| {
                self.pass(w, ctx, &keys, Value::from(i), v.clone())
            }),
            other => Err(Error::NotIterable(self.source.to_string(), other.shape())),
        };

        // reverse order, `as x x` saved the placeholder the first set left
        if let Some(v) = &keys.1 {
            ctx.reset_var(v, saved.1);
        }
        if let Some(k) = &keys.0 {
            ctx.reset_var(k, saved.0);
        }

        res
    }
}

/// Renders one of two branches depending on the truthiness of a value.
#[derive(Debug, Clone, PartialEq)]
pub
struct If {
    condition: Expr,
    success: Sequence,
    failure: Option<Sequence>,
}

impl If {
    pub(crate)
    fn new(condition: Expr, success: Sequence, failure: Option<Sequence>) -> Self {
        Self { condition, success, failure, }
    }

    pub
    fn condition(&self) -> &Expr {
        &self.condition
    }

    pub
    fn success(&self) -> &Sequence {
        &self.success
    }

    pub
    fn failure(&self) -> Option<&Sequence> {
        self.failure.as_ref()
    }

    /// The branch a constant condition always takes. `None` when the
    /// condition needs a context.
    fn into_constant_branch(self) -> StdResult<Option<Sequence>, Self> {
        match self.condition.constant_value() {
            Some(v) if v.is_truthy() => Ok(Some(self.success)),
            Some(_) => Ok(self.failure),
            None => Err(self),
        }
    }

    fn render(&self, w: &mut dyn Write, ctx: &mut Context<'_>) -> Result<()> {
        if self.condition.compute(ctx)?.is_truthy() {
            self.success.render(w, ctx)
        }
        else if let Some(failure) = &self.failure {
            failure.render(w, ctx)
        }
        else {
            Ok(())
        }
    }
}

/// A node of the execution tree.
#[derive(Debug, Clone, PartialEq)]
pub
enum Node {
    Sequence(Sequence),
    Literal(String),
    Value(Expr),
    Evoke(Evoke),
    With(With),
    Range(Range),
    If(If),
}

impl Node {
    fn render(&self, w: &mut dyn Write, ctx: &mut Context<'_>) -> Result<()> {
        match self {
            Self::Sequence(seq) => seq.render(w, ctx),
            Self::Literal(text) => w.write_all(text.as_bytes()).map_err(Error::Write),
            Self::Value(expr) => expr.render(w, ctx),
            Self::Evoke(evoke) => evoke.render(w, ctx),
            Self::With(with) => with.render(w, ctx),
            Self::Range(range) => range.render(w, ctx),
            Self::If(cond) => cond.render(w, ctx),
        }
    }
}

impl Display for Node {
    fn fmt(&self, fmtr: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Sequence(seq) => seq.fmt(fmtr),
            Self::Literal(text) => fmtr.write_fmt(format_args!("[literal {:?}]", text)),
            Self::Value(expr) => expr.fmt(fmtr),
            Self::Evoke(evoke) => {
                fmtr.write_fmt(format_args!("[evoke {}", evoke.name))?;
                if let Some(sel) = &evoke.context {
                    fmtr.write_fmt(format_args!(" [selector {}]", sel))?;
                }
                fmtr.write_str("]")
            },
            Self::With(with) => fmtr.write_fmt(format_args!(
                "[with [selector {}] {}]",
                with.context,
                with.body,
            )),
            Self::Range(range) => fmtr.write_fmt(format_args!(
                "[range {} as {} {} {}]",
                range.source,
                range.key.as_deref().unwrap_or("_"),
                range.value.as_deref().unwrap_or("_"),
                range.body,
            )),
            Self::If(cond) => {
                fmtr.write_fmt(format_args!("[if {} {}", cond.condition, cond.success))?;
                if let Some(failure) = &cond.failure {
                    fmtr.write_fmt(format_args!(" {}", failure))?;
                }
                fmtr.write_str("]")
            },
        }
    }
}

/// An ordered list of nodes rendered one after the other.
#[derive(Debug, Clone, Default, PartialEq)]
pub
struct Sequence {
    nodes: Vec<Node>,
}

impl From<Vec<Node>> for Sequence {
    fn from(nodes: Vec<Node>) -> Self {
        Self { nodes, }
    }
}

impl Sequence {
    pub
    fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub
    fn len(&self) -> usize {
        self.nodes.len()
    }

    pub
    fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Simplify this sequence in place.
    ///
    /// Ifs with constant conditions are replaced by the nodes of the branch
    /// they always take, constants become literals and neighbouring
    /// literals are joined. With `strip_whitespace` literals holding only
    /// whitespace are dropped. Children are expected to be compacted
    /// already.
    pub(crate)
    fn compact(&mut self, strip_whitespace: bool) {
        let mut out: Vec<Node> = Vec::with_capacity(self.nodes.len());
        for node in take(&mut self.nodes) {
            let spliced = match node {
                Node::If(cond) => match cond.into_constant_branch() {
                    Ok(branch) => branch.map(|b| b.nodes).unwrap_or_default(),
                    Err(cond) => vec![Node::If(cond)],
                },
                Node::Sequence(seq) => seq.nodes,
                Node::Value(expr) => match expr.constant_value() {
                    Some(v) => vec![Node::Literal(v.to_string())],
                    None => vec![Node::Value(expr)],
                },
                other => vec![other],
            };

            for node in spliced {
                if let (Some(Node::Literal(prev)), Node::Literal(text)) = (out.last_mut(), &node) {
                    prev.push_str(text);
                    continue;
                }
                out.push(node);
            }
        }

        if strip_whitespace {
            out.retain(|node| match node {
                Node::Literal(text) => !text.trim().is_empty(),
                _ => true,
            });
        }

        self.nodes = out;
    }

    pub(crate)
    fn render(&self, w: &mut dyn Write, ctx: &mut Context<'_>) -> Result<()> {
        self.nodes.iter().try_for_each(|node| node.render(w, ctx))
    }
}

impl Display for Sequence {
    fn fmt(&self, fmtr: &mut Formatter<'_>) -> FmtResult {
        fmtr.write_str("[list")?;
        for node in self.nodes.iter() {
            fmtr.write_fmt(format_args!(" {}", node))?;
        }
        fmtr.write_str("]")
    }
}

/// A compiled template: its top level sequence and the blocks it defined.
#[derive(Debug, Clone, PartialEq)]
pub
struct Tree {
    base: Sequence,
    blocks: Blocks,
    file: PathBuf,
}

impl Tree {
    pub(crate)
    fn new(base: Sequence, blocks: Blocks, file: PathBuf) -> Self {
        Self { base, blocks, file, }
    }

    pub
    fn base(&self) -> &Sequence {
        &self.base
    }

    pub
    fn blocks(&self) -> &Blocks {
        &self.blocks
    }

    pub
    fn into_blocks(self) -> Blocks {
        self.blocks
    }

    /// The source the tree was compiled from.
    pub
    fn file(&self) -> &Path {
        &self.file
    }

    /// Add the blocks of another compiled source.
    pub
    fn merge_blocks(&mut self, blocks: Blocks) -> Result<()> {
        self.blocks.merge(blocks)
    }

    /// Render the base sequence with `root` as the context.
    pub
    fn render<W: Write>(&self, w: &mut W, root: &Value, functions: &Functions) -> Result<()> {
        self.render_with(w, root, functions, None)
    }

    /// Render with `overlay` blocks taking precedence over the tree's own
    /// for this render only.
    pub
    fn render_with<W: Write>(
        &self,
        w: &mut W,
        root: &Value,
        functions: &Functions,
        overlay: Option<&Blocks>,
    ) -> Result<()> {
        let mut ctx = Context::new(root, &self.blocks, overlay, functions);
        self.base.render(w, &mut ctx)
    }

    pub
    fn render_to_string(&self, root: &Value, functions: &Functions) -> Result<String> {
        let mut out = Vec::new();
        self.render(&mut out, root, functions)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

impl Display for Tree {
    fn fmt(&self, fmtr: &mut Formatter<'_>) -> FmtResult {
        fmtr.write_fmt(format_args!("{}\n{}", self.base, self.blocks))
    }
}
