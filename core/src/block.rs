//! Named blocks and the registry they are collected into.
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
            Duplicate,
            Error,
            Result,
        },
        expr::Selector,
        file::Coordinate,
        tree::Sequence,
    },
    std::{
        collections::BTreeMap,
        fmt::{
            Display,
            Formatter,
            Result as FmtResult,
        },
        io::Write,
        path::{
            Path,
            PathBuf,
        },
    },
};

/// A reusable sub-template defined with `{% block name %}` and rendered
/// wherever it is evoked.
#[derive(Debug, Clone, PartialEq)]
pub
struct Block {
    name: String,
    context: Option<Selector>,
    body: Sequence,
    coord: Coordinate,
    file: PathBuf,
}

impl Block {
    pub(crate)
    fn new(
        name: String,
        context: Option<Selector>,
        body: Sequence,
        coord: Coordinate,
        file: PathBuf,
    ) -> Self {
        Self { name, context, body, coord, file, }
    }

    pub
    fn name(&self) -> &str {
        &self.name
    }

    /// The selector the block renders under when an evoke gives none.
    pub
    fn context(&self) -> Option<&Selector> {
        self.context.as_ref()
    }

    pub
    fn body(&self) -> &Sequence {
        &self.body
    }

    pub
    fn coord(&self) -> Coordinate {
        self.coord
    }

    /// The source the block was defined in.
    pub
    fn file(&self) -> &Path {
        &self.file
    }

    pub(crate)
    fn render(&self, w: &mut dyn Write, ctx: &mut Context<'_>) -> Result<()> {
        self.body.render(w, ctx)
    }
}

/// Blocks by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub
struct Blocks {
    map: BTreeMap<String, Block>,
}

impl Blocks {
    pub
    fn new() -> Self {
        Self::default()
    }

    pub
    fn get(&self, name: &str) -> Option<&Block> {
        self.map.get(name)
    }

    pub
    fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub
    fn len(&self) -> usize {
        self.map.len()
    }

    pub
    fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub
    fn iter(&self) -> impl Iterator<Item = &Block> {
        self.map.values()
    }

    /// Add a block found while parsing a single source.
    pub(crate)
    fn define(&mut self, block: Block) -> Result<()> {
        if let Some(existing) = self.map.get(&block.name) {
            return Err(Error::BlockRedefined(
                block.name.clone(),
                existing.coord,
                block.coord,
            ));
        }

        self.map.insert(block.name.clone(), block);
        Ok(())
    }

    /// Every name `other` shares with this registry.
    pub
    fn duplicates(&self, other: &Blocks) -> Vec<Duplicate> {
        other.iter()
            .filter_map(|incoming| self.get(&incoming.name).map(|existing| Duplicate {
                name: incoming.name.clone(),
                existing: existing.file.clone(),
                incoming: incoming.file.clone(),
            }))
            .collect()
    }

    /// Take every block of `other`. Nothing is taken if any name is
    /// already present.
    pub
    fn merge(&mut self, other: Blocks) -> Result<()> {
        let dups = self.duplicates(&other);
        if !dups.is_empty() {
            return Err(Error::DuplicateBlocks(dups));
        }

        self.map.extend(other.map);
        Ok(())
    }
}

impl Display for Blocks {
    fn fmt(&self, fmtr: &mut Formatter<'_>) -> FmtResult {
        for block in self.iter() {
            fmtr.write_fmt(format_args!("[block {}", block.name))?;
            if let Some(sel) = &block.context {
                fmtr.write_fmt(format_args!(" [selector {}]", sel))?;
            }
            fmtr.write_fmt(format_args!(" {}]\n", block.body))?;
        }

        Ok(())
    }
}
