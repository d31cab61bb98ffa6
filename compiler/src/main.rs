//! evc: render an Evoke template to stdout.
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

mod builtins;


use {
    clap::Parser,
    evoke_core::{
        read_context,
        CompileOptions,
        Error,
        Result,
        Source,
        Template,
        Value,
    },
    log::info,
    std::{
        io::{
            stdout,
            Write,
        },
        path::PathBuf,
        process::exit as pexit,
    },
};

#[derive(Parser)]
#[command(name = "evc", version)]
#[command(about = "Render an Evoke template")]
struct Args {
    /// The base template
    template: PathBuf,

    /// A file whose blocks are attached to the template, may be repeated
    #[arg(short, long)]
    blocks: Vec<PathBuf>,

    /// A JSON file used as the root of the context
    #[arg(short, long)]
    context: Option<PathBuf>,

    /// Drop text consisting only of whitespace
    #[arg(short, long)]
    strip_whitespace: bool,

    /// Print the compiled tree instead of rendering it
    #[arg(long)]
    dump: bool,
}

fn run(args: Args) -> Result<()> {
    let opts = CompileOptions { strip_whitespace: args.strip_whitespace, };
    let mut tmpl = Template::with_options(&Source::read_file(&args.template)?, opts)?;
    for blocks in args.blocks.iter() {
        tmpl.blocks(blocks)?;
    }

    if args.dump {
        println!("{}", tmpl.tree());
        return Ok(());
    }

    builtins::register(tmpl.functions_mut());
    let root = match &args.context {
        Some(p) => read_context(p)?,
        None => Value::Nil,
    };

    info!("Rendering {:?}", args.template);
    let mut out = stdout().lock();
    tmpl.render_to(&mut out, &root, &[])?;
    out.flush().map_err(Error::Write)
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("{e}");
        pexit(1);
    }
}
