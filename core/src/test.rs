//! Tests for the Evoke Templating Engine.
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
        file::{
            read_context,
            Coordinate,
            Source,
        },
        function::{
            Function,
            Functions,
        },
        lexer::lex,
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
            Node,
            Tree,
        },
        value::{
            to_value,
            Record,
            Shape,
            Value,
        },
    },
    serde::Serialize,
    serde_json::{
        json,
        Value as JsonValue,
    },
    std::{
        borrow::Cow,
        collections::BTreeMap,
    },
};

fn kinds(src: &str) -> Vec<TokenKind> {
    lex(src).map(|t| t.kind()).collect()
}

fn render(src: &str, ctx: JsonValue) -> Result<String> {
    compile(src)?.render_to_string(&Value::from(ctx), &Functions::new())
}

fn render_with(src: &str, ctx: JsonValue, functions: &Functions) -> Result<String> {
    compile(src)?.render_to_string(&Value::from(ctx), functions)
}

fn selector(src: &str) -> Result<Selector> {
    let tree = compile(&format!("{{% {} %}}", src))?;
    match tree.base().nodes() {
        [Node::Value(Expr::Selector(sel))] => Ok(sel.clone()),
        other => panic!("Expected a single selector, got {:?}", other),
    }
}

fn selector_of(s: &str) -> Selector {
    let mut toks = Vec::new();
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        let kind = match c {
            '.' => TokenKind::Push,
            '$' => TokenKind::Pop,
            '/' => TokenKind::Root,
            _ => {
                let mut ident = String::from(c);
                while let Some(n) = chars.peek().filter(|n| n.is_alphanumeric()) {
                    ident.push(*n);
                    chars.next();
                }
                toks.push(Token::new(TokenKind::Ident, ident, Coordinate::default()));
                continue;
            },
        };
        toks.push(Token::new(kind, c.to_string(), Coordinate::default()));
    }

    Selector::from_tokens(&toks, Coordinate::default()).unwrap()
}

fn stripped(src: &str) -> Tree {
    let opts = CompileOptions { strip_whitespace: true, };
    compile_with(&Source::faux_source("stripped", src), &opts).unwrap()
}

fn functions() -> Functions {
    let mut functions = Functions::new();
    functions.insert("upper", Function::with_arity(1, |args| {
        Ok(Value::from(args[0].to_string().to_uppercase()))
    }));
    functions.insert("join", Function::new(|args| {
        Ok(Value::from(args.iter().map(|a| a.to_string()).collect::<Vec<String>>().join("-")))
    }));
    functions.insert("list", Function::with_arity(0, |_| {
        Ok(Value::from(vec!["a", "b"]))
    }));
    functions.insert("fail", Function::new(|_| Err("always fails".to_owned())));
    functions
}

#[test]
fn lex_1() {
    use TokenKind::*;
    assert_eq!(
        vec![ Literal, Open, StartSel, Push, Ident, EndSel, Close, Literal, Eof, ],
        kinds("foo {% .bar %} baz"),
    );
}

#[test]
fn lex_2() {
    use TokenKind::*;
    assert_eq!(
        vec![
            Open, Range, StartSel, Pop, Pop, Push, Ident, Push, Ident, EndSel,
            As, Ident, Ident, Close, Eof,
        ],
        kinds("{% range $$.foo.bar as k v %}"),
    );
    assert_eq!(
        vec![ Open, Call, Ident, Value, Numeric, Numeric, StartSel, Root, Push, EndSel, Close, Eof, ],
        kinds("{% call fn \"str\" 12 -1.5e3 /.%}"),
    );
}

#[test]
fn lex_3() {
    for src in [ "{##}", "{###}", "{#}#}", "{#}foo{#}", "a{# b #}c", ] {
        assert!(
            !kinds(src).contains(&TokenKind::Error),
            "{:?} should lex",
            src,
        );
    }

    for src in [ "{#}", "{#", "{%}", "{% .foo", "{% \"foo %}", "{% ! %}", "{% .f!o %}", ] {
        assert_eq!(
            Some(&TokenKind::Error),
            kinds(src).last(),
            "{:?} should not lex",
            src,
        );
    }
}

#[test]
fn lex_4() {
    // keywords only match whole words
    use TokenKind::*;
    assert_eq!(
        vec![ Open, Ident, Close, Open, Block, Ident, Close, Eof, ],
        kinds("{% blocker %}{% block ender %}"),
    );
}

#[test]
fn lex_5() {
    let mut lexer = lex("a\n  {% .b %}");
    let literal = lexer.next_token();
    assert_eq!("a\n  ", literal.text());
    let open = lexer.next_token();
    assert_eq!(TokenKind::Open, open.kind());
    assert_eq!(1, open.coord().line());
    assert_eq!(2, open.coord().position());

    let mut last = lexer.next_token();
    while !last.kind().is_terminal() {
        last = lexer.next_token();
    }
    // the terminal token repeats
    assert_eq!(last, lexer.next_token());
    assert_eq!(last, lexer.next_token());

    assert_eq!(2, lex("plain").count());
}

#[test]
fn lex_6() {
    let toks = lex("{% \"quoted value\" %}").collect::<Vec<_>>();
    assert_eq!(TokenKind::Value, toks[1].kind());
    assert_eq!("quoted value", toks[1].text());
}

#[test]
fn parse_1() {
    let tree = compile("a{% .b %}c").unwrap();
    assert_eq!(
        "[list [literal \"a\"] [selector .b] [literal \"c\"]]",
        tree.base().to_string(),
    );
}

#[test]
fn parse_2() {
    let tree = compile(concat!(
        "{% with .a %}{% range .b as _ v %}{% .v %}{% end range %}{% end with %}",
        "{% if call f .x 1 %}y{% else %}n{% end if %}",
    )).unwrap();
    assert_eq!(
        concat!(
            "[list [with [selector .a] [list [range [selector .b] as _ v [list [selector .v]]]]]",
            " [if [call f [selector .x] [int 1]] [list [literal \"y\"]] [list [literal \"n\"]]]]",
        ),
        tree.base().to_string(),
    );
}

#[test]
fn parse_3() {
    // the statement itself renders nothing; the body goes to the registry
    let tree = compile("a{% block foo .ctx %}body{% end block %}b").unwrap();
    assert_eq!(1, tree.base().len());
    let block = tree.blocks().get("foo").unwrap();
    assert_eq!("foo", block.name());
    assert_eq!(".ctx", block.context().unwrap().to_string());
    assert_eq!("[list [literal \"body\"]]", block.body().to_string());
}

#[test]
#[should_panic]
fn parse_4() {
    compile("{% end %}").unwrap();
}

#[test]
#[should_panic]
fn parse_5() {
    compile("{% end block %}").unwrap();
}

#[test]
#[should_panic]
fn parse_6() {
    compile("{% block %}").unwrap();
}

#[test]
#[should_panic]
fn parse_7() {
    compile("{% range .foo as bar %}{% end range %}").unwrap();
}

#[test]
#[should_panic]
fn parse_8() {
    compile("{% foo %}").unwrap();
}

#[test]
fn parse_9() {
    for src in [ "{%%}", "{% %}", "{%\n%}", ] {
        assert!(matches!(compile(src), Err(Error::EmptyAction(_))), "{:?}", src);
    }
}

#[test]
fn parse_10() {
    match compile("{% else %}") {
        Err(Error::ElseOutsideIf(c)) => assert_eq!(3, c.position()),
        other => panic!("Expected ElseOutsideIf, got {:?}", other),
    }

    // an else must belong to the innermost context
    assert!(matches!(
        compile("{% if .a %}{% with .b %}{% else %}{% end with %}{% end if %}"),
        Err(Error::ElseOutsideIf(_)),
    ));

    match compile("{% if .a %}a{% else %}b{% else %}c{% end if %}") {
        Err(Error::Unexpected(tok)) => assert_eq!(TokenKind::Else, tok.kind()),
        other => panic!("Expected Unexpected, got {:?}", other),
    }
}

#[test]
fn parse_11() {
    match compile("{% block foo %}never ends") {
        Err(Error::UnexpectedEof(TokenKind::Block, c)) => assert_eq!(3, c.position()),
        other => panic!("Expected UnexpectedEof, got {:?}", other),
    }
    assert!(matches!(
        compile("{% if . %}"),
        Err(Error::UnexpectedEof(TokenKind::If, _)),
    ));
    assert!(matches!(
        compile("{% with . %}{% range . %}{% end range %}"),
        Err(Error::UnexpectedEof(TokenKind::With, _)),
    ));
    match compile("{% if . %}{% end with %}") {
        Err(Error::Expected(TokenKind::If, tok)) => assert_eq!(TokenKind::With, tok.kind()),
        other => panic!("Expected Expected, got {:?}", other),
    }
}

#[test]
fn parse_12() {
    match compile("{% block a %}{% block b %}{% end block %}{% end block %}") {
        Err(Error::NestedBlock(inner, outer, _)) => {
            assert_eq!("b", inner);
            assert_eq!("a", outer);
        },
        other => panic!("Expected NestedBlock, got {:?}", other),
    }

    assert!(matches!(
        compile(concat!(
            "{% block a %}{% with . %}{% block b %}{% end block %}{% end with %}",
            "{% end block %}",
        )),
        Err(Error::NestedBlock(_, _, _)),
    ));
}

#[test]
fn parse_13() {
    match compile("{% block a %}{% end block %}{% block a %}{% end block %}") {
        Err(Error::BlockRedefined(name, first, second)) => {
            assert_eq!("a", name);
            assert_eq!(3, first.position());
            assert_eq!(31, second.position());
        },
        other => panic!("Expected BlockRedefined, got {:?}", other),
    }
}

#[test]
fn parse_14() {
    assert!(matches!(
        compile("{% with \"foo\" %}{% end with %}"),
        Err(Error::ExpectedSelector(tag, _)) if tag == "with",
    ));
    assert!(matches!(
        compile("{% evoke foo 1 %}"),
        Err(Error::ExpectedSelector(tag, _)) if tag == "evoke",
    ));
    assert!(matches!(
        compile("{% block foo call f %}{% end block %}"),
        Err(Error::ExpectedSelector(tag, _)) if tag == "block",
    ));
    assert!(matches!(
        compile("{% range \"foo\" %}{% end range %}"),
        Err(Error::ExpectedIterable(_)),
    ));
    assert!(compile("{% range call list %}{% end range %}").is_ok());
}

#[test]
fn parse_15() {
    for src in [ "{% 1e %}", "{% - %}", "{% 1.2.3 %}", ] {
        assert!(
            matches!(compile(src), Err(Error::IllegalNumber(_, _) | Error::Expected(_, _))),
            "{:?}",
            src,
        );
    }
    assert!(matches!(compile("{% 1e %}"), Err(Error::IllegalNumber(n, _)) if n == "1e"));

    let tree = compile("{% if 12 %}{% end if %}{% if -1.5e2 %}{% end if %}").unwrap();
    assert!(tree.base().is_empty());
}

#[test]
fn parse_16() {
    // lexical errors surface through compilation
    match compile("text {% \"open") {
        Err(Error::Lex(msg, _)) => assert_eq!("unterminated string", msg),
        other => panic!("Expected Lex, got {:?}", other),
    }
}

#[test]
fn selector_1() {
    let sel = selector(".foo.bar").unwrap();
    assert!(!sel.is_absolute());
    assert_eq!(0, sel.pops());
    assert_eq!(&[ "foo", "bar", ], sel.path());

    let sel = selector("/.foo.bar").unwrap();
    assert!(sel.is_absolute());
    assert_eq!(0, sel.pops());
    assert_eq!(&[ "foo", "bar", ], sel.path());

    let sel = selector("$$.foo.bar").unwrap();
    assert!(!sel.is_absolute());
    assert_eq!(2, sel.pops());
    assert_eq!(&[ "foo", "bar", ], sel.path());
}

#[test]
fn selector_2() {
    let sel = selector("$.").unwrap();
    assert_eq!(1, sel.pops());
    assert!(sel.path().is_empty());

    let sel = selector("/.").unwrap();
    assert!(sel.is_absolute());
    assert!(sel.path().is_empty());

    let sel = selector(".").unwrap();
    assert!(!sel.is_absolute());
    assert_eq!(0, sel.pops());
    assert!(sel.path().is_empty());
    assert_eq!(".", sel.to_string());
}

#[test]
fn selector_3() {
    for src in [ ".foo$.bar", ".foo/.bar", ".foo..bar", "/$.foo", "$/.foo", "/", "$", "$foo", ".foo.", "..", ] {
        assert!(
            matches!(selector(src), Err(Error::IllegalSelector(_, _))),
            "{:?} should not parse",
            src,
        );
    }
}

#[test]
fn render_1() {
    assert_eq!("just text", render("just text", json!(null)).unwrap());
    assert_eq!("", render("", json!(null)).unwrap());
    assert_eq!("ab", render("a{# ignored #}b", json!(null)).unwrap());
}

#[test]
fn render_2() {
    let ctx = json!({ "foo": { "bar": { "baz": { "bif": 0 } } } });
    assert_eq!(
        "0000",
        render(
            "{% with .foo.bar.baz.bif %}{% . %}{% $.bif %}{% $$.baz.bif %}{% $$$.bar.baz.bif %}{% end with %}",
            ctx,
        ).unwrap(),
    );
}

#[test]
fn render_3() {
    let ctx = json!({ "a": { "b": "inner" }, "c": "outer" });
    assert_eq!(
        "inner outer outer",
        render("{% with .a %}{% .b %} {% /.c %}{% end with %} {% .c %}", ctx).unwrap(),
    );
}

#[test]
fn render_4() {
    let ctx = json!({ "foo": {} });
    assert!(matches!(render("{% $.foo %}", json!({})), Err(Error::CannotPop(_, 1))));
    assert!(matches!(
        render("{% with . %}{% $.foo %}{% end with %}", json!({})),
        Err(Error::CannotPop(_, 1)),
    ));
    assert!(matches!(
        render("{% with .foo %}{% $$.foo %}{% end with %}", ctx),
        Err(Error::CannotPop(_, 2)),
    ));
}

#[test]
fn render_5() {
    match render("{% .a.b %}", json!({ "a": { "c": 1 } })) {
        Err(Error::ValueNotFound(path, idx, key)) => {
            assert_eq!("/", path);
            assert_eq!(1, idx);
            assert_eq!("b", key);
        },
        other => panic!("Expected ValueNotFound, got {:?}", other),
    }

    match render("{% .a.b %}", json!({ "a": [1] })) {
        Err(Error::NotAccessible(_, key, shape)) => {
            assert_eq!("b", key);
            assert_eq!(Shape::Sequence, shape);
        },
        other => panic!("Expected NotAccessible, got {:?}", other),
    }
}

#[test]
fn render_6() {
    let ctx = json!({
        "int": 3,
        "float": 1.5,
        "yes": true,
        "none": null,
        "list": [1, "two"],
        "map": { "a": 1 },
    });
    assert_eq!(
        "3|1.5|true||[1,\"two\"]|{\"a\":1}",
        render("{% .int %}|{% .float %}|{% .yes %}|{% .none %}|{% .list %}|{% .map %}", ctx).unwrap(),
    );
    assert_eq!("foo121.5", render("{% \"foo\" %}{% 12 %}{% 1.5 %}", json!(null)).unwrap());
}

#[test]
fn render_7() {
    let ctx = json!({ "foo": { "bar": { "baz": "bif" } } });
    assert_eq!(
        "bif bif bif bif bif",
        render(
            "{% with .foo.bar.baz %}{% . %} {% $.baz %} {% $$.bar.baz %} {% $$$.foo.bar.baz %} {% /.foo.bar.baz %}{% end with %}",
            ctx,
        ).unwrap(),
    );
}

#[test]
fn render_8() {
    let tree = compile("{% range .l %}{% .val %}{% end range %}{% with .m %}{% .a %}{% end with %}").unwrap();
    let root = Value::from(json!({ "l": [1, 2], "m": { "a": "x" } }));
    let functions = Functions::new();
    let first = tree.render_to_string(&root, &functions).unwrap();
    assert_eq!("12x", first);
    assert_eq!(first, tree.render_to_string(&root, &functions).unwrap());
}

#[test]
fn range_1() {
    let src = "{% range .list as k v %}{% .k %}{% .v %}{% end range %}";
    assert_eq!("001122", render(src, json!({ "list": [0, 1, 2] })).unwrap());
    assert_eq!("0foo1bar2baz", render(src, json!({ "list": ["foo", "bar", "baz"] })).unwrap());
    assert_eq!("foobar", render(src, json!({ "list": { "foo": "bar" } })).unwrap());
    assert_eq!("", render(src, json!({ "list": [] })).unwrap());
}

#[test]
fn range_2() {
    // mappings iterate in key order
    assert_eq!(
        "a=2;b=1;c=3;",
        render(
            "{% range . %}{% .key %}={% .val %};{% end range %}",
            json!({ "b": 1, "a": 2, "c": 3 }),
        ).unwrap(),
    );
}

#[test]
fn range_3() {
    #[derive(Serialize)]
    struct Page {
        title: &'static str,
        body: &'static str,
    }

    let root = to_value(&Page { title: "T", body: "B", }).unwrap();
    let tree = compile("{% range . as k v %}{% .k %}{% .v %}{% end range %}").unwrap();
    assert_eq!("0T1B", tree.render_to_string(&root, &Functions::new()).unwrap());
}

#[test]
fn range_4() {
    let ctx = json!({ "list": [1, 2], "v": "ctx", "k": "key" });
    assert_eq!(
        "12ctx",
        render("{% range .list as _ v %}{% .v %}{% end range %}{% .v %}", ctx.clone()).unwrap(),
    );
    // a discarded name is not bound
    assert_eq!(
        "keykey",
        render("{% range .list as _ v %}{% .k %}{% end range %}", ctx).unwrap(),
    );
}

#[test]
fn range_5() {
    let ctx = json!({ "a": [1, 2], "b": ["x", "y"] });
    assert_eq!(
        "xy1xy2",
        render(
            "{% range .a as k v %}{% range /.b as k v %}{% .v %}{% end range %}{% .v %}{% end range %}",
            ctx,
        ).unwrap(),
    );
}

#[test]
fn range_6() {
    let ctx = json!({ "outer": { "items": ["a", "b"] } });
    assert_eq!(
        "ab",
        render(
            "{% with .outer %}{% range .items as i item %}{% .item %}{% end range %}{% end with %}",
            ctx,
        ).unwrap(),
    );
}

#[test]
fn range_7() {
    // the first failing pass stops the range
    let tree = compile("{% range .list %}{% .val.x %}{% end range %}").unwrap();
    let root = Value::from(json!({ "list": [{ "x": 1 }, 2, { "x": 3 }] }));
    let mut out = Vec::new();
    let res = tree.render(&mut out, &root, &Functions::new());
    assert!(matches!(res, Err(Error::NotAccessible(_, _, Shape::Scalar))));
    assert_eq!(b"1".to_vec(), out);
}

#[test]
fn range_8() {
    match render("{% range .s %}{% end range %}", json!({ "s": "string" })) {
        Err(Error::NotIterable(what, shape)) => {
            assert_eq!("[selector .s]", what);
            assert_eq!(Shape::Scalar, shape);
        },
        other => panic!("Expected NotIterable, got {:?}", other),
    }
}

#[test]
fn range_9() {
    let mut record = Record::new("Point");
    record.push("x", 1);
    record.push("y", 2);
    let mut map = BTreeMap::new();
    map.insert("point", Value::from(record));
    let root = Value::from(map);
    let tree = compile("{% range .point as _ v %}{% .v %}{% end range %}{% .point.y %}").unwrap();
    assert_eq!("122", tree.render_to_string(&root, &Functions::new()).unwrap());
}

#[test]
fn range_10() {
    // every spelling of a bound location reaches the binding
    let ctx = json!({ "a": { "b": { "list": ["x"] } } });
    let forms = [ ".v", "$.b.v", "$$.a.b.v", "/.a.b.v" ];
    for form in forms {
        let src = format!(
            "{{% with .a.b %}}{{% range .list as k v %}}{{% {} %}}{{% end range %}}{{% end with %}}",
            form,
        );
        assert_eq!("x", render(&src, ctx.clone()).unwrap(), "form {}", form);
    }

    // and stepping into one through with
    let ctx = json!({ "a": { "list": [{ "n": "y" }] } });
    assert_eq!(
        "yy",
        render(
            "{% with .a %}{% range .list as k v %}{% /.a.v.n %}{% with /.a.v %}{% .n %}{% end with %}{% end range %}{% end with %}",
            ctx,
        ).unwrap(),
    );
}

#[test]
fn range_11() {
    let ctx = json!({ "list": [1, 2], "x": "outer" });
    assert_eq!(
        "12[outer]",
        render("{% range .list as x x %}{% .x %}{% end range %}[{% .x %}]", ctx).unwrap(),
    );
}

#[test]
fn if_1() {
    let src = "{% if .v %}t{% else %}f{% end if %}";
    let table = [
        (json!(null), "f"),
        (json!(false), "f"),
        (json!(true), "t"),
        (json!(0), "f"),
        (json!(1), "t"),
        (json!(-1), "t"),
        (json!(0.0), "f"),
        (json!(0.5), "t"),
        (json!(""), "f"),
        (json!("x"), "t"),
        (json!([]), "f"),
        (json!([0]), "t"),
        (json!({}), "f"),
        (json!({ "a": 0 }), "t"),
    ];
    for (v, expected) in table {
        assert_eq!(
            expected,
            render(src, json!({ "v": v.clone() })).unwrap(),
            "truthiness of {}",
            v,
        );
    }

    let root = Value::from(Record::new("Empty"));
    let tree = compile("{% if . %}t{% end if %}").unwrap();
    assert_eq!("t", tree.render_to_string(&root, &Functions::new()).unwrap());
}

#[test]
fn if_2() {
    // a missing key is an error, not a false condition
    assert!(matches!(
        render("{% if .missing %}t{% end if %}", json!({})),
        Err(Error::ValueNotFound(_, 0, _)),
    ));
    assert_eq!("", render("{% if .v %}t{% end if %}", json!({ "v": 0 })).unwrap());
}

#[test]
fn if_3() {
    let ctx = json!({ "a": 1, "b": 0 });
    assert_eq!(
        "ab!",
        render(
            "{% if .a %}a{% if .b %}x{% else %}b{% end if %}{% end if %}{% if .b %}{% else %}!{% end if %}",
            ctx,
        ).unwrap(),
    );
}

#[test]
fn compact_1() {
    let tree = compile("1{% if \"x\" %}a{% else %}b{% end if %}2").unwrap();
    assert_eq!(&[ Node::Literal("1a2".to_owned()), ], tree.base().nodes());

    let tree = compile("1{% if 0 %}a{% else %}b{% end if %}2").unwrap();
    assert_eq!(&[ Node::Literal("1b2".to_owned()), ], tree.base().nodes());

    let tree = compile("{% if \"\" %}a{% end if %}").unwrap();
    assert!(tree.base().is_empty());

    let tree = compile("{% if .a %}a{% end if %}").unwrap();
    assert!(matches!(tree.base().nodes(), [ Node::If(_) ]));
}

#[test]
fn compact_2() {
    let tree = compile("foo{% \"bar\" %}baz{% 2 %}{% .x %}q{% 1.5 %}").unwrap();
    let nodes = tree.base().nodes();
    assert_eq!(3, nodes.len());
    assert_eq!(Node::Literal("foobarbaz2".to_owned()), nodes[0]);
    assert!(matches!(nodes[1], Node::Value(Expr::Selector(_))));
    assert_eq!(Node::Literal("q1.5".to_owned()), nodes[2]);
}

#[test]
fn compact_3() {
    // constant branches inside a with are folded before the with is built
    let tree = compile("{% with .a %}x{% if 1 %}y{% end if %}z{% end with %}").unwrap();
    match tree.base().nodes() {
        [ Node::With(with) ] => assert_eq!(
            &[ Node::Literal("xyz".to_owned()), ],
            with.body().nodes(),
        ),
        other => panic!("Expected a with, got {:?}", other),
    }
}

#[test]
fn compact_4() {
    let src = " {% .a %}\t{% .b %}\r\n{% .c %} x ";
    let tree = stripped(src);
    let nodes = tree.base().nodes();
    assert_eq!(4, nodes.len());
    assert_eq!(Node::Literal(" x ".to_owned()), nodes[3]);

    let tree = compile(src).unwrap();
    assert_eq!(7, tree.base().len());
}

#[test]
fn compact_5() {
    // whitespace left next to a folded branch merges before stripping
    let tree = stripped("{% block foo %}\n  {% if 1 %}  {% end if %}\n{% end block %}");
    assert!(tree.blocks().get("foo").unwrap().body().is_empty());

    let ctx = json!({ "a": "A" });
    let tree = stripped("\n{% .a %}\n\n{% .a %}\n");
    assert_eq!("AA", tree.render_to_string(&Value::from(ctx), &Functions::new()).unwrap());
}

#[test]
fn evoke_1() {
    // blocks may be evoked before they are defined
    assert_eq!(
        "bar",
        render("{% evoke foo %}{% block foo %}bar{% end block %}", json!(null)).unwrap(),
    );
}

#[test]
fn evoke_2() {
    let ctx = json!({ "a": { "b": "x" }, "c": "y" });
    assert_eq!(
        "xy",
        render("{% block foo %}{% .b %}{% end block %}{% evoke foo .a %}{% .c %}", ctx).unwrap(),
    );
}

#[test]
fn evoke_3() {
    let ctx = json!({ "a": { "b": "x" }, "z": { "b": "z" } });
    let src = "{% block foo .a %}{% .b %}{% end block %}{% evoke foo %}{% evoke foo .z %}";
    assert_eq!("xz", render(src, ctx).unwrap());
}

#[test]
fn evoke_4() {
    assert!(matches!(
        render("{% evoke nope %}", json!(null)),
        Err(Error::NoBlock(name)) if name == "nope",
    ));
}

#[test]
fn evoke_5() {
    // errors inside a block name the location it was evoked at
    let ctx = json!({ "a": {} });
    assert!(matches!(
        render("{% block foo %}{% .missing %}{% end block %}{% evoke foo .a %}", ctx),
        Err(Error::ValueNotFound(path, _, _)) if path == "/.a",
    ));
}

#[test]
fn evoke_6() {
    let ctx = json!({ "items": [{ "n": 1 }, { "n": 2 }] });
    assert_eq!(
        "<1><2>",
        render(
            "{% block item %}<{% .n %}>{% end block %}{% range .items %}{% evoke item .val %}{% end range %}",
            ctx,
        ).unwrap(),
    );
}

#[test]
fn call_1() {
    let ctx = json!({ "name": "world" });
    assert_eq!(
        "WORLD a-1-x",
        render_with(
            "{% call upper .name %} {% call join \"a\" 1 \"x\" %}",
            ctx,
            &functions(),
        ).unwrap(),
    );
}

#[test]
fn call_2() {
    assert_eq!(
        "0a1b",
        render_with("{% range call list %}{% .key %}{% .val %}{% end range %}", json!(null), &functions()).unwrap(),
    );
    assert_eq!(
        "yes",
        render_with("{% if call list %}yes{% end if %}", json!(null), &functions()).unwrap(),
    );
}

#[test]
fn call_3() {
    let fns = functions();
    assert!(matches!(
        render_with("{% call upper \"a\" \"b\" %}", json!(null), &fns),
        Err(Error::Arity(name, 1, 2)) if name == "upper",
    ));
    assert!(matches!(
        render_with("{% call missing %}", json!(null), &fns),
        Err(Error::NoFunction(name)) if name == "missing",
    ));
    assert!(matches!(
        render_with("{% call fail %}", json!(null), &fns),
        Err(Error::Call(name, msg)) if name == "fail" && msg == "always fails",
    ));
    // missing functions only fail when reached
    assert_eq!("", render_with("{% if 0 %}{% call missing %}{% end if %}", json!(null), &fns).unwrap());
}

#[test]
fn value_1() {
    #[derive(Serialize)]
    enum Kind {
        Post,
    }

    #[derive(Serialize)]
    struct Page {
        title: String,
        tags: Vec<&'static str>,
        kind: Kind,
        draft: Option<bool>,
        counts: BTreeMap<u8, u8>,
    }

    let mut counts = BTreeMap::new();
    counts.insert(1, 2);
    let page = to_value(&Page {
        title: "Home".to_owned(),
        tags: vec!["a", "b"],
        kind: Kind::Post,
        draft: None,
        counts,
    }).unwrap();

    match &page {
        Value::Record(rec) => {
            assert_eq!("Page", rec.name());
            let names = rec.fields().iter().map(|(n, _)| n.as_str()).collect::<Vec<&str>>();
            assert_eq!(vec![ "title", "tags", "kind", "draft", "counts", ], names);
        },
        other => panic!("Expected a record, got {:?}", other),
    }
    assert_eq!(Some(&Value::from("Post")), page.access("kind").unwrap());
    assert_eq!(Some(&Value::Nil), page.access("draft").unwrap());
    assert_eq!(Some(2), page.access("tags").unwrap().and_then(|t| t.len()));
    assert_eq!(
        Some(&Value::Int(2)),
        page.access("counts").unwrap().unwrap().access("1").unwrap(),
    );
    assert_eq!(Err(Shape::Scalar), Value::from("x").access("y"));
}

#[test]
fn value_2() {
    assert!(matches!(to_value(&u64::MAX), Err(Error::Serialize(_))));
    assert_eq!(Value::Int(7), to_value(&7u64).unwrap());
    assert_eq!(Value::from(vec![1, 2]), to_value(&(1, 2)).unwrap());
}

#[test]
fn value_3() {
    let table = [
        (1.5, "1.5"),
        (-0.25, "-0.25"),
        (0.0, "0"),
        (1e20, "100000000000000000000"),
        (1e21, "1e21"),
        (-2.5e-7, "-2.5e-7"),
        (0.0001, "0.0001"),
    ];
    for (f, s) in table {
        assert_eq!(s, Value::Float(f).to_string());
    }
    assert_eq!("x1e21", render("x{% 1e21 %}", json!(null)).unwrap());
}

#[test]
fn source_1() {
    let source = Source::read_file("test/source/1/source.txt").unwrap();
    assert_eq!("First line\nsecond line", source.content());
    assert!(matches!(
        Source::read_file("test/source/1/missing.txt"),
        Err(Error::IO(_, _)),
    ));
}

#[test]
fn context_1() {
    let ctx = read_context("test/context/1/ctx.json").unwrap();
    let tree = compile("{% range .people %}{% .val.name %} ({% .val.age %}){% end range %}").unwrap();
    assert_eq!(
        "Somebody (31)Nobody (4.5)",
        tree.render_to_string(&ctx, &Functions::new()).unwrap(),
    );
}

#[test]
fn context_2() {
    assert!(matches!(read_context("test/context/2/bad.json"), Err(Error::JsonParse(_, _))));
    assert!(matches!(read_context("test/context/2/none.json"), Err(Error::IO(_, _))));
}

#[test]
fn template_1() {
    let mut tmpl = Template::read_file("test/template/1/base.evoke").unwrap();
    tmpl.blocks("test/template/1/header.block").unwrap();
    let ctx = Value::from(json!({ "page": { "title": "Home", "body": "Welcome" } }));
    assert_eq!("<h1>Home</h1>Welcome", tmpl.render(&ctx).unwrap());
}

#[test]
fn template_2() {
    let mut tmpl = Template::read_file("test/template/1/base.evoke").unwrap();
    tmpl.blocks("test/template/1/header.block").unwrap();
    match tmpl.blocks("test/template/2/header.block") {
        Err(Error::DuplicateBlocks(dups)) => {
            assert_eq!(1, dups.len());
            assert_eq!("header", dups[0].name);
            assert!(dups[0].existing.ends_with("1/header.block"));
            assert!(dups[0].incoming.ends_with("2/header.block"));
        },
        other => panic!("Expected DuplicateBlocks, got {:?}", other.map(|_| ())),
    }
    assert_eq!(1, tmpl.tree().blocks().len());
}

#[test]
fn template_3() {
    let mut tmpl = Template::read_file("test/template/2/base.evoke").unwrap();
    tmpl.blocks("test/template/2/header.block").unwrap();
    let ctx = Value::from(json!({ "page": { "title": "Home" } }));

    assert!(matches!(tmpl.render(&ctx), Err(Error::NoBlock(name)) if name == "footer"));

    let footer = Source::faux_source("footer", "{% block footer %}<footer/>{% end block %}");
    let mut out = Vec::new();
    tmpl.render_to(&mut out, &ctx, &[ footer.clone(), ]).unwrap();
    assert_eq!("<h1>Home</h1><footer/>", String::from_utf8(out).unwrap());

    // temporary blocks never stick
    assert!(matches!(tmpl.render(&ctx), Err(Error::NoBlock(_))));

    let header = Source::faux_source("again", "{% block header %}{% end block %}");
    let mut out = Vec::new();
    assert!(matches!(
        tmpl.render_to(&mut out, &ctx, &[ footer.clone(), header, ]),
        Err(Error::DuplicateBlocks(_)),
    ));
    assert!(matches!(
        tmpl.render_to(&mut out, &ctx, &[ footer.clone(), footer, ]),
        Err(Error::DuplicateBlocks(_)),
    ));
}

#[test]
fn template_4() {
    let mut tmpl = Template::new(&Source::faux_source("base", "{% call upper .name %}")).unwrap();
    tmpl.call("upper", Function::with_arity(1, |args| {
        args[0].as_str()
            .map(|s| Value::from(s.to_uppercase()))
            .ok_or_else(|| "not a string".to_owned())
    }));
    assert_eq!("EVOKE", tmpl.render(&Value::from(json!({ "name": "evoke" }))).unwrap());
    assert!(matches!(
        tmpl.render(&Value::from(json!({ "name": 1 }))),
        Err(Error::Call(_, _)),
    ));
    assert!(matches!(
        Template::read_file("test/template/none.evoke"),
        Err(Error::IO(_, _)),
    ));
}

#[test]
fn template_5() {
    let opts = CompileOptions { strip_whitespace: true, };
    let src = Source::faux_source("base", "{% with .a %}\n  {% .b %}\n{% end with %}\n");
    let tmpl = Template::with_options(&src, opts).unwrap();
    assert_eq!("B", tmpl.render(&Value::from(json!({ "a": { "b": "B" } }))).unwrap());
}

#[test]
fn stack_1() {
    let root = Value::from(json!({ "foo": { "bar": { "baz": 1 } } }));
    let blocks = Blocks::new();
    let functions = Functions::new();
    let mut ctx = Context::new(&root, &blocks, None, &functions);
    ctx.cd(&selector_of(".foo.bar")).unwrap();
    assert_eq!(3, ctx.depth());
    assert_eq!("/.foo.bar", ctx.path_string());
    assert_eq!(Value::Int(1), ctx.value_for(&selector_of(".baz")).unwrap().into_owned());
    assert!(ctx.value_for(&selector_of("$.bar")).is_ok());
    assert!(ctx.value_for(&selector_of("/.foo")).is_ok());
    assert!(matches!(ctx.value_for(&selector_of("$$$.foo")), Err(Error::CannotPop(_, 3))));
    ctx.cd(&selector_of("$.")).unwrap();
    assert_eq!("/.foo", ctx.path_string());
}

#[test]
fn stack_2() {
    let root = Value::from(json!({ "foo": {} }));
    let blocks = Blocks::new();
    let functions = Functions::new();
    let mut ctx = Context::new(&root, &blocks, None, &functions);
    let res = ctx.scoped(|ctx| {
        ctx.cd(&selector_of(".foo"))?;
        ctx.cd(&selector_of(".missing"))
    });
    assert!(matches!(res, Err(Error::ValueNotFound(_, 0, _))));
    assert_eq!(1, ctx.depth());
}

#[test]
fn stack_3() {
    let root = Value::from(json!({ "key": "context" }));
    let blocks = Blocks::new();
    let functions = Functions::new();
    let mut ctx = Context::new(&root, &blocks, None, &functions);
    let key = ctx.var_key("key");
    assert_eq!("/.key", key);
    let prev = ctx.set_var(&key, Value::from("bound"));
    assert_eq!(Value::from("bound"), ctx.value_for(&selector_of(".key")).unwrap().into_owned());
    ctx.reset_var(&key, prev);
    assert_eq!(Value::from("context"), ctx.value_for(&selector_of(".key")).unwrap().into_owned());
}

#[test]
fn stack_4() {
    let root = Value::from(json!({ "foo": [1, 2] }));
    let blocks = Blocks::new();
    let functions = Functions::new();
    let ctx = Context::new(&root, &blocks, None, &functions);
    assert!(matches!(ctx.value_for(&selector_of(".foo")).unwrap(), Cow::Borrowed(_)));
}
