//! Constant strings representing delimiters for the Evoke Templating Engine.
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

pub(crate)
const OPEN: &str = "{%";

pub(crate)
const CLOSE: &str = "%}";

pub(crate)
const COMMENT: &str = "{#";

pub(crate)
const ENDCOMMENT: &str = "#}";

pub(crate)
const PUSH: char = '.';

pub(crate)
const POP: char = '$';

pub(crate)
const ROOT: char = '/';

pub(crate)
const QUOTE: char = '"';

pub(crate)
const SIGNS: &str = "+-";

pub(crate)
const DIGITS: &str = "0123456789";

pub(crate)
const EXPONENT: &str = "eE";

pub(crate)
const DECIMAL: &str = ".";

pub(crate)
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

pub(crate)
fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
