//! String helpers registered for every template rendered by evc.
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
    evoke_core::{
        Function,
        Functions,
        Value,
    },
    std::result::Result as StdResult,
};

type Outcome = StdResult<Value, String>;

/// Register every helper in `functions`.
pub
fn register(functions: &mut Functions) {
    functions.insert("upper", Function::with_arity(1, |args| {
        Ok(Value::from(args[0].to_string().to_uppercase()))
    }));
    functions.insert("lower", Function::with_arity(1, |args| {
        Ok(Value::from(args[0].to_string().to_lowercase()))
    }));
    functions.insert("trim", Function::with_arity(1, |args| {
        Ok(Value::from(args[0].to_string().trim()))
    }));
    functions.insert("replace", Function::with_arity(3, replace));
    functions.insert("split", Function::with_arity(3, split));
    functions.insert("len", Function::with_arity(1, len));
}

fn replace(args: &[Value]) -> Outcome {
    let from = args[1].to_string();
    if from.is_empty() {
        return Err("can not replace an empty string".to_owned());
    }

    Ok(Value::from(args[0].to_string().replace(&from, &args[2].to_string())))
}

fn count(value: &Value, what: &str) -> StdResult<usize, String> {
    value.as_i64()
        .and_then(|i| usize::try_from(i).ok())
        .ok_or_else(|| format!("{} must be a non negative integer, got {:?}", what, value))
}

/// The `idx`th of `into` chunks of near equal length. The last chunk takes
/// whatever is left over.
fn split(args: &[Value]) -> Outcome {
    let text = args[0].to_string();
    let into = count(&args[1], "into")?;
    let idx = count(&args[2], "index")?;
    let chars = text.chars().collect::<Vec<char>>();
    let len = chars.len();
    if into == 0 || into > len || idx >= into {
        return Err(format!(
            "can not take chunk {} of {} from a string of length {}",
            idx,
            into,
            len,
        ));
    }

    let width = len / into;
    let start = idx * width;
    let end = if idx == into - 1 { len } else { start + width };
    Ok(Value::from(chars[start..end].iter().collect::<String>()))
}

fn len(args: &[Value]) -> Outcome {
    args[0].len()
        .map(Value::from)
        .ok_or_else(|| format!("a {} has no length", args[0].shape()))
}
