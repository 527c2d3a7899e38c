use serde_json::{Map, Value as JsonValue};
use winnow::ascii::{dec_int, dec_uint, digit1, till_line_ending};
use winnow::combinator::{
    alt, cut_err, delimited, not, opt, preceded, repeat, separated, terminated,
};
use winnow::error::{ContextError, ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_while};

use crate::{FunctionConfig, ModelGroupConfig, RuleEntry};

enum Statement {
    Analytics(String),
    Version(String),
    Weight(u32),
    Schema(Vec<FunctionConfig>),
    When(Vec<String>, Vec<FunctionConfig>),
    Default(Vec<FunctionConfig>),
}

fn expected(what: &'static str) -> StrContext {
    StrContext::Expected(StrContextValue::Description(what))
}

// -- Whitespace & comments --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_ascii_whitespace()).void(),
            ('#', till_line_ending).void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

// -- Tokens -----------------------------------------------------------------

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
        }),
    )
        .take()
        .parse_next(input)
}

/// `kw` as a whole word: `whenx` is not `when` followed by `x`.
fn keyword<'i>(kw: &'static str) -> impl Parser<&'i str, &'i str, ErrMode<ContextError>> {
    terminated(
        kw,
        not(one_of(|c: char| {
            c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
        })),
    )
}

fn string_literal(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        match any.parse_next(input)? {
            '"' => return Ok(s),
            '\\' => match any.parse_next(input)? {
                '"' => s.push('"'),
                '\\' => s.push('\\'),
                'n' => s.push('\n'),
                't' => s.push('\t'),
                other => {
                    s.push('\\');
                    s.push(other);
                }
            },
            c => s.push(c),
        }
    }
}

/// Anything up to whitespace or DSL punctuation; covers `*`.
fn bare_token<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| {
        !c.is_whitespace()
            && !matches!(
                c,
                '|' | ':' | ',' | '(' | ')' | '[' | ']' | '=' | '"' | '#'
            )
    })
    .parse_next(input)
}

fn text(input: &mut &str) -> ModalResult<String> {
    ws.parse_next(input)?;
    alt((string_literal, bare_token.map(str::to_owned))).parse_next(input)
}

// -- Argument values --------------------------------------------------------

fn float_literal(input: &mut &str) -> ModalResult<f64> {
    (opt('-'), digit1, '.', digit1)
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .parse_next(input)
}

fn list(input: &mut &str) -> ModalResult<JsonValue> {
    delimited(
        '[',
        separated(0.., value, (ws, ',')),
        (ws, cut_err(']').context(expected("']'"))),
    )
    .map(JsonValue::Array)
    .parse_next(input)
}

fn value(input: &mut &str) -> ModalResult<JsonValue> {
    ws.parse_next(input)?;
    alt((
        string_literal.map(JsonValue::String),
        "true".value(JsonValue::Bool(true)),
        "false".value(JsonValue::Bool(false)),
        list,
        float_literal.map(JsonValue::from),
        dec_int::<_, i64, _>.map(JsonValue::from),
    ))
    .context(expected("value"))
    .parse_next(input)
}

fn arg(input: &mut &str) -> ModalResult<(String, JsonValue)> {
    ws.parse_next(input)?;
    let key = ident.parse_next(input)?;
    (ws, cut_err('=').context(expected("'='"))).parse_next(input)?;
    let val = cut_err(value).parse_next(input)?;
    Ok((key.to_owned(), val))
}

fn arg_list(input: &mut &str) -> ModalResult<JsonValue> {
    ws.parse_next(input)?;
    '('.parse_next(input)?;
    let pairs: Vec<(String, JsonValue)> = separated(0.., arg, (ws, ',')).parse_next(input)?;
    (ws, cut_err(')').context(expected("')'"))).parse_next(input)?;
    Ok(JsonValue::Object(pairs.into_iter().collect::<Map<_, _>>()))
}

// -- Functions & conditions -------------------------------------------------

fn function(input: &mut &str) -> ModalResult<FunctionConfig> {
    ws.parse_next(input)?;
    let name = ident.context(expected("function name")).parse_next(input)?;
    let args = opt(arg_list).parse_next(input)?;
    Ok(FunctionConfig::new(name).with_args(args.unwrap_or(JsonValue::Null)))
}

fn function_list(input: &mut &str) -> ModalResult<Vec<FunctionConfig>> {
    separated(1.., function, (ws, ',')).parse_next(input)
}

fn condition(input: &mut &str) -> ModalResult<Vec<String>> {
    separated(1.., text.context(expected("condition segment")), (ws, '|'))
        .parse_next(input)
}

fn colon(input: &mut &str) -> ModalResult<()> {
    (ws, cut_err(':').context(expected("':'")))
        .void()
        .parse_next(input)
}

// -- Statements -------------------------------------------------------------

fn statement(input: &mut &str) -> ModalResult<Statement> {
    ws.parse_next(input)?;
    alt((
        preceded(
            keyword("analytics"),
            cut_err(text).context(expected("analytics key")),
        )
        .map(Statement::Analytics),
        preceded(
            keyword("version"),
            cut_err(text).context(expected("model version")),
        )
        .map(Statement::Version),
        preceded(
            (keyword("weight"), ws),
            cut_err(dec_uint::<_, u32, _>).context(expected("weight")),
        )
        .map(Statement::Weight),
        preceded((keyword("schema"), colon), cut_err(function_list)).map(Statement::Schema),
        preceded((keyword("default"), colon), cut_err(function_list)).map(Statement::Default),
        preceded(
            keyword("when"),
            cut_err((terminated(condition, colon), function_list)),
        )
        .map(|(segments, results)| Statement::When(segments, results)),
    ))
    .parse_next(input)
}

pub fn model_group(input: &mut &str) -> ModalResult<ModelGroupConfig> {
    let statements: Vec<Statement> = repeat(0.., statement).parse_next(input)?;
    ws.parse_next(input)?;

    let mut group = ModelGroupConfig::default();
    for statement in statements {
        match statement {
            Statement::Analytics(key) => group.analytics_key = key,
            Statement::Version(version) => group.version = version,
            Statement::Weight(weight) => group.weight = weight,
            Statement::Schema(functions) => group.schema.extend(functions),
            Statement::When(conditions, results) => {
                group.rules.push(RuleEntry {
                    conditions,
                    results,
                });
            }
            Statement::Default(functions) => group.default.extend(functions),
        }
    }
    Ok(group)
}
