use std::borrow::Cow;

use crate::error::SqlFacadeError;

/// A typed argument for query-template substitution.
///
/// `Str` carries both plain strings and pre-escaped fragments from
/// `DbFacade::esc`; the formatter renders them verbatim, so quoting is the
/// producer's responsibility.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryArg {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
}

impl QueryArg {
    #[must_use]
    pub fn str(value: impl Into<String>) -> Self {
        QueryArg::Str(value.into())
    }

    #[must_use]
    pub fn int(value: i64) -> Self {
        QueryArg::Int(value)
    }

    #[must_use]
    pub fn uint(value: u64) -> Self {
        QueryArg::Uint(value)
    }

    #[must_use]
    pub fn float(value: f64) -> Self {
        QueryArg::Float(value)
    }
}

impl From<&str> for QueryArg {
    fn from(value: &str) -> Self {
        QueryArg::Str(value.to_string())
    }
}

impl From<String> for QueryArg {
    fn from(value: String) -> Self {
        QueryArg::Str(value)
    }
}

impl From<i64> for QueryArg {
    fn from(value: i64) -> Self {
        QueryArg::Int(value)
    }
}

impl From<u64> for QueryArg {
    fn from(value: u64) -> Self {
        QueryArg::Uint(value)
    }
}

impl From<f64> for QueryArg {
    fn from(value: f64) -> Self {
        QueryArg::Float(value)
    }
}

/// Substitute `%` directives in a query template.
///
/// With an empty argument list the template passes through verbatim, percent
/// signs included; templates are only interpreted when arguments arrive.
/// Directives: `%s` (string or number, rendered as-is), `%d` (signed
/// integer), `%u` (unsigned integer), `%f` and `%.Nf` (float, printf
/// precision rules), `%%` (literal percent). Surplus arguments are ignored.
///
/// # Errors
///
/// Returns `SqlFacadeError::FormatError` when the template needs more
/// arguments than supplied, when a directive is unknown, or when an argument
/// cannot satisfy the directive's type.
pub fn format_query<'a>(
    template: &'a str,
    args: &[QueryArg],
) -> Result<Cow<'a, str>, SqlFacadeError> {
    if args.is_empty() {
        return Ok(Cow::Borrowed(template));
    }

    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut rest = template;
    let mut next_arg = 0usize;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let consumed = apply_directive(after, args, &mut next_arg, &mut out)?;
        rest = &after[consumed..];
    }
    out.push_str(rest);

    Ok(Cow::Owned(out))
}

// Renders one directive (the text after a '%') into `out` and reports how
// many template bytes it consumed.
fn apply_directive(
    after: &str,
    args: &[QueryArg],
    next_arg: &mut usize,
    out: &mut String,
) -> Result<usize, SqlFacadeError> {
    match after.as_bytes().first() {
        Some(b'%') => {
            out.push('%');
            Ok(1)
        }
        Some(b's') => {
            render_str(take_arg(args, next_arg)?, out);
            Ok(1)
        }
        Some(b'd') => {
            render_int(take_arg(args, next_arg)?, *next_arg - 1, out)?;
            Ok(1)
        }
        Some(b'u') => {
            render_uint(take_arg(args, next_arg)?, *next_arg - 1, out)?;
            Ok(1)
        }
        Some(b'f') => {
            render_float(take_arg(args, next_arg)?, *next_arg - 1, None, out)?;
            Ok(1)
        }
        Some(b'.') => {
            let digits_len = after[1..]
                .bytes()
                .take_while(u8::is_ascii_digit)
                .count();
            let precision: usize = after[1..1 + digits_len].parse().map_err(|_| {
                let shown: String = after.chars().take(digits_len + 2).collect();
                SqlFacadeError::FormatError(format!("unrecognized directive '%{shown}'"))
            })?;
            if after.as_bytes().get(1 + digits_len) != Some(&b'f') {
                let shown: String = after.chars().take(digits_len + 2).collect();
                return Err(SqlFacadeError::FormatError(format!(
                    "unrecognized directive '%{shown}'"
                )));
            }
            render_float(
                take_arg(args, next_arg)?,
                *next_arg - 1,
                Some(precision),
                out,
            )?;
            Ok(1 + digits_len + 1)
        }
        Some(_) => {
            let c = after.chars().next().unwrap_or('?');
            Err(SqlFacadeError::FormatError(format!(
                "unrecognized directive '%{c}'"
            )))
        }
        None => Err(SqlFacadeError::FormatError(
            "template ends with a bare '%'".to_string(),
        )),
    }
}

fn take_arg<'a>(args: &'a [QueryArg], next_arg: &mut usize) -> Result<&'a QueryArg, SqlFacadeError> {
    let arg = args.get(*next_arg).ok_or_else(|| {
        SqlFacadeError::FormatError(format!(
            "template needs more than {} argument(s)",
            args.len()
        ))
    })?;
    *next_arg += 1;
    Ok(arg)
}

fn render_str(arg: &QueryArg, out: &mut String) {
    match arg {
        QueryArg::Str(s) => out.push_str(s),
        QueryArg::Int(v) => out.push_str(&v.to_string()),
        QueryArg::Uint(v) => out.push_str(&v.to_string()),
        QueryArg::Float(v) => out.push_str(&v.to_string()),
    }
}

fn render_int(arg: &QueryArg, index: usize, out: &mut String) -> Result<(), SqlFacadeError> {
    let v = match arg {
        QueryArg::Int(v) => *v,
        QueryArg::Uint(v) => i64::try_from(*v).map_err(|_| {
            SqlFacadeError::FormatError(format!("argument {index} overflows %d"))
        })?,
        // printf truncates floats toward zero
        QueryArg::Float(v) => v.trunc() as i64,
        QueryArg::Str(_) => {
            return Err(SqlFacadeError::FormatError(format!(
                "argument {index} is not an integer (wanted by %d)"
            )));
        }
    };
    out.push_str(&v.to_string());
    Ok(())
}

fn render_uint(arg: &QueryArg, index: usize, out: &mut String) -> Result<(), SqlFacadeError> {
    let v = match arg {
        QueryArg::Uint(v) => *v,
        QueryArg::Int(v) => u64::try_from(*v).map_err(|_| {
            SqlFacadeError::FormatError(format!("argument {index} is negative (wanted by %u)"))
        })?,
        QueryArg::Float(_) | QueryArg::Str(_) => {
            return Err(SqlFacadeError::FormatError(format!(
                "argument {index} is not an unsigned integer (wanted by %u)"
            )));
        }
    };
    out.push_str(&v.to_string());
    Ok(())
}

fn render_float(
    arg: &QueryArg,
    index: usize,
    precision: Option<usize>,
    out: &mut String,
) -> Result<(), SqlFacadeError> {
    let v = match arg {
        QueryArg::Float(v) => *v,
        #[allow(clippy::cast_precision_loss)]
        QueryArg::Int(v) => *v as f64,
        #[allow(clippy::cast_precision_loss)]
        QueryArg::Uint(v) => *v as f64,
        QueryArg::Str(_) => {
            return Err(SqlFacadeError::FormatError(format!(
                "argument {index} is not numeric (wanted by %f)"
            )));
        }
    };
    // printf renders six decimals unless a precision is given
    let precision = precision.unwrap_or(6);
    out.push_str(&format!("{v:.precision$}"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_without_args() {
        let sql = "SELECT * FROM t WHERE pct = '100%'";
        let res = format_query(sql, &[]).unwrap();
        assert!(matches!(res, Cow::Borrowed(_)));
        assert_eq!(res, sql);
    }

    #[test]
    fn substitutes_each_directive_kind() {
        let res = format_query(
            "%s %d %u %.2f %f %%",
            &[
                QueryArg::str("abc"),
                QueryArg::int(-7),
                QueryArg::uint(3),
                QueryArg::float(1.5),
                QueryArg::float(2.25),
            ],
        )
        .unwrap();
        assert_eq!(res, "abc -7 3 1.50 2.250000 %");
    }

    #[test]
    fn string_fragment_renders_verbatim() {
        let res = format_query(
            "SELECT * FROM t WHERE name = %s",
            &[QueryArg::str("'O''Brien'")],
        )
        .unwrap();
        assert_eq!(res, "SELECT * FROM t WHERE name = 'O''Brien'");
    }

    #[test]
    fn numbers_render_through_string_directive() {
        let res = format_query(
            "%s | %s | %s",
            &[QueryArg::int(5), QueryArg::uint(6), QueryArg::float(1.5)],
        )
        .unwrap();
        assert_eq!(res, "5 | 6 | 1.5");
    }

    #[test]
    fn too_few_args_is_an_error() {
        let err = format_query("%s %s", &[QueryArg::str("only")]).unwrap_err();
        assert!(matches!(err, SqlFacadeError::FormatError(_)));
    }

    #[test]
    fn surplus_args_are_ignored() {
        let res = format_query("%s", &[QueryArg::str("kept"), QueryArg::str("dropped")]).unwrap();
        assert_eq!(res, "kept");
    }

    #[test]
    fn unknown_directive_is_an_error() {
        let err = format_query("%x", &[QueryArg::int(1)]).unwrap_err();
        assert!(matches!(err, SqlFacadeError::FormatError(_)));
    }

    #[test]
    fn signed_directive_rejects_strings() {
        let err = format_query("%d", &[QueryArg::str("12")]).unwrap_err();
        assert!(matches!(err, SqlFacadeError::FormatError(_)));
    }

    #[test]
    fn unsigned_directive_rejects_negatives() {
        let err = format_query("%u", &[QueryArg::int(-1)]).unwrap_err();
        assert!(matches!(err, SqlFacadeError::FormatError(_)));
    }

    #[test]
    fn multibyte_text_survives_substitution() {
        let res = format_query("SELECT 'café %s' ", &[QueryArg::str("noté")]).unwrap();
        assert_eq!(res, "SELECT 'café noté' ");
    }

    #[test]
    fn trailing_bare_percent_is_an_error() {
        let err = format_query("SELECT 1 %", &[QueryArg::int(1)]).unwrap_err();
        assert!(matches!(err, SqlFacadeError::FormatError(_)));
    }
}
