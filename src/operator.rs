//! 算术表达式的校验与求值
//!
//! 文法只有四个运算符 `+ - * /` 和非负整数，没有括号。求值时先按 `+` 与一元 `-`
//! 把表达式切成若干加法项，每一项内部的 `*` `/` 严格从左到右计算，最后把所有项相加。

use failure::Fail;
use std::fmt;

/// 合法的运算符
pub const OPERATORS: &str = "+-*/";

/// 表达式中允许出现的全部字符
pub const VALID_CHARSET: &str = "1234567890 +-*/";

/// 表达式校验结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// 表达式合法
    Valid,
    /// 表达式不合法，附带原因
    Invalid(String),
}

impl ValidationResult {
    /// 是否合法
    pub fn is_valid(&self) -> bool {
        *self == ValidationResult::Valid
    }
}

/// 单个表达式求值失败的原因
#[derive(Debug, Clone, PartialEq, Fail)]
pub enum EvalError {
    /// 无法转换为数字的因子
    #[fail(display = "could not convert string to float: {}", _0)]
    InvalidNumber(String),
    /// 除数为 0
    #[fail(display = "float division by zero")]
    DivisionByZero,
}

/// `validate_and_operate` 的结果：数值，或者校验失败的信息
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// 表达式的值
    Number(f64),
    /// 校验未通过的原因
    Rejected(String),
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Number(value) => f.write_str(&format_number(*value)),
            Answer::Rejected(reason) => f.write_str(reason),
        }
    }
}

/// 按最短往返表示输出浮点数，与客户端约定的格式一致
///
/// 十进制指数小于 -4 或不小于 16 时使用科学计数法，指数带符号且至少两位
/// （`1e+16`、`1.5e-05`）；其余情况使用定点表示，整数值保留 `.0`。
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() || value == 0.0 {
        return format!("{:?}", value);
    }

    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= 16 {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
    }

    let fixed = value.to_string();
    if fixed.contains('.') {
        fixed
    } else {
        fixed + ".0"
    }
}

fn is_operator(c: char) -> bool {
    OPERATORS.contains(c)
}

fn is_multiplicative(c: char) -> bool {
    c == '*' || c == '/'
}

/// 校验表达式的字符集与语法形状
///
/// 规则按顺序检查，命中第一条即返回：
/// 1. 连续两个运算符（中间可以有空格）；
/// 2. 字符集之外的字符（位置 0 的非法字符不在这里报告，交给第 4 条）；
/// 3. 去掉首尾空白后最后一个字符必须是数字；
/// 4. 去掉首尾空白后第一个字符必须是数字或 `-`。
pub fn validate(expression: &str) -> ValidationResult {
    let mut wrong_char_index = None;
    let mut last_is_operator = false;

    for (idx, c) in expression.chars().enumerate() {
        let operator = is_operator(c);

        if last_is_operator && operator {
            return ValidationResult::Invalid(
                "two consecutive operators found, wrong syntax".to_owned(),
            );
        }

        if !VALID_CHARSET.contains(c) {
            wrong_char_index = Some(idx);
            break;
        }

        if c != ' ' {
            last_is_operator = operator;
        }
    }

    if let Some(idx) = wrong_char_index.filter(|&idx| idx > 0) {
        return ValidationResult::Invalid(format!(
            "wrong char, at position {}, not in {}",
            idx, VALID_CHARSET
        ));
    }

    let trimmed = expression.trim();

    match trimmed.chars().last() {
        Some(c) if c.is_ascii_digit() => {}
        _ => return ValidationResult::Invalid("last element is not valid".to_owned()),
    }

    match trimmed.chars().next() {
        Some(c) if c.is_ascii_digit() || c == '-' => {}
        _ => return ValidationResult::Invalid("first element is not valid".to_owned()),
    }

    ValidationResult::Valid
}

/// 一个加法项：若干因子由 `*` `/` 连接，`negative` 表示该项前面是 `-`
struct Term<'a> {
    negative: bool,
    body: &'a str,
}

impl Term<'_> {
    fn is_empty(&self) -> bool {
        !self.negative && self.body.trim().is_empty()
    }

    /// 从第一个记号开始，两两取出 (运算符, 操作数) 依次计算
    ///
    /// 运算符位置上不是 `*` `/` 的记号连同其后的操作数一起跳过，末尾落单的记号忽略，
    /// 因此 `3 4 5 * 2` 的值为 6。
    fn reduce(&self) -> Result<f64, EvalError> {
        let tokens = tokenize(self.body);
        let mut total = parse_factor(tokens.first().copied().unwrap_or_default())?;
        if self.negative {
            total = -total;
        }

        for pair in tokens[tokens.len().min(1)..].chunks_exact(2) {
            match pair[0] {
                "*" => total *= parse_factor(pair[1])?,
                "/" => {
                    let value = parse_factor(pair[1])?;
                    if value == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    total /= value;
                }
                _ => {}
            }
        }

        Ok(total)
    }
}

/// 按空白切分，`*` `/` 无论两侧是否有空格都单独成为一个记号
fn tokenize(body: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (idx, c) in body.char_indices() {
        if c.is_whitespace() || is_multiplicative(c) {
            if let Some(begin) = start.take() {
                tokens.push(&body[begin..idx]);
            }
            if is_multiplicative(c) {
                tokens.push(&body[idx..idx + c.len_utf8()]);
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(begin) = start {
        tokens.push(&body[begin..]);
    }

    tokens
}

fn parse_factor(token: &str) -> Result<f64, EvalError> {
    let token = token.trim();
    token
        .parse::<f64>()
        .map_err(|_| EvalError::InvalidNumber(token.to_owned()))
}

fn split_terms(expression: &str) -> Vec<Term<'_>> {
    let mut terms = Vec::new();
    let mut start = 0;
    let mut negative = false;

    for (idx, c) in expression.char_indices() {
        if c == '+' || c == '-' {
            terms.push(Term {
                negative,
                body: &expression[start..idx],
            });
            negative = c == '-';
            start = idx + c.len_utf8();
        }
    }
    terms.push(Term {
        negative,
        body: &expression[start..],
    });

    terms
}

/// 计算表达式的值
///
/// 调用前表达式应当已经通过 [`validate`]；未校验的输入可能返回 [`EvalError`]。
pub fn evaluate(expression: &str) -> Result<f64, EvalError> {
    split_terms(expression)
        .iter()
        .filter(|term| !term.is_empty())
        .try_fold(0.0, |sum, term| term.reduce().map(|value| sum + value))
}

/// 先校验再求值；校验失败时返回失败原因而不是错误
pub fn validate_and_operate(expression: &str) -> Result<Answer, EvalError> {
    match validate(expression) {
        ValidationResult::Valid => evaluate(expression).map(Answer::Number),
        ValidationResult::Invalid(reason) => Ok(Answer::Rejected(reason)),
    }
}
