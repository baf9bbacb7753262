//! Arithmetic problem generation.
//!
//! Each call is independent: the level picks operand ranges and the
//! operation mix, the RNG is the only source of variation.

use crate::constants::MAX_GENERATOR_LEVEL;
use rand::rngs::ThreadRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Operation tag attached to every problem and tracked in statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    /// Two-operator expression (level 4).
    Mixed,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Addition,
        Operation::Subtraction,
        Operation::Multiplication,
        Operation::Division,
        Operation::Mixed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Addition => "addition",
            Self::Subtraction => "subtraction",
            Self::Multiplication => "multiplication",
            Self::Division => "division",
            Self::Mixed => "mixed",
        }
    }
}

/// A generated problem. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub question: String,
    pub answer: i64,
    pub operation: Operation,
}

impl Problem {
    pub fn new(question: impl Into<String>, answer: i64, operation: Operation) -> Self {
        Self {
            question: question.into(),
            answer,
            operation,
        }
    }

    /// Compare raw player input with the expected answer.
    ///
    /// Empty or non-numeric input never matches.
    pub fn is_correct(&self, input: &str) -> bool {
        parse_answer(input) == Some(self.answer)
    }
}

/// Parse raw answer input. Returns `None` for empty or non-numeric text.
pub fn parse_answer(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

/// Binary operator used while building expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    const ALL: [Operator; 4] = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];

    fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "×",
            Self::Div => "÷",
        }
    }

    fn operation(self) -> Operation {
        match self {
            Self::Add => Operation::Addition,
            Self::Sub => Operation::Subtraction,
            Self::Mul => Operation::Multiplication,
            Self::Div => Operation::Division,
        }
    }

    fn binds_tight(self) -> bool {
        matches!(self, Self::Mul | Self::Div)
    }

    /// Apply the operator. Division rounds to the nearest integer.
    fn apply(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            Self::Add => lhs.checked_add(rhs),
            Self::Sub => lhs.checked_sub(rhs),
            Self::Mul => lhs.checked_mul(rhs),
            Self::Div => div_round(lhs, rhs),
        }
    }
}

/// Integer division rounded to the nearest integer, ties toward +infinity.
pub fn div_round(numerator: i64, denominator: i64) -> Option<i64> {
    if denominator == 0 {
        return None;
    }
    let (n, d) = if denominator < 0 {
        (numerator.checked_neg()?, denominator.checked_neg()?)
    } else {
        (numerator, denominator)
    };
    // floor(n / d + 1/2) == floor((2n + d) / 2d)
    let twice_n = n.checked_mul(2)?.checked_add(d)?;
    Some(twice_n.div_euclid(d.checked_mul(2)?))
}

/// Generate a problem for the given difficulty level.
///
/// Levels above 4 behave like level 4. Level 0 is not a valid level and is
/// treated as level 1.
pub fn generate_problem<R: Rng + ?Sized>(level: u32, rng: &mut R) -> Problem {
    match level.clamp(1, MAX_GENERATOR_LEVEL) {
        1 => {
            let op = if rng.gen_bool(0.5) {
                Operator::Add
            } else {
                Operator::Sub
            };
            let a = rng.gen_range(1..=10);
            let b = rng.gen_range(1..=10);
            match op {
                Operator::Sub => basic(Operator::Sub, a.max(b), a.min(b)),
                _ => basic(op, a, b),
            }
        }
        2 => match Operator::ALL[rng.gen_range(0..Operator::ALL.len())] {
            Operator::Add => basic(
                Operator::Add,
                rng.gen_range(10..=50),
                rng.gen_range(10..=50),
            ),
            Operator::Sub => {
                let minuend = rng.gen_range(25..=99);
                let subtrahend = rng.gen_range(1..=minuend);
                basic(Operator::Sub, minuend, subtrahend)
            }
            Operator::Mul => basic(Operator::Mul, rng.gen_range(2..=10), rng.gen_range(2..=10)),
            Operator::Div => exact_division(rng, 2..=10, 1..=10),
        },
        3 => {
            if rng.gen_bool(0.5) {
                basic(Operator::Mul, rng.gen_range(5..=15), rng.gen_range(5..=15))
            } else {
                exact_division(rng, 3..=12, 2..=12)
            }
        }
        _ => mixed_expression(rng),
    }
}

fn basic(op: Operator, a: i64, b: i64) -> Problem {
    // Operands are small enough that the operators never overflow.
    let answer = op.apply(a, b).unwrap_or_default();
    Problem::new(format!("{} {} {}", a, op.symbol(), b), answer, op.operation())
}

fn exact_division<R: Rng + ?Sized>(
    rng: &mut R,
    divisors: std::ops::RangeInclusive<i64>,
    quotients: std::ops::RangeInclusive<i64>,
) -> Problem {
    let divisor = rng.gen_range(divisors);
    let quotient = rng.gen_range(quotients);
    Problem::new(
        format!("{} ÷ {}", divisor * quotient, divisor),
        quotient,
        Operation::Division,
    )
}

fn mixed_expression<R: Rng + ?Sized>(rng: &mut R) -> Problem {
    let a = rng.gen_range(2..=15);
    let b = rng.gen_range(2..=15);
    let c = rng.gen_range(2..=10);
    let op1 = Operator::ALL[rng.gen_range(0..Operator::ALL.len())];
    let op2 = Operator::ALL[rng.gen_range(0..Operator::ALL.len())];
    let parenthesized = rng.gen_bool(0.5);

    let left_to_right = || op1.apply(a, b).and_then(|ab| op2.apply(ab, c));

    let (question, answer) = if parenthesized {
        (
            format!("({} {} {}) {} {}", a, op1.symbol(), b, op2.symbol(), c),
            left_to_right(),
        )
    } else {
        let answer = if !op1.binds_tight() && op2.binds_tight() {
            op2.apply(b, c).and_then(|bc| op1.apply(a, bc))
        } else {
            left_to_right()
        };
        (
            format!("{} {} {} {} {}", a, op1.symbol(), b, op2.symbol(), c),
            answer,
        )
    };

    // Divisors are always in [2, 15], so evaluation cannot fail.
    Problem::new(question, answer.unwrap_or_default(), Operation::Mixed)
}

/// Source of problems for the game loop.
pub trait ProblemSource {
    fn next_problem(&mut self, level: u32) -> Problem;
}

/// Production problem source backed by an RNG.
#[derive(Debug, Clone)]
pub struct RandomProblems<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomProblems<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomProblems<ThreadRng> {
    pub fn thread_local() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl<R: Rng> ProblemSource for RandomProblems<R> {
    fn next_problem(&mut self, level: u32) -> Problem {
        generate_problem(level, &mut self.rng)
    }
}

// ── Expression evaluation ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Num(i64),
    Op(Operator),
    Open,
    Close,
}

fn tokenize(text: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&ch) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            c if c.is_ascii_digit() => {
                let mut value: i64 = 0;
                while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                    value = value.checked_mul(10)?.checked_add(d as i64)?;
                    chars.next();
                }
                tokens.push(Token::Num(value));
            }
            _ => {
                let token = match ch {
                    '+' => Token::Op(Operator::Add),
                    '-' | '−' => Token::Op(Operator::Sub),
                    '×' | '*' | 'x' => Token::Op(Operator::Mul),
                    '÷' | '/' => Token::Op(Operator::Div),
                    '(' => Token::Open,
                    ')' => Token::Close,
                    _ => return None,
                };
                tokens.push(token);
                chars.next();
            }
        }
    }
    Some(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn expr(&mut self) -> Option<i64> {
        let mut value = self.term()?;
        while let Some(Token::Op(op)) = self.peek() {
            if op.binds_tight() {
                break;
            }
            self.pos += 1;
            value = op.apply(value, self.term()?)?;
        }
        Some(value)
    }

    fn term(&mut self) -> Option<i64> {
        let mut value = self.factor()?;
        while let Some(Token::Op(op)) = self.peek() {
            if !op.binds_tight() {
                break;
            }
            self.pos += 1;
            value = op.apply(value, self.factor()?)?;
        }
        Some(value)
    }

    fn factor(&mut self) -> Option<i64> {
        let token = self.peek()?;
        self.pos += 1;
        match token {
            Token::Num(n) => Some(n),
            Token::Op(Operator::Sub) => self.factor()?.checked_neg(),
            Token::Open => {
                let value = self.expr()?;
                match self.peek() {
                    Some(Token::Close) => {
                        self.pos += 1;
                        Some(value)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Evaluate a rendered question with standard precedence, rounding every
/// division to the nearest integer. Returns `None` for malformed text.
pub fn evaluate(question: &str) -> Option<i64> {
    let mut parser = Parser {
        tokens: tokenize(question)?,
        pos: 0,
    };
    let value = parser.expr()?;
    if parser.pos == parser.tokens.len() {
        Some(value)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn operands(problem: &Problem) -> (i64, i64) {
        let parts: Vec<&str> = problem.question.split_whitespace().collect();
        assert_eq!(parts.len(), 3, "unexpected question {}", problem.question);
        (parts[0].parse().unwrap(), parts[2].parse().unwrap())
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("7"), Some(7));
        assert_eq!(parse_answer("  42 "), Some(42));
        assert_eq!(parse_answer("-3"), Some(-3));
        assert_eq!(parse_answer(""), None);
        assert_eq!(parse_answer("   "), None);
        assert_eq!(parse_answer("seven"), None);
        assert_eq!(parse_answer("7.5"), None);
    }

    #[test]
    fn test_is_correct_rejects_garbage() {
        let problem = Problem::new("3 + 4", 7, Operation::Addition);
        assert!(problem.is_correct("7"));
        assert!(problem.is_correct(" 7\n"));
        assert!(!problem.is_correct("8"));
        assert!(!problem.is_correct(""));
        assert!(!problem.is_correct("abc"));
    }

    #[test]
    fn test_div_round_nearest() {
        assert_eq!(div_round(12, 4), Some(3));
        assert_eq!(div_round(13, 4), Some(3)); // 3.25
        assert_eq!(div_round(14, 4), Some(4)); // 3.5 rounds up
        assert_eq!(div_round(15, 4), Some(4)); // 3.75
        assert_eq!(div_round(-13, 4), Some(-3)); // -3.25
        assert_eq!(div_round(-14, 4), Some(-3)); // -3.5 rounds toward +inf
        assert_eq!(div_round(-15, 4), Some(-4));
        assert_eq!(div_round(7, -2), Some(-3)); // -3.5
        assert_eq!(div_round(1, 0), None);
    }

    #[test]
    fn test_evaluate_precedence_and_parens() {
        assert_eq!(evaluate("3 + 4"), Some(7));
        assert_eq!(evaluate("2 + 3 × 4"), Some(14));
        assert_eq!(evaluate("(2 + 3) × 4"), Some(20));
        assert_eq!(evaluate("10 - 4 - 3"), Some(3));
        assert_eq!(evaluate("10 - 4 + 3"), Some(9));
        assert_eq!(evaluate("7 ÷ 2"), Some(4));
        assert_eq!(evaluate("2 + 7 ÷ 2"), Some(6));
        assert_eq!(evaluate("(2 - 15) ÷ 4"), Some(-3));
    }

    #[test]
    fn test_evaluate_rejects_malformed() {
        assert_eq!(evaluate(""), None);
        assert_eq!(evaluate("3 +"), None);
        assert_eq!(evaluate("(3 + 4"), None);
        assert_eq!(evaluate("3 4"), None);
        assert_eq!(evaluate("3 % 4"), None);
        assert_eq!(evaluate("8 ÷ 0"), None);
    }

    #[test]
    fn test_level_one_operations_and_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut seen_add = false;
        let mut seen_sub = false;
        for _ in 0..1000 {
            let problem = generate_problem(1, &mut rng);
            let (a, b) = operands(&problem);
            assert!((1..=10).contains(&a) && (1..=10).contains(&b));
            match problem.operation {
                Operation::Addition => seen_add = true,
                Operation::Subtraction => {
                    seen_sub = true;
                    assert!(a >= b);
                    assert!(problem.answer >= 0);
                }
                other => panic!("unexpected level-1 operation {:?}", other),
            }
        }
        assert!(seen_add && seen_sub);
    }

    #[test]
    fn test_level_two_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            let problem = generate_problem(2, &mut rng);
            let (a, b) = operands(&problem);
            seen.insert(problem.operation);
            match problem.operation {
                Operation::Addition => {
                    assert!((10..=50).contains(&a) && (10..=50).contains(&b));
                }
                Operation::Subtraction => {
                    assert!((25..=99).contains(&a));
                    assert!((1..=a).contains(&b));
                    assert!(problem.answer >= 0 && problem.answer < a);
                }
                Operation::Multiplication => {
                    assert!((2..=10).contains(&a) && (2..=10).contains(&b));
                }
                Operation::Division => {
                    assert!((2..=10).contains(&b));
                    assert!((1..=10).contains(&problem.answer));
                    assert_eq!(a, b * problem.answer);
                }
                Operation::Mixed => panic!("level 2 never produces mixed expressions"),
            }
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_level_three_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..1000 {
            let problem = generate_problem(3, &mut rng);
            let (a, b) = operands(&problem);
            match problem.operation {
                Operation::Multiplication => {
                    assert!((5..=15).contains(&a) && (5..=15).contains(&b));
                }
                Operation::Division => {
                    assert!((3..=12).contains(&b));
                    assert!((2..=12).contains(&problem.answer));
                    assert_eq!(a, b * problem.answer);
                }
                other => panic!("unexpected level-3 operation {:?}", other),
            }
        }
    }

    #[test]
    fn test_level_four_is_mixed() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut saw_parens = false;
        let mut saw_plain = false;
        for _ in 0..500 {
            let problem = generate_problem(4, &mut rng);
            assert_eq!(problem.operation, Operation::Mixed);
            if problem.question.starts_with('(') {
                saw_parens = true;
            } else {
                saw_plain = true;
                assert_eq!(problem.question.split_whitespace().count(), 5);
            }
        }
        assert!(saw_parens && saw_plain);
    }

    #[test]
    fn test_high_levels_fall_back_to_level_four() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for level in [5, 12, u32::MAX] {
            let problem = generate_problem(level, &mut rng);
            assert_eq!(problem.operation, Operation::Mixed);
        }
    }

    #[test]
    fn test_level_zero_treated_as_level_one() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        for _ in 0..100 {
            let problem = generate_problem(0, &mut rng);
            assert!(matches!(
                problem.operation,
                Operation::Addition | Operation::Subtraction
            ));
        }
    }

    #[test]
    fn test_random_problems_source() {
        let mut source = RandomProblems::new(ChaCha8Rng::seed_from_u64(7));
        let problem = source.next_problem(3);
        assert!(matches!(
            problem.operation,
            Operation::Multiplication | Operation::Division
        ));
    }

    #[test]
    fn test_operation_names_serialize_lowercase() {
        let json = serde_json::to_string(&Operation::Mixed).unwrap();
        assert_eq!(json, "\"mixed\"");
        for op in Operation::ALL {
            let json = serde_json::to_string(&op).unwrap();
            assert_eq!(json, format!("\"{}\"", op.name()));
        }
    }
}
