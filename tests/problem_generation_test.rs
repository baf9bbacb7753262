//! Integration test: problem generation across levels
//!
//! Every generated question must evaluate to its stored answer, and operands
//! must stay inside the ranges each level promises.

use math_runner::problem::{evaluate, generate_problem, Operation, ProblemSource, RandomProblems};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const SAMPLES: usize = 1000;

/// Split "a op b" into its operands.
fn operands(question: &str) -> (i64, i64) {
    let parts: Vec<&str> = question.split_whitespace().collect();
    assert_eq!(parts.len(), 3, "expected binary question: {}", question);
    (parts[0].parse().unwrap(), parts[2].parse().unwrap())
}

#[test]
fn test_every_level_answer_matches_question() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for level in 1..=6 {
        for _ in 0..SAMPLES {
            let problem = generate_problem(level, &mut rng);
            assert_eq!(
                evaluate(&problem.question),
                Some(problem.answer),
                "level {} question {:?}",
                level,
                problem.question
            );
        }
    }
}

#[test]
fn test_level_one_is_small_addition_and_subtraction() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for _ in 0..SAMPLES {
        let problem = generate_problem(1, &mut rng);
        let (a, b) = operands(&problem.question);
        assert!((1..=10).contains(&a) && (1..=10).contains(&b));
        match problem.operation {
            Operation::Addition => assert_eq!(problem.answer, a + b),
            Operation::Subtraction => assert!(problem.answer >= 0),
            other => panic!("unexpected level 1 operation {:?}", other),
        }
    }
}

#[test]
fn test_level_two_ranges() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    for _ in 0..SAMPLES {
        let problem = generate_problem(2, &mut rng);
        let (a, b) = operands(&problem.question);
        match problem.operation {
            Operation::Addition => {
                assert!((10..=50).contains(&a) && (10..=50).contains(&b));
            }
            Operation::Subtraction => {
                assert!((25..=99).contains(&a));
                assert!((1..=a).contains(&b));
            }
            Operation::Multiplication => {
                assert!((2..=10).contains(&a) && (2..=10).contains(&b));
            }
            Operation::Division => {
                assert!((2..=10).contains(&b));
                assert_eq!(a % b, 0);
                assert!((1..=10).contains(&problem.answer));
            }
            Operation::Mixed => panic!("mixed expression at level 2"),
        }
    }
}

#[test]
fn test_level_three_is_multiplication_or_exact_division() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut seen = std::collections::BTreeSet::new();
    for _ in 0..SAMPLES {
        let problem = generate_problem(3, &mut rng);
        let (a, b) = operands(&problem.question);
        seen.insert(problem.operation);
        match problem.operation {
            Operation::Multiplication => {
                assert!((5..=15).contains(&a) && (5..=15).contains(&b));
            }
            Operation::Division => {
                assert!((3..=12).contains(&b));
                assert_eq!(a % b, 0);
                assert!((2..=12).contains(&problem.answer));
            }
            other => panic!("unexpected level 3 operation {:?}", other),
        }
    }
    assert_eq!(seen.len(), 2);
}

#[test]
fn test_level_four_produces_both_expression_shapes() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let mut parenthesized = 0;
    let mut flat = 0;
    for _ in 0..SAMPLES {
        let problem = generate_problem(4, &mut rng);
        assert_eq!(problem.operation, Operation::Mixed);
        if problem.question.starts_with('(') {
            parenthesized += 1;
        } else {
            flat += 1;
            assert_eq!(problem.question.split_whitespace().count(), 5);
        }
    }
    assert!(parenthesized > 0 && flat > 0);
}

#[test]
fn test_random_source_is_reproducible_with_seed() {
    let mut first = RandomProblems::new(ChaCha8Rng::seed_from_u64(99));
    let mut second = RandomProblems::new(ChaCha8Rng::seed_from_u64(99));
    for level in [1, 2, 3, 4, 4, 2] {
        assert_eq!(first.next_problem(level), second.next_problem(level));
    }
}
