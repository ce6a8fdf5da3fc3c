//! Fast Downward translator output format parser for the sasplan planner.
//!
//! The format is the line-oriented SAS encoding described at
//! <http://www.fast-downward.org/TranslatorOutputFormat>. Mutexes and axioms are not
//! supported: a non-empty mutex section is rejected with
//! [`ParserError::MutexUnsupported`] and the axiom layer marker of each variable is
//! ignored. Content past the operator section (such as the axiom rule count) is ignored
//! as well.

use std::io;

use sasplan_formula::{InvalidProblemError, Operator, PartialAssignment, Problem, State, Var, VarInfo};

use anyhow::Error;
use thiserror::Error;

/// Possible errors while parsing a translator output file.
///
/// All variants except [`MutexUnsupported`](ParserError::MutexUnsupported) report a
/// structurally malformed problem file. `MutexUnsupported` reports a recognized but
/// unimplemented feature. Both are fatal to the load; neither is recovered.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line {}: expected '{}', found '{}'", line, expected, found)]
    UnexpectedMarker {
        line: usize,
        expected: &'static str,
        found: String,
    },
    #[error("line {}: invalid integer '{}'", line, token)]
    InvalidInteger { line: usize, token: String },
    #[error("line {}: variable index {} is too large", line, index)]
    VarTooLarge { line: usize, index: i64 },
    #[error("line {}: expected {}, found '{}'", line, expected, found)]
    MalformedLine {
        line: usize,
        expected: &'static str,
        found: String,
    },
    #[error("line {}: unexpected end of input while reading {}", line, expected)]
    UnexpectedEof { line: usize, expected: &'static str },
    #[error("{} mutex groups present, mutexes are not supported", count)]
    MutexUnsupported { count: usize },
    #[error(transparent)]
    InvalidProblem(#[from] InvalidProblemError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Line reader tracking 1-based line numbers for error reporting.
struct LineReader<R> {
    lines: io::Lines<io::BufReader<R>>,
    line_number: usize,
}

impl<R: io::Read> LineReader<R> {
    fn new(input: R) -> LineReader<R> {
        use io::BufRead;
        LineReader {
            lines: io::BufReader::new(input).lines(),
            line_number: 0,
        }
    }

    fn next_line(&mut self, expected: &'static str) -> Result<String, ParserError> {
        self.line_number += 1;
        match self.lines.next() {
            Some(line) => Ok(line?.trim().to_owned()),
            None => Err(ParserError::UnexpectedEof {
                line: self.line_number,
                expected,
            }),
        }
    }

    fn expect_marker(&mut self, marker: &'static str) -> Result<(), ParserError> {
        let line = self.next_line(marker)?;
        if line != marker {
            return Err(ParserError::UnexpectedMarker {
                line: self.line_number,
                expected: marker,
                found: line,
            });
        }
        Ok(())
    }

    /// Reads a line holding a single non-negative integer.
    fn next_count(&mut self, expected: &'static str) -> Result<usize, ParserError> {
        let line = self.next_line(expected)?;
        parse_int(self.line_number, &line)
            .and_then(|value| to_index(self.line_number, value, &line))
    }
}

fn parse_int(line: usize, token: &str) -> Result<i64, ParserError> {
    token.parse().map_err(|_| ParserError::InvalidInteger {
        line,
        token: token.to_owned(),
    })
}

fn to_index(line: usize, value: i64, token: &str) -> Result<usize, ParserError> {
    if value < 0 {
        return Err(ParserError::InvalidInteger {
            line,
            token: token.to_owned(),
        });
    }
    Ok(value as usize)
}

/// Converts a parsed variable reference into a `Var`.
///
/// Indices past `Var::max_count()` must be rejected here: `Var::from_index` would
/// truncate them to a smaller index that problem validation can no longer tell apart
/// from a genuine reference.
fn to_var(line: usize, value: i64, token: &str) -> Result<Var, ParserError> {
    if value >= Var::max_count() as i64 {
        return Err(ParserError::VarTooLarge { line, index: value });
    }
    Ok(Var::from_index(to_index(line, value, token)?))
}

/// Splits a line into exactly `count` whitespace separated integers.
fn parse_fields(
    line_number: usize,
    line: &str,
    expected: &'static str,
    count: usize,
) -> Result<Vec<i64>, ParserError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != count {
        return Err(ParserError::MalformedLine {
            line: line_number,
            expected,
            found: line.to_owned(),
        });
    }
    tokens
        .iter()
        .map(|token| parse_int(line_number, token))
        .collect()
}

/// Parser for translator output files.
pub struct SasParser<R> {
    reader: LineReader<R>,
}

impl<R: io::Read> SasParser<R> {
    /// Parse the given input into a validated [`Problem`].
    pub fn parse(input: R) -> Result<Problem, Error> {
        Ok(Self::parse_problem(input)?)
    }

    fn parse_problem(input: R) -> Result<Problem, ParserError> {
        let mut parser = SasParser {
            reader: LineReader::new(input),
        };

        parser.skip_header("version header")?;
        parser.skip_header("metric header")?;
        let variables = parser.parse_variables()?;
        parser.check_mutexes()?;
        let init = parser.parse_state(variables.len())?;
        let goal = parser.parse_goal()?;
        let operators = parser.parse_operators()?;

        Ok(Problem::new(variables, init, goal, operators)?)
    }

    /// Version and metric sections are three lines each; their content is ignored.
    fn skip_header(&mut self, expected: &'static str) -> Result<(), ParserError> {
        for _ in 0..3 {
            self.reader.next_line(expected)?;
        }
        Ok(())
    }

    fn parse_variables(&mut self) -> Result<Vec<VarInfo>, ParserError> {
        let total = self.reader.next_count("variable count")?;
        let mut variables = Vec::with_capacity(total);
        for _ in 0..total {
            self.reader.expect_marker("begin_variable")?;
            let name = self.reader.next_line("variable name")?;
            // Axiom layer, ignored.
            self.reader.next_line("axiom layer")?;
            let domain_size = self.reader.next_count("value count")?;
            for _ in 0..domain_size {
                self.reader.next_line("value name")?;
            }
            self.reader.expect_marker("end_variable")?;
            variables.push(VarInfo { name, domain_size });
        }
        Ok(variables)
    }

    fn check_mutexes(&mut self) -> Result<(), ParserError> {
        let count = self.reader.next_count("mutex count")?;
        if count > 0 {
            return Err(ParserError::MutexUnsupported { count });
        }
        Ok(())
    }

    fn parse_state(&mut self, var_count: usize) -> Result<State, ParserError> {
        self.reader.expect_marker("begin_state")?;
        let mut init = Vec::with_capacity(var_count);
        for _ in 0..var_count {
            init.push(self.reader.next_count("state value")?);
        }
        self.reader.expect_marker("end_state")?;
        Ok(init)
    }

    fn parse_goal(&mut self) -> Result<PartialAssignment, ParserError> {
        self.reader.expect_marker("begin_goal")?;
        let count = self.reader.next_count("goal count")?;
        let mut goal = PartialAssignment::new();
        for _ in 0..count {
            let line = self.reader.next_line("goal condition")?;
            let fields = parse_fields(
                self.reader.line_number,
                &line,
                "goal condition 'variable value'",
                2,
            )?;
            let var = to_var(self.reader.line_number, fields[0], &line)?;
            let value = to_index(self.reader.line_number, fields[1], &line)?;
            goal.assign(var, value);
        }
        self.reader.expect_marker("end_goal")?;
        Ok(goal)
    }

    fn parse_operators(&mut self) -> Result<Vec<Operator>, ParserError> {
        let total = self.reader.next_count("operator count")?;
        let mut operators = Vec::with_capacity(total);
        for _ in 0..total {
            self.reader.expect_marker("begin_operator")?;
            let name = self.reader.next_line("operator name")?;
            let mut operator = Operator::new(name, 0);

            let prevails = self.reader.next_count("prevail condition count")?;
            for _ in 0..prevails {
                let line = self.reader.next_line("prevail condition")?;
                let fields = parse_fields(
                    self.reader.line_number,
                    &line,
                    "prevail condition 'variable value'",
                    2,
                )?;
                let var = to_var(self.reader.line_number, fields[0], &line)?;
                let value = to_index(self.reader.line_number, fields[1], &line)?;
                operator.pre.assign(var, value);
            }

            let effects = self.reader.next_count("effect count")?;
            for _ in 0..effects {
                let line = self.reader.next_line("effect")?;
                // The leading token is the effect condition count. Conditional effects
                // are not produced for the supported encodings, so it is ignored, as is
                // a precondition value of -1 which leaves the effect variable without a
                // backward precondition.
                let fields = parse_fields(
                    self.reader.line_number,
                    &line,
                    "effect 'conditions variable precondition postcondition'",
                    4,
                )?;
                let var = to_var(self.reader.line_number, fields[1], &line)?;
                let pre = fields[2];
                let post = to_index(self.reader.line_number, fields[3], &line)?;
                if pre > -1 {
                    operator
                        .pre
                        .assign(var, to_index(self.reader.line_number, pre, &line)?);
                }
                operator.post.assign(var, post);
            }

            operator.cost = self.reader.next_count("operator cost")? as u64;
            self.reader.expect_marker("end_operator")?;
            operators.push(operator);
        }
        Ok(operators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use sasplan_formula::partial;

    const TRIVIAL: &str = "\
begin_version
3
end_version
begin_metric
0
end_metric
2
begin_variable
var0
-1
2
Atom a
NegatedAtom a
end_variable
begin_variable
var1
-1
2
Atom b
NegatedAtom b
end_variable
0
begin_state
0
0
end_state
begin_goal
1
1 1
end_goal
1
begin_operator
make-b
1
0 0
1
0 1 -1 1
1
end_operator
0
";

    macro_rules! expect_error {
        ( $input:expr, $( $cases:tt )* ) => {
            match SasParser::parse($input.as_bytes()) {
                Ok(parsed) => panic!("expected error but got {:?}", parsed),
                Err(err) => match err.downcast_ref() {
                    Some(casted_err) => match casted_err {
                        $( $cases )*,
                        _ => panic!("unexpected error {:?}", casted_err),
                    },
                    None => panic!("unexpected error type {:?}", err),
                }
            }
        };
    }

    #[test]
    fn parses_a_small_problem() -> Result<(), Error> {
        let problem = SasParser::parse(TRIVIAL.as_bytes())?;

        assert_eq!(problem.var_count(), 2);
        assert_eq!(problem.variables()[0].name, "var0");
        assert_eq!(problem.variables()[1].domain_size, 2);
        assert_eq!(problem.init(), &[0, 0]);
        assert_eq!(problem.goal(), &partial![1 => 1]);

        let operator = &problem.operators()[0];
        assert_eq!(operator.name, "make-b");
        assert_eq!(operator.cost, 1);
        // The prevail condition and the skipped -1 backward precondition both land in
        // the merged precondition mapping or not at all.
        assert_eq!(operator.pre, partial![0 => 0]);
        assert_eq!(operator.post, partial![1 => 1]);

        Ok(())
    }

    #[test]
    fn wrong_markers() {
        expect_error!(
            TRIVIAL.replace("begin_variable", "begin_var"),
            ParserError::UnexpectedMarker { expected: "begin_variable", .. } => ()
        );
        expect_error!(
            TRIVIAL.replace("end_state", "end_st"),
            ParserError::UnexpectedMarker { expected: "end_state", .. } => ()
        );
        expect_error!(
            TRIVIAL.replace("begin_operator", "operator"),
            ParserError::UnexpectedMarker { expected: "begin_operator", .. } => ()
        );
    }

    #[test]
    fn malformed_integers() {
        expect_error!(
            TRIVIAL.replace("\n1 1\n", "\nx 1\n"),
            ParserError::InvalidInteger { .. } => ()
        );
        expect_error!(
            TRIVIAL.replace("\n1 1\n", "\n1\n"),
            ParserError::MalformedLine { .. } => ()
        );
        expect_error!(
            TRIVIAL.replace("\n0 1 -1 1\n", "\n0 1 -1\n"),
            ParserError::MalformedLine { .. } => ()
        );
    }

    #[test]
    fn truncated_input() {
        let cut = TRIVIAL.find("begin_goal").unwrap();
        expect_error!(
            TRIVIAL[..cut].to_owned(),
            ParserError::UnexpectedEof { .. } => ()
        );
    }

    #[test]
    fn nonempty_mutex_section() {
        expect_error!(
            TRIVIAL.replace("end_variable\n0\nbegin_state", "end_variable\n2\nbegin_state"),
            ParserError::MutexUnsupported { count: 2 } => ()
        );
    }

    #[test]
    fn oversized_variable_indices() {
        // 2^32 would truncate to variable 0 if it reached `Var::from_index`.
        expect_error!(
            TRIVIAL.replace("\n1 1\n", "\n4294967296 1\n"),
            ParserError::VarTooLarge { index: 4294967296, .. } => ()
        );
        expect_error!(
            TRIVIAL.replace("\n0 0\n", "\n4294967296 0\n"),
            ParserError::VarTooLarge { .. } => ()
        );
        expect_error!(
            TRIVIAL.replace("\n0 1 -1 1\n", "\n0 4294967296 -1 1\n"),
            ParserError::VarTooLarge { .. } => ()
        );
    }

    #[test]
    fn out_of_range_references() {
        expect_error!(
            TRIVIAL.replace("\n1 1\n", "\n7 1\n"),
            ParserError::InvalidProblem(InvalidProblemError::GoalVar { .. }) => ()
        );
        expect_error!(
            TRIVIAL.replace("\n1 1\n", "\n1 5\n"),
            ParserError::InvalidProblem(InvalidProblemError::GoalValue { .. }) => ()
        );
    }
}
