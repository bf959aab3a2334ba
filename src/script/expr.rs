//! This module evaluates the arithmetic behind 'iSet' and 'fSet'.
//!
//! Expressions support `+ - * / % ^`, unary minus, and parentheses.
//! Float expressions can also call a handful of math functions, like `sqrt(2)`.

use std::{iter::Peekable, str::Chars};

use crate::prelude::*;

/// Error returned when an expression can't be evaluated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
	#[error("unexpected character '{0}'")]
	UnexpectedChar(char),

	#[error("'{0}' is not a valid number")]
	BadNumber(String),

	#[error("unknown function '{0}'")]
	UnknownFunction(String),

	#[error("expected {0}")]
	Expected(&'static str),

	#[error("division by zero")]
	DivideByZero,

	#[error("the result does not fit in an integer")]
	Overflow,

	#[error("the expression nests deeper than {0} levels")]
	TooDeep(usize),
}

type ExprResult<T> = Result<T, ExprError>;

/// How deeply parentheses and unary operators may nest.
const MAX_DEPTH: usize = 128;

/// Evaluates an integer expression, as 'iSet' does.
pub fn eval_int(expression: &str) -> ExprResult<i64> {
	Evaluator::<i64>::run(expression)
}

/// Evaluates a float expression, as 'fSet' does.
pub fn eval_float(expression: &str) -> ExprResult<f64> {
	Evaluator::<f64>::run(expression)
}

/// The number types an expression can be evaluated in.
trait Arithmetic: Copy + Sized {
	fn parse(text: &str) -> Option<Self>;
	fn binary(op: char, lhs: Self, rhs: Self) -> ExprResult<Self>;
	fn negate(self) -> ExprResult<Self>;
	fn call(name: &str, arg: Self) -> ExprResult<Self>;
}

impl Arithmetic for i64 {
	fn parse(text: &str) -> Option<Self> {
		text.parse().ok()
	}

	fn binary(op: char, lhs: Self, rhs: Self) -> ExprResult<Self> {
		let result = match op {
			'+' => lhs.checked_add(rhs),
			'-' => lhs.checked_sub(rhs),
			'*' => lhs.checked_mul(rhs),
			'/' | '%' if rhs == 0 => return Err(ExprError::DivideByZero),
			'/' => lhs.checked_div(rhs),
			'%' => lhs.checked_rem(rhs),
			'^' => u32::try_from(rhs).ok().and_then(|e| lhs.checked_pow(e)),
			other => return Err(ExprError::UnexpectedChar(other)),
		};

		result.ok_or(ExprError::Overflow)
	}

	fn negate(self) -> ExprResult<Self> {
		self.checked_neg().ok_or(ExprError::Overflow)
	}

	fn call(name: &str, _: Self) -> ExprResult<Self> {
		Err(ExprError::UnknownFunction(name.to_owned()))
	}
}

impl Arithmetic for f64 {
	fn parse(text: &str) -> Option<Self> {
		text.parse().ok()
	}

	fn binary(op: char, lhs: Self, rhs: Self) -> ExprResult<Self> {
		let result = match op {
			'+' => lhs + rhs,
			'-' => lhs - rhs,
			'*' => lhs * rhs,
			'/' => lhs / rhs,
			'%' => lhs % rhs,
			'^' => lhs.powf(rhs),
			other => return Err(ExprError::UnexpectedChar(other)),
		};

		Ok(result)
	}

	fn negate(self) -> ExprResult<Self> {
		Ok(-self)
	}

	fn call(name: &str, arg: Self) -> ExprResult<Self> {
		let result = match name.to_lowercase().as_str() {
			"sin" => arg.sin(),
			"cos" => arg.cos(),
			"tan" => arg.tan(),
			"sinh" => arg.sinh(),
			"cosh" => arg.cosh(),
			"tanh" => arg.tanh(),
			"exp" => arg.exp(),
			"log" => arg.ln(),
			"log10" => arg.log10(),
			"sqrt" => arg.sqrt(),
			"abs" => arg.abs(),
			_ => return Err(ExprError::UnknownFunction(name.to_owned())),
		};

		Ok(result)
	}
}

/// A recursive-descent evaluator over the characters of an expression.
struct Evaluator<'a, T> {
	chars: Peekable<Chars<'a>>,
	depth: usize,
	_number: std::marker::PhantomData<T>,
}

impl<'a, T: Arithmetic> Evaluator<'a, T> {
	fn run(expression: &'a str) -> ExprResult<T> {
		let mut evaluator = Self { chars: expression.chars().peekable(), depth: 0, _number: std::marker::PhantomData };

		let value = evaluator.sum()?;
		match evaluator.peek() {
			Some(c) => Err(ExprError::UnexpectedChar(c)),
			None => Ok(value),
		}
	}

	/// Peeks at the next non-whitespace character.
	fn peek(&mut self) -> Option<char> {
		while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
		self.chars.peek().copied()
	}

	fn eat(&mut self, expected: char) -> bool {
		if self.peek() == Some(expected) {
			self.chars.next();
			return true;
		}

		false
	}

	fn sum(&mut self) -> ExprResult<T> {
		let mut value = self.product()?;

		while let Some(op) = self.peek().filter(|c| matches!(c, '+' | '-')) {
			self.chars.next();
			value = T::binary(op, value, self.product()?)?;
		}

		Ok(value)
	}

	fn product(&mut self) -> ExprResult<T> {
		let mut value = self.unary()?;

		while let Some(op) = self.peek().filter(|c| matches!(c, '*' | '/' | '%')) {
			self.chars.next();
			value = T::binary(op, value, self.unary()?)?;
		}

		Ok(value)
	}

	/// Every nested operand passes through here, so this is where nesting is counted.
	fn unary(&mut self) -> ExprResult<T> {
		if self.depth >= MAX_DEPTH {
			return Err(ExprError::TooDeep(MAX_DEPTH));
		}

		self.depth += 1;
		let value = self.signed();
		self.depth -= 1;
		value
	}

	fn signed(&mut self) -> ExprResult<T> {
		if self.eat('-') {
			return self.unary()?.negate();
		}

		if self.eat('+') {
			return self.unary();
		}

		self.power()
	}

	/// Powers bind tighter than unary minus on their left and associate to the right.
	fn power(&mut self) -> ExprResult<T> {
		let base = self.atom()?;

		if self.eat('^') {
			let exponent = self.unary()?;
			return T::binary('^', base, exponent);
		}

		Ok(base)
	}

	fn atom(&mut self) -> ExprResult<T> {
		match self.peek() {
			Some('(') => {
				self.chars.next();
				let value = self.sum()?;
				if !self.eat(')') { return Err(ExprError::Expected("')'")); }
				Ok(value)
			},

			Some(c) if c.is_ascii_digit() || c == '.' => {
				let text = self.take_while(|c| c.is_ascii_alphanumeric() || c == '.');
				T::parse(&text).ok_or(ExprError::BadNumber(text))
			},

			Some(c) if c.is_alphabetic() => {
				let name = self.take_while(|c| c.is_ascii_alphanumeric());
				if !self.eat('(') { return Err(ExprError::Expected("'(' after a function name")); }

				let arg = self.sum()?;
				if !self.eat(')') { return Err(ExprError::Expected("')'")); }
				T::call(&name, arg)
			},

			Some(c) => Err(ExprError::UnexpectedChar(c)),
			None => Err(ExprError::Expected("a value")),
		}
	}

	fn take_while(&mut self, keep: impl Fn(char) -> bool) -> String {
		let mut text = String::new();
		while let Some(c) = self.chars.next_if(|c| keep(*c)) {
			text.push(c);
		}

		text
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn integer_precedence_and_grouping() {
		assert_eq!(eval_int("1 + 2 * 3"), Ok(7));
		assert_eq!(eval_int("(1 + 2) * 3"), Ok(9));
		assert_eq!(eval_int("10 - 4 - 3"), Ok(3));
		assert_eq!(eval_int("7 % 4"), Ok(3));
		assert_eq!(eval_int("2 ^ 3 ^ 2"), Ok(512));
		assert_eq!(eval_int("-2 ^ 2"), Ok(-4));
		assert_eq!(eval_int("- 3 + 5"), Ok(2));
	}

	#[test]
	fn integer_errors() {
		assert_eq!(eval_int("1 / 0"), Err(ExprError::DivideByZero));
		assert_eq!(eval_int("1.5 + 1"), Err(ExprError::BadNumber("1.5".to_owned())));
		assert_eq!(eval_int("sqrt(4)"), Err(ExprError::UnknownFunction("sqrt".to_owned())));
		assert_eq!(eval_int("(1 + 2"), Err(ExprError::Expected("')'")));
		assert_eq!(eval_int("2 ^ 64"), Err(ExprError::Overflow));
		assert_eq!(eval_int(""), Err(ExprError::Expected("a value")));
	}

	#[test]
	fn float_functions() {
		assert_eq!(eval_float("sqrt(16) + 0.5"), Ok(4.5));
		assert_eq!(eval_float("abs(-2) * 1.5"), Ok(3.0));
		assert_eq!(eval_float("1 / 4"), Ok(0.25));
		assert!(matches!(eval_float("nope(1)"), Err(ExprError::UnknownFunction(_))));
	}

	#[test]
	fn deep_nesting_is_an_error() {
		let nested = format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000));
		assert_eq!(eval_int(&nested), Err(ExprError::TooDeep(MAX_DEPTH)));
		assert_eq!(eval_float(&"-".repeat(200_000)), Err(ExprError::TooDeep(MAX_DEPTH)));

		let shallow = format!("{}1{}", "(".repeat(50), ")".repeat(50));
		assert_eq!(eval_int(&shallow), Ok(1));
	}
}
