//! This module turns script text into a *Script*, which is ready to be executed.
//!
//! Loading happens in two passes:
//! 1. Every logical line becomes a typed *Statement*, with its arguments checked.
//! 2. A structural pass pairs every block with its end, resolves labels, and records the jumps the engine needs.
//!
//! Any problem found here is a *TokenizeError*, so a script with a broken structure never runs.

use std::collections::HashMap;

use crate::prelude::*;

use super::{
	lexer::{logical_lines, split_words, SourceLine},
	token::{ForEnumerationType, ForLoop, IfConditionType, SelectBlock, Statement, Token, TokenType},
};

/// Tokenizes a whole script, keeping its comments.
pub fn tokenize(text: &str) -> TokenizeResult<Vec<Statement>> {
	logical_lines(text).iter()
		.map(parse_statement)
		.collect()
}

/// Parses a single logical line into a statement.
pub fn parse_statement(line: &SourceLine) -> TokenizeResult<Statement> {
	if let Some(comment) = line.comment() {
		return Ok(Statement { line: line.number, token: Token::Comment(comment.to_owned()) });
	}

	let mut words = split_words(line)?;
	if words.is_empty() {
		return Ok(Statement { line: line.number, token: Token::Comment(String::new()) });
	}

	let keyword = words.remove(0);
	let Some(kind) = TokenType::from_keyword(&keyword) else {
		return Err(TokenizeError::UnknownKeyword { line: line.number, keyword });
	};

	let (min, max) = kind.arity();
	check_count(line, kind.keyword(), words.len(), min, max)?;

	let token = build_token(line, kind, words)?;
	Ok(Statement { line: line.number, token })
}

/// Fails if *found* is outside of the (min, max) contract.
fn check_count(line: &SourceLine, keyword: &'static str, found: usize, min: usize, max: Option<usize>) -> TokenizeResult<()> {
	if found < min || max.is_some_and(|max| found > max) {
		return Err(TokenizeError::WrongArgumentCount {
			line: line.number,
			text: line.text.clone(),
			keyword,
			min,
			max,
			found,
		});
	}

	Ok(())
}

/// Builds the typed token for a statement whose arity is already checked.
fn build_token(line: &SourceLine, kind: TokenType, mut args: Vec<String>) -> TokenizeResult<Token> {
	let token = match kind {
		TokenType::If | TokenType::IfNot => {
			let name = args.remove(0);
			let Some(condition) = IfConditionType::from_name(&name) else {
				return Err(TokenizeError::UnknownCondition { line: line.number, condition: name });
			};

			let (min, max) = condition.arity();
			check_count(line, condition.name(), args.len(), min, Some(max))?;

			Token::If { negated: kind == TokenType::IfNot, condition, args }
		},

		TokenType::For => Token::For(build_for(line, args)?),

		kind if kind.is_select_prompt() => Token::Select(build_select(line, kind, args)?),

		TokenType::ConflictsWith | TokenType::DependsOn | TokenType::ConflictsWithRegex | TokenType::DependsOnRegex => {
			// Versions come in a group of four, so four arguments fits no shape.
			if args.len() == 4 {
				return Err(TokenizeError::MalformedConflict { line: line.number, text: line.text.clone() });
			}

			Token::Instruction { kind, args }
		},

		TokenType::Else => Token::Else,
		TokenType::EndIf => Token::EndIf,
		TokenType::EndFor => Token::EndFor,
		TokenType::Continue => Token::Continue,
		TokenType::Exit => Token::Exit,
		TokenType::SelectVar => Token::SelectVar { variable: args.remove(0) },
		TokenType::SelectString => Token::SelectString { value: args.remove(0) },
		TokenType::Case => Token::Case { value: args.remove(0) },
		TokenType::Default => Token::Default,
		TokenType::Break => Token::Break,
		TokenType::EndSelect => Token::EndSelect,
		TokenType::Label => Token::Label(args.remove(0)),
		TokenType::Goto => Token::Goto(args.remove(0)),
		TokenType::Return => Token::Return,
		TokenType::FatalError => Token::FatalError,

		TokenType::SetVar => {
			let value = args.remove(1);
			Token::SetVar { variable: args.remove(0), value }
		},

		kind => Token::Instruction { kind, args },
	};

	Ok(token)
}

/// Builds a 'For' loop header from its arguments.
fn build_for(line: &SourceLine, args: Vec<String>) -> TokenizeResult<ForLoop> {
	let mut args = args.into_iter();
	let first = args.next().unwrap_or_default();
	let rest: Vec<String> = args.collect();

	if first.eq_ignore_ascii_case("Count") {
		check_count(line, "For Count", rest.len() + 1, 4, Some(5))?;
		let mut rest = rest.into_iter();

		return Ok(ForLoop::Count {
			variable: rest.next().unwrap_or_default(),
			start: rest.next().unwrap_or_default(),
			end: rest.next().unwrap_or_default(),
			step: rest.next(),
		});
	}

	if !first.eq_ignore_ascii_case("Each") {
		return Err(TokenizeError::UnknownEnumeration { line: line.number, kind: first });
	}

	let mut rest = rest.into_iter();
	let name = rest.next().unwrap_or_default();
	let kind = match ForEnumerationType::from_name(&name) {
		Some(ForEnumerationType::Count) | None => {
			return Err(TokenizeError::UnknownEnumeration { line: line.number, kind: name });
		},
		Some(kind) => kind,
	};

	Ok(ForLoop::Each {
		kind,
		variable: rest.next().unwrap_or_default(),
		folder: rest.next().unwrap_or_default(),
		recurse: rest.next(),
		pattern: rest.next(),
	})
}

/// Splits a select statement's flat option list into items, previews, and descriptions.
fn build_select(line: &SourceLine, kind: TokenType, mut args: Vec<String>) -> TokenizeResult<SelectBlock> {
	let (is_multi, has_previews, has_descriptions) = kind.select_shape().unwrap_or_default();
	let per_option = 1 + has_previews as usize + has_descriptions as usize;

	let title = args.remove(0);
	if args.is_empty() || args.len() % per_option != 0 {
		return Err(TokenizeError::MalformedSelect {
			line: line.number,
			text: line.text.clone(),
			per_option,
			found: args.len(),
		});
	}

	let mut items = Vec::new();
	let mut previews = has_previews.then(Vec::new);
	let mut descriptions = has_descriptions.then(Vec::new);

	for chunk in args.chunks(per_option) {
		let mut parts = chunk.iter().cloned();
		items.extend(parts.next());
		if let Some(list) = previews.as_mut() { list.extend(parts.next()); }
		if let Some(list) = descriptions.as_mut() { list.extend(parts.next()); }
	}

	Ok(SelectBlock { kind, title, items, previews, descriptions, is_multi })
}

/// Where the engine goes from a structural statement.
/// Every index refers to the script's comment-free statement list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Link {
	/// The statement does not jump anywhere.
	None,

	/// On an 'If': its 'Else', if any, and its 'EndIf'.
	If { else_at: Option<usize>, end: usize },

	/// On an 'Else': its 'EndIf'.
	Else { end: usize },

	/// On a 'For': its 'EndFor'.
	Loop { end: usize },

	/// On an 'EndFor', 'Continue', or 'Exit': the 'For' it belongs to.
	LoopControl { start: usize },

	/// On a select: its first 'Case' or 'Default' (or 'EndSelect' if it has none), and its 'EndSelect'.
	Select { first_case: usize, end: usize },

	/// On a 'Case' or 'Default': the statement ending it, and the select it belongs to.
	Case { next: usize, select: usize },

	/// On a 'Break': the 'Case' or 'Default' it ends.
	Break { case: usize },

	/// On a 'Goto': its 'Label'.
	Goto { target: usize },
}

/// A loaded script, ready for the engine.
#[derive(Clone, Debug, Default)]
pub struct Script {
	statements: Vec<Statement>,
	links: Vec<Link>,

	/// The innermost block start (If, For, select, or case) around each statement.
	parents: Vec<Option<usize>>,

	labels: HashMap<String, usize>,
}

/// A block that is still open during the structural pass.
enum OpenBlock {
	If { start: usize, else_at: Option<usize> },
	For { start: usize },
	Select { start: usize, first_case: Option<usize> },
	Case { start: usize, select: usize },
}

impl OpenBlock {
	fn start(&self) -> usize {
		match self {
			OpenBlock::If { start, .. }
			| OpenBlock::For { start }
			| OpenBlock::Select { start, .. }
			| OpenBlock::Case { start, .. } => *start,
		}
	}
}

impl Script {
	/// Loads a script from its text.
	pub fn parse(text: &str) -> TokenizeResult<Self> {
		let statements = tokenize(text)?
			.into_iter()
			.filter(|s| !matches!(s.token, Token::Comment(_)))
			.collect();

		Self::from_statements(statements)
	}

	/// Builds a script from comment-free statements, running the structural pass over them.
	pub fn from_statements(statements: Vec<Statement>) -> TokenizeResult<Self> {
		let mut script = Script {
			links: vec![Link::None; statements.len()],
			parents: vec![None; statements.len()],
			labels: HashMap::new(),
			statements,
		};

		script.link_blocks()?;
		script.resolve_gotos()?;

		debug!("Loaded a script with {} statements and {} labels.", script.statements.len(), script.labels.len());
		Ok(script)
	}

	/// Returns every statement of this script, without comments.
	pub fn statements(&self) -> &[Statement] {
		&self.statements
	}

	/// Returns where the statement at *index* jumps to.
	pub fn link(&self, index: usize) -> Link {
		self.links.get(index).copied().unwrap_or(Link::None)
	}

	/// Returns the statement index of a label.
	pub fn label(&self, name: &str) -> Option<usize> {
		self.labels.get(name).copied()
	}

	/// Returns the block starts around a statement, innermost first.
	pub fn ancestors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
		let first = self.parents.get(index).copied().flatten();
		std::iter::successors(first, move |p| self.parents.get(*p).copied().flatten())
	}

	/// Returns the number of statements in this script.
	pub fn len(&self) -> usize {
		self.statements.len()
	}

	/// Checks if this script has no statements.
	pub fn is_empty(&self) -> bool {
		self.statements.is_empty()
	}

	/// Pairs every block with its end and records the links between them.
	fn link_blocks(&mut self) -> TokenizeResult<()> {
		let mut open: Vec<OpenBlock> = Vec::new();

		for index in 0..self.statements.len() {
			let line = self.statements[index].line;
			let kind = self.statements[index].token.kind();
			let unexpected = |expected| TokenizeError::UnexpectedToken { line, keyword: kind.keyword(), expected };

			// A new case closes the one before it, so that has to happen before the parent is recorded.
			if matches!(kind, TokenType::Case | TokenType::Default | TokenType::EndSelect) {
				if let Some(&OpenBlock::Case { start, select }) = open.last() {
					self.links[start] = Link::Case { next: index, select };
					open.pop();
				}
			}

			self.parents[index] = open.last().map(OpenBlock::start);

			match &self.statements[index].token {
				Token::If { .. } => open.push(OpenBlock::If { start: index, else_at: None }),

				Token::Else => match open.last_mut() {
					Some(OpenBlock::If { else_at: else_at @ None, .. }) => *else_at = Some(index),
					_ => return Err(unexpected("an 'If' block without an 'Else'")),
				},

				Token::EndIf => match open.pop() {
					Some(OpenBlock::If { start, else_at }) => {
						self.links[start] = Link::If { else_at, end: index };
						if let Some(else_at) = else_at {
							self.links[else_at] = Link::Else { end: index };
						}
					},
					_ => return Err(unexpected("an 'If' block")),
				},

				Token::For(_) => open.push(OpenBlock::For { start: index }),

				Token::EndFor => match open.pop() {
					Some(OpenBlock::For { start }) => {
						self.links[start] = Link::Loop { end: index };
						self.links[index] = Link::LoopControl { start };
					},
					_ => return Err(unexpected("a 'For' block")),
				},

				Token::Continue | Token::Exit => {
					let Some(start) = open.iter().rev().find_map(|b| match b {
						OpenBlock::For { start } => Some(*start),
						_ => None,
					}) else {
						return Err(unexpected("a 'For' block"));
					};

					self.links[index] = Link::LoopControl { start };
				},

				Token::Select(_) | Token::SelectVar { .. } | Token::SelectString { .. } => {
					open.push(OpenBlock::Select { start: index, first_case: None });
				},

				Token::Case { .. } | Token::Default => match open.last_mut() {
					Some(OpenBlock::Select { start, first_case }) => {
						let select = *start;
						first_case.get_or_insert(index);
						open.push(OpenBlock::Case { start: index, select });
					},
					_ => return Err(unexpected("a select block")),
				},

				Token::Break => {
					let case = open.iter().rev()
						.find(|b| !matches!(b, OpenBlock::If { .. }))
						.and_then(|b| match b {
							OpenBlock::Case { start, .. } => Some(*start),
							_ => None,
						});

					let Some(case) = case else { return Err(unexpected("a 'Case' block")) };
					self.links[index] = Link::Break { case };
				},

				Token::EndSelect => match open.pop() {
					Some(OpenBlock::Select { start, first_case }) => {
						self.links[start] = Link::Select { first_case: first_case.unwrap_or(index), end: index };
					},
					_ => return Err(unexpected("a select block")),
				},

				Token::Label(name) => {
					if self.labels.insert(name.clone(), index).is_some() {
						return Err(TokenizeError::DuplicateLabel { line, label: name.clone() });
					}
				},

				_ => {},
			}
		}

		// Cases are closed by their select, so the select is the block worth reporting.
		if let Some(block) = open.iter().rev().find(|b| !matches!(b, OpenBlock::Case { .. })) {
			let statement = &self.statements[block.start()];
			return Err(TokenizeError::UnclosedBlock { line: statement.line, keyword: statement.token.kind().keyword() });
		}

		Ok(())
	}

	/// Resolves every 'Goto' to its label.
	/// A jump may leave blocks, but it may not enter one it isn't already inside.
	fn resolve_gotos(&mut self) -> TokenizeResult<()> {
		for index in 0..self.statements.len() {
			let Token::Goto(label) = &self.statements[index].token else { continue };
			let line = self.statements[index].line;

			let Some(target) = self.label(label) else {
				return Err(TokenizeError::UnknownLabel { line, label: label.clone() });
			};

			let target_parent = self.parents[target];
			if target_parent.is_some_and(|p| !self.ancestors(index).contains(&p)) {
				return Err(TokenizeError::GotoIntoBlock { line, label: label.clone() });
			}

			self.links[index] = Link::Goto { target };
		}

		Ok(())
	}
}
