pub mod condition_set;
pub mod error;
pub mod ir;
pub mod parser;
pub mod warning;

pub use condition_set::ConditionSet;
pub use error::{CompileError, CompileWarning, RuleCompilationError};
pub use ir::gate::Gate;
pub use ir::rule::{CompiledRule, Invocation, InvocationSummary, RuleSummary};
pub use ir::skeleton::{Skeleton, Token};
pub use parser::literal::parse_literal;
pub use parser::{ParseOutput, ParserConfig, RuleParser};
pub use warning::{FileSink, TracingSink, WarningSink, sink_from_config};
