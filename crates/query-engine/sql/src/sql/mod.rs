//! A SQL AST, its conversion to parameterized SQL text, and the plans handed to execution.

pub mod ast;
pub mod convert;
pub mod execution_plan;
pub mod helpers;
pub mod string;
