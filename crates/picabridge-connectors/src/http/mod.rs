pub mod assembler;
pub mod body_builder;
pub mod codegen;
pub mod dispatcher;
pub mod executor;
pub mod partitioner;
pub mod path_template;
pub mod url_builder;

pub use body_builder::{BodyBuilder, BuiltBody};
pub use dispatcher::{ActionDispatcher, ExecuteOutcome, GenerateOutcome, RequestEcho};
pub use executor::{HttpExecutionResult, HttpExecutor};
