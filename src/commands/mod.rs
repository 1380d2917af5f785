//! Command registry, handlers and the pipeline evaluator.
//!
//! Parsing and filtering are kept apart from the handlers, so the evaluator
//! can be tested with stub commands and no database.

pub mod format;
pub mod handlers;
pub mod help;
pub mod output;
pub mod pipeline;
pub mod registry;
pub mod result;
pub mod sequence;
pub mod tokenizer;

pub use handlers::{register_all, HandlerError};
pub use output::OutputSink;
pub use pipeline::{EvalError, Evaluation, Evaluator, PipelineError};
pub use registry::{Command, Handler, HandlerResult, Registry};
pub use result::{ResultLine, ResultValue, IGNORE_MARKER};
pub use sequence::{parse_ids, parse_sequence};
