//! # nsbridge - Host bridge into namespaced function runtimes
//!
//! Call functions living in an embedded, namespace-organized runtime from
//! plain Rust code:
//! - Alias declarations (`"text :as s"`) mapping short prefixes to namespaces
//! - A small sequencing DSL (`do`, `let`, literals, invocations) with lexical scoping
//! - A variadic dispatcher feeding fixed-arity entry points for 0 to 20 arguments
//! - Typed interface bindings with per-parameter constraints and a method cache
//! - Isolated runtimes, one per module loader, with per-thread call brackets
//!
//! ## Quick Start
//!
//! ### Evaluating a block
//!
//! ```
//! use nsbridge::call;
//! use nsbridge::runner::api::Bridge;
//! use nsbridge::runner::ds::realm::Realm;
//! use nsbridge::runner::ds::value::Value;
//!
//! let bridge = Bridge::shared(Realm::new());
//! let result = bridge
//!     .do_all(&["text :as s"], &[call!("s/replace", "I see", "see", "C")])
//!     .unwrap();
//! assert_eq!(result, Value::string("I C"));
//! ```
//!
//! ### Let blocks
//!
//! ```
//! use nsbridge::{call, vars};
//! use nsbridge::runner::api::{let_block, Bridge};
//! use nsbridge::runner::ds::realm::Realm;
//! use nsbridge::runner::ds::value::Value;
//!
//! let bridge = Bridge::shared(Realm::new());
//! let block = [let_block(
//!     vars!("x" => "I see"),
//!     vec![call!("s/upper-case", "x")],
//! )];
//! let result = bridge.do_all(&["text :as s"], &block).unwrap();
//! assert_eq!(result, Value::string("I SEE"));
//! ```
//!
//! ### Running a script
//!
//! ```
//! use nsbridge::runner::api::Bridge;
//! use nsbridge::runner::ds::value::Value;
//!
//! let script = r#"
//!     (require "text :as s")
//!     (let [x "a,b"] (s/split x ","))
//! "#;
//! let result = Bridge::global().run_script(script).unwrap();
//! assert_eq!(result, Value::List(vec![Value::string("a"), Value::string("b")]));
//! ```
//!
//! ## Architecture
//!
//! - **[`parser`]** - pest reader for the script spelling of the DSL
//! - **[`runner`]** - Everything that runs
//!   - **[`runner::api`]** - `Bridge` and the `RuntimeAccess` seam
//!   - **[`runner::ds`]** - Values, aliases, scopes, realms and loaders
//!   - **[`runner::eval`]** - Evaluator and variadic dispatcher
//!   - **[`runner::plugin`]** - Namespace sources, registry and configuration
//!   - **[`runner::std_lib`]** - Standard namespaces (`core`, `text`, `io`)
//!   - **[`runner::binding`]** - Typed interface proxies
//!   - **[`runner::isolation`]** - Isolated runtime handles and call brackets

#[macro_use]
extern crate lazy_static;

pub mod parser;
pub mod runner;
