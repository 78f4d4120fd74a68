pub mod api;
pub mod binding;
pub mod ds;
pub mod eval;
pub mod isolation;
pub mod plugin;
pub mod std_lib;
