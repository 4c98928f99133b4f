pub mod debug_ast;
pub mod extract;
pub mod fs_scan;
pub mod ids;
pub mod normalize;
pub mod parse;
pub mod summary;
