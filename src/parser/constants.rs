// Constants for the script parser

/// Deepest nesting of expressions, operator chains and statement bodies
/// accepted before a parse fails with `NestingTooDeep`. A parse at this depth
/// fits a 2 MiB thread stack in an unoptimized build.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

/// Spaces per indentation level in printed source
pub const INDENT_WIDTH: usize = 4;
