//! Stable identifiers for checks and finding codes.
//!
//! `check_id` is a dotted namespace. `code` is a short snake_case discriminator.

// Checks
pub const CHECK_REGO_SYNTAX: &str = "rego.syntax";
pub const CHECK_REGO_IMPORTS: &str = "rego.imports";
pub const CHECK_REGO_DATA_ACCESS: &str = "rego.data_access";
pub const CHECK_REGO_PACKAGE: &str = "rego.package";
pub const CHECK_REGO_RULES: &str = "rego.rules";

// Codes: rego.syntax
pub const CODE_EMPTY_SOURCE: &str = "empty_source";
pub const CODE_PARSE_ERROR: &str = "parse_error";

// Codes: rego.imports
pub const CODE_IMPORT_USED: &str = "import_used";

// Codes: rego.data_access
pub const CODE_MISSING_FIELD: &str = "missing_field";
pub const CODE_COMPUTED_FIELD: &str = "computed_field";
pub const CODE_INVALID_FIELD: &str = "invalid_field";

// Codes: rego.package
pub const CODE_INVALID_PACKAGE_PATH: &str = "invalid_package_path";

// Codes: rego.rules
pub const CODE_MISSING_RULE: &str = "missing_rule";
pub const CODE_ARITY_MISMATCH: &str = "arity_mismatch";
pub const CODE_INVALID_SIGNATURE: &str = "invalid_signature";
pub const CODE_CONFLICTING_ARITY: &str = "conflicting_arity";

// Tool-level
pub const CHECK_TOOL_RUNTIME: &str = "tool.runtime";
pub const CODE_RUNTIME_ERROR: &str = "runtime_error";
