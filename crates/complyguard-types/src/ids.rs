//! Stable identifiers for rulesets and rules.
//!
//! Rule ids are a dotted namespace: `<ruleset or validator>.<snake_case_rule>`.

// Rulesets
pub const RULESET_BASIC: &str = "basic";
pub const RULESET_LICENSING: &str = "licensing";

pub const RULESET_BASIC_VERSION: &str = "1.0.0";
pub const RULESET_LICENSING_VERSION: &str = "1.0.0";

// Rules: basic
pub const RULE_BASIC_NO_LICENSE: &str = "basic.no_license";
pub const RULE_BASIC_UNKNOWN_MATCH_STATE: &str = "basic.unknown_match_state";
pub const RULE_BASIC_MISSING_IDENTITY: &str = "basic.missing_identity";
pub const RULE_BASIC_DUPLICATE_ARTIFACT: &str = "basic.duplicate_artifact";

// Rules: licensing
pub const RULE_LICENSING_UNKNOWN_LICENSE: &str = "licensing.unknown_license";
pub const RULE_LICENSING_STRONG_COPYLEFT: &str = "licensing.strong_copyleft";
pub const RULE_LICENSING_PROPRIETARY_COPYLEFT_MIX: &str = "licensing.proprietary_copyleft_mix";

// Validators
pub const VALIDATOR_LICENSE: &str = "license-validator";
pub const VALIDATOR_SECURITY: &str = "security-validator";
pub const VALIDATOR_SOURCE: &str = "source-validator";

pub const RULE_LICENSE_NO_LICENSE: &str = "license.no_license";
pub const RULE_LICENSE_FORBIDDEN: &str = "license.forbidden";
pub const RULE_LICENSE_NO_TEXT: &str = "license.no_text";

pub const RULE_SECURITY_FORBIDDEN_STATUS: &str = "security.forbidden_status";
pub const RULE_SECURITY_SEVERITY_LIMIT: &str = "security.severity_limit";

pub const RULE_SOURCE_MISSING_SOURCES: &str = "source.missing_sources";
pub const RULE_SOURCE_MISSING_BINARY: &str = "source.missing_binary";

// Tool-level
pub const RULE_TOOL_RUNTIME: &str = "tool.runtime";
