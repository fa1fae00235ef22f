//! # sieve-core
//!
//! Configuration model shared by the sieve crates: the rules file format,
//! dialect selection and logging defaults.

pub mod config;

pub use config::{
    ColumnRuleDefinition, CombinedRuleDefinition, ConditionRuleDefinition, ConfigError,
    DialectKind, LoggingConfig, RewriteConfig, RuleDefinition, RuleValue, StatementTarget,
};

/// JSON schema describing the rules file.
pub const REWRITE_CONFIG_SCHEMA: &str = include_str!("../../../schemas/RewriteConfig.schema.json");

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
dialect: postgres
logging:
  level: sieve_rewrite=debug
rules:
  - kind: add_condition
    table: tenant
    column: tenant_id
    value: TENANT_1
    priority: 5
  - kind: add_condition
    statement: update
    table: public.orders
    column: tenant_id
    value: 1
  - kind: add_column
    table: tenant
    column: tenant_id
    value: TENANT_1
  - kind: combined
    priority: 1
    rules:
      - kind: add_condition
        statement: delete
        table: orders
        column: deleted
        value: false
"#;

    fn validator() -> jsonschema::Validator {
        let schema: serde_json::Value =
            serde_json::from_str(REWRITE_CONFIG_SCHEMA).expect("schema must parse");
        jsonschema::draft202012::options()
            .build(&schema)
            .expect("schema must compile")
    }

    #[test]
    fn test_sample_config_validates_against_schema() {
        let instance: serde_json::Value = serde_yaml::from_str(SAMPLE).unwrap();
        let validator = validator();

        if !validator.is_valid(&instance) {
            let mut msgs = Vec::new();
            for (idx, err) in validator.iter_errors(&instance).take(20).enumerate() {
                msgs.push(format!("{}: {}", idx + 1, err));
            }
            panic!("sample config did not validate: {}", msgs.join("; "));
        }

        let config = RewriteConfig::from_yaml(SAMPLE).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.leaf_rule_count(), 4);
    }

    #[test]
    fn test_schema_rejects_unknown_rule_kind() {
        let instance: serde_json::Value = serde_yaml::from_str(
            "rules:\n  - kind: rename_table\n    table: tenant\n    column: id\n",
        )
        .unwrap();
        assert!(!validator().is_valid(&instance));
    }

    #[test]
    fn test_serialized_config_validates_against_schema() {
        let config = RewriteConfig::from_yaml(SAMPLE).unwrap();
        let instance = serde_json::to_value(&config).expect("config must serialize");
        assert!(validator().is_valid(&instance));
    }
}
