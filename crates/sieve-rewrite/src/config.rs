//! Building rules and engines from a [`RewriteConfig`].

use sieve_core::{
    ColumnRuleDefinition, CombinedRuleDefinition, ConditionRuleDefinition, ConfigError,
    RewriteConfig, RuleDefinition,
};

use crate::engine::RewriteEngine;
use crate::parser::SqlParser;
use crate::rule::{AddColumnRule, AddConditionRule, CombinedRule, Rule, TypedRule};

/// Turn every configured rule into an engine rule, in declaration order.
pub fn build_rules(config: &RewriteConfig) -> Result<Vec<Box<dyn Rule>>, ConfigError> {
    config.validate()?;
    config.rules.iter().map(build_rule).collect()
}

fn build_rule(definition: &RuleDefinition) -> Result<Box<dyn Rule>, ConfigError> {
    let rule: Box<dyn Rule> = match definition {
        RuleDefinition::AddCondition(condition) => Box::new(condition_rule(condition)),
        RuleDefinition::AddColumn(column) => Box::new(column_rule(column)),
        RuleDefinition::Combined(combined) => Box::new(combined_rule(combined)?),
    };
    Ok(rule)
}

fn build_typed_rule(definition: &RuleDefinition) -> Result<Box<dyn TypedRule>, ConfigError> {
    let rule: Box<dyn TypedRule> = match definition {
        RuleDefinition::AddCondition(condition) => Box::new(condition_rule(condition)),
        RuleDefinition::AddColumn(column) => Box::new(column_rule(column)),
        RuleDefinition::Combined(_) => {
            return Err(ConfigError::Config(
                "combined rules cannot be nested".to_string(),
            ));
        }
    };
    Ok(rule)
}

fn condition_rule(definition: &ConditionRuleDefinition) -> AddConditionRule {
    let rule = AddConditionRule::new(
        definition.statement,
        &definition.table,
        &definition.column,
        definition.value.clone(),
    );
    match definition.priority {
        Some(priority) => rule.with_priority(priority),
        None => rule,
    }
}

fn column_rule(definition: &ColumnRuleDefinition) -> AddColumnRule {
    let rule = AddColumnRule::new(
        &definition.table,
        &definition.column,
        definition.value.clone(),
    );
    match definition.priority {
        Some(priority) => rule.with_priority(priority),
        None => rule,
    }
}

fn combined_rule(definition: &CombinedRuleDefinition) -> Result<CombinedRule, ConfigError> {
    let rules = definition
        .rules
        .iter()
        .map(build_typed_rule)
        .collect::<Result<Vec<_>, _>>()?;
    let rule = CombinedRule::new(rules);
    Ok(match definition.priority {
        Some(priority) => rule.with_priority(priority),
        None => rule,
    })
}

impl RewriteEngine {
    /// Build an engine for the configured dialect and rules.
    pub fn from_config(config: &RewriteConfig) -> Result<Self, ConfigError> {
        let rules = build_rules(config)?;
        Ok(Self::with_parser(SqlParser::new(config.dialect), rules))
    }
}
