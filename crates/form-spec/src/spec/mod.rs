pub mod field;
pub mod rules;
pub mod template;

pub use field::{ColumnType, Field, FieldType, TableColumn};
pub use rules::{ConditionOperator, ConditionalRule, RuleValue, ValidationRule, ValidationRuleType};
pub use template::{Section, Template};
