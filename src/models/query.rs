use serde::{Deserialize, Serialize};

/// 随文档一起提交的自然语言问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDefinition {
    pub text: String,
    pub alias: String,
    /// 适用页码，`*` 表示全部页
    #[serde(default = "all_pages")]
    pub pages: Vec<String>,
}

impl QueryDefinition {
    pub fn new(text: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            alias: alias.into(),
            pages: all_pages(),
        }
    }
}

fn all_pages() -> Vec<String> {
    vec!["*".to_string()]
}

/// 固定的四个问题，每份文档都相同
pub fn default_queries() -> Vec<QueryDefinition> {
    vec![
        QueryDefinition::new("What is the beneficiary bank name?", "Beneficiary Bank"),
        QueryDefinition::new("What is the beneficiary bank ABA number?", "ABA"),
        QueryDefinition::new("What is the loan number?", "Loan Number"),
        QueryDefinition::new("What account should funds be wired to?", "Account Number"),
    ]
}
