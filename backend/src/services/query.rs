//! Natural-language query service
//!
//! Questions are translated to SQL by the language model, checked to be a single
//! read-only statement, and run inside a read-only transaction. Rows come back
//! as a JSON array whatever their shape.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::external::GeminiClient;

/// Upper bound on generated statement runtime
const STATEMENT_TIMEOUT: &str = "10s";

#[derive(Clone)]
pub struct QueryService {
    db: PgPool,
    gemini: GeminiClient,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryInput {
    #[serde(default)]
    pub query: String,
}

/// A question answered with rows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryAnswer {
    pub success: bool,
    pub original_query: String,
    pub sql_query: String,
    pub results: serde_json::Value,
    pub message: String,
}

/// A question that could not be answered; sent with a 200 status
#[derive(Debug, Clone, Serialize)]
pub struct QueryFailure {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl QueryFailure {
    pub fn not_configured() -> Self {
        Self {
            success: false,
            error: "Gemini API key not configured".to_string(),
            message: Some("Set GEMINI_API_KEY to enable natural language queries".to_string()),
        }
    }

    pub fn not_converted() -> Self {
        Self {
            success: false,
            error: "Failed to convert query to SQL".to_string(),
            message: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    Answered(QueryAnswer),
    Failed(QueryFailure),
}

/// Skip whitespace and leading `--` / `/* */` comments.
///
/// `None` when a block comment is left open.
fn skip_comments(mut sql: &str) -> Option<&str> {
    loop {
        sql = sql.trim_start();
        if let Some(rest) = sql.strip_prefix("--") {
            sql = rest.find('\n').map_or("", |idx| &rest[idx + 1..]);
        } else if let Some(rest) = sql.strip_prefix("/*") {
            sql = &rest[rest.find("*/")? + 2..];
        } else {
            return Some(sql);
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scan {
    Code,
    Literal,
    Identifier,
    LineComment,
    BlockComment,
}

/// Byte offset of the first `;` outside literals, quoted identifiers and comments
fn first_terminator(sql: &str) -> Option<usize> {
    let mut state = Scan::Code;
    let mut chars = sql.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        state = match (state, c) {
            (Scan::Code, ';') => return Some(idx),
            (Scan::Code, '\'') => Scan::Literal,
            (Scan::Code, '"') => Scan::Identifier,
            (Scan::Code, '-') if next == Some('-') => {
                chars.next();
                Scan::LineComment
            }
            (Scan::Code, '/') if next == Some('*') => {
                chars.next();
                Scan::BlockComment
            }
            // A doubled quote is an escaped quote inside the literal
            (Scan::Literal, '\'') if next == Some('\'') => {
                chars.next();
                Scan::Literal
            }
            (Scan::Literal, '\'') | (Scan::Identifier, '"') => Scan::Code,
            (Scan::LineComment, '\n') => Scan::Code,
            (Scan::BlockComment, '*') if next == Some('/') => {
                chars.next();
                Scan::Code
            }
            (state, _) => state,
        };
    }
    None
}

fn rejected(reason: &str) -> AppError {
    AppError::UnsafeQuery(reason.to_string())
}

/// Check a generated statement is a single SELECT (or WITH ... SELECT) and
/// return it without leading comments or trailing semicolons.
///
/// Semicolons inside string literals, quoted identifiers and comments do not
/// end the statement. Dollar-quoted bodies are not recognised, so a `;` inside
/// one is treated as a second statement.
pub fn guard_sql(sql: &str) -> AppResult<String> {
    let body = skip_comments(sql).ok_or_else(|| rejected("unterminated comment"))?;

    let statement = match first_terminator(body) {
        Some(end) => {
            let mut rest = &body[end..];
            loop {
                rest = skip_comments(rest).ok_or_else(|| rejected("unterminated comment"))?;
                match rest.strip_prefix(';') {
                    Some(after) => rest = after,
                    None => break,
                }
            }
            if !rest.is_empty() {
                return Err(rejected("multiple statements are not allowed"));
            }
            &body[..end]
        }
        None => body,
    }
    .trim_end();

    if statement.is_empty() {
        return Err(rejected("empty statement"));
    }

    let first_word = statement
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    if first_word != "select" && first_word != "with" {
        return Err(rejected("only SELECT queries are allowed"));
    }

    Ok(statement.to_string())
}

/// Trim a question and reject blank ones
pub fn validate_question(question: &str) -> AppResult<&str> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AppError::Validation {
            field: "query".to_string(),
            message: "Query is required".to_string(),
        });
    }
    Ok(question)
}

/// Wrap a statement so any result shape comes back as one JSON array.
///
/// The statement sits on its own lines so a trailing `--` comment cannot
/// swallow the closing parenthesis.
pub fn wrap_as_json(statement: &str) -> String {
    format!(
        "SELECT COALESCE(json_agg(t), '[]'::json) FROM (\n{}\n) t",
        statement
    )
}

impl QueryService {
    pub fn new(db: PgPool, gemini: GeminiClient) -> Self {
        Self { db, gemini }
    }

    /// Answer a free-text question with rows from the database
    pub async fn ask(&self, question: &str) -> AppResult<QueryOutcome> {
        let question = validate_question(question)?;

        let generated = match self.gemini.question_to_sql(question).await {
            Ok(Some(sql)) => sql,
            Ok(None) => {
                tracing::warn!("Language model returned no SQL for: {}", question);
                return Ok(QueryOutcome::Failed(QueryFailure::not_converted()));
            }
            Err(AppError::LanguageModel(reason)) => {
                tracing::warn!("Language model request failed for {:?}: {}", question, reason);
                return Ok(QueryOutcome::Failed(QueryFailure::not_converted()));
            }
            Err(e) => return Err(e),
        };

        let statement = guard_sql(&generated)?;
        let results = self.execute(&statement).await?;
        let count = results.as_array().map(Vec::len).unwrap_or_default();

        Ok(QueryOutcome::Answered(QueryAnswer {
            success: true,
            original_query: question.to_string(),
            sql_query: statement,
            results,
            message: format!("Found {} results", count),
        }))
    }

    /// Run a guarded statement in a read-only transaction
    pub async fn execute(&self, statement: &str) -> AppResult<serde_json::Value> {
        let mut tx = self.db.begin().await?;

        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!(
            "SET LOCAL statement_timeout = '{}'",
            STATEMENT_TIMEOUT
        ))
        .execute(&mut *tx)
        .await?;

        let wrapped = wrap_as_json(statement);
        let results = sqlx::query_scalar::<_, serde_json::Value>(&wrapped)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::warn!("Generated SQL failed: {}", e);
                AppError::QueryExecution(e.to_string())
            })?;

        tx.rollback().await?;

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_as_json() {
        assert_eq!(
            wrap_as_json("SELECT name FROM products"),
            "SELECT COALESCE(json_agg(t), '[]'::json) FROM (\nSELECT name FROM products\n) t"
        );
    }

    #[test]
    fn test_failure_bodies() {
        let body = serde_json::to_value(QueryFailure::not_converted()).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Failed to convert query to SQL");
        assert!(body.get("message").is_none());
    }
}
