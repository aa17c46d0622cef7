//! Row queries
//!
//! A small filter/order/limit builder that renders to PostgREST query
//! parameters for the hosted backend and evaluates in memory for the local
//! backend. Both sides must agree on the result set.

use serde_json::Value;
use std::cmp::Ordering;

use super::Row;

/// A single column predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Neq(String, Value),
    Gt(String, Value),
    Gte(String, Value),
    Lt(String, Value),
    Lte(String, Value),
    /// Case-insensitive substring match
    ILike(String, String),
    In(String, Vec<Value>),
    IsNull(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// Query against one table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::Eq(column.to_string(), value.into()))
    }

    pub fn neq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::Neq(column.to_string(), value.into()))
    }

    pub fn gte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::Gte(column.to_string(), value.into()))
    }

    pub fn lte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::Lte(column.to_string(), value.into()))
    }

    pub fn ilike(self, column: &str, term: &str) -> Self {
        self.filter(Filter::ILike(column.to_string(), term.to_string()))
    }

    pub fn in_list(self, column: &str, values: Vec<Value>) -> Self {
        self.filter(Filter::In(column.to_string(), values))
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            direction,
        });
        self
    }

    /// Newest first, the default ordering for dashboards
    pub fn newest_first(self) -> Self {
        self.order_by("created_at", Direction::Desc)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Render as PostgREST query parameters
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];

        for filter in &self.filters {
            let (column, expr) = match filter {
                Filter::Eq(c, v) => (c, format!("eq.{}", render_value(v))),
                Filter::Neq(c, v) => (c, format!("neq.{}", render_value(v))),
                Filter::Gt(c, v) => (c, format!("gt.{}", render_value(v))),
                Filter::Gte(c, v) => (c, format!("gte.{}", render_value(v))),
                Filter::Lt(c, v) => (c, format!("lt.{}", render_value(v))),
                Filter::Lte(c, v) => (c, format!("lte.{}", render_value(v))),
                Filter::ILike(c, term) => (c, format!("ilike.*{}*", like_pattern(term))),
                Filter::In(c, values) => {
                    let joined: Vec<String> = values.iter().map(render_list_item).collect();
                    (c, format!("in.({})", joined.join(",")))
                }
                Filter::IsNull(c) => (c, "is.null".to_string()),
            };
            params.push((column.clone(), expr));
        }

        if let Some(order) = &self.order {
            let dir = match order.direction {
                Direction::Asc => "asc",
                Direction::Desc => "desc",
            };
            params.push(("order".to_string(), format!("{}.{}", order.column, dir)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset".to_string(), offset.to_string()));
        }

        params
    }

    /// Render as an encoded query string (without the leading `?`)
    pub fn to_query_string(&self) -> String {
        self.to_params()
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Does a row satisfy every filter
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|f| filter_matches(f, row))
    }

    /// Filter, order and page a set of rows in memory
    pub fn apply(&self, rows: Vec<Row>) -> Vec<Row> {
        let mut rows: Vec<Row> = rows.into_iter().filter(|r| self.matches(r)).collect();

        if let Some(order) = &self.order {
            rows.sort_by(|a, b| {
                let ord = match (a.get(&order.column), b.get(&order.column)) {
                    (Some(x), Some(y)) if !x.is_null() && !y.is_null() => {
                        compare_values(x, y).unwrap_or(Ordering::Equal)
                    }
                    // nulls last regardless of direction
                    (Some(x), _) if !x.is_null() => return Ordering::Less,
                    (_, Some(y)) if !y.is_null() => return Ordering::Greater,
                    _ => Ordering::Equal,
                };
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        let offset = self.offset.unwrap_or(0);
        let iter = rows.into_iter().skip(offset);
        match self.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// List items are double-quoted so `,` `(` `)` inside a value stay literal
fn render_list_item(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        other => render_value(other),
    }
}

/// Escape LIKE metacharacters. PostgREST turns every `*` into `%`, so a
/// literal star can only be approximated by a single-character wildcard.
fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        match c {
            '\\' | '%' | '_' => {
                out.push('\\');
                out.push(c);
            }
            '*' => out.push('_'),
            c => out.push(c),
        }
    }
    out
}

fn filter_matches(filter: &Filter, row: &Row) -> bool {
    let cell = |c: &str| row.get(c).unwrap_or(&Value::Null);
    match filter {
        Filter::Eq(c, v) => values_equal(cell(c), v),
        // SQL semantics: a null cell satisfies no comparison
        Filter::Neq(c, v) => !cell(c).is_null() && !values_equal(cell(c), v),
        Filter::Gt(c, v) => compare_values(cell(c), v) == Some(Ordering::Greater),
        Filter::Gte(c, v) => matches!(
            compare_values(cell(c), v),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Filter::Lt(c, v) => compare_values(cell(c), v) == Some(Ordering::Less),
        Filter::Lte(c, v) => matches!(
            compare_values(cell(c), v),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Filter::ILike(c, term) => contains_ci(cell(c), &term.to_lowercase()),
        Filter::In(c, values) => values.iter().any(|v| values_equal(cell(c), v)),
        Filter::IsNull(c) => cell(c).is_null(),
    }
}

fn contains_ci(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Array(items) => items.iter().any(|v| contains_ci(v, needle)),
        _ => false,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    a == b || compare_values(a, b) == Some(Ordering::Equal)
}

/// Numbers compare numerically, strings lexicographically. Query parameters
/// arrive as strings, so a numeric string is compared against a number.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::String(y)) => x.as_f64()?.partial_cmp(&y.parse::<f64>().ok()?),
        (Value::String(x), Value::Number(y)) => x.parse::<f64>().ok()?.partial_cmp(&y.as_f64()?),
        (Value::Bool(x), Value::String(y)) => Some(x.to_string().as_str().cmp(y.as_str())),
        _ => None,
    }
}
