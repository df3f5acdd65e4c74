//! Filter evaluation over BSON documents.
//!
//! Interprets the subset of the MongoDB filter dialect this repository emits:
//! exact field matches, the `$eq`/`$ne`/`$gt`/`$gte`/`$lt`/`$lte`/`$in`/
//! `$nin`/`$exists` conditions, the `$and`/`$or`/`$nor` combinators, and
//! `$expr` comparison expressions with `"$field"` operand references. Anything
//! outside the subset is rejected as a backend fault rather than silently
//! mismatched, the way a real engine rejects an unknown operator.

use std::cmp::Ordering;

use bson::{Bson, Document};

use shelterstore_core::error::{StoreError, StoreResult};

pub(crate) struct FilterEvaluator;

impl FilterEvaluator {
    /// Whether `document` satisfies `filter`. An empty filter matches
    /// everything.
    pub fn matches(filter: &Document, document: &Document) -> StoreResult<bool> {
        for (key, condition) in filter {
            let matched = match key.as_str() {
                "$and" => Self::all(condition, document)?,
                "$or" => Self::any(condition, document)?,
                "$nor" => !Self::any(condition, document)?,
                "$expr" => is_truthy(&Self::eval_expr(condition, document)?),
                key if key.starts_with('$') => {
                    return Err(unsupported("filter operator", key));
                }
                field => Self::field_matches(lookup_path(document, field), condition)?,
            };

            if !matched {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn all(condition: &Bson, document: &Document) -> StoreResult<bool> {
        for clause in clause_list(condition, "$and")? {
            if !Self::matches(clause, document)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn any(condition: &Bson, document: &Document) -> StoreResult<bool> {
        for clause in clause_list(condition, "$or")? {
            if Self::matches(clause, document)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn field_matches(value: Option<&Bson>, condition: &Bson) -> StoreResult<bool> {
        // A mapping whose keys are all operators is a condition set; anything
        // else is an exact match.
        if let Bson::Document(ops) = condition {
            if !ops.is_empty() && ops.keys().all(|k| k.starts_with('$')) {
                return Self::apply_operators(value, ops);
            }
        }

        Ok(match value {
            Some(value) => values_equal(value, condition),
            // {field: null} also matches documents missing the field.
            None => matches!(condition, Bson::Null),
        })
    }

    fn apply_operators(value: Option<&Bson>, ops: &Document) -> StoreResult<bool> {
        for (op, operand) in ops {
            let holds = match op.as_str() {
                "$eq" => value.is_some_and(|v| values_equal(v, operand)),
                "$ne" => !value.is_some_and(|v| values_equal(v, operand)),
                "$gt" => ordering_holds(value, operand, &[Ordering::Greater]),
                "$gte" => ordering_holds(value, operand, &[Ordering::Greater, Ordering::Equal]),
                "$lt" => ordering_holds(value, operand, &[Ordering::Less]),
                "$lte" => ordering_holds(value, operand, &[Ordering::Less, Ordering::Equal]),
                "$in" => in_list(value, operand)?,
                "$nin" => !in_list(value, operand)?,
                "$exists" => is_truthy(operand) == value.is_some(),
                other => return Err(unsupported("field operator", other)),
            };

            if !holds {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Evaluates an aggregation-style expression to a BSON value.
    ///
    /// Strings starting with `$` resolve as field paths; single-operator
    /// mappings apply `$and`/`$or`/`$not` or a two-operand comparison;
    /// everything else is a literal.
    fn eval_expr(expr: &Bson, document: &Document) -> StoreResult<Bson> {
        match expr {
            Bson::String(s) if s.starts_with('$') => Ok(lookup_path(document, &s[1..])
                .cloned()
                .unwrap_or(Bson::Null)),
            Bson::Document(ops) if ops.len() == 1 => {
                let (op, operand) = ops.iter().next().expect("len checked");

                match op.as_str() {
                    "$and" => {
                        for term in expr_operands(operand, "$and")? {
                            if !is_truthy(&Self::eval_expr(term, document)?) {
                                return Ok(Bson::Boolean(false));
                            }
                        }
                        Ok(Bson::Boolean(true))
                    }
                    "$or" => {
                        for term in expr_operands(operand, "$or")? {
                            if is_truthy(&Self::eval_expr(term, document)?) {
                                return Ok(Bson::Boolean(true));
                            }
                        }
                        Ok(Bson::Boolean(false))
                    }
                    "$not" => {
                        let inner = match operand {
                            Bson::Array(terms) if terms.len() == 1 => &terms[0],
                            other => other,
                        };
                        Ok(Bson::Boolean(!is_truthy(&Self::eval_expr(
                            inner, document,
                        )?)))
                    }
                    "$eq" | "$ne" | "$gt" | "$gte" | "$lt" | "$lte" => {
                        let terms = expr_operands(operand, op)?;
                        if terms.len() != 2 {
                            return Err(StoreError::Backend(format!(
                                "{op} expects exactly two operands"
                            )));
                        }

                        let left = Self::eval_expr(&terms[0], document)?;
                        let right = Self::eval_expr(&terms[1], document)?;

                        Ok(Bson::Boolean(match op.as_str() {
                            "$eq" => values_equal(&left, &right),
                            "$ne" => !values_equal(&left, &right),
                            "$gt" => compare(&left, &right) == Some(Ordering::Greater),
                            "$gte" => matches!(
                                compare(&left, &right),
                                Some(Ordering::Greater | Ordering::Equal)
                            ),
                            "$lt" => compare(&left, &right) == Some(Ordering::Less),
                            _ => matches!(
                                compare(&left, &right),
                                Some(Ordering::Less | Ordering::Equal)
                            ),
                        }))
                    }
                    other => Err(unsupported("expression operator", other)),
                }
            }
            Bson::Document(_) => Err(StoreError::Backend(
                "expression mappings must hold exactly one operator".to_string(),
            )),
            literal => Ok(literal.clone()),
        }
    }
}

/// Resolves a (possibly dotted) field path inside a document.
fn lookup_path<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut current = document;
    let mut segments = path.split('.').peekable();

    while let Some(segment) = segments.next() {
        let value = current.get(segment)?;

        if segments.peek().is_none() {
            return Some(value);
        }
        current = value.as_document()?;
    }

    None
}

fn clause_list<'a>(condition: &'a Bson, op: &str) -> StoreResult<Vec<&'a Document>> {
    let Bson::Array(clauses) = condition else {
        return Err(StoreError::Backend(format!(
            "{op} requires an array of clauses"
        )));
    };

    clauses
        .iter()
        .map(|clause| {
            clause
                .as_document()
                .ok_or_else(|| StoreError::Backend(format!("{op} clauses must be mappings")))
        })
        .collect()
}

fn expr_operands<'a>(operand: &'a Bson, op: &str) -> StoreResult<&'a Vec<Bson>> {
    match operand {
        Bson::Array(terms) => Ok(terms),
        _ => Err(StoreError::Backend(format!(
            "{op} requires an array of operands"
        ))),
    }
}

fn in_list(value: Option<&Bson>, operand: &Bson) -> StoreResult<bool> {
    let Bson::Array(candidates) = operand else {
        return Err(StoreError::Backend(
            "$in/$nin require an array of candidates".to_string(),
        ));
    };

    Ok(match value {
        Some(value) => candidates.iter().any(|c| values_equal(value, c)),
        // A missing field only matches a null candidate.
        None => candidates.iter().any(|c| matches!(c, Bson::Null)),
    })
}

fn ordering_holds(value: Option<&Bson>, operand: &Bson, accepted: &[Ordering]) -> bool {
    value
        .and_then(|v| compare(v, operand))
        .is_some_and(|ordering| accepted.contains(&ordering))
}

/// Equality with the engine's numeric semantics: integer and floating widths
/// compare by value, arrays and mappings compare structurally.
fn values_equal(a: &Bson, b: &Bson) -> bool {
    if let (Some(x), Some(y)) = (number_of(a), number_of(b)) {
        return x == y;
    }

    match (a, b) {
        (Bson::Array(xs), Bson::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Bson::Document(xd), Bson::Document(yd)) => {
            xd.len() == yd.len()
                && xd
                    .iter()
                    .zip(yd.iter())
                    .all(|((xk, xv), (yk, yv))| xk == yk && values_equal(xv, yv))
        }
        _ => a == b,
    }
}

/// Ordering for the scalar types the criteria compare; mixed or non-scalar
/// operands have no defined order and never satisfy a range condition.
fn compare(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (number_of(a), number_of(b)) {
        return x.partial_cmp(&y);
    }

    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn number_of(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

fn is_truthy(value: &Bson) -> bool {
    match value {
        Bson::Null | Bson::Undefined => false,
        Bson::Boolean(b) => *b,
        Bson::Int32(v) => *v != 0,
        Bson::Int64(v) => *v != 0,
        Bson::Double(v) => *v != 0.0,
        _ => true,
    }
}

fn unsupported(kind: &str, op: &str) -> StoreError {
    StoreError::Backend(format!("unsupported {kind}: {op}"))
}
