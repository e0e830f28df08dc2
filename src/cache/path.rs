// Attribute-path traversal over stored values.
//
// A path is matched against the shallowest node of the value in which every
// segment resolves, searching breadth-first from the root. Objects are
// indexed by key and arrays by decimal position.

use std::collections::VecDeque;

use serde_json::{Map, Value};

use crate::error::{Result, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Key(String),
    Index(usize),
}

fn child<'a>(node: &'a Value, segment: &str) -> Option<(Step, &'a Value)> {
    match node {
        Value::Object(map) => map
            .get(segment)
            .map(|value| (Step::Key(segment.to_string()), value)),
        Value::Array(items) => {
            let index = segment.parse::<usize>().ok()?;
            items.get(index).map(|value| (Step::Index(index), value))
        }
        _ => None,
    }
}

/// Steps taking `node` to `path`, when every segment resolves directly below it.
fn anchored(node: &Value, path: &[String]) -> Option<Vec<Step>> {
    let mut steps = Vec::with_capacity(path.len());
    let mut current = node;
    for segment in path {
        let (step, next) = child(current, segment)?;
        steps.push(step);
        current = next;
    }
    Some(steps)
}

fn walk<'a>(root: &'a Value, steps: &[Step]) -> Option<&'a Value> {
    steps.iter().try_fold(root, |node, step| match (step, node) {
        (Step::Key(key), Value::Object(map)) => map.get(key),
        (Step::Index(index), Value::Array(items)) => items.get(*index),
        _ => None,
    })
}

fn walk_mut<'a>(root: &'a mut Value, steps: &[Step]) -> Option<&'a mut Value> {
    steps.iter().try_fold(root, |node, step| match (step, node) {
        (Step::Key(key), Value::Object(map)) => map.get_mut(key),
        (Step::Index(index), Value::Array(items)) => items.get_mut(*index),
        _ => None,
    })
}

fn locate(root: &Value, path: &[String]) -> Option<Vec<Step>> {
    let mut queue = VecDeque::from([Vec::new()]);
    while let Some(prefix) = queue.pop_front() {
        let node = walk(root, &prefix)?;
        if let Some(tail) = anchored(node, path) {
            let mut steps = prefix;
            steps.extend(tail);
            return Some(steps);
        }

        match node {
            Value::Object(map) => {
                for key in map.keys() {
                    let mut next = prefix.clone();
                    next.push(Step::Key(key.clone()));
                    queue.push_back(next);
                }
            }
            Value::Array(items) => {
                for index in 0..items.len() {
                    let mut next = prefix.clone();
                    next.push(Step::Index(index));
                    queue.push_back(next);
                }
            }
            _ => {}
        }
    }
    None
}

fn not_found(path: &[String]) -> StoreError {
    StoreError::PathNotFound(path.join("."))
}

/// Look up `path` inside `root`.
pub fn find<'a>(root: &'a Value, path: &[String]) -> Result<&'a Value> {
    locate(root, path)
        .and_then(|steps| walk(root, &steps))
        .ok_or_else(|| not_found(path))
}

/// Replace the value at `path`, or create it under the root when no node holds it.
///
/// An empty path replaces `root` itself. Creation adds intermediate objects as
/// needed but never overwrites a scalar to make room.
pub fn assign(root: &mut Value, path: &[String], value: Value) -> Result<()> {
    if path.is_empty() {
        *root = value;
        return Ok(());
    }

    if let Some(steps) = locate(root, path) {
        let slot = walk_mut(root, &steps).ok_or_else(|| not_found(path))?;
        *slot = value;
        return Ok(());
    }

    let (last, parents) = path.split_last().ok_or_else(|| not_found(path))?;
    let mut current = root;
    for segment in parents {
        current = match current {
            Value::Object(map) => map
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new())),
            Value::Array(items) => {
                let index = segment.parse::<usize>().map_err(|_| not_found(path))?;
                items.get_mut(index).ok_or_else(|| not_found(path))?
            }
            _ => return Err(not_found(path)),
        };
    }

    match current {
        Value::Object(map) => {
            map.insert(last.clone(), value);
            Ok(())
        }
        _ => Err(not_found(path)),
    }
}
