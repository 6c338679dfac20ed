//! response binder
//!
//! checks a raw `data` payload against the selection descriptor, then
//! deserializes it into the caller's target.

use crate::error::{Error, Result};
use crate::operation::Operation;
use crate::selection::{Field, SelectionSet, TypeRef};
use serde::Deserialize;
use serde_json::Value;

/// bind `data` into `target`
///
/// `target` is only replaced once the whole payload checks out and
/// deserializes; on error it keeps its previous value.
pub fn bind<T: Operation>(data: &Value, target: &mut T) -> Result<()> {
    check_selection(data, &T::selection(), "data")?;
    let value = T::deserialize(data).map_err(|err| Error::Bind(err.to_string()))?;
    *target = value;
    Ok(())
}

fn check_selection(value: &Value, selection: &SelectionSet, path: &str) -> Result<()> {
    let object = value
        .as_object()
        .ok_or_else(|| mismatch(path, "object", value))?;
    for field in selection.fields() {
        let key = field.response_key();
        let field_path = format!("{path}.{key}");
        let value = object
            .get(key)
            .ok_or_else(|| Error::Bind(format!("{field_path}: missing from response")))?;
        check_value(value, field.type_ref(), field, &field_path)?;
    }
    Ok(())
}

fn check_value(value: &Value, ty: &TypeRef, field: &Field, path: &str) -> Result<()> {
    if value.is_null() {
        if ty.is_nullable() {
            return Ok(());
        }
        return Err(Error::Bind(format!("{path}: null for non-null type {ty}")));
    }

    match ty {
        TypeRef::List { inner, .. } => {
            let items = value
                .as_array()
                .ok_or_else(|| mismatch(path, "list", value))?;
            for (i, item) in items.iter().enumerate() {
                check_value(item, inner, field, &format!("{path}[{i}]"))?;
            }
            Ok(())
        }
        TypeRef::Named { .. } if !field.selection().is_empty() => {
            check_selection(value, field.selection(), path)
        }
        TypeRef::Named { name, .. } => check_scalar(value, name, path),
    }
}

fn check_scalar(value: &Value, scalar: &str, path: &str) -> Result<()> {
    let ok = match scalar {
        "Int" => value.is_i64() || value.is_u64(),
        "Float" => value.is_number(),
        "String" => value.is_string(),
        "Boolean" => value.is_boolean(),
        "ID" => value.is_string() || value.is_i64() || value.is_u64(),
        // custom scalars carry arbitrary json
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(mismatch(path, scalar, value))
    }
}

fn mismatch(path: &str, expected: &str, found: &Value) -> Error {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    };
    Error::Bind(format!("{path}: expected {expected}, found {found}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct RepoQuery {
        repository: Option<Repository>,
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Repository {
        name: String,
        #[serde(rename = "stargazerCount")]
        stars: i64,
        topics: Vec<Option<String>>,
        owner: Owner,
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Owner {
        id: String,
    }

    impl Operation for RepoQuery {
        fn selection() -> SelectionSet {
            SelectionSet::new([Field::object(
                "repository",
                "Repository",
                [
                    Field::scalar("name", "String"),
                    Field::scalar("stargazerCount", "Int"),
                    Field::new(
                        "topics",
                        TypeRef::list(TypeRef::named("String").nullable()),
                    ),
                    Field::object("owner", "RepositoryOwner", [Field::scalar("id", "ID")]),
                ],
            )
            .nullable()])
        }
    }

    fn repo_json() -> Value {
        json!({
            "repository": {
                "name": "graphql",
                "stargazerCount": 42,
                "topics": ["go", null],
                "owner": {"id": "MDQ6VXNlcjE="}
            }
        })
    }

    #[test]
    fn test_bind_nested() {
        let mut target = RepoQuery::default();
        bind(&repo_json(), &mut target).unwrap();
        let repo = target.repository.unwrap();
        assert_eq!(repo.name, "graphql");
        assert_eq!(repo.stars, 42);
        assert_eq!(repo.topics, vec![Some("go".to_string()), None]);
        assert_eq!(repo.owner.id, "MDQ6VXNlcjE=");
    }

    #[test]
    fn test_bind_nullable_root() {
        let mut target = RepoQuery::default();
        bind(&json!({"repository": null}), &mut target).unwrap();
        assert!(target.repository.is_none());
    }

    #[test]
    fn test_bind_non_null_violation_keeps_target() {
        let mut target = RepoQuery::default();
        bind(&repo_json(), &mut target).unwrap();

        let mut bad = repo_json();
        bad["repository"]["name"] = Value::Null;
        let err = bind(&bad, &mut target).unwrap_err();
        assert!(matches!(err, Error::Bind(_)));
        assert!(err.to_string().contains("data.repository.name"));
        assert_eq!(target.repository.as_ref().unwrap().name, "graphql");
    }

    #[test]
    fn test_bind_missing_field() {
        let mut bad = repo_json();
        bad["repository"]["owner"].as_object_mut().unwrap().remove("id");
        let err = bind(&bad, &mut RepoQuery::default()).unwrap_err();
        assert!(err.to_string().contains("data.repository.owner.id: missing"));
    }

    #[test]
    fn test_bind_scalar_and_list_mismatch() {
        let mut bad = repo_json();
        bad["repository"]["stargazerCount"] = json!(4.5);
        let err = bind(&bad, &mut RepoQuery::default()).unwrap_err();
        assert!(err.to_string().contains("expected Int, found number"));

        let mut bad = repo_json();
        bad["repository"]["topics"] = json!("go");
        let err = bind(&bad, &mut RepoQuery::default()).unwrap_err();
        assert!(err.to_string().contains("data.repository.topics: expected list"));

        let mut bad = repo_json();
        bad["repository"]["topics"] = json!(["go", 3]);
        let err = bind(&bad, &mut RepoQuery::default()).unwrap_err();
        assert!(err.to_string().contains("data.repository.topics[1]"));
    }

    #[test]
    fn test_bind_alias_key() {
        #[derive(Debug, Default, Deserialize)]
        struct Aliased {
            handle: String,
        }
        impl Operation for Aliased {
            fn selection() -> SelectionSet {
                SelectionSet::new([Field::scalar("login", "String").alias("handle")])
            }
        }

        let mut target = Aliased::default();
        bind(&json!({"handle": "octocat"}), &mut target).unwrap();
        assert_eq!(target.handle, "octocat");
        assert!(bind(&json!({"login": "octocat"}), &mut target).is_err());
    }
}
