//! query builder
//!
//! renders a selection descriptor and its variables into a compact graphql
//! document, e.g. `query($owner:String!){repository(owner:$owner){name}}`.

use crate::error::{Error, Result};
use crate::operation::Variables;
use crate::selection::{Field, SelectionSet};

/// render a query document
pub fn build_query(selection: &SelectionSet, variables: &Variables) -> Result<String> {
    if variables.is_empty() {
        // anonymous shorthand form
        let mut out = String::new();
        write_selection(&mut out, selection, variables)?;
        return Ok(out);
    }
    build_document("query", selection, variables)
}

/// render a mutation document
pub fn build_mutation(selection: &SelectionSet, variables: &Variables) -> Result<String> {
    build_document("mutation", selection, variables)
}

fn build_document(keyword: &str, selection: &SelectionSet, variables: &Variables) -> Result<String> {
    let mut out = String::from(keyword);
    if !variables.is_empty() {
        out.push('(');
        for (i, (name, ty)) in variables.definitions().enumerate() {
            check_name(name, "variable")?;
            if i > 0 {
                out.push(',');
            }
            out.push('$');
            out.push_str(name);
            out.push(':');
            out.push_str(&ty.to_string());
        }
        out.push(')');
    }
    write_selection(&mut out, selection, variables)?;
    Ok(out)
}

fn write_selection(out: &mut String, selection: &SelectionSet, variables: &Variables) -> Result<()> {
    if selection.is_empty() {
        return Err(Error::Build("empty selection set".to_string()));
    }
    out.push('{');
    for (i, field) in selection.fields().iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_field(out, field, variables)?;
    }
    out.push('}');
    Ok(())
}

fn write_field(out: &mut String, field: &Field, variables: &Variables) -> Result<()> {
    if let Some(alias) = &field.alias {
        check_name(alias, "alias")?;
        out.push_str(alias);
        out.push(':');
    }
    check_name(&field.name, "field")?;
    out.push_str(&field.name);

    if let Some(arguments) = &field.arguments {
        check_arguments(&field.name, arguments, variables)?;
        out.push('(');
        out.push_str(arguments);
        out.push(')');
    }

    if !field.selection.is_empty() {
        write_selection(out, &field.selection, variables)?;
    }
    Ok(())
}

fn check_name(name: &str, what: &str) -> Result<()> {
    if is_name(name) {
        Ok(())
    } else {
        Err(Error::Build(format!("invalid {what} name: {name:?}")))
    }
}

// graphql `Name`: /[_A-Za-z][_0-9A-Za-z]*/
fn is_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// every `$name` used outside string literals must be declared
fn check_arguments(field: &str, arguments: &str, variables: &Variables) -> Result<()> {
    if arguments.trim().is_empty() {
        return Err(Error::Build(format!("empty argument list on field {field}")));
    }

    let mut in_string = false;
    let mut escaped = false;
    let mut chars = arguments.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '$' => {
                let start = idx + 1;
                let mut end = start;
                while let Some(&(i, next)) = chars.peek() {
                    if next == '_' || next.is_ascii_alphanumeric() {
                        end = i + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let name = &arguments[start..end];
                if name.is_empty() || variables.get(name).is_none() {
                    return Err(Error::Build(format!(
                        "field {field} references undeclared variable ${name}"
                    )));
                }
            }
            _ => {}
        }
    }
    if in_string {
        return Err(Error::Build(format!(
            "unterminated string in arguments of field {field}"
        )));
    }
    Ok(())
}
