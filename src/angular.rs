//! Framework symbol extraction.
//!
//! The analyzed codebase registers components, directives, pipes, and
//! modules through decorators on class declarations. This extractor reads
//! those decorators off the AST and records the selector vocabulary the
//! HTML edge extractor matches against. The decorator names are
//! source-level markers of the analyzed codebase; dispatch is on the
//! callee identifier's text and unknown decorators are ignored.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Class, Declaration, Expression, ExportDefaultDeclarationKind, ObjectPropertyKind, PropertyKey,
    Statement,
};
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::error::Error;
use crate::eval::evaluate_string;
use crate::resolve::ImportResolver;

/// A framework annotation attached to a typed/untyped source file. One
/// file may contribute several (e.g. a module plus a component).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameworkInfo {
    Module {
        class_name: String,
    },
    Component {
        class_name: String,
        selector: Option<String>,
        /// Resolved repo-relative path of the component's template.
        template_file: Option<String>,
    },
    Directive {
        class_name: String,
        selector: Option<String>,
    },
    /// The selector is sourced from the decorator's `name` property.
    Pipe {
        class_name: String,
        selector: Option<String>,
    },
}

impl FrameworkInfo {
    pub fn is_module(&self) -> bool {
        matches!(self, Self::Module { .. })
    }

    pub fn template_file(&self) -> Option<&str> {
        match self {
            Self::Component { template_file, .. } => template_file.as_deref(),
            _ => None,
        }
    }
}

pub fn source_type_for(path: &str) -> SourceType {
    if path.ends_with(".ts") {
        SourceType::ts()
    } else {
        SourceType::mjs()
    }
}

/// Extract all framework annotations from one typed/untyped source file.
pub fn extract_framework_infos(
    rel_path: &str,
    source: &str,
    resolver: &ImportResolver<'_>,
) -> Result<Vec<FrameworkInfo>, Error> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type_for(rel_path)).parse();
    if ret.panicked {
        return Err(Error::SourceParse {
            file: rel_path.to_string(),
            message: ret
                .errors
                .first()
                .map_or_else(|| "parser panicked".to_string(), |e| e.to_string()),
        });
    }

    let mut infos = Vec::new();
    for stmt in &ret.program.body {
        let class = match stmt {
            Statement::ClassDeclaration(class) => class,
            Statement::ExportNamedDeclaration(export) => match &export.declaration {
                Some(Declaration::ClassDeclaration(class)) => class,
                _ => continue,
            },
            Statement::ExportDefaultDeclaration(export) => match &export.declaration {
                ExportDefaultDeclarationKind::ClassDeclaration(class) => class,
                _ => continue,
            },
            _ => continue,
        };
        extract_from_class(class, rel_path, source, resolver, &mut infos)?;
    }
    Ok(infos)
}

fn extract_from_class(
    class: &Class<'_>,
    rel_path: &str,
    source: &str,
    resolver: &ImportResolver<'_>,
    infos: &mut Vec<FrameworkInfo>,
) -> Result<(), Error> {
    let class_name = class
        .id
        .as_ref()
        .map_or_else(|| "(anonymous)".to_string(), |id| id.name.to_string());

    for decorator in &class.decorators {
        let Expression::CallExpression(call) = &decorator.expression else {
            continue;
        };
        let Expression::Identifier(callee) = &call.callee else {
            continue;
        };
        let kind = callee.name.as_str();
        if !matches!(kind, "NgModule" | "Component" | "Directive" | "Pipe") {
            continue;
        }

        let object = match call.arguments.first() {
            None => None,
            Some(arg) => match arg.as_expression() {
                Some(Expression::ObjectExpression(obj)) => Some(obj),
                _ => {
                    return Err(Error::NoObjectArgument {
                        class_name: class_name.clone(),
                        file: rel_path.to_string(),
                    })
                }
            },
        };

        let field = |name: &str| -> Result<Option<String>, Error> {
            let Some(obj) = object else { return Ok(None) };
            for prop in &obj.properties {
                let ObjectPropertyKind::ObjectProperty(p) = prop else {
                    continue;
                };
                let key = match &p.key {
                    PropertyKey::StaticIdentifier(id) => id.name.as_str(),
                    PropertyKey::StringLiteral(s) => s.value.as_str(),
                    _ => continue,
                };
                if key == name {
                    return evaluate_string(&p.value, source, rel_path).map(Some);
                }
            }
            Ok(None)
        };

        let info = match kind {
            "NgModule" => FrameworkInfo::Module {
                class_name: class_name.clone(),
            },
            "Component" => {
                let template_file = match field("templateUrl")? {
                    Some(url) => resolver.resolve(&url, rel_path),
                    None => None,
                };
                FrameworkInfo::Component {
                    class_name: class_name.clone(),
                    selector: field("selector")?,
                    template_file,
                }
            }
            "Directive" => FrameworkInfo::Directive {
                class_name: class_name.clone(),
                selector: field("selector")?,
            },
            "Pipe" => FrameworkInfo::Pipe {
                class_name: class_name.clone(),
                selector: field("name")?,
            },
            _ => unreachable!(),
        };
        infos.push(info);
    }
    Ok(())
}

/// Map of file path to its framework annotations. Non-annotated files
/// hold an empty list.
pub type FrameworkMap = std::collections::HashMap<String, Vec<FrameworkInfo>>;

/// Whether some annotation in `map[path]` marks the file as a framework
/// module.
pub fn is_angular_module(map: &FrameworkMap, path: &str) -> bool {
    map.get(path).is_some_and(|infos| infos.iter().any(FrameworkInfo::is_module))
}
