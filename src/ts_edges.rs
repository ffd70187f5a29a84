//! Edge extraction for typed/untyped source files.
//!
//! A recursive pre-order AST walk collects module specifiers in source
//! order: static imports and re-exports, `require(...)` calls (including
//! the `import x = require(...)` form), and dynamic `import(...)`
//! expressions. `require`/`import()` arguments go through the literal
//! evaluator, so `'a' + 'b'` concatenations resolve. After the walk the
//! file's own component templates and the `.import.ts` →
//! `.mainpage.html` convention contribute trailing edges.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, ClassElement, Expression, ExportDefaultDeclarationKind, ObjectPropertyKind,
    Statement, TSModuleReference,
};
use oxc_parser::Parser;

use crate::angular::{source_type_for, FrameworkInfo};
use crate::context::Context;
use crate::error::Error;
use crate::eval::evaluate_string;
use crate::resolve::ImportResolver;

/// Extract the ordered, deduplicated outgoing edges of one source file.
pub fn extract_ts_edges(
    rel_path: &str,
    source: &str,
    ctx: &Context,
    resolver: &ImportResolver<'_>,
    infos: &[FrameworkInfo],
) -> Result<Vec<String>, Error> {
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

    let mut collector = Collector {
        source,
        file: rel_path,
        specifiers: Vec::new(),
    };
    for stmt in &ret.program.body {
        collector.walk_stmt(stmt)?;
    }

    let mut edges = Vec::new();
    for specifier in &collector.specifiers {
        let Some(target) = resolver.resolve(specifier, rel_path) else {
            continue;
        };
        if ctx.file_exists(&target) {
            push_unique(&mut edges, target);
        } else if has_known_extension(&target) {
            // A resolved module that should exist but does not is a
            // codebase invariant violation, not a recoverable condition.
            return Err(Error::MissingModule {
                target,
                from: rel_path.to_string(),
                specifier: specifier.clone(),
            });
        }
        // Unknown extensionless resolution: no edge.
    }

    for info in infos {
        if let Some(template) = info.template_file() {
            if !ctx.file_exists(template) {
                return Err(Error::MissingModule {
                    target: template.to_string(),
                    from: rel_path.to_string(),
                    specifier: "templateUrl".to_string(),
                });
            }
            push_unique(&mut edges, template.to_string());
        }
    }

    if let Some(stem) = rel_path.strip_suffix(".import.ts") {
        let mainpage = format!("{stem}.mainpage.html");
        if ctx.file_exists(&mainpage) {
            push_unique(&mut edges, mainpage);
        }
    }

    Ok(edges)
}

fn has_known_extension(path: &str) -> bool {
    [".ts", ".js", ".html", ".css"]
        .iter()
        .any(|ext| path.ends_with(ext))
}

fn push_unique(edges: &mut Vec<String>, target: String) {
    if !edges.contains(&target) {
        edges.push(target);
    }
}

struct Collector<'s> {
    source: &'s str,
    file: &'s str,
    specifiers: Vec<String>,
}

impl Collector<'_> {
    fn walk_stmt(&mut self, stmt: &Statement<'_>) -> Result<(), Error> {
        match stmt {
            Statement::ImportDeclaration(import) => {
                self.specifiers.push(import.source.value.to_string());
            }
            Statement::ExportNamedDeclaration(export) => {
                if let Some(source) = &export.source {
                    self.specifiers.push(source.value.to_string());
                }
                if let Some(decl) = &export.declaration {
                    self.walk_stmt_like_declaration(decl)?;
                }
            }
            Statement::ExportAllDeclaration(export) => {
                self.specifiers.push(export.source.value.to_string());
            }
            Statement::ExportDefaultDeclaration(export) => {
                if let Some(expr) = export.declaration.as_expression() {
                    self.walk_expr(expr)?;
                } else if let ExportDefaultDeclarationKind::ClassDeclaration(class) =
                    &export.declaration
                {
                    self.walk_class_elements(&class.body.body)?;
                }
            }
            Statement::TSImportEqualsDeclaration(import_eq) => {
                if let TSModuleReference::ExternalModuleReference(external) =
                    &import_eq.module_reference
                {
                    self.specifiers.push(external.expression.value.to_string());
                }
            }
            Statement::ExpressionStatement(expr_stmt) => {
                self.walk_expr(&expr_stmt.expression)?;
            }
            Statement::VariableDeclaration(var_decl) => {
                for decl in &var_decl.declarations {
                    if let Some(init) = &decl.init {
                        self.walk_expr(init)?;
                    }
                }
            }
            Statement::FunctionDeclaration(fn_decl) => {
                if let Some(body) = &fn_decl.body {
                    for s in &body.statements {
                        self.walk_stmt(s)?;
                    }
                }
            }
            Statement::ClassDeclaration(class) => {
                self.walk_class_elements(&class.body.body)?;
            }
            Statement::BlockStatement(block) => {
                for s in &block.body {
                    self.walk_stmt(s)?;
                }
            }
            Statement::IfStatement(if_stmt) => {
                self.walk_expr(&if_stmt.test)?;
                self.walk_stmt(&if_stmt.consequent)?;
                if let Some(alt) = &if_stmt.alternate {
                    self.walk_stmt(alt)?;
                }
            }
            Statement::SwitchStatement(switch) => {
                self.walk_expr(&switch.discriminant)?;
                for case in &switch.cases {
                    for s in &case.consequent {
                        self.walk_stmt(s)?;
                    }
                }
            }
            Statement::TryStatement(try_stmt) => {
                for s in &try_stmt.block.body {
                    self.walk_stmt(s)?;
                }
                if let Some(catch) = &try_stmt.handler {
                    for s in &catch.body.body {
                        self.walk_stmt(s)?;
                    }
                }
                if let Some(finalizer) = &try_stmt.finalizer {
                    for s in &finalizer.body {
                        self.walk_stmt(s)?;
                    }
                }
            }
            Statement::WhileStatement(while_stmt) => {
                self.walk_expr(&while_stmt.test)?;
                self.walk_stmt(&while_stmt.body)?;
            }
            Statement::DoWhileStatement(do_while) => {
                self.walk_stmt(&do_while.body)?;
                self.walk_expr(&do_while.test)?;
            }
            Statement::ForStatement(for_stmt) => {
                self.walk_stmt(&for_stmt.body)?;
            }
            Statement::ForInStatement(for_in) => {
                self.walk_stmt(&for_in.body)?;
            }
            Statement::ForOfStatement(for_of) => {
                self.walk_stmt(&for_of.body)?;
            }
            Statement::ReturnStatement(ret) => {
                if let Some(arg) = &ret.argument {
                    self.walk_expr(arg)?;
                }
            }
            Statement::LabeledStatement(labeled) => {
                self.walk_stmt(&labeled.body)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Declarations reachable through `export` wrappers.
    fn walk_stmt_like_declaration(
        &mut self,
        decl: &oxc_ast::ast::Declaration<'_>,
    ) -> Result<(), Error> {
        use oxc_ast::ast::Declaration;
        match decl {
            Declaration::VariableDeclaration(var_decl) => {
                for d in &var_decl.declarations {
                    if let Some(init) = &d.init {
                        self.walk_expr(init)?;
                    }
                }
            }
            Declaration::FunctionDeclaration(fn_decl) => {
                if let Some(body) = &fn_decl.body {
                    for s in &body.statements {
                        self.walk_stmt(s)?;
                    }
                }
            }
            Declaration::ClassDeclaration(class) => {
                self.walk_class_elements(&class.body.body)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn walk_class_elements(&mut self, elements: &[ClassElement<'_>]) -> Result<(), Error> {
        for element in elements {
            match element {
                ClassElement::MethodDefinition(method) => {
                    if let Some(body) = &method.value.body {
                        for s in &body.statements {
                            self.walk_stmt(s)?;
                        }
                    }
                }
                ClassElement::PropertyDefinition(prop) => {
                    if let Some(value) = &prop.value {
                        self.walk_expr(value)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn walk_expr(&mut self, expr: &Expression<'_>) -> Result<(), Error> {
        match expr {
            Expression::CallExpression(call) => {
                if let Expression::Identifier(callee) = &call.callee {
                    if callee.name == "require" {
                        if let Some(arg) =
                            call.arguments.first().and_then(Argument::as_expression)
                        {
                            let specifier = evaluate_string(arg, self.source, self.file)?;
                            self.specifiers.push(specifier);
                            return Ok(());
                        }
                    }
                }
                self.walk_expr(&call.callee)?;
                for arg in &call.arguments {
                    self.walk_argument(arg)?;
                }
            }
            Expression::ImportExpression(import) => {
                let specifier = evaluate_string(&import.source, self.source, self.file)?;
                self.specifiers.push(specifier);
            }
            Expression::ArrowFunctionExpression(arrow) => {
                for s in &arrow.body.statements {
                    self.walk_stmt(s)?;
                }
            }
            Expression::FunctionExpression(fn_expr) => {
                if let Some(body) = &fn_expr.body {
                    for s in &body.statements {
                        self.walk_stmt(s)?;
                    }
                }
            }
            Expression::AssignmentExpression(assign) => {
                self.walk_expr(&assign.right)?;
            }
            Expression::SequenceExpression(seq) => {
                for e in &seq.expressions {
                    self.walk_expr(e)?;
                }
            }
            Expression::ParenthesizedExpression(paren) => {
                self.walk_expr(&paren.expression)?;
            }
            Expression::AwaitExpression(await_expr) => {
                self.walk_expr(&await_expr.argument)?;
            }
            Expression::ConditionalExpression(cond) => {
                self.walk_expr(&cond.test)?;
                self.walk_expr(&cond.consequent)?;
                self.walk_expr(&cond.alternate)?;
            }
            Expression::BinaryExpression(bin) => {
                self.walk_expr(&bin.left)?;
                self.walk_expr(&bin.right)?;
            }
            Expression::LogicalExpression(logical) => {
                self.walk_expr(&logical.left)?;
                self.walk_expr(&logical.right)?;
            }
            Expression::UnaryExpression(unary) => {
                self.walk_expr(&unary.argument)?;
            }
            Expression::StaticMemberExpression(member) => {
                self.walk_expr(&member.object)?;
            }
            Expression::ComputedMemberExpression(member) => {
                self.walk_expr(&member.object)?;
            }
            Expression::NewExpression(new_expr) => {
                for arg in &new_expr.arguments {
                    self.walk_argument(arg)?;
                }
            }
            Expression::ArrayExpression(array) => {
                for elem in &array.elements {
                    if let Some(e) = elem.as_expression() {
                        self.walk_expr(e)?;
                    }
                }
            }
            Expression::ObjectExpression(object) => {
                for prop in &object.properties {
                    match prop {
                        ObjectPropertyKind::ObjectProperty(p) => {
                            self.walk_expr(&p.value)?;
                        }
                        ObjectPropertyKind::SpreadProperty(spread) => {
                            self.walk_expr(&spread.argument)?;
                        }
                    }
                }
            }
            Expression::TemplateLiteral(tpl) => {
                for e in &tpl.expressions {
                    self.walk_expr(e)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn walk_argument(&mut self, arg: &Argument<'_>) -> Result<(), Error> {
        if let Some(expr) = arg.as_expression() {
            self.walk_expr(expr)
        } else if let Argument::SpreadElement(spread) = arg {
            self.walk_expr(&spread.argument)
        } else {
            Ok(())
        }
    }
}
