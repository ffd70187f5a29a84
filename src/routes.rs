//! Route registry: the ordered route → page-module table.
//!
//! The registry parses the framework route tables out of the two
//! well-known routing modules. A route array is either a top-level
//! `routes` constant or the first argument of `RouterModule.forRoot` /
//! `RouterModule.forChild` inside an `NgModule`'s `imports` (identifier
//! arguments are resolved to their initializer in the same file).
//! `children` recurse with the parent's full path as a prefix;
//! `loadChildren` targets are resolved and their own routing tables are
//! folded in; `component`-only entries record the parent's module.
//! Duplicate paths are not overwritten; first definition wins, and the
//! manual overrides below are the initial entries.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ArrayExpression, Class, Declaration, Expression, ObjectExpression, ObjectPropertyKind,
    Program, PropertyKey, Statement,
};
use oxc_parser::Parser;

use crate::angular::source_type_for;
use crate::context::{Context, CONSTANTS_MODULE, LIGHTWEIGHT_ROUTING_MODULE, MAIN_ROUTING_MODULE};
use crate::error::Error;
use crate::eval::{evaluate_string, node_text};
use crate::resolve::ImportResolver;
use crate::workspace::Workspace;

/// Routes the analyzer cannot infer from the route tables, mapped
/// directly to their page modules.
const ROUTE_OVERRIDES: &[(&str, Option<&str>, &str)] = &[
    (
        "error/:status_code",
        None,
        "core/templates/pages/error-pages/error-page.module.ts",
    ),
    (
        "logout",
        Some("full"),
        "core/templates/pages/logout-page/logout-page.module.ts",
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    /// `Some("full")` when the route demands a full-length match.
    pub path_match: Option<String>,
}

/// A parsed constants tree: nested objects with string leaves.
#[derive(Debug, Clone)]
pub enum ConstValue {
    Str(String),
    Map(BTreeMap<String, ConstValue>),
}

impl ConstValue {
    fn walk(&self, chain: &[String]) -> Option<&str> {
        let mut node = self;
        for key in chain {
            match node {
                ConstValue::Map(map) => node = map.get(key)?,
                ConstValue::Str(_) => return None,
            }
        }
        match node {
            ConstValue::Str(s) => Some(s),
            ConstValue::Map(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct RouteRegistry {
    routes: Vec<(Route, String)>,
}

impl RouteRegistry {
    /// Parse the well-known routing modules into the route table.
    pub fn build(
        ctx: &Context,
        ws: &Workspace,
        resolver: &ImportResolver<'_>,
    ) -> Result<Self, Error> {
        let mut registry = Self {
            routes: ROUTE_OVERRIDES
                .iter()
                .map(|&(path, path_match, module)| {
                    (
                        Route {
                            path: path.to_string(),
                            path_match: path_match.map(str::to_string),
                        },
                        module.to_string(),
                    )
                })
                .collect(),
        };

        let constants = load_constants(ctx, ws)?;

        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<PendingFile> = VecDeque::new();
        queue.push_back(PendingFile {
            file: MAIN_ROUTING_MODULE.to_string(),
            prefix: String::new(),
            fallback_module: None,
            required: true,
        });
        queue.push_back(PendingFile {
            file: LIGHTWEIGHT_ROUTING_MODULE.to_string(),
            prefix: String::new(),
            fallback_module: None,
            required: true,
        });

        while let Some(PendingFile {
            file,
            prefix,
            fallback_module,
            required,
        }) = queue.pop_front()
        {
            if !visited.insert(file.clone()) {
                continue;
            }
            if !ctx.file_exists(&file) {
                if required {
                    return Err(Error::ConfigRead(
                        ctx.root().join(&file),
                        std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
                    ));
                }
                continue;
            }
            let source = ws.source(&file)?;
            extract_routing_file(
                &file,
                &source,
                required,
                &prefix,
                fallback_module.as_deref(),
                ctx,
                resolver,
                constants.as_ref(),
                &mut registry.routes,
                &mut queue,
            )?;
        }

        Ok(registry)
    }

    /// The ordered route table (overrides first).
    pub fn routes(&self) -> &[(Route, String)] {
        &self.routes
    }

    /// The page-module set: lazy targets and fallback modules of every
    /// registered route.
    pub fn page_modules(&self) -> HashSet<String> {
        self.routes.iter().map(|(_, m)| m.clone()).collect()
    }
}

/// Join a parent path prefix with a child path. An empty side reproduces
/// the other side exactly.
pub fn concat_paths(prefix: &str, child: &str) -> String {
    if prefix.is_empty() {
        child.to_string()
    } else if child.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}/{child}")
    }
}

fn push_route(routes: &mut Vec<(Route, String)>, route: Route, module: String) {
    if routes.iter().any(|(r, _)| r.path == route.path) {
        return;
    }
    routes.push((route, module));
}

fn load_constants(ctx: &Context, ws: &Workspace) -> Result<Option<ConstValue>, Error> {
    if !ctx.file_exists(CONSTANTS_MODULE) {
        return Ok(None);
    }
    let source = ws.source(CONSTANTS_MODULE)?;
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, &source, source_type_for(CONSTANTS_MODULE)).parse();
    if ret.panicked {
        return Err(Error::SourceParse {
            file: CONSTANTS_MODULE.to_string(),
            message: "parser panicked".to_string(),
        });
    }

    for stmt in &ret.program.body {
        let object = match stmt {
            Statement::ExportDefaultDeclaration(export) => export
                .declaration
                .as_expression()
                .and_then(as_object_expression),
            Statement::ExportNamedDeclaration(export) => match &export.declaration {
                Some(Declaration::VariableDeclaration(var)) => var
                    .declarations
                    .iter()
                    .find_map(|d| d.init.as_ref().and_then(as_object_expression)),
                _ => None,
            },
            Statement::VariableDeclaration(var) => var
                .declarations
                .iter()
                .find_map(|d| d.init.as_ref().and_then(as_object_expression)),
            _ => None,
        };
        if let Some(obj) = object {
            return Ok(Some(build_const_tree(obj)));
        }
    }
    Ok(None)
}

/// Unwrap `as const` / satisfies wrappers down to an object literal.
fn as_object_expression<'a, 'b>(
    expr: &'b Expression<'a>,
) -> Option<&'b ObjectExpression<'a>> {
    match expr {
        Expression::ObjectExpression(obj) => Some(obj),
        Expression::TSAsExpression(as_expr) => as_object_expression(&as_expr.expression),
        Expression::TSSatisfiesExpression(sat) => as_object_expression(&sat.expression),
        Expression::ParenthesizedExpression(paren) => as_object_expression(&paren.expression),
        _ => None,
    }
}

fn build_const_tree(obj: &ObjectExpression<'_>) -> ConstValue {
    let mut map = BTreeMap::new();
    for prop in &obj.properties {
        let ObjectPropertyKind::ObjectProperty(p) = prop else {
            continue;
        };
        let key = match &p.key {
            PropertyKey::StaticIdentifier(id) => id.name.to_string(),
            PropertyKey::StringLiteral(s) => s.value.to_string(),
            _ => continue,
        };
        match &p.value {
            Expression::StringLiteral(s) => {
                map.insert(key, ConstValue::Str(s.value.to_string()));
            }
            other => {
                if let Some(nested) = as_object_expression(other) {
                    map.insert(key, build_const_tree(nested));
                }
                // Numbers, arrays, and booleans never name route paths.
            }
        }
    }
    ConstValue::Map(map)
}

/// A routing file waiting to be parsed: the two well-known roots, then
/// every lazily loaded module discovered along the way.
struct PendingFile {
    file: String,
    prefix: String,
    fallback_module: Option<String>,
    required: bool,
}

#[allow(clippy::too_many_arguments)]
fn extract_routing_file(
    file: &str,
    source: &str,
    required: bool,
    prefix: &str,
    fallback_module: Option<&str>,
    ctx: &Context,
    resolver: &ImportResolver<'_>,
    constants: Option<&ConstValue>,
    routes: &mut Vec<(Route, String)>,
    queue: &mut VecDeque<PendingFile>,
) -> Result<(), Error> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type_for(file)).parse();
    if ret.panicked {
        return Err(Error::SourceParse {
            file: file.to_string(),
            message: "parser panicked".to_string(),
        });
    }

    let Some(array) = find_route_array(&ret.program) else {
        if required {
            return Err(Error::NoRouteTable(file.to_string()));
        }
        return Ok(());
    };

    let cx = FileCx {
        file,
        source,
        ctx,
        resolver,
        constants,
    };
    for element in &array.elements {
        if let Some(Expression::ObjectExpression(obj)) =
            element.as_expression().map(unwrap_parens)
        {
            parse_route_object(obj, prefix, fallback_module, &cx, routes, queue)?;
        }
    }
    Ok(())
}

fn unwrap_parens<'a, 'b>(expr: &'b Expression<'a>) -> &'b Expression<'a> {
    match expr {
        Expression::ParenthesizedExpression(paren) => unwrap_parens(&paren.expression),
        Expression::TSAsExpression(as_expr) => unwrap_parens(&as_expr.expression),
        other => other,
    }
}

/// Locate the route array: a top-level `routes` constant, or the first
/// argument of `RouterModule.forRoot`/`forChild` inside an `NgModule`'s
/// `imports`, with identifier arguments resolved in the same file.
fn find_route_array<'a, 'b>(program: &'b Program<'a>) -> Option<&'b ArrayExpression<'a>> {
    let top_vars = collect_top_level_vars(program);

    if let Some(&expr) = top_vars.get("routes") {
        if let Expression::ArrayExpression(array) = unwrap_parens(expr) {
            return Some(array);
        }
    }

    for stmt in &program.body {
        let class = match stmt {
            Statement::ClassDeclaration(class) => class,
            Statement::ExportNamedDeclaration(export) => match &export.declaration {
                Some(Declaration::ClassDeclaration(class)) => class,
                _ => continue,
            },
            _ => continue,
        };
        if let Some(array) = router_module_argument(class, &top_vars) {
            return Some(array);
        }
    }
    None
}

fn collect_top_level_vars<'a, 'b>(
    program: &'b Program<'a>,
) -> HashMap<String, &'b Expression<'a>> {
    let mut vars = HashMap::new();
    for stmt in &program.body {
        let decls = match stmt {
            Statement::VariableDeclaration(var) => &var.declarations,
            Statement::ExportNamedDeclaration(export) => match &export.declaration {
                Some(Declaration::VariableDeclaration(var)) => &var.declarations,
                _ => continue,
            },
            _ => continue,
        };
        for decl in decls {
            let oxc_ast::ast::BindingPatternKind::BindingIdentifier(id) = &decl.id.kind else {
                continue;
            };
            if let Some(init) = &decl.init {
                vars.insert(id.name.to_string(), init);
            }
        }
    }
    vars
}

fn router_module_argument<'a, 'b>(
    class: &'b Class<'a>,
    top_vars: &HashMap<String, &'b Expression<'a>>,
) -> Option<&'b ArrayExpression<'a>> {
    for decorator in &class.decorators {
        let Expression::CallExpression(call) = &decorator.expression else {
            continue;
        };
        let Expression::Identifier(callee) = &call.callee else {
            continue;
        };
        if callee.name != "NgModule" {
            continue;
        }
        let Some(Expression::ObjectExpression(obj)) =
            call.arguments.first().and_then(|a| a.as_expression())
        else {
            continue;
        };
        for prop in &obj.properties {
            let ObjectPropertyKind::ObjectProperty(p) = prop else {
                continue;
            };
            let is_imports = matches!(&p.key, PropertyKey::StaticIdentifier(id) if id.name == "imports");
            if !is_imports {
                continue;
            }
            let Expression::ArrayExpression(imports) = unwrap_parens(&p.value) else {
                continue;
            };
            for element in &imports.elements {
                let Some(Expression::CallExpression(import_call)) =
                    element.as_expression().map(unwrap_parens)
                else {
                    continue;
                };
                let Expression::StaticMemberExpression(member) = &import_call.callee else {
                    continue;
                };
                let Expression::Identifier(object) = &member.object else {
                    continue;
                };
                if object.name != "RouterModule"
                    || !matches!(member.property.name.as_str(), "forRoot" | "forChild")
                {
                    continue;
                }
                match import_call.arguments.first().and_then(|a| a.as_expression()) {
                    Some(Expression::ArrayExpression(array)) => return Some(array),
                    Some(Expression::Identifier(id)) => {
                        if let Some(&expr) = top_vars.get(id.name.as_str()) {
                            if let Expression::ArrayExpression(array) = unwrap_parens(expr) {
                                return Some(array);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
    }
    None
}

struct FileCx<'s> {
    file: &'s str,
    source: &'s str,
    ctx: &'s Context,
    resolver: &'s ImportResolver<'s>,
    constants: Option<&'s ConstValue>,
}

fn parse_route_object(
    obj: &ObjectExpression<'_>,
    prefix: &str,
    fallback_module: Option<&str>,
    cx: &FileCx<'_>,
    routes: &mut Vec<(Route, String)>,
    queue: &mut VecDeque<PendingFile>,
) -> Result<(), Error> {
    let mut path: Option<String> = None;
    let mut path_match: Option<String> = None;
    let mut loaded_module: Option<String> = None;
    let mut has_component = false;
    let mut children: Option<&ArrayExpression<'_>> = None;

    for prop in &obj.properties {
        let ObjectPropertyKind::ObjectProperty(p) = prop else {
            continue;
        };
        let key = match &p.key {
            PropertyKey::StaticIdentifier(id) => id.name.as_str(),
            PropertyKey::StringLiteral(s) => s.value.as_str(),
            _ => continue,
        };
        match key {
            "path" => path = Some(route_path_value(&p.value, cx)?),
            "pathMatch" => path_match = Some(evaluate_string(&p.value, cx.source, cx.file)?),
            "component" => has_component = true,
            "loadChildren" => loaded_module = load_children_target(&p.value, cx)?,
            "children" => {
                if let Expression::ArrayExpression(array) = unwrap_parens(&p.value) {
                    children = Some(array);
                }
            }
            _ => {}
        }
    }

    let full_path = concat_paths(prefix, path.as_deref().unwrap_or(""));

    if let Some(module) = &loaded_module {
        push_route(
            routes,
            Route {
                path: full_path.clone(),
                path_match: path_match.clone(),
            },
            module.clone(),
        );
        // A lazily loaded module carries its own routing table.
        queue.push_back(PendingFile {
            file: module.clone(),
            prefix: full_path.clone(),
            fallback_module: Some(module.clone()),
            required: false,
        });
    } else if has_component {
        if let Some(fallback) = fallback_module {
            push_route(
                routes,
                Route {
                    path: full_path.clone(),
                    path_match: path_match.clone(),
                },
                fallback.to_string(),
            );
        }
    }

    if let Some(array) = children {
        let child_fallback = loaded_module.as_deref().or(fallback_module);
        for element in &array.elements {
            if let Some(Expression::ObjectExpression(child)) =
                element.as_expression().map(unwrap_parens)
            {
                parse_route_object(child, &full_path, child_fallback, cx, routes, queue)?;
            }
        }
    }

    Ok(())
}

/// A route `path` is a literal, or an `AppConstants.*` access chain
/// interpreted against the constants tree. Any other shape is an error.
fn route_path_value(expr: &Expression<'_>, cx: &FileCx<'_>) -> Result<String, Error> {
    if let Ok(value) = evaluate_string(expr, cx.source, cx.file) {
        return Ok(value);
    }
    if let Some(chain) = constants_chain(unwrap_parens(expr)) {
        let Some(tree) = cx.constants else {
            return Err(Error::UnknownConstant {
                chain: chain.join("."),
                file: cx.file.to_string(),
            });
        };
        return match tree.walk(&chain) {
            Some(value) => Ok(value.to_string()),
            None => Err(Error::UnknownConstant {
                chain: chain.join("."),
                file: cx.file.to_string(),
            }),
        };
    }
    Err(Error::UnparsableRoutePath {
        text: node_text(expr, cx.source),
        file: cx.file.to_string(),
    })
}

/// Property names of a member chain rooted at `AppConstants`, outermost
/// last (`AppConstants.PAGES.ABOUT.ROUTE` → ["PAGES", "ABOUT", "ROUTE"]).
fn constants_chain(expr: &Expression<'_>) -> Option<Vec<String>> {
    let Expression::StaticMemberExpression(member) = expr else {
        return None;
    };
    match &member.object {
        Expression::Identifier(id) if id.name == "AppConstants" => {
            Some(vec![member.property.name.to_string()])
        }
        object @ Expression::StaticMemberExpression(_) => {
            let mut chain = constants_chain(object)?;
            chain.push(member.property.name.to_string());
            Some(chain)
        }
        _ => None,
    }
}

/// Extract the lazy target of a `loadChildren` initializer: a function
/// whose first returned expression is `import(X)` or `import(X).then(...)`.
fn load_children_target(
    expr: &Expression<'_>,
    cx: &FileCx<'_>,
) -> Result<Option<String>, Error> {
    let returned = match unwrap_parens(expr) {
        Expression::ArrowFunctionExpression(arrow) => {
            first_returned_expression(&arrow.body.statements)
        }
        Expression::FunctionExpression(function) => function
            .body
            .as_ref()
            .and_then(|body| first_returned_expression(&body.statements)),
        _ => None,
    };
    let Some(returned) = returned else {
        return Ok(None);
    };

    let import_expr = match unwrap_parens(returned) {
        Expression::ImportExpression(import) => Some(import),
        Expression::CallExpression(call) => match &call.callee {
            Expression::StaticMemberExpression(member) if member.property.name == "then" => {
                match unwrap_parens(&member.object) {
                    Expression::ImportExpression(import) => Some(import),
                    _ => None,
                }
            }
            _ => None,
        },
        _ => None,
    };
    let Some(import) = import_expr else {
        return Ok(None);
    };

    let specifier = evaluate_string(&import.source, cx.source, cx.file)?;
    let Some(target) = cx.resolver.resolve(&specifier, cx.file) else {
        return Ok(None);
    };
    if !cx.ctx.file_exists(&target) {
        return Err(Error::MissingModule {
            target,
            from: cx.file.to_string(),
            specifier,
        });
    }
    Ok(Some(target))
}

fn first_returned_expression<'a, 'b>(
    statements: &'b [Statement<'a>],
) -> Option<&'b Expression<'a>> {
    match statements.first()? {
        Statement::ExpressionStatement(stmt) => Some(&stmt.expression),
        Statement::ReturnStatement(ret) => ret.argument.as_ref(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    struct Fixture {
        _tmp: tempfile::TempDir,
        ctx: Context,
        ws: Workspace,
    }

    fn fixture(files: &[(&str, &str)]) -> Fixture {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::write(root.join("tsconfig.json"), "{}").unwrap();
        // The lightweight root is present but empty-handed by default.
        let mut all: Vec<(&str, &str)> = vec![(
            LIGHTWEIGHT_ROUTING_MODULE,
            "export const routes = [];\n",
        )];
        all.extend_from_slice(files);
        for (path, content) in all {
            let abs = root.join(path);
            fs::create_dir_all(abs.parent().unwrap_or(Path::new("."))).unwrap();
            fs::write(abs, content).unwrap();
        }
        let ctx = Context::load(root).unwrap();
        let ws = Workspace::discover(&ctx);
        Fixture { _tmp: tmp, ctx, ws }
    }

    fn registry(f: &Fixture) -> RouteRegistry {
        let resolver = ImportResolver::new(&f.ctx);
        RouteRegistry::build(&f.ctx, &f.ws, &resolver).unwrap()
    }

    fn lookup<'a>(r: &'a RouteRegistry, path: &str) -> Option<&'a str> {
        r.routes()
            .iter()
            .find(|(route, _)| route.path == path)
            .map(|(_, m)| m.as_str())
    }

    #[test]
    fn lazy_route_records_resolved_module() {
        let f = fixture(&[
            (
                MAIN_ROUTING_MODULE,
                r"export const routes = [
                    {
                        path: 'about',
                        loadChildren: () =>
                            import('pages/about-page/about-page.module').then(
                                m => m.AboutPageModule)
                    }
                ];",
            ),
            (
                "core/templates/pages/about-page/about-page.module.ts",
                "export class AboutPageModule {}",
            ),
        ]);
        let r = registry(&f);
        assert_eq!(
            lookup(&r, "about"),
            Some("core/templates/pages/about-page/about-page.module.ts")
        );
    }

    #[test]
    fn router_module_for_root_with_identifier_argument() {
        let f = fixture(&[
            (
                MAIN_ROUTING_MODULE,
                r"const appRoutes = [
                    {
                        path: 'splash',
                        loadChildren: () => import('pages/splash/splash.module').then(m => m.SplashModule)
                    }
                ];
                @NgModule({
                    imports: [RouterModule.forRoot(appRoutes)]
                })
                export class AppRoutingModule {}",
            ),
            (
                "core/templates/pages/splash/splash.module.ts",
                "export class SplashModule {}",
            ),
        ]);
        let r = registry(&f);
        assert_eq!(
            lookup(&r, "splash"),
            Some("core/templates/pages/splash/splash.module.ts")
        );
    }

    #[test]
    fn children_concatenate_parent_paths() {
        let f = fixture(&[
            (
                MAIN_ROUTING_MODULE,
                r"export const routes = [
                    {
                        path: 'admin',
                        loadChildren: () => import('pages/admin/admin.module').then(m => m.AdminModule),
                        children: [
                            { path: 'roles', component: AdminRolesTab },
                            { path: '', component: AdminMainTab }
                        ]
                    }
                ];",
            ),
            (
                "core/templates/pages/admin/admin.module.ts",
                "export class AdminModule {}",
            ),
        ]);
        let r = registry(&f);
        let admin = "core/templates/pages/admin/admin.module.ts";
        assert_eq!(lookup(&r, "admin"), Some(admin));
        assert_eq!(lookup(&r, "admin/roles"), Some(admin));
        // Empty child path reproduces the parent path; first definition
        // ("admin" via loadChildren) wins.
        assert_eq!(
            r.routes().iter().filter(|(route, _)| route.path == "admin").count(),
            1
        );
    }

    #[test]
    fn lazily_loaded_module_contributes_its_own_routes() {
        let f = fixture(&[
            (
                MAIN_ROUTING_MODULE,
                r"export const routes = [
                    {
                        path: 'library',
                        loadChildren: () => import('pages/library/library.module').then(m => m.LibraryModule)
                    }
                ];",
            ),
            (
                "core/templates/pages/library/library.module.ts",
                r"const routes = [
                    { path: 'search', component: LibrarySearchComponent }
                ];
                @NgModule({ imports: [RouterModule.forChild(routes)] })
                export class LibraryModule {}",
            ),
        ]);
        let r = registry(&f);
        let library = "core/templates/pages/library/library.module.ts";
        assert_eq!(lookup(&r, "library"), Some(library));
        // Child 'search' has no loadChildren, so it takes the parent
        // module with the parent path prefix.
        assert_eq!(lookup(&r, "library/search"), Some(library));
    }

    #[test]
    fn app_constants_path_is_walked() {
        let f = fixture(&[
            (
                CONSTANTS_MODULE,
                r"export default {
                    PAGES: {
                        DONATE: { ROUTE: 'donate' }
                    }
                } as const;",
            ),
            (
                MAIN_ROUTING_MODULE,
                r"export const routes = [
                    {
                        path: AppConstants.PAGES.DONATE.ROUTE,
                        loadChildren: () => import('pages/donate/donate.module').then(m => m.DonateModule)
                    }
                ];",
            ),
            (
                "core/templates/pages/donate/donate.module.ts",
                "export class DonateModule {}",
            ),
        ]);
        let r = registry(&f);
        assert_eq!(
            lookup(&r, "donate"),
            Some("core/templates/pages/donate/donate.module.ts")
        );
    }

    #[test]
    fn unparsable_path_is_an_extraction_error() {
        let f = fixture(&[(
            MAIN_ROUTING_MODULE,
            r"export const routes = [
                { path: somethingDynamic(), component: X }
            ];",
        )]);
        let resolver = ImportResolver::new(&f.ctx);
        let err = RouteRegistry::build(&f.ctx, &f.ws, &resolver).unwrap_err();
        assert!(err.to_string().contains("somethingDynamic"));
    }

    #[test]
    fn first_definition_wins_over_later_duplicates() {
        let f = fixture(&[
            (
                MAIN_ROUTING_MODULE,
                r"export const routes = [
                    {
                        path: 'about',
                        loadChildren: () => import('pages/about/first.module').then(m => m.FirstModule)
                    },
                    {
                        path: 'about',
                        loadChildren: () => import('pages/about/second.module').then(m => m.SecondModule)
                    }
                ];",
            ),
            ("core/templates/pages/about/first.module.ts", ""),
            ("core/templates/pages/about/second.module.ts", ""),
        ]);
        let r = registry(&f);
        assert_eq!(
            lookup(&r, "about"),
            Some("core/templates/pages/about/first.module.ts")
        );
    }

    #[test]
    fn overrides_are_initial_entries() {
        let f = fixture(&[(MAIN_ROUTING_MODULE, "export const routes = [];")]);
        let r = registry(&f);
        assert_eq!(
            lookup(&r, "error/:status_code"),
            Some("core/templates/pages/error-pages/error-page.module.ts")
        );
        let (first, _) = &r.routes()[0];
        assert_eq!(first.path, "error/:status_code");
    }

    #[test]
    fn missing_main_routing_module_is_fatal() {
        let f = fixture(&[]);
        let resolver = ImportResolver::new(&f.ctx);
        let err = RouteRegistry::build(&f.ctx, &f.ws, &resolver).unwrap_err();
        assert!(err.to_string().contains("app.routing.module.ts"));
    }

    #[test]
    fn missing_lazy_target_is_fatal() {
        let f = fixture(&[(
            MAIN_ROUTING_MODULE,
            r"export const routes = [
                {
                    path: 'ghost',
                    loadChildren: () => import('pages/ghost/ghost.module').then(m => m.GhostModule)
                }
            ];",
        )]);
        let resolver = ImportResolver::new(&f.ctx);
        let err = RouteRegistry::build(&f.ctx, &f.ws, &resolver).unwrap_err();
        assert!(err.to_string().contains("ghost.module"));
    }

    #[test]
    fn page_modules_collects_all_targets() {
        let f = fixture(&[
            (
                MAIN_ROUTING_MODULE,
                r"export const routes = [
                    {
                        path: 'about',
                        loadChildren: () => import('pages/about-page/about-page.module').then(m => m.AboutPageModule)
                    }
                ];",
            ),
            ("core/templates/pages/about-page/about-page.module.ts", ""),
        ]);
        let r = registry(&f);
        let pages = r.page_modules();
        assert!(pages.contains("core/templates/pages/about-page/about-page.module.ts"));
        assert!(pages.contains("core/templates/pages/logout-page/logout-page.module.ts"));
    }
}
