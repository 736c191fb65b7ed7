//! The `Visit`-based AST walker that extracts imports, re-exports, dynamic
//! loads, and decorators from a parsed JS/TS module, emitting
//! `source_model`'s language-neutral shapes with line numbers resolved
//! via the `SourceMap`.

use swc_common::{
    comments::{CommentKind, Comments, SingleThreadedComments},
    BytePos, SourceMap, Span, Spanned,
};
use swc_ecma_ast::{
    BindingIdent, CallExpr, Callee, ClassDecl, Decl, Decorator, ExportAll,
    ExportDefaultDecl, ExportDefaultExpr, ExportSpecifier, Expr, FnDecl, Id, ImportDecl,
    ImportSpecifier, Lit, MemberProp, Module, ModuleDecl, ModuleExportName, ModuleItem,
    NamedExport, ObjectLit, Pat, Prop, PropName, PropOrSpread, Stmt, Str, TsEnumDecl,
    TsImportEqualsDecl, TsInterfaceDecl, TsTypeAliasDecl, VarDecl, VarDeclKind,
};
use swc_ecma_visit::{Visit, VisitWith};

use ahashmap::AHashSet;
use source_model::{
    Annotation, Declaration, DeclarationKind, ExportDecl, ExportKind, ImportKind, ImportRef,
    NamedSymbol,
};

pub struct JsVisitor<'a> {
    cm: &'a SourceMap,
    comments: &'a SingleThreadedComments,
    pub imports: Vec<ImportRef>,
    pub exports: Vec<ExportDecl>,
    pub declarations: Vec<Declaration>,
    pub annotations: Vec<Annotation>,
    require_idents: AHashSet<Id>,
}

impl<'a> JsVisitor<'a> {
    pub fn new(cm: &'a SourceMap, comments: &'a SingleThreadedComments) -> Self {
        Self {
            cm,
            comments,
            imports: Vec::new(),
            exports: Vec::new(),
            declarations: Vec::new(),
            annotations: Vec::new(),
            require_idents: AHashSet::default(),
        }
    }

    fn line(&self, span: Span) -> u32 {
        self.cm.lookup_char_pos(span.lo()).line as u32
    }

    fn end_line(&self, span: Span) -> u32 {
        self.cm.lookup_char_pos(span.hi()).line as u32
    }

    /// Walks only the module's direct children, recording top-level
    /// declarations: "top-level" here just means "not nested inside
    /// another declaration's body", which the AST gives us for free by
    /// not recursing into bodies here. The separate recursive `Visit`
    /// pass (below) still finds imports/dynamic loads/decorators
    /// wherever they occur.
    pub fn scan_top_level(&mut self, module: &Module) {
        for item in &module.body {
            match item {
                ModuleItem::Stmt(Stmt::Decl(decl)) => self.record_decl(decl, false),
                ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                    self.record_decl(&export.decl, true)
                }
                _ => {}
            }
        }
    }

    fn record_decl(&mut self, decl: &Decl, exported: bool) {
        match decl {
            Decl::Fn(FnDecl { ident, function, .. }) => {
                self.push_declaration(
                    ident.sym.to_string(),
                    DeclarationKind::Function,
                    function.span,
                    exported,
                );
            }
            Decl::Class(ClassDecl { ident, class, .. }) => {
                self.push_declaration(
                    ident.sym.to_string(),
                    DeclarationKind::Class,
                    class.span,
                    exported,
                );
            }
            Decl::TsInterface(TsInterfaceDecl { id, span, .. }) => {
                self.push_declaration(id.sym.to_string(), DeclarationKind::Interface, *span, exported);
            }
            Decl::TsTypeAlias(TsTypeAliasDecl { id, span, .. }) => {
                self.push_declaration(id.sym.to_string(), DeclarationKind::Type, *span, exported);
            }
            Decl::TsEnum(TsEnumDecl { id, span, .. }) => {
                self.push_declaration(id.sym.to_string(), DeclarationKind::Enum, *span, exported);
            }
            // `const x = () => {}` / `const x = function() {}` at module scope is an
            // eligible top-level function declaration; a function expression on an
            // object-literal property is not resolvable to a single export name and
            // is intentionally excluded.
            Decl::Var(var_decl) if var_decl.kind == VarDeclKind::Const => {
                self.record_const_arrow_bindings(var_decl, exported);
            }
            _ => {}
        }
    }

    fn record_const_arrow_bindings(&mut self, var_decl: &VarDecl, exported: bool) {
        for declarator in &var_decl.decls {
            let Pat::Ident(binding) = &declarator.name else {
                continue;
            };
            let is_fn_like = declarator
                .init
                .as_deref()
                .map(|e| matches!(e, Expr::Arrow(_) | Expr::Fn(_)))
                .unwrap_or(false);
            if !is_fn_like {
                continue;
            }
            self.push_declaration(
                binding.id.sym.to_string(),
                DeclarationKind::Function,
                declarator.span,
                exported,
            );
        }
    }

    fn push_declaration(&mut self, name: String, kind: DeclarationKind, span: Span, exported: bool) {
        let line = self.line(span);
        if exported {
            self.exports.push(ExportDecl {
                name: name.clone(),
                kind: decl_kind_to_export_kind(kind),
                line,
                is_default: false,
                source_import: None,
                is_type_only: matches!(kind, DeclarationKind::Type | DeclarationKind::Interface),
                allow_unused: self.has_allow_unused_comment(span.lo()),
            });
        }
        self.declarations.push(Declaration {
            name,
            kind,
            line,
            end_line: self.end_line(span),
            public: exported,
        });
    }

    /// A leading `@ALLOW-UNUSED-EXPORT` line comment suppresses dead-export
    /// reporting for the declaration it precedes.
    fn has_allow_unused_comment(&self, lo: BytePos) -> bool {
        self.comments
            .get_leading(lo)
            .map(|cs| {
                cs.iter().any(|c| {
                    c.kind == CommentKind::Line
                        && c.text.trim().starts_with("@ALLOW-UNUSED-EXPORT")
                })
            })
            .unwrap_or(false)
    }

    fn push_import(&mut self, raw_module: Option<String>, kind: ImportKind, line: u32) -> usize {
        let idx = self.imports.len();
        self.imports.push(ImportRef {
            raw_module,
            kind,
            line,
            is_dynamic: matches!(kind, ImportKind::Dynamic),
            is_glob: matches!(kind, ImportKind::Glob),
            named_symbols: None,
        });
        idx
    }
}

impl<'a> Visit for JsVisitor<'a> {
    // import foo, { bar as baz } from './foo'; import './foo';
    fn visit_import_decl(&mut self, import: &ImportDecl) {
        import.visit_children_with(self);
        let line = self.line(import.span);
        let raw = import.src.value.to_string();

        if import.specifiers.is_empty() {
            self.push_import(Some(raw), ImportKind::SideEffect, line);
            return;
        }

        let named: Vec<NamedSymbol> = import
            .specifiers
            .iter()
            .filter_map(|spec| match spec {
                ImportSpecifier::Named(named) => {
                    let (name, alias) = match &named.imported {
                        Some(ModuleExportName::Ident(id)) => {
                            (id.sym.to_string(), Some(named.local.sym.to_string()))
                        }
                        Some(ModuleExportName::Str(s)) => {
                            (s.value.to_string(), Some(named.local.sym.to_string()))
                        }
                        None => (named.local.sym.to_string(), None),
                    };
                    Some(NamedSymbol { name, alias })
                }
                ImportSpecifier::Default(_) => Some(NamedSymbol {
                    name: "default".to_string(),
                    alias: None,
                }),
                ImportSpecifier::Namespace(ns) => Some(NamedSymbol {
                    name: "*".to_string(),
                    alias: Some(ns.local.sym.to_string()),
                }),
            })
            .collect();

        let idx = self.push_import(Some(raw), ImportKind::Static, line);
        self.imports[idx].named_symbols = Some(named);
    }

    // const require = foo; <- binding that would shadow the global `require`
    fn visit_binding_ident(&mut self, binding: &BindingIdent) {
        binding.visit_children_with(self);
        if binding.sym == *"require" {
            self.require_idents.insert(binding.id.to_id());
        }
    }

    // import foo = require('./foo')
    fn visit_ts_import_equals_decl(&mut self, decl: &TsImportEqualsDecl) {
        decl.visit_children_with(self);
        if let Some(module_ref) = decl.module_ref.as_ts_external_module_ref() {
            let line = self.line(decl.span);
            self.push_import(
                Some(module_ref.expr.value.to_string()),
                ImportKind::Require,
                line,
            );
        }
    }

    // import('foo'), require('foo'), require.resolve('foo'), require.context(...),
    // import.meta.glob(...), glob.sync(...)/globSync(...)
    fn visit_call_expr(&mut self, expr: &CallExpr) {
        expr.visit_children_with(self);
        let line = self.line(expr.span);

        if let Callee::Import(_) = &expr.callee {
            let arg = extract_string_arg(expr);
            self.push_import(arg, ImportKind::Dynamic, line);
            return;
        }

        let Callee::Expr(callee) = &expr.callee else {
            return;
        };

        if let Some(ident) = callee.as_ident() {
            if ident.sym == *"require" && !self.require_idents.contains(&ident.to_id()) {
                if let Some(path) = extract_string_arg(expr) {
                    self.push_import(Some(path), ImportKind::Require, line);
                }
                return;
            }
            if (ident.sym == *"globSync") || (ident.sym == *"glob") {
                if let Some(path) = extract_string_arg(expr) {
                    self.push_import(Some(path), ImportKind::Glob, line);
                }
                return;
            }
        }

        if let Some(member) = callee.as_member() {
            let prop_name = match &member.prop {
                MemberProp::Ident(id) => Some(id.sym.to_string()),
                _ => None,
            };
            let obj_is_require = member.obj.as_ident().map(|i| i.sym == *"require").unwrap_or(false);
            let obj_is_meta = matches!(member.obj.as_ref(), Expr::MetaProp(_));
            let obj_is_glob = member.obj.as_ident().map(|i| i.sym == *"glob").unwrap_or(false);

            match prop_name.as_deref() {
                Some("resolve") if obj_is_require => {
                    if let Some(path) = extract_string_arg(expr) {
                        self.push_import(Some(path), ImportKind::Require, line);
                    }
                }
                Some("context") if obj_is_require => {
                    let path = extract_string_arg(expr);
                    self.push_import(path, ImportKind::RequireContext, line);
                }
                Some("glob") if obj_is_meta => {
                    let path = extract_string_arg(expr);
                    let idx = self.push_import(path, ImportKind::Glob, line);
                    self.imports[idx].is_glob = true;
                }
                Some("sync") if obj_is_glob => {
                    let path = extract_string_arg(expr);
                    self.push_import(path, ImportKind::Glob, line);
                }
                _ => {}
            }
        }
    }

    // export default foo;
    fn visit_export_default_expr(&mut self, expr: &ExportDefaultExpr) {
        expr.visit_children_with(self);
        let line = self.line(expr.span());
        let allow_unused = self.has_allow_unused_comment(expr.span_lo());
        self.exports.push(ExportDecl {
            name: "default".to_string(),
            kind: ExportKind::Default,
            line,
            is_default: true,
            source_import: None,
            is_type_only: false,
            allow_unused,
        });
    }

    // export default class Foo {} / export default function foo() {}
    fn visit_export_default_decl(&mut self, decl: &ExportDefaultDecl) {
        decl.visit_children_with(self);
        let line = self.line(decl.span());
        let allow_unused = self.has_allow_unused_comment(decl.span_lo());
        self.exports.push(ExportDecl {
            name: "default".to_string(),
            kind: ExportKind::Default,
            line,
            is_default: true,
            source_import: None,
            is_type_only: false,
            allow_unused,
        });
    }

    // export { foo, bar as baz }; export { foo } from './foo';
    fn visit_named_export(&mut self, export: &NamedExport) {
        export.visit_children_with(self);
        let line = self.line(export.span);
        let allow_unused = self.has_allow_unused_comment(export.span_lo());
        if let Some(source) = &export.src {
            self.handle_export_from(export, source, line, allow_unused);
        } else {
            for spec in &export.specifiers {
                if let ExportSpecifier::Named(named) = spec {
                    let (orig, is_default_orig) = module_export_name(&named.orig);
                    let exported = named.exported.as_ref().map(module_export_name);
                    let (name, is_default) = match exported {
                        Some((n, d)) => (n, d),
                        None => (orig, is_default_orig),
                    };
                    self.exports.push(ExportDecl {
                        name,
                        kind: ExportKind::Variable,
                        line,
                        is_default,
                        source_import: None,
                        is_type_only: export.type_only,
                        allow_unused,
                    });
                }
            }
        }
    }

    // export * from './foo'; export * as ns from './foo';
    fn visit_export_all(&mut self, export: &ExportAll) {
        export.visit_children_with(self);
        let line = self.line(export.span);
        let allow_unused = self.has_allow_unused_comment(export.span_lo());
        let idx = self.push_import(
            Some(export.src.value.to_string()),
            ImportKind::ReexportAll,
            line,
        );
        self.exports.push(ExportDecl {
            name: source_model::REEXPORT_ALL_SENTINEL.to_string(),
            kind: ExportKind::ReexportAll,
            line,
            is_default: false,
            source_import: Some(idx),
            is_type_only: export.type_only,
            allow_unused,
        });
    }

    // @Component({ ... }) on a class, method, or parameter
    fn visit_decorator(&mut self, dec: &Decorator) {
        dec.visit_children_with(self);
        let line = self.line(dec.span());
        if let Some((name, arguments)) = decorator_name_and_args(&dec.expr) {
            self.annotations.push(Annotation {
                name,
                arguments,
                target_line: line,
            });
        }
    }
}

impl<'a> JsVisitor<'a> {
    fn handle_export_from(&mut self, export: &NamedExport, source: &Str, line: u32, allow_unused: bool) {
        let idx = self.push_import(Some(source.value.to_string()), ImportKind::Reexport, line);
        for spec in &export.specifiers {
            let (name, is_default) = match spec {
                ExportSpecifier::Namespace(ns) => (module_export_name(&ns.name).0, false),
                ExportSpecifier::Default(def) => (def.exported.sym.to_string(), false),
                ExportSpecifier::Named(named) => {
                    let (orig, orig_is_default) = module_export_name(&named.orig);
                    match &named.exported {
                        Some(exported) => module_export_name(exported),
                        None => (orig, orig_is_default),
                    }
                }
            };
            self.exports.push(ExportDecl {
                name,
                kind: ExportKind::Reexport,
                line,
                is_default,
                source_import: Some(idx),
                is_type_only: export.type_only,
                allow_unused,
            });
        }
    }
}

fn decl_kind_to_export_kind(kind: DeclarationKind) -> ExportKind {
    match kind {
        DeclarationKind::Function => ExportKind::Function,
        DeclarationKind::Class => ExportKind::Class,
        DeclarationKind::Struct => ExportKind::Class,
        DeclarationKind::Trait => ExportKind::Interface,
        DeclarationKind::Interface => ExportKind::Interface,
        DeclarationKind::Type => ExportKind::Type,
        DeclarationKind::Enum => ExportKind::Enum,
        DeclarationKind::Module => ExportKind::Namespace,
    }
}

fn module_export_name(name: &ModuleExportName) -> (String, bool) {
    match name {
        ModuleExportName::Ident(id) => {
            let s = id.sym.to_string();
            let is_default = s == "default";
            (s, is_default)
        }
        ModuleExportName::Str(s) => (s.value.to_string(), false),
    }
}

fn extract_string_arg(expr: &CallExpr) -> Option<String> {
    let arg = expr.args.first()?;
    match arg.expr.as_ref() {
        Expr::Lit(Lit::Str(s)) => Some(s.value.to_string()),
        _ => None,
    }
}

/// Stringifies a decorator's call argument only when it's a simple object
/// literal.
fn decorator_name_and_args(expr: &Expr) -> Option<(String, Option<String>)> {
    match expr {
        Expr::Ident(id) => Some((id.sym.to_string(), None)),
        Expr::Call(call) => {
            let name = match &call.callee {
                Callee::Expr(callee) => match callee.as_ref() {
                    Expr::Ident(id) => id.sym.to_string(),
                    Expr::Member(member) => match &member.prop {
                        MemberProp::Ident(id) => id.sym.to_string(),
                        _ => return None,
                    },
                    _ => return None,
                },
                _ => return None,
            };
            let args = call
                .args
                .first()
                .and_then(|a| a.expr.as_object())
                .map(stringify_object_lit);
            Some((name, args))
        }
        _ => None,
    }
}

fn stringify_object_lit(obj: &ObjectLit) -> String {
    let mut parts = Vec::new();
    for prop in &obj.props {
        if let PropOrSpread::Prop(p) = prop {
            if let Prop::KeyValue(kv) = p.as_ref() {
                let key = match &kv.key {
                    PropName::Ident(id) => id.sym.to_string(),
                    PropName::Str(s) => s.value.to_string(),
                    _ => continue,
                };
                let value = match kv.value.as_ref() {
                    Expr::Lit(Lit::Str(s)) => format!("\"{}\"", s.value),
                    Expr::Lit(Lit::Bool(b)) => b.value.to_string(),
                    Expr::Lit(Lit::Num(n)) => n.value.to_string(),
                    Expr::Ident(id) => id.sym.to_string(),
                    _ => "…".to_string(),
                };
                parts.push(format!("{key}: {value}"));
            }
        }
    }
    format!("{{ {} }}", parts.join(", "))
}
