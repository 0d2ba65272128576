/* src/cli/transform/src/strip.rs */

// Export stripping as a reachability sweep over top-level statements.
//
// Every top-level statement becomes a unit made of pieces: an import
// specifier, a variable declarator, an export specifier, or the whole
// statement. Pieces are roots (always kept), bindings (kept while reachable
// from a root) or stripped server-only exports. A binding is only a sweep
// candidate when something other than itself referenced it in the original
// module, so unused declarations the author wrote stay untouched.
//
// Output splices the source: untouched units keep their bytes, units that
// lost some pieces are re-joined from the surviving slices.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet, VecDeque};

use oxc_allocator::Allocator;
use oxc_ast::ast::{
  BindingPattern, Declaration, ExportNamedDeclaration, IdentifierReference, ImportDeclaration,
  ImportDeclarationSpecifier, ModuleExportName, Statement, VariableDeclaration,
};
use oxc_ast_visit::Visit;
use oxc_parser::Parser;
use oxc_semantic::{Scoping, SemanticBuilder};
use oxc_span::{GetSpan, SourceType, Span};

use crate::error::{Position, TransformError};
use crate::is_server_only;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
  Root,
  Binding,
  Stripped,
}

struct Piece<'s> {
  text: Cow<'s, str>,
  declares: Vec<String>,
  refs: HashSet<String>,
  role: Role,
  live: bool,
}

impl<'s> Piece<'s> {
  fn new(text: impl Into<Cow<'s, str>>, role: Role) -> Self {
    Self { text: text.into(), declares: Vec::new(), refs: HashSet::new(), role, live: false }
  }

  fn declares(mut self, names: impl IntoIterator<Item = String>) -> Self {
    self.declares.extend(names);
    self
  }

  fn refs(mut self, refs: HashSet<String>) -> Self {
    self.refs = refs;
    self
  }
}

enum Layout<'s> {
  Whole,
  /// `head` + pieces joined by ", " + `tail`.
  List { head: &'s str, tail: &'s str },
  /// Pieces before `named_from` are default/namespace specifiers.
  Import { head: &'static str, named_from: usize, source: &'s str, tail: &'s str },
}

struct Unit<'s> {
  span: Span,
  layout: Layout<'s>,
  pieces: Vec<Piece<'s>>,
  rewritten: bool,
}

impl<'s> Unit<'s> {
  fn whole(span: Span, piece: Piece<'s>) -> Self {
    Self { span, layout: Layout::Whole, pieces: vec![piece], rewritten: false }
  }

  fn regenerate(&self) -> String {
    let live = |pieces: &[Piece<'_>]| -> Vec<String> {
      pieces.iter().filter(|p| p.live).map(|p| p.text.to_string()).collect()
    };
    match &self.layout {
      Layout::Whole => live(&self.pieces).concat(),
      Layout::List { head, tail } => format!("{head}{}{tail}", live(&self.pieces).join(", ")),
      Layout::Import { head, named_from, source, tail } => {
        let mut parts = live(&self.pieces[..*named_from]);
        let named = live(&self.pieces[*named_from..]);
        if !named.is_empty() {
          parts.push(format!("{{ {} }}", named.join(", ")));
        }
        format!("{head}{} from {source}{tail}", parts.join(", "))
      }
    }
  }
}

/// Names of the module-level bindings a node reads. References that resolve
/// to a nested scope (parameters, locals shadowing an import) are skipped.
struct References<'c> {
  scoping: &'c Scoping,
  names: HashSet<String>,
}

impl<'a> Visit<'a> for References<'_> {
  fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
    if let Some(id) = ident.reference_id.get()
      && let Some(symbol) = self.scoping.get_reference(id).symbol_id()
      && self.scoping.symbol_scope_id(symbol) != self.scoping.root_scope_id()
    {
      return;
    }
    self.names.insert(ident.name.to_string());
  }
}

fn references(scoping: &Scoping, visit: impl FnOnce(&mut References<'_>)) -> HashSet<String> {
  let mut collector = References { scoping, names: HashSet::new() };
  visit(&mut collector);
  collector.names
}

/// Client variant of `source` plus the server-only export names removed.
pub(crate) fn strip_server_exports(file: &str, source: &str) -> Result<(String, Vec<String>), TransformError> {
  let allocator = Allocator::default();
  let source_type = SourceType::from_path(file).unwrap_or_else(|_| SourceType::tsx());
  let ret = Parser::new(&allocator, source, source_type).parse();
  if !ret.errors.is_empty() {
    return Err(TransformError::Parse {
      file: file.to_string(),
      diagnostics: ret.errors.iter().map(ToString::to_string).collect(),
    });
  }

  let semantic = SemanticBuilder::new().build(&ret.program).semantic;
  let scoping = semantic.scoping();

  let mut stripped = Vec::new();
  let mut units = Vec::with_capacity(ret.program.body.len());
  for stmt in &ret.program.body {
    units.push(unit_for(file, source, scoping, stmt, &mut stripped)?);
  }
  if stripped.is_empty() {
    return Ok((source.to_string(), stripped));
  }
  mark_live(&mut units);
  Ok((render(source, &units), stripped))
}

fn unit_for<'s>(
  file: &str,
  source: &'s str,
  scoping: &Scoping,
  stmt: &Statement<'_>,
  stripped: &mut Vec<String>,
) -> Result<Unit<'s>, TransformError> {
  let span = stmt.span();
  let unit = match stmt {
    Statement::ExportAllDeclaration(decl) => {
      return Err(TransformError::ExportAll {
        file: file.to_string(),
        position: Position::at(source, decl.span.start),
        source: decl.source.value.to_string(),
      });
    }
    Statement::ImportDeclaration(decl) => import_unit(source, decl),
    Statement::ExportNamedDeclaration(decl) => export_unit(source, scoping, decl, stripped),
    Statement::FunctionDeclaration(func) => {
      binding_unit(source, span, func.id.as_ref().map(|id| id.name.to_string()), references(scoping, |v| v.visit_statement(stmt)))
    }
    Statement::ClassDeclaration(class) => {
      binding_unit(source, span, class.id.as_ref().map(|id| id.name.to_string()), references(scoping, |v| v.visit_statement(stmt)))
    }
    Statement::VariableDeclaration(decl) => vars_unit(source, scoping, span, decl),
    _ => Unit::whole(span, Piece::new(slice(source, span), Role::Root).refs(references(scoping, |v| v.visit_statement(stmt)))),
  };
  Ok(unit)
}

fn binding_unit<'s>(source: &'s str, span: Span, name: Option<String>, refs: HashSet<String>) -> Unit<'s> {
  let role = if name.is_some() { Role::Binding } else { Role::Root };
  Unit::whole(span, Piece::new(slice(source, span), role).declares(name).refs(refs))
}

fn import_unit<'s>(source: &'s str, decl: &ImportDeclaration<'_>) -> Unit<'s> {
  let span = decl.span;
  let Some(specifiers) = decl.specifiers.as_ref().filter(|s| !s.is_empty()) else {
    return Unit::whole(span, Piece::new(slice(source, span), Role::Root));
  };

  let mut leading = Vec::new();
  let mut named = Vec::new();
  for specifier in specifiers {
    let (spec_span, local) = match specifier {
      ImportDeclarationSpecifier::ImportSpecifier(s) => (s.span, &s.local),
      ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => (s.span, &s.local),
      ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => (s.span, &s.local),
    };
    let piece = Piece::new(slice(source, spec_span), Role::Binding).declares([local.name.to_string()]);
    match specifier {
      ImportDeclarationSpecifier::ImportSpecifier(_) => named.push(piece),
      _ => leading.push(piece),
    }
  }

  let named_from = leading.len();
  leading.extend(named);
  Unit {
    span,
    layout: Layout::Import {
      head: if decl.import_kind.is_type() { "import type " } else { "import " },
      named_from,
      source: slice(source, decl.source.span),
      tail: &source[decl.source.span.end as usize..span.end as usize],
    },
    pieces: leading,
    rewritten: false,
  }
}

fn vars_unit<'s>(source: &'s str, scoping: &Scoping, span: Span, decl: &VariableDeclaration<'_>) -> Unit<'s> {
  let pieces = decl
    .declarations
    .iter()
    .map(|d| {
      Piece::new(slice(source, d.span), Role::Binding)
        .declares(binding_names(&d.id))
        .refs(references(scoping, |v| v.visit_variable_declarator(d)))
    })
    .collect();
  list_unit(source, span, list_bounds(decl), pieces)
}

fn export_unit<'s>(
  source: &'s str,
  scoping: &Scoping,
  decl: &ExportNamedDeclaration<'_>,
  stripped: &mut Vec<String>,
) -> Unit<'s> {
  let span = decl.span;
  if decl.export_kind.is_type() {
    return Unit::whole(span, Piece::new(slice(source, span), Role::Root));
  }

  if let Some(declaration) = &decl.declaration {
    let refs = || references(scoping, |v| v.visit_declaration(declaration));
    return match declaration {
      Declaration::FunctionDeclaration(func) => {
        exported_unit(source, span, func.id.as_ref().map(|id| id.name.to_string()), refs(), stripped)
      }
      Declaration::ClassDeclaration(class) => {
        exported_unit(source, span, class.id.as_ref().map(|id| id.name.to_string()), refs(), stripped)
      }
      Declaration::VariableDeclaration(vars) => exported_vars(source, scoping, span, vars, stripped),
      _ => Unit::whole(span, Piece::new(slice(source, span), Role::Root).refs(refs())),
    };
  }

  let (Some(first), Some(last)) = (decl.specifiers.first(), decl.specifiers.last()) else {
    return Unit::whole(span, Piece::new(slice(source, span), Role::Root));
  };
  let pieces = decl
    .specifiers
    .iter()
    .map(|spec| {
      let exported = export_name(&spec.exported);
      let role = if is_server_only(&exported) {
        stripped.push(exported);
        Role::Stripped
      } else {
        Role::Root
      };
      let mut piece = Piece::new(slice(source, spec.span), role);
      if decl.source.is_none()
        && !spec.export_kind.is_type()
        && let Some(local) = local_name(&spec.local)
      {
        piece.refs.insert(local);
      }
      piece
    })
    .collect();
  list_unit(source, span, (first.span.start, last.span.end), pieces)
}

fn exported_unit<'s>(
  source: &'s str,
  span: Span,
  name: Option<String>,
  refs: HashSet<String>,
  stripped: &mut Vec<String>,
) -> Unit<'s> {
  let role = match &name {
    Some(name) if is_server_only(name) => {
      stripped.push(name.clone());
      Role::Stripped
    }
    _ => Role::Root,
  };
  Unit::whole(span, Piece::new(slice(source, span), role).declares(name).refs(refs))
}

fn exported_vars<'s>(
  source: &'s str,
  scoping: &Scoping,
  span: Span,
  decl: &VariableDeclaration<'_>,
  stripped: &mut Vec<String>,
) -> Unit<'s> {
  let mut rewritten = false;
  let pieces = decl
    .declarations
    .iter()
    .map(|d| {
      let names = binding_names(&d.id);
      let refs = references(scoping, |v| v.visit_variable_declarator(d));
      if !names.is_empty() && names.iter().all(|n| is_server_only(n)) {
        stripped.extend(names.iter().cloned());
        return Piece::new(slice(source, d.span), Role::Stripped).declares(names).refs(refs);
      }
      let Some((pattern, removed)) = without_server_names(source, &d.id) else {
        return Piece::new(slice(source, d.span), Role::Root).declares(names).refs(refs);
      };
      rewritten = true;
      let rest = &source[d.id.span().end as usize..d.span.end as usize];
      let kept: Vec<String> = names.into_iter().filter(|n| !removed.contains(n)).collect();
      stripped.extend(removed);
      Piece::new(format!("{pattern}{rest}"), Role::Root).declares(kept).refs(refs)
    })
    .collect();
  let mut unit = list_unit(source, span, list_bounds(decl), pieces);
  unit.rewritten = rewritten;
  unit
}

fn list_bounds(decl: &VariableDeclaration<'_>) -> (u32, u32) {
  match (decl.declarations.first(), decl.declarations.last()) {
    (Some(first), Some(last)) => (first.span.start, last.span.end),
    _ => (decl.span.end, decl.span.end),
  }
}

fn list_unit<'s>(source: &'s str, span: Span, (start, end): (u32, u32), pieces: Vec<Piece<'s>>) -> Unit<'s> {
  Unit {
    span,
    layout: Layout::List {
      head: &source[span.start as usize..start as usize],
      tail: &source[end as usize..span.end as usize],
    },
    pieces,
    rewritten: false,
  }
}

/// Top-level destructuring with its server-only identifiers dropped, plus
/// the names dropped. `None` when nothing at the top level is server-only.
fn without_server_names(source: &str, pattern: &BindingPattern<'_>) -> Option<(String, Vec<String>)> {
  let mut removed = Vec::new();
  let mut kept: Vec<&str> = Vec::new();
  let text = match pattern {
    BindingPattern::ObjectPattern(obj) => {
      for prop in &obj.properties {
        match server_binding(&prop.value) {
          Some(name) => removed.push(name),
          None => kept.push(slice(source, prop.span)),
        }
      }
      if let Some(rest) = &obj.rest {
        match server_binding(&rest.argument) {
          Some(name) => removed.push(name),
          None => kept.push(slice(source, rest.span)),
        }
      }
      format!("{{ {} }}", kept.join(", "))
    }
    BindingPattern::ArrayPattern(arr) => {
      for element in &arr.elements {
        match element {
          Some(element) => match server_binding(element) {
            Some(name) => {
              removed.push(name);
              kept.push("");
            }
            None => kept.push(slice(source, element.span())),
          },
          None => kept.push(""),
        }
      }
      if let Some(rest) = &arr.rest {
        match server_binding(&rest.argument) {
          Some(name) => removed.push(name),
          None => kept.push(slice(source, rest.span)),
        }
      }
      format!("[{}]", kept.join(", "))
    }
    _ => return None,
  };
  (!removed.is_empty()).then_some((text, removed))
}

fn server_binding(pattern: &BindingPattern<'_>) -> Option<String> {
  match pattern {
    BindingPattern::BindingIdentifier(id) if is_server_only(&id.name) => Some(id.name.to_string()),
    BindingPattern::AssignmentPattern(assign) => server_binding(&assign.left),
    _ => None,
  }
}

fn binding_names(pattern: &BindingPattern<'_>) -> Vec<String> {
  let mut names = Vec::new();
  collect_binding_names(pattern, &mut names);
  names
}

fn collect_binding_names(pattern: &BindingPattern<'_>, names: &mut Vec<String>) {
  match pattern {
    BindingPattern::BindingIdentifier(id) => names.push(id.name.to_string()),
    BindingPattern::ObjectPattern(obj) => {
      for prop in &obj.properties {
        collect_binding_names(&prop.value, names);
      }
      if let Some(rest) = &obj.rest {
        collect_binding_names(&rest.argument, names);
      }
    }
    BindingPattern::ArrayPattern(arr) => {
      for element in arr.elements.iter().flatten() {
        collect_binding_names(element, names);
      }
      if let Some(rest) = &arr.rest {
        collect_binding_names(&rest.argument, names);
      }
    }
    BindingPattern::AssignmentPattern(assign) => collect_binding_names(&assign.left, names),
  }
}

fn export_name(name: &ModuleExportName<'_>) -> String {
  match name {
    ModuleExportName::IdentifierName(id) => id.name.to_string(),
    ModuleExportName::IdentifierReference(id) => id.name.to_string(),
    ModuleExportName::StringLiteral(s) => s.value.to_string(),
  }
}

fn local_name(name: &ModuleExportName<'_>) -> Option<String> {
  match name {
    ModuleExportName::IdentifierName(id) => Some(id.name.to_string()),
    ModuleExportName::IdentifierReference(id) => Some(id.name.to_string()),
    ModuleExportName::StringLiteral(_) => None,
  }
}

/// Mark every piece reachable from the roots as live.
fn mark_live(units: &mut [Unit<'_>]) {
  let mut referenced_elsewhere = HashSet::new();
  for piece in units.iter().flat_map(|u| &u.pieces) {
    referenced_elsewhere.extend(piece.refs.iter().filter(|r| !piece.declares.contains(r)).cloned());
  }

  let mut declared_by: HashMap<String, Vec<(usize, usize)>> = HashMap::new();
  let mut queue = VecDeque::new();
  for (u, unit) in units.iter_mut().enumerate() {
    for (p, piece) in unit.pieces.iter_mut().enumerate() {
      match piece.role {
        Role::Root => {
          piece.live = true;
          queue.extend(piece.refs.iter().cloned());
        }
        Role::Binding if piece.declares.iter().any(|n| referenced_elsewhere.contains(n)) => {
          for name in &piece.declares {
            declared_by.entry(name.clone()).or_default().push((u, p));
          }
        }
        Role::Binding => {
          piece.live = true;
          queue.extend(piece.refs.iter().cloned());
        }
        Role::Stripped => {}
      }
    }
  }

  let mut seen = HashSet::new();
  while let Some(name) = queue.pop_front() {
    if !seen.insert(name.clone()) {
      continue;
    }
    for &(u, p) in declared_by.get(&name).map(Vec::as_slice).unwrap_or_default() {
      let piece = &mut units[u].pieces[p];
      if !piece.live {
        piece.live = true;
        queue.extend(piece.refs.iter().cloned());
      }
    }
  }
}

fn render(source: &str, units: &[Unit<'_>]) -> String {
  let mut out = String::with_capacity(source.len());
  let mut cursor = 0;
  for unit in units {
    let live = unit.pieces.iter().filter(|p| p.live).count();
    if live == unit.pieces.len() && !unit.rewritten {
      continue;
    }
    let (start, end) = (unit.span.start as usize, unit.span.end as usize);
    out.push_str(&source[cursor..start]);
    if live == 0 {
      cursor = skip_line_break(source, end);
    } else {
      out.push_str(&unit.regenerate());
      cursor = end;
    }
  }
  out.push_str(&source[cursor..]);
  out
}

fn skip_line_break(source: &str, end: usize) -> usize {
  let rest = &source[end..];
  if rest.starts_with("\r\n") {
    end + 2
  } else if rest.starts_with('\n') {
    end + 1
  } else {
    end
  }
}

fn slice(source: &str, span: Span) -> &str {
  &source[span.start as usize..span.end as usize]
}
