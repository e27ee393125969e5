//! Emitter — description → header, implementation and build script text.
//!
//! Every type decision is delegated to the [`Translator`]; this module only
//! arranges the fragments into files.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt::Write;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::array::{flatten, index_expr};
use crate::config::OutputConfig;
use crate::mapper::Translator;
use crate::model::*;

/// Generated files, keyed by file name.
pub type Artifacts = BTreeMap<String, String>;

/// Emit the header, implementation and CMake build script.
pub fn emit_library(
    desc: &ApiDescription,
    tr: &Translator<'_>,
    output: &OutputConfig,
) -> Result<Artifacts> {
    let mut artifacts = Artifacts::new();
    let header_name = format!("{}.h", output.name);
    let source_name = format!("{}.cpp", output.name);

    let header = emit_header(desc, tr, &output.name)?;
    let source = emit_source(desc, tr, &header_name, &output.native_headers)?;
    let cmake = emit_cmake(&output.name, &source_name, &output.link_libraries)?;

    artifacts.insert(header_name, header);
    artifacts.insert(source_name, source);
    artifacts.insert("CMakeLists.txt".to_string(), cmake);
    Ok(artifacts)
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

fn emit_header(desc: &ApiDescription, tr: &Translator<'_>, name: &str) -> Result<String> {
    let ns = tr.naming;
    let guard = format!("{}_H", name.to_uppercase());
    let mut out = String::new();

    writeln!(out, "// Generated by bnd-clib. Do not edit.")?;
    writeln!(out, "#ifndef {guard}")?;
    writeln!(out, "#define {guard}")?;
    writeln!(out)?;
    writeln!(out, "typedef void *{};", ns.opaque_ptr())?;
    writeln!(
        out,
        "typedef struct {{ char *str; int size; {} ptr; }} {};",
        ns.opaque_ptr(),
        ns.abi_type("string")
    )?;
    writeln!(out)?;

    // Forward declarations let containers and callbacks name any struct.
    let structs = struct_order(desc);
    for s in &structs {
        let abi = ns.abi_type(&s.name);
        writeln!(out, "typedef struct {abi} {abi};")?;
    }
    writeln!(out)?;

    for (token, element) in vector_types(desc, tr)? {
        writeln!(
            out,
            "typedef struct {{ {element} *data; unsigned int size; }} {token};"
        )?;
    }

    for (alias, abi) in field_aliases(desc, tr)? {
        writeln!(out, "typedef {abi} {alias};")?;
    }
    writeln!(out)?;

    for td in desc.typedefs().filter(|td| tr.registry.is_function_pointer(&td.name)) {
        emit_function_pointer(&mut out, tr, td)?;
    }
    for name in undeclared_function_pointers(desc, tr) {
        warn!(name = %name, "function pointer has no typedef in the description, emitting opaque pointer");
        writeln!(out, "typedef void *{};", ns.abi_type(name))?;
    }
    writeln!(out)?;

    for s in structs {
        writeln!(out, "struct {} {{", ns.abi_type(&s.name))?;
        for field in &s.fields {
            if field.ty.is_array && field.ty.array_dimension_sizes.is_empty() {
                warn!(
                    name = %field.name,
                    owner = %s.name,
                    "array field without dimensions"
                );
            }
            writeln!(out, "    {};", tr.struct_field(field))?;
        }
        writeln!(out, "}};")?;
        writeln!(out)?;
        debug!(name = %s.name, fields = s.fields.len(), "emitted struct");
    }

    for f in desc.functions() {
        let signature = tr
            .signature(f)
            .with_context(|| format!("translating function `{}`", f.name))?;
        writeln!(out, "{signature};")?;
        debug!(name = %f.name, params = f.parameters.len(), "emitted function declaration");
    }

    writeln!(out)?;
    writeln!(out, "#endif /* {guard} */")?;
    Ok(out)
}

fn emit_function_pointer(out: &mut String, tr: &Translator<'_>, td: &TypedefDef) -> Result<()> {
    let void = TypeDescriptor::void();
    let ret = tr
        .map_type(td.return_type.as_ref().unwrap_or(&void))
        .with_context(|| format!("translating typedef `{}`", td.name))?;
    let params = tr
        .parameter_list(&td.parameters)
        .with_context(|| format!("translating typedef `{}`", td.name))?;
    writeln!(
        out,
        "typedef {ret} (*{})({params});",
        tr.naming.abi_type(&td.name)
    )?;
    debug!(name = %td.name, "emitted function pointer typedef");
    Ok(())
}

/// Configured function-pointer names the description never declares, sorted.
fn undeclared_function_pointers<'a>(
    desc: &ApiDescription,
    tr: &Translator<'a>,
) -> BTreeSet<&'a str> {
    let declared: HashSet<&str> = desc.typedefs().map(|td| td.name.as_str()).collect();
    tr.registry
        .function_pointers
        .iter()
        .map(String::as_str)
        .filter(|name| !declared.contains(name))
        .collect()
}

/// Structs in description order, except that a struct held by value in a
/// field is defined before the struct holding it.
fn struct_order(desc: &ApiDescription) -> Vec<&StructDef> {
    fn visit<'a>(
        s: &'a StructDef,
        by_name: &HashMap<&str, &'a StructDef>,
        seen: &mut HashSet<&'a str>,
        out: &mut Vec<&'a StructDef>,
    ) {
        if !seen.insert(s.name.as_str()) {
            return;
        }
        for field in s.fields.iter().filter(|f| !f.ty.is_pointer) {
            if let Some(dep) = by_name.get(field.ty.ty.as_str()) {
                visit(dep, by_name, seen, out);
            }
        }
        out.push(s);
    }

    let by_name: HashMap<&str, &StructDef> =
        desc.structs().map(|s| (s.name.as_str(), s)).collect();
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(by_name.len());
    for s in desc.structs() {
        visit(s, &by_name, &mut seen, &mut out);
    }
    out
}

/// Every `vector<T>` in a signature or field, as `(abi token, element abi type)`.
fn vector_types(desc: &ApiDescription, tr: &Translator<'_>) -> Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for ty in all_types(desc) {
        if let (true, Some(element)) = (ty.ty == "vector", &ty.type_p) {
            let token = tr.map_type(ty)?;
            let element_type = tr
                .map_type(&TypeDescriptor::named(element.as_str()))
                .with_context(|| format!("translating element type of `{token}`"))?;
            out.insert(token, element_type);
        }
    }
    Ok(out)
}

/// Struct fields are declared as `__sklib_<type>`; alias every such name
/// that is not already an ABI type to the mapped type.
///
/// Two fields spelled alike must agree on the mapped type.
fn field_aliases(desc: &ApiDescription, tr: &Translator<'_>) -> Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for s in desc.structs() {
        for field in s.fields.iter().filter(|f| !f.ty.is_void_pointer()) {
            let element = field.ty.element();
            let abi = tr
                .map_type(&TypeDescriptor {
                    is_pointer: false,
                    is_reference: false,
                    ..element
                })
                .with_context(|| format!("translating field `{}` of struct `{}`", field.name, s.name))?;
            let alias = tr.field_type(&field.ty);
            if alias == abi {
                continue;
            }
            if let Some(previous) = out.get(&alias).filter(|previous| **previous != abi) {
                anyhow::bail!(
                    "field type `{alias}` would alias both `{previous}` and `{abi}` (field `{}` of struct `{}`)",
                    field.name,
                    s.name
                );
            }
            out.insert(alias, abi);
        }
    }
    Ok(out)
}

fn all_types(desc: &ApiDescription) -> impl Iterator<Item = &TypeDescriptor> {
    let functions = desc.functions().flat_map(|f| {
        std::iter::once(&f.return_type).chain(f.parameters.iter().map(|p| &p.ty))
    });
    let fields = desc
        .structs()
        .flat_map(|s| s.fields.iter().map(|field| &field.ty));
    functions.chain(fields)
}

// ---------------------------------------------------------------------------
// Implementation
// ---------------------------------------------------------------------------

fn emit_source(
    desc: &ApiDescription,
    tr: &Translator<'_>,
    header_name: &str,
    native_headers: &[String],
) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "// Generated by bnd-clib. Do not edit.")?;
    for h in native_headers {
        writeln!(out, "#include \"{h}\"")?;
    }
    writeln!(out, "#include \"{header_name}\"")?;
    writeln!(out)?;

    // Struct adapters first so function bodies can use them.
    for s in struct_order(desc) {
        emit_struct_adapters(&mut out, tr, s)
            .with_context(|| format!("translating struct `{}`", s.name))?;
    }

    writeln!(out, "extern \"C\" {{")?;
    writeln!(out)?;
    for f in desc.functions() {
        emit_function_body(&mut out, tr, f)
            .with_context(|| format!("translating function `{}`", f.name))?;
    }
    writeln!(out, "}}")?;
    Ok(out)
}

fn emit_struct_adapters(out: &mut String, tr: &Translator<'_>, s: &StructDef) -> Result<()> {
    let lib_name = tr.naming.abi_type(&s.name);
    let as_type = TypeDescriptor::named(s.name.as_str());

    // native → library
    writeln!(out, "{lib_name} {}(const {} &v)", tr.lib_adapter(&as_type)?, s.name)?;
    writeln!(out, "{{")?;
    writeln!(out, "    {lib_name} result;")?;
    for field in &s.fields {
        let adapter = tr.lib_adapter(&field.ty.element())?;
        if field.ty.is_array {
            let dims = &field.ty.array_dimension_sizes;
            for i in 0..flatten(dims) {
                writeln!(
                    out,
                    "    result.{name}[{i}] = {adapter}(v.{name}{});",
                    index_expr(dims, i),
                    name = field.name
                )?;
            }
        } else {
            writeln!(out, "    result.{name} = {adapter}(v.{name});", name = field.name)?;
        }
    }
    writeln!(out, "    return result;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    // library → native
    writeln!(
        out,
        "{} {}(const {lib_name} &v)",
        s.name,
        tr.native_adapter(&as_type)
    )?;
    writeln!(out, "{{")?;
    writeln!(out, "    {} result;", s.name)?;
    for field in &s.fields {
        let adapter = tr.native_adapter(&field.ty.element());
        if field.ty.is_array {
            let dims = &field.ty.array_dimension_sizes;
            for i in 0..flatten(dims) {
                writeln!(
                    out,
                    "    result.{name}{} = {adapter}(v.{name}[{i}]);",
                    index_expr(dims, i),
                    name = field.name
                )?;
            }
        } else {
            writeln!(out, "    result.{name} = {adapter}(v.{name});", name = field.name)?;
        }
    }
    writeln!(out, "    return result;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    debug!(name = %s.name, "emitted struct adapters");
    Ok(())
}

/// Convert each argument to its native value, call the native function,
/// copy non-const references back and convert the result.
fn emit_function_body(out: &mut String, tr: &Translator<'_>, f: &FunctionDef) -> Result<()> {
    writeln!(out, "{}", tr.signature(f)?)?;
    writeln!(out, "{{")?;

    let mut args = Vec::with_capacity(f.parameters.len());
    for p in &f.parameters {
        let local = format!("__skparam__{}", p.name);
        let deref = if p.ty.is_reference { "*" } else { "" };
        writeln!(
            out,
            "    auto {local} = {}({deref}{});",
            tr.native_adapter(&p.ty),
            p.name
        )?;
        args.push(local);
    }

    let call = format!("{}({})", f.name, args.join(", "));
    let returns = !f.return_type.is_void();
    if returns {
        writeln!(out, "    auto __skreturn = {call};")?;
    } else {
        writeln!(out, "    {call};")?;
    }

    for p in f
        .parameters
        .iter()
        .filter(|p| p.ty.is_reference && !p.ty.is_const)
    {
        writeln!(
            out,
            "    *{name} = {}(__skparam__{name});",
            tr.lib_adapter(&p.ty)?,
            name = p.name
        )?;
    }

    if returns {
        writeln!(out, "    return {}(__skreturn);", tr.lib_adapter(&f.return_type)?)?;
    }
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Build script
// ---------------------------------------------------------------------------

fn emit_cmake(name: &str, source_name: &str, link_libraries: &[String]) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "cmake_minimum_required(VERSION 3.10)")?;
    writeln!(out, "project({name} CXX)")?;
    writeln!(out)?;
    writeln!(out, "set(CMAKE_CXX_STANDARD 14)")?;
    writeln!(out)?;
    writeln!(out, "add_library({name} SHARED {source_name})")?;
    if !link_libraries.is_empty() {
        writeln!(out, "target_link_libraries({name} {})", link_libraries.join(" "))?;
    }
    Ok(out)
}
