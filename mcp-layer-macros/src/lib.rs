use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, ItemFn, FnArg, Type, ReturnType, GenericArgument, PathArguments};
use syn::punctuated::Punctuated;
use syn::{Meta, Token, Expr, ExprLit, Lit, Path};
use syn::parse::Parser;

/// Register an axum handler as an MCP tool.
///
/// ```ignore
/// #[mcp_tool(name = "lookup", desc = "Find a thing", state = "AppState")]
/// async fn lookup(State(s): State<AppState>, Json(args): Json<LookupArgs>)
///     -> Result<Json<Value>, LookupError>
/// ```
///
/// The handler stays a plain axum handler. The generated `ToolHandler`
/// decodes the call arguments into the `Json<T>` payload type, clones the
/// state out of the registry's app state, and converts an `Err(E)` through
/// `Into<mcp_layer::tool::ToolError>`.
#[proc_macro_attribute]
pub fn mcp_tool(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input_fn = parse_macro_input!(item as ItemFn);

    // Parse attributes: name = "...", desc = "...", state = "TypePath"
    let parser = Punctuated::<Meta, Token![,]>::parse_terminated;
    let metas = match parser.parse(attr) {
        Ok(m) => m,
        Err(e) => return e.to_compile_error().into(),
    };
    let mut tool_name: Option<String> = None;
    let mut tool_desc: Option<String> = None;
    let mut state_ty: Option<Path> = None;
    for m in metas {
        match m {
            Meta::NameValue(nv) if nv.path.is_ident("name") => {
                if let Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) = nv.value { tool_name = Some(s.value()); }
            }
            Meta::NameValue(nv) if nv.path.is_ident("desc") => {
                if let Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) = nv.value { tool_desc = Some(s.value()); }
            }
            Meta::NameValue(nv) if nv.path.is_ident("state") => {
                if let Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) = nv.value {
                    match syn::parse_str(&s.value()) {
                        Ok(p) => state_ty = Some(p),
                        Err(e) => return syn::Error::new_spanned(s, format!("invalid state type path: {e}")).to_compile_error().into(),
                    }
                }
            }
            other => {
                return syn::Error::new_spanned(other, "expected name = \"..\", desc = \"..\" or state = \"..\"").to_compile_error().into();
            }
        }
    }

    let fn_name = &input_fn.sig.ident;

    let Some(tool_desc) = tool_desc else {
        return syn::Error::new_spanned(fn_name, "#[mcp_tool] requires desc = \"...\"; every tool is listed with a description").to_compile_error().into();
    };

    // Parse params: exactly one Json<T>, and a State<S> param
    let mut json_ty: Option<Type> = None;
    let mut state_param_ty: Option<Type> = None;
    for p in &input_fn.sig.inputs {
        if let FnArg::Typed(pt) = p {
            if let Some(t) = wrapped_type(&pt.ty, "Json") { json_ty = Some(t); }
            if let Some(t) = wrapped_type(&pt.ty, "State") { state_param_ty = Some(t); }
        }
    }
    // Validate state type path if provided via attribute against the parsed State<S>
    if let (Some(attr_state), Some(sig_state)) = (state_ty.as_ref(), state_param_ty.as_ref()) {
        let a = quote!(#attr_state).to_string();
        let b = quote!(#sig_state).to_string();
        if a != b {
            return syn::Error::new_spanned(fn_name, format!("#[mcp_tool(state = \"{}\")] does not match State<{}> parameter", a, b)).to_compile_error().into();
        }
    }
    let Some(json_ty) = json_ty else {
        return syn::Error::new_spanned(&input_fn.sig, "#[mcp_tool] requires exactly one axum::Json<T> parameter").to_compile_error().into();
    };
    let Some(state_param_ty) = state_param_ty else {
        return syn::Error::new_spanned(&input_fn.sig, "#[mcp_tool] requires a State<S> parameter to downcast app_state").to_compile_error().into();
    };

    // Parse return type: Json<O> or Result<Json<O>, E>
    let ReturnType::Type(_, ret) = &input_fn.sig.output else {
        return syn::Error::new_spanned(&input_fn.sig, "return type must be Json<Out> or Result<Json<Out>, E>").to_compile_error().into();
    };
    let (output_ty, fallible) = if let Some(ok) = wrapped_type(ret, "Result") {
        match wrapped_type(&ok, "Json") {
            Some(o) => (o, true),
            None => return syn::Error::new_spanned(ret, "expected Result<Json<Out>, E>").to_compile_error().into(),
        }
    } else if let Some(o) = wrapped_type(ret, "Json") {
        (o, false)
    } else {
        return syn::Error::new_spanned(ret, "return type must be Json<Out> or Result<Json<Out>, E>").to_compile_error().into();
    };

    let tool_name_lit = tool_name.unwrap_or_else(|| fn_name.to_string());
    let handler_ident = format_ident!("{}__mcp_tool_handler", fn_name.to_string());
    let reg_ident = format_ident!("{}_MCP_TOOL", fn_name.to_string().to_uppercase());

    let finish = if fallible {
        quote! {
            match out {
                Ok(v) => Ok(mcp_layer::IntoJsonValue::into_json_value(v)),
                Err(e) => Err(e.into()),
            }
        }
    } else {
        quote! { Ok(mcp_layer::IntoJsonValue::into_json_value(out)) }
    };

    let expanded = quote! {
        #input_fn

        #[allow(non_camel_case_types)]
        struct #handler_ident;
        #[async_trait::async_trait]
        impl mcp_layer::tool::ToolHandler for #handler_ident {
            async fn call(&self, ctx: &mcp_layer::tool::ToolCtx, args: serde_json::Value) -> Result<serde_json::Value, mcp_layer::tool::ToolError> {
                use axum::extract::State;
                let sref = ctx.app_state.as_ref().downcast_ref::<#state_param_ty>()
                    .ok_or_else(|| mcp_layer::tool::ToolError::Internal("invalid state type".into()))?;
                let state_val: #state_param_ty = sref.clone();
                let input: #json_ty = serde_json::from_value(args)
                    .map_err(|e| mcp_layer::tool::ToolError::InvalidArgs(e.to_string()))?;
                let out = #fn_name(State(state_val), axum::Json(input)).await;
                #finish
            }
        }

        #[linkme::distributed_slice(mcp_layer::registry::TOOLS)]
        pub static #reg_ident: mcp_layer::registry::ToolRegistration = mcp_layer::registry::ToolRegistration {
            name: #tool_name_lit,
            description: #tool_desc,
            input_schema: || schemars::schema_for!(#json_ty),
            output_schema: || schemars::schema_for!(#output_ty),
            build_handler: || std::sync::Arc::new(#handler_ident),
            defined_at_file: file!(),
            defined_at_line: line!(),
        };
    };

    TokenStream::from(expanded)
}

/// `Wrapper<T>` -> `T` when the last path segment is `wrapper`.
fn wrapped_type(ty: &Type, wrapper: &str) -> Option<Type> {
    let Type::Path(tp) = ty else { return None };
    let last = tp.path.segments.last()?;
    if last.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(ab) = &last.arguments else { return None };
    ab.args.iter().find_map(|a| match a {
        GenericArgument::Type(t) => Some(t.clone()),
        _ => None,
    })
}
