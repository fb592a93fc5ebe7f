use heck::ToUpperCamelCase;
use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, FnArg, GenericArgument, ImplItem, ImplItemFn, ItemImpl, PathArguments,
    ReturnType, Type,
};

/// Makes listener registration methods of a component type callable by name.
///
/// Every method of the annotated `impl` block named `add_<x>_listener` or
/// `remove_<x>_listener` is registered with the dynamic capability resolver
/// under `add<X>Listener` / `remove<X>Listener`, `<X>` being `x` in
/// UpperCamelCase. Such methods take `&self` and exactly one `Arc<L>`
/// parameter; a listener reaches the method if it was created as an
/// `EventListener` of `Arc<L>`. Methods of any other shape are left alone.
///
/// The method may return `()`, `bool` or a `Result`; `false` and `Err`
/// count as not registered.
///
/// ```ignore
/// #[form_dispatch::listener_methods]
/// impl TreeHandler {
///     pub fn add_expansion_listener(&self, l: Arc<dyn ExpansionListener>) { ... }
///     pub fn remove_expansion_listener(&self, l: Arc<dyn ExpansionListener>) { ... }
/// }
/// ```
#[proc_macro_attribute]
pub fn listener_methods(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[listener_methods] takes no arguments",
        )
        .to_compile_error()
        .into();
    }
    let item = parse_macro_input!(input as ItemImpl);
    match expand(&item) {
        Ok(regs) => quote! { #item #(#regs)* }.into(),
        Err(e) => {
            let err = e.to_compile_error();
            quote! { #item #err }.into()
        }
    }
}

fn expand(item: &ItemImpl) -> syn::Result<Vec<proc_macro2::TokenStream>> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[listener_methods] only supports inherent impl blocks",
        ));
    }
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "#[listener_methods] does not support generic impl blocks",
        ));
    }
    let self_ty = &item.self_ty;
    let mut out = Vec::new();
    for it in &item.items {
        let ImplItem::Fn(f) = it else { continue };
        let Some(name) = convention_name(&f.sig.ident.to_string()) else { continue };
        let Some(listener_ty) = listener_param(f) else { continue };
        let Some(outcome) = call_outcome(&f.sig.output) else { continue };
        let ident = &f.sig.ident;
        out.push(quote! {
            #[doc(hidden)]
            const _: () = {
                fn __invoke(
                    target: &(dyn ::core::any::Any + ::core::marker::Send + ::core::marker::Sync),
                    listener: &::form_dispatch::listener::EventListener,
                ) -> bool {
                    let ::core::option::Option::Some(t) = target.downcast_ref::<#self_ty>() else {
                        return false;
                    };
                    let ::core::option::Option::Some(l) = listener.downcast::<#listener_ty>() else {
                        return false;
                    };
                    let ret = t.#ident(l);
                    #outcome
                }
                fn __target() -> ::core::any::TypeId {
                    ::core::any::TypeId::of::<#self_ty>()
                }
                fn __target_name() -> &'static str {
                    ::core::any::type_name::<#self_ty>()
                }
                ::form_dispatch::__private::inventory::submit! {
                    ::form_dispatch::capability::ListenerMethod {
                        target: __target,
                        target_name: __target_name,
                        name: #name,
                        invoke: __invoke,
                    }
                }
            };
        });
    }
    Ok(out)
}

// add_tree_expansion_listener -> addTreeExpansionListener
fn convention_name(ident: &str) -> Option<String> {
    let (op, rest) = if let Some(rest) = ident.strip_prefix("add_") {
        ("add", rest)
    } else if let Some(rest) = ident.strip_prefix("remove_") {
        ("remove", rest)
    } else {
        return None;
    };
    let middle = rest.strip_suffix("_listener")?;
    if middle.is_empty() {
        return None;
    }
    Some(format!("{op}{}Listener", middle.to_upper_camel_case()))
}

// `(&self, l: Arc<L>)` yields `L`.
fn listener_param(f: &ImplItemFn) -> Option<Type> {
    let mut inputs = f.sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(r)) if r.reference.is_some() && r.mutability.is_none() => {}
        _ => return None,
    }
    let (Some(FnArg::Typed(param)), None) = (inputs.next(), inputs.next()) else {
        return None;
    };
    arc_inner(&param.ty)
}

// Maps the method's return value `ret` to the adapter's success flag.
fn call_outcome(output: &ReturnType) -> Option<proc_macro2::TokenStream> {
    let ty = match output {
        ReturnType::Default => return Some(quote! { let () = ret; true }),
        ReturnType::Type(_, ty) => ty,
    };
    match &**ty {
        Type::Tuple(t) if t.elems.is_empty() => Some(quote! { let () = ret; true }),
        Type::Path(tp) => match tp.path.segments.last()?.ident.to_string().as_str() {
            "bool" => Some(quote! { ret }),
            "Result" => Some(quote! { ret.is_ok() }),
            _ => None,
        },
        _ => None,
    }
}

fn arc_inner(ty: &Type) -> Option<Type> {
    let Type::Path(tp) = ty else { return None };
    let seg = tp.path.segments.last()?;
    if seg.ident != "Arc" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &seg.arguments else { return None };
    match args.args.first() {
        Some(GenericArgument::Type(inner)) if args.args.len() == 1 => Some(inner.clone()),
        _ => None,
    }
}
